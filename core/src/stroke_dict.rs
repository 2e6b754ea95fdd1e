//! Stroke lookup databases.
//!
//! A stroke database is a read-only reverse index from one character to its
//! stroke codes. An entry is a whitespace-separated list of variants, each an
//! ordered string over `h s p n z` (horizontal, vertical, left-falling,
//! dot, turning). Several variants exist because one character can have
//! several readings or historically distinct stroke orders.
//!
//! Backends:
//! - `StrokeDict`: in-memory map, loaded from a text table or bincode
//! - `FstStrokeDict`: `fst` key index plus bincode payload vector
//! - `RedbStrokeDict`: `redb` table with an in-process LRU read cache
//!
//! `StrokeDb::open` picks whichever artifact exists for a database name.

use crate::utils;
use ahash::AHashMap;
use anyhow::Context as _;
use redb::{ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

/// Character to stroke-code lookup.
pub trait StrokeLookup {
    /// Whitespace-separated stroke variants for `character`, or `None` when
    /// the character is unknown.
    fn lookup(&self, character: &str) -> Option<String>;
}

impl<T: StrokeLookup + ?Sized> StrokeLookup for &T {
    fn lookup(&self, character: &str) -> Option<String> {
        (**self).lookup(character)
    }
}

impl<T: StrokeLookup + ?Sized> StrokeLookup for Box<T> {
    fn lookup(&self, character: &str) -> Option<String> {
        (**self).lookup(character)
    }
}

// ============================================================================
// In-memory table
// ============================================================================

/// In-memory stroke table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrokeDict {
    map: AHashMap<String, String>,
}

impl StrokeDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small built-in table covering the demo lexicon.
    pub fn load_demo() -> Self {
        let mut dict = Self::new();
        for (character, code) in [
            ("我", "phshzpn"),
            ("窝", "nnzpnszhszpn"),
            ("握", "hshzhphznhsh"),
            ("卧", "hszhszsn"),
            ("们", "psnsz"),
            ("门", "nsz"),
            ("好", "zphzsh"),
            ("号", "szhhz"),
            ("吗", "szhzzh"),
            ("妈", "zphzzh"),
            ("马", "zzh"),
            ("码", "hpszhzzh"),
            ("你", "pspzspn"),
            ("泥", "nnhzhppz"),
            ("中", "szhs"),
            ("国", "szhhshnh"),
        ] {
            dict.insert(character, code);
        }
        dict
    }

    /// Canonical form of a raw stroke code: lowercase, with `d` stored as `n`.
    ///
    /// Returns `None` for an empty code or one using symbols outside
    /// `h s p n d z`.
    pub fn canonical_code(raw: &str) -> Option<String> {
        let code = raw.trim().to_lowercase();
        if code.is_empty() || !code.chars().all(|c| "hspndz".contains(c)) {
            return None;
        }
        Some(code.replace('d', "n"))
    }

    /// Record `code` as a variant of `character`.
    ///
    /// Variants accumulate in insertion order; duplicates are ignored. An
    /// empty code still registers the character (with no variants).
    pub fn insert(&mut self, character: &str, code: &str) {
        let entry = self.map.entry(utils::normalize(character)).or_default();
        let code = code.trim();
        if code.is_empty() || entry.split_whitespace().any(|v| v == code) {
            return;
        }
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(code);
    }

    pub fn get(&self, character: &str) -> Option<&str> {
        self.map.get(character).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All entries sorted by key (byte order).
    pub fn sorted_entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Parse a text table.
    ///
    /// One character per line, followed by one or more codes separated by
    /// tabs or spaces. Repeated characters accumulate variants. Blank lines
    /// and lines starting with `#` are skipped.
    pub fn from_table_str(content: &str) -> anyhow::Result<Self> {
        let mut dict = Self::new();
        for (no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(character) = fields.next() else {
                continue;
            };
            if character.graphemes(true).count() != 1 {
                anyhow::bail!("line {}: {:?} is not a single character", no + 1, character);
            }
            let mut any = false;
            for raw in fields {
                match Self::canonical_code(raw) {
                    Some(code) => {
                        dict.insert(character, &code);
                        any = true;
                    }
                    None => tracing::warn!(
                        line = no + 1,
                        character,
                        code = raw,
                        "skipping invalid stroke code"
                    ),
                }
            }
            if !any {
                dict.insert(character, "");
            }
        }
        Ok(dict)
    }

    /// Load a text table from disk (see `from_table_str`).
    pub fn load_table<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read stroke table {}", path.display()))?;
        Self::from_table_str(&content)
            .with_context(|| format!("parse stroke table {}", path.display()))
    }

    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn load_bincode<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

impl StrokeLookup for StrokeDict {
    fn lookup(&self, character: &str) -> Option<String> {
        self.get(character).map(str::to_string)
    }
}

// ============================================================================
// FST + bincode artifacts
// ============================================================================

/// Stroke database backed by an `fst` index (character -> payload index)
/// and a bincode-serialized payload vector.
#[derive(Debug, Clone)]
pub struct FstStrokeDict {
    index: fst::Map<Vec<u8>>,
    payloads: Vec<String>,
}

impl FstStrokeDict {
    /// Build in memory from a table.
    pub fn from_dict(dict: &StrokeDict) -> anyhow::Result<Self> {
        let mut builder = fst::MapBuilder::memory();
        let mut payloads = Vec::with_capacity(dict.len());
        for (i, (key, codes)) in dict.sorted_entries().into_iter().enumerate() {
            builder.insert(key, i as u64)?;
            payloads.push(codes.to_string());
        }
        Ok(Self {
            index: builder.into_map(),
            payloads,
        })
    }

    /// Load from the `.fst` index and `.bincode` payload files.
    pub fn load<P: AsRef<Path>>(fst_path: P, bincode_path: P) -> anyhow::Result<Self> {
        let fst_path = fst_path.as_ref();
        let bincode_path = bincode_path.as_ref();

        let mut buf = Vec::new();
        File::open(fst_path)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .with_context(|| format!("read fst {}", fst_path.display()))?;
        let index = fst::Map::new(buf).with_context(|| format!("fst map {}", fst_path.display()))?;

        let reader = BufReader::new(
            File::open(bincode_path)
                .with_context(|| format!("open bincode {}", bincode_path.display()))?,
        );
        let payloads: Vec<String> = bincode::deserialize_from(reader)
            .with_context(|| format!("deserialize bincode {}", bincode_path.display()))?;

        if payloads.len() != index.len() {
            anyhow::bail!(
                "stroke index has {} keys but payload file has {} entries",
                index.len(),
                payloads.len()
            );
        }
        Ok(Self { index, payloads })
    }

    /// Write the `.fst` index and `.bincode` payload files.
    pub fn save<P: AsRef<Path>>(&self, fst_path: P, bincode_path: P) -> anyhow::Result<()> {
        let mut out = File::create(fst_path.as_ref())?;
        out.write_all(self.index.as_fst().as_bytes())?;
        let writer = BufWriter::new(File::create(bincode_path.as_ref())?);
        bincode::serialize_into(writer, &self.payloads)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl StrokeLookup for FstStrokeDict {
    fn lookup(&self, character: &str) -> Option<String> {
        let idx = self.index.get(character)?;
        self.payloads.get(idx as usize).cloned()
    }
}

// ============================================================================
// redb
// ============================================================================

/// Stroke database stored in a `redb` file.
///
/// Reads go through an LRU cache so repeated lookups of the same characters
/// (the common case while typing) stay in memory.
pub struct RedbStrokeDict {
    db: redb::Database,
    cache: RefCell<lru::LruCache<String, Option<String>>>,
    path: PathBuf,
}

impl RedbStrokeDict {
    const TABLE_DEF: TableDefinition<'static, &'static str, &'static str> =
        TableDefinition::new("strokes");

    const CACHE_CAPACITY: usize = 4096;

    /// Create (or overwrite) a database at `path` holding `dict`.
    pub fn create<P: AsRef<Path>>(path: P, dict: &StrokeDict) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = redb::Database::create(path)
            .with_context(|| format!("create redb {}", path.display()))?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(Self::TABLE_DEF)?;
            for (key, codes) in dict.sorted_entries() {
                table.insert(key, codes)?;
            }
        }
        write_txn.commit()?;
        Ok(Self::with_db(db, path))
    }

    /// Open an existing database.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db =
            redb::Database::open(path).with_context(|| format!("open redb {}", path.display()))?;
        Ok(Self::with_db(db, path))
    }

    fn with_db(db: redb::Database, path: &Path) -> Self {
        let capacity = NonZeroUsize::new(Self::CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            db,
            cache: RefCell::new(lru::LruCache::new(capacity)),
            path: path.to_path_buf(),
        }
    }

    fn read(&self, character: &str) -> anyhow::Result<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::TABLE_DEF)?;
        Ok(table.get(character)?.map(|v| v.value().to_string()))
    }
}

impl fmt::Debug for RedbStrokeDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbStrokeDict")
            .field("path", &self.path)
            .field("cached", &self.cache.borrow().len())
            .finish()
    }
}

impl StrokeLookup for RedbStrokeDict {
    fn lookup(&self, character: &str) -> Option<String> {
        if let Some(hit) = self.cache.borrow_mut().get(character) {
            return hit.clone();
        }
        match self.read(character) {
            Ok(value) => {
                self.cache
                    .borrow_mut()
                    .put(character.to_string(), value.clone());
                value
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "stroke lookup failed");
                None
            }
        }
    }
}

// ============================================================================
// Backend switch
// ============================================================================

/// A stroke database of any supported backend.
#[derive(Debug)]
pub enum StrokeDb {
    InMemory(StrokeDict),
    Fst(FstStrokeDict),
    Redb(RedbStrokeDict),
}

impl StrokeDb {
    /// Open the database called `name` inside `dir`.
    ///
    /// Probes, in order: `<name>.fst` + `<name>.bincode`, `<name>.redb`,
    /// `<name>.txt`.
    pub fn open<P: AsRef<Path>>(dir: P, name: &str) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let fst_path = dir.join(format!("{name}.fst"));
        let bincode_path = dir.join(format!("{name}.bincode"));
        let redb_path = dir.join(format!("{name}.redb"));
        let txt_path = dir.join(format!("{name}.txt"));

        let db = if fst_path.exists() && bincode_path.exists() {
            Self::Fst(FstStrokeDict::load(&fst_path, &bincode_path)?)
        } else if redb_path.exists() {
            Self::Redb(RedbStrokeDict::open(&redb_path)?)
        } else if txt_path.exists() {
            Self::InMemory(StrokeDict::load_table(&txt_path)?)
        } else {
            anyhow::bail!("no stroke database named {:?} in {}", name, dir.display());
        };
        tracing::info!(name, backend = db.backend_name(), dir = %dir.display(), "opened stroke database");
        Ok(db)
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            StrokeDb::InMemory(_) => "memory",
            StrokeDb::Fst(_) => "fst",
            StrokeDb::Redb(_) => "redb",
        }
    }
}

impl From<StrokeDict> for StrokeDb {
    fn from(dict: StrokeDict) -> Self {
        StrokeDb::InMemory(dict)
    }
}

impl StrokeLookup for StrokeDb {
    fn lookup(&self, character: &str) -> Option<String> {
        match self {
            StrokeDb::InMemory(d) => d.lookup(character),
            StrokeDb::Fst(d) => d.lookup(character),
            StrokeDb::Redb(d) => d.lookup(character),
        }
    }
}
