//! Phonetic lexicon used as the reference candidate source.
//!
//! Maps a joined pinyin key (e.g. `"haoma"`) to a list of phrases with
//! frequencies. Real hosts bring their own conversion pipeline; this one
//! exists so the filter can be driven end to end from the CLI and tests.
//!
//! Only the leading run of ASCII lowercase letters of the input is
//! converted; anything after it (guide keys, auxiliary codes) is left for
//! other pipeline stages.

use crate::candidate::{Candidate, CandidateKind};
use crate::source::{CandidateIter, CandidateSource};
use ahash::AHashMap;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A single lexicon phrase entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub text: String,
    /// Higher means more frequent.
    pub freq: u64,
}

impl PhraseEntry {
    pub fn new<T: Into<String>>(text: T, freq: u64) -> Self {
        Self {
            text: text.into(),
            freq,
        }
    }
}

/// In-memory lexicon mapping a phonetic key to phrases, most frequent first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    map: AHashMap<String, Vec<PhraseEntry>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phrase for a given key.
    ///
    /// If the phrase already exists for the key its frequency is increased.
    /// Buckets stay sorted by descending frequency (stable for ties).
    pub fn insert<K: Into<String>, T: Into<String>>(&mut self, key: K, phrase: T, freq: u64) {
        let phrase = phrase.into();
        let bucket = self.map.entry(key.into()).or_default();
        if let Some(e) = bucket.iter_mut().find(|e| e.text == phrase) {
            e.freq = e.freq.saturating_add(freq);
        } else {
            bucket.push(PhraseEntry::new(phrase, freq));
        }
        bucket.sort_by(|a, b| b.freq.cmp(&a.freq));
    }

    /// Lookup full phrase entries for a key.
    pub fn lookup_entries(&self, key: &str) -> &[PhraseEntry] {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Small built-in lexicon for smoke-testing.
    pub fn load_demo() -> Self {
        let mut lx = Self::new();
        for (key, phrase, freq) in [
            ("wo", "我", 100),
            ("wo", "窝", 20),
            ("wo", "握", 15),
            ("wo", "卧", 10),
            ("women", "我们", 80),
            ("men", "们", 40),
            ("men", "门", 30),
            ("hao", "好", 90),
            ("hao", "号", 40),
            ("hao", "豪", 10),
            ("ma", "吗", 70),
            ("ma", "妈", 50),
            ("ma", "马", 40),
            ("haoma", "号码", 30),
            ("nihao", "你好", 60),
            ("ni", "你", 90),
            ("ni", "泥", 10),
            ("zhong", "中", 60),
            ("guo", "国", 60),
            ("zhongguo", "中国", 80),
        ] {
            lx.insert(key, phrase, freq);
        }
        lx
    }

    /// Load a tab-separated table: `key<TAB>phrase[<TAB>freq]` per line.
    ///
    /// Blank lines and lines starting with `#` are skipped; a missing
    /// frequency counts as 1.
    pub fn load_tsv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read lexicon {}", path.display()))?;
        Self::from_tsv_str(&content).with_context(|| format!("parse lexicon {}", path.display()))
    }

    pub fn from_tsv_str(content: &str) -> anyhow::Result<Self> {
        let mut lx = Self::new();
        for (no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut cols = line.split('\t');
            let (Some(key), Some(phrase)) = (cols.next(), cols.next()) else {
                anyhow::bail!("line {}: expected key<TAB>phrase", no + 1);
            };
            let freq = match cols.next() {
                Some(f) => f
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("line {}: bad frequency {:?}", no + 1, f))?,
                None => 1,
            };
            lx.insert(key.trim(), phrase.trim(), freq);
        }
        Ok(lx)
    }

    /// Load a lexicon file: bincode for `.bincode`, tab-separated otherwise.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.extension().is_some_and(|e| e == "bincode") {
            Self::load_bincode(path)
                .with_context(|| format!("load lexicon {}", path.display()))
        } else {
            Self::load_tsv(path)
        }
    }

    /// Save the lexicon to a file using bincode serialization.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Load the lexicon from a bincode file produced by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    fn to_candidate(entry: &PhraseEntry, end: usize) -> Candidate {
        let kind = if entry.text.chars().count() > 1 {
            CandidateKind::Phrase
        } else {
            CandidateKind::Normal
        };
        Candidate::new(entry.text.clone(), entry.freq as f64)
            .with_kind(kind)
            .with_span(0..end)
    }

    /// Greedy longest-match sentence over the whole code.
    ///
    /// Returns `None` when some part of the code has no entry, or when the
    /// whole code is a single entry (already offered directly).
    fn compose_sentence(&self, code: &str) -> Option<Candidate> {
        let mut pos = 0;
        let mut text = String::new();
        let mut pieces = 0usize;
        let mut quality = 0.0;
        while pos < code.len() {
            let (end, entry) = (pos + 1..=code.len())
                .rev()
                .find_map(|end| self.lookup_entries(&code[pos..end]).first().map(|e| (end, e)))?;
            text.push_str(&entry.text);
            quality += entry.freq as f64;
            pieces += 1;
            pos = end;
        }
        if pieces < 2 {
            return None;
        }
        Some(
            Candidate::new(text, quality / pieces as f64)
                .with_kind(CandidateKind::Sentence)
                .with_span(0..code.len()),
        )
    }
}

/// Length of the leading run of ASCII lowercase letters.
fn leading_code_len(input: &str) -> usize {
    input
        .bytes()
        .position(|b| !b.is_ascii_lowercase())
        .unwrap_or(input.len())
}

impl CandidateSource for Lexicon {
    /// Yields, lazily: a composed sentence when the whole code has no direct
    /// entry, then exact entries for each code prefix from longest to
    /// shortest.
    fn candidates<'a>(&'a self, input: &'a str) -> CandidateIter<'a> {
        let code = &input[..leading_code_len(input)];
        if code.is_empty() {
            return Box::new(std::iter::empty());
        }
        let sentence = if self.contains_key(code) {
            None
        } else {
            self.compose_sentence(code)
        };
        let words = (1..=code.len()).rev().flat_map(move |end| {
            self.lookup_entries(&code[..end])
                .iter()
                .map(move |e| Self::to_candidate(e, end))
        });
        Box::new(sentence.into_iter().chain(words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lx: &Lexicon, input: &str) -> Vec<String> {
        lx.candidates(input).map(|c| c.text).collect()
    }

    #[test]
    fn insert_sorts_by_frequency() {
        let mut lx = Lexicon::new();
        lx.insert("wo", "窝", 2);
        lx.insert("wo", "我", 10);
        lx.insert("wo", "窝", 1);
        let entries = lx.lookup_entries("wo");
        assert_eq!(entries[0].text, "我");
        assert_eq!(entries[1].freq, 3);
    }

    #[test]
    fn candidates_longest_prefix_first() {
        let lx = Lexicon::load_demo();
        assert_eq!(
            texts(&lx, "haoma"),
            vec!["号码", "好", "号", "豪"]
        );
    }

    #[test]
    fn stops_at_non_code_characters() {
        let lx = Lexicon::load_demo();
        let cands: Vec<Candidate> = lx.candidates("wo;p").collect();
        assert_eq!(cands[0].text, "我");
        assert!(cands.iter().all(|c| c.span == (0..2)));
        assert!(lx.candidates(";p").next().is_none());
    }

    #[test]
    fn composes_sentence_when_no_direct_entry() {
        let lx = Lexicon::load_demo();
        let cands: Vec<Candidate> = lx.candidates("womenhao").collect();
        assert_eq!(cands[0].text, "我们好");
        assert_eq!(cands[0].kind, CandidateKind::Sentence);
        assert_eq!(cands[0].span, 0..8);
        assert_eq!(cands[1].text, "我们");
        assert_eq!(cands[1].kind, CandidateKind::Phrase);
    }

    #[test]
    fn candidates_are_lazy() {
        let lx = Lexicon::load_demo();
        let first = lx.candidates("wo").next().unwrap();
        assert_eq!(first.text, "我");
        assert_eq!(first.quality, 100.0);
    }

    #[test]
    fn tsv_parsing() {
        let lx = Lexicon::from_tsv_str("# comment\nwo\t我\t5\n\nwo\t窝\n").unwrap();
        let entries = lx.lookup_entries("wo");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].freq, 1);
        assert!(Lexicon::from_tsv_str("wo").is_err());
        assert!(Lexicon::from_tsv_str("wo\t我\tmany").is_err());
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = std::env::temp_dir();
        let tsv = dir.join(format!("libstroke_lexicon_{}.tsv", std::process::id()));
        let bin = dir.join(format!("libstroke_lexicon_{}.bincode", std::process::id()));
        std::fs::write(&tsv, "wo\t我\t5\nwo\t窝\t2\nma\t吗\n").unwrap();

        let from_tsv = Lexicon::load(&tsv).unwrap();
        from_tsv.save_bincode(&bin).unwrap();
        let from_bin = Lexicon::load(&bin).unwrap();
        assert_eq!(from_bin.len(), 2);
        assert_eq!(from_bin.lookup_entries("wo"), from_tsv.lookup_entries("wo"));
        assert_eq!(texts(&from_bin, "ma"), vec!["吗"]);

        let _ = std::fs::remove_file(tsv);
        let _ = std::fs::remove_file(bin);
    }
}
