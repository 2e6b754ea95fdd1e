use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use libstroke_core::{FstStrokeDict, RedbStrokeDict, StrokeDict};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use unicode_segmentation::UnicodeSegmentation;

/// Convert a stroke table into runtime artifacts (`<name>.fst` +
/// `<name>.bincode`, and/or `<name>.redb`).
#[derive(Parser)]
struct Args {
    /// Input table: `.json` (char -> code or [codes]) or text
    /// (`char<TAB>code[<TAB>code...]` per line)
    #[arg(long)]
    input: PathBuf,

    /// Output directory
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    /// Database name, as referenced by the `db` config option
    #[arg(long, default_value = "stroke")]
    name: String,

    #[arg(long, value_enum, default_value_t = Format::Both)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Fst,
    Redb,
    Both,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCodes {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default)]
struct Report {
    characters: usize,
    variants: usize,
    rejected: Vec<String>,
}

fn add_codes<'a, I>(dict: &mut StrokeDict, report: &mut Report, character: &str, codes: I)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut accepted = 0usize;
    for raw in codes {
        match StrokeDict::canonical_code(raw) {
            Some(code) => {
                dict.insert(character, &code);
                accepted += 1;
            }
            None => report.rejected.push(format!("{}\t{}", character, raw)),
        }
    }
    if accepted == 0 {
        // keep the character known, with no variants
        dict.insert(character, "");
    }
    report.variants += accepted;
}

fn read_json(path: &Path) -> Result<(StrokeDict, Report)> {
    let reader = BufReader::new(File::open(path)?);
    let raw: BTreeMap<String, JsonCodes> = serde_json::from_reader(reader)?;
    let mut dict = StrokeDict::new();
    let mut report = Report::default();
    for (character, codes) in &raw {
        let codes: Vec<&str> = match codes {
            JsonCodes::One(s) => s.split_whitespace().collect(),
            JsonCodes::Many(v) => v.iter().map(String::as_str).collect(),
        };
        add_codes(&mut dict, &mut report, character, codes);
    }
    report.characters = dict.len();
    Ok((dict, report))
}

fn read_table(path: &Path) -> Result<(StrokeDict, Report)> {
    let reader = BufReader::new(File::open(path)?);
    let mut dict = StrokeDict::new();
    let mut report = Report::default();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split(|c: char| c == '\t' || c == ' ').filter(|s| !s.is_empty());
        let Some(character) = parts.next() else {
            continue;
        };
        if character.graphemes(true).count() != 1 {
            report.rejected.push(format!("line {}: {}", lineno + 1, line));
            continue;
        }
        add_codes(&mut dict, &mut report, character, parts);
    }
    report.characters = dict.len();
    Ok((dict, report))
}

fn write_outputs(dict: &StrokeDict, out_dir: &Path, name: &str, format: Format) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;
    let mut written = Vec::new();
    if matches!(format, Format::Fst | Format::Both) {
        let fst_path = out_dir.join(format!("{}.fst", name));
        let bin_path = out_dir.join(format!("{}.bincode", name));
        FstStrokeDict::from_dict(dict)?.save(&fst_path, &bin_path)?;
        written.push(fst_path);
        written.push(bin_path);
    }
    if matches!(format, Format::Redb | Format::Both) {
        let redb_path = out_dir.join(format!("{}.redb", name));
        if redb_path.exists() {
            std::fs::remove_file(&redb_path)?;
        }
        RedbStrokeDict::create(&redb_path, dict)?;
        written.push(redb_path);
    }
    Ok(written)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let ext = args.input.extension().and_then(|s| s.to_str()).unwrap_or("");
    let (dict, report) = if ext == "json" {
        read_json(&args.input)
    } else {
        read_table(&args.input)
    }
    .with_context(|| format!("read {}", args.input.display()))?;

    println!(
        "read {} characters, {} variants from {}",
        report.characters,
        report.variants,
        args.input.display()
    );
    if !report.rejected.is_empty() {
        eprintln!("warning: {} entries rejected:", report.rejected.len());
        for entry in report.rejected.iter().take(20) {
            eprintln!("  {}", entry);
        }
    }

    for path in write_outputs(&dict, &args.out_dir, &args.name, args.format)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}
