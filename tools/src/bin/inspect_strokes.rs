use anyhow::Result;
use clap::Parser;
use libstroke_core::{StrokeDb, StrokeLookup};
use std::path::PathBuf;
use unicode_segmentation::UnicodeSegmentation;

/// Look up characters in a converted stroke database.
#[derive(Parser)]
struct Args {
    /// Directory holding the database
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Database name
    #[arg(long, default_value = "stroke")]
    name: String,

    /// Characters to look up; each character of each argument is shown
    chars: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let db = StrokeDb::open(&args.data_dir, &args.name)?;
    println!("backend: {}", db.backend_name());

    for word in &args.chars {
        for key in word.graphemes(true) {
            match db.lookup(key) {
                Some(v) if v.is_empty() => println!("{}\t(no variants)", key),
                Some(v) => println!("{}\t{}", key, v),
                None => println!("{}\t(absent)", key),
            }
        }
    }
    Ok(())
}
