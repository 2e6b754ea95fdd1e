use anyhow::{Context, Result};
use clap::Parser;
use libstroke_core::Lexicon;
use std::path::PathBuf;

/// Convert a tab-separated lexicon (`key<TAB>phrase[<TAB>freq]`) into the
/// bincode form accepted by `libstroke --lexicon`.
#[derive(Parser)]
struct Args {
    #[arg(long)]
    input: PathBuf,

    /// Output path; defaults to the input with a `.bincode` extension
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let lexicon = Lexicon::load_tsv(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("bincode"));
    lexicon.save_bincode(&output)?;
    println!("wrote {} keys to {}", lexicon.len(), output.display());
    Ok(())
}
