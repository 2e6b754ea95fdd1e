use clap::Parser;
use libstroke::{CompositionContext, InputContext, Lexicon, StrokeConfig, StrokeDict, StrokeFilter};
use libstroke_core::CandidateFilter;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Interactive pinyin input with stroke-code filtering.
///
/// Type pinyin, optionally followed by the guide key and stroke letters
/// (h s p n/d z, x for any), e.g. `wo;p`. A select key picks a candidate,
/// an empty line commits the raw composition.
#[derive(Parser)]
#[command(name = "libstroke")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the stroke database (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Stroke database name (overrides config)
    #[arg(long)]
    db: Option<String>,

    /// Lexicon file: `.bincode`, or tab-separated `key<TAB>phrase[<TAB>freq]`.
    /// The demo lexicon is used if omitted
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Use the built-in demo stroke table instead of opening a database
    #[arg(long)]
    demo: bool,

    /// Print each menu as one JSON object per line
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> anyhow::Result<StrokeConfig> {
    let mut config = match &args.config {
        Some(path) => StrokeConfig::load_toml(path)?,
        None => StrokeConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.base.data_dir = dir.clone();
    }
    if let Some(db) = &args.db {
        config.db = db.clone();
    }
    Ok(config)
}

fn print_state(ctx: &InputContext, filter: &StrokeFilter, json: bool) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if json {
        let value = serde_json::json!({
            "preedit": ctx.preedit(),
            "input": ctx.input(),
            "state": format!("{:?}", filter.state()),
            "candidates": ctx.page(),
        });
        writeln!(out, "{}", serde_json::to_string(&value)?)?;
        return Ok(());
    }

    if ctx.is_composing() {
        writeln!(out, "  [{}]  ({:?})", ctx.preedit(), filter.state())?;
    }
    let keys: Vec<char> = ctx.config().select_keys.chars().collect();
    for (i, c) in ctx.page().iter().enumerate() {
        let key = keys.get(i).copied().unwrap_or(' ');
        let strokes = filter.strokes_of(&c.text).unwrap_or_default();
        writeln!(out, "  {}. {}  {}", key, c.text, strokes)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    if args.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let lexicon = match &args.lexicon {
        Some(path) => Lexicon::load(path)?,
        None => Lexicon::load_demo(),
    };

    let mut ctx = InputContext::new(config.base().clone());
    let filter = if args.demo {
        StrokeFilter::with_db(&config, StrokeDict::load_demo(), &ctx)
    } else {
        StrokeFilter::init(&config, &ctx)
    };

    if !args.json {
        if filter.is_active() {
            println!("✓ Stroke filter ready (guide key {:?})", filter.guide_key());
        } else {
            eprintln!(
                "⚠ No stroke database {:?} in {}; run with --demo for the built-in table",
                config.db,
                config.base().data_dir.display()
            );
        }
        println!("Type pinyin, e.g. wo;p or haoma;h. :clear resets, :quit exits.");
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        match input {
            ":quit" => break,
            ":clear" => ctx.clear(),
            "" => ctx.commit(),
            _ => {
                let mut chars = input.chars();
                match (chars.next(), chars.next()) {
                    (Some(key), None)
                        if ctx.config().selection_key_index(key).is_some()
                            && !ctx.menu().is_empty() =>
                    {
                        ctx.select_by_key(key);
                    }
                    _ => ctx.insert_str(input),
                }
            }
        }

        if ctx.has_commit() {
            let text = ctx.take_commit();
            if args.json {
                println!("{}", serde_json::json!({ "commit": text }));
            } else {
                println!("→ {}", text);
            }
        }

        let filters: [&dyn CandidateFilter; 1] = [&filter];
        ctx.update_candidates(&lexicon, &filters);
        print_state(&ctx, &filter, args.json)?;
    }

    filter.shutdown();
    Ok(())
}
