use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use examkey_pinyin::{romanizer_from_config, Config, QuestionBank};

/// Fill in `pinyinText` for every question of a bank file.
#[derive(Parser)]
struct Args {
    #[arg(long)]
    input: PathBuf,

    /// Defaults to rewriting the input file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// pinyin-data text table or bincode snapshot; built-in dictionary if absent
    #[arg(long)]
    pinyin_data: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();
    let args = Args::parse();

    let config = Config {
        pinyin_data: args.pinyin_data,
        ..Config::default()
    };
    let romanizer = romanizer_from_config(&config);
    if !romanizer.is_ready() {
        warn!("no romanization table, missing pinyinText stays empty");
    }

    let bank = QuestionBank::load_json(&args.input, romanizer)?;
    let out = args.output.unwrap_or_else(|| args.input.clone());
    std::fs::write(&out, bank.to_json_string()?)
        .with_context(|| format!("write {}", out.display()))?;

    for (t, n) in bank.stats() {
        info!(kind = t.label(), count = n, "romanized");
    }
    println!("Wrote {} questions to {}", bank.len(), out.display());
    Ok(())
}
