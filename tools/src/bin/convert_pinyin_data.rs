use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use examkey_pinyin::RomanizationTable;

/// Convert a pinyin-data text table (`U+4E2D: zhōng  # 中`) into the bincode
/// snapshot loaded by `RomanizationTable::load`.
#[derive(Parser)]
struct Args {
    #[arg(long)]
    input: PathBuf,

    #[arg(long, default_value = "data/romanization.bincode")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();
    let args = Args::parse();

    let table = RomanizationTable::load_pinyin_data(&args.input)?;
    if let Some(dir) = args.output.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    table.save_bincode(&args.output)?;

    info!(entries = table.len(), "table converted");
    println!("Wrote {} entries to {}", table.len(), args.output.display());
    Ok(())
}
