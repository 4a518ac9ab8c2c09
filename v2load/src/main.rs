use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use v2data::{LoadConfig, load_scenario};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compile a Victoria 2 scenario and report problems", long_about = None)]
struct Args {
    /// Path to game data
    #[arg(long, default_value = ".")]
    game_path: String,

    /// JSON load configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail if the scenario produced any diagnostics
    #[arg(long)]
    strict: bool,

    /// Maximum number of diagnostics to print
    #[arg(long)]
    max_diagnostics: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let mut config = match &args.config {
        Some(path) => LoadConfig::from_json_file(path)?,
        None => LoadConfig::default(),
    };
    if args.strict {
        config.fail_on_diagnostics = true;
    }
    if let Some(max) = args.max_diagnostics {
        config.max_reported_diagnostics = max;
    }

    let game_path = if args.game_path == "." {
        v2data::path::detect_game_path().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(args.game_path)
    };

    let report = load_scenario(&game_path, &config)
        .with_context(|| format!("failed to load scenario from {}", game_path.display()))?;

    println!("{}", report.summary());
    let entries = report.diagnostics.entries();
    for entry in entries.iter().take(config.max_reported_diagnostics) {
        println!("{}", entry);
    }
    if entries.len() > config.max_reported_diagnostics {
        println!(
            "... and {} more",
            entries.len() - config.max_reported_diagnostics
        );
    }

    if report.is_failure(&config) {
        bail!("scenario produced {} diagnostics", entries.len());
    }
    Ok(())
}
