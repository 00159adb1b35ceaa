//! Interop daemon: entry point for running and inspecting an observer node.

use anyhow::Context;
use clap::Parser;
use interop_node::{
    init_logging, BlockInput, LogFormat, NodeConfig, ObserverNode, StaticValidatorRegistry,
};
use interop_store_lmdb::{LmdbEnvironment, LmdbKvStore};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Named databases the node opens in its environment.
const MAX_DBS: u32 = 4;

#[derive(Parser)]
#[command(name = "interop-daemon", about = "Cross-chain observer node daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "INTEROP_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the state store.
    #[arg(long, env = "INTEROP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "INTEROP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "INTEROP_LOG_FORMAT")]
    log_format: Option<String>,

    /// Print Prometheus metrics after a replay.
    #[arg(long, env = "INTEROP_ENABLE_METRICS")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Apply a newline-delimited JSON message log, one block per line.
    Replay {
        /// Message log; `-` reads stdin.
        log: PathBuf,
    },
    /// Print a ballot as JSON.
    Ballot { identifier: String },
    /// Print a cross-chain transaction as JSON.
    Cctx { index: String },
    /// Print the current TSS key and the key history.
    Tss,
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.enable_metrics |= cli.metrics;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let node = open_node(&config)?;
    match cli.command {
        Command::Replay { log } => replay(&node, &log, config.enable_metrics)?,
        Command::Ballot { identifier } => {
            let ballot = node
                .keeper()
                .observer()
                .find_ballot(&identifier)?
                .with_context(|| format!("ballot {identifier} not found"))?;
            println!("{}", serde_json::to_string_pretty(&ballot)?);
        }
        Command::Cctx { index } => {
            let cctx = node
                .keeper()
                .get_cctx(&index)?
                .with_context(|| format!("cctx {index} not found"))?;
            println!("{}", serde_json::to_string_pretty(&cctx)?);
        }
        Command::Tss => {
            let keeper = node.keeper();
            let observer = keeper.observer();
            let current = observer.get_tss()?;
            let history = observer.tss_history()?;
            let out = serde_json::json!({ "current": current, "history": history });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Config => {}
    }
    Ok(())
}

fn open_node(
    config: &NodeConfig,
) -> anyhow::Result<ObserverNode<LmdbKvStore, StaticValidatorRegistry>> {
    let env = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.map_size)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
    let registry = StaticValidatorRegistry::from_config(&config.validators)?;
    let node = ObserverNode::new(
        env.kv_store(),
        registry,
        config.params.to_params(),
        config.admins.clone(),
    )?;
    node.bootstrap_chain_params(&config.chain_params)?;
    Ok(node)
}

fn replay(
    node: &ObserverNode<LmdbKvStore, StaticValidatorRegistry>,
    log: &Path,
    print_metrics: bool,
) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = if log.as_os_str() == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(log)
            .with_context(|| format!("opening message log {}", log.display()))?;
        Box::new(std::io::BufReader::new(file))
    };

    let (mut blocks, mut applied, mut rejected, mut skipped) = (0usize, 0usize, 0usize, 0usize);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let block = BlockInput::from_json_line(&line)
            .with_context(|| format!("line {}", line_no + 1))?;
        let summary = node
            .apply_block(&block)
            .with_context(|| format!("applying block {}", block.height))?;
        if summary.skipped {
            skipped += 1;
            continue;
        }
        blocks += 1;
        applied += summary.applied;
        rejected += summary.rejected;
    }

    tracing::info!(blocks, applied, rejected, skipped, "replay finished");
    if print_metrics {
        print!("{}", node.metrics().encode()?);
    }
    Ok(())
}
