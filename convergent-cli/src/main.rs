use anyhow::Result;
use clap::Parser;
use convergent_core::config::Config;
use convergent_core::crdt::PeerId;
use convergent_core::logging::{init_logging_with_config, LogConfig};
use convergent_core::metrics::init_metrics;
use std::path::PathBuf;
use tracing::info;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "convergent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// TOML configuration file; CONVERGENT_* variables still apply on top
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Check the merge laws on randomly generated register and map states
    Check {
        /// Random state triples per CRDT type
        #[arg(long)]
        cases: Option<u64>,

        /// Run seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Merge one JSON map state into another and print the result
    Merge {
        /// State of the local replica
        local: PathBuf,

        /// State received from a remote replica
        remote: PathBuf,

        /// Peer id of the local replica
        #[arg(long)]
        peer: Option<String>,

        /// Write the merged state here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the live contents of a JSON map state
    Show {
        /// State file
        file: PathBuf,
    },
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(&args)?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;
    init_metrics();

    info!("convergent started");

    match args.command {
        Some(Command::Check { cases, seed }) => {
            if let Some(cases) = cases {
                config.checker.cases = cases;
            }
            if let Some(seed) = seed {
                config.checker.seed = seed;
            }

            let report = commands::check(&config.checker)?;
            println!(
                "ok: {} register cases, {} map cases (seed {})",
                report.register_cases, report.map_cases, config.checker.seed
            );
        }
        Some(Command::Merge {
            local,
            remote,
            peer,
            output,
        }) => {
            let peer = match peer {
                Some(id) => PeerId::parse(id)?,
                None => config.replica.peer_id()?,
            };

            let rendered = commands::render_state(&commands::merge_files(&local, &remote, peer)?)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    info!(path = %path.display(), "wrote merged state");
                }
                None => println!("{}", rendered),
            }
        }
        Some(Command::Show { file }) => {
            println!("{}", commands::show(&file)?);
        }
        None => {
            info!("No command specified. Use --help for usage information.");
        }
    }

    info!("convergent finished");

    Ok(())
}
