//! graphtrigger command-line tool
//!
//! Loads a trigger module the way a host would (config file plus a
//! directory of trigger manifests) and runs it against files on disk.
//!
//! Usage:
//!   graphtrigger check --config graphtrigger.toml --triggers triggers/ changes.json
//!   graphtrigger list --triggers triggers/
//!   graphtrigger scan --triggers triggers/ --index index.db entities.json

use anyhow::Result;
use clap::{Parser, Subcommand};
use graphtrigger_cli::{check, load_module, read_change_set, read_entities, render_registry, scan};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "graphtrigger")]
#[command(about = "Commit guard and trigger dispatch for property graphs")]
struct Args {
    /// Module config file (TOML, `[module]` table)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory of trigger manifests (overrides the config file)
    #[arg(short, long, global = true)]
    triggers: Option<PathBuf>,

    /// SQLite file for the trigger node index (overrides the config file)
    #[arg(short, long, global = true)]
    index: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a JSON change set; exits non-zero if it would be rejected
    Check {
        /// Change set file with `created`, `deleted` and `changed` arrays
        changeset: PathBuf,
    },
    /// Print registered triggers per event and the merged locks
    List,
    /// Run the initial scan over a JSON array of entities
    Scan {
        entities: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let module = load_module(args.config.as_deref(), args.triggers.as_deref(), args.index.as_deref())?;

    match args.command {
        Command::Check { changeset } => {
            let changes = read_change_set(&changeset)?;
            match check(&module, &changes) {
                Ok(()) => {
                    println!("commit");
                    Ok(ExitCode::SUCCESS)
                }
                Err(rejection) => {
                    println!("reject: {rejection}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::List => {
            print!("{}", render_registry(&module.registry()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Scan { entities } => {
            let entities = read_entities(&entities)?;
            let report = scan(&module, entities)?;
            println!(
                "batches={} scanned={} offered={} vetoes={}",
                report.batches, report.scanned, report.offered, report.vetoes
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}
