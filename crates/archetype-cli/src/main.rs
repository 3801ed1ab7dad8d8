// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use archetype_cli::{
    ArtifactStore, CliError, RunInputs, Stage, StageReport, load_config, load_events, load_roles,
    stages,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "archetype", version, about = "Pitcher archetype pipeline")]
struct Cli {
    /// Pipeline config (JSON); omitted fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Artifact directory.
    #[arg(long, global = true, default_value = "out")]
    out: PathBuf,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the ambiguous pitch category per pitcher.
    Reclassify(EventArgs),
    /// Aggregate pitcher-season feature tables.
    Features(FeatureArgs),
    /// Fit both partitions and place sub-threshold rows.
    Cluster,
    /// Name clusters, label members, and build profiles.
    Name,
    /// Write flat rows and profiles for downstream use.
    Export,
    /// Run every stage, optionally resuming from a later one.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct EventArgs {
    /// Pitch events (.json, .jsonl, or .csv).
    #[arg(long)]
    events: PathBuf,
}

#[derive(Args, Debug)]
struct FeatureArgs {
    #[command(flatten)]
    input: EventArgs,
    /// Role table (.json, .jsonl, or .csv) with starts and games.
    #[arg(long)]
    roles: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    roles: Option<PathBuf>,
    /// First stage to run; earlier artifacts are read from --out.
    #[arg(long, value_enum, default_value_t = Stage::Reclassify)]
    from: Stage,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(err) = run(cli) {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    let store = ArtifactStore::new(cli.out);
    let reports = match cli.command {
        Command::Reclassify(args) => {
            vec![stages::reclassify(&store, &load_events(&args.events)?, &config)?]
        }
        Command::Features(args) => {
            let events = load_events(&args.input.events)?;
            let roles = load_roles(args.roles.as_deref())?;
            vec![stages::features(&store, events, &roles, &config)?]
        }
        Command::Cluster => vec![stages::cluster(&store, &config)?],
        Command::Name => vec![stages::name(&store, &config)?],
        Command::Export => vec![stages::export(&store, &config)?],
        Command::Run(args) => {
            let inputs = RunInputs {
                events: args.events,
                roles: args.roles,
            };
            archetype_cli::run(&store, &inputs, &config, args.from)?
        }
    };
    print_reports(&reports)
}

fn print_reports(reports: &[StageReport]) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(reports)
        .map_err(|source| CliError::json("failed to serialize stage report", source))?;
    println!("{encoded}");
    Ok(())
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use archetype_cli::Stage;
    use clap::Parser;

    #[test]
    fn run_accepts_a_resume_stage() {
        let cli = Cli::try_parse_from(["archetype", "run", "--from", "cluster", "--out", "x", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.from, Stage::Cluster);
                assert!(args.events.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn features_requires_events() {
        assert!(Cli::try_parse_from(["archetype", "features"]).is_err());
        let cli = Cli::try_parse_from(["archetype", "features", "--events", "e.csv", "--roles", "r.csv"]).unwrap();
        assert!(matches!(cli.command, Command::Features(_)));
    }
}
