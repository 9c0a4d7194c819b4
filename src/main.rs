//! Mergegate CLI - resolve and reconcile the merge-queue whitelist.

use clap::Parser;
use mergegate::cli::{Cli, Commands};
use mergegate::commands::{self, Output};
use mergegate::config::{ResolvedSettings, Settings, resolve_settings};
use std::io::IsTerminal;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    let human = cli.human_readable;

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => exit_with_error(&e, human),
    };

    let result = match cli.command {
        Commands::GenCommitters { dry_run } => match commands::gen_committers(&settings, dry_run) {
            Ok(report) => {
                output(&report, human);
                Ok(())
            }
            Err(e) => {
                error!("gen-committers failed: {}", e);
                exit_with_error(&e, human)
            }
        },
        Commands::Whitelist => commands::whitelist_show(&settings).map(|r| output(&r, human)),
        Commands::Check { user } => commands::check_user(&settings, &user).map(|r| output(&r, human)),
    };

    if let Err(e) = result {
        exit_with_error(&e, human);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}

fn load_settings(cli: &Cli) -> Result<ResolvedSettings, mergegate::Error> {
    let file = match &cli.config {
        Some(path) => Some((Settings::load(path)?, path.clone())),
        None => None,
    };
    let settings = resolve_settings(
        file.as_ref().map(|(s, path)| (s, path.clone())),
        cli.overrides(),
    )?;
    Ok(settings)
}

fn exit_with_error(e: &mergegate::Error, human: bool) -> ! {
    if human {
        eprintln!("Error: {}", e);
    } else {
        eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
    }
    process::exit(1);
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
