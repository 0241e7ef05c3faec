//! Ambient Synth CLI
//!
//! Command-line interface for rendering ambient sounds.

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ambient_synth::cli::commands::{self, GenerateArgs};
use ambient_synth::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Ambient Synth v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd, cli.config.as_deref()),
        None => {
            println!("Ambient Synth v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: Option<&Path>) -> anyhow::Result<()> {
    match cmd {
        Commands::Generate {
            sound,
            duration,
            frequency,
            seed,
            output,
            transcode_to,
        } => {
            let engine = commands::load_engine(config)
                .context("failed to load engine configuration")?;
            let args = GenerateArgs {
                sound: &sound,
                duration_secs: duration,
                frequency_hz: frequency,
                seed,
                output: &output,
                transcode_to: transcode_to.as_deref(),
            };
            commands::generate(&engine, &args).map_err(|e| {
                for suggestion in e.recovery_suggestions() {
                    eprintln!("hint: {}", suggestion);
                }
                anyhow::anyhow!("[{}] {}", e.error_code(), e)
            })
        }
        Commands::List => Ok(commands::list()?),
        Commands::Presets => {
            let engine = commands::load_engine(config)?;
            Ok(commands::presets(&engine)?)
        }
        Commands::Inspect { path } => commands::inspect(&path)
            .with_context(|| format!("failed to inspect {}", path.display())),
    }
}
