//! CLI Module
//!
//! Command-line interface for rendering ambient sounds to WAV.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ambient Synth - noise beds, drones and soundscapes rendered to WAV
#[derive(Parser, Debug)]
#[command(name = "ambient-synth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a sound to a WAV file
    #[command(name = "generate")]
    Generate {
        /// Sound identifier, e.g. "pink-noise" or "Singing Bowls"
        sound: String,

        /// Duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Frequency in Hz for tunable sounds
        #[arg(short, long)]
        frequency: Option<f64>,

        /// Seed for reproducible noise
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a lossy copy through ffmpeg
        #[arg(long)]
        transcode_to: Option<PathBuf>,
    },

    /// List every sound identifier
    #[command(name = "list")]
    List,

    /// Print the effective preset table as JSON
    #[command(name = "presets")]
    Presets,

    /// Show format and level information for a WAV file
    #[command(name = "inspect")]
    Inspect {
        /// WAV file to inspect
        path: PathBuf,
    },
}
