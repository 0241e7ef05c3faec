//! Ambient Synth - long-duration ambient audio synthesis
//!
//! Generates noise beds, tonal drones and layered soundscapes as 16-bit mono
//! 44.1 kHz WAV.
//!
//! # Architecture
//!
//! A request flows through a fixed pipeline:
//! - `synth`: seeded noise generators, sine oscillators and composite recipes
//! - `dsp`: weighted mixing and peak normalization
//! - `engine`: validation, dispatch, WAV encoding and streaming renders
//!
//! Pre-recorded sounds bypass synthesis and are served from an asset
//! directory. Lossy formats are produced by an external transcoder.

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod synth;

pub use config::EngineConfig;
pub use engine::{AudioBuffer, Engine, SoundId, SynthesisRequest};
pub use error::{Result, SynthError};
