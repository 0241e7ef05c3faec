//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::config::EngineConfig;
use crate::engine::analysis::analyze;
use crate::engine::io::write_atomically;
use crate::engine::{read_wav, AudioOrigin, CommandTranscoder, Engine, SoundId, SynthesisRequest};
use crate::error::Result;

/// Build an engine from an optional config file.
pub fn load_engine(config: Option<&Path>) -> Result<Engine> {
    let config = match config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    Engine::new(config)
}

/// Options for a single `generate` run.
#[derive(Debug, Clone)]
pub struct GenerateArgs<'a> {
    pub sound: &'a str,
    pub duration_secs: f64,
    pub frequency_hz: Option<f64>,
    pub seed: Option<u64>,
    pub output: &'a Path,
    pub transcode_to: Option<&'a Path>,
}

/// Render one sound to disk, optionally with a lossy copy.
pub fn generate(engine: &Engine, args: &GenerateArgs<'_>) -> Result<()> {
    let mut request = SynthesisRequest::parse(args.sound, args.duration_secs)?;
    if let Some(frequency_hz) = args.frequency_hz {
        request = request.with_frequency(frequency_hz);
    }
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }

    let summary = engine.render_to_file(&request, args.output)?;

    println!("Wrote: {}", summary.path.display());
    match &summary.origin {
        AudioOrigin::Synthesized { num_samples, seed } => {
            println!("Sound: {}", request.sound);
            println!("Samples: {}", num_samples);
            println!("Seed: {}", seed);
            if summary.streamed {
                println!("Rendered in chunks of {} samples", engine.config().chunk_samples);
            }
        }
        AudioOrigin::Recorded { path } => {
            println!("Copied recording: {}", path.display());
        }
    }

    if let Some(lossy_path) = args.transcode_to {
        let transcoder = CommandTranscoder::ffmpeg_mp3();
        let bytes = engine.transcode_file(&summary.path, &request.label(), &transcoder)?;
        write_atomically(lossy_path, |tmp| Ok(tmp.write_all(&bytes)?))?;
        println!("Transcoded: {} ({} bytes)", lossy_path.display(), bytes.len());
    }

    Ok(())
}

/// Print every sound identifier with its category.
pub fn list() -> Result<()> {
    println!("{:<20} {:<10} {}", "SOUND", "KIND", "TUNABLE");
    println!("{:-<40}", "");
    for sound in SoundId::all() {
        println!(
            "{:<20} {:<10} {}",
            sound.name(),
            sound.category(),
            if sound.is_tunable() { "yes" } else { "" }
        );
    }
    Ok(())
}

/// Print the effective preset table.
pub fn presets(engine: &Engine) -> Result<()> {
    let json = serde_json::to_string_pretty(&engine.config().presets)?;
    println!("{}", json);
    Ok(())
}

/// Print header and level information for a WAV file.
pub fn inspect(path: &Path) -> Result<()> {
    let wav = read_wav(path)?;
    let buffer = wav.to_buffer()?;
    let analysis = analyze(buffer.samples(), buffer.sample_rate());

    println!("File: {}", path.display());
    println!("Sample rate: {} Hz", wav.header.sample_rate);
    println!("Channels: {}", wav.header.channels);
    println!("Bits per sample: {}", wav.header.bits_per_sample);
    println!("Samples: {}", wav.header.num_samples);
    println!("Duration: {:.3} s", buffer.duration_secs());
    println!("\n--- Levels ---");
    println!("Peak: {:.2} dBFS", analysis.peak_db);
    println!("RMS: {:.2} dBFS", analysis.rms_db);
    println!("Spectral flatness: {:.3}", analysis.spectral_flatness);
    if let Some(freq) = analysis.dominant_frequency {
        println!("Dominant frequency: {:.1} Hz", freq);
    }

    Ok(())
}
