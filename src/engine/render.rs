//! Request pipeline: validate → generate → [mix] → normalize → encode
//!
//! The [`Engine`] holds only immutable configuration. Each request owns its
//! buffers from generation until encoding completes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dsp::normalize;
use crate::engine::assets::AssetLibrary;
use crate::engine::buffer::{num_samples_for, AudioBuffer};
use crate::engine::io::{encode_wav, write_atomically, write_wav, PcmStreamWriter};
use crate::engine::request::{SoundId, SoundKind, SynthesisRequest};
use crate::engine::transcode::Transcoder;
use crate::error::{Result, SynthError};
use crate::synth::random::fresh_seed;
use crate::synth::source::scan_peak;
use crate::synth::textures::{forest, ocean_waves, rain};
use crate::synth::{
    brown_noise, multi_tone, pink_noise, sine_wave, white_noise, BrownNoise, OceanSource,
    PinkNoise, PresetTable, RainSource, RandomSource, SampleSource, ToneOscillator, WhiteNoise,
};

/// Default directory for recorded sounds when the config names none
pub const DEFAULT_ASSET_DIR: &str = "assets";

/// A normalized buffer and the seed that produced it
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub buffer: AudioBuffer,
    pub seed: u64,
}

/// Where rendered bytes came from
#[derive(Debug, Clone, PartialEq)]
pub enum AudioOrigin {
    Synthesized { num_samples: usize, seed: u64 },
    Recorded { path: PathBuf },
}

/// A complete WAV byte stream
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    pub bytes: Vec<u8>,
    pub origin: AudioOrigin,
}

/// Result of rendering to a file
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub path: PathBuf,
    pub origin: AudioOrigin,
    /// True when the file was written chunk by chunk
    pub streamed: bool,
}

/// The synthesis engine
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    assets: AssetLibrary,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            assets: AssetLibrary::new(DEFAULT_ASSET_DIR),
        }
    }
}

impl Engine {
    /// Build an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let asset_dir = config
            .asset_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR));
        Ok(Self {
            config,
            assets: AssetLibrary::new(asset_dir),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetLibrary {
        &self.assets
    }

    fn resolve_seed(&self, request: &SynthesisRequest) -> u64 {
        request
            .seed
            .or(self.config.default_seed)
            .unwrap_or_else(fresh_seed)
    }

    fn in_memory_limit(&self) -> usize {
        num_samples_for(self.config.max_in_memory_secs)
    }

    fn validate(&self, request: &SynthesisRequest) -> Result<()> {
        request
            .validate(self.config.max_duration_secs)
            .inspect_err(|e| warn!(sound = %request.sound, error = %e, "rejected request"))?;
        if request.frequency_hz.is_some() && !request.sound.is_tunable() {
            debug!(sound = %request.sound, "ignoring frequency for non-tunable sound");
        }
        Ok(())
    }

    fn synth_kind(request: &SynthesisRequest) -> Result<SoundKind> {
        match request.sound {
            SoundId::Synth(kind) => Ok(kind),
            SoundId::Recorded(_) => Err(SynthError::InvalidRequest {
                reason: format!("'{}' is a recorded sound and is not synthesized", request.sound),
            }),
        }
    }

    /// Generate the normalized buffer for a request
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<Synthesis> {
        self.validate(request)?;
        let kind = Self::synth_kind(request)?;

        let num_samples = request.num_samples();
        if num_samples > self.in_memory_limit() {
            return Err(SynthError::InvalidRequest {
                reason: format!(
                    "{}s exceeds the in-memory limit of {}s; render to a file instead",
                    request.duration_secs, self.config.max_in_memory_secs
                ),
            });
        }

        let seed = self.resolve_seed(request);
        let mut rng = RandomSource::from_seed(seed);
        debug!(sound = %request.sound, num_samples, seed, "generating");

        let raw = generate(kind, request, num_samples, &mut rng, &self.config.presets)?;
        let buffer = normalize(raw);

        debug_assert_eq!(buffer.len(), num_samples);
        debug_assert!(buffer.peak() <= 1.0);

        Ok(Synthesis { buffer, seed })
    }

    /// Produce a complete WAV byte stream for a request
    ///
    /// Recorded sounds return the asset's bytes verbatim.
    pub fn render_wav(&self, request: &SynthesisRequest) -> Result<RenderedAudio> {
        if let SoundId::Recorded(asset) = request.sound {
            self.validate(request)?;
            let bytes = self.assets.load(asset)?;
            return Ok(RenderedAudio {
                bytes,
                origin: AudioOrigin::Recorded {
                    path: self.assets.path_of(asset),
                },
            });
        }

        let Synthesis { buffer, seed } = self.synthesize(request)?;
        let bytes = encode_wav(&buffer)?;
        info!(
            sound = %request.sound,
            samples = buffer.len(),
            bytes = bytes.len(),
            seed,
            "rendered"
        );
        Ok(RenderedAudio {
            bytes,
            origin: AudioOrigin::Synthesized {
                num_samples: buffer.len(),
                seed,
            },
        })
    }

    /// Render a request to a WAV file
    ///
    /// Requests beyond the in-memory limit are generated twice with the same
    /// seed: once to find the peak and once to write normalized chunks.
    pub fn render_to_file(&self, request: &SynthesisRequest, path: &Path) -> Result<RenderSummary> {
        if let SoundId::Recorded(asset) = request.sound {
            self.validate(request)?;
            let bytes = self.assets.load(asset)?;
            write_atomically(path, |tmp| Ok(tmp.write_all(&bytes)?))?;
            return Ok(RenderSummary {
                path: path.to_path_buf(),
                origin: AudioOrigin::Recorded {
                    path: self.assets.path_of(asset),
                },
                streamed: false,
            });
        }

        self.validate(request)?;
        let num_samples = request.num_samples();

        if num_samples <= self.in_memory_limit() {
            let Synthesis { buffer, seed } = self.synthesize(request)?;
            write_wav(&buffer, path)?;
            info!(sound = %request.sound, samples = buffer.len(), seed, path = %path.display(), "rendered to file");
            return Ok(RenderSummary {
                path: path.to_path_buf(),
                origin: AudioOrigin::Synthesized { num_samples, seed },
                streamed: false,
            });
        }

        let kind = Self::synth_kind(request)?;
        let seed = self.resolve_seed(request);
        let chunk_samples = self.config.chunk_samples;
        let mut rng = RandomSource::from_seed(seed);

        let source = stream_source(kind, request, num_samples, &mut rng, &self.config.presets, chunk_samples)
            .ok_or_else(|| SynthError::InvalidRequest {
                reason: format!(
                    "'{}' cannot be streamed; keep it under {}s",
                    request.sound, self.config.max_in_memory_secs
                ),
            })?;

        let peak = scan_peak(&mut source.clone(), num_samples, chunk_samples);
        debug!(sound = %request.sound, num_samples, peak, "peak pass complete");

        let written = stream_to_file(source, num_samples, chunk_samples, peak, path)?;
        info!(sound = %request.sound, samples = written, seed, path = %path.display(), "streamed to file");

        Ok(RenderSummary {
            path: path.to_path_buf(),
            origin: AudioOrigin::Synthesized { num_samples, seed },
            streamed: true,
        })
    }

    /// Render to WAV in memory and hand the bytes to an external lossy encoder
    pub fn export_lossy(
        &self,
        request: &SynthesisRequest,
        transcoder: &dyn Transcoder,
    ) -> Result<Vec<u8>> {
        let rendered = self.render_wav(request)?;
        transcoder.transcode(&rendered.bytes, &request.label())
    }

    /// Hand a WAV file already on disk to an external lossy encoder
    ///
    /// Use after [`render_to_file`](Self::render_to_file): the encoder sees
    /// exactly the bytes that were written, whatever their length.
    pub fn transcode_file(
        &self,
        wav_path: &Path,
        label: &str,
        transcoder: &dyn Transcoder,
    ) -> Result<Vec<u8>> {
        let wav = fs::read(wav_path)?;
        debug!(path = %wav_path.display(), bytes = wav.len(), label, "transcoding rendered file");
        transcoder.transcode(&wav, label)
    }
}

/// Exhaustive dispatch from a sound to its in-memory recipe
fn generate(
    kind: SoundKind,
    request: &SynthesisRequest,
    num_samples: usize,
    rng: &mut RandomSource,
    presets: &PresetTable,
) -> Result<AudioBuffer> {
    let buffer = match kind {
        SoundKind::WhiteNoise => white_noise(num_samples, rng.fork()),
        SoundKind::PinkNoise => pink_noise(num_samples, rng.fork()),
        SoundKind::BrownNoise => brown_noise(num_samples, rng.fork()),
        SoundKind::CalmingFrequency => sine_wave(
            calming_frequency(request, presets),
            presets.calming_gain,
            num_samples,
        ),
        SoundKind::Rain => rain(num_samples, rng, presets.rain)?,
        SoundKind::OceanWaves => ocean_waves(num_samples, rng, presets.ocean)?,
        SoundKind::Forest => forest(request.duration_secs, num_samples, rng, presets.forest).buffer,
        SoundKind::Preset(name) => {
            let preset = presets.tone(name);
            multi_tone(&preset.partials, preset.envelope, num_samples)
        }
    };
    Ok(buffer)
}

fn calming_frequency(request: &SynthesisRequest, presets: &PresetTable) -> f64 {
    request.frequency_hz.unwrap_or(presets.calming_default_hz)
}

/// Sample-at-a-time counterpart of [`generate`] for streamable sounds
#[derive(Debug, Clone)]
enum StreamSource {
    White(WhiteNoise),
    Pink(PinkNoise),
    Brown(BrownNoise),
    Rain(RainSource),
    Ocean(OceanSource),
    Tone(ToneOscillator),
}

impl SampleSource for StreamSource {
    fn next_sample(&mut self) -> f32 {
        match self {
            StreamSource::White(s) => s.next_sample(),
            StreamSource::Pink(s) => s.next_sample(),
            StreamSource::Brown(s) => s.next_sample(),
            StreamSource::Rain(s) => s.next_sample(),
            StreamSource::Ocean(s) => s.next_sample(),
            StreamSource::Tone(s) => s.next_sample(),
        }
    }
}

/// Forks the RNG in the same order as [`generate`] so both paths agree
fn stream_source(
    kind: SoundKind,
    request: &SynthesisRequest,
    num_samples: usize,
    rng: &mut RandomSource,
    presets: &PresetTable,
    chunk_samples: usize,
) -> Option<StreamSource> {
    match kind {
        SoundKind::WhiteNoise => Some(StreamSource::White(WhiteNoise::new(rng.fork()))),
        SoundKind::PinkNoise => Some(StreamSource::Pink(PinkNoise::new(rng.fork()))),
        SoundKind::BrownNoise => Some(StreamSource::Brown(BrownNoise::new(rng.fork()))),
        SoundKind::CalmingFrequency => Some(StreamSource::Tone(ToneOscillator::sine(
            calming_frequency(request, presets),
            presets.calming_gain,
        ))),
        SoundKind::Rain => Some(StreamSource::Rain(RainSource::new(
            num_samples,
            rng,
            presets.rain,
            chunk_samples,
        ))),
        SoundKind::OceanWaves => Some(StreamSource::Ocean(OceanSource::new(rng, presets.ocean))),
        SoundKind::Forest => None,
        SoundKind::Preset(name) => {
            let preset = presets.tone(name);
            Some(StreamSource::Tone(ToneOscillator::new(
                preset.partials.clone(),
                preset.envelope,
            )))
        }
    }
}

fn stream_to_file(
    mut source: StreamSource,
    num_samples: usize,
    chunk_samples: usize,
    peak: f32,
    path: &Path,
) -> Result<u64> {
    let mut writer = PcmStreamWriter::create(path, peak)?;
    let mut chunk = vec![0.0_f32; chunk_samples.min(num_samples)];
    let mut remaining = num_samples;

    while remaining > 0 {
        let n = remaining.min(chunk_samples);
        source.fill(&mut chunk[..n]);
        writer.write_chunk(&chunk[..n])?;
        remaining -= n;
    }

    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::{decode_wav, read_wav};
    use crate::engine::request::RecordedAsset;
    use crate::synth::TonePresetName;
    use tempfile::tempdir;
    use test_case::test_case;

    fn engine() -> Engine {
        Engine::default()
    }

    fn streaming_engine() -> Engine {
        let config = EngineConfig {
            max_in_memory_secs: 0.25,
            chunk_samples: 1000,
            ..EngineConfig::default()
        };
        Engine::new(config).unwrap()
    }

    #[test_case("white-noise" ; "white")]
    #[test_case("pink-noise" ; "pink")]
    #[test_case("brown-noise" ; "brown")]
    #[test_case("calming-frequency" ; "calming")]
    #[test_case("rain" ; "rain")]
    #[test_case("ocean-waves" ; "ocean")]
    #[test_case("forest" ; "forest")]
    #[test_case("piano" ; "piano")]
    #[test_case("singing-bowls" ; "bowls")]
    #[test_case("deep-sleep" ; "deep sleep")]
    fn test_length_and_peak(sound: &str) {
        let request = SynthesisRequest::parse(sound, 1.5).unwrap().with_seed(1);
        let out = engine().synthesize(&request).unwrap();
        assert_eq!(out.buffer.len(), 66150);
        assert_eq!(out.buffer.peak(), 1.0);
        assert_eq!(out.seed, 1);
    }

    #[test]
    fn test_same_seed_same_audio() {
        let request = SynthesisRequest::parse("rain", 0.5).unwrap().with_seed(77);
        let a = engine().synthesize(&request).unwrap();
        let b = engine().synthesize(&request).unwrap();
        assert_eq!(a.buffer, b.buffer);

        let other = engine()
            .synthesize(&request.clone().with_seed(78))
            .unwrap();
        assert_ne!(a.buffer, other.buffer);
    }

    #[test]
    fn test_default_seed_from_config() {
        let config = EngineConfig {
            default_seed: Some(5),
            ..EngineConfig::default()
        };
        let engine = Engine::new(config).unwrap();
        let request = SynthesisRequest::parse("white noise", 0.1).unwrap();
        assert_eq!(engine.synthesize(&request).unwrap().seed, 5);
    }

    #[test]
    fn test_calming_frequency_uses_requested_frequency() {
        let request = SynthesisRequest::parse("calming frequency", 1.0)
            .unwrap()
            .with_frequency(1000.0);
        let buffer = engine().synthesize(&request).unwrap().buffer;
        let spectrum = crate::engine::analysis::analyze_spectrum(buffer.samples(), 44100, 4096);
        let freq = crate::engine::analysis::dominant_frequency(&spectrum, 20.0).unwrap();
        assert!((freq - 1000.0).abs() < 11.0);
    }

    #[test]
    fn test_recorded_sound_is_not_synthesized() {
        let request = SynthesisRequest::parse("cafe", 1.0).unwrap();
        assert!(engine().synthesize(&request).unwrap_err().is_invalid_request());
    }

    #[test]
    fn test_recorded_sound_served_from_assets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("stream.wav"), b"recorded-bytes").unwrap();
        let config = EngineConfig {
            asset_dir: Some(dir.path().to_path_buf()),
            ..EngineConfig::default()
        };
        let engine = Engine::new(config).unwrap();

        let request = SynthesisRequest::new(SoundId::Recorded(RecordedAsset::Stream), 60.0);
        let rendered = engine.render_wav(&request).unwrap();
        assert_eq!(rendered.bytes, b"recorded-bytes");
        assert_eq!(
            rendered.origin,
            AudioOrigin::Recorded {
                path: dir.path().join("stream.wav")
            }
        );

        let missing = SynthesisRequest::new(SoundId::Recorded(RecordedAsset::Cafe), 60.0);
        assert_eq!(
            engine.render_wav(&missing).unwrap_err().error_code(),
            "MISSING_ASSET"
        );
    }

    #[test]
    fn test_in_memory_limit() {
        let request = SynthesisRequest::parse("white noise", 1.0).unwrap();
        let err = streaming_engine().synthesize(&request).unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test_case("white-noise" ; "white")]
    #[test_case("pink-noise" ; "pink")]
    #[test_case("brown-noise" ; "brown")]
    #[test_case("calming-frequency" ; "calming")]
    #[test_case("rain" ; "rain")]
    #[test_case("ocean-waves" ; "ocean")]
    #[test_case("guitar" ; "guitar")]
    fn test_streamed_file_matches_in_memory(sound: &str) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("streamed.wav");
        let request = SynthesisRequest::parse(sound, 1.0).unwrap().with_seed(123);

        let summary = streaming_engine().render_to_file(&request, &path).unwrap();
        assert!(summary.streamed);

        let streamed = read_wav(&path).unwrap();
        let in_memory = decode_wav(&engine().render_wav(&request).unwrap().bytes).unwrap();

        assert_eq!(streamed.header, in_memory.header);
        assert_eq!(streamed.samples.len(), 44100);
        for (a, b) in streamed.samples.iter().zip(&in_memory.samples) {
            assert!((*a as i32 - *b as i32).abs() <= 1);
        }
    }

    #[test]
    fn test_forest_is_not_streamable() {
        let dir = tempdir().unwrap();
        let request = SynthesisRequest::parse("forest", 1.0).unwrap();
        let err = streaming_engine()
            .render_to_file(&request, &dir.path().join("forest.wav"))
            .unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn test_short_render_to_file_is_not_streamed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("om.wav");
        let request = SynthesisRequest::new(
            SoundId::Synth(SoundKind::Preset(TonePresetName::Om)),
            0.5,
        );
        let summary = engine().render_to_file(&request, &path).unwrap();
        assert!(!summary.streamed);
        assert_eq!(read_wav(&path).unwrap().samples.len(), 22050);
    }

    struct Reverse;

    impl Transcoder for Reverse {
        fn transcode(&self, wav: &[u8], label: &str) -> Result<Vec<u8>> {
            assert_eq!(label, "flute-2s");
            Ok(wav.iter().rev().copied().collect())
        }
    }

    #[test]
    fn test_export_lossy_feeds_wav_verbatim() {
        let request = SynthesisRequest::parse("flute", 2.0).unwrap().with_seed(1);
        let wav = engine().render_wav(&request).unwrap().bytes;
        let out = engine().export_lossy(&request, &Reverse).unwrap();
        assert_eq!(out.len(), wav.len());
        assert_eq!(out.first(), wav.last());
    }

    /// Keeps a copy of whatever it was asked to encode
    #[derive(Default)]
    struct Capture {
        fed: std::cell::RefCell<Vec<u8>>,
    }

    impl Transcoder for Capture {
        fn transcode(&self, wav: &[u8], _label: &str) -> Result<Vec<u8>> {
            *self.fed.borrow_mut() = wav.to_vec();
            Ok(b"lossy".to_vec())
        }
    }

    #[test]
    fn test_transcode_file_feeds_written_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("white.wav");
        let request = SynthesisRequest::parse("white noise", 0.5).unwrap();

        let summary = engine().render_to_file(&request, &path).unwrap();
        let capture = Capture::default();
        let out = engine()
            .transcode_file(&summary.path, &request.label(), &capture)
            .unwrap();

        assert_eq!(out, b"lossy");
        assert_eq!(*capture.fed.borrow(), fs::read(&path).unwrap());
    }

    #[test]
    fn test_streamed_render_can_be_transcoded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pink.wav");
        let request = SynthesisRequest::parse("pink noise", 1.0).unwrap();
        let engine = streaming_engine();

        let summary = engine.render_to_file(&request, &path).unwrap();
        assert!(summary.streamed);

        let capture = Capture::default();
        engine
            .transcode_file(&summary.path, &request.label(), &capture)
            .unwrap();
        let fed = capture.fed.borrow();
        assert_eq!(*fed, fs::read(&path).unwrap());
        assert_eq!(decode_wav(&fed).unwrap().samples.len(), 44100);
    }

    #[test]
    fn test_recorded_copy_replaces_nothing_on_missing_asset() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.wav");
        fs::write(&out, b"keep").unwrap();
        let config = EngineConfig {
            asset_dir: Some(dir.path().join("empty")),
            ..EngineConfig::default()
        };
        let request = SynthesisRequest::new(SoundId::Recorded(RecordedAsset::Cafe), 10.0);
        let err = Engine::new(config).unwrap().render_to_file(&request, &out).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_ASSET");
        assert_eq!(fs::read(&out).unwrap(), b"keep");
    }

    struct Broken;

    impl Transcoder for Broken {
        fn transcode(&self, _wav: &[u8], _label: &str) -> Result<Vec<u8>> {
            Err(SynthError::Transcode {
                reason: "encoder offline".to_string(),
            })
        }
    }

    #[test]
    fn test_export_lossy_propagates_failure() {
        let request = SynthesisRequest::parse("om", 0.5).unwrap();
        let err = engine().export_lossy(&request, &Broken).unwrap_err();
        assert!(err.is_encoding_failure());
    }
}
