//! Audio Engine Module
//!
//! Everything between a request and its encoded bytes:
//! - Sample buffers and the fixed output format
//! - Request parsing and validation
//! - The render pipeline, in memory or streamed to disk
//! - WAV encoding and decoding
//! - Recorded asset fallback and lossy export

pub mod analysis;
pub mod assets;
pub mod buffer;
pub mod io;
pub mod render;
pub mod request;
pub mod transcode;

pub use assets::AssetLibrary;
pub use buffer::{num_samples_for, AudioBuffer, MAX_DURATION_SECS, SAMPLE_RATE};
pub use io::{decode_wav, encode_wav, read_wav, write_wav, DecodedWav, PcmStreamWriter, WavHeader};
pub use render::{AudioOrigin, Engine, RenderSummary, RenderedAudio, Synthesis};
pub use request::{RecordedAsset, SoundId, SoundKind, SynthesisRequest};
pub use transcode::{CommandTranscoder, Transcoder};
