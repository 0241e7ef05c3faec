//! PCM encoding and WAV container I/O
//!
//! Normalized float samples become 16-bit signed PCM via
//! `round(sample * 32767)`, clamped to the i16 range, and are written as a
//! canonical mono RIFF/WAV container. Encoding performs no further signal
//! processing.
//!
//! Files are written to a temporary sibling and moved over the destination
//! only after the container is finalized, so a failed encode leaves no
//! partial file behind.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tempfile::{NamedTempFile, TempPath};

use crate::dsp::scale_by_peak;
use crate::engine::buffer::{AudioBuffer, SAMPLE_RATE};
use crate::error::{Result, SynthError};

/// Bit depth of every container the engine writes
pub const BITS_PER_SAMPLE: u16 = 16;

/// Size of the canonical RIFF/WAVE header preceding the PCM payload
pub const WAV_HEADER_BYTES: usize = 44;

/// Container layout for engine output
pub fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Convert one normalized sample to 16-bit PCM
///
/// Samples marginally above 1.0 from float rounding clamp to the i16 range.
#[inline]
pub fn to_pcm16(sample: f32) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Encode a buffer as an in-memory WAV byte stream
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::with_capacity(
        WAV_HEADER_BYTES + buffer.len() * std::mem::size_of::<i16>(),
    ));
    write_container(&mut cursor, buffer)?;
    Ok(cursor.into_inner())
}

/// Encode a buffer as a WAV file at `path`
pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    write_atomically(path, |tmp| {
        let mut out = BufWriter::new(tmp);
        write_container(&mut out, buffer)?;
        out.flush()?;
        Ok(())
    })
}

fn sibling_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Run `write` against a temporary file next to `path`, then move it into place
///
/// On error the temporary file is removed and `path` is left untouched.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let mut tmp = NamedTempFile::new_in(sibling_dir(path))?;
    write(&mut tmp)?;
    tmp.persist(path).map_err(|e| SynthError::Io(e.error))?;
    Ok(())
}

fn write_container<W: Write + Seek>(out: &mut W, buffer: &AudioBuffer) -> Result<()> {
    let mut writer = WavWriter::new(out, wav_spec(buffer.sample_rate()))
        .map_err(|e| SynthError::encoding("Failed to write WAV header", e))?;

    write_pcm(&mut writer, buffer.samples(), 1.0)?;

    writer
        .finalize()
        .map_err(|e| SynthError::encoding("Failed to finalize WAV container", e))
}

/// Write samples divided by `peak` (when non-zero) as 16-bit PCM
fn write_pcm<W: Write + Seek>(writer: &mut WavWriter<W>, samples: &[f32], peak: f32) -> Result<()> {
    let mut pcm = writer.get_i16_writer(samples.len() as u32);
    for &sample in samples {
        pcm.write_sample(to_pcm16(scale_by_peak(sample, peak)));
    }
    pcm.flush()
        .map_err(|e| SynthError::encoding("Failed to write PCM samples", e))
}

// ============================================================================
// Streaming writer
// ============================================================================

/// Chunk-at-a-time WAV file writer for renders that do not fit in memory
///
/// Each chunk is divided by the render's global peak before conversion, so
/// the file matches what the in-memory path would have encoded. Nothing
/// appears at the destination until [`finalize`](Self::finalize) succeeds;
/// dropping the writer early discards the partial file.
pub struct PcmStreamWriter {
    writer: WavWriter<BufWriter<File>>,
    temp_path: TempPath,
    dest: PathBuf,
    peak: f32,
    samples_written: u64,
}

impl PcmStreamWriter {
    /// Create a temporary sibling of `path` and write a provisional header
    pub fn create(path: &Path, peak: f32) -> Result<Self> {
        let (file, temp_path) = NamedTempFile::new_in(sibling_dir(path))?.into_parts();
        let writer = WavWriter::new(BufWriter::new(file), wav_spec(SAMPLE_RATE))
            .map_err(|e| SynthError::encoding("Failed to create WAV file", e))?;
        Ok(Self {
            writer,
            temp_path,
            dest: path.to_path_buf(),
            peak,
            samples_written: 0,
        })
    }

    /// Append one chunk of unnormalized samples
    pub fn write_chunk(&mut self, samples: &[f32]) -> Result<()> {
        write_pcm(&mut self.writer, samples, self.peak)?;
        self.samples_written += samples.len() as u64;
        Ok(())
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Patch the RIFF and data chunk sizes and move the file into place
    pub fn finalize(self) -> Result<u64> {
        let Self {
            writer,
            temp_path,
            dest,
            samples_written,
            ..
        } = self;
        writer
            .finalize()
            .map_err(|e| SynthError::encoding("Failed to finalize WAV container", e))?;
        temp_path
            .persist(&dest)
            .map_err(|e| SynthError::Io(e.error))?;
        Ok(samples_written)
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Header fields of a decoded container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub num_samples: u32,
}

/// A decoded 16-bit mono container
#[derive(Debug, Clone)]
pub struct DecodedWav {
    pub header: WavHeader,
    pub samples: Vec<i16>,
}

impl DecodedWav {
    /// Convert the payload back to floats in [-1, 1]
    pub fn to_buffer(&self) -> Result<AudioBuffer> {
        let samples = self.samples.iter().map(|&s| s as f32 / 32767.0).collect();
        AudioBuffer::with_sample_rate(samples, self.header.sample_rate)
    }
}

/// Decode a WAV byte stream produced by [`encode_wav`]
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedWav> {
    let reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| SynthError::encoding("Failed to parse WAV header", e))?;
    read_pcm16(reader)
}

/// Decode a WAV file produced by [`write_wav`] or [`PcmStreamWriter`]
pub fn read_wav(path: &Path) -> Result<DecodedWav> {
    let file = File::open(path)?;
    let reader = WavReader::new(BufReader::new(file))
        .map_err(|e| SynthError::encoding("Failed to parse WAV header", e))?;
    read_pcm16(reader)
}

fn read_pcm16<R: std::io::Read>(mut reader: WavReader<R>) -> Result<DecodedWav> {
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != BITS_PER_SAMPLE {
        return Err(SynthError::Encoding {
            reason: format!(
                "expected 16-bit integer PCM, found {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            ),
            source: None,
        });
    }

    let header = WavHeader {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        num_samples: reader.duration(),
    };

    let samples = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()
        .map_err(|e| SynthError::encoding("Failed to read 16-bit samples", e))?;

    Ok(DecodedWav { header, samples })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    #[test_case(0.0, 0 ; "zero")]
    #[test_case(1.0, 32767 ; "full scale")]
    #[test_case(-1.0, -32767 ; "negative full scale")]
    #[test_case(1.00001, 32767 ; "marginally over clamps")]
    #[test_case(-1.5, -32768 ; "far under clamps")]
    #[test_case(0.5, 16384 ; "half rounds to nearest")]
    fn test_to_pcm16(sample: f32, expected: i16) {
        assert_eq!(to_pcm16(sample), expected);
    }

    #[test]
    fn test_encode_header_and_payload() {
        let buffer = AudioBuffer::from_samples(vec![0.0, 0.5, -0.5, 1.0, -1.0]);
        let bytes = encode_wav(&buffer).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), WAV_HEADER_BYTES + 10);

        let decoded = decode_wav(&bytes).unwrap();
        assert_eq!(decoded.header.sample_rate, 44100);
        assert_eq!(decoded.header.channels, 1);
        assert_eq!(decoded.header.bits_per_sample, 16);
        assert_eq!(decoded.header.num_samples, 5);
        assert_eq!(decoded.samples, vec![0, 16384, -16384, 32767, -32767]);
    }

    #[test]
    fn test_encode_empty_buffer() {
        let bytes = encode_wav(&AudioBuffer::silence(0)).unwrap();
        let decoded = decode_wav(&bytes).unwrap();
        assert!(decoded.samples.is_empty());
    }

    #[test]
    fn test_write_and_read_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let buffer = AudioBuffer::from_samples(vec![0.25; 100]);

        write_wav(&buffer, &path).unwrap();
        let decoded = read_wav(&path).unwrap();
        assert_eq!(decoded.samples.len(), 100);
        assert!(decoded.samples.iter().all(|&s| s == to_pcm16(0.25)));
    }

    #[test]
    fn test_stream_writer_applies_peak() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stream.wav");

        let mut writer = PcmStreamWriter::create(&path, 2.0).unwrap();
        writer.write_chunk(&[2.0, -1.0]).unwrap();
        writer.write_chunk(&[0.0]).unwrap();
        assert_eq!(writer.finalize().unwrap(), 3);

        let decoded = read_wav(&path).unwrap();
        assert_eq!(decoded.samples, vec![32767, to_pcm16(-0.5), 0]);
    }

    #[test]
    fn test_decode_garbage_is_encoding_failure() {
        let err = decode_wav(b"not a wav file").unwrap_err();
        assert!(err.is_encoding_failure());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_wav(&dir.path().join("nope.wav")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(matches!(err, SynthError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let result = write_atomically(&path, |tmp| {
            tmp.write_all(b"RIFF\0\0\0\0WAVE")?;
            Err(SynthError::Encoding {
                reason: "disk full".to_string(),
                source: None,
            })
        });

        assert!(result.unwrap_err().is_encoding_failure());
        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_failed_write_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");
        std::fs::write(&path, b"previous").unwrap();

        let result = write_atomically(&path, |_| {
            Err(SynthError::Encoding {
                reason: "interrupted".to_string(),
                source: None,
            })
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"previous");
        assert_eq!(entries(dir.path()), 1);
    }

    #[test]
    fn test_abandoned_stream_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.wav");

        let mut writer = PcmStreamWriter::create(&path, 1.0).unwrap();
        writer.write_chunk(&[0.5; 64]).unwrap();
        assert!(!path.exists());
        drop(writer);

        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_write_wav_relative_file_name() {
        assert_eq!(sibling_dir(Path::new("out.wav")), Path::new("."));
        assert_eq!(sibling_dir(Path::new("a/out.wav")), Path::new("a"));
    }
}
