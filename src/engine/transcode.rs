//! Lossy export through an external encoder
//!
//! The engine treats transcoding as an opaque function: WAV bytes and a
//! label in, compressed bytes out. The WAV stream is passed verbatim.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::error::{Result, SynthError};

/// Converts a WAV byte stream into a compressed format
pub trait Transcoder {
    fn transcode(&self, wav: &[u8], label: &str) -> Result<Vec<u8>>;
}

/// Pipes WAV bytes through an external program's stdin/stdout
///
/// `{label}` in any argument is replaced with the request label.
#[derive(Debug, Clone)]
pub struct CommandTranscoder {
    program: String,
    args: Vec<String>,
}

impl CommandTranscoder {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `ffmpeg` reading WAV on stdin and writing MP3 on stdout
    pub fn ffmpeg_mp3() -> Self {
        let args = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "wav",
            "-i",
            "pipe:0",
            "-metadata",
            "title={label}",
            "-f",
            "mp3",
            "pipe:1",
        ];
        Self::new("ffmpeg", args.iter().map(|a| a.to_string()).collect())
    }

    fn expanded_args(&self, label: &str) -> Vec<String> {
        self.args.iter().map(|a| a.replace("{label}", label)).collect()
    }
}

impl Transcoder for CommandTranscoder {
    fn transcode(&self, wav: &[u8], label: &str) -> Result<Vec<u8>> {
        debug!(program = %self.program, label, input_bytes = wav.len(), "starting transcoder");

        let mut child = Command::new(&self.program)
            .args(self.expanded_args(label))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SynthError::Transcode {
                reason: format!("failed to start '{}': {}", self.program, e),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| SynthError::Transcode {
            reason: "transcoder stdin unavailable".to_string(),
        })?;

        // Feed stdin on a separate thread so a full stdout pipe cannot deadlock us
        let input = wav.to_vec();
        let feeder = thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output().map_err(|e| SynthError::Transcode {
            reason: format!("failed waiting for '{}': {}", self.program, e),
        })?;

        let fed = feeder.join();

        // Exit status first: an early exit also breaks the stdin pipe
        if !output.status.success() {
            return Err(SynthError::Transcode {
                reason: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        match fed {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(SynthError::Transcode {
                    reason: format!("failed to feed '{}': {}", self.program, e),
                })
            }
            Err(_) => {
                return Err(SynthError::Transcode {
                    reason: "transcoder input thread panicked".to_string(),
                })
            }
        }

        if output.stdout.is_empty() {
            return Err(SynthError::Transcode {
                reason: format!("'{}' produced no output", self.program),
            });
        }

        info!(label, output_bytes = output.stdout.len(), "transcoded");
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_substitution() {
        let transcoder = CommandTranscoder::ffmpeg_mp3();
        let args = transcoder.expanded_args("rain-60s");
        assert!(args.contains(&"title=rain-60s".to_string()));
        assert!(!args.iter().any(|a| a.contains("{label}")));
    }

    #[test]
    fn test_missing_program_is_transcode_failure() {
        let transcoder = CommandTranscoder::new("definitely-not-an-encoder-binary", vec![]);
        let err = transcoder.transcode(b"RIFF", "x").unwrap_err();
        assert_eq!(err.error_code(), "TRANSCODE_FAILURE");
        assert!(err.is_encoding_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_passthrough_program() {
        let transcoder = CommandTranscoder::new("cat", vec![]);
        let out = transcoder.transcode(b"RIFF1234WAVE", "label").unwrap();
        assert_eq!(out, b"RIFF1234WAVE");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program() {
        let transcoder = CommandTranscoder::new("false", vec![]);
        assert!(transcoder.transcode(b"RIFF", "label").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_reports_encoder_stderr() {
        let transcoder = CommandTranscoder::new(
            "sh",
            vec!["-c".to_string(), "echo unsupported input >&2; exit 3".to_string()],
        );
        let wav = vec![0u8; 4 * 1024 * 1024];
        let err = transcoder.transcode(&wav, "label").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unsupported input"), "{}", message);
        assert!(!message.contains("failed to feed"), "{}", message);
    }
}
