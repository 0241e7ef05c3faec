//! Error handling for the synthesis engine
//!
//! Every failure of a request surfaces as one distinguishable variant.
//! Silence is not an error: normalization short-circuits on all-zero buffers.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum SynthError {
    // Request Errors
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Unknown sound identifier: '{name}'")]
    UnknownSound { name: String },

    #[error("Invalid duration: {duration_secs}s (must be > 0 and <= {max_secs}s)")]
    InvalidDuration { duration_secs: f64, max_secs: f64 },

    #[error("Invalid frequency: {frequency_hz} Hz (must be > 0 and below Nyquist)")]
    InvalidFrequency { frequency_hz: f64 },

    // Asset Errors
    #[error("Asset not found: {path}")]
    MissingAsset { path: String },

    // Encoding Errors
    #[error("Encoding failed: {reason}")]
    Encoding {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Transcode failed: {reason}")]
    Transcode { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SynthError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SynthError::InvalidRequest { .. } => "INVALID_REQUEST",
            SynthError::UnknownSound { .. } => "UNKNOWN_SOUND",
            SynthError::InvalidDuration { .. } => "INVALID_DURATION",
            SynthError::InvalidFrequency { .. } => "INVALID_FREQUENCY",
            SynthError::MissingAsset { .. } => "MISSING_ASSET",
            SynthError::Encoding { .. } => "ENCODING_FAILURE",
            SynthError::Transcode { .. } => "TRANSCODE_FAILURE",
            SynthError::Config { .. } => "CONFIG_ERROR",
            SynthError::Io(_) => "IO_ERROR",
            SynthError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for every variant that rejects the request before any buffer exists
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            SynthError::InvalidRequest { .. }
                | SynthError::UnknownSound { .. }
                | SynthError::InvalidDuration { .. }
                | SynthError::InvalidFrequency { .. }
        )
    }

    /// True when the container or transcode stage failed
    pub fn is_encoding_failure(&self) -> bool {
        matches!(
            self,
            SynthError::Encoding { .. } | SynthError::Transcode { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SynthError::UnknownSound { .. } => vec![
                "Run 'ambient-synth list' to see the available sounds",
                "Names are case-insensitive; spaces, dashes and underscores are interchangeable",
            ],
            SynthError::InvalidDuration { .. } => vec![
                "Use a duration greater than zero",
                "Durations are capped at 10 hours (36000 seconds)",
            ],
            SynthError::InvalidFrequency { .. } => vec![
                "Use a frequency greater than zero",
                "Frequencies must stay below 22050 Hz at a 44.1 kHz sample rate",
            ],
            SynthError::MissingAsset { .. } => vec![
                "Check the asset directory in the configuration",
                "Recorded sounds are not synthesized as a substitute",
            ],
            SynthError::Transcode { .. } => vec![
                "Check that the external encoder is installed and on PATH",
                "The WAV output is still available without transcoding",
            ],
            SynthError::Config { .. } => vec![
                "Run 'ambient-synth presets' to see the expected layout",
                "Remove the field to fall back to its default",
            ],
            _ => vec![],
        }
    }

    /// Wrap a hound failure with the stage it happened in
    pub(crate) fn encoding(context: &str, err: hound::Error) -> Self {
        SynthError::Encoding {
            reason: format!("{}: {}", context, err),
            source: Some(Box::new(err)),
        }
    }
}
