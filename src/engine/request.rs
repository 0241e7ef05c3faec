//! Synthesis requests and sound identifiers
//!
//! Identifiers form a closed enum; dispatch from an identifier to its recipe
//! is an exhaustive match in [`crate::engine::render`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::buffer::{num_samples_for, SAMPLE_RATE};
use crate::error::{Result, SynthError};
use crate::synth::TonePresetName;

/// Sounds produced by synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    WhiteNoise,
    PinkNoise,
    BrownNoise,
    /// Single sine at a caller-chosen frequency
    CalmingFrequency,
    Rain,
    OceanWaves,
    Forest,
    /// Instrument stand-ins and the meditation library
    Preset(TonePresetName),
}

/// Sounds served from pre-recorded files instead of synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordedAsset {
    Thunderstorm,
    Campfire,
    Cafe,
    Stream,
}

impl RecordedAsset {
    pub const ALL: [RecordedAsset; 4] = [
        RecordedAsset::Thunderstorm,
        RecordedAsset::Campfire,
        RecordedAsset::Cafe,
        RecordedAsset::Stream,
    ];

    /// File name inside the asset directory
    pub fn file_name(&self) -> &'static str {
        match self {
            RecordedAsset::Thunderstorm => "thunderstorm.wav",
            RecordedAsset::Campfire => "campfire.wav",
            RecordedAsset::Cafe => "cafe.wav",
            RecordedAsset::Stream => "stream.wav",
        }
    }
}

/// Any identifier a request may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SoundId {
    Synth(SoundKind),
    Recorded(RecordedAsset),
}

impl SoundId {
    /// Every identifier, in listing order
    pub fn all() -> Vec<SoundId> {
        let mut ids = vec![
            SoundId::Synth(SoundKind::WhiteNoise),
            SoundId::Synth(SoundKind::PinkNoise),
            SoundId::Synth(SoundKind::BrownNoise),
            SoundId::Synth(SoundKind::CalmingFrequency),
            SoundId::Synth(SoundKind::Rain),
            SoundId::Synth(SoundKind::OceanWaves),
            SoundId::Synth(SoundKind::Forest),
        ];
        ids.extend(
            TonePresetName::ALL
                .iter()
                .map(|&p| SoundId::Synth(SoundKind::Preset(p))),
        );
        ids.extend(RecordedAsset::ALL.iter().map(|&a| SoundId::Recorded(a)));
        ids
    }

    /// Canonical kebab-case name
    pub fn name(&self) -> &'static str {
        match self {
            SoundId::Synth(SoundKind::WhiteNoise) => "white-noise",
            SoundId::Synth(SoundKind::PinkNoise) => "pink-noise",
            SoundId::Synth(SoundKind::BrownNoise) => "brown-noise",
            SoundId::Synth(SoundKind::CalmingFrequency) => "calming-frequency",
            SoundId::Synth(SoundKind::Rain) => "rain",
            SoundId::Synth(SoundKind::OceanWaves) => "ocean-waves",
            SoundId::Synth(SoundKind::Forest) => "forest",
            SoundId::Synth(SoundKind::Preset(p)) => p.name(),
            SoundId::Recorded(RecordedAsset::Thunderstorm) => "thunderstorm",
            SoundId::Recorded(RecordedAsset::Campfire) => "campfire",
            SoundId::Recorded(RecordedAsset::Cafe) => "cafe",
            SoundId::Recorded(RecordedAsset::Stream) => "stream",
        }
    }

    /// Short category label for listings
    pub fn category(&self) -> &'static str {
        match self {
            SoundId::Synth(SoundKind::WhiteNoise)
            | SoundId::Synth(SoundKind::PinkNoise)
            | SoundId::Synth(SoundKind::BrownNoise) => "noise",
            SoundId::Synth(SoundKind::CalmingFrequency) => "tone",
            SoundId::Synth(SoundKind::Rain)
            | SoundId::Synth(SoundKind::OceanWaves)
            | SoundId::Synth(SoundKind::Forest) => "nature",
            SoundId::Synth(SoundKind::Preset(p)) if p.is_instrument() => "instrument",
            SoundId::Synth(SoundKind::Preset(_)) => "meditation",
            SoundId::Recorded(_) => "recorded",
        }
    }

    /// True if the sound accepts a frequency parameter
    pub fn is_tunable(&self) -> bool {
        matches!(self, SoundId::Synth(SoundKind::CalmingFrequency))
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundId {
    type Err = SynthError;

    /// Case-insensitive; spaces, underscores and dashes are interchangeable
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '_' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        SoundId::all()
            .into_iter()
            .find(|id| id.name() == key)
            .ok_or_else(|| SynthError::UnknownSound {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for SoundId {
    type Error = SynthError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SoundId> for String {
    fn from(id: SoundId) -> Self {
        id.name().to_string()
    }
}

/// One immutable synthesis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub sound: SoundId,
    pub duration_secs: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SynthesisRequest {
    pub fn new(sound: SoundId, duration_secs: f64) -> Self {
        Self {
            sound,
            duration_secs,
            frequency_hz: None,
            seed: None,
        }
    }

    /// Parse the identifier and build a request in one step
    pub fn parse(sound: &str, duration_secs: f64) -> Result<Self> {
        Ok(Self::new(sound.parse()?, duration_secs))
    }

    pub fn with_frequency(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = Some(frequency_hz);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Short name handed to external encoders, e.g. `rain-60s`
    pub fn label(&self) -> String {
        format!("{}-{}s", self.sound, self.duration_secs)
    }

    /// Output length: `round(duration_secs * 44100)`
    pub fn num_samples(&self) -> usize {
        num_samples_for(self.duration_secs)
    }

    /// Check duration and frequency bounds
    pub fn validate(&self, max_duration_secs: f64) -> Result<()> {
        if !(self.duration_secs > 0.0
            && self.duration_secs.is_finite()
            && self.duration_secs <= max_duration_secs)
        {
            return Err(SynthError::InvalidDuration {
                duration_secs: self.duration_secs,
                max_secs: max_duration_secs,
            });
        }

        if let Some(frequency_hz) = self.frequency_hz {
            let nyquist = SAMPLE_RATE as f64 / 2.0;
            if !(frequency_hz > 0.0 && frequency_hz < nyquist) {
                return Err(SynthError::InvalidFrequency { frequency_hz });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("White Noise", SoundId::Synth(SoundKind::WhiteNoise) ; "display name")]
    #[test_case("white_noise", SoundId::Synth(SoundKind::WhiteNoise) ; "snake case")]
    #[test_case("RAIN", SoundId::Synth(SoundKind::Rain) ; "upper case")]
    #[test_case("Singing Bowls", SoundId::Synth(SoundKind::Preset(TonePresetName::SingingBowls)) ; "preset")]
    #[test_case(" campfire ", SoundId::Recorded(RecordedAsset::Campfire) ; "recorded with padding")]
    fn test_parse_identifiers(input: &str, expected: SoundId) {
        assert_eq!(input.parse::<SoundId>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_identifier() {
        let err = "whale song".parse::<SoundId>().unwrap_err();
        assert!(err.is_invalid_request());
        assert_eq!(err.error_code(), "UNKNOWN_SOUND");
    }

    #[test]
    fn test_names_roundtrip_and_are_unique() {
        let all = SoundId::all();
        for id in &all {
            assert_eq!(id.name().parse::<SoundId>().unwrap(), *id);
        }
        let mut names: Vec<_> = all.iter().map(|id| id.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-1.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    #[test_case(36000.5 ; "over ten hours")]
    fn test_invalid_durations(duration: f64) {
        let req = SynthesisRequest::new(SoundId::Synth(SoundKind::WhiteNoise), duration);
        let err = req.validate(36000.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DURATION");
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-440.0 ; "negative")]
    #[test_case(22050.0 ; "nyquist")]
    fn test_invalid_frequencies(frequency: f64) {
        let req = SynthesisRequest::new(SoundId::Synth(SoundKind::CalmingFrequency), 1.0)
            .with_frequency(frequency);
        let err = req.validate(36000.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FREQUENCY");
    }

    #[test]
    fn test_request_json() {
        let req = SynthesisRequest::parse("ocean waves", 30.0)
            .unwrap()
            .with_seed(7);
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"sound":"ocean-waves","duration_secs":30.0,"seed":7}"#);

        let back: SynthesisRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);

        let bad = serde_json::from_str::<SynthesisRequest>(r#"{"sound":"lava","duration_secs":1.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(SynthesisRequest::parse("Ocean Waves", 60.0).unwrap().label(), "ocean-waves-60s");
        assert_eq!(SynthesisRequest::parse("om", 2.5).unwrap().label(), "om-2.5s");
    }

    #[test]
    fn test_num_samples() {
        let req = SynthesisRequest::parse("rain", 2.0).unwrap();
        assert_eq!(req.num_samples(), 88200);
    }
}
