//! Preset table for instrument stand-ins, meditation drones and textures
//!
//! The numbers here are sine-based approximations, not physical models.
//! The whole table is serde-serializable so a JSON config can override any
//! entry; omitted entries keep their defaults.

use serde::{Deserialize, Serialize};

use super::tone::{EnvelopeCurve, Partial};
use crate::error::{Result, SynthError};

/// Named tonal presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TonePresetName {
    Piano,
    Guitar,
    Flute,
    SingingBowls,
    Om,
    DeepSleep,
    Healing,
    Focus,
    Drone,
}

impl TonePresetName {
    pub const ALL: [TonePresetName; 9] = [
        TonePresetName::Piano,
        TonePresetName::Guitar,
        TonePresetName::Flute,
        TonePresetName::SingingBowls,
        TonePresetName::Om,
        TonePresetName::DeepSleep,
        TonePresetName::Healing,
        TonePresetName::Focus,
        TonePresetName::Drone,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TonePresetName::Piano => "piano",
            TonePresetName::Guitar => "guitar",
            TonePresetName::Flute => "flute",
            TonePresetName::SingingBowls => "singing-bowls",
            TonePresetName::Om => "om",
            TonePresetName::DeepSleep => "deep-sleep",
            TonePresetName::Healing => "healing",
            TonePresetName::Focus => "focus",
            TonePresetName::Drone => "drone",
        }
    }

    /// Instrument stand-ins vs. the meditation library
    pub fn is_instrument(&self) -> bool {
        matches!(
            self,
            TonePresetName::Piano
                | TonePresetName::Guitar
                | TonePresetName::Flute
                | TonePresetName::SingingBowls
        )
    }
}

/// 1–3 partials with an optional envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonePreset {
    pub partials: Vec<Partial>,
    #[serde(default)]
    pub envelope: EnvelopeCurve,
}

impl TonePreset {
    fn new(partials: &[(f64, f64)], envelope: EnvelopeCurve) -> Self {
        Self {
            partials: partials
                .iter()
                .map(|&(frequency_hz, gain)| Partial::new(frequency_hz, gain))
                .collect(),
            envelope,
        }
    }

    fn decaying(partials: &[(f64, f64)], rate: f64, retrigger_secs: f64) -> Self {
        Self::new(
            partials,
            EnvelopeCurve::ExponentialDecay {
                rate,
                retrigger_secs: Some(retrigger_secs),
            },
        )
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.partials.is_empty() || self.partials.len() > 3 {
            return Err(SynthError::Config {
                reason: format!(
                    "preset '{}' must have 1-3 partials, found {}",
                    name,
                    self.partials.len()
                ),
            });
        }
        for partial in &self.partials {
            if !(partial.frequency_hz > 0.0 && partial.frequency_hz.is_finite()) {
                return Err(SynthError::Config {
                    reason: format!(
                        "preset '{}' has non-positive frequency {}",
                        name, partial.frequency_hz
                    ),
                });
            }
        }
        if let EnvelopeCurve::ExponentialDecay { rate, .. } = self.envelope {
            if rate < 0.0 {
                return Err(SynthError::Config {
                    reason: format!("preset '{}' has a negative decay rate", name),
                });
            }
        }
        Ok(())
    }
}

/// Rain = white·w + brown·b
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainMix {
    pub white_gain: f32,
    pub brown_gain: f32,
}

/// Ocean = slow sine swell + pink noise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OceanMix {
    pub swell_hz: f64,
    /// Peak of the swell sine before mixing
    #[serde(default = "default_sine_amplitude")]
    pub swell_amplitude: f64,
    pub swell_gain: f32,
    pub pink_gain: f32,
}

/// Peak of every sine layer inside a composite
pub const SINE_AMPLITUDE: f64 = 0.5;

fn default_sine_amplitude() -> f64 {
    SINE_AMPLITUDE
}

/// Forest = white noise with decaying chirps at random offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestChirps {
    pub chirp_hz: f64,
    pub chirp_secs: f64,
    pub decay_rate: f64,
    pub chirp_gain: f64,
    /// Average spacing: `round(duration / secs_per_chirp)` chirps are placed
    pub secs_per_chirp: f64,
}

/// Every tunable number used by the recipes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetTable {
    pub calming_gain: f64,
    pub calming_default_hz: f64,
    pub piano: TonePreset,
    pub guitar: TonePreset,
    pub flute: TonePreset,
    pub singing_bowls: TonePreset,
    pub om: TonePreset,
    pub deep_sleep: TonePreset,
    pub healing: TonePreset,
    pub focus: TonePreset,
    pub drone: TonePreset,
    pub rain: RainMix,
    pub ocean: OceanMix,
    pub forest: ForestChirps,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self {
            calming_gain: SINE_AMPLITUDE,
            calming_default_hz: 440.0,
            piano: TonePreset::decaying(&[(261.63, 0.5), (523.25, 0.3), (783.99, 0.2)], 3.0, 2.0),
            guitar: TonePreset::decaying(&[(196.00, 0.5), (392.00, 0.3), (587.33, 0.2)], 4.0, 1.5),
            flute: TonePreset::new(&[(440.0, 0.5), (880.0, 0.2)], EnvelopeCurve::Constant),
            singing_bowls: TonePreset::decaying(&[(220.0, 0.5), (660.0, 0.3), (1100.0, 0.2)], 0.5, 8.0),
            om: TonePreset::new(&[(136.1, 0.5)], EnvelopeCurve::Constant),
            deep_sleep: TonePreset::new(&[(100.0, 0.4), (104.0, 0.4)], EnvelopeCurve::Constant),
            healing: TonePreset::new(&[(528.0, 0.5), (264.0, 0.3)], EnvelopeCurve::Constant),
            focus: TonePreset::new(&[(200.0, 0.4), (210.0, 0.4)], EnvelopeCurve::Constant),
            drone: TonePreset::new(&[(55.0, 0.5), (110.0, 0.3), (165.0, 0.2)], EnvelopeCurve::Constant),
            rain: RainMix {
                white_gain: 0.7,
                brown_gain: 0.3,
            },
            ocean: OceanMix {
                swell_hz: 0.1,
                swell_amplitude: SINE_AMPLITUDE,
                swell_gain: 0.6,
                pink_gain: 0.4,
            },
            forest: ForestChirps {
                chirp_hz: 2000.0,
                chirp_secs: 0.1,
                decay_rate: 5.0,
                chirp_gain: SINE_AMPLITUDE,
                secs_per_chirp: 2.0,
            },
        }
    }
}

impl PresetTable {
    /// Look up a tonal preset
    pub fn tone(&self, name: TonePresetName) -> &TonePreset {
        match name {
            TonePresetName::Piano => &self.piano,
            TonePresetName::Guitar => &self.guitar,
            TonePresetName::Flute => &self.flute,
            TonePresetName::SingingBowls => &self.singing_bowls,
            TonePresetName::Om => &self.om,
            TonePresetName::DeepSleep => &self.deep_sleep,
            TonePresetName::Healing => &self.healing,
            TonePresetName::Focus => &self.focus,
            TonePresetName::Drone => &self.drone,
        }
    }

    /// Reject tables that would produce invalid audio
    pub fn validate(&self) -> Result<()> {
        for name in TonePresetName::ALL {
            self.tone(name).validate(name.name())?;
        }
        if !(self.calming_default_hz > 0.0) {
            return Err(SynthError::Config {
                reason: "calming_default_hz must be positive".to_string(),
            });
        }
        if !(self.ocean.swell_hz > 0.0 && self.ocean.swell_amplitude > 0.0) {
            return Err(SynthError::Config {
                reason: "ocean swell_hz and swell_amplitude must be positive".to_string(),
            });
        }
        let forest = &self.forest;
        if !(forest.chirp_secs > 0.0 && forest.secs_per_chirp > 0.0 && forest.chirp_hz > 0.0) {
            return Err(SynthError::Config {
                reason: "forest chirp_hz, chirp_secs and secs_per_chirp must be positive"
                    .to_string(),
            });
        }
        Ok(())
    }
}
