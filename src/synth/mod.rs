//! Signal generators
//!
//! Leaf generators (noise, tones) and the composite recipes built on them.

pub mod noise;
pub mod presets;
pub mod random;
pub mod source;
pub mod textures;
pub mod tone;

pub use noise::{
    brown_noise, pink_filter, pink_noise, white_noise, BrownNoise, FilterState, PinkFilter,
    PinkNoise, WhiteNoise,
};
pub use presets::{PresetTable, TonePreset, TonePresetName};
pub use random::RandomSource;
pub use source::SampleSource;
pub use textures::{forest, ocean_waves, rain, ForestRender, OceanSource, RainSource};
pub use tone::{multi_tone, sine_wave, EnvelopeCurve, Partial, ToneOscillator};
