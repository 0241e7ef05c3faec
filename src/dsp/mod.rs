//! Signal combination stages
//!
//! Mixing and peak normalization shared by every composite recipe.

mod mix;

pub use mix::{mix, mix_normalized, normalize, normalize_in_place, scale_by_peak, MixLayer};
