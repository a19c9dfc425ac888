use std::collections::BTreeMap;

use crate::foundation::math::unit_to_u8;
use crate::wearable::model::{Outfit, items_by_ordinal};

/// Shape body height.
pub const SHAPE_HEIGHT: u32 = 33;
/// Shoe heel height.
pub const SHOES_HEEL_HEIGHT: u32 = 198;
/// Shoe platform height.
pub const SHOES_PLATFORM_HEIGHT: u32 = 503;
/// Shape head size.
pub const SHAPE_HEAD_SIZE: u32 = 682;
/// Shape leg length.
pub const SHAPE_LEG_LENGTH: u32 = 692;
/// Shape neck length.
pub const SHAPE_NECK_LENGTH: u32 = 756;

/// Shortest possible avatar, in meters.
const MIN_AVATAR_HEIGHT: f32 = 1.23077;

// (param id, meters contributed at full scale)
const HEIGHT_TERMS: [(u32, f32); 6] = [
    (SHAPE_HEIGHT, 0.516945),
    (SHAPE_HEAD_SIZE, 0.072514),
    (SHAPE_LEG_LENGTH, 0.3836),
    (SHOES_PLATFORM_HEIGHT, 0.08),
    (SHOES_HEEL_HEIGHT, 0.07),
    (SHAPE_NECK_LENGTH, 0.076),
];

/// Quantized visual parameters of a whole outfit, keyed by parameter id.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VisualParams(BTreeMap<u32, u8>);

impl VisualParams {
    /// Collect every wearable's parameters in ascending ordinal order, so the highest ordinal
    /// wins for a parameter set by several items.
    pub fn from_outfit(outfit: &Outfit) -> Self {
        let mut out = BTreeMap::new();
        for item in items_by_ordinal(outfit) {
            for (&id, &value) in &item.wearable.params {
                out.insert(id, unit_to_u8(value));
            }
        }
        Self(out)
    }

    /// Quantized value of parameter `id`.
    pub fn get(&self, id: u32) -> Option<u8> {
        self.0.get(&id).copied()
    }

    /// Number of parameters present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` when no wearable set any parameter.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameter bytes in ascending id order.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.values().copied().collect()
    }

    /// Avatar height in meters derived from the shape and shoe parameters. Missing parameters
    /// count as zero.
    pub fn avatar_height(&self) -> f32 {
        HEIGHT_TERMS
            .iter()
            .fold(MIN_AVATAR_HEIGHT, |acc, &(id, scale)| {
                acc + scale * f32::from(self.get(id).unwrap_or(0)) / 255.0
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/wearable/params.rs"]
mod tests;
