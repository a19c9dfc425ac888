use crate::appearance::textures::{AvatarTextureIndex, AvatarTextures};
use crate::bake::target::BakeTarget;
use crate::foundation::core::AssetId;
use crate::wearable::model::WearablesByType;

/// Immutable appearance snapshot produced by a successful bake.
///
/// Owns copies of everything it reports; later changes to the cache never show through.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AppearanceInfo {
    /// Current-outfit folder revision the outfit was loaded at.
    pub serial: u32,
    /// Quantized visual parameters in ascending id order.
    pub visual_params: Vec<u8>,
    /// Avatar height in meters.
    pub avatar_height: f32,
    /// Resolved texture per avatar slot, baked slots included.
    pub avatar_textures: AvatarTextures,
    /// Worn wearables grouped by type.
    pub wearables: WearablesByType,
}

impl AppearanceInfo {
    /// Baked texture id for `target`; the default sentinel when the target was skipped.
    pub fn baked_texture(&self, target: BakeTarget) -> AssetId {
        self.avatar_textures[target.baked_slot()]
    }

    /// Texture id in `slot`.
    pub fn texture(&self, slot: AvatarTextureIndex) -> AssetId {
        self.avatar_textures[slot]
    }
}
