use std::ops::{Index, IndexMut};

use crate::foundation::core::AssetId;
use crate::foundation::error::{BakeError, BakeResult};

/// Avatar texture slot, numbered the way wearable assets and the appearance wire format number
/// them.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum AvatarTextureIndex {
    HeadBodypaint = 0,
    UpperShirt = 1,
    LowerPants = 2,
    EyesIris = 3,
    Hair = 4,
    UpperBodypaint = 5,
    LowerBodypaint = 6,
    LowerShoes = 7,
    HeadBaked = 8,
    UpperBaked = 9,
    LowerBaked = 10,
    EyesBaked = 11,
    LowerSocks = 12,
    UpperJacket = 13,
    LowerJacket = 14,
    UpperGloves = 15,
    UpperUndershirt = 16,
    LowerUnderpants = 17,
    Skirt = 18,
    SkirtBaked = 19,
    HairBaked = 20,
    LowerAlpha = 21,
    UpperAlpha = 22,
    HeadAlpha = 23,
    EyesAlpha = 24,
    HairAlpha = 25,
    HeadTattoo = 26,
    UpperTattoo = 27,
    LowerTattoo = 28,
    HeadUniversalTattoo = 29,
    UpperUniversalTattoo = 30,
    LowerUniversalTattoo = 31,
    SkirtTattoo = 32,
    HairTattoo = 33,
    EyesTattoo = 34,
    LeftArmTattoo = 35,
    LeftLegTattoo = 36,
    Aux1Tattoo = 37,
    Aux2Tattoo = 38,
    Aux3Tattoo = 39,
    LeftArmBaked = 40,
    LeftLegBaked = 41,
    Aux1Baked = 42,
    Aux2Baked = 43,
    Aux3Baked = 44,
}

impl AvatarTextureIndex {
    /// Number of slots in an [`AvatarTextures`] array.
    pub const COUNT: usize = 45;

    /// Every slot in index order.
    pub const ALL: [Self; Self::COUNT] = {
        use AvatarTextureIndex::*;
        [
            HeadBodypaint,
            UpperShirt,
            LowerPants,
            EyesIris,
            Hair,
            UpperBodypaint,
            LowerBodypaint,
            LowerShoes,
            HeadBaked,
            UpperBaked,
            LowerBaked,
            EyesBaked,
            LowerSocks,
            UpperJacket,
            LowerJacket,
            UpperGloves,
            UpperUndershirt,
            LowerUnderpants,
            Skirt,
            SkirtBaked,
            HairBaked,
            LowerAlpha,
            UpperAlpha,
            HeadAlpha,
            EyesAlpha,
            HairAlpha,
            HeadTattoo,
            UpperTattoo,
            LowerTattoo,
            HeadUniversalTattoo,
            UpperUniversalTattoo,
            LowerUniversalTattoo,
            SkirtTattoo,
            HairTattoo,
            EyesTattoo,
            LeftArmTattoo,
            LeftLegTattoo,
            Aux1Tattoo,
            Aux2Tattoo,
            Aux3Tattoo,
            LeftArmBaked,
            LeftLegBaked,
            Aux1Baked,
            Aux2Baked,
            Aux3Baked,
        ]
    };

    /// Look up a slot by its wire number.
    pub fn from_u8(raw: u8) -> BakeResult<Self> {
        Self::ALL
            .get(usize::from(raw))
            .copied()
            .ok_or_else(|| BakeError::validation(format!("unknown avatar texture slot {raw}")))
    }

    /// Wire number of this slot.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Return `true` for slots that receive bake output rather than wearable textures.
    pub fn is_baked(self) -> bool {
        use AvatarTextureIndex::*;
        matches!(
            self,
            HeadBaked
                | UpperBaked
                | LowerBaked
                | EyesBaked
                | SkirtBaked
                | HairBaked
                | LeftArmBaked
                | LeftLegBaked
                | Aux1Baked
                | Aux2Baked
                | Aux3Baked
        )
    }
}

/// Resolved asset id per avatar texture slot.
///
/// Unset slots hold [`AssetId::DEFAULT_AVATAR_TEXTURE`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarTextures([AssetId; AvatarTextureIndex::COUNT]);

impl AvatarTextures {
    /// Array with every slot set to the default sentinel.
    pub fn new() -> Self {
        Self([AssetId::DEFAULT_AVATAR_TEXTURE; AvatarTextureIndex::COUNT])
    }

    /// Reset every slot to the default sentinel.
    pub fn reset(&mut self) {
        self.0 = [AssetId::DEFAULT_AVATAR_TEXTURE; AvatarTextureIndex::COUNT];
    }

    /// Slot ids in index order.
    pub fn as_slice(&self) -> &[AssetId] {
        &self.0
    }

    /// `(slot, id)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (AvatarTextureIndex, AssetId)> + '_ {
        AvatarTextureIndex::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

impl Default for AvatarTextures {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<AvatarTextureIndex> for AvatarTextures {
    type Output = AssetId;

    fn index(&self, slot: AvatarTextureIndex) -> &AssetId {
        &self.0[slot as usize]
    }
}

impl IndexMut<AvatarTextureIndex> for AvatarTextures {
    fn index_mut(&mut self, slot: AvatarTextureIndex) -> &mut AssetId {
        &mut self.0[slot as usize]
    }
}

impl serde::Serialize for AvatarTextures {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> serde::Deserialize<'de> for AvatarTextures {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<AssetId>::deserialize(deserializer)?;
        let len = ids.len();
        let arr: [AssetId; AvatarTextureIndex::COUNT] = ids.try_into().map_err(|_| {
            serde::de::Error::invalid_length(len, &"45 avatar texture slots")
        })?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/appearance/textures.rs"]
mod tests;
