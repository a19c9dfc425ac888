use crate::appearance::textures::AvatarTextureIndex;
use crate::foundation::core::Size;

/// Output channel of a bake: one composite texture per body region.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BakeTarget {
    /// Head.
    Head,
    /// Upper body.
    UpperBody,
    /// Lower body.
    LowerBody,
    /// Eyes.
    Eyes,
    /// Hair.
    Hair,
    /// Skirt.
    Skirt,
    /// Left arm auxiliary.
    LeftArm,
    /// Left leg auxiliary.
    LeftLeg,
    /// Auxiliary channel 1.
    Aux1,
    /// Auxiliary channel 2.
    Aux2,
    /// Auxiliary channel 3.
    Aux3,
}

impl BakeTarget {
    /// Every target in processing order.
    pub const ALL: [Self; 11] = [
        Self::Head,
        Self::UpperBody,
        Self::LowerBody,
        Self::Eyes,
        Self::Hair,
        Self::Skirt,
        Self::LeftArm,
        Self::LeftLeg,
        Self::Aux1,
        Self::Aux2,
        Self::Aux3,
    ];

    /// Targets baked on every pass regardless of contributions.
    pub fn is_mandatory(self) -> bool {
        matches!(
            self,
            Self::Head | Self::UpperBody | Self::LowerBody | Self::Eyes | Self::Hair
        )
    }

    /// Avatar texture slot that receives this target's bake result.
    pub fn baked_slot(self) -> AvatarTextureIndex {
        match self {
            Self::Head => AvatarTextureIndex::HeadBaked,
            Self::UpperBody => AvatarTextureIndex::UpperBaked,
            Self::LowerBody => AvatarTextureIndex::LowerBaked,
            Self::Eyes => AvatarTextureIndex::EyesBaked,
            Self::Hair => AvatarTextureIndex::HairBaked,
            Self::Skirt => AvatarTextureIndex::SkirtBaked,
            Self::LeftArm => AvatarTextureIndex::LeftArmBaked,
            Self::LeftLeg => AvatarTextureIndex::LeftLegBaked,
            Self::Aux1 => AvatarTextureIndex::Aux1Baked,
            Self::Aux2 => AvatarTextureIndex::Aux2Baked,
            Self::Aux3 => AvatarTextureIndex::Aux3Baked,
        }
    }

    /// Native output size.
    pub fn native_size(self) -> Size {
        match self {
            Self::Eyes => Size::square(128),
            Self::Hair => Size::square(512),
            _ => Size::square(1024),
        }
    }
}
