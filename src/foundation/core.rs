use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::foundation::error::{BakeError, BakeResult};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// The all-zero id.
            pub const NIL: Self = Self(Uuid::nil());

            /// Generate a fresh random (v4) id.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return `true` for the all-zero id.
            pub fn is_nil(self) -> bool {
                self.0.is_nil()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = BakeError;

            fn from_str(s: &str) -> BakeResult<Self> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
                    BakeError::validation(format!(
                        "invalid {} '{}': {e}",
                        stringify!($name),
                        s
                    ))
                })
            }
        }
    };
}

uuid_id!(
    /// Identifier of a blob in the asset service.
    AssetId
);
uuid_id!(
    /// Identifier of an inventory item or folder.
    ItemId
);
uuid_id!(
    /// Identifier of the agent owning an inventory and an appearance.
    PrincipalId
);

impl AssetId {
    /// Sentinel written into baked slots that have no bake result.
    pub const DEFAULT_AVATAR_TEXTURE: Self = Self(Uuid::from_u128(
        0xc228d1cf_4b5d_4ba8_84f4_899a0796aa97,
    ));

    /// Viewer default texture; wearables use it for "no texture".
    pub const DEFAULT_TEXTURE: Self = Self(Uuid::from_u128(0x5748decc_f629_461c_9a36_a35a221fe21f));

    /// Return `true` when the id references actual pixels rather than a placeholder.
    pub fn is_real_texture(self) -> bool {
        !self.is_nil() && self != Self::DEFAULT_AVATAR_TEXTURE && self != Self::DEFAULT_TEXTURE
    }
}

/// Multiplicative tint in linear `[0, 1]` channels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TintColor {
    /// Red multiplier.
    pub r: f32,
    /// Green multiplier.
    pub g: f32,
    /// Blue multiplier.
    pub b: f32,
}

impl TintColor {
    /// Identity tint.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a tint with every channel clamped into `[0, 1]`.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        fn unit(v: f32) -> f32 {
            if v.is_nan() { 1.0 } else { v.clamp(0.0, 1.0) }
        }
        Self {
            r: unit(r),
            g: unit(g),
            b: unit(b),
        }
    }

    /// Return `true` when multiplying by this tint leaves pixels unchanged.
    pub fn is_identity(self) -> bool {
        self == Self::WHITE
    }
}

impl Default for TintColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Pixel dimensions of a bake target or image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Square size with edge length `edge`.
    pub fn square(edge: u32) -> Self {
        Self {
            width: edge,
            height: edge,
        }
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> BakeResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| BakeError::validation("image buffer size overflow"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
