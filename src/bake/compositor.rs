use std::sync::Arc;

use crate::appearance::textures::AvatarTextureIndex;
use crate::bake::image::BakeImage;
use crate::bake::inputs::{TextureInputs, TextureLookup};
use crate::bake::target::BakeTarget;
use crate::foundation::core::{Size, TintColor};
use crate::foundation::error::BakeResult;
use crate::wearable::model::{Wearable, WearableType};

/// Generic tattoo color (red, green, blue).
pub const TATTOO_COLOR: [u32; 3] = [1071, 1072, 1073];
/// Head and upper-body tattoo color, applied over [`TATTOO_COLOR`].
pub const TATTOO_UPPER_COLOR: [u32; 3] = [1062, 1063, 1064];
/// Lower-body tattoo color, applied over [`TATTOO_COLOR`].
pub const TATTOO_LOWER_COLOR: [u32; 3] = [1068, 1069, 1070];
/// Skirt color.
pub const SKIRT_COLOR: [u32; 3] = [921, 922, 923];

/// Per-wearable contribution to the bake targets.
///
/// Implementations are pure functions of their immutable wearable; memoization and lifecycle
/// live in [`crate::SubBaker`].
pub trait Compositor: Send + Sync + std::fmt::Debug {
    /// Source wearable.
    fn wearable(&self) -> &Wearable;

    /// Texture slot layered onto `target`, if this wearable draws on it.
    fn image_slot(&self, _target: BakeTarget) -> Option<AvatarTextureIndex> {
        None
    }

    /// Multiplicative tint applied to `target` after this layer, if any.
    fn tint(&self, _target: BakeTarget) -> Option<TintColor> {
        None
    }

    /// Wearable kind.
    fn wearable_type(&self) -> WearableType {
        self.wearable().wearable_type
    }

    /// Return `true` when this wearable affects `target` through pixels or tint.
    fn contributes(&self, target: BakeTarget) -> bool {
        self.image_slot(target).is_some() || self.tint(target).is_some()
    }

    /// Produce this wearable's layer for `target`.
    ///
    /// Drawing wearables always yield an image of `size`; a slot without usable source pixels
    /// becomes a fully transparent layer.
    fn render(
        &self,
        target: BakeTarget,
        size: Size,
        inputs: &TextureInputs<'_>,
    ) -> BakeResult<Option<RenderedLayer>> {
        let Some(slot) = self.image_slot(target) else {
            return Ok(None);
        };
        let lookup = match self.wearable().texture(slot) {
            Some(id) => inputs.texture(id, size),
            None => TextureLookup::Absent,
        };
        let settled = lookup.is_settled();
        let image = match lookup {
            TextureLookup::Ready(img) => img,
            TextureLookup::Absent | TextureLookup::Unavailable => {
                Arc::new(BakeImage::transparent(size)?)
            }
        };
        Ok(Some(RenderedLayer { image, settled }))
    }
}

/// One rendered layer.
#[derive(Clone, Debug)]
pub struct RenderedLayer {
    /// Layer pixels at the requested size.
    pub image: Arc<BakeImage>,
    /// `false` when the image stands in for a texture the asset service could not provide.
    pub settled: bool,
}

/// Build the compositor for a wearable, or `None` for types that never bake.
pub fn compositor_for(wearable: Arc<Wearable>) -> Option<Box<dyn Compositor>> {
    use WearableType::*;

    let compositor: Box<dyn Compositor> = match wearable.wearable_type {
        Shape | Skin => Box::new(NoOpCompositor { wearable }),
        Tattoo => Box::new(TattooCompositor { wearable }),
        Skirt => Box::new(SkirtCompositor { wearable }),
        Physics => return None,
        other => Box::new(LayerCompositor {
            layers: layers_for(other)?,
            wearable,
        }),
    };
    Some(compositor)
}

type Layers = &'static [(BakeTarget, AvatarTextureIndex)];

fn layers_for(wearable_type: WearableType) -> Option<Layers> {
    use AvatarTextureIndex as S;
    use BakeTarget as T;

    let layers: Layers = match wearable_type {
        WearableType::Hair => &[(T::Hair, S::Hair)],
        WearableType::Eyes => &[(T::Eyes, S::EyesIris)],
        WearableType::Shirt => &[(T::UpperBody, S::UpperShirt)],
        WearableType::Pants => &[(T::LowerBody, S::LowerPants)],
        WearableType::Shoes => &[(T::LowerBody, S::LowerShoes)],
        WearableType::Socks => &[(T::LowerBody, S::LowerSocks)],
        WearableType::Jacket => &[
            (T::UpperBody, S::UpperJacket),
            (T::LowerBody, S::LowerJacket),
        ],
        WearableType::Gloves => &[(T::UpperBody, S::UpperGloves)],
        WearableType::Undershirt => &[(T::UpperBody, S::UpperUndershirt)],
        WearableType::Underpants => &[(T::LowerBody, S::LowerUnderpants)],
        WearableType::Alpha => &[
            (T::Head, S::HeadAlpha),
            (T::UpperBody, S::UpperAlpha),
            (T::LowerBody, S::LowerAlpha),
            (T::Eyes, S::EyesAlpha),
            (T::Hair, S::HairAlpha),
        ],
        WearableType::Universal => &[
            (T::Head, S::HeadUniversalTattoo),
            (T::UpperBody, S::UpperUniversalTattoo),
            (T::LowerBody, S::LowerUniversalTattoo),
            (T::Eyes, S::EyesTattoo),
            (T::Hair, S::HairTattoo),
            (T::Skirt, S::SkirtTattoo),
            (T::LeftArm, S::LeftArmTattoo),
            (T::LeftLeg, S::LeftLegTattoo),
            (T::Aux1, S::Aux1Tattoo),
            (T::Aux2, S::Aux2Tattoo),
            (T::Aux3, S::Aux3Tattoo),
        ],
        _ => return None,
    };
    Some(layers)
}

/// Read an RGB tint from stacked parameter families; later families overwrite earlier ones per
/// channel, and channels no family sets stay at 1.0.
fn stacked_tint(wearable: &Wearable, families: &[[u32; 3]]) -> TintColor {
    let mut rgb = [1.0f32; 3];
    for family in families {
        for (channel, id) in rgb.iter_mut().zip(family) {
            if let Some(v) = wearable.param(*id) {
                *channel = v;
            }
        }
    }
    TintColor::new(rgb[0], rgb[1], rgb[2])
}

// Skin and shape carry only visual parameters.
#[derive(Debug)]
struct NoOpCompositor {
    wearable: Arc<Wearable>,
}

impl Compositor for NoOpCompositor {
    fn wearable(&self) -> &Wearable {
        &self.wearable
    }
}

#[derive(Debug)]
struct LayerCompositor {
    wearable: Arc<Wearable>,
    layers: Layers,
}

impl Compositor for LayerCompositor {
    fn wearable(&self) -> &Wearable {
        &self.wearable
    }

    fn image_slot(&self, target: BakeTarget) -> Option<AvatarTextureIndex> {
        self.layers
            .iter()
            .find(|(t, _)| *t == target)
            .map(|(_, slot)| *slot)
    }
}

#[derive(Debug)]
struct TattooCompositor {
    wearable: Arc<Wearable>,
}

impl Compositor for TattooCompositor {
    fn wearable(&self) -> &Wearable {
        &self.wearable
    }

    fn image_slot(&self, target: BakeTarget) -> Option<AvatarTextureIndex> {
        match target {
            BakeTarget::Head => Some(AvatarTextureIndex::HeadTattoo),
            BakeTarget::UpperBody => Some(AvatarTextureIndex::UpperTattoo),
            BakeTarget::LowerBody => Some(AvatarTextureIndex::LowerTattoo),
            _ => None,
        }
    }

    fn tint(&self, target: BakeTarget) -> Option<TintColor> {
        match target {
            BakeTarget::Head | BakeTarget::UpperBody => Some(stacked_tint(
                &self.wearable,
                &[TATTOO_COLOR, TATTOO_UPPER_COLOR],
            )),
            BakeTarget::LowerBody => Some(stacked_tint(
                &self.wearable,
                &[TATTOO_COLOR, TATTOO_LOWER_COLOR],
            )),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct SkirtCompositor {
    wearable: Arc<Wearable>,
}

impl Compositor for SkirtCompositor {
    fn wearable(&self) -> &Wearable {
        &self.wearable
    }

    fn tint(&self, target: BakeTarget) -> Option<TintColor> {
        (target == BakeTarget::Skirt).then(|| stacked_tint(&self.wearable, &[SKIRT_COLOR]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/compositor.rs"]
mod tests;
