use std::io::Cursor;

use crate::foundation::core::AssetId;
use crate::services::memory::MemoryAssetService;

use super::*;

fn tattoo(params: &[(u32, f32)]) -> Box<dyn Compositor> {
    let mut w = Wearable::new(WearableType::Tattoo);
    for &(id, v) in params {
        w = w.with_param(id, v);
    }
    compositor_for(Arc::new(w)).unwrap()
}

fn png_1x1(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, px.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn lower_tattoo_specific_color_overrides_generic() {
    let c = tattoo(&[
        (1071, 0.1),
        (1072, 0.2),
        (1073, 0.3),
        (1068, 0.7),
        (1069, 0.8),
        (1070, 0.9),
    ]);
    assert_eq!(
        c.tint(BakeTarget::LowerBody),
        Some(TintColor::new(0.7, 0.8, 0.9))
    );
    // the lower family never leaks into head/upper
    assert_eq!(
        c.tint(BakeTarget::UpperBody),
        Some(TintColor::new(0.1, 0.2, 0.3))
    );
}

#[test]
fn lower_tattoo_falls_back_to_generic_color() {
    let c = tattoo(&[(1071, 0.1), (1072, 0.2), (1073, 0.3)]);
    assert_eq!(
        c.tint(BakeTarget::LowerBody),
        Some(TintColor::new(0.1, 0.2, 0.3))
    );
}

#[test]
fn specific_family_overrides_per_channel() {
    let c = tattoo(&[(1071, 0.1), (1072, 0.2), (1073, 0.3), (1068, 0.9)]);
    assert_eq!(
        c.tint(BakeTarget::LowerBody),
        Some(TintColor::new(0.9, 0.2, 0.3))
    );
}

#[test]
fn missing_tint_params_default_to_white() {
    let c = tattoo(&[]);
    assert_eq!(c.tint(BakeTarget::Head), Some(TintColor::WHITE));
    assert_eq!(c.tint(BakeTarget::Skirt), None);
}

#[test]
fn skirt_tint_clamps_and_draws_nothing() {
    let w = Wearable::new(WearableType::Skirt)
        .with_param(921, -0.5)
        .with_param(922, 1.5)
        .with_param(923, 0.5);
    let c = compositor_for(Arc::new(w)).unwrap();
    assert_eq!(c.tint(BakeTarget::Skirt), Some(TintColor::new(0.0, 1.0, 0.5)));
    assert_eq!(c.tint(BakeTarget::LowerBody), None);
    assert!(c.image_slot(BakeTarget::Skirt).is_none());

    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    assert!(
        c.render(BakeTarget::Skirt, Size::square(2), &inputs)
            .unwrap()
            .is_none()
    );
}

#[test]
fn skin_and_shape_contribute_nothing() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    for ty in [WearableType::Skin, WearableType::Shape] {
        let c = compositor_for(Arc::new(Wearable::new(ty))).unwrap();
        assert_eq!(c.wearable_type(), ty);
        for target in BakeTarget::ALL {
            assert!(!c.contributes(target));
            assert!(c.render(target, Size::square(2), &inputs).unwrap().is_none());
        }
    }
}

#[test]
fn physics_has_no_compositor() {
    assert!(compositor_for(Arc::new(Wearable::new(WearableType::Physics))).is_none());
}

#[test]
fn unset_texture_renders_transparent_placeholder() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    let c = tattoo(&[]);
    let layer = c
        .render(BakeTarget::Head, Size::square(4), &inputs)
        .unwrap()
        .unwrap();
    assert_eq!(layer.image.size(), Size::square(4));
    assert!(layer.image.is_fully_transparent());
    assert!(layer.settled);
}

#[test]
fn missing_or_default_texture_renders_transparent_placeholder() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    for (id, settled) in [(AssetId::DEFAULT_TEXTURE, true), (AssetId::random(), false)] {
        let w = Wearable::new(WearableType::Shirt).with_texture(AvatarTextureIndex::UpperShirt, id);
        let c = compositor_for(Arc::new(w)).unwrap();
        let layer = c
            .render(BakeTarget::UpperBody, Size::square(2), &inputs)
            .unwrap()
            .unwrap();
        assert!(layer.image.is_fully_transparent());
        assert_eq!(layer.settled, settled, "{id}");
    }
}

#[test]
fn referenced_texture_is_resampled_to_target() {
    let assets = MemoryAssetService::new();
    let tex = AssetId::random();
    assets.insert_texture(tex, png_1x1([0, 0, 255, 255]));
    let inputs = TextureInputs::new(&assets);

    let w = Wearable::new(WearableType::Universal).with_texture(AvatarTextureIndex::Aux2Tattoo, tex);
    let c = compositor_for(Arc::new(w)).unwrap();
    assert!(c.contributes(BakeTarget::Aux2));
    let layer = c
        .render(BakeTarget::Aux2, Size::square(3), &inputs)
        .unwrap()
        .unwrap();
    assert!(layer.settled);
    assert_eq!(layer.image.size(), Size::square(3));
    assert_eq!(layer.image.pixel(2, 2), Some([0, 0, 255, 255]));
}

#[test]
fn jacket_draws_on_upper_and_lower() {
    let c = compositor_for(Arc::new(Wearable::new(WearableType::Jacket))).unwrap();
    assert_eq!(
        c.image_slot(BakeTarget::UpperBody),
        Some(AvatarTextureIndex::UpperJacket)
    );
    assert_eq!(
        c.image_slot(BakeTarget::LowerBody),
        Some(AvatarTextureIndex::LowerJacket)
    );
    assert_eq!(c.image_slot(BakeTarget::Head), None);
}
