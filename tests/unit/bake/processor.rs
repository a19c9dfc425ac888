use std::io::Cursor;

use crate::appearance::textures::AvatarTextureIndex;
use crate::bake::compositor::compositor_for;
use crate::bake::sub_baker::SubBaker;
use crate::foundation::core::ItemId;
use crate::services::memory::MemoryAssetService;
use crate::wearable::model::{OutfitItem, Wearable, WearableType, outfit_from_items};

use super::*;

fn png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(1, 1, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn entries(items: &[OutfitItem]) -> Vec<SubBakerEntry> {
    items
        .iter()
        .filter_map(|item| {
            let compositor = compositor_for(Arc::clone(&item.wearable))?;
            Some(SubBakerEntry {
                key: item.key,
                ordinal: item.ordinal,
                baker: Arc::new(SubBaker::new(compositor)),
            })
        })
        .collect()
}

fn small() -> BakeProcessor {
    BakeProcessor::new(BakeOpts {
        resolution: Some(2),
        ..BakeOpts::default()
    })
}

#[test]
fn default_opts_use_native_sizes() {
    let opts = BakeOpts::default();
    assert_eq!(opts.target_size(BakeTarget::Head), Size::square(1024));
    assert_eq!(opts.target_size(BakeTarget::Hair), Size::square(512));
    assert_eq!(opts.target_size(BakeTarget::Eyes), Size::square(128));
    assert_eq!(opts.base_rgba, [255, 255, 255, 255]);
    assert!(!opts.parallel);
}

#[test]
fn empty_outfit_bakes_only_mandatory_targets() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    let out = small().process(&[], &Outfit::new(), &inputs).unwrap();

    for (target, baked) in &out.textures {
        assert_eq!(baked.is_some(), target.is_mandatory(), "{target:?}");
    }
    let head = out.textures[&BakeTarget::Head].as_ref().unwrap();
    assert_eq!(head.image.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(head.asset.asset_type, AssetType::Texture);
    assert!(head.asset.data.starts_with(b"\x89PNG"));
    assert!(out.visual_params.is_empty());
}

#[test]
fn assets_get_fresh_ids_each_run() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    let a = small().process(&[], &Outfit::new(), &inputs).unwrap();
    let b = small().process(&[], &Outfit::new(), &inputs).unwrap();
    let id = |o: &BakeOutput| o.textures[&BakeTarget::Head].as_ref().unwrap().asset.id;
    assert_ne!(id(&a), id(&b));
}

#[test]
fn tattoo_tint_and_skirt_enable_optional_targets() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    let tattoo = OutfitItem::new(
        ItemId::random(),
        AssetId::random(),
        1,
        Wearable::new(WearableType::Tattoo)
            .with_param(1068, 1.0)
            .with_param(1069, 0.0)
            .with_param(1070, 0.0),
    );
    let skirt = OutfitItem::new(
        ItemId::random(),
        AssetId::random(),
        2,
        Wearable::new(WearableType::Skirt)
            .with_param(921, 0.0)
            .with_param(922, 1.0)
            .with_param(923, 0.0),
    );
    let items = [tattoo, skirt];
    let outfit = outfit_from_items(items.clone());
    let out = small().process(&entries(&items), &outfit, &inputs).unwrap();

    let px = |t: BakeTarget| out.textures[&t].as_ref().unwrap().image.pixel(1, 1).unwrap();
    assert_eq!(px(BakeTarget::LowerBody), [255, 0, 0, 255]);
    assert_eq!(px(BakeTarget::UpperBody), [255, 255, 255, 255]);
    assert_eq!(px(BakeTarget::Skirt), [0, 255, 0, 255]);
    assert!(out.textures[&BakeTarget::Aux1].is_none());
    assert_eq!(out.baked().count(), 6);
}

#[test]
fn higher_ordinal_layer_is_on_top() {
    let assets = MemoryAssetService::new();
    let red = AssetId::random();
    let blue = AssetId::random();
    assets.insert_texture(red, png([255, 0, 0, 255]));
    assets.insert_texture(blue, png([0, 0, 255, 255]));
    let inputs = TextureInputs::new(&assets);

    let shirt = |ordinal, tex| {
        OutfitItem::new(
            ItemId::random(),
            AssetId::random(),
            ordinal,
            Wearable::new(WearableType::Shirt).with_texture(AvatarTextureIndex::UpperShirt, tex),
        )
    };
    // listing order is deliberately reversed
    let items = [shirt(5, blue), shirt(1, red)];
    let outfit = outfit_from_items(items.clone());
    let out = small().process(&entries(&items), &outfit, &inputs).unwrap();
    let upper = out.textures[&BakeTarget::UpperBody].as_ref().unwrap();
    assert_eq!(upper.image.pixel(0, 0), Some([0, 0, 255, 255]));
}

#[test]
fn parallel_matches_sequential() {
    let assets = MemoryAssetService::new();
    let tex = AssetId::random();
    assets.insert_texture(tex, png([10, 200, 30, 128]));
    let inputs = TextureInputs::new(&assets);
    let items = [OutfitItem::new(
        ItemId::random(),
        AssetId::random(),
        0,
        Wearable::new(WearableType::Universal)
            .with_texture(AvatarTextureIndex::Aux3Tattoo, tex)
            .with_texture(AvatarTextureIndex::HeadUniversalTattoo, tex),
    )];
    let outfit = outfit_from_items(items.clone());
    let layers = entries(&items);

    let seq = small().process(&layers, &outfit, &inputs).unwrap();
    let par = BakeProcessor::new(BakeOpts {
        resolution: Some(2),
        parallel: true,
        threads: Some(2),
        ..BakeOpts::default()
    })
    .process(&layers, &outfit, &inputs)
    .unwrap();

    for target in BakeTarget::ALL {
        let img = |o: &BakeOutput| o.textures[&target].as_ref().map(|b| b.image.clone());
        assert_eq!(img(&seq), img(&par), "{target:?}");
    }
}

#[test]
fn zero_threads_or_resolution_is_rejected() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    for opts in [
        BakeOpts {
            parallel: true,
            threads: Some(0),
            ..BakeOpts::default()
        },
        BakeOpts {
            resolution: Some(0),
            ..BakeOpts::default()
        },
    ] {
        let err = BakeProcessor::new(opts)
            .process(&[], &Outfit::new(), &inputs)
            .unwrap_err();
        assert!(matches!(err, BakeError::Validation(_)));
    }
}

#[test]
fn visual_params_and_height_come_from_outfit() {
    let assets = MemoryAssetService::new();
    let inputs = TextureInputs::new(&assets);
    let items = [OutfitItem::new(
        ItemId::random(),
        AssetId::random(),
        0,
        Wearable::new(WearableType::Shape).with_param(33, 1.0),
    )];
    let outfit = outfit_from_items(items.clone());
    let out = small().process(&entries(&items), &outfit, &inputs).unwrap();
    assert_eq!(out.visual_params.get(33), Some(255));
    assert!((out.avatar_height - (1.23077 + 0.516945)).abs() < 1e-4);
}
