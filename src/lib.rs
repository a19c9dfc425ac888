//! Avatar appearance bake cache.
//!
//! Turns the set of wearables an avatar has on into one composited texture per body region,
//! stores those textures as assets, and publishes an [`AppearanceInfo`] snapshot.
//!
//! # Pipeline overview
//!
//! 1. **Load**: the current-outfit folder's wearable links are resolved into an [`Outfit`]
//!    ([`BakeCache::load_from_current_outfit`]).
//! 2. **Diff**: the outfit is reconciled against a registry of [`SubBaker`]s, one per item that
//!    can contribute to a bake ([`BakeCache::set_current_outfit`]).
//! 3. **Bake**: [`BakeProcessor`] composites every sub-baker's layer per [`BakeTarget`] in
//!    ascending ordinal order.
//! 4. **Store / Publish**: baked PNGs are written through the [`AssetService`] and their ids
//!    land in the baked slots of [`AvatarTextures`] ([`BakeCache::bake`]).
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Ordinal precedence**: for any slot, parameter, or pixel, the higher ordinal wins; equal
//!   ordinals fall back to item-id order.
//! - **No I/O under the state lock**: collaborators are only called with the cache unlocked.
//! - **Premultiplied RGBA8** internally; baked assets are straight-alpha PNG.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod appearance;
mod bake;
mod cache;
mod foundation;
mod services;
mod wearable;

pub use appearance::info::AppearanceInfo;
pub use appearance::textures::{AvatarTextureIndex, AvatarTextures};
pub use bake::compositor::{
    Compositor, RenderedLayer, SKIRT_COLOR, TATTOO_COLOR, TATTOO_LOWER_COLOR, TATTOO_UPPER_COLOR,
    compositor_for,
};
pub use bake::image::{
    BakeImage, PremulRgba8, decode_texture, encode_png, multiply_in_place, over, over_in_place,
};
pub use bake::inputs::{TextureInputs, TextureLookup};
pub use bake::processor::{BakeOpts, BakeOutput, BakeProcessor, BakedTexture};
pub use bake::sub_baker::{SubBaker, SubBakerEntry};
pub use bake::target::BakeTarget;
pub use cache::bake_cache::{BakeCache, CompositorFactory};
pub use cache::resolver::{LoadReport, SkipReason, SkippedItem, link_ordinal};
pub use foundation::core::{AssetId, ItemId, PrincipalId, Size, TintColor};
pub use foundation::error::{BakeError, BakeResult};
pub use services::memory::{MemoryAssetService, MemoryInventoryService};
pub use services::{
    Asset, AssetService, AssetType, FolderContent, FolderType, InventoryFolder, InventoryItem,
    InventoryService, InventoryType,
};
pub use wearable::decode::{decode_wearable, encode_wearable};
pub use wearable::model::{
    Outfit, OutfitItem, Wearable, WearableType, WearablesByType, WornWearable, items_by_ordinal,
    outfit_from_items, wearables_by_type,
};
pub use wearable::params::{
    SHAPE_HEAD_SIZE, SHAPE_HEIGHT, SHAPE_LEG_LENGTH, SHAPE_NECK_LENGTH, SHOES_HEEL_HEIGHT,
    SHOES_PLATFORM_HEIGHT, VisualParams,
};
