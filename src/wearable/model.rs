use std::collections::BTreeMap;
use std::sync::Arc;

use crate::appearance::textures::AvatarTextureIndex;
use crate::foundation::core::{AssetId, ItemId};
use crate::foundation::error::{BakeError, BakeResult};

/// Wearable kind, numbered as in the `type` line of a wearable asset.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum WearableType {
    Shape = 0,
    Skin = 1,
    Hair = 2,
    Eyes = 3,
    Shirt = 4,
    Pants = 5,
    Shoes = 6,
    Socks = 7,
    Jacket = 8,
    Gloves = 9,
    Undershirt = 10,
    Underpants = 11,
    Skirt = 12,
    Alpha = 13,
    Tattoo = 14,
    Physics = 15,
    Universal = 16,
}

impl WearableType {
    /// Look up a wearable type by its asset number.
    pub fn from_u8(raw: u8) -> BakeResult<Self> {
        use WearableType::*;
        Ok(match raw {
            0 => Shape,
            1 => Skin,
            2 => Hair,
            3 => Eyes,
            4 => Shirt,
            5 => Pants,
            6 => Shoes,
            7 => Socks,
            8 => Jacket,
            9 => Gloves,
            10 => Undershirt,
            11 => Underpants,
            12 => Skirt,
            13 => Alpha,
            14 => Tattoo,
            15 => Physics,
            16 => Universal,
            _ => return Err(BakeError::decode(format!("unknown wearable type {raw}"))),
        })
    }

    /// Asset number of this type.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Body parts are mandatory layers (shape, skin, hair, eyes); everything else is clothing.
    pub fn is_body_part(self) -> bool {
        matches!(self, Self::Shape | Self::Skin | Self::Hair | Self::Eyes)
    }
}

/// Decoded wearable asset.
///
/// Visual parameter values are stored as authored; consumers clamp into `[0, 1]` where they
/// need unit values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Wearable {
    /// Wearable kind.
    pub wearable_type: WearableType,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Texture references keyed by avatar texture slot.
    #[serde(default)]
    pub textures: BTreeMap<AvatarTextureIndex, AssetId>,
    /// Visual parameter values keyed by parameter id.
    #[serde(default)]
    pub params: BTreeMap<u32, f32>,
}

impl Wearable {
    /// Empty wearable of the given type.
    pub fn new(wearable_type: WearableType) -> Self {
        Self {
            wearable_type,
            name: String::new(),
            description: String::new(),
            textures: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style texture assignment.
    pub fn with_texture(mut self, slot: AvatarTextureIndex, id: AssetId) -> Self {
        self.textures.insert(slot, id);
        self
    }

    /// Builder-style visual parameter assignment.
    pub fn with_param(mut self, id: u32, value: f32) -> Self {
        self.params.insert(id, value);
        self
    }

    /// Texture referenced for `slot`, if any.
    pub fn texture(&self, slot: AvatarTextureIndex) -> Option<AssetId> {
        self.textures.get(&slot).copied()
    }

    /// Value of visual parameter `id`, if set.
    pub fn param(&self, id: u32) -> Option<f32> {
        self.params.get(&id).copied()
    }
}

/// One worn item: a decoded wearable plus its position in the outfit.
#[derive(Clone, Debug, PartialEq)]
pub struct OutfitItem {
    /// Outfit-item identity: the id of the real inventory item a current-outfit link points at.
    pub key: ItemId,
    /// Wearable asset the item references.
    pub asset_id: AssetId,
    /// Layer position; higher ordinals win.
    pub ordinal: i32,
    /// Decoded wearable.
    pub wearable: Arc<Wearable>,
}

impl OutfitItem {
    /// Build an outfit item.
    pub fn new(key: ItemId, asset_id: AssetId, ordinal: i32, wearable: Wearable) -> Self {
        Self {
            key,
            asset_id,
            ordinal,
            wearable: Arc::new(wearable),
        }
    }
}

/// Complete set of worn items keyed by outfit-item identity.
pub type Outfit = BTreeMap<ItemId, OutfitItem>;

/// Build an [`Outfit`] from a list of items. Later duplicates of a key replace earlier ones.
pub fn outfit_from_items(items: impl IntoIterator<Item = OutfitItem>) -> Outfit {
    items.into_iter().map(|item| (item.key, item)).collect()
}

/// Items of `outfit` in ascending ordinal order, ties broken by key.
pub fn items_by_ordinal(outfit: &Outfit) -> Vec<&OutfitItem> {
    let mut items: Vec<&OutfitItem> = outfit.values().collect();
    items.sort_by_key(|item| (item.ordinal, item.key));
    items
}

/// Worn-wearable entry as reported to other subsystems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WornWearable {
    /// Inventory item id of the worn item.
    pub item_id: ItemId,
    /// Wearable asset id.
    pub asset_id: AssetId,
}

/// Worn wearables grouped by type, each list in ascending ordinal order.
pub type WearablesByType = BTreeMap<WearableType, Vec<WornWearable>>;

/// Group `outfit` into a [`WearablesByType`] report.
pub fn wearables_by_type(outfit: &Outfit) -> WearablesByType {
    let mut out = WearablesByType::new();
    for item in items_by_ordinal(outfit) {
        out.entry(item.wearable.wearable_type)
            .or_default()
            .push(WornWearable {
                item_id: item.key,
                asset_id: item.asset_id,
            });
    }
    out
}
