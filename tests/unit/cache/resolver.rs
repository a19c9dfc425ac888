use crate::services::memory::{MemoryAssetService, MemoryInventoryService};
use crate::services::{AssetType, InventoryFolder, InventoryType};
use crate::wearable::model::{Wearable, WearableType};

use super::*;

struct Fixture {
    owner: PrincipalId,
    folder: ItemId,
    inventory: MemoryInventoryService,
    assets: MemoryAssetService,
}

impl Fixture {
    fn new() -> Self {
        let owner = PrincipalId::random();
        let folder = ItemId::random();
        let inventory = MemoryInventoryService::new();
        inventory.add_folder(InventoryFolder {
            id: folder,
            owner,
            name: "Current Outfit".to_string(),
            folder_type: FolderType::CurrentOutfit,
        });
        Self {
            owner,
            folder,
            inventory,
            assets: MemoryAssetService::new(),
        }
    }

    // returns the real item id
    fn wear(&self, ty: WearableType, description: &str, store_asset: bool) -> ItemId {
        let item_id = ItemId::random();
        let asset_id = AssetId::random();
        if store_asset {
            self.assets.insert_wearable(asset_id, &Wearable::new(ty));
        }
        self.inventory.add_item(InventoryItem {
            id: item_id,
            folder_id: ItemId::random(),
            asset_id,
            asset_type: AssetType::Clothing,
            inventory_type: InventoryType::Wearable,
            name: String::new(),
            description: String::new(),
        });
        self.inventory.add_item(InventoryItem {
            id: ItemId::random(),
            folder_id: self.folder,
            asset_id: AssetId(item_id.0),
            asset_type: AssetType::Link,
            inventory_type: InventoryType::Wearable,
            name: String::new(),
            description: description.to_string(),
        });
        item_id
    }

    fn resolve(&self) -> BakeResult<ResolvedOutfit> {
        resolve_current_outfit(self.owner, None, &self.inventory, &self.assets)
    }
}

#[test]
fn ordinal_parses_at_prefix() {
    assert_eq!(link_ordinal("@3"), Some(3));
    assert_eq!(link_ordinal("@12 worn"), Some(12));
    assert_eq!(link_ordinal("  @-1"), Some(-1));
    assert_eq!(link_ordinal("@"), None);
    assert_eq!(link_ordinal("3"), None);
    assert_eq!(link_ordinal(""), None);
}

#[test]
fn links_become_items_keyed_by_real_item() {
    let fx = Fixture::new();
    let hair = fx.wear(WearableType::Hair, "@7", true);
    let eyes = fx.wear(WearableType::Eyes, "", true);

    let resolved = fx.resolve().unwrap();
    assert_eq!(resolved.folder_id, fx.folder);
    assert_eq!(resolved.serial, fx.inventory.revision(fx.folder).unwrap());
    assert_eq!(resolved.outfit.len(), 2);
    assert_eq!(resolved.outfit[&hair].ordinal, 7);
    // no description: listing position (hair link first, eyes link second)
    assert_eq!(resolved.outfit[&eyes].ordinal, 1);
    assert_eq!(
        resolved.outfit[&eyes].wearable.wearable_type,
        WearableType::Eyes
    );
    assert!(resolved.skipped.is_empty());
}

#[test]
fn non_wearable_entries_are_ignored() {
    let fx = Fixture::new();
    fx.inventory.add_item(InventoryItem {
        id: ItemId::random(),
        folder_id: fx.folder,
        asset_id: AssetId::random(),
        asset_type: AssetType::Link,
        inventory_type: InventoryType::Object,
        name: String::new(),
        description: String::new(),
    });
    let resolved = fx.resolve().unwrap();
    assert!(resolved.outfit.is_empty());
    assert!(resolved.skipped.is_empty());
}

#[test]
fn missing_item_and_asset_are_skipped() {
    let fx = Fixture::new();
    let kept = fx.wear(WearableType::Shirt, "@1", true);
    let no_asset = fx.wear(WearableType::Pants, "@2", false);
    let dangling = ItemId::random();
    fx.inventory.add_item(InventoryItem {
        id: ItemId::random(),
        folder_id: fx.folder,
        asset_id: AssetId(dangling.0),
        asset_type: AssetType::Link,
        inventory_type: InventoryType::Wearable,
        name: String::new(),
        description: String::new(),
    });

    let resolved = fx.resolve().unwrap();
    assert_eq!(resolved.outfit.keys().copied().collect::<Vec<_>>(), vec![kept]);
    let reasons: Vec<_> = resolved
        .skipped
        .iter()
        .map(|s| (s.item_id, s.reason.clone()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (no_asset, SkipReason::MissingAsset),
            (dangling, SkipReason::MissingItem)
        ]
    );
}

#[test]
fn undecodable_wearable_is_fatal() {
    let fx = Fixture::new();
    let item = fx.wear(WearableType::Shirt, "@1", true);
    let asset_id = fx.inventory.items(fx.owner, &[item]).unwrap()[&item].asset_id;
    fx.assets.insert_texture(asset_id, b"not a wearable".to_vec());

    let err = fx.resolve().unwrap_err();
    assert!(matches!(err, BakeError::Bake(_)), "{err}");
}

#[test]
fn missing_folder_is_fatal() {
    let fx = Fixture::new();
    let err = resolve_current_outfit(
        PrincipalId::random(),
        None,
        &fx.inventory,
        &fx.assets,
    )
    .unwrap_err();
    assert!(matches!(err, BakeError::Bake(_)));
}
