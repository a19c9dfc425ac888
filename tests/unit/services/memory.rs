use crate::services::InventoryType;

use super::*;

fn folder(owner: PrincipalId) -> InventoryFolder {
    InventoryFolder {
        id: ItemId::random(),
        owner,
        name: "Current Outfit".to_string(),
        folder_type: FolderType::CurrentOutfit,
    }
}

fn item(folder_id: ItemId) -> InventoryItem {
    InventoryItem {
        id: ItemId::random(),
        folder_id,
        asset_id: AssetId::random(),
        asset_type: AssetType::Link,
        inventory_type: InventoryType::Wearable,
        name: String::new(),
        description: String::new(),
    }
}

#[test]
fn folder_lookup_is_scoped_to_owner() {
    let inv = MemoryInventoryService::new();
    let owner = PrincipalId::random();
    let f = folder(owner);
    inv.add_folder(f.clone());

    assert_eq!(
        inv.folder_for_type(owner, FolderType::CurrentOutfit).unwrap(),
        Some(f)
    );
    assert_eq!(
        inv.folder_for_type(PrincipalId::random(), FolderType::CurrentOutfit)
            .unwrap(),
        None
    );
}

#[test]
fn revision_tracks_changes_and_listing_keeps_order() {
    let inv = MemoryInventoryService::new();
    let owner = PrincipalId::random();
    let f = folder(owner);
    inv.add_folder(f.clone());

    let a = item(f.id);
    let b = item(f.id);
    inv.add_item(a.clone());
    inv.add_item(b.clone());
    let content = inv.folder_content(owner, f.id).unwrap();
    assert_eq!(content.revision, 3);
    assert_eq!(content.items, vec![a.clone(), b.clone()]);

    inv.remove_item(a.id);
    let content = inv.folder_content(owner, f.id).unwrap();
    assert_eq!(content.revision, 4);
    assert_eq!(content.items, vec![b]);
}

#[test]
fn batch_get_omits_unknown_ids() {
    let inv = MemoryInventoryService::new();
    let a = item(ItemId::random());
    inv.add_item(a.clone());
    let got = inv
        .items(PrincipalId::random(), &[a.id, ItemId::random()])
        .unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got.get(&a.id), Some(&a));
}

#[test]
fn store_failures_can_be_injected() {
    let assets = MemoryAssetService::new();
    let asset = Asset {
        id: AssetId::random(),
        asset_type: AssetType::Texture,
        name: String::new(),
        temporary: true,
        data: vec![1, 2, 3],
    };
    assets.set_fail_stores(true);
    assert!(matches!(
        assets.store(asset.clone()),
        Err(BakeError::Asset(_))
    ));
    assert!(assets.is_empty());

    assets.set_fail_stores(false);
    assets.store(asset.clone()).unwrap();
    assert_eq!(assets.get(asset.id).unwrap(), Some(asset));
    assert_eq!(assets.store_count(), 1);
}
