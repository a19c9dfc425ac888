use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::foundation::core::{AssetId, ItemId, PrincipalId};
use crate::foundation::error::{BakeError, BakeResult};
use crate::services::{
    Asset, AssetService, AssetType, FolderContent, FolderType, InventoryFolder, InventoryItem,
    InventoryService,
};
use crate::wearable::decode::encode_wearable;
use crate::wearable::model::Wearable;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Thread-safe in-memory [`AssetService`].
#[derive(Debug, Default)]
pub struct MemoryAssetService {
    assets: Mutex<HashMap<AssetId, Asset>>,
    fail_gets: AtomicBool,
    fail_stores: AtomicBool,
    stores: AtomicUsize,
}

impl MemoryAssetService {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an asset.
    pub fn insert(&self, asset: Asset) {
        lock(&self.assets).insert(asset.id, asset);
    }

    /// Insert a wearable encoded in the text wearable format.
    pub fn insert_wearable(&self, id: AssetId, wearable: &Wearable) {
        let asset_type = if wearable.wearable_type.is_body_part() {
            AssetType::Bodypart
        } else {
            AssetType::Clothing
        };
        self.insert(Asset {
            id,
            asset_type,
            name: wearable.name.clone(),
            temporary: false,
            data: encode_wearable(wearable),
        });
    }

    /// Insert an encoded texture.
    pub fn insert_texture(&self, id: AssetId, encoded: Vec<u8>) {
        self.insert(Asset {
            id,
            asset_type: AssetType::Texture,
            name: String::new(),
            temporary: false,
            data: encoded,
        });
    }

    /// Remove an asset, returning it if present.
    pub fn remove(&self, id: AssetId) -> Option<Asset> {
        lock(&self.assets).remove(&id)
    }

    /// Copy of the asset with `id`.
    pub fn asset(&self, id: AssetId) -> Option<Asset> {
        lock(&self.assets).get(&id).cloned()
    }

    /// Number of assets held.
    pub fn len(&self) -> usize {
        lock(&self.assets).len()
    }

    /// Return `true` when no assets are held.
    pub fn is_empty(&self) -> bool {
        lock(&self.assets).is_empty()
    }

    /// Number of successful [`AssetService::store`] calls.
    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::Relaxed)
    }

    /// Make every subsequent get fail until reset.
    pub fn set_fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent store fail until reset.
    pub fn set_fail_stores(&self, fail: bool) {
        self.fail_stores.store(fail, Ordering::Relaxed);
    }
}

impl AssetService for MemoryAssetService {
    fn get(&self, id: AssetId) -> BakeResult<Option<Asset>> {
        if self.fail_gets.load(Ordering::Relaxed) {
            return Err(BakeError::asset(format!("get of {id} rejected")));
        }
        Ok(lock(&self.assets).get(&id).cloned())
    }

    fn store(&self, asset: Asset) -> BakeResult<()> {
        if self.fail_stores.load(Ordering::Relaxed) {
            return Err(BakeError::asset(format!("store of {} rejected", asset.id)));
        }
        lock(&self.assets).insert(asset.id, asset);
        self.stores.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InventoryState {
    folders: HashMap<ItemId, InventoryFolder>,
    revisions: HashMap<ItemId, u32>,
    items: HashMap<ItemId, InventoryItem>,
    // listing order per folder
    order: HashMap<ItemId, Vec<ItemId>>,
}

/// Thread-safe in-memory [`InventoryService`].
#[derive(Debug, Default)]
pub struct MemoryInventoryService {
    state: Mutex<InventoryState>,
}

impl MemoryInventoryService {
    /// Empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a folder at revision 1.
    pub fn add_folder(&self, folder: InventoryFolder) {
        let mut st = lock(&self.state);
        st.revisions.insert(folder.id, 1);
        st.order.entry(folder.id).or_default();
        st.folders.insert(folder.id, folder);
    }

    /// Add or replace an item, bumping its folder's revision.
    pub fn add_item(&self, item: InventoryItem) {
        let mut st = lock(&self.state);
        let order = st.order.entry(item.folder_id).or_default();
        if !order.contains(&item.id) {
            order.push(item.id);
        }
        *st.revisions.entry(item.folder_id).or_insert(0) += 1;
        st.items.insert(item.id, item);
    }

    /// Remove an item, bumping its folder's revision.
    pub fn remove_item(&self, id: ItemId) -> Option<InventoryItem> {
        let mut st = lock(&self.state);
        let item = st.items.remove(&id)?;
        if let Some(order) = st.order.get_mut(&item.folder_id) {
            order.retain(|i| *i != id);
        }
        *st.revisions.entry(item.folder_id).or_insert(0) += 1;
        Some(item)
    }

    /// Current revision of a folder.
    pub fn revision(&self, folder_id: ItemId) -> Option<u32> {
        lock(&self.state).revisions.get(&folder_id).copied()
    }
}

impl InventoryService for MemoryInventoryService {
    fn folder_for_type(
        &self,
        principal: PrincipalId,
        folder_type: FolderType,
    ) -> BakeResult<Option<InventoryFolder>> {
        let st = lock(&self.state);
        Ok(st
            .folders
            .values()
            .find(|f| f.owner == principal && f.folder_type == folder_type)
            .cloned())
    }

    fn folder_content(
        &self,
        principal: PrincipalId,
        folder_id: ItemId,
    ) -> BakeResult<FolderContent> {
        let st = lock(&self.state);
        let folder = st
            .folders
            .get(&folder_id)
            .filter(|f| f.owner == principal)
            .ok_or_else(|| BakeError::inventory(format!("unknown folder {folder_id}")))?;
        let items = st
            .order
            .get(&folder.id)
            .map(|ids| ids.iter().filter_map(|id| st.items.get(id).cloned()).collect())
            .unwrap_or_default();
        Ok(FolderContent {
            folder_id,
            revision: st.revisions.get(&folder_id).copied().unwrap_or(0),
            items,
        })
    }

    fn items(
        &self,
        _principal: PrincipalId,
        ids: &[ItemId],
    ) -> BakeResult<HashMap<ItemId, InventoryItem>> {
        let st = lock(&self.state);
        Ok(ids
            .iter()
            .filter_map(|id| st.items.get(id).map(|item| (*id, item.clone())))
            .collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/memory.rs"]
mod tests;
