//! Narrow interfaces to the asset and inventory backends the bake cache depends on.
//!
//! Implementations are blocking; any deadline is imposed by the backend itself.

pub(crate) mod memory;

use std::collections::HashMap;

use crate::foundation::core::{AssetId, ItemId, PrincipalId};
use crate::foundation::error::BakeResult;

/// Kind of blob held by the asset service or referenced by an inventory item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Encoded image.
    Texture,
    /// Clothing wearable.
    Clothing,
    /// Body part wearable.
    Bodypart,
    /// Inventory link; the item's asset id is the id of the linked item.
    Link,
    /// Anything the bake pipeline does not interpret.
    Other,
}

/// Blob stored in the asset service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Asset id.
    pub id: AssetId,
    /// Blob kind.
    pub asset_type: AssetType,
    /// Descriptive name.
    pub name: String,
    /// Temporary assets may be evicted by the backend.
    pub temporary: bool,
    /// Encoded bytes.
    pub data: Vec<u8>,
}

/// Asset storage backend.
pub trait AssetService: Send + Sync {
    /// Fetch an asset. `Ok(None)` when the id is unknown.
    fn get(&self, id: AssetId) -> BakeResult<Option<Asset>>;

    /// Store an asset; storing an existing id replaces it.
    fn store(&self, asset: Asset) -> BakeResult<()>;
}

/// Well-known inventory folder kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    /// Inventory root.
    Root,
    /// Folder whose links represent everything currently worn.
    CurrentOutfit,
    /// Default clothing folder.
    Clothing,
    /// Default body parts folder.
    BodyParts,
    /// User-created folder.
    None,
}

/// How the viewer treats an inventory item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryType {
    /// Clothing or body part.
    Wearable,
    /// Texture.
    Texture,
    /// Rezzable object.
    Object,
    /// Anything else.
    Other,
}

/// Inventory folder header.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InventoryFolder {
    /// Folder id.
    pub id: ItemId,
    /// Owning agent.
    pub owner: PrincipalId,
    /// Display name.
    pub name: String,
    /// Well-known kind.
    pub folder_type: FolderType,
}

/// Inventory item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InventoryItem {
    /// Item id.
    pub id: ItemId,
    /// Containing folder.
    pub folder_id: ItemId,
    /// Referenced asset; for links, the id of the linked item.
    pub asset_id: AssetId,
    /// Kind of referenced asset.
    pub asset_type: AssetType,
    /// Viewer-facing kind.
    pub inventory_type: InventoryType,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Description; current-outfit links carry their layer order here as `@N`.
    #[serde(default)]
    pub description: String,
}

impl InventoryItem {
    /// Id of the item a link points at, or `None` if this is not a link.
    pub fn link_target(&self) -> Option<ItemId> {
        (self.asset_type == AssetType::Link).then_some(ItemId(self.asset_id.0))
    }

    /// Return `true` for links to wearables.
    pub fn is_wearable_link(&self) -> bool {
        self.asset_type == AssetType::Link && self.inventory_type == InventoryType::Wearable
    }
}

/// Listing of a folder at a given revision.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FolderContent {
    /// Folder id.
    pub folder_id: ItemId,
    /// Folder revision; bumped on every change to the folder.
    pub revision: u32,
    /// Items in listing order.
    pub items: Vec<InventoryItem>,
}

/// Inventory backend.
pub trait InventoryService: Send + Sync {
    /// Find the agent's folder of a well-known kind.
    fn folder_for_type(
        &self,
        principal: PrincipalId,
        folder_type: FolderType,
    ) -> BakeResult<Option<InventoryFolder>>;

    /// List a folder.
    fn folder_content(&self, principal: PrincipalId, folder_id: ItemId)
    -> BakeResult<FolderContent>;

    /// Fetch several items at once. Unknown ids are absent from the result, never an error.
    fn items(
        &self,
        principal: PrincipalId,
        ids: &[ItemId],
    ) -> BakeResult<HashMap<ItemId, InventoryItem>>;
}
