use crate::foundation::core::{AssetId, ItemId, PrincipalId};
use crate::foundation::error::{BakeError, BakeResult};
use crate::services::{AssetService, FolderType, InventoryItem, InventoryService};
use crate::wearable::decode::decode_wearable;
use crate::wearable::model::{Outfit, OutfitItem, outfit_from_items};

/// Why a current-outfit link was left out of the outfit.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// The linked inventory item does not exist.
    MissingItem,
    /// The item's wearable asset is not in the asset service.
    MissingAsset,
    /// The asset service failed to return the wearable asset.
    FetchFailed(String),
}

/// One link skipped during outfit resolution.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkippedItem {
    /// Link item in the current-outfit folder.
    pub link_id: ItemId,
    /// Item the link points at.
    pub item_id: ItemId,
    /// Wearable asset, when the item was found.
    pub asset_id: Option<AssetId>,
    /// Cause.
    pub reason: SkipReason,
}

/// Outcome of [`crate::BakeCache::load_from_current_outfit`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadReport {
    /// Current-outfit folder id.
    pub folder_id: ItemId,
    /// Folder revision now used as the appearance serial.
    pub serial: u32,
    /// Number of items in the committed outfit.
    pub loaded: usize,
    /// Links that were left out.
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug)]
pub(crate) struct ResolvedOutfit {
    pub(crate) folder_id: ItemId,
    pub(crate) serial: u32,
    pub(crate) outfit: Outfit,
    pub(crate) skipped: Vec<SkippedItem>,
}

/// Layer order encoded in a current-outfit link description: `@N`, optionally followed by text.
pub fn link_ordinal(description: &str) -> Option<i32> {
    let rest = description.trim_start().strip_prefix('@')?;
    let end = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map_or(rest.len(), |(i, _)| i);
    rest[..end].parse().ok()
}

/// Read the current-outfit folder and turn its wearable links into an [`Outfit`].
///
/// Missing items and unfetchable assets are skipped; a fetched asset that fails to decode
/// aborts the whole resolution.
pub(crate) fn resolve_current_outfit(
    principal: PrincipalId,
    cached_folder: Option<ItemId>,
    inventory: &dyn InventoryService,
    assets: &dyn AssetService,
) -> BakeResult<ResolvedOutfit> {
    let folder_id = match cached_folder {
        Some(id) => id,
        None => inventory
            .folder_for_type(principal, FolderType::CurrentOutfit)?
            .map(|f| f.id)
            .ok_or_else(|| {
                BakeError::bake(format!("no current outfit folder for principal {principal}"))
            })?,
    };

    let content = inventory.folder_content(principal, folder_id)?;
    let links: Vec<(usize, &InventoryItem, ItemId)> = content
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_wearable_link())
        .filter_map(|(pos, item)| item.link_target().map(|target| (pos, item, target)))
        .collect();
    let targets: Vec<ItemId> = links.iter().map(|(_, _, target)| *target).collect();
    let actual = inventory.items(principal, &targets)?;

    let mut items = Vec::with_capacity(links.len());
    let mut skipped = Vec::new();
    for (pos, link, target) in links {
        let skip = |asset_id, reason| SkippedItem {
            link_id: link.id,
            item_id: target,
            asset_id,
            reason,
        };

        let Some(item) = actual.get(&target) else {
            tracing::warn!(link = %link.id, item = %target, "linked item not found, skipping");
            skipped.push(skip(None, SkipReason::MissingItem));
            continue;
        };
        let asset = match assets.get(item.asset_id) {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                tracing::warn!(item = %target, asset = %item.asset_id, "wearable asset missing, skipping");
                skipped.push(skip(Some(item.asset_id), SkipReason::MissingAsset));
                continue;
            }
            Err(e) => {
                tracing::warn!(item = %target, asset = %item.asset_id, error = %e, "wearable asset fetch failed, skipping");
                skipped.push(skip(
                    Some(item.asset_id),
                    SkipReason::FetchFailed(e.to_string()),
                ));
                continue;
            }
        };

        let wearable = decode_wearable(&asset.data).map_err(|e| {
            BakeError::bake(format!(
                "wearable asset {} of item {target} failed to decode: {e}",
                item.asset_id
            ))
        })?;
        let ordinal = link_ordinal(&link.description)
            .unwrap_or_else(|| i32::try_from(pos).unwrap_or(i32::MAX));
        items.push(OutfitItem::new(target, item.asset_id, ordinal, wearable));
    }

    Ok(ResolvedOutfit {
        folder_id,
        serial: content.revision,
        outfit: outfit_from_items(items),
        skipped,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/cache/resolver.rs"]
mod tests;
