use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::appearance::info::AppearanceInfo;
use crate::appearance::textures::AvatarTextures;
use crate::bake::compositor::{Compositor, compositor_for};
use crate::bake::inputs::TextureInputs;
use crate::bake::processor::{BakeOpts, BakeProcessor};
use crate::bake::sub_baker::{SubBaker, SubBakerEntry};
use crate::cache::resolver::{LoadReport, resolve_current_outfit};
use crate::foundation::core::{AssetId, ItemId, PrincipalId};
use crate::foundation::error::{BakeError, BakeResult};
use crate::services::{AssetService, InventoryService};
use crate::wearable::model::{Outfit, OutfitItem, WearablesByType, items_by_ordinal, wearables_by_type};

/// Builds the compositor for an outfit item; `None` keeps the item out of the registry.
pub type CompositorFactory =
    Box<dyn Fn(&OutfitItem) -> Option<Box<dyn Compositor>> + Send + Sync>;

#[derive(Debug, Default)]
struct CacheState {
    outfit: Outfit,
    registry: BTreeMap<ItemId, SubBakerEntry>,
    textures: AvatarTextures,
    serial: u32,
    folder_id: Option<ItemId>,
    generation: u64,
    disposed: bool,
}

impl CacheState {
    fn ensure_live(&self) -> BakeResult<()> {
        if self.disposed {
            return Err(BakeError::Disposed);
        }
        Ok(())
    }
}

/// Per-avatar bake cache: diffs outfits into a sub-baker registry and bakes on demand.
///
/// Every state transition and accessor runs under one state lock; collaborator I/O never does.
/// Loads are additionally serialized by a separate gate so their commits never interleave.
pub struct BakeCache {
    state: Mutex<CacheState>,
    load_gate: Mutex<()>,
    factory: CompositorFactory,
    processor: BakeProcessor,
}

impl std::fmt::Debug for BakeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BakeCache")
            .field("state", &self.state)
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}

impl Default for BakeCache {
    fn default() -> Self {
        Self::new(BakeOpts::default())
    }
}

impl BakeCache {
    /// Empty cache using the built-in wearable-type compositors.
    pub fn new(opts: BakeOpts) -> Self {
        Self::with_factory(
            opts,
            Box::new(|item: &OutfitItem| compositor_for(Arc::clone(&item.wearable))),
        )
    }

    /// Empty cache with a custom compositor factory.
    pub fn with_factory(opts: BakeOpts, factory: CompositorFactory) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            load_gate: Mutex::new(()),
            factory,
            processor: BakeProcessor::new(opts),
        }
    }

    /// Bake options in effect.
    pub fn opts(&self) -> &BakeOpts {
        self.processor.opts()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current outfit, reconciling the sub-baker registry.
    ///
    /// Sub-bakers of removed items are disposed, surviving ones keep their memoized layers and
    /// take the new ordinal, and new items get a sub-baker when the factory yields one. The
    /// pre-bake texture slots are rebuilt from scratch in ascending ordinal order.
    pub fn set_current_outfit(&self, outfit: Outfit) -> BakeResult<()> {
        let mut st = self.state();
        st.ensure_live()?;
        self.apply_outfit(&mut st, outfit);
        Ok(())
    }

    fn apply_outfit(&self, st: &mut CacheState, outfit: Outfit) {
        // new sub-bakers are built before any state is touched
        let created: Vec<SubBakerEntry> = outfit
            .values()
            .filter(|item| !st.registry.contains_key(&item.key))
            .filter_map(|item| {
                (self.factory)(item).map(|compositor| SubBakerEntry {
                    key: item.key,
                    ordinal: item.ordinal,
                    baker: Arc::new(SubBaker::new(compositor)),
                })
            })
            .collect();

        let removed: Vec<ItemId> = st
            .registry
            .keys()
            .filter(|key| !outfit.contains_key(key))
            .copied()
            .collect();
        for key in &removed {
            if let Some(entry) = st.registry.remove(key) {
                entry.baker.dispose();
            }
        }

        let mut reordered = 0usize;
        for entry in st.registry.values_mut() {
            if let Some(item) = outfit.get(&entry.key)
                && item.ordinal != entry.ordinal
            {
                entry.ordinal = item.ordinal;
                reordered += 1;
            }
        }

        let added = created.len();
        for entry in created {
            st.registry.insert(entry.key, entry);
        }

        // any outfit change invalidates in-flight bakes, including items without a sub-baker
        if st.outfit != outfit {
            st.generation += 1;
        }

        st.textures.reset();
        for item in items_by_ordinal(&outfit) {
            for (&slot, &id) in &item.wearable.textures {
                st.textures[slot] = id;
            }
        }
        st.outfit = outfit;

        tracing::debug!(
            added,
            removed = removed.len(),
            reordered,
            registry = st.registry.len(),
            generation = st.generation,
            "outfit diff applied"
        );
    }

    /// Resolve the principal's current-outfit folder into an outfit and apply it.
    ///
    /// Missing items and assets are skipped and reported. A wearable that cannot be decoded
    /// fails the load with [`BakeError::Bake`] and leaves the cache unchanged.
    #[tracing::instrument(skip_all, fields(principal = %principal))]
    pub fn load_from_current_outfit(
        &self,
        principal: PrincipalId,
        inventory: &dyn InventoryService,
        assets: &dyn AssetService,
    ) -> BakeResult<LoadReport> {
        let _gate = self
            .load_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let cached_folder = {
            let st = self.state();
            st.ensure_live()?;
            st.folder_id
        };

        let resolved = resolve_current_outfit(principal, cached_folder, inventory, assets)?;

        let mut st = self.state();
        st.ensure_live()?;
        st.folder_id = Some(resolved.folder_id);
        st.serial = resolved.serial;
        let loaded = resolved.outfit.len();
        self.apply_outfit(&mut st, resolved.outfit);

        tracing::debug!(
            folder = %resolved.folder_id,
            serial = resolved.serial,
            loaded,
            skipped = resolved.skipped.len(),
            "current outfit loaded"
        );
        Ok(LoadReport {
            folder_id: resolved.folder_id,
            serial: resolved.serial,
            loaded,
            skipped: resolved.skipped,
        })
    }

    /// Bake the current registry, store the results, and publish an appearance snapshot.
    ///
    /// Compositing and asset stores run without the state lock. If the outfit changed in the
    /// meantime the result is dropped with [`BakeError::OutfitChanged`]; already stored
    /// assets stay orphaned. Store failures propagate without rollback.
    #[tracing::instrument(skip_all)]
    pub fn bake(&self, assets: &dyn AssetService) -> BakeResult<AppearanceInfo> {
        let (entries, outfit, generation) = {
            let st = self.state();
            st.ensure_live()?;
            let entries: Vec<SubBakerEntry> = st.registry.values().cloned().collect();
            (entries, st.outfit.clone(), st.generation)
        };

        let inputs = TextureInputs::new(assets);
        let output = self.processor.process(&entries, &outfit, &inputs)?;
        for (_, baked) in output.baked() {
            assets.store(baked.asset.clone())?;
        }

        let mut st = self.state();
        st.ensure_live()?;
        if st.generation != generation {
            return Err(BakeError::OutfitChanged {
                expected: generation,
                found: st.generation,
            });
        }

        for (target, baked) in &output.textures {
            st.textures[target.baked_slot()] = baked
                .as_ref()
                .map_or(AssetId::DEFAULT_AVATAR_TEXTURE, |b| b.asset.id);
        }
        for entry in &entries {
            entry.baker.mark_baked();
        }

        let info = AppearanceInfo {
            serial: st.serial,
            visual_params: output.visual_params.to_bytes(),
            avatar_height: output.avatar_height,
            avatar_textures: st.textures.clone(),
            wearables: wearables_by_type(&outfit),
        };
        tracing::info!(
            serial = info.serial,
            baked = output.baked().count(),
            sub_bakers = entries.len(),
            avatar_height = info.avatar_height,
            "appearance baked"
        );
        Ok(info)
    }

    /// Dispose every sub-baker and refuse further state transitions. Idempotent.
    pub fn dispose(&self) {
        let mut st = self.state();
        if st.disposed {
            return;
        }
        st.disposed = true;
        for entry in std::mem::take(&mut st.registry).into_values() {
            entry.baker.dispose();
        }
        st.generation += 1;
    }

    /// Return `true` after [`BakeCache::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.state().disposed
    }

    /// Registry snapshot in ascending ordinal order.
    pub fn sub_bakers(&self) -> Vec<SubBakerEntry> {
        let mut entries: Vec<SubBakerEntry> = self.state().registry.values().cloned().collect();
        entries.sort_by_key(|e| (e.ordinal, e.key));
        entries
    }

    /// Worn wearables grouped by type.
    pub fn wearables(&self) -> WearablesByType {
        wearables_by_type(&self.state().outfit)
    }

    /// Return `true` when the registry is non-empty and every sub-baker has been baked.
    pub fn is_baked(&self) -> bool {
        let st = self.state();
        !st.registry.is_empty() && st.registry.values().all(|e| e.baker.is_baked())
    }

    /// Copy of the current texture slots.
    pub fn avatar_textures(&self) -> AvatarTextures {
        self.state().textures.clone()
    }

    /// Copy of the current outfit.
    pub fn outfit(&self) -> Outfit {
        self.state().outfit.clone()
    }

    /// Serial of the last committed load.
    pub fn serial(&self) -> u32 {
        self.state().serial
    }

    /// Current-outfit folder id once a load resolved it.
    pub fn current_outfit_folder_id(&self) -> Option<ItemId> {
        self.state().folder_id
    }

    /// Counter bumped whenever the stored outfit changes and on dispose.
    pub fn generation(&self) -> u64 {
        self.state().generation
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/bake_cache.rs"]
mod tests;
