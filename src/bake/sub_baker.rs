use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bake::compositor::Compositor;
use crate::bake::image::BakeImage;
use crate::bake::inputs::TextureInputs;
use crate::bake::target::BakeTarget;
use crate::foundation::core::{ItemId, Size, TintColor};
use crate::foundation::error::BakeResult;
use crate::wearable::model::{Wearable, WearableType};

static NEXT_SUB_BAKER_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle wrapper around one outfit item's [`Compositor`].
///
/// Composites are memoized per target for the sub-baker's lifetime; the wearable is immutable so
/// a memoized layer never goes stale. Layers whose texture was unavailable are not memoized. Sub-bakers are shared as `Arc`, so a bake that snapshotted
/// one keeps it usable even if a concurrent outfit change disposes it. A disposed sub-baker
/// still composites on request but never memoizes again.
#[derive(Debug)]
pub struct SubBaker {
    id: u64,
    compositor: Box<dyn Compositor>,
    memo: Mutex<HashMap<BakeTarget, Arc<BakeImage>>>,
    baked: AtomicBool,
    disposed: AtomicBool,
}

impl SubBaker {
    /// Wrap a compositor.
    pub fn new(compositor: Box<dyn Compositor>) -> Self {
        Self {
            id: NEXT_SUB_BAKER_ID.fetch_add(1, Ordering::Relaxed),
            compositor,
            memo: Mutex::new(HashMap::new()),
            baked: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    /// Process-unique instance id; a re-created sub-baker gets a new one.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Source wearable.
    pub fn wearable(&self) -> &Wearable {
        self.compositor.wearable()
    }

    /// Wearable kind.
    pub fn wearable_type(&self) -> WearableType {
        self.compositor.wearable_type()
    }

    /// Return `true` once a bake including this sub-baker has been published.
    pub fn is_baked(&self) -> bool {
        self.baked.load(Ordering::Acquire)
    }

    pub(crate) fn mark_baked(&self) {
        self.baked.store(true, Ordering::Release);
    }

    /// Return `true` after [`SubBaker::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Return `true` when this sub-baker affects `target` through pixels or tint.
    pub fn contributes(&self, target: BakeTarget) -> bool {
        self.compositor.contributes(target)
    }

    /// Tint applied to `target` after this layer.
    pub fn tint(&self, target: BakeTarget) -> Option<TintColor> {
        self.compositor.tint(target)
    }

    /// This sub-baker's layer for `target`, rendered on first request.
    pub fn composite(
        &self,
        target: BakeTarget,
        size: Size,
        inputs: &TextureInputs<'_>,
    ) -> BakeResult<Option<Arc<BakeImage>>> {
        if let Some(hit) = self.memo().get(&target)
            && hit.size() == size
        {
            return Ok(Some(Arc::clone(hit)));
        }

        let Some(layer) = self.compositor.render(target, size, inputs)? else {
            return Ok(None);
        };

        // placeholders for unavailable textures are retried on the next bake
        if layer.settled {
            let mut memo = self.memo();
            if !self.is_disposed() {
                memo.insert(target, Arc::clone(&layer.image));
            }
        }
        Ok(Some(layer.image))
    }

    /// Release memoized layers. Returns `false` if already disposed.
    pub(crate) fn dispose(&self) -> bool {
        let mut memo = self.memo();
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        memo.clear();
        true
    }

    /// Number of memoized target layers.
    pub fn memoized_targets(&self) -> usize {
        self.memo().len()
    }

    fn memo(&self) -> MutexGuard<'_, HashMap<BakeTarget, Arc<BakeImage>>> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry entry as handed out by [`crate::BakeCache::sub_bakers`].
#[derive(Clone, Debug)]
pub struct SubBakerEntry {
    /// Outfit-item identity.
    pub key: ItemId,
    /// Layer position at snapshot time.
    pub ordinal: i32,
    /// Shared sub-baker.
    pub baker: Arc<SubBaker>,
}

#[cfg(test)]
#[path = "../../tests/unit/bake/sub_baker.rs"]
mod tests;
