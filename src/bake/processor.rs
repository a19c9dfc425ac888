use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::bake::image::{BakeImage, encode_png, multiply_in_place, over_in_place};
use crate::bake::inputs::TextureInputs;
use crate::bake::sub_baker::SubBakerEntry;
use crate::bake::target::BakeTarget;
use crate::foundation::core::{AssetId, Size};
use crate::foundation::error::{BakeError, BakeResult};
use crate::services::{Asset, AssetType};
use crate::wearable::model::Outfit;
use crate::wearable::params::VisualParams;

/// Options controlling how [`BakeProcessor`] renders targets.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BakeOpts {
    /// Override every target's edge length. `None` uses each target's native size.
    pub resolution: Option<u32>,
    /// Straight-alpha color of the canvas every target starts from.
    pub base_rgba: [u8; 4],
    /// Render targets concurrently on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for BakeOpts {
    fn default() -> Self {
        Self {
            resolution: None,
            base_rgba: [255, 255, 255, 255],
            parallel: false,
            threads: None,
        }
    }
}

impl BakeOpts {
    /// Output size for `target` under these options.
    pub fn target_size(&self, target: BakeTarget) -> Size {
        self.resolution
            .map(Size::square)
            .unwrap_or_else(|| target.native_size())
    }

    fn validate(&self) -> BakeResult<()> {
        if self.resolution == Some(0) {
            return Err(BakeError::validation(
                "bake 'resolution' must be >= 1 when set",
            ));
        }
        if self.threads == Some(0) {
            return Err(BakeError::validation(
                "bake 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// One rendered target, encoded and ready to store.
#[derive(Clone, Debug)]
pub struct BakedTexture {
    /// Composited pixels.
    pub image: BakeImage,
    /// PNG texture asset with a fresh id.
    pub asset: Asset,
}

/// Result of one [`BakeProcessor::process`] run.
#[derive(Clone, Debug)]
pub struct BakeOutput {
    /// Every target; `None` for optional targets nothing contributed to.
    pub textures: BTreeMap<BakeTarget, Option<BakedTexture>>,
    /// Visual parameters of the same wearable set.
    pub visual_params: VisualParams,
    /// Avatar height in meters.
    pub avatar_height: f32,
}

impl BakeOutput {
    /// Produced textures in target order.
    pub fn baked(&self) -> impl Iterator<Item = (BakeTarget, &BakedTexture)> + '_ {
        self.textures
            .iter()
            .filter_map(|(t, baked)| baked.as_ref().map(|b| (*t, b)))
    }
}

/// Stateless compositor of sub-baker layers into per-target textures.
#[derive(Clone, Debug, Default)]
pub struct BakeProcessor {
    opts: BakeOpts,
}

impl BakeProcessor {
    /// Processor with `opts`.
    pub fn new(opts: BakeOpts) -> Self {
        Self { opts }
    }

    /// Options in effect.
    pub fn opts(&self) -> &BakeOpts {
        &self.opts
    }

    /// Bake every mandatory target, plus each optional target at least one sub-baker
    /// contributes to.
    ///
    /// Layers are applied in ascending ordinal order (ties by key): each sub-baker's image is
    /// composited source-over, then the canvas is multiplied by that sub-baker's tint.
    #[tracing::instrument(skip_all, fields(sub_bakers = sub_bakers.len(), parallel = self.opts.parallel))]
    pub fn process(
        &self,
        sub_bakers: &[SubBakerEntry],
        outfit: &Outfit,
        inputs: &TextureInputs<'_>,
    ) -> BakeResult<BakeOutput> {
        self.opts.validate()?;

        let mut layers: Vec<&SubBakerEntry> = sub_bakers.iter().collect();
        layers.sort_by_key(|e| (e.ordinal, e.key));

        let targets: Vec<BakeTarget> = BakeTarget::ALL
            .into_iter()
            .filter(|t| t.is_mandatory() || layers.iter().any(|e| e.baker.contributes(*t)))
            .collect();

        let rendered: Vec<(BakeTarget, BakedTexture)> = if self.opts.parallel {
            let pool = build_thread_pool(self.opts.threads)?;
            pool.install(|| {
                targets
                    .par_iter()
                    .map(|&t| self.bake_target(t, &layers, inputs).map(|b| (t, b)))
                    .collect::<BakeResult<Vec<_>>>()
            })?
        } else {
            targets
                .iter()
                .map(|&t| self.bake_target(t, &layers, inputs).map(|b| (t, b)))
                .collect::<BakeResult<Vec<_>>>()?
        };

        let mut textures: BTreeMap<BakeTarget, Option<BakedTexture>> =
            BakeTarget::ALL.into_iter().map(|t| (t, None)).collect();
        for (target, baked) in rendered {
            textures.insert(target, Some(baked));
        }

        let visual_params = VisualParams::from_outfit(outfit);
        let avatar_height = visual_params.avatar_height();
        tracing::debug!(
            targets = targets.len(),
            visual_params = visual_params.len(),
            avatar_height,
            "bake processed"
        );
        Ok(BakeOutput {
            textures,
            visual_params,
            avatar_height,
        })
    }

    fn bake_target(
        &self,
        target: BakeTarget,
        layers: &[&SubBakerEntry],
        inputs: &TextureInputs<'_>,
    ) -> BakeResult<BakedTexture> {
        let image = self.composite_target(target, layers, inputs)?;
        let data = encode_png(&image)?;
        let asset = Asset {
            id: AssetId::random(),
            asset_type: AssetType::Texture,
            name: format!("baked {target:?}"),
            temporary: true,
            data,
        };
        Ok(BakedTexture { image, asset })
    }

    fn composite_target(
        &self,
        target: BakeTarget,
        layers: &[&SubBakerEntry],
        inputs: &TextureInputs<'_>,
    ) -> BakeResult<BakeImage> {
        let size = self.opts.target_size(target);
        let base = BakeImage::solid(size, self.opts.base_rgba)?;
        let mut canvas = Arc::unwrap_or_clone(base.rgba8_premul);

        for entry in layers {
            if let Some(layer) = entry.baker.composite(target, size, inputs)? {
                over_in_place(&mut canvas, &layer.rgba8_premul)?;
            }
            if let Some(tint) = entry.baker.tint(target) {
                multiply_in_place(&mut canvas, tint);
            }
        }
        BakeImage::from_premul(size, canvas)
    }
}

fn build_thread_pool(threads: Option<usize>) -> BakeResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BakeError::bake(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/bake/processor.rs"]
mod tests;
