use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::bake::image::{BakeImage, decode_texture};
use crate::foundation::core::{AssetId, Size};
use crate::services::AssetService;

/// Outcome of looking up one source texture.
#[derive(Clone, Debug)]
pub enum TextureLookup {
    /// Decoded pixels resampled to the requested size.
    Ready(Arc<BakeImage>),
    /// No pixels now or later: an unset or placeholder id, or bytes that do not decode.
    Absent,
    /// The asset service could not provide the texture this time; a later bake may succeed.
    Unavailable,
}

impl TextureLookup {
    /// The decoded image, if any.
    pub fn image(&self) -> Option<&Arc<BakeImage>> {
        match self {
            Self::Ready(img) => Some(img),
            Self::Absent | Self::Unavailable => None,
        }
    }

    /// Return `true` when a later lookup of the same texture would give the same answer.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Fetch-and-decode cache for the source textures wearables reference.
///
/// Lives for one bake pass. Textures that are missing, unfetchable, or undecodable are logged and
/// reported without pixels; the caller substitutes a transparent layer.
pub struct TextureInputs<'a> {
    assets: &'a dyn AssetService,
    decoded: Mutex<HashMap<(AssetId, Size), TextureLookup>>,
}

impl<'a> TextureInputs<'a> {
    /// Empty cache backed by `assets`.
    pub fn new(assets: &'a dyn AssetService) -> Self {
        Self {
            assets,
            decoded: Mutex::new(HashMap::new()),
        }
    }

    /// Texture `id` resampled to `size`.
    pub fn texture(&self, id: AssetId, size: Size) -> TextureLookup {
        if !id.is_real_texture() {
            return TextureLookup::Absent;
        }
        let key = (id, size);
        if let Some(hit) = self
            .decoded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return hit.clone();
        }

        let loaded = self.load(id, size);
        self.decoded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, loaded.clone());
        loaded
    }

    fn load(&self, id: AssetId, size: Size) -> TextureLookup {
        let asset = match self.assets.get(id) {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                tracing::warn!(texture = %id, "source texture missing from asset service");
                return TextureLookup::Unavailable;
            }
            Err(e) => {
                tracing::warn!(texture = %id, error = %e, "source texture fetch failed, layering transparent");
                return TextureLookup::Unavailable;
            }
        };
        match decode_texture(&asset.data, size) {
            Ok(img) => TextureLookup::Ready(Arc::new(img)),
            Err(e) => {
                tracing::warn!(texture = %id, error = %e, "source texture undecodable, layering transparent");
                TextureLookup::Absent
            }
        }
    }
}

impl std::fmt::Debug for TextureInputs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .decoded
            .lock()
            .map(|m| m.len())
            .unwrap_or_default();
        f.debug_struct("TextureInputs")
            .field("cached", &cached)
            .finish()
    }
}
