//! Decoded wearables, outfits, and the visual parameters derived from them.

pub(crate) mod decode;
pub(crate) mod model;
pub(crate) mod params;
