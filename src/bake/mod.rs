//! Per-target compositing: wearable layers in, baked textures out.

pub(crate) mod compositor;
pub(crate) mod image;
pub(crate) mod inputs;
pub(crate) mod processor;
pub(crate) mod sub_baker;
pub(crate) mod target;
