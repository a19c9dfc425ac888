//! The per-avatar bake cache and the current-outfit resolver feeding it.

pub(crate) mod bake_cache;
pub(crate) mod resolver;
