//! Avatar texture slots and the appearance snapshot published after a bake.

pub(crate) mod info;
pub(crate) mod textures;
