/// Convenience result type used across the bake pipeline.
pub type BakeResult<T> = Result<T, BakeError>;

/// Top-level error taxonomy used by bake cache APIs.
#[derive(thiserror::Error, Debug)]
pub enum BakeError {
    /// Fatal bake failure: the whole load or bake call is aborted and cached state is untouched.
    #[error("bake error: {0}")]
    Bake(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wearable or texture bytes that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failure reported by the asset service.
    #[error("asset service error: {0}")]
    Asset(String),

    /// Failure reported by the inventory service.
    #[error("inventory service error: {0}")]
    Inventory(String),

    /// The outfit changed while a bake was in flight; its results were not published.
    #[error("outfit changed during bake (generation {expected} -> {found})")]
    OutfitChanged {
        /// Generation captured when the bake snapshot was taken.
        expected: u64,
        /// Generation observed when the bake tried to commit.
        found: u64,
    },

    /// The cache has been disposed and no longer accepts state transitions.
    #[error("bake cache is disposed")]
    Disposed,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BakeError {
    /// Build a [`BakeError::Bake`] value.
    pub fn bake(msg: impl Into<String>) -> Self {
        Self::Bake(msg.into())
    }

    /// Build a [`BakeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BakeError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`BakeError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`BakeError::Inventory`] value.
    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::Inventory(msg.into())
    }

    /// Return `true` for errors that abort a load or bake without touching cached state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Bake(_) | Self::OutfitChanged { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
