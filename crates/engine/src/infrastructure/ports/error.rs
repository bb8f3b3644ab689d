//! Error types for engine entry points that go through a port.

use presetforge_domain::DomainError;

/// Failure of a name-based request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// No preset with this name in the store
    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl EngineError {
    pub fn preset_not_found(name: impl Into<String>) -> Self {
        Self::PresetNotFound(name.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PresetNotFound(_))
    }
}
