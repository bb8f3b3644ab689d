//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Preset lookup (files, embedded bundles, test doubles)
//! - Diagnostics emitted while assembling a payload

mod error;

pub use error::EngineError;

use presetforge_domain::{CompositionError, ExtensionKind, Preset};

/// Prefix callers may put in front of a preset name (tool names)
pub const TOOL_PREFIX: &str = "presetforge_";

/// Strip the optional tool prefix from a requested preset name.
pub fn preset_name(requested: &str) -> &str {
    requested.strip_prefix(TOOL_PREFIX).unwrap_or(requested)
}

// =============================================================================
// Preset Store Port
// =============================================================================

/// Source of loaded presets. Loading and caching live outside the engine.
#[cfg_attr(test, mockall::automock)]
pub trait PresetStore: Send + Sync {
    /// Look up a preset by name; implementations accept tool-prefixed names.
    fn get(&self, name: &str) -> Option<Preset>;

    /// All presets, ordered by name.
    fn list(&self) -> Vec<Preset>;
}

// =============================================================================
// Assembly Observer Port
// =============================================================================

/// Why a configured extension contributed nothing to the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmitReason {
    /// Disabled, or nothing usable left (no models, no enabled units)
    Inactive,
    /// No builder exists for this extension
    Unsupported,
}

impl OmitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Receives diagnostics while a payload is assembled.
#[cfg_attr(test, mockall::automock)]
pub trait AssemblyObserver: Send + Sync {
    /// Region-aware composition was abandoned for the simple join.
    fn composition_fallback(&self, preset: &str, error: &CompositionError);

    /// An extension contributed `slots` positional arguments.
    fn extension_built(&self, preset: &str, extension: ExtensionKind, slots: usize);

    /// A configured extension was left out of the payload.
    fn extension_omitted(&self, preset: &str, extension: &str, reason: OmitReason);
}
