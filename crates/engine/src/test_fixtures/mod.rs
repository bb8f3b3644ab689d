//! Test fixtures loader for JSON fixture files and common test helpers.
//!
//! This module provides utilities for loading test data from the `test_data/` directory
//! and helper functions for building assemblers and stores over the fixture presets.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::presets;
//!
//! #[test]
//! fn test_base_preset_has_suffix() {
//!     let preset = presets::animagine_base();
//!     // ... test logic
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::infrastructure::ports::MockAssemblyObserver;
use crate::infrastructure::preset_store::InMemoryPresetStore;
use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::PayloadAssembler;

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a JSON fixture from test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

/// Load a fixture and return Option instead of panicking.
pub fn try_load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> Option<T> {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).ok()?;
    serde_json::from_str(&content).ok()
}

// =============================================================================
// Preset Fixtures
// =============================================================================

/// Pre-built preset fixtures for testing.
pub mod presets {
    use super::*;
    use presetforge_domain::Preset;

    /// Every fixture preset under `test_data/presets/`
    pub const ALL: &[&str] = &[
        "txt2img_animagine_base",
        "txt2img_rp_matrix",
        "txt2img_rp_mask",
        "txt2img_cn_multi_3units",
        "txt2img_dynamic_prompts",
        "img2img_animagine_base",
        "extras_upscale_ultrasharp",
        "utility_switch_model",
    ];

    /// Load a fixture preset by name.
    pub fn load(name: &str) -> Preset {
        load_fixture(&format!("presets/{name}.json"))
    }

    /// Animagine txt2img with template suffix/negative and one ADetailer model.
    pub fn animagine_base() -> Preset {
        load("txt2img_animagine_base")
    }

    /// Regional Prompter in two-column matrix mode, template prefix and suffix.
    pub fn rp_matrix() -> Preset {
        load("txt2img_rp_matrix")
    }

    /// Regional Prompter in mask mode with a base region (legacy field names).
    pub fn rp_mask() -> Preset {
        load("txt2img_rp_mask")
    }

    /// Three ControlNet units (weights 1.0 / 0.8 / 0.6), ADetailer, hires settings.
    pub fn cn_multi_3units() -> Preset {
        load("txt2img_cn_multi_3units")
    }

    /// Dynamic Prompts plus an extension the engine has no builder for.
    pub fn dynamic_prompts() -> Preset {
        load("txt2img_dynamic_prompts")
    }

    /// img2img with a legacy `prompt_suffix` setting.
    pub fn img2img_base() -> Preset {
        load("img2img_animagine_base")
    }

    pub fn extras_upscale() -> Preset {
        load("extras_upscale_ultrasharp")
    }

    pub fn switch_model() -> Preset {
        load("utility_switch_model")
    }

    /// A store holding every fixture preset.
    pub fn store() -> InMemoryPresetStore {
        InMemoryPresetStore::new(ALL.iter().map(|name| load(name)))
    }
}

// =============================================================================
// Assembler Helpers
// =============================================================================

/// Observer mock that accepts every call.
pub fn permissive_observer() -> MockAssemblyObserver {
    let mut observer = MockAssemblyObserver::new();
    observer.expect_composition_fallback().returning(|_, _| ());
    observer.expect_extension_built().returning(|_, _, _| ());
    observer.expect_extension_omitted().returning(|_, _, _| ());
    observer
}

/// Assembler with default settings and a permissive observer.
pub fn assembler() -> PayloadAssembler {
    assembler_with(EngineSettings::default())
}

pub fn assembler_with(settings: EngineSettings) -> PayloadAssembler {
    PayloadAssembler::with_observer(settings, Arc::new(permissive_observer())).unwrap()
}

/// Route `tracing` output to the test writer; safe to call more than once.
pub fn init_test_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("presetforge=debug")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::PresetStore;

    #[test]
    fn test_all_fixture_presets_parse_and_validate() {
        for name in presets::ALL {
            let preset = presets::load(name);
            assert_eq!(preset.name, *name);
            preset.validate().unwrap();
        }
    }

    #[test]
    fn test_store_resolves_tool_prefixed_names() {
        let store = presets::store();
        assert_eq!(store.len(), presets::ALL.len());
        assert!(store.get("presetforge_txt2img_rp_matrix").is_some());
    }

    #[test]
    fn test_missing_fixture_is_none() {
        assert!(try_load_fixture::<serde_json::Value>("presets/missing.json").is_none());
    }
}
