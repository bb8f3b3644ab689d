//! In-memory preset store.

use std::collections::BTreeMap;

use presetforge_domain::Preset;

use super::ports::{preset_name, PresetStore};

/// Presets held in memory, keyed and ordered by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPresetStore {
    presets: BTreeMap<String, Preset>,
}

impl InMemoryPresetStore {
    pub fn new(presets: impl IntoIterator<Item = Preset>) -> Self {
        let mut store = Self::default();
        for preset in presets {
            store.insert(preset);
        }
        store
    }

    /// Add or replace a preset; returns the one it replaced.
    pub fn insert(&mut self, preset: Preset) -> Option<Preset> {
        self.presets.insert(preset.name.clone(), preset)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl PresetStore for InMemoryPresetStore {
    fn get(&self, name: &str) -> Option<Preset> {
        self.presets.get(preset_name(name)).cloned()
    }

    fn list(&self) -> Vec<Preset> {
        self.presets.values().cloned().collect()
    }
}
