//! Extension configuration as written in presets
//!
//! These are the named, human-editable forms. The engine turns them into the
//! positional argument lists each plugin expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use super::regional::RegionalPrompterConfig;

/// ADetailer model used when an object entry names none
pub const DEFAULT_ADETAILER_MODEL: &str = "face_yolov8n.pt";

// =============================================================================
// ADetailer
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ADetailerConfig {
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub skip_img2img: Option<bool>,
    #[serde(default, deserialize_with = "lenient::vec_or_default")]
    pub models: Vec<ADetailerModelEntry>,
}

impl ADetailerConfig {
    pub fn enabled_with(models: impl IntoIterator<Item = ADetailerModelEntry>) -> Self {
        Self {
            enabled: Some(true),
            skip_img2img: None,
            models: models.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    /// Usable models in list order; unreadable entries are skipped.
    pub fn resolved_models(&self) -> Vec<ADetailerModel> {
        self.models
            .iter()
            .filter_map(ADetailerModelEntry::resolve)
            .collect()
    }
}

/// A model list entry: a bare model name or a full object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ADetailerModelEntry {
    Name(String),
    Config(ADetailerModel),
    Other(Value),
}

impl Default for ADetailerModelEntry {
    fn default() -> Self {
        Self::Other(Value::Null)
    }
}

impl ADetailerModelEntry {
    pub fn resolve(&self) -> Option<ADetailerModel> {
        match self {
            Self::Name(name) => Some(ADetailerModel::named(name.clone())),
            Self::Config(model) => {
                let mut model = model.clone();
                model.model.get_or_insert_with(|| DEFAULT_ADETAILER_MODEL.to_string());
                Some(model)
            }
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for ADetailerModelEntry {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<ADetailerModel> for ADetailerModelEntry {
    fn from(model: ADetailerModel) -> Self {
        Self::Config(model)
    }
}

/// Per-model ADetailer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ADetailerModel {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub mask_blur: Option<i64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub dilate_erode: Option<i64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub mask_merge_invert: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub denoising_strength: Option<f64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub inpaint_only_masked: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub inpaint_padding: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_width: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_steps: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub steps: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_cfg_scale: Option<bool>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_checkpoint: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_vae: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub vae: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_sampler: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_separate_clip_skip: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub clip_skip: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub restore_faces_after: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub controlnet_model: Option<String>,
}

impl ADetailerModel {
    pub fn named(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Self::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Model name, unless blank or the literal "None"
    pub fn usable_name(&self) -> Option<&str> {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != "None")
    }
}

// =============================================================================
// ControlNet
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlNetConfig {
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::vec_or_default")]
    pub units: Vec<ControlNetUnit>,
}

impl ControlNetConfig {
    pub fn enabled_with(units: impl IntoIterator<Item = ControlNetUnit>) -> Self {
        Self {
            enabled: Some(true),
            units: units.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlNetUnit {
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub resize_mode: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub pixel_perfect: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<i64>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub threshold_a: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub threshold_b: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub guidance_start: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub guidance_end: Option<f64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub processor_res: Option<i64>,
}

impl ControlNetUnit {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

// =============================================================================
// Dynamic Prompts
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicPromptsConfig {
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enable_dynamic_prompts: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub combinatorial_generation: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub combinatorial: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub combinatorial_batches: Option<i64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub magic_prompt: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub feeling_lucky: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub attention_grabber: Option<bool>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub min_attention: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub max_attention: Option<f64>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub magic_prompt_length: Option<i64>,
    #[serde(default, deserialize_with = "lenient::f64", skip_serializing_if = "Option::is_none")]
    pub magic_temp_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_fixed_seed: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub unlink_seed: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub disable_negative_prompt: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enable_jinja_templates: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub no_image_generation: Option<bool>,
    #[serde(default, deserialize_with = "lenient::i64", skip_serializing_if = "Option::is_none")]
    pub max_generations: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub magic_model: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub magic_blocklist_regex: Option<String>,
}

impl DynamicPromptsConfig {
    pub fn enabled() -> Self {
        Self {
            enable_dynamic_prompts: Some(true),
            ..Self::default()
        }
    }

    pub fn with_combinatorial(mut self, combinatorial: bool) -> Self {
        self.combinatorial_generation = Some(combinatorial);
        self
    }

    pub fn with_max_generations(mut self, max_generations: i64) -> Self {
        self.max_generations = Some(max_generations);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enable_dynamic_prompts
            .or(self.enabled)
            .unwrap_or(false)
    }

    pub fn is_combinatorial(&self) -> bool {
        self.combinatorial_generation
            .or(self.combinatorial)
            .unwrap_or(false)
    }
}

// =============================================================================
// Closed set of supported extensions
// =============================================================================

/// Supported extensions, in payload build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionKind {
    ADetailer,
    ControlNet,
    RegionalPrompter,
    DynamicPrompts,
}

impl ExtensionKind {
    pub const ALL: [ExtensionKind; 4] = [
        Self::ADetailer,
        Self::ControlNet,
        Self::RegionalPrompter,
        Self::DynamicPrompts,
    ];

    /// Key under `alwayson_scripts`
    pub fn plugin_key(&self) -> &'static str {
        match self {
            Self::ADetailer => "ADetailer",
            Self::ControlNet => "ControlNet",
            Self::RegionalPrompter => "Regional Prompter",
            Self::DynamicPrompts => "Dynamic Prompts",
        }
    }

    /// Key under a preset's `extensions`
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::ADetailer => "adetailer",
            Self::ControlNet => "controlnet",
            Self::RegionalPrompter => "regional_prompter",
            Self::DynamicPrompts => "dynamic_prompts",
        }
    }
}

impl std::fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.plugin_key())
    }
}

/// One configured extension of a preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtensionConfig<'a> {
    ADetailer(&'a ADetailerConfig),
    ControlNet(&'a ControlNetConfig),
    RegionalPrompter(&'a RegionalPrompterConfig),
    DynamicPrompts(&'a DynamicPromptsConfig),
}

impl ExtensionConfig<'_> {
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Self::ADetailer(_) => ExtensionKind::ADetailer,
            Self::ControlNet(_) => ExtensionKind::ControlNet,
            Self::RegionalPrompter(_) => ExtensionKind::RegionalPrompter,
            Self::DynamicPrompts(_) => ExtensionKind::DynamicPrompts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_adetailer_model_entries() {
        let config: ADetailerConfig = serde_json::from_value(json!({
            "enabled": true,
            "models": [
                "face_yolov8n.pt",
                {"model": "hand_yolov8n.pt", "confidence": "0.5"},
                {"prompt": "detailed eyes"},
                42
            ]
        }))
        .unwrap();

        assert!(config.is_enabled());
        let models = config.resolved_models();
        assert_eq!(models.len(), 3);
        assert_eq!(models[0].usable_name(), Some("face_yolov8n.pt"));
        assert_eq!(models[1].confidence, Some(0.5));
        assert_eq!(models[2].usable_name(), Some(DEFAULT_ADETAILER_MODEL));
        assert_eq!(models[2].prompt.as_deref(), Some("detailed eyes"));
    }

    #[test]
    fn test_adetailer_unusable_names() {
        assert_eq!(ADetailerModel::named("None").usable_name(), None);
        assert_eq!(ADetailerModel::named("  ").usable_name(), None);
    }

    #[test]
    fn test_adetailer_models_not_a_list() {
        let config: ADetailerConfig =
            serde_json::from_value(json!({"enabled": true, "models": "face"})).unwrap();
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_controlnet_malformed_unit_keeps_position() {
        let config: ControlNetConfig = serde_json::from_value(json!({
            "enabled": true,
            "units": ["broken", {"model": "control_v11p_sd15_openpose", "weight": 0.8}]
        }))
        .unwrap();
        assert_eq!(config.units.len(), 2);
        assert_eq!(config.units[0], ControlNetUnit::default());
        assert_eq!(config.units[1].weight, Some(0.8));
    }

    #[test]
    fn test_dynamic_prompts_legacy_flags() {
        let dp: DynamicPromptsConfig =
            serde_json::from_value(json!({"enabled": true, "combinatorial": true})).unwrap();
        assert!(dp.is_enabled());
        assert!(dp.is_combinatorial());

        let dp: DynamicPromptsConfig = serde_json::from_value(json!({
            "enable_dynamic_prompts": false,
            "enabled": true
        }))
        .unwrap();
        assert!(!dp.is_enabled());
    }

    #[test]
    fn test_extension_kind_keys() {
        let keys: Vec<_> = ExtensionKind::ALL.iter().map(|k| k.plugin_key()).collect();
        assert_eq!(
            keys,
            vec!["ADetailer", "ControlNet", "Regional Prompter", "Dynamic Prompts"]
        );
        assert_eq!(ExtensionKind::RegionalPrompter.config_key(), "regional_prompter");
    }
}
