//! Preset Entity
//!
//! A named, declarative recipe for one backend call: default generation
//! settings, an optional prompt template, and extension configuration.
//! Presets are read-only once loaded.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::value_objects::{
    lenient, ADetailerConfig, ControlNetConfig, DynamicPromptsConfig, ExtensionConfig,
    ExtensionKind, RegionalPrompterConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: PresetKind,
    /// Generation defaults, mandatory for `txt2img` / `img2img`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_settings: Option<Map<String, Value>>,
    /// Request body, mandatory for utility kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<PromptTemplate>,
}

impl Preset {
    pub fn new(name: impl Into<String>, kind: PresetKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            base_settings: None,
            settings: None,
            extensions: None,
            prompt_template: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set `base_settings` from a JSON object; other values are ignored.
    pub fn with_base_settings(mut self, settings: Value) -> Self {
        if let Value::Object(map) = settings {
            self.base_settings = Some(map);
        }
        self
    }

    /// Set `settings` from a JSON object; other values are ignored.
    pub fn with_settings(mut self, settings: Value) -> Self {
        if let Value::Object(map) = settings {
            self.settings = Some(map);
        }
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn with_prompt_template(mut self, template: PromptTemplate) -> Self {
        self.prompt_template = Some(template);
        self
    }

    /// The settings object this preset's kind requires.
    pub fn settings_for_kind(&self) -> Result<&Map<String, Value>, DomainError> {
        let (settings, field) = match self.kind {
            PresetKind::Unknown => {
                return Err(DomainError::configuration(
                    &self.name,
                    "unsupported preset type",
                ))
            }
            kind if kind.is_generation() => (self.base_settings.as_ref(), "base_settings"),
            _ => (self.settings.as_ref(), "settings"),
        };
        settings.ok_or_else(|| {
            DomainError::configuration(
                &self.name,
                format!("{} presets require {}", self.kind, field),
            )
        })
    }

    /// Validate the preset's shape
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::configuration(
                &self.name,
                "preset name cannot be empty",
            ));
        }
        self.settings_for_kind().map(|_| ())
    }

    /// Configured Regional Prompter block, if active
    pub fn active_regional_prompter(&self) -> Option<&RegionalPrompterConfig> {
        self.extensions
            .as_ref()?
            .regional_prompter
            .as_ref()
            .filter(|rp| rp.is_active())
    }
}

/// Backend endpoint family a preset targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetKind {
    #[serde(rename = "txt2img")]
    Txt2Img,
    #[serde(rename = "img2img")]
    Img2Img,
    PngInfo,
    Extras,
    ExtrasSingleImage,
    ExtrasBatchImages,
    Interrogate,
    Progress,
    OptionsGet,
    OptionsSet,
    Models,
    Refresh,
    Samplers,
    UnloadCheckpoint,
    Rembg,
    Tagger,
    Utility,
    /// A type this engine does not know; rejected at assembly
    #[serde(other)]
    Unknown,
}

impl PresetKind {
    pub const KNOWN: [PresetKind; 17] = [
        Self::Txt2Img,
        Self::Img2Img,
        Self::PngInfo,
        Self::Extras,
        Self::ExtrasSingleImage,
        Self::ExtrasBatchImages,
        Self::Interrogate,
        Self::Progress,
        Self::OptionsGet,
        Self::OptionsSet,
        Self::Models,
        Self::Refresh,
        Self::Samplers,
        Self::UnloadCheckpoint,
        Self::Rembg,
        Self::Tagger,
        Self::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt2Img => "txt2img",
            Self::Img2Img => "img2img",
            Self::PngInfo => "png-info",
            Self::Extras => "extras",
            Self::ExtrasSingleImage => "extras-single-image",
            Self::ExtrasBatchImages => "extras-batch-images",
            Self::Interrogate => "interrogate",
            Self::Progress => "progress",
            Self::OptionsGet => "options-get",
            Self::OptionsSet => "options-set",
            Self::Models => "models",
            Self::Refresh => "refresh",
            Self::Samplers => "samplers",
            Self::UnloadCheckpoint => "unload-checkpoint",
            Self::Rembg => "rembg",
            Self::Tagger => "tagger",
            Self::Utility => "utility",
            Self::Unknown => "unknown",
        }
    }

    /// `txt2img` and `img2img`; everything else is a utility call
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Txt2Img | Self::Img2Img)
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::KNOWN
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::configuration(s, "unknown preset type"))
    }
}

/// Text wrapped around the caller's prompts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub positive_prefix: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub positive_suffix: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub negative: Option<String>,
}

impl PromptTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.positive_prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.positive_suffix = Some(suffix.into());
        self
    }

    pub fn with_negative(mut self, negative: impl Into<String>) -> Self {
        self.negative = Some(negative.into());
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        non_blank(&self.positive_prefix)
    }

    pub fn suffix(&self) -> Option<&str> {
        non_blank(&self.positive_suffix)
    }

    pub fn negative(&self) -> Option<&str> {
        non_blank(&self.negative)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// A preset's `extensions` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub adetailer: Option<ADetailerConfig>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub controlnet: Option<ControlNetConfig>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub regional_prompter: Option<RegionalPrompterConfig>,
    #[serde(default, deserialize_with = "lenient::or_none", skip_serializing_if = "Option::is_none")]
    pub dynamic_prompts: Option<DynamicPromptsConfig>,
    /// Extensions this engine has no builder for, kept as written
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adetailer(mut self, config: ADetailerConfig) -> Self {
        self.adetailer = Some(config);
        self
    }

    pub fn with_controlnet(mut self, config: ControlNetConfig) -> Self {
        self.controlnet = Some(config);
        self
    }

    pub fn with_regional_prompter(mut self, config: RegionalPrompterConfig) -> Self {
        self.regional_prompter = Some(config);
        self
    }

    pub fn with_dynamic_prompts(mut self, config: DynamicPromptsConfig) -> Self {
        self.dynamic_prompts = Some(config);
        self
    }

    /// Present extensions in build order
    pub fn configs(&self) -> Vec<ExtensionConfig<'_>> {
        ExtensionKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind))
            .collect()
    }

    pub fn get(&self, kind: ExtensionKind) -> Option<ExtensionConfig<'_>> {
        match kind {
            ExtensionKind::ADetailer => self.adetailer.as_ref().map(ExtensionConfig::ADetailer),
            ExtensionKind::ControlNet => self.controlnet.as_ref().map(ExtensionConfig::ControlNet),
            ExtensionKind::RegionalPrompter => self
                .regional_prompter
                .as_ref()
                .map(ExtensionConfig::RegionalPrompter),
            ExtensionKind::DynamicPrompts => self
                .dynamic_prompts
                .as_ref()
                .map(ExtensionConfig::DynamicPrompts),
        }
    }

    /// Names of configured extensions with no builder
    pub fn unsupported(&self) -> impl Iterator<Item = &str> {
        self.other.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_generation_preset() {
        let preset: Preset = serde_json::from_value(json!({
            "name": "anime_portrait",
            "type": "txt2img",
            "base_settings": {"steps": 20, "cfg_scale": 7},
            "prompt_template": {"positive_prefix": "masterpiece", "negative": "lowres"},
            "extensions": {
                "adetailer": {"enabled": true, "models": ["face_yolov8n.pt"]},
                "latent_couple": {"enabled": true}
            }
        }))
        .unwrap();

        assert_eq!(preset.kind, PresetKind::Txt2Img);
        assert!(preset.validate().is_ok());
        let extensions = preset.extensions.as_ref().unwrap();
        assert_eq!(extensions.configs().len(), 1);
        assert_eq!(extensions.unsupported().collect::<Vec<_>>(), vec!["latent_couple"]);
        assert_eq!(
            preset.prompt_template.as_ref().unwrap().prefix(),
            Some("masterpiece")
        );
    }

    #[test]
    fn test_unknown_kind_is_forward_compatible() {
        let preset: Preset = serde_json::from_value(json!({
            "name": "future",
            "type": "txt2video",
            "settings": {}
        }))
        .unwrap();
        assert_eq!(preset.kind, PresetKind::Unknown);
        assert!(preset.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_settings_for_kind() {
        let gen = Preset::new("gen", PresetKind::Img2Img).with_settings(json!({"a": 1}));
        let err = gen.settings_for_kind().unwrap_err();
        assert!(err.to_string().contains("img2img presets require base_settings"));

        let util = Preset::new("samplers", PresetKind::Samplers).with_settings(json!({}));
        assert!(util.settings_for_kind().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let preset = Preset::new(" ", PresetKind::Txt2Img).with_base_settings(json!({}));
        assert!(preset.validate().is_err());
    }

    #[test]
    fn test_kind_names_round_trip_through_from_str() {
        for kind in PresetKind::KNOWN {
            assert_eq!(kind.as_str().parse::<PresetKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
        assert!("txt2video".parse::<PresetKind>().is_err());
    }

    #[test]
    fn test_extensions_order_and_malformed_block() {
        let extensions: Extensions = serde_json::from_value(json!({
            "dynamic_prompts": {"enabled": true},
            "controlnet": "on",
            "adetailer": {"enabled": false}
        }))
        .unwrap();
        let kinds: Vec<_> = extensions.configs().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![ExtensionKind::ADetailer, ExtensionKind::DynamicPrompts]
        );
        assert!(extensions.other.is_empty());
    }

    #[test]
    fn test_active_regional_prompter() {
        let preset = Preset::new("rp", PresetKind::Txt2Img).with_extensions(
            Extensions::new().with_regional_prompter(RegionalPrompterConfig::default()),
        );
        assert!(preset.active_regional_prompter().is_none());
    }
}
