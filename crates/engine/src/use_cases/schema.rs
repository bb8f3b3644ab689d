//! Caller-facing parameter description of a preset.
//!
//! The result is shaped like a JSON schema object so it can be handed to tool
//! registries unchanged. Numeric bounds come from the same table the
//! assembler validates against.

use std::collections::BTreeMap;

use presetforge_domain::{bound_for, lenient, Preset, PresetKind};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::infrastructure::settings::EngineSettings;
use crate::use_cases::extensions::{adetailer, controlnet};

/// Default image edge when a preset leaves the size open
const DEFAULT_SIZE: i64 = 1024;
const DEFAULT_IMG2IMG_DENOISING: f64 = 0.75;
const DEFAULT_HR_UPSCALER: &str = "R-ESRGAN 4x+ Anime6B";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

/// One caller parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ParameterSpec {
    fn new(kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            default: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new(ParamType::String, description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::new(ParamType::Number, description)
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        Self::new(ParamType::Boolean, description)
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Input description of one preset, serialized as a JSON schema object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    kind: &'static str,
    pub properties: BTreeMap<String, ParameterSpec>,
    pub required: Vec<String>,
}

impl ParameterSchema {
    fn new(required: &[&str]) -> Self {
        Self {
            kind: "object",
            properties: BTreeMap::new(),
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add a property; numeric fields pick up their documented bounds.
    fn insert(&mut self, key: impl Into<String>, mut spec: ParameterSpec) {
        let key = key.into();
        if let Some(bound) = bound_for(&key) {
            spec.minimum = Some(bound.min);
            spec.maximum = Some(bound.max);
        }
        self.properties.insert(key, spec);
    }

    pub fn get(&self, key: &str) -> Option<&ParameterSpec> {
        self.properties.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }
}

/// Describe the parameters a caller may pass for `preset`.
///
/// Returns `None` for preset types that are not exposed to callers.
pub fn describe_parameters(preset: &Preset, settings: &EngineSettings) -> Option<ParameterSchema> {
    let required: &[&str] = match preset.kind {
        PresetKind::Txt2Img => &["prompt"],
        PresetKind::Img2Img => &["prompt", "init_image"],
        PresetKind::Extras | PresetKind::PngInfo | PresetKind::Tagger => &["image"],
        PresetKind::ExtrasSingleImage | PresetKind::Rembg | PresetKind::Utility => &[],
        _ => return None,
    };
    let mut schema = ParameterSchema::new(required);

    match preset.kind {
        PresetKind::Txt2Img | PresetKind::Img2Img => {
            schema.insert(
                "prompt",
                ParameterSpec::string("The prompt for image generation"),
            );
        }
        PresetKind::Utility => {
            let action = preset
                .settings
                .as_ref()
                .and_then(|s| s.get("action"))
                .and_then(Value::as_str);
            if action == Some("switch_model") {
                schema.insert(
                    "model_name",
                    ParameterSpec::string("Checkpoint name to switch to"),
                );
            }
            return Some(schema);
        }
        _ => {
            schema.insert(
                "image",
                ParameterSpec::string("Base64 encoded image or image path"),
            );
            return Some(schema);
        }
    }

    let empty = Map::new();
    let base = preset.base_settings.as_ref().unwrap_or(&empty);

    if preset.kind == PresetKind::Img2Img {
        schema.insert(
            "init_image",
            ParameterSpec::string("Base64 encoded image or image URL"),
        );
    }

    describe_extensions(preset, settings, &mut schema);

    if base.get("seed").and_then(lenient::as_i64) == Some(-1) {
        schema.insert(
            "seed",
            ParameterSpec::number("Random seed (-1 for random)").with_default(-1),
        );
    }
    for (key, label) in [("steps", "Number of sampling steps"), ("cfg_scale", "CFG scale")] {
        if let Some(default) = base.get(key).filter(|v| is_positive(v)) {
            schema.insert(
                key,
                ParameterSpec::number(format!("{label} (preset default: {default})"))
                    .with_default(default.clone()),
            );
        }
    }

    let width = base.get("width").filter(|v| is_positive(v));
    let height = base.get("height").filter(|v| is_positive(v));
    if width.is_none() || height.is_none() {
        for (key, value) in [("width", width), ("height", height)] {
            let default = value.cloned().unwrap_or(Value::from(DEFAULT_SIZE));
            schema.insert(
                key,
                ParameterSpec::number(format!("Image {key}")).with_default(default),
            );
        }
    }

    let batch_size = base
        .get("batch_size")
        .filter(|v| is_positive(v))
        .cloned()
        .unwrap_or(Value::from(1));
    schema.insert(
        "batch_size",
        ParameterSpec::number("Number of images to generate in parallel")
            .with_default(batch_size),
    );

    if preset.kind == PresetKind::Img2Img {
        let default = base
            .get("denoising_strength")
            .filter(|v| is_positive(v))
            .cloned()
            .unwrap_or(Value::from(DEFAULT_IMG2IMG_DENOISING));
        schema.insert(
            "denoising_strength",
            ParameterSpec::number("Denoising strength").with_default(default),
        );
    }

    if preset.kind == PresetKind::Txt2Img && base.contains_key("enable_hr") {
        describe_hires(base, &mut schema);
    }

    Some(schema)
}

fn describe_extensions(preset: &Preset, settings: &EngineSettings, schema: &mut ParameterSchema) {
    let Some(extensions) = preset.extensions.as_ref() else {
        return;
    };

    if let Some(config) = extensions.controlnet.as_ref().filter(|c| c.is_enabled()) {
        let units = config.units.len().max(1).min(settings.controlnet_max_units());
        schema.insert(
            controlnet::IMAGE_PARAM,
            ParameterSpec::string("Reference image for ControlNet unit 1"),
        );
        for n in 2..=units {
            schema.insert(
                controlnet::image_param(n),
                ParameterSpec::string(format!("Reference image for ControlNet unit {n} (optional)")),
            );
        }
        for n in 1..=units {
            let unit = config.units.get(n - 1);

            let mut model = ParameterSpec::string(format!("ControlNet model for unit {n}"));
            if let Some(name) = unit.and_then(|u| u.model.clone()) {
                model = model.with_default(name);
            }
            schema.insert(controlnet::model_param(n), model);

            let module = unit
                .and_then(|u| u.module.clone())
                .unwrap_or_else(|| "None".to_string());
            schema.insert(
                controlnet::module_param(n),
                ParameterSpec::string(format!("ControlNet preprocessor for unit {n}"))
                    .with_default(module),
            );

            let weight = unit.and_then(|u| u.weight).unwrap_or(1.0);
            schema.insert(
                controlnet::weight_param(n),
                ParameterSpec::number(format!("ControlNet weight for unit {n}"))
                    .with_default(weight),
            );
        }
    }

    if extensions.adetailer.as_ref().is_some_and(|c| c.is_enabled()) {
        for n in 2..=settings.adetailer_max_models() {
            schema.insert(
                adetailer::model_param(n),
                ParameterSpec::string(format!("ADetailer model {n} (adds or replaces model {n})")),
            );
        }
    }
}

fn describe_hires(base: &Map<String, Value>, schema: &mut ParameterSchema) {
    let default = |key: &str, fallback: Value| base.get(key).cloned().unwrap_or(fallback);

    schema.insert(
        "enable_hr",
        ParameterSpec::boolean("Enable Hires Fix").with_default(default("enable_hr", false.into())),
    );
    schema.insert(
        "hr_scale",
        ParameterSpec::number("Hires Fix scale factor").with_default(default("hr_scale", 2.0.into())),
    );
    schema.insert(
        "hr_upscaler",
        ParameterSpec::string("Hires Fix upscaler")
            .with_default(default("hr_upscaler", DEFAULT_HR_UPSCALER.into())),
    );
    schema.insert(
        "hr_second_pass_steps",
        ParameterSpec::number("Hires Fix second pass steps (0 = same as steps)")
            .with_default(default("hr_second_pass_steps", 0.into())),
    );
    schema.insert(
        "hr_denoising_strength",
        ParameterSpec::number("Hires Fix denoising strength")
            .with_default(default("hr_denoising_strength", 0.7.into())),
    );
}

fn is_positive(value: &Value) -> bool {
    lenient::as_f64(value).is_some_and(|n| n > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use presetforge_domain::{
        ADetailerConfig, ADetailerModelEntry, ControlNetConfig, ControlNetUnit, Extensions,
    };
    use serde_json::json;

    fn describe(preset: &Preset) -> ParameterSchema {
        describe_parameters(preset, &EngineSettings::default()).unwrap()
    }

    #[test]
    fn test_required_fields_per_kind() {
        let cases = [
            (PresetKind::Txt2Img, vec!["prompt"]),
            (PresetKind::Img2Img, vec!["prompt", "init_image"]),
            (PresetKind::Extras, vec!["image"]),
            (PresetKind::Tagger, vec!["image"]),
            (PresetKind::Rembg, vec![]),
            (PresetKind::Utility, vec![]),
        ];
        for (kind, required) in cases {
            let preset = Preset::new("p", kind);
            assert_eq!(describe(&preset).required, required, "{kind}");
        }
    }

    #[test]
    fn test_unsupported_kinds_have_no_schema() {
        let preset = Preset::new("p", PresetKind::OptionsGet);
        assert!(describe_parameters(&preset, &EngineSettings::default()).is_none());
    }

    #[test]
    fn test_txt2img_properties_follow_base_settings() {
        let preset = Preset::new("p", PresetKind::Txt2Img).with_base_settings(json!({
            "seed": -1,
            "steps": 28,
            "cfg_scale": 5,
            "width": 832,
            "height": 1216
        }));
        let schema = describe(&preset);

        assert_eq!(schema.get("seed").unwrap().default, Some(json!(-1)));
        assert_eq!(schema.get("steps").unwrap().default, Some(json!(28)));
        assert_eq!(schema.get("cfg_scale").unwrap().default, Some(json!(5)));
        assert!(!schema.contains("width"));
        assert_eq!(schema.get("batch_size").unwrap().default, Some(json!(1)));
        assert!(!schema.contains("denoising_strength"));
    }

    #[test]
    fn test_open_size_defaults_to_1024() {
        let preset =
            Preset::new("p", PresetKind::Txt2Img).with_base_settings(json!({"width": 832}));
        let schema = describe(&preset);
        assert_eq!(schema.get("width").unwrap().default, Some(json!(832)));
        assert_eq!(schema.get("height").unwrap().default, Some(json!(1024)));
    }

    #[test]
    fn test_img2img_denoising_is_bounded() {
        let preset = Preset::new("p", PresetKind::Img2Img).with_base_settings(json!({}));
        let spec = describe(&preset).get("denoising_strength").cloned().unwrap();
        assert_eq!(spec.default, Some(json!(0.75)));
        assert_eq!(spec.minimum, Some(0.0));
        assert_eq!(spec.maximum, Some(1.0));
    }

    #[test]
    fn test_controlnet_and_adetailer_parameters() {
        let preset = Preset::new("p", PresetKind::Txt2Img)
            .with_base_settings(json!({}))
            .with_extensions(
                Extensions::new()
                    .with_controlnet(ControlNetConfig::enabled_with([
                        ControlNetUnit::default().with_model("CN-anytest3_animagine4_A"),
                        ControlNetUnit::default().with_weight(0.8),
                    ]))
                    .with_adetailer(ADetailerConfig::enabled_with([ADetailerModelEntry::from(
                        "face_yolov8n.pt",
                    )])),
            );
        let schema = describe(&preset);

        assert!(schema.contains("controlnet_image"));
        assert!(schema.contains("controlnet_image_2"));
        assert!(!schema.contains("controlnet_image_3"));
        assert_eq!(
            schema.get("controlnet_model_1").unwrap().default,
            Some(json!("CN-anytest3_animagine4_A"))
        );
        assert_eq!(
            schema.get("controlnet_module_2").unwrap().default,
            Some(json!("None"))
        );
        let weight = schema.get("controlnet_weight_2").unwrap();
        assert_eq!(weight.default, Some(json!(0.8)));
        assert_eq!(weight.maximum, Some(2.0));

        for n in 2..=4 {
            assert!(schema.contains(&format!("adetailer_model_{n}")));
        }
        assert!(!schema.contains("adetailer_model_1"));
    }

    #[test]
    fn test_hires_parameters_when_preset_mentions_hires() {
        let preset = Preset::new("p", PresetKind::Txt2Img)
            .with_base_settings(json!({"enable_hr": false, "hr_scale": 1.5}));
        let schema = describe(&preset);
        assert_eq!(schema.get("hr_scale").unwrap().default, Some(json!(1.5)));
        assert_eq!(schema.get("hr_scale").unwrap().minimum, Some(1.0));
        assert_eq!(
            schema.get("hr_upscaler").unwrap().default,
            Some(json!("R-ESRGAN 4x+ Anime6B"))
        );
        assert_eq!(schema.get("hr_second_pass_steps").unwrap().maximum, Some(150.0));

        let plain = Preset::new("p", PresetKind::Txt2Img).with_base_settings(json!({}));
        assert!(!describe(&plain).contains("enable_hr"));
    }

    #[test]
    fn test_switch_model_utility() {
        let preset = Preset::new("switch", PresetKind::Utility)
            .with_settings(json!({"action": "switch_model"}));
        let schema = describe(&preset);
        assert!(schema.contains("model_name"));
        assert!(!schema.contains("batch_size"));
    }

    #[test]
    fn test_serializes_as_json_schema() {
        let preset = Preset::new("p", PresetKind::Extras).with_settings(json!({}));
        let value = serde_json::to_value(describe(&preset)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "object",
                "properties": {
                    "image": {"type": "string", "description": "Base64 encoded image or image path"}
                },
                "required": ["image"]
            })
        );
    }
}
