//! ADetailer arguments: `[enable, skip_img2img, model_1, ..., model_n]`.

use presetforge_domain::{ADetailerConfig, ADetailerModel, ExtensionKind};
use serde_json::{Map, Value};

use super::{BuildContext, PositionalArgs};

/// Caller key naming the model for slot `n` (1-based)
pub fn model_param(n: usize) -> String {
    format!("adetailer_model_{n}")
}

/// Whether `key` is an `adetailer_model_N` caller helper.
pub fn is_caller_param(key: &str) -> bool {
    key.strip_prefix("adetailer_model_")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ADetailerArgs {
    pub enable: bool,
    pub skip_img2img: bool,
    pub models: Vec<ADetailerUnit>,
}

impl PositionalArgs for ADetailerArgs {
    const KIND: ExtensionKind = ExtensionKind::ADetailer;

    fn into_args(self) -> Vec<Value> {
        let Self {
            enable,
            skip_img2img,
            models,
        } = self;
        let mut args = Vec::with_capacity(2 + models.len());
        args.push(Value::Bool(enable));
        args.push(Value::Bool(skip_img2img));
        args.extend(models.into_iter().map(ADetailerUnit::into_value));
        args
    }
}

/// One detection model with every ADetailer field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ADetailerUnit {
    pub ad_model: String,
    pub ad_prompt: String,
    pub ad_negative_prompt: String,
    pub ad_confidence: f64,
    pub ad_mask_blur: i64,
    pub ad_dilate_erode: i64,
    pub ad_x_offset: i64,
    pub ad_y_offset: i64,
    pub ad_mask_merge_invert: String,
    pub ad_denoising_strength: f64,
    pub ad_inpaint_only_masked: bool,
    pub ad_inpaint_only_masked_padding: i64,
    pub ad_use_inpaint_width_height: bool,
    pub ad_inpaint_width: i64,
    pub ad_inpaint_height: i64,
    pub ad_use_steps: bool,
    pub ad_steps: i64,
    pub ad_use_cfg_scale: bool,
    pub ad_cfg_scale: f64,
    pub ad_use_checkpoint: bool,
    pub ad_checkpoint: String,
    pub ad_use_vae: bool,
    pub ad_vae: String,
    pub ad_use_sampler: bool,
    pub ad_sampler: String,
    pub ad_scheduler: String,
    pub ad_use_clip_skip: bool,
    pub ad_clip_skip: i64,
    pub ad_restore_face: bool,
    pub ad_controlnet_model: String,
}

impl ADetailerUnit {
    fn from_model(name: &str, model: &ADetailerModel) -> Self {
        let text = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };
        Self {
            ad_model: name.to_string(),
            ad_prompt: text(&model.prompt, ""),
            ad_negative_prompt: text(&model.negative_prompt, ""),
            ad_confidence: model.confidence.unwrap_or(0.3),
            ad_mask_blur: model.mask_blur.unwrap_or(4),
            ad_dilate_erode: model.dilate_erode.unwrap_or(4),
            ad_x_offset: model.x_offset.unwrap_or(0),
            ad_y_offset: model.y_offset.unwrap_or(0),
            ad_mask_merge_invert: text(&model.mask_merge_invert, "None"),
            ad_denoising_strength: model.denoising_strength.unwrap_or(0.4),
            ad_inpaint_only_masked: model.inpaint_only_masked.unwrap_or(true),
            ad_inpaint_only_masked_padding: model.inpaint_padding.unwrap_or(32),
            ad_use_inpaint_width_height: model.use_separate_width.unwrap_or(false),
            ad_inpaint_width: model.width.unwrap_or(512),
            ad_inpaint_height: model.height.unwrap_or(512),
            ad_use_steps: model.use_separate_steps.unwrap_or(false),
            ad_steps: model.steps.unwrap_or(28),
            ad_use_cfg_scale: model.use_separate_cfg_scale.unwrap_or(false),
            ad_cfg_scale: model.cfg_scale.unwrap_or(7.0),
            ad_use_checkpoint: model.use_separate_checkpoint.unwrap_or(false),
            ad_checkpoint: text(&model.checkpoint, ""),
            ad_use_vae: model.use_separate_vae.unwrap_or(false),
            ad_vae: text(&model.vae, ""),
            ad_use_sampler: model.use_separate_sampler.unwrap_or(false),
            ad_sampler: text(&model.sampler, ""),
            ad_scheduler: text(&model.scheduler, "Automatic"),
            ad_use_clip_skip: model.use_separate_clip_skip.unwrap_or(false),
            ad_clip_skip: model.clip_skip.unwrap_or(1),
            ad_restore_face: model.restore_faces_after.unwrap_or(false),
            ad_controlnet_model: text(&model.controlnet_model, "None"),
        }
    }

    fn into_value(self) -> Value {
        let Self {
            ad_model,
            ad_prompt,
            ad_negative_prompt,
            ad_confidence,
            ad_mask_blur,
            ad_dilate_erode,
            ad_x_offset,
            ad_y_offset,
            ad_mask_merge_invert,
            ad_denoising_strength,
            ad_inpaint_only_masked,
            ad_inpaint_only_masked_padding,
            ad_use_inpaint_width_height,
            ad_inpaint_width,
            ad_inpaint_height,
            ad_use_steps,
            ad_steps,
            ad_use_cfg_scale,
            ad_cfg_scale,
            ad_use_checkpoint,
            ad_checkpoint,
            ad_use_vae,
            ad_vae,
            ad_use_sampler,
            ad_sampler,
            ad_scheduler,
            ad_use_clip_skip,
            ad_clip_skip,
            ad_restore_face,
            ad_controlnet_model,
        } = self;
        let fields: [(&str, Value); 30] = [
            ("ad_model", ad_model.into()),
            ("ad_prompt", ad_prompt.into()),
            ("ad_negative_prompt", ad_negative_prompt.into()),
            ("ad_confidence", ad_confidence.into()),
            ("ad_mask_blur", ad_mask_blur.into()),
            ("ad_dilate_erode", ad_dilate_erode.into()),
            ("ad_x_offset", ad_x_offset.into()),
            ("ad_y_offset", ad_y_offset.into()),
            ("ad_mask_merge_invert", ad_mask_merge_invert.into()),
            ("ad_denoising_strength", ad_denoising_strength.into()),
            ("ad_inpaint_only_masked", ad_inpaint_only_masked.into()),
            ("ad_inpaint_only_masked_padding", ad_inpaint_only_masked_padding.into()),
            ("ad_use_inpaint_width_height", ad_use_inpaint_width_height.into()),
            ("ad_inpaint_width", ad_inpaint_width.into()),
            ("ad_inpaint_height", ad_inpaint_height.into()),
            ("ad_use_steps", ad_use_steps.into()),
            ("ad_steps", ad_steps.into()),
            ("ad_use_cfg_scale", ad_use_cfg_scale.into()),
            ("ad_cfg_scale", ad_cfg_scale.into()),
            ("ad_use_checkpoint", ad_use_checkpoint.into()),
            ("ad_checkpoint", ad_checkpoint.into()),
            ("ad_use_vae", ad_use_vae.into()),
            ("ad_vae", ad_vae.into()),
            ("ad_use_sampler", ad_use_sampler.into()),
            ("ad_sampler", ad_sampler.into()),
            ("ad_scheduler", ad_scheduler.into()),
            ("ad_use_clip_skip", ad_use_clip_skip.into()),
            ("ad_clip_skip", ad_clip_skip.into()),
            ("ad_restore_face", ad_restore_face.into()),
            ("ad_controlnet_model", ad_controlnet_model.into()),
        ];
        Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// Build ADetailer arguments, or `None` when disabled or no model is usable.
///
/// A caller's `adetailer_model_N` renames model N when the preset lists one,
/// otherwise it is appended after the existing models in N order, so
/// numbering gaps close up. Unusable models (blank or "None") are dropped
/// without leaving a gap.
pub fn build(config: &ADetailerConfig, ctx: &BuildContext<'_>) -> Option<ADetailerArgs> {
    if !config.is_enabled() {
        return None;
    }

    let max_models = ctx.settings.adetailer_max_models();
    let mut models = config.resolved_models();
    for n in 1..=max_models {
        let Some(name) = ctx.params.str(&model_param(n)) else {
            continue;
        };
        match models.get_mut(n - 1) {
            Some(model) => model.model = Some(name.to_string()),
            None => models.push(ADetailerModel::named(name)),
        }
    }

    let units: Vec<ADetailerUnit> = models
        .iter()
        .filter_map(|model| {
            model
                .usable_name()
                .map(|name| ADetailerUnit::from_model(name, model))
        })
        .take(max_models)
        .collect();

    if units.is_empty() {
        return None;
    }

    Some(ADetailerArgs {
        enable: true,
        skip_img2img: config.skip_img2img.unwrap_or(false),
        models: units,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::settings::EngineSettings;
    use presetforge_domain::{ADetailerModelEntry, UserParams};
    use serde_json::json;

    fn build_with(config: &ADetailerConfig, params: &UserParams) -> Option<Vec<Value>> {
        let settings = EngineSettings::default();
        let ctx = BuildContext {
            params,
            settings: &settings,
        };
        build(config, &ctx).map(PositionalArgs::into_args)
    }

    #[test]
    fn test_length_is_two_plus_model_count() {
        for count in 1..=4 {
            let config = ADetailerConfig::enabled_with(
                (0..count).map(|i| ADetailerModelEntry::from(format!("model_{i}.pt").as_str())),
            );
            let args = build_with(&config, &UserParams::new()).unwrap();
            assert_eq!(args.len(), 2 + count);
        }
    }

    #[test]
    fn test_leading_flags_and_defaults() {
        let config = ADetailerConfig::enabled_with([ADetailerModelEntry::from("face_yolov8n.pt")]);
        let args = build_with(&config, &UserParams::new()).unwrap();
        assert_eq!(args[0], json!(true));
        assert_eq!(args[1], json!(false));
        assert_eq!(args[2]["ad_model"], "face_yolov8n.pt");
        assert_eq!(args[2]["ad_confidence"], 0.3);
        assert_eq!(args[2]["ad_inpaint_only_masked_padding"], 32);
        assert_eq!(args[2]["ad_scheduler"], "Automatic");
        assert_eq!(args[2]["ad_controlnet_model"], "None");
    }

    #[test]
    fn test_model_object_key_order() {
        let config = ADetailerConfig::enabled_with([ADetailerModelEntry::from("face_yolov8n.pt")]);
        let args = build_with(&config, &UserParams::new()).unwrap();
        let keys: Vec<_> = args[2].as_object().unwrap().keys().take(4).cloned().collect();
        assert_eq!(
            keys,
            vec!["ad_model", "ad_prompt", "ad_negative_prompt", "ad_confidence"]
        );
        assert_eq!(args[2].as_object().unwrap().len(), 30);
    }

    #[test]
    fn test_unusable_models_leave_no_gap() {
        let config = ADetailerConfig::enabled_with([
            ADetailerModelEntry::from("None"),
            ADetailerModelEntry::from("face_yolov8n.pt"),
            ADetailerModelEntry::from(""),
            ADetailerModelEntry::from("hand_yolov8n.pt"),
        ]);
        let args = build_with(&config, &UserParams::new()).unwrap();
        assert_eq!(args.len(), 4);
        assert_eq!(args[2]["ad_model"], "face_yolov8n.pt");
        assert_eq!(args[3]["ad_model"], "hand_yolov8n.pt");
    }

    #[test]
    fn test_no_usable_model_omits_extension() {
        let config = ADetailerConfig::enabled_with([ADetailerModelEntry::from("None")]);
        assert!(build_with(&config, &UserParams::new()).is_none());

        let disabled = ADetailerConfig {
            enabled: Some(false),
            ..ADetailerConfig::enabled_with([ADetailerModelEntry::from("face_yolov8n.pt")])
        };
        assert!(build_with(&disabled, &UserParams::new()).is_none());
    }

    #[test]
    fn test_caller_models_rename_and_extend() {
        let config = ADetailerConfig::enabled_with([
            ADetailerModelEntry::from("face_yolov8n.pt"),
            ADetailerModelEntry::from(ADetailerModel::named("None").with_confidence(0.6)),
        ]);
        let params = UserParams::new()
            .with("adetailer_model_2", "hand_yolov8n.pt")
            .with("adetailer_model_3", "person_yolov8n-seg.pt");
        let args = build_with(&config, &params).unwrap();
        assert_eq!(args.len(), 5);
        assert_eq!(args[3]["ad_model"], "hand_yolov8n.pt");
        assert_eq!(args[3]["ad_confidence"], 0.6);
        assert_eq!(args[4]["ad_model"], "person_yolov8n-seg.pt");
    }

    #[test]
    fn test_caller_model_past_the_list_is_appended() {
        let config = ADetailerConfig::enabled_with([ADetailerModelEntry::from("face_yolov8n.pt")]);
        let params = UserParams::new().with("adetailer_model_3", "hand_yolov8n.pt");
        let args = build_with(&config, &params).unwrap();
        assert_eq!(args.len(), 4);
        assert_eq!(args[2]["ad_model"], "face_yolov8n.pt");
        assert_eq!(args[3]["ad_model"], "hand_yolov8n.pt");
    }

    #[test]
    fn test_model_count_capped_by_settings() {
        let config = ADetailerConfig::enabled_with(
            ["a.pt", "b.pt", "c.pt"].map(ADetailerModelEntry::from),
        );
        let settings = EngineSettings::default().with_adetailer_max_models(2);
        let params = UserParams::new();
        let ctx = BuildContext {
            params: &params,
            settings: &settings,
        };
        let args = build(&config, &ctx).unwrap().into_args();
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_is_caller_param() {
        assert!(is_caller_param("adetailer_model_2"));
        assert!(!is_caller_param("adetailer_model_"));
        assert!(!is_caller_param("adetailer_models"));
    }

    #[test]
    fn test_malformed_fields_fall_back() {
        let config: ADetailerConfig = serde_json::from_value(json!({
            "enabled": true,
            "skip_img2img": "true",
            "models": [{"model": "face_yolov8n.pt", "confidence": "high", "steps": []}]
        }))
        .unwrap();
        let args = build_with(&config, &UserParams::new()).unwrap();
        assert_eq!(args[1], json!(true));
        assert_eq!(args[2]["ad_confidence"], 0.3);
        assert_eq!(args[2]["ad_steps"], 28);
    }
}
