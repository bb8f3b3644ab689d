//! ControlNet arguments: one object per unit.
//!
//! Caller parameters address units by 1-based index. Unit 1 also accepts the
//! bare `controlnet_image` key.

use presetforge_domain::bounds::{CONTROLNET_GUIDANCE, CONTROLNET_WEIGHT};
use presetforge_domain::{ControlNetConfig, ControlNetUnit, DomainError, ExtensionKind, UserParams};
use serde_json::{Map, Value};

use super::{BuildContext, PositionalArgs};

/// Unprefixed image key accepted for unit 1
pub const IMAGE_PARAM: &str = "controlnet_image";

pub fn image_param(n: usize) -> String {
    format!("controlnet_image_{n}")
}

pub fn model_param(n: usize) -> String {
    format!("controlnet_model_{n}")
}

pub fn module_param(n: usize) -> String {
    format!("controlnet_module_{n}")
}

pub fn weight_param(n: usize) -> String {
    format!("controlnet_weight_{n}")
}

pub fn enabled_param(n: usize) -> String {
    format!("controlnet_enabled_{n}")
}

/// Whether `key` is one of the per-unit caller helpers.
pub fn is_caller_param(key: &str) -> bool {
    key == IMAGE_PARAM
        || [
            "controlnet_image_",
            "controlnet_model_",
            "controlnet_module_",
            "controlnet_weight_",
            "controlnet_enabled_",
        ]
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlNetArgs {
    pub units: Vec<ControlNetSlot>,
}

impl PositionalArgs for ControlNetArgs {
    const KIND: ExtensionKind = ExtensionKind::ControlNet;

    fn into_args(self) -> Vec<Value> {
        self.units.into_iter().map(ControlNetSlot::into_value).collect()
    }
}

/// One ControlNet unit with every field resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlNetSlot {
    pub enabled: bool,
    pub module: String,
    pub model: String,
    pub weight: f64,
    pub resize_mode: i64,
    pub pixel_perfect: bool,
    pub control_mode: i64,
    pub threshold_a: f64,
    pub threshold_b: f64,
    pub guidance_start: f64,
    pub guidance_end: f64,
    pub processor_res: i64,
    pub image: Option<String>,
}

impl ControlNetSlot {
    fn into_value(self) -> Value {
        let Self {
            enabled,
            module,
            model,
            weight,
            resize_mode,
            pixel_perfect,
            control_mode,
            threshold_a,
            threshold_b,
            guidance_start,
            guidance_end,
            processor_res,
            image,
        } = self;
        let mut fields: Vec<(&str, Value)> = vec![
            ("enabled", enabled.into()),
            ("module", module.into()),
            ("model", model.into()),
            ("weight", weight.into()),
            ("resize_mode", resize_mode.into()),
            ("pixel_perfect", pixel_perfect.into()),
            ("control_mode", control_mode.into()),
            ("threshold_a", threshold_a.into()),
            ("threshold_b", threshold_b.into()),
            ("guidance_start", guidance_start.into()),
            ("guidance_end", guidance_end.into()),
            ("processor_res", processor_res.into()),
        ];
        if let Some(image) = image {
            fields.push(("image", image.into()));
        }
        Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<Map<String, Value>>(),
        )
    }
}

fn unit_image(params: &UserParams, n: usize) -> Option<String> {
    let unprefixed = if n == 1 { params.str(IMAGE_PARAM) } else { None };
    unprefixed
        .or_else(|| params.str(&image_param(n)))
        .map(str::to_string)
}

/// Highest unit index any caller parameter refers to.
fn highest_caller_unit(params: &UserParams, max_units: usize) -> usize {
    (1..=max_units)
        .rev()
        .find(|&n| {
            (n == 1 && params.contains(IMAGE_PARAM))
                || [
                    image_param(n),
                    model_param(n),
                    module_param(n),
                    weight_param(n),
                    enabled_param(n),
                ]
                .iter()
                .any(|key| params.contains(key))
        })
        .unwrap_or(0)
}

fn resolve_unit(
    n: usize,
    unit: &ControlNetUnit,
    params: &UserParams,
) -> Result<ControlNetSlot, DomainError> {
    let image = unit_image(params, n);

    let weight_key = weight_param(n);
    let weight = match params.get(&weight_key).filter(|value| !value.is_null()) {
        Some(value) => CONTROLNET_WEIGHT.check(&weight_key, value)?,
        None => CONTROLNET_WEIGHT.check_number(&weight_key, unit.weight.unwrap_or(1.0))?,
    };
    let guidance_start = CONTROLNET_GUIDANCE.check_number(
        &format!("controlnet_guidance_start_{n}"),
        unit.guidance_start.unwrap_or(0.0),
    )?;
    let guidance_end = CONTROLNET_GUIDANCE.check_number(
        &format!("controlnet_guidance_end_{n}"),
        unit.guidance_end.unwrap_or(1.0),
    )?;

    let enabled = params
        .bool(&enabled_param(n))
        .or(unit.enabled)
        .unwrap_or(image.is_some());

    Ok(ControlNetSlot {
        enabled,
        module: params
            .str(&module_param(n))
            .map(str::to_string)
            .or_else(|| unit.module.clone())
            .unwrap_or_else(|| "None".to_string()),
        model: params
            .str(&model_param(n))
            .map(str::to_string)
            .or_else(|| unit.model.clone())
            .unwrap_or_default(),
        weight,
        resize_mode: unit.resize_mode.unwrap_or(1),
        pixel_perfect: unit.pixel_perfect.unwrap_or(false),
        control_mode: unit.control_mode.unwrap_or(0),
        threshold_a: unit.threshold_a.unwrap_or(64.0),
        threshold_b: unit.threshold_b.unwrap_or(64.0),
        guidance_start,
        guidance_end,
        processor_res: unit.processor_res.unwrap_or(512),
        image,
    })
}

/// Build ControlNet arguments, or `None` when disabled or no unit is enabled.
///
/// The unit count is the larger of the preset's list and the highest unit a
/// caller parameter names, capped by `controlnet_max_units`.
pub fn build(
    config: &ControlNetConfig,
    ctx: &BuildContext<'_>,
) -> Result<Option<ControlNetArgs>, DomainError> {
    if !config.is_enabled() {
        return Ok(None);
    }

    let max_units = ctx.settings.controlnet_max_units();
    let count = config
        .units
        .len()
        .max(highest_caller_unit(ctx.params, max_units))
        .min(max_units);

    let default_unit = ControlNetUnit::default();
    let units = (1..=count)
        .map(|n| {
            let unit = config.units.get(n - 1).unwrap_or(&default_unit);
            resolve_unit(n, unit, ctx.params)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !units.iter().any(|unit| unit.enabled) {
        return Ok(None);
    }
    Ok(Some(ControlNetArgs { units }))
}
