//! Payload assembly use case - turns a preset plus caller parameters into one
//! backend request body.

use std::borrow::Cow;
use std::sync::Arc;

use presetforge_domain::{
    check_map, lenient, DomainError, Preset, PresetKind, PromptTemplate, UserParams,
};
use serde_json::{Map, Value};

use super::{is_helper_key, Payload};
use crate::infrastructure::ports::{
    preset_name, AssemblyObserver, EngineError, OmitReason, PresetStore,
};
use crate::infrastructure::settings::EngineSettings;
use crate::infrastructure::tracing_observer::TracingObserver;
use crate::use_cases::extensions::{self, BuildContext};
use crate::use_cases::prompt::compose;

/// Assembles backend payloads.
///
/// Holds only immutable settings and the observer, so one assembler can be
/// shared across threads.
pub struct PayloadAssembler {
    settings: EngineSettings,
    observer: Arc<dyn AssemblyObserver>,
}

impl PayloadAssembler {
    /// Assembler reporting diagnostics through `tracing`.
    ///
    /// # Errors
    /// Returns the first problem `EngineSettings::validate` finds.
    pub fn new(settings: EngineSettings) -> Result<Self, DomainError> {
        Self::with_observer(settings, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        settings: EngineSettings,
        observer: Arc<dyn AssemblyObserver>,
    ) -> Result<Self, DomainError> {
        settings.validate()?;
        Ok(Self { settings, observer })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Build the request body for `preset` with the caller's overrides.
    ///
    /// # Errors
    /// * `DomainError::Configuration` - unknown preset type or missing settings
    /// * `DomainError::Validation` - a bounded field is out of range or not a
    ///   number, or an img2img call has no input image
    pub fn assemble(&self, preset: &Preset, params: &UserParams) -> Result<Payload, DomainError> {
        preset.validate()?;
        let settings = preset.settings_for_kind()?;

        if !preset.kind.is_generation() {
            let mut body = settings.clone();
            body.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
            return Ok(Payload::new(body, None));
        }

        check_map(settings)?;
        check_map(params.as_map())?;

        let mut body = settings.clone();
        body.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.compose_prompts(preset, settings, &mut body);
        self.attach_extensions(preset, params, &mut body)?;

        match preset.kind {
            PresetKind::Img2Img => attach_init_images(&mut body)?,
            PresetKind::Txt2Img => map_hires_denoising(params, &mut body),
            _ => {}
        }

        let checkpoint = ["checkpoint", "model"]
            .iter()
            .find_map(|key| non_blank(body.get(*key)))
            .map(str::to_string);
        body.retain(|key, _| !is_helper_key(key));

        body.insert("send_images".to_string(), Value::Bool(true));
        body.insert("save_images".to_string(), Value::Bool(false));

        Ok(Payload::new(body, checkpoint))
    }

    /// Look up a preset by (optionally tool-prefixed) name and assemble it.
    pub fn assemble_named(
        &self,
        store: &dyn PresetStore,
        name: &str,
        params: &UserParams,
    ) -> Result<Payload, EngineError> {
        let preset = store
            .get(name)
            .ok_or_else(|| EngineError::preset_not_found(preset_name(name)))?;
        Ok(self.assemble(&preset, params)?)
    }

    fn compose_prompts(
        &self,
        preset: &Preset,
        settings: &Map<String, Value>,
        body: &mut Map<String, Value>,
    ) {
        let template = effective_template(preset.prompt_template.as_ref(), settings);
        let regional = preset
            .active_regional_prompter()
            .map(|rp| rp.regional_config());

        let composition = compose(
            body.get("prompt").and_then(Value::as_str).unwrap_or(""),
            template.as_deref(),
            regional.as_ref(),
            body.get("negative_prompt").and_then(Value::as_str),
        );
        for issue in &composition.issues {
            self.observer.composition_fallback(&preset.name, issue);
        }

        body.insert("prompt".to_string(), Value::String(composition.prompt));
        match composition.negative_prompt {
            Some(negative) => {
                body.insert("negative_prompt".to_string(), Value::String(negative));
            }
            None => {
                body.remove("negative_prompt");
            }
        }
    }

    fn attach_extensions(
        &self,
        preset: &Preset,
        params: &UserParams,
        body: &mut Map<String, Value>,
    ) -> Result<(), DomainError> {
        let Some(configured) = preset.extensions.as_ref() else {
            return Ok(());
        };

        let ctx = BuildContext {
            params,
            settings: &self.settings,
        };
        let mut scripts = match body.remove("alwayson_scripts") {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };

        for config in configured.configs() {
            let kind = config.kind();
            match extensions::build(config, &ctx)? {
                Some(args) => {
                    self.observer
                        .extension_built(&preset.name, kind, args.len());
                    scripts.insert(args.plugin_key().to_string(), args.into_script());
                }
                None => {
                    self.observer.extension_omitted(
                        &preset.name,
                        kind.config_key(),
                        OmitReason::Inactive,
                    );
                }
            }
        }
        for name in configured.unsupported() {
            self.observer
                .extension_omitted(&preset.name, name, OmitReason::Unsupported);
        }

        if !scripts.is_empty() {
            body.insert("alwayson_scripts".to_string(), Value::Object(scripts));
        }
        Ok(())
    }
}

/// The preset template, with the legacy `prompt_suffix` setting filling in a
/// missing suffix.
fn effective_template<'a>(
    template: Option<&'a PromptTemplate>,
    settings: &Map<String, Value>,
) -> Option<Cow<'a, PromptTemplate>> {
    let legacy_suffix = non_blank(settings.get("prompt_suffix"));
    match (template, legacy_suffix) {
        (Some(template), Some(suffix)) if template.suffix().is_none() => {
            Some(Cow::Owned(template.clone().with_suffix(suffix)))
        }
        (Some(template), _) => Some(Cow::Borrowed(template)),
        (None, Some(suffix)) => Some(Cow::Owned(PromptTemplate::new().with_suffix(suffix))),
        (None, None) => None,
    }
}

fn attach_init_images(body: &mut Map<String, Value>) -> Result<(), DomainError> {
    if let Some(image) = non_blank(body.get("init_image")).map(str::to_string) {
        body.insert(
            "init_images".to_string(),
            Value::Array(vec![Value::String(image)]),
        );
    }
    let has_images = body
        .get("init_images")
        .and_then(Value::as_array)
        .is_some_and(|images| !images.is_empty());
    if !has_images {
        return Err(DomainError::missing_parameter("init_image"));
    }
    Ok(())
}

fn map_hires_denoising(params: &UserParams, body: &mut Map<String, Value>) {
    let hires = body
        .get("enable_hr")
        .and_then(lenient::as_bool)
        .unwrap_or(false);
    if !hires {
        return;
    }
    if let Some(strength) = params
        .get("hr_denoising_strength")
        .filter(|value| !value.is_null())
    {
        body.insert("denoising_strength".to_string(), strength.clone());
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
