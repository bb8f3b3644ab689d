//! Dynamic Prompts arguments: 18 fixed slots.

use presetforge_domain::{DynamicPromptsConfig, ExtensionKind};
use serde_json::Value;

use super::PositionalArgs;

pub const DEFAULT_MAGIC_MODEL: &str = "Gustavosta/MagicPrompt-Stable-Diffusion";

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicPromptsArgs {
    pub is_enabled: bool,
    pub is_combinatorial: bool,
    pub combinatorial_batches: i64,
    pub is_magic_prompt: bool,
    pub is_feeling_lucky: bool,
    pub is_attention_grabber: bool,
    pub min_attention: f64,
    pub max_attention: f64,
    pub magic_prompt_length: i64,
    pub magic_temp_value: f64,
    pub use_fixed_seed: bool,
    pub unlink_seed_from_prompt: bool,
    pub disable_negative_prompt: bool,
    pub enable_jinja_templates: bool,
    pub no_image_generation: bool,
    pub max_generations: i64,
    pub magic_model: String,
    pub magic_blocklist_regex: String,
}

impl PositionalArgs for DynamicPromptsArgs {
    const KIND: ExtensionKind = ExtensionKind::DynamicPrompts;

    fn into_args(self) -> Vec<Value> {
        let Self {
            is_enabled,
            is_combinatorial,
            combinatorial_batches,
            is_magic_prompt,
            is_feeling_lucky,
            is_attention_grabber,
            min_attention,
            max_attention,
            magic_prompt_length,
            magic_temp_value,
            use_fixed_seed,
            unlink_seed_from_prompt,
            disable_negative_prompt,
            enable_jinja_templates,
            no_image_generation,
            max_generations,
            magic_model,
            magic_blocklist_regex,
        } = self;
        vec![
            is_enabled.into(),
            is_combinatorial.into(),
            combinatorial_batches.into(),
            is_magic_prompt.into(),
            is_feeling_lucky.into(),
            is_attention_grabber.into(),
            min_attention.into(),
            max_attention.into(),
            magic_prompt_length.into(),
            magic_temp_value.into(),
            use_fixed_seed.into(),
            unlink_seed_from_prompt.into(),
            disable_negative_prompt.into(),
            enable_jinja_templates.into(),
            no_image_generation.into(),
            max_generations.into(),
            magic_model.into(),
            magic_blocklist_regex.into(),
        ]
    }
}

/// Build Dynamic Prompts arguments, or `None` when disabled.
pub fn build(config: &DynamicPromptsConfig) -> Option<DynamicPromptsArgs> {
    if !config.is_enabled() {
        return None;
    }

    Some(DynamicPromptsArgs {
        is_enabled: true,
        is_combinatorial: config.is_combinatorial(),
        combinatorial_batches: config.combinatorial_batches.unwrap_or(1),
        is_magic_prompt: config.magic_prompt.unwrap_or(false),
        is_feeling_lucky: config.feeling_lucky.unwrap_or(false),
        is_attention_grabber: config.attention_grabber.unwrap_or(false),
        min_attention: config.min_attention.unwrap_or(1.1),
        max_attention: config.max_attention.unwrap_or(1.5),
        magic_prompt_length: config.magic_prompt_length.unwrap_or(100),
        magic_temp_value: config.magic_temp_value.unwrap_or(0.7),
        use_fixed_seed: config.use_fixed_seed.unwrap_or(false),
        unlink_seed_from_prompt: config.unlink_seed.unwrap_or(false),
        disable_negative_prompt: config.disable_negative_prompt.unwrap_or(false),
        enable_jinja_templates: config.enable_jinja_templates.unwrap_or(false),
        no_image_generation: config.no_image_generation.unwrap_or(false),
        max_generations: config.max_generations.unwrap_or(1),
        magic_model: config
            .magic_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MAGIC_MODEL.to_string()),
        magic_blocklist_regex: config.magic_blocklist_regex.clone().unwrap_or_default(),
    })
}
