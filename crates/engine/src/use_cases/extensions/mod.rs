//! Extension argument building.
//!
//! Plugins configured through `alwayson_scripts` read their arguments by
//! position only. Each builder fills a record of named slots; the record is
//! flattened to a JSON array at the very end by [`PositionalArgs::into_args`],
//! which destructures every field so a forgotten slot fails to compile.

pub mod adetailer;
pub mod controlnet;
pub mod dynamic_prompts;
pub mod regional_prompter;

use presetforge_domain::{DomainError, ExtensionConfig, ExtensionKind, UserParams};
use serde_json::{json, Value};

use crate::infrastructure::settings::EngineSettings;

/// A named-slot record with a fixed positional encoding.
pub trait PositionalArgs {
    const KIND: ExtensionKind;

    fn into_args(self) -> Vec<Value>;
}

/// Inputs shared by every builder
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub params: &'a UserParams,
    pub settings: &'a EngineSettings,
}

/// Positional arguments for one plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginArgs {
    pub kind: ExtensionKind,
    pub args: Vec<Value>,
}

impl PluginArgs {
    pub fn from_slots<A: PositionalArgs>(slots: A) -> Self {
        Self {
            kind: A::KIND,
            args: slots.into_args(),
        }
    }

    /// Key under `alwayson_scripts`
    pub fn plugin_key(&self) -> &'static str {
        self.kind.plugin_key()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// `{"args": [...]}` as the backend expects it
    pub fn into_script(self) -> Value {
        json!({ "args": self.args })
    }
}

/// Build the arguments for one configured extension.
///
/// `Ok(None)` means the extension is left out of the payload entirely.
pub fn build(
    config: ExtensionConfig<'_>,
    ctx: &BuildContext<'_>,
) -> Result<Option<PluginArgs>, DomainError> {
    let built = match config {
        ExtensionConfig::ADetailer(config) => {
            adetailer::build(config, ctx).map(PluginArgs::from_slots)
        }
        ExtensionConfig::ControlNet(config) => {
            controlnet::build(config, ctx)?.map(PluginArgs::from_slots)
        }
        ExtensionConfig::RegionalPrompter(config) => {
            regional_prompter::build(config, ctx).map(PluginArgs::from_slots)
        }
        ExtensionConfig::DynamicPrompts(config) => {
            dynamic_prompts::build(config).map(PluginArgs::from_slots)
        }
    };
    Ok(built)
}
