//! Backend request payloads.

mod assembler;

pub use assembler::PayloadAssembler;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::extensions::{adetailer, controlnet, regional_prompter};

/// Keys that only steer assembly and never reach the backend.
const HELPER_KEYS: &[&str] = &[
    "prompt_suffix",
    "model",
    "checkpoint",
    "init_image",
    regional_prompter::MASK_PARAM,
    "hr_denoising_strength",
];

/// Whether `key` is a preset-only or caller-helper key.
pub fn is_helper_key(key: &str) -> bool {
    HELPER_KEYS.contains(&key)
        || controlnet::is_caller_param(key)
        || adetailer::is_caller_param(key)
}

/// A request body ready for the backend.
///
/// Serializes as the body alone. The checkpoint hint stripped from the body is
/// kept for whoever resolves and switches models before the call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    body: Map<String, Value>,
    checkpoint: Option<String>,
}

impl Payload {
    pub fn new(body: Map<String, Value>, checkpoint: Option<String>) -> Self {
        Self { body, checkpoint }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn prompt(&self) -> Option<&str> {
        self.body.get("prompt").and_then(Value::as_str)
    }

    pub fn negative_prompt(&self) -> Option<&str> {
        self.body.get("negative_prompt").and_then(Value::as_str)
    }

    pub fn alwayson_scripts(&self) -> Option<&Map<String, Value>> {
        self.body.get("alwayson_scripts").and_then(Value::as_object)
    }

    /// Positional arguments sent to one plugin
    pub fn plugin_args(&self, plugin_key: &str) -> Option<&Vec<Value>> {
        self.alwayson_scripts()?
            .get(plugin_key)?
            .get("args")?
            .as_array()
    }

    /// Checkpoint requested through the preset or the caller
    pub fn checkpoint(&self) -> Option<&str> {
        self.checkpoint.as_deref()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.body
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
