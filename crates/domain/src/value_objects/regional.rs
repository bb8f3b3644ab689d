//! Regional Prompter configuration
//!
//! Presets written for older releases of the plugin use the unprefixed names
//! (`enabled`, `mode`, `split_ratio`, `use_base`, ...). Both spellings are
//! read; the `rp_` name wins when a preset carries both.

use serde::{Deserialize, Serialize};

use super::lenient;

/// Regional Prompter block of a preset's `extensions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalPrompterConfig {
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub rp_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub rp_debug: Option<bool>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_matrix_submode: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_mask_submode: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_prompt_submode: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_divide_ratio: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub divide_ratio: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub split_ratio: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_base_ratio: Option<String>,

    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub rp_use_base: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_base: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub rp_use_common: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_common: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub rp_use_ncommon: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub use_negative_common: Option<bool>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_calc_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub rp_not_change_and: Option<bool>,
    #[serde(default, deserialize_with = "lenient::bool", skip_serializing_if = "Option::is_none")]
    pub disable_convert_and: Option<bool>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_lora_stop_step: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_lora_hires_stop_step: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub rp_threshold: Option<String>,
}

impl RegionalPrompterConfig {
    /// Active config in the given mode
    pub fn active(mode: RegionMode) -> Self {
        Self {
            rp_active: Some(true),
            rp_mode: Some(mode.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn with_use_base(mut self, use_base: bool) -> Self {
        self.rp_use_base = Some(use_base);
        self
    }

    pub fn with_use_common(mut self, use_common: bool) -> Self {
        self.rp_use_common = Some(use_common);
        self
    }

    pub fn with_use_negative_common(mut self, use_ncommon: bool) -> Self {
        self.rp_use_ncommon = Some(use_ncommon);
        self
    }

    pub fn with_not_change_and(mut self, not_change_and: bool) -> Self {
        self.rp_not_change_and = Some(not_change_and);
        self
    }

    pub fn with_base_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.rp_base_ratio = Some(ratio.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.rp_active.or(self.enabled).unwrap_or(false)
    }

    pub fn debug(&self) -> bool {
        self.rp_debug.unwrap_or(false)
    }

    pub fn mode(&self) -> RegionMode {
        self.rp_mode
            .as_deref()
            .or(self.mode.as_deref())
            .map(RegionMode::parse)
            .unwrap_or_default()
    }

    pub fn matrix_submode(&self) -> &str {
        non_blank(&self.rp_matrix_submode).unwrap_or("Columns")
    }

    pub fn mask_submode(&self) -> &str {
        non_blank(&self.rp_mask_submode).unwrap_or("Mask")
    }

    pub fn prompt_submode(&self) -> &str {
        non_blank(&self.rp_prompt_submode).unwrap_or("Prompt")
    }

    pub fn divide_ratio(&self) -> &str {
        non_blank(&self.rp_divide_ratio)
            .or_else(|| non_blank(&self.divide_ratio))
            .or_else(|| non_blank(&self.split_ratio))
            .unwrap_or("1,1")
    }

    /// The configured base ratio, unvalidated
    pub fn base_ratio(&self) -> Option<&str> {
        non_blank(&self.rp_base_ratio)
    }

    pub fn use_base(&self) -> bool {
        self.rp_use_base.or(self.use_base).unwrap_or(false)
    }

    pub fn use_common(&self) -> bool {
        self.rp_use_common.or(self.use_common).unwrap_or(false)
    }

    pub fn use_negative_common(&self) -> bool {
        self.rp_use_ncommon
            .or(self.use_negative_common)
            .unwrap_or(false)
    }

    pub fn calc_mode(&self) -> &str {
        non_blank(&self.rp_calc_mode).unwrap_or("Attention")
    }

    pub fn not_change_and(&self) -> bool {
        self.rp_not_change_and
            .or(self.disable_convert_and)
            .unwrap_or(false)
    }

    pub fn lora_stop_step(&self) -> &str {
        non_blank(&self.rp_lora_stop_step).unwrap_or("0")
    }

    pub fn lora_hires_stop_step(&self) -> &str {
        non_blank(&self.rp_lora_hires_stop_step).unwrap_or("0")
    }

    pub fn threshold(&self) -> &str {
        non_blank(&self.rp_threshold).unwrap_or("0.4")
    }

    /// Flags the prompt composer needs
    pub fn regional_config(&self) -> RegionalConfig {
        RegionalConfig {
            use_common: self.use_common(),
            use_base: self.use_base(),
            use_negative_common: self.use_negative_common(),
            not_change_and: self.not_change_and(),
            mode: self.mode(),
        }
    }
}

/// Whether `s` is a comma-separated list of numbers (`"0.2"`, `"1,2,1"`).
pub fn is_ratio_list(s: &str) -> bool {
    !s.trim().is_empty()
        && s.split(',')
            .all(|part| part.trim().parse::<f64>().is_ok_and(f64::is_finite))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Regional Prompter division mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionMode {
    #[default]
    Matrix,
    Mask,
    Prompt,
}

impl RegionMode {
    /// Case-insensitive; unknown names read as `Matrix`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "mask" => Self::Mask,
            "prompt" => Self::Prompt,
            _ => Self::Matrix,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matrix => "Matrix",
            Self::Mask => "Mask",
            Self::Prompt => "Prompt",
        }
    }
}

impl std::fmt::Display for RegionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region-composition flags consumed by the prompt composer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionalConfig {
    pub use_common: bool,
    pub use_base: bool,
    pub use_negative_common: bool,
    /// When set, `AND` is left for the backend and does not split regions
    pub not_change_and: bool,
    pub mode: RegionMode,
}
