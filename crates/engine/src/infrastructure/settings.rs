//! Engine settings with environment overrides.

use presetforge_domain::{is_ratio_list, DomainError};

/// Inclusive range for unit and model caps
const CAP_RANGE: std::ops::RangeInclusive<usize> = 1..=8;

/// Limits and defaults applied while building extension arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Maximum ControlNet units in one payload
    controlnet_max_units: usize,
    /// Maximum ADetailer models in one payload
    adetailer_max_models: usize,
    /// Regional Prompter base ratio used when a preset's is unusable
    rp_default_base_ratio: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            controlnet_max_units: 3,
            adetailer_max_models: 4,
            rp_default_base_ratio: "0.2".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn controlnet_max_units(&self) -> usize {
        self.controlnet_max_units
    }

    pub fn adetailer_max_models(&self) -> usize {
        self.adetailer_max_models
    }

    pub fn rp_default_base_ratio(&self) -> &str {
        &self.rp_default_base_ratio
    }

    pub fn with_controlnet_max_units(mut self, units: usize) -> Self {
        self.controlnet_max_units = units;
        self
    }

    pub fn with_adetailer_max_models(mut self, models: usize) -> Self {
        self.adetailer_max_models = models;
        self
    }

    pub fn with_rp_default_base_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.rp_default_base_ratio = ratio.into();
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("controlnet_max_units", self.controlnet_max_units),
            ("adetailer_max_models", self.adetailer_max_models),
        ] {
            if !CAP_RANGE.contains(&value) {
                return Err(DomainError::out_of_range(
                    field,
                    value as f64,
                    *CAP_RANGE.start() as f64,
                    *CAP_RANGE.end() as f64,
                ));
            }
        }
        if !is_ratio_list(&self.rp_default_base_ratio) {
            return Err(DomainError::type_mismatch(
                "rp_default_base_ratio",
                "a comma-separated list of numbers",
            ));
        }
        Ok(())
    }

    /// Defaults overridden from the process environment (and `.env`).
    ///
    /// Supported environment variables:
    /// - PRESETFORGE_CONTROLNET_MAX_UNITS: ControlNet unit cap (range: 1-8)
    /// - PRESETFORGE_ADETAILER_MAX_MODELS: ADetailer model cap (range: 1-8)
    /// - PRESETFORGE_RP_BASE_RATIO: Regional Prompter fallback base ratio
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to read .env file, using process environment only");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`; invalid values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(units) = read_cap(&lookup, "PRESETFORGE_CONTROLNET_MAX_UNITS") {
            settings.controlnet_max_units = units;
        }
        if let Some(models) = read_cap(&lookup, "PRESETFORGE_ADETAILER_MAX_MODELS") {
            settings.adetailer_max_models = models;
        }

        if let Some(val) = lookup("PRESETFORGE_RP_BASE_RATIO") {
            if is_ratio_list(&val) {
                tracing::info!(ratio = %val, "Applied PRESETFORGE_RP_BASE_RATIO environment variable");
                settings.rp_default_base_ratio = val.trim().to_string();
            } else {
                tracing::warn!(
                    val = %val,
                    "PRESETFORGE_RP_BASE_RATIO is not a comma-separated list of numbers, ignoring"
                );
            }
        }

        settings
    }
}

fn read_cap<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.trim().parse::<usize>() {
        Ok(cap) if CAP_RANGE.contains(&cap) => {
            tracing::info!(cap, key, "Applied engine cap environment variable");
            Some(cap)
        }
        Ok(cap) => {
            tracing::warn!(cap, key, "Engine cap out of range [1, 8], ignoring");
            None
        }
        Err(_) => {
            tracing::warn!(val = %val, key, "Engine cap is not a valid integer, ignoring");
            None
        }
    }
}
