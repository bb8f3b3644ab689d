//! Documented numeric bounds for generation parameters
//!
//! One table drives both payload validation and the caller-facing parameter
//! schema, so the two never disagree.

use serde_json::{Map, Value};

use crate::error::DomainError;

/// A numeric field with an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// Field name, or name prefix for per-unit fields (`controlnet_weight_`)
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub per_unit: bool,
}

impl Bound {
    const fn exact(field: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            min,
            max,
            per_unit: false,
        }
    }

    const fn per_unit(prefix: &'static str, min: f64, max: f64) -> Self {
        Self {
            field: prefix,
            min,
            max,
            per_unit: true,
        }
    }

    fn matches(&self, key: &str) -> bool {
        if self.per_unit {
            key.strip_prefix(self.field)
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        } else {
            key == self.field
        }
    }

    /// Check a value against the range; returns the number on success.
    pub fn check(&self, key: &str, value: &Value) -> Result<f64, DomainError> {
        let number = value
            .as_f64()
            .ok_or_else(|| DomainError::type_mismatch(key, "a number"))?;
        self.check_number(key, number)
    }

    pub fn check_number(&self, key: &str, number: f64) -> Result<f64, DomainError> {
        if !(self.min..=self.max).contains(&number) {
            return Err(DomainError::out_of_range(key, number, self.min, self.max));
        }
        Ok(number)
    }
}

pub const DENOISING_STRENGTH: Bound = Bound::exact("denoising_strength", 0.0, 1.0);
pub const HR_DENOISING_STRENGTH: Bound = Bound::exact("hr_denoising_strength", 0.0, 1.0);
pub const HR_SCALE: Bound = Bound::exact("hr_scale", 1.0, 4.0);
pub const HR_SECOND_PASS_STEPS: Bound = Bound::exact("hr_second_pass_steps", 0.0, 150.0);
pub const CONTROLNET_WEIGHT: Bound = Bound::per_unit("controlnet_weight_", 0.0, 2.0);
pub const CONTROLNET_GUIDANCE: Bound = Bound::exact("guidance", 0.0, 1.0);

/// Every bounded top-level field.
pub const BOUNDED_FIELDS: &[Bound] = &[
    DENOISING_STRENGTH,
    HR_DENOISING_STRENGTH,
    HR_SCALE,
    HR_SECOND_PASS_STEPS,
    CONTROLNET_WEIGHT,
];

pub fn bound_for(key: &str) -> Option<Bound> {
    BOUNDED_FIELDS.iter().copied().find(|b| b.matches(key))
}

/// Validate every bounded field present in `map`, in map order.
pub fn check_map(map: &Map<String, Value>) -> Result<(), DomainError> {
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        if let Some(bound) = bound_for(key) {
            bound.check(key, value)?;
        }
    }
    Ok(())
}
