//! Unified error types for the domain layer
//!
//! `DomainError` is what the engine returns to callers: either the preset is
//! unusable (`Configuration`) or a caller/preset value broke a documented
//! bound (`Validation`). `CompositionError` is different in kind: it is never
//! returned as an `Err`, the prompt composer reports it and falls back to the
//! simple join.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// The preset cannot be used as-is (missing type-mandated settings, unknown type)
    #[error("Configuration error in preset '{preset}': {reason}")]
    Configuration { preset: String, reason: String },

    /// A bounded or required field failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl DomainError {
    /// Creates a configuration error for a preset that cannot be assembled.
    ///
    /// # Example
    /// ```ignore
    /// if preset.base_settings.is_none() {
    ///     return Err(DomainError::configuration(&preset.name, "base_settings is required"));
    /// }
    /// ```
    pub fn configuration(preset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            preset: preset.into(),
            reason: reason.into(),
        }
    }

    /// Create an out-of-range validation error
    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::Validation(ValidationError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        })
    }

    /// Create a type mismatch validation error
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str) -> Self {
        Self::Validation(ValidationError::TypeMismatch {
            field: field.into(),
            expected,
        })
    }

    /// Create a missing parameter validation error
    pub fn missing_parameter(field: impl Into<String>) -> Self {
        Self::Validation(ValidationError::MissingParameter(field.into()))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A bounded, typed or required field was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("missing required parameter: {0}")]
    MissingParameter(String),
}

/// Bracket nesting problem found in a prompt's weighting syntax.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromptSyntaxError {
    #[error("Unmatched '{bracket}' at position {position}")]
    Unmatched { bracket: char, position: usize },

    #[error("Unclosed {group}: {open} open")]
    Unclosed { group: &'static str, open: usize },
}

/// Region splitting could not be applied without corrupting the prompt.
///
/// Non-fatal: the composer falls back to the simple prefix/suffix join.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("region keyword {keyword} at position {position} sits inside a weighting group")]
    DelimiterInsideGroup {
        keyword: &'static str,
        position: usize,
    },

    #[error("unbalanced weighting syntax: {0}")]
    UnbalancedWeighting(PromptSyntaxError),

    #[error("prompt contains region keywords but no region text")]
    EmptyRegions,
}
