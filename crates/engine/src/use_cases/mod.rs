//! Use cases - Preset translation.
//!
//! Each module covers one step of turning a preset into a backend request.
//! `payload` orchestrates the others.

pub mod extensions;
pub mod payload;
pub mod prompt;
pub mod schema;

// Re-export main types
pub use extensions::{BuildContext, PluginArgs, PositionalArgs};
pub use payload::{Payload, PayloadAssembler};
pub use prompt::{compose, Composition};
pub use schema::{describe_parameters, ParameterSchema, ParameterSpec, ParamType};
