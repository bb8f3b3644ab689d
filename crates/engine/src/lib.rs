//! presetforge engine library.
//!
//! Translates declarative presets plus caller parameters into request bodies
//! for an SD WebUI-compatible backend. Everything here is synchronous and
//! free of I/O; loading presets and talking to the backend happen elsewhere.
//!
//! ## Structure
//!
//! - `use_cases/` - Prompt composition, extension arguments, payload assembly
//! - `infrastructure/` - Ports, settings and the default adapters

pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for preset-driven tests.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end tests over the fixture presets.
#[cfg(test)]
mod e2e_tests;

pub use infrastructure::ports::{AssemblyObserver, EngineError, OmitReason, PresetStore};
pub use infrastructure::preset_store::InMemoryPresetStore;
pub use infrastructure::settings::EngineSettings;
pub use infrastructure::tracing_observer::TracingObserver;
pub use use_cases::{describe_parameters, Payload, PayloadAssembler};
