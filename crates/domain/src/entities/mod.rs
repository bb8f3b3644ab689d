//! Domain entities - Core business objects with identity

mod preset;

pub use preset::{Extensions, Preset, PresetKind, PromptTemplate};
