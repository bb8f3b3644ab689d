//! Preset and extension data model for presetforge.
//!
//! Everything here is plain data plus validation: presets, caller parameters,
//! extension configuration, region splitting and the documented numeric
//! bounds. The engine crate turns these into backend payloads.

pub mod entities;
pub mod error;
pub mod value_objects;

pub use entities::{Extensions, Preset, PresetKind, PromptTemplate};

pub use error::{CompositionError, DomainError, PromptSyntaxError, ValidationError};

pub use value_objects::{
    bound_for, check_map, check_weighting, find_keywords, is_ratio_list, lenient, nesting_depth_at,
    split_regions, ADetailerConfig, ADetailerModel, ADetailerModelEntry, Bound, Chunk,
    ControlNetConfig, ControlNetUnit, DynamicPromptsConfig, ExtensionConfig, ExtensionKind,
    KeywordHit, RegionKeyword, RegionMode, RegionSplit, RegionalConfig, RegionalPrompterConfig,
    UserParams, BOUNDED_FIELDS, DEFAULT_ADETAILER_MODEL,
};
pub use value_objects::bounds;
