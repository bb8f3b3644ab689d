//! Value objects - Immutable objects defined by their attributes

pub mod bounds;
mod extensions;
pub mod lenient;
mod params;
mod prompt_syntax;
mod regional;
mod regions;

pub use bounds::{bound_for, check_map, Bound, BOUNDED_FIELDS};
pub use extensions::{
    ADetailerConfig, ADetailerModel, ADetailerModelEntry, ControlNetConfig, ControlNetUnit,
    DynamicPromptsConfig, ExtensionConfig, ExtensionKind, DEFAULT_ADETAILER_MODEL,
};
pub use params::UserParams;
pub use prompt_syntax::{check_weighting, nesting_depth_at};
pub use regional::{is_ratio_list, RegionMode, RegionalConfig, RegionalPrompterConfig};
pub use regions::{find_keywords, split_regions, Chunk, KeywordHit, RegionKeyword, RegionSplit};
