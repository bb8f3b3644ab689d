//! Infrastructure - port traits and their in-process implementations.

pub mod ports;
pub mod preset_store;
pub mod settings;
pub mod tracing_observer;
