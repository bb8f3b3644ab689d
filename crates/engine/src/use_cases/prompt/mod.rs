//! Prompt composition use case.

mod composer;

pub use composer::{compose, Composition};
