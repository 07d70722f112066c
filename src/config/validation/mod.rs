//! Configuration validation
//!
//! - `validators`: `Validate` implementations for every configuration section
//! - `tests`: test suite for all validators

mod validators;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
