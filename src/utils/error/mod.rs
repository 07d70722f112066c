//! Error handling utilities

pub mod types;

pub use types::{GatewayError, Result};
