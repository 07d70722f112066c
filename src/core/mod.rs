//! Core orchestration: caching, credential rotation, provider fallback and
//! the recipe operations built on top of them

pub mod assistant;
pub mod cache;
pub mod credentials;
pub mod extraction;
pub mod fallback;
pub mod operations;
pub mod providers;
pub mod search;
