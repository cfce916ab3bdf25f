//! Logstream Core
//!
//! Provider-agnostic building blocks: resource values, attribute schemas,
//! the `Provider` trait and the differ that classifies pending changes.

pub mod differ;
pub mod provider;
pub mod resource;
pub mod schema;
