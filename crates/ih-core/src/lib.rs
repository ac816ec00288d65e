//! idea-hub/crates/ih-core/src/lib.rs
//!
//! The idea discovery and interaction engine, plus the port traits every
//! storage and identity plugin implements.

pub mod engine;
pub mod error;
pub mod feed;
pub mod models;
pub mod stats;
pub mod traits;

// Re-exporting for easier access in other crates
pub use engine::*;
pub use error::*;
pub use feed::*;
pub use models::*;
pub use stats::*;
pub use traits::*;
