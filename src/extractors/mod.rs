// src/extractors/mod.rs
pub mod insights;
pub mod section;

// Re-export key extraction types for convenience
pub use insights::extract_insights;
pub use section::{segment, ItemId, Section};
