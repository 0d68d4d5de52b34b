// src/profile/mod.rs
pub mod quality;
pub mod validator;

pub use quality::{analyze, needs_regeneration};
