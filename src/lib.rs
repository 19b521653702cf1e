//! Wardrobe - clothing catalog with AI tagging and outfit suggestions
//!
//! Photos are compressed locally, stored in hosted object storage, tagged by a
//! hosted vision model, and later combined into outfit recommendations.

pub mod ai;
pub mod compress;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod storage;

pub use pipeline::Wardrobe;
