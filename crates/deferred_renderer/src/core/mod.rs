//! Core configuration for the rendering pipeline

pub mod config;

pub use config::{PipelineConfig, PassToggles};
