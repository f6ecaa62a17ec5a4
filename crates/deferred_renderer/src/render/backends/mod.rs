//! Concrete graphics backends
//!
//! - **recording**: headless backend that records commands and simulates
//!   surface contents, used by tests and the pipeline demo

pub mod recording;

pub use recording::{RecordedCommand, RecordingContext, RecordingDevice, SurfaceContents};
