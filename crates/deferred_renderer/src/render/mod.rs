//! # Rendering Pipeline
//!
//! This module holds the deferred rendering pipeline and everything it
//! coordinates.
//!
//! ## Architecture
//!
//! - **RenderingSystem**: per-frame orchestrator running the fixed pass sequence
//! - **PassStateTracker**: bitmask state machine guarding pass begin/end pairing
//! - **GBuffer**: multiple-render-target geometry buffer with write/read bindings
//! - **RenderablePartition**: per-frame opaque / transparent / UI split
//! - **ResourceProvisioner**: get-or-create cache of lazily built GPU objects
//! - **passes**: one stage function per render pass
//! - **api**: device and command-context traits the backend implements
//! - **backends**: concrete backends (a headless recording backend)

pub mod api;
pub mod backends;
pub mod constants;
pub mod debug_lines;
pub mod gbuffer;
pub mod lighting;
pub mod partition;
pub mod pass_state;
pub mod passes;
pub mod primitives;
pub mod provisioner;
pub mod renderable;
pub mod rendering_system;
pub mod surface;
pub mod technique;

pub use api::{CommandContext, DeviceError, GraphicsDevice, MeshHandle, ShaderResourceView};
pub use debug_lines::DebugLine;
pub use gbuffer::GBuffer;
pub use lighting::{Light, LightType, LightingEnvironment};
pub use partition::RenderablePartition;
pub use pass_state::{PassStateTracker, RenderPass, RenderPassSet};
pub use primitives::{Camera, CameraContext};
pub use provisioner::{ResourceProvisioner, ShadowMapArray};
pub use renderable::{EntityId, RenderLayer, RenderableComponent};
pub use rendering_system::{FrameInput, FrameStats, RenderingSystem, SkipReason};
pub use surface::BindingState;
pub use technique::{ShadingModel, Technique};

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for pipeline operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by the rendering pipeline
///
/// Only [`RenderError::ResourceCreationFailed`] is recovered from inside a
/// frame; every other variant reaches the caller.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A GPU surface, view, state or buffer could not be created
    ///
    /// The pass that needed it is skipped for the frame; later passes still run.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(#[from] DeviceError),

    /// A pass was opened twice, overlapped another pass, or closed out of order
    #[error("Invalid render pass transition for {pass} (current: {current}): {reason}")]
    InvalidPassTransition {
        /// Pass the caller tried to open or close
        pass: RenderPass,
        /// Pass that was current at the time
        current: RenderPass,
        /// What rule was broken
        reason: &'static str,
    },

    /// A surface was about to be read while bound for writing, or the reverse
    #[error("Binding hazard on '{surface}': requested {requested:?} while {current:?}")]
    BindingHazard {
        /// Label of the surface
        surface: &'static str,
        /// Binding the caller asked for
        requested: BindingState,
        /// Binding that is still active
        current: BindingState,
    },

    /// No camera was supplied for the frame
    #[error("No active camera supplied; frame skipped")]
    MissingCamera,

    /// A component was used before its GPU resources were created
    #[error("{0} used before initialization")]
    NotInitialized(&'static str),

    /// Viewport dimensions cannot back a surface
    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Pipeline configuration failed validation
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

impl RenderError {
    /// Whether the frame may continue after this error (by skipping one pass)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ResourceCreationFailed(_))
    }
}
