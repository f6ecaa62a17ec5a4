//! Opaque handles to device-owned GPU objects
//!
//! The pipeline never sees backend objects directly. Every surface, view,
//! state and buffer is referred to through a small copyable handle minted by
//! the [`GraphicsDevice`](super::GraphicsDevice) that created it.

/// Identifier of any object created by a graphics device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub ResourceId);

        impl $name {
            /// Underlying device resource identifier
            pub fn id(self) -> ResourceId {
                self.0
            }
        }

        impl From<$name> for ResourceId {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }
    };
}

resource_handle!(
    /// Handle to a texture (the backing memory of a surface)
    TextureHandle
);
resource_handle!(
    /// Write-binding of a color surface
    RenderTargetView
);
resource_handle!(
    /// Write-binding of a depth surface (or one slice of a depth array)
    DepthStencilView
);
resource_handle!(
    /// Read-binding of a surface for sampling in shaders
    ShaderResourceView
);
resource_handle!(
    /// Immutable blend configuration
    BlendStateHandle
);
resource_handle!(
    /// Immutable depth-stencil configuration
    DepthStencilStateHandle
);
resource_handle!(
    /// Immutable sampler configuration
    SamplerStateHandle
);
resource_handle!(
    /// Immutable rasterizer configuration
    RasterizerStateHandle
);
resource_handle!(
    /// GPU buffer (vertex data, constants)
    BufferHandle
);

/// Handle to mesh geometry owned by the scene layer
///
/// The pipeline only forwards it to draw calls and never releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);
