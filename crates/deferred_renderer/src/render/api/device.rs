//! Device and command-context abstractions
//!
//! This module defines the traits that graphics backends implement so the
//! pipeline can create GPU objects and record commands without knowing which
//! API sits underneath. Backend failures cross this boundary only as
//! [`DeviceError`] values returned from creation calls.

use bitflags::bitflags;

use super::handles::{
    BlendStateHandle, BufferHandle, DepthStencilStateHandle, DepthStencilView, MeshHandle,
    RasterizerStateHandle, RenderTargetView, ResourceId, SamplerStateHandle, ShaderResourceView,
    TextureHandle,
};

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Failures reported by a graphics device while creating objects
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The device ran out of memory for the requested allocation
    #[error("out of GPU memory while creating '{label}'")]
    OutOfMemory {
        /// Debug label of the object being created
        label: &'static str,
    },

    /// The descriptor is not valid for this device
    #[error("invalid descriptor for '{label}': {reason}")]
    InvalidDescriptor {
        /// Debug label of the object being created
        label: &'static str,
        /// Why the descriptor was rejected
        reason: String,
    },

    /// The handle does not refer to a live object
    #[error("unknown resource {0:?}")]
    UnknownResource(ResourceId),
}

/// Pixel formats used by pipeline surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// Four 32-bit float channels (positions, normals)
    Rgba32Float,
    /// Four 16-bit float channels (HDR color)
    Rgba16Float,
    /// Four 8-bit normalized channels (albedo, UI)
    Rgba8Unorm,
    /// 24-bit depth with 8-bit stencil
    Depth24Stencil8,
    /// 32-bit float depth (shadow maps)
    Depth32Float,
}

impl TextureFormat {
    /// Whether the format holds depth data
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth24Stencil8 | Self::Depth32Float)
    }
}

bitflags! {
    /// How a texture may be bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Can be bound as a color render target
        const RENDER_TARGET = 1 << 0;
        /// Can be bound as a depth-stencil target
        const DEPTH_STENCIL = 1 << 1;
        /// Can be sampled from shaders
        const SHADER_RESOURCE = 1 << 2;
    }
}

/// Description of a texture to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    /// Debug label, also used by backends for diagnostics
    pub label: &'static str,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Number of array slices (1 for plain 2D surfaces)
    pub array_layers: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Allowed bindings
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Describe a single-slice 2D surface
    pub fn surface(label: &'static str, width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label,
            width,
            height,
            array_layers: 1,
            format,
            usage,
        }
    }
}

/// Source/destination blend factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// 0
    Zero,
    /// 1
    One,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
}

/// Blend state description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendDesc {
    /// Debug label
    pub label: &'static str,
    /// Whether blending is enabled at all
    pub enabled: bool,
    /// Factor applied to the incoming color
    pub src_factor: BlendFactor,
    /// Factor applied to the color already in the target
    pub dst_factor: BlendFactor,
}

impl BlendDesc {
    /// Standard "over" alpha blending
    pub fn alpha_blending(label: &'static str) -> Self {
        Self {
            label,
            enabled: true,
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
        }
    }
}

/// Depth comparison functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Never passes
    Never,
    /// Passes when incoming depth is smaller
    Less,
    /// Passes when incoming depth is smaller or equal
    LessEqual,
    /// Always passes
    Always,
}

/// Depth-stencil state description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilDesc {
    /// Debug label
    pub label: &'static str,
    /// Whether depth testing is enabled
    pub depth_test: bool,
    /// Whether passing fragments write depth
    pub depth_write: bool,
    /// Comparison used by the depth test
    pub compare: CompareFunction,
}

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Nearest texel
    Point,
    /// Bilinear
    Linear,
}

/// Texture addressing outside `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Clamp to the edge texel
    Clamp,
    /// Repeat the texture
    Wrap,
}

/// Sampler state description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerDesc {
    /// Debug label
    pub label: &'static str,
    /// Filtering mode
    pub filter: FilterMode,
    /// Address mode for all axes
    pub address: AddressMode,
    /// Comparison for shadow sampling, if any
    pub compare: Option<CompareFunction>,
}

/// Triangle culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Draw both faces
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Rasterizer state description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerDesc {
    /// Debug label
    pub label: &'static str,
    /// Face culling
    pub cull_mode: CullMode,
    /// Constant depth bias added to rasterized depth
    pub depth_bias: i32,
}

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Vertex data, updated from the CPU
    DynamicVertex,
    /// Shader constants
    Constant,
}

/// Buffer description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Debug label
    pub label: &'static str,
    /// Size in bytes
    pub size: u64,
    /// Binding role
    pub usage: BufferUsage,
}

/// Region of the render target that draws map onto
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels
    pub x: f32,
    /// Top edge in pixels
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Full-surface viewport for a `width` x `height` target
    #[allow(clippy::cast_precision_loss)]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }
}

/// Creates and destroys GPU objects
///
/// Implementations own the physical device. The pipeline calls these methods
/// lazily, the first time a pass needs an object, and releases what it created.
pub trait GraphicsDevice {
    /// Allocate a texture
    fn create_texture(&mut self, desc: &TextureDesc) -> DeviceResult<TextureHandle>;

    /// Create a color write-binding for a texture
    fn create_render_target_view(&mut self, texture: TextureHandle) -> DeviceResult<RenderTargetView>;

    /// Create a depth write-binding, optionally for a single array slice
    fn create_depth_stencil_view(&mut self, texture: TextureHandle, array_slice: Option<u32>) -> DeviceResult<DepthStencilView>;

    /// Create a read-binding covering every slice of a texture
    fn create_shader_resource_view(&mut self, texture: TextureHandle) -> DeviceResult<ShaderResourceView>;

    /// Create an immutable blend state
    fn create_blend_state(&mut self, desc: &BlendDesc) -> DeviceResult<BlendStateHandle>;

    /// Create an immutable depth-stencil state
    fn create_depth_stencil_state(&mut self, desc: &DepthStencilDesc) -> DeviceResult<DepthStencilStateHandle>;

    /// Create an immutable sampler state
    fn create_sampler_state(&mut self, desc: &SamplerDesc) -> DeviceResult<SamplerStateHandle>;

    /// Create an immutable rasterizer state
    fn create_rasterizer_state(&mut self, desc: &RasterizerDesc) -> DeviceResult<RasterizerStateHandle>;

    /// Allocate a buffer
    fn create_buffer(&mut self, desc: &BufferDesc) -> DeviceResult<BufferHandle>;

    /// Release any object created by this device
    ///
    /// Releasing an unknown id is ignored.
    fn release(&mut self, resource: ResourceId);
}

/// Records GPU commands for one frame
///
/// Calls return immediately; execution order on the GPU matches submission order.
pub trait CommandContext {
    /// Write-binding of the presentable back buffer
    fn back_buffer(&self) -> RenderTargetView;

    /// Set the viewport for subsequent draws
    fn set_viewport(&mut self, viewport: Viewport);

    /// Clear a color write-binding
    fn clear_render_target(&mut self, view: RenderTargetView, color: [f32; 4]);

    /// Clear a depth write-binding
    fn clear_depth_stencil(&mut self, view: DepthStencilView, depth: f32, stencil: u8);

    /// Bind draw targets, replacing all previously bound targets
    ///
    /// An empty slice with `None` depth unbinds everything.
    fn set_render_targets(&mut self, colors: &[RenderTargetView], depth: Option<DepthStencilView>);

    /// Bind read-bindings to consecutive shader slots starting at `start_slot`
    fn set_shader_resources(&mut self, start_slot: u32, views: &[ShaderResourceView]);

    /// Unbind `count` shader slots starting at `start_slot`
    fn clear_shader_resources(&mut self, start_slot: u32, count: u32);

    /// Bind a blend state, `None` restores the default (blending off)
    fn set_blend_state(&mut self, state: Option<BlendStateHandle>);

    /// Bind a depth-stencil state, `None` restores the default (test and write on)
    fn set_depth_stencil_state(&mut self, state: Option<DepthStencilStateHandle>);

    /// Bind a rasterizer state, `None` restores the default (back-face culling)
    fn set_rasterizer_state(&mut self, state: Option<RasterizerStateHandle>);

    /// Bind samplers to consecutive slots
    fn set_samplers(&mut self, start_slot: u32, samplers: &[SamplerStateHandle]);

    /// Select the shading technique for subsequent draws
    fn set_technique(&mut self, name: &str);

    /// Upload shader constants to a slot
    fn update_constants(&mut self, slot: u32, data: &[u8]);

    /// Overwrite the start of a buffer with `data`
    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    /// Draw a scene mesh with the currently bound state
    fn draw_mesh(&mut self, mesh: MeshHandle);

    /// Draw procedurally generated vertices (full-screen triangles, sky cube)
    fn draw(&mut self, vertex_count: u32, first_vertex: u32);

    /// Draw a line list from a vertex buffer
    fn draw_lines(&mut self, buffer: BufferHandle, vertex_count: u32);
}
