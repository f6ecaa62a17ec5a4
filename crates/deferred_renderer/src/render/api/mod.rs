//! Backend abstraction layer
//!
//! Traits and handle types that separate the pipeline from the graphics API
//! that executes its commands.

pub mod device;
pub mod handles;

pub use device::{
    AddressMode, BlendDesc, BlendFactor, BufferDesc, BufferUsage, CommandContext, CompareFunction,
    CullMode, DepthStencilDesc, DeviceError, DeviceResult, FilterMode, GraphicsDevice,
    RasterizerDesc, SamplerDesc, TextureDesc, TextureFormat, TextureUsage, Viewport,
};
pub use handles::{
    BlendStateHandle, BufferHandle, DepthStencilStateHandle, DepthStencilView, MeshHandle,
    RasterizerStateHandle, RenderTargetView, ResourceId, SamplerStateHandle, ShaderResourceView,
    TextureHandle,
};
