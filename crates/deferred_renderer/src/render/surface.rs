//! Dual-binding GPU surfaces
//!
//! A [`Surface`] owns one texture plus two views onto the same memory: a
//! write-binding (render target or depth target) and a read-binding (shader
//! resource). The surface remembers which of the two is bound and refuses to
//! hand out the other one until it is unbound, which rules out sampling a
//! surface that is still being rendered to.

use crate::render::api::{
    DepthStencilView, GraphicsDevice, RenderTargetView, ShaderResourceView, TextureDesc,
    TextureFormat, TextureHandle, TextureUsage,
};
use crate::render::{RenderError, RenderResult};

/// Which binding of a surface is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Neither binding is active
    Unbound,
    /// Bound as a draw target
    Write,
    /// Bound as shader input
    Read,
}

/// Texture with a write-binding of type `W` and a read-binding
#[derive(Debug)]
pub struct Surface<W: Copy> {
    label: &'static str,
    texture: TextureHandle,
    write: W,
    read: ShaderResourceView,
    width: u32,
    height: u32,
    state: BindingState,
}

/// Color surface written through a render target view
pub type ColorSurface = Surface<RenderTargetView>;

/// Depth surface written through a depth-stencil view
pub type DepthSurface = Surface<DepthStencilView>;

impl<W: Copy> Surface<W> {
    /// Debug label
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Backing texture
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Surface dimensions
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Current binding
    pub fn binding_state(&self) -> BindingState {
        self.state
    }

    /// Write-binding, without marking it bound
    ///
    /// Used for clears. Fails while the read-binding is active.
    pub fn write_view(&self) -> RenderResult<W> {
        self.check(BindingState::Write)?;
        Ok(self.write)
    }

    /// Read-binding, without marking it bound
    ///
    /// Fails while the write-binding is active.
    pub fn read_view(&self) -> RenderResult<ShaderResourceView> {
        self.check(BindingState::Read)?;
        Ok(self.read)
    }

    /// Mark the write-binding active and return it for binding
    pub fn bind_write(&mut self) -> RenderResult<W> {
        let view = self.write_view()?;
        self.state = BindingState::Write;
        Ok(view)
    }

    /// Mark the read-binding active and return it for binding
    pub fn bind_read(&mut self) -> RenderResult<ShaderResourceView> {
        let view = self.read_view()?;
        self.state = BindingState::Read;
        Ok(view)
    }

    /// Mark both bindings inactive
    ///
    /// The caller is responsible for unbinding the view on the command context.
    pub fn mark_unbound(&mut self) {
        self.state = BindingState::Unbound;
    }

    /// Release the views and texture
    pub fn release(self, device: &mut dyn GraphicsDevice)
    where
        W: Into<crate::render::api::ResourceId>,
    {
        device.release(self.write.into());
        device.release(self.read.id());
        device.release(self.texture.id());
        log::debug!("Released surface '{}'", self.label);
    }

    fn check(&self, requested: BindingState) -> RenderResult<()> {
        let conflicting = match requested {
            BindingState::Write => BindingState::Read,
            BindingState::Read => BindingState::Write,
            BindingState::Unbound => return Ok(()),
        };

        if self.state == conflicting {
            return Err(RenderError::BindingHazard {
                surface: self.label,
                requested,
                current: self.state,
            });
        }

        Ok(())
    }
}

impl ColorSurface {
    /// Create a color surface and both of its bindings
    ///
    /// Anything created before a failure is released again.
    pub fn create(
        device: &mut dyn GraphicsDevice,
        label: &'static str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> RenderResult<Self> {
        check_size(width, height)?;
        let desc = TextureDesc::surface(
            label,
            width,
            height,
            format,
            TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE,
        );
        let texture = device.create_texture(&desc)?;

        let write = match device.create_render_target_view(texture) {
            Ok(view) => view,
            Err(e) => {
                device.release(texture.id());
                return Err(e.into());
            }
        };

        let read = match device.create_shader_resource_view(texture) {
            Ok(view) => view,
            Err(e) => {
                device.release(write.id());
                device.release(texture.id());
                return Err(e.into());
            }
        };

        log::debug!("Created color surface '{}' {}x{} {:?}", label, width, height, format);
        Ok(Self {
            label,
            texture,
            write,
            read,
            width,
            height,
            state: BindingState::Unbound,
        })
    }
}

impl DepthSurface {
    /// Create a depth surface and both of its bindings
    ///
    /// Anything created before a failure is released again.
    pub fn create(
        device: &mut dyn GraphicsDevice,
        label: &'static str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> RenderResult<Self> {
        check_size(width, height)?;
        let desc = TextureDesc::surface(
            label,
            width,
            height,
            format,
            TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
        );
        let texture = device.create_texture(&desc)?;

        let write = match device.create_depth_stencil_view(texture, None) {
            Ok(view) => view,
            Err(e) => {
                device.release(texture.id());
                return Err(e.into());
            }
        };

        let read = match device.create_shader_resource_view(texture) {
            Ok(view) => view,
            Err(e) => {
                device.release(write.id());
                device.release(texture.id());
                return Err(e.into());
            }
        };

        log::debug!("Created depth surface '{}' {}x{} {:?}", label, width, height, format);
        Ok(Self {
            label,
            texture,
            write,
            read,
            width,
            height,
            state: BindingState::Unbound,
        })
    }
}

fn check_size(width: u32, height: u32) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidViewport { width, height });
    }
    Ok(())
}
