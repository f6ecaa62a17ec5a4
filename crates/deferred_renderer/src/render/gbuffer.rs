//! # Geometry Buffer
//!
//! The frame surface set of the deferred pipeline: three color surfaces
//! (world position, normal, albedo) and a depth-stencil surface, all sized to
//! the viewport. Each surface has a write-binding for the geometry pass and a
//! read-binding for the passes that consume it.
//!
//! ## Layout
//!
//! | Surface  | Format          | Shader slot |
//! |----------|-----------------|-------------|
//! | position | RGBA32F         | 0           |
//! | normal   | RGBA32F         | 1           |
//! | albedo   | RGBA8 UNORM     | 2           |
//! | depth    | D24S8           | (bound per pass) |

use crate::render::api::{CommandContext, GraphicsDevice, TextureFormat};
use crate::render::constants::GBUFFER_FIRST_SLOT;
use crate::render::surface::{BindingState, ColorSurface, DepthSurface};
use crate::render::{RenderError, RenderResult};

/// Labels and formats of the color surfaces, in shader slot order
const COLOR_LAYOUT: [(&str, TextureFormat); 3] = [
    ("gbuffer_position", TextureFormat::Rgba32Float),
    ("gbuffer_normal", TextureFormat::Rgba32Float),
    ("gbuffer_albedo", TextureFormat::Rgba8Unorm),
];

const DEPTH_LABEL: &str = "gbuffer_depth";

/// Number of color surfaces bound as shader resources
pub const GBUFFER_COLOR_COUNT: u32 = 3;

#[derive(Debug)]
struct Surfaces {
    colors: Vec<ColorSurface>,
    depth: DepthSurface,
    width: u32,
    height: u32,
}

/// Multiple-render-target geometry buffer
#[derive(Debug, Default)]
pub struct GBuffer {
    surfaces: Option<Surfaces>,
}

impl GBuffer {
    /// Create an uninitialized G-buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate all surfaces for a `width` x `height` viewport
    ///
    /// Existing surfaces are released first. On failure everything created
    /// by this call is released and the G-buffer is left uninitialized.
    pub fn initialize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> RenderResult<()> {
        self.release(device);

        let mut colors = Vec::with_capacity(COLOR_LAYOUT.len());
        for (label, format) in COLOR_LAYOUT {
            match ColorSurface::create(device, label, width, height, format) {
                Ok(surface) => colors.push(surface),
                Err(e) => {
                    log::error!("Failed to create G-buffer surface '{}': {}", label, e);
                    release_colors(colors, device);
                    return Err(e);
                }
            }
        }

        let depth = match DepthSurface::create(device, DEPTH_LABEL, width, height, TextureFormat::Depth24Stencil8) {
            Ok(depth) => depth,
            Err(e) => {
                log::error!("Failed to create G-buffer depth: {}", e);
                release_colors(colors, device);
                return Err(e);
            }
        };

        self.surfaces = Some(Surfaces {
            colors,
            depth,
            width,
            height,
        });
        log::info!("G-buffer initialized at {}x{}", width, height);
        Ok(())
    }

    /// Whether the surfaces exist
    pub fn is_initialized(&self) -> bool {
        self.surfaces.is_some()
    }

    /// Surface dimensions, if initialized
    pub fn size(&self) -> Option<(u32, u32)> {
        self.surfaces.as_ref().map(|s| (s.width, s.height))
    }

    /// Clear the color surfaces to `clear_color` and depth to 1.0 / stencil 0
    pub fn clear(&mut self, ctx: &mut dyn CommandContext, clear_color: [f32; 4]) -> RenderResult<()> {
        let surfaces = self.surfaces_mut()?;
        for color in &surfaces.colors {
            ctx.clear_render_target(color.write_view()?, clear_color);
        }
        ctx.clear_depth_stencil(surfaces.depth.write_view()?, 1.0, 0);
        Ok(())
    }

    /// Bind the three color write-bindings and the depth write-binding
    pub fn set_render_targets(&mut self, ctx: &mut dyn CommandContext) -> RenderResult<()> {
        let surfaces = self.surfaces_mut()?;

        // Check every surface before marking any of them bound
        let views = surfaces
            .colors
            .iter()
            .map(ColorSurface::write_view)
            .collect::<RenderResult<Vec<_>>>()?;
        let depth = surfaces.depth.write_view()?;

        for color in &mut surfaces.colors {
            color.bind_write()?;
        }
        surfaces.depth.bind_write()?;

        ctx.set_render_targets(&views, Some(depth));
        Ok(())
    }

    /// Bind the three color read-bindings to shader slots 0..2
    ///
    /// Rejected with [`RenderError::BindingHazard`] while the write-bindings
    /// are still bound. Depth is not bound here.
    pub fn set_as_resources(&mut self, ctx: &mut dyn CommandContext) -> RenderResult<()> {
        let surfaces = self.surfaces_mut()?;

        let views = surfaces
            .colors
            .iter()
            .map(ColorSurface::read_view)
            .collect::<RenderResult<Vec<_>>>()?;

        for color in &mut surfaces.colors {
            color.bind_read()?;
        }

        ctx.set_shader_resources(GBUFFER_FIRST_SLOT, &views);
        Ok(())
    }

    /// Unbind the write-bindings bound by [`GBuffer::set_render_targets`]
    pub fn unbind_targets(&mut self, ctx: &mut dyn CommandContext) {
        ctx.set_render_targets(&[], None);
        if let Some(surfaces) = self.surfaces.as_mut() {
            for color in &mut surfaces.colors {
                if color.binding_state() == BindingState::Write {
                    color.mark_unbound();
                }
            }
            if surfaces.depth.binding_state() == BindingState::Write {
                surfaces.depth.mark_unbound();
            }
        }
    }

    /// Unbind the read-bindings bound by [`GBuffer::set_as_resources`]
    pub fn unbind_resources(&mut self, ctx: &mut dyn CommandContext) {
        ctx.clear_shader_resources(GBUFFER_FIRST_SLOT, GBUFFER_COLOR_COUNT);
        if let Some(surfaces) = self.surfaces.as_mut() {
            for color in &mut surfaces.colors {
                if color.binding_state() == BindingState::Read {
                    color.mark_unbound();
                }
            }
        }
    }

    /// Depth surface, for passes that test against or sample scene depth
    pub fn depth_mut(&mut self) -> RenderResult<&mut DepthSurface> {
        Ok(&mut self.surfaces_mut()?.depth)
    }

    /// Binding state of every surface, colors first
    pub fn binding_states(&self) -> Vec<BindingState> {
        self.surfaces.as_ref().map_or_else(Vec::new, |s| {
            s.colors
                .iter()
                .map(ColorSurface::binding_state)
                .chain(std::iter::once(s.depth.binding_state()))
                .collect()
        })
    }

    /// Release every surface
    ///
    /// Idempotent and a no-op when uninitialized.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(surfaces) = self.surfaces.take() {
            release_colors(surfaces.colors, device);
            surfaces.depth.release(device);
            log::info!("G-buffer released");
        }
    }

    fn surfaces_mut(&mut self) -> RenderResult<&mut Surfaces> {
        self.surfaces.as_mut().ok_or(RenderError::NotInitialized("GBuffer"))
    }
}

fn release_colors(colors: Vec<ColorSurface>, device: &mut dyn GraphicsDevice) {
    for color in colors {
        color.release(device);
    }
}
