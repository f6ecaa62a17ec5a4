//! Transparency pass
//!
//! Forward-shades the back-to-front transparent list over the lighting
//! target. Depth is tested against the G-buffer depth but not written, so
//! transparent surfaces never hide each other.

use crate::render::api::{CommandContext, Viewport};
use crate::render::constants::{CameraConstants, LightConstants, CAMERA_SLOT, LIGHT_SLOT};
use crate::render::primitives::CameraContext;
use crate::render::provisioner::TransparencyStates;
use crate::render::renderable::RenderableComponent;
use crate::render::surface::{ColorSurface, DepthSurface};
use crate::render::technique::Technique;
use crate::render::RenderResult;

use super::{draw_components, upload};

/// Blend `transparent` over `target`
pub fn render_transparency_pass(
    ctx: &mut dyn CommandContext,
    target: &mut ColorSurface,
    depth: &mut DepthSurface,
    states: TransparencyStates,
    camera: &CameraContext,
    transparent: &[&RenderableComponent],
    lights: &LightConstants,
    global: &Technique,
) -> RenderResult<u32> {
    let result = record(ctx, target, depth, states, camera, transparent, lights, global);

    ctx.set_blend_state(None);
    ctx.set_depth_stencil_state(None);
    ctx.set_render_targets(&[], None);
    target.mark_unbound();
    depth.mark_unbound();
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    target: &mut ColorSurface,
    depth: &mut DepthSurface,
    states: TransparencyStates,
    camera: &CameraContext,
    transparent: &[&RenderableComponent],
    lights: &LightConstants,
    global: &Technique,
) -> RenderResult<u32> {
    let color = target.bind_write()?;
    let depth_view = depth.bind_write()?;
    ctx.set_render_targets(&[color], Some(depth_view));

    let (width, height) = camera.viewport_size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_blend_state(Some(states.blend));
    ctx.set_depth_stencil_state(Some(states.depth));

    upload(ctx, CAMERA_SLOT, &CameraConstants::from_context(camera));
    upload(ctx, LIGHT_SLOT, lights);

    Ok(draw_components(ctx, transparent, camera.view_projection(), global))
}
