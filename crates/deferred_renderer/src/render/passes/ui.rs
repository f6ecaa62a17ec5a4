//! UI pass
//!
//! Draws UI components last, directly into the back buffer, with depth
//! disabled and the camera's pixel-space orthographic matrix.

use crate::render::api::{CommandContext, Viewport};
use crate::render::constants::{CameraConstants, CAMERA_SLOT};
use crate::render::primitives::CameraContext;
use crate::render::provisioner::OverlayStates;
use crate::render::renderable::RenderableComponent;
use crate::render::technique::Technique;
use crate::render::RenderResult;

use super::{draw_components, upload};

/// Draw `ui` over the back buffer in submission order
pub fn render_ui_pass(
    ctx: &mut dyn CommandContext,
    states: OverlayStates,
    camera: &CameraContext,
    ui: &[&RenderableComponent],
    global: &Technique,
) -> RenderResult<u32> {
    let back_buffer = ctx.back_buffer();
    ctx.set_render_targets(&[back_buffer], None);

    let (width, height) = camera.viewport_size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_blend_state(Some(states.blend));
    ctx.set_depth_stencil_state(Some(states.depth));

    let overlay = CameraConstants::from_view_projection(camera.orthographic(), camera.position(), (width, height));
    upload(ctx, CAMERA_SLOT, &overlay);
    let draws = draw_components(ctx, ui, camera.orthographic(), global);

    ctx.set_blend_state(None);
    ctx.set_depth_stencil_state(None);
    ctx.set_render_targets(&[], None);
    Ok(draws)
}
