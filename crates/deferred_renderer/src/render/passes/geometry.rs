//! G-buffer pass
//!
//! Clears the G-buffer and rasterizes opaque geometry into it. No lighting
//! is evaluated here; the surfaces receive position, normal and albedo.

use crate::render::api::{CommandContext, Viewport};
use crate::render::constants::{CameraConstants, CAMERA_SLOT};
use crate::render::gbuffer::GBuffer;
use crate::render::primitives::CameraContext;
use crate::render::renderable::RenderableComponent;
use crate::render::technique::Technique;
use crate::render::RenderResult;

use super::{draw_components, upload};

/// Fill the G-buffer from the opaque list
pub fn render_geometry_pass(
    ctx: &mut dyn CommandContext,
    gbuffer: &mut GBuffer,
    camera: &CameraContext,
    opaque: &[&RenderableComponent],
    global: &Technique,
    clear_color: [f32; 4],
) -> RenderResult<u32> {
    let result = record(ctx, gbuffer, camera, opaque, global, clear_color);
    gbuffer.unbind_targets(ctx);
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    gbuffer: &mut GBuffer,
    camera: &CameraContext,
    opaque: &[&RenderableComponent],
    global: &Technique,
    clear_color: [f32; 4],
) -> RenderResult<u32> {
    gbuffer.clear(ctx, clear_color)?;
    gbuffer.set_render_targets(ctx)?;

    let (width, height) = camera.viewport_size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_blend_state(None);
    ctx.set_depth_stencil_state(None);
    ctx.set_rasterizer_state(None);
    upload(ctx, CAMERA_SLOT, &CameraConstants::from_context(camera));

    Ok(draw_components(ctx, opaque, camera.view_projection(), global))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::recording::SurfaceContents;
    use crate::render::passes::test_support::{component, setup};
    use crate::render::surface::BindingState;

    #[test]
    fn test_empty_scene_leaves_clear_values() {
        let (mut device, mut ctx, camera) = setup(320, 240);
        let mut gbuffer = GBuffer::new();
        gbuffer.initialize(&mut device, 320, 240).unwrap();

        let draws = render_geometry_pass(&mut ctx, &mut gbuffer, &camera, &[], &Technique::default(), [0.0; 4]).unwrap();
        assert_eq!(draws, 0);

        gbuffer.set_as_resources(&mut ctx).unwrap();
        assert_eq!(device.contents_at_slot(2), Some(SurfaceContents::Color([0.0; 4])));
    }

    #[test]
    fn test_draws_opaque_and_unbinds() {
        let (mut device, mut ctx, camera) = setup(320, 240);
        let mut gbuffer = GBuffer::new();
        gbuffer.initialize(&mut device, 320, 240).unwrap();
        let a = component(1, 3.0);
        let b = component(2, 6.0);

        let draws = render_geometry_pass(&mut ctx, &mut gbuffer, &camera, &[&a, &b], &Technique::default(), [0.0; 4]).unwrap();
        assert_eq!(draws, 2);
        assert!(gbuffer.binding_states().iter().all(|s| *s == BindingState::Unbound));

        gbuffer.set_as_resources(&mut ctx).unwrap();
        assert_eq!(device.contents_at_slot(0), Some(SurfaceContents::Rendered));
        assert!(device.hazards().is_empty());
    }

    #[test]
    fn test_uninitialized_gbuffer_fails() {
        let (_device, mut ctx, camera) = setup(32, 32);
        let mut gbuffer = GBuffer::new();
        assert!(render_geometry_pass(&mut ctx, &mut gbuffer, &camera, &[], &Technique::default(), [0.0; 4]).is_err());
    }
}
