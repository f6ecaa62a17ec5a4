//! Post-process pass
//!
//! Full-screen pass reading the lit image and scene depth, writing the
//! post-process target.

use crate::render::api::{CommandContext, SamplerStateHandle, Viewport};
use crate::render::constants::{
    FrameConstants, FRAME_SLOT, FULLSCREEN_TRIANGLE_VERTICES, LINEAR_SAMPLER_SLOT,
    SCENE_COLOR_SLOT,
};
use crate::render::surface::{ColorSurface, DepthSurface};
use crate::render::RenderResult;

use super::{upload, POST_PROCESS_TECHNIQUE};

/// Apply screen-space effects from `source` into `target`
pub fn render_post_process_pass(
    ctx: &mut dyn CommandContext,
    source: &mut ColorSurface,
    depth: &mut DepthSurface,
    target: &mut ColorSurface,
    sampler: SamplerStateHandle,
    frame: &FrameConstants,
) -> RenderResult<u32> {
    let result = record(ctx, source, depth, target, sampler, frame);

    ctx.clear_shader_resources(SCENE_COLOR_SLOT, 2);
    ctx.set_render_targets(&[], None);
    source.mark_unbound();
    depth.mark_unbound();
    target.mark_unbound();
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    source: &mut ColorSurface,
    depth: &mut DepthSurface,
    target: &mut ColorSurface,
    sampler: SamplerStateHandle,
    frame: &FrameConstants,
) -> RenderResult<u32> {
    let output = target.bind_write()?;
    ctx.set_render_targets(&[output], None);

    let (width, height) = target.size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_blend_state(None);
    ctx.set_depth_stencil_state(None);

    let color = source.bind_read()?;
    let scene_depth = depth.bind_read()?;
    ctx.set_shader_resources(SCENE_COLOR_SLOT, &[color, scene_depth]);
    ctx.set_samplers(LINEAR_SAMPLER_SLOT, &[sampler]);

    upload(ctx, FRAME_SLOT, frame);
    ctx.set_technique(POST_PROCESS_TECHNIQUE);
    ctx.draw(FULLSCREEN_TRIANGLE_VERTICES, 0);
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineConfig;
    use crate::render::backends::recording::SurfaceContents;
    use crate::render::gbuffer::GBuffer;
    use crate::render::passes::test_support::setup;
    use crate::render::provisioner::ResourceProvisioner;
    use crate::render::surface::BindingState;
    use bytemuck::Zeroable;

    #[test]
    fn test_reads_lighting_and_depth_into_target() {
        let (mut device, mut ctx, _camera) = setup(64, 64);
        let mut gbuffer = GBuffer::new();
        gbuffer.initialize(&mut device, 64, 64).unwrap();
        let mut provisioner = ResourceProvisioner::new(&PipelineConfig::new());
        provisioner.on_resize(&mut device, 64, 64);
        let sampler = provisioner.create_linear_sampler(&mut device).unwrap();
        provisioner.create_lighting_target(&mut device).unwrap();
        provisioner.create_post_process_target(&mut device).unwrap();

        let targets = provisioner.targets_mut();
        let source = targets.lighting.unwrap();
        let target = targets.post_process.unwrap();
        let depth = gbuffer.depth_mut().unwrap();

        let draws = render_post_process_pass(&mut ctx, source, depth, target, sampler, &FrameConstants::zeroed()).unwrap();

        assert_eq!(draws, 1);
        assert_eq!(device.surface_contents(target.texture()), Some(SurfaceContents::Rendered));
        assert_eq!(source.binding_state(), BindingState::Unbound);
        assert_eq!(depth.binding_state(), BindingState::Unbound);
        assert_eq!(device.contents_at_slot(SCENE_COLOR_SLOT), None);
        assert!(device.hazards().is_empty());
    }

    #[test]
    fn test_source_bound_for_writing_is_rejected() {
        let (mut device, mut ctx, _camera) = setup(64, 64);
        let mut gbuffer = GBuffer::new();
        gbuffer.initialize(&mut device, 64, 64).unwrap();
        let mut provisioner = ResourceProvisioner::new(&PipelineConfig::new());
        provisioner.on_resize(&mut device, 64, 64);
        let sampler = provisioner.create_linear_sampler(&mut device).unwrap();
        provisioner.create_lighting_target(&mut device).unwrap();
        provisioner.create_post_process_target(&mut device).unwrap();

        let targets = provisioner.targets_mut();
        let source = targets.lighting.unwrap();
        source.bind_write().unwrap();

        let result = render_post_process_pass(
            &mut ctx,
            source,
            gbuffer.depth_mut().unwrap(),
            targets.post_process.unwrap(),
            sampler,
            &FrameConstants::zeroed(),
        );
        assert!(result.is_err());
    }
}
