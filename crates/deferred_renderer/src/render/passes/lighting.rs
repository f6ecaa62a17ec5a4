//! Lighting pass
//!
//! Full-screen pass that samples the G-buffer (and the shadow map array when
//! shadows were rendered this frame) and writes lit color into the lighting
//! target.

use crate::render::api::{CommandContext, SamplerStateHandle, Viewport};
use crate::render::constants::{
    CameraConstants, LightConstants, CAMERA_SLOT, FULLSCREEN_TRIANGLE_VERTICES, LIGHT_SLOT,
    LINEAR_SAMPLER_SLOT, SHADOW_MAP_SLOT, SHADOW_SAMPLER_SLOT,
};
use crate::render::gbuffer::GBuffer;
use crate::render::primitives::CameraContext;
use crate::render::provisioner::ShadowMapArray;
use crate::render::surface::ColorSurface;
use crate::render::RenderResult;

use super::{upload, LIGHTING_TECHNIQUE};

/// Samplers used by the lighting pass
#[derive(Debug, Clone, Copy)]
pub struct LightingSamplers {
    /// G-buffer sampler
    pub linear: SamplerStateHandle,
    /// Shadow comparison sampler, present when shadow maps are bound
    pub shadow: Option<SamplerStateHandle>,
}

/// Resolve lighting from the G-buffer into `target`
pub fn render_lighting_pass(
    ctx: &mut dyn CommandContext,
    gbuffer: &mut GBuffer,
    target: &mut ColorSurface,
    mut shadow_maps: Option<&mut ShadowMapArray>,
    samplers: LightingSamplers,
    camera: &CameraContext,
    lights: &LightConstants,
) -> RenderResult<u32> {
    let result = record(ctx, gbuffer, target, shadow_maps.as_deref_mut(), samplers, camera, lights);

    gbuffer.unbind_resources(ctx);
    if let Some(shadow_maps) = shadow_maps {
        ctx.clear_shader_resources(SHADOW_MAP_SLOT, 1);
        shadow_maps.mark_unbound();
    }
    ctx.set_render_targets(&[], None);
    target.mark_unbound();
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    gbuffer: &mut GBuffer,
    target: &mut ColorSurface,
    shadow_maps: Option<&mut ShadowMapArray>,
    samplers: LightingSamplers,
    camera: &CameraContext,
    lights: &LightConstants,
) -> RenderResult<u32> {
    let output = target.bind_write()?;
    ctx.set_render_targets(&[output], None);
    ctx.clear_render_target(output, [0.0, 0.0, 0.0, 1.0]);

    let (width, height) = camera.viewport_size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_blend_state(None);
    ctx.set_depth_stencil_state(None);

    gbuffer.set_as_resources(ctx)?;
    ctx.set_samplers(LINEAR_SAMPLER_SLOT, &[samplers.linear]);

    if let (Some(shadow_maps), Some(sampler)) = (shadow_maps, samplers.shadow) {
        let view = shadow_maps.bind_read()?;
        ctx.set_shader_resources(SHADOW_MAP_SLOT, &[view]);
        ctx.set_samplers(SHADOW_SAMPLER_SLOT, &[sampler]);
    }

    upload(ctx, CAMERA_SLOT, &CameraConstants::from_context(camera));
    upload(ctx, LIGHT_SLOT, lights);
    ctx.set_technique(LIGHTING_TECHNIQUE);
    ctx.draw(FULLSCREEN_TRIANGLE_VERTICES, 0);
    Ok(1)
}
