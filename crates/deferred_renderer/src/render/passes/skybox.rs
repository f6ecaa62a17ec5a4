//! Skybox pass
//!
//! Draws a cube around the camera into the lighting target, using the view
//! rotation only. The depth state tests less-or-equal against scene depth
//! without writing, so the sky only fills pixels no geometry covered.

use crate::render::api::{CommandContext, SamplerStateHandle, ShaderResourceView, Viewport};
use crate::render::constants::{CameraConstants, CAMERA_SLOT, LINEAR_SAMPLER_SLOT, SCENE_COLOR_SLOT, SKYBOX_CUBE_VERTICES};
use crate::render::primitives::CameraContext;
use crate::render::provisioner::SkyboxStates;
use crate::render::surface::{ColorSurface, DepthSurface};
use crate::render::RenderResult;

use super::{upload, SKYBOX_TECHNIQUE};

/// Fill the background of `target` from `skybox`
pub fn render_skybox_pass(
    ctx: &mut dyn CommandContext,
    target: &mut ColorSurface,
    depth: &mut DepthSurface,
    states: SkyboxStates,
    sampler: SamplerStateHandle,
    skybox: ShaderResourceView,
    camera: &CameraContext,
) -> RenderResult<u32> {
    let result = record(ctx, target, depth, states, sampler, skybox, camera);

    ctx.clear_shader_resources(SCENE_COLOR_SLOT, 1);
    ctx.set_depth_stencil_state(None);
    ctx.set_rasterizer_state(None);
    ctx.set_render_targets(&[], None);
    target.mark_unbound();
    depth.mark_unbound();
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    target: &mut ColorSurface,
    depth: &mut DepthSurface,
    states: SkyboxStates,
    sampler: SamplerStateHandle,
    skybox: ShaderResourceView,
    camera: &CameraContext,
) -> RenderResult<u32> {
    let color = target.bind_write()?;
    let depth_view = depth.bind_write()?;
    ctx.set_render_targets(&[color], Some(depth_view));

    let (width, height) = camera.viewport_size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_depth_stencil_state(Some(states.depth));
    ctx.set_rasterizer_state(Some(states.rasterizer));
    ctx.set_shader_resources(SCENE_COLOR_SLOT, &[skybox]);
    ctx.set_samplers(LINEAR_SAMPLER_SLOT, &[sampler]);

    let sky_camera = CameraConstants::from_view_projection(
        &camera.rotation_only_view_projection(),
        camera.position(),
        camera.viewport_size(),
    );
    upload(ctx, CAMERA_SLOT, &sky_camera);
    ctx.set_technique(SKYBOX_TECHNIQUE);
    ctx.draw(SKYBOX_CUBE_VERTICES, 0);
    Ok(1)
}
