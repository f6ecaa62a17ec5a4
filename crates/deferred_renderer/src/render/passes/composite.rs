//! Composite pass
//!
//! Copies the final color image into the back buffer.

use crate::render::api::{CommandContext, SamplerStateHandle, Viewport};
use crate::render::constants::{FULLSCREEN_TRIANGLE_VERTICES, LINEAR_SAMPLER_SLOT, SCENE_COLOR_SLOT};
use crate::render::surface::ColorSurface;
use crate::render::RenderResult;

use super::COMPOSITE_TECHNIQUE;

/// Copy `source` into the context's back buffer
pub fn render_composite_pass(
    ctx: &mut dyn CommandContext,
    source: &mut ColorSurface,
    sampler: SamplerStateHandle,
) -> RenderResult<u32> {
    let result = record(ctx, source, sampler);

    ctx.clear_shader_resources(SCENE_COLOR_SLOT, 1);
    ctx.set_render_targets(&[], None);
    source.mark_unbound();
    result
}

fn record(ctx: &mut dyn CommandContext, source: &mut ColorSurface, sampler: SamplerStateHandle) -> RenderResult<u32> {
    let back_buffer = ctx.back_buffer();
    ctx.set_render_targets(&[back_buffer], None);

    let (width, height) = source.size();
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_blend_state(None);
    ctx.set_depth_stencil_state(None);

    let color = source.bind_read()?;
    ctx.set_shader_resources(SCENE_COLOR_SLOT, &[color]);
    ctx.set_samplers(LINEAR_SAMPLER_SLOT, &[sampler]);
    ctx.set_technique(COMPOSITE_TECHNIQUE);
    ctx.draw(FULLSCREEN_TRIANGLE_VERTICES, 0);
    Ok(1)
}
