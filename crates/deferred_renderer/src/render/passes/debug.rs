//! Debug pass
//!
//! Draws queued line segments over the final color image, depth-tested
//! against scene depth. Vertices are streamed into the provisioner's debug
//! line buffer, which the caller sizes to fit.

use crate::render::api::{CommandContext, DeviceError, Viewport};
use crate::render::constants::{CameraConstants, DebugVertex, CAMERA_SLOT};
use crate::render::primitives::CameraContext;
use crate::render::provisioner::{DebugLineBuffer, DEBUG_LINE_BUFFER_LABEL};
use crate::render::surface::{ColorSurface, DepthSurface};
use crate::render::{RenderError, RenderResult};

use super::{upload, DEBUG_TECHNIQUE};

/// Draw `vertices` as a line list into `target`
pub fn render_debug_pass(
    ctx: &mut dyn CommandContext,
    target: &mut ColorSurface,
    depth: &mut DepthSurface,
    buffer: DebugLineBuffer,
    vertices: &[DebugVertex],
    camera: &CameraContext,
) -> RenderResult<u32> {
    if vertices.is_empty() {
        return Ok(0);
    }

    let result = record(ctx, target, depth, buffer, vertices, camera);

    ctx.set_render_targets(&[], None);
    target.mark_unbound();
    depth.mark_unbound();
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    target: &mut ColorSurface,
    depth: &mut DepthSurface,
    buffer: DebugLineBuffer,
    vertices: &[DebugVertex],
    camera: &CameraContext,
) -> RenderResult<u32> {
    let vertex_count = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
    if vertex_count > buffer.capacity {
        return Err(RenderError::ResourceCreationFailed(DeviceError::InvalidDescriptor {
            label: DEBUG_LINE_BUFFER_LABEL,
            reason: format!("{} vertices requested, buffer holds {}", vertex_count, buffer.capacity),
        }));
    }

    let color = target.bind_write()?;
    let depth_view = depth.bind_write()?;
    ctx.set_render_targets(&[color], Some(depth_view));

    let (width, height) = camera.viewport_size();
    ctx.set_viewport(Viewport::full(width, height));
    upload(ctx, CAMERA_SLOT, &CameraConstants::from_context(camera));
    ctx.update_buffer(buffer.buffer, bytemuck::cast_slice(vertices));
    ctx.set_technique(DEBUG_TECHNIQUE);
    ctx.draw_lines(buffer.buffer, vertex_count);
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineConfig;
    use crate::foundation::math::Vec3;
    use crate::render::backends::recording::RecordedCommand;
    use crate::render::debug_lines::{to_vertices, DebugLine};
    use crate::render::gbuffer::GBuffer;
    use crate::render::passes::test_support::setup;
    use crate::render::provisioner::ResourceProvisioner;

    #[test]
    fn test_box_lines_are_uploaded_and_drawn() {
        let (mut device, mut ctx, camera) = setup(64, 64);
        let mut gbuffer = GBuffer::new();
        gbuffer.initialize(&mut device, 64, 64).unwrap();
        let mut provisioner = ResourceProvisioner::new(&PipelineConfig::new());
        provisioner.on_resize(&mut device, 64, 64);

        let vertices = to_vertices(&DebugLine::box_edges(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), [0.0, 1.0, 0.0, 1.0]));
        let buffer = provisioner.create_debug_line_buffer(&mut device, 24).unwrap();
        let target = provisioner.create_lighting_target(&mut device).unwrap();

        let draws = render_debug_pass(&mut ctx, target, gbuffer.depth_mut().unwrap(), buffer, &vertices, &camera).unwrap();
        assert_eq!(draws, 1);

        let commands = device.commands();
        assert!(commands.contains(&RecordedCommand::UpdateBuffer { buffer: buffer.buffer, size: 24 * 28 }));
        assert!(commands.contains(&RecordedCommand::DrawLines { buffer: buffer.buffer, vertex_count: 24 }));
        assert!(device.hazards().is_empty());
    }

    #[test]
    fn test_no_lines_records_nothing() {
        let (mut device, mut ctx, camera) = setup(64, 64);
        let mut gbuffer = GBuffer::new();
        gbuffer.initialize(&mut device, 64, 64).unwrap();
        let mut provisioner = ResourceProvisioner::new(&PipelineConfig::new());
        provisioner.on_resize(&mut device, 64, 64);
        let buffer = provisioner.create_debug_line_buffer(&mut device, 1).unwrap();
        let target = provisioner.create_lighting_target(&mut device).unwrap();

        let draws = render_debug_pass(&mut ctx, target, gbuffer.depth_mut().unwrap(), buffer, &[], &camera).unwrap();
        assert_eq!(draws, 0);
        assert!(device.commands().is_empty());
    }
}
