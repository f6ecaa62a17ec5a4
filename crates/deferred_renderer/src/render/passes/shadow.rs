//! Shadow pass
//!
//! Renders opaque shadow casters into one slice of the shadow map array per
//! shadow-casting light. Slice `i` belongs to the `i`-th entry of
//! `light_matrices`.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{CommandContext, Viewport};
use crate::render::constants::{CameraConstants, ObjectConstants, CAMERA_SLOT, OBJECT_SLOT};
use crate::render::provisioner::{ShadowMapArray, ShadowStates};
use crate::render::renderable::RenderableComponent;
use crate::render::RenderResult;

use super::{upload, SHADOW_TECHNIQUE};

/// Render `casters` into one shadow map slice per light matrix
pub fn render_shadow_pass(
    ctx: &mut dyn CommandContext,
    shadow_maps: &mut ShadowMapArray,
    states: ShadowStates,
    light_matrices: &[Mat4],
    casters: &[&RenderableComponent],
) -> RenderResult<u32> {
    let result = record(ctx, shadow_maps, states, light_matrices, casters);

    ctx.set_render_targets(&[], None);
    ctx.set_rasterizer_state(None);
    shadow_maps.mark_unbound();
    result
}

fn record(
    ctx: &mut dyn CommandContext,
    shadow_maps: &mut ShadowMapArray,
    states: ShadowStates,
    light_matrices: &[Mat4],
    casters: &[&RenderableComponent],
) -> RenderResult<u32> {
    let resolution = shadow_maps.resolution();
    let mut draws = 0;

    ctx.set_viewport(Viewport::full(resolution, resolution));
    ctx.set_rasterizer_state(Some(states.rasterizer));
    // Depth only, component techniques do not apply
    ctx.set_technique(SHADOW_TECHNIQUE);

    for (slice, matrix) in (0u32..).zip(light_matrices) {
        let target = shadow_maps.bind_slice(slice)?;
        ctx.set_render_targets(&[], Some(target));
        ctx.clear_depth_stencil(target, 1.0, 0);

        let constants = CameraConstants::from_view_projection(matrix, Vec3::zeros(), (resolution, resolution));
        upload(ctx, CAMERA_SLOT, &constants);

        for caster in casters {
            let object = ObjectConstants::new(&caster.world_transform, matrix, caster.color);
            upload(ctx, OBJECT_SLOT, &object);
            ctx.draw_mesh(caster.mesh);
            draws += 1;
        }
        log::trace!("Shadow slice {}: {} casters", slice, casters.len());
    }

    Ok(draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PipelineConfig;
    use crate::render::backends::recording::{RecordedCommand, SurfaceContents};
    use crate::render::passes::test_support::{component, setup};
    use crate::render::provisioner::ResourceProvisioner;
    use crate::render::surface::BindingState;

    #[test]
    fn test_one_slice_per_light() {
        let (mut device, mut ctx, _camera) = setup(64, 64);
        let mut provisioner = ResourceProvisioner::new(&PipelineConfig::new().with_shadow_map_resolution(256));
        let states = provisioner.create_shadow_states(&mut device).unwrap();
        provisioner.create_shadow_map_array(&mut device, 2).unwrap();
        let shadow_maps = provisioner.targets_mut().shadow_maps.unwrap();

        let a = component(1, 1.0);
        let b = component(2, 2.0);
        let draws = render_shadow_pass(&mut ctx, shadow_maps, states, &[Mat4::identity(), Mat4::identity()], &[&a, &b]).unwrap();

        assert_eq!(draws, 4);
        assert_eq!(shadow_maps.binding_state(), BindingState::Unbound);
        assert_eq!(device.surface_contents(shadow_maps.texture()), Some(SurfaceContents::Rendered));
        let clears = device
            .commands()
            .iter()
            .filter(|c| matches!(c, RecordedCommand::ClearDepthStencil { .. }))
            .count();
        assert_eq!(clears, 2);
        assert!(device.hazards().is_empty());
    }
}
