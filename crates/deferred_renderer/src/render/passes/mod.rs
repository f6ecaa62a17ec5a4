//! # Render Passes
//!
//! One stage function per pass. Each function receives the surfaces, states
//! and lists it works on as explicit parameters, records its commands, and
//! unbinds everything it bound before returning, on success and on error.
//! The return value is the number of draw calls recorded.
//!
//! Pass tracking and failure policy live in the
//! [`RenderingSystem`](crate::render::RenderingSystem); stages know nothing
//! about each other.

pub mod composite;
pub mod debug;
pub mod geometry;
pub mod lighting;
pub mod post_process;
pub mod shadow;
pub mod skybox;
pub mod transparency;
pub mod ui;

pub use composite::render_composite_pass;
pub use debug::render_debug_pass;
pub use geometry::render_geometry_pass;
pub use lighting::{render_lighting_pass, LightingSamplers};
pub use post_process::render_post_process_pass;
pub use shadow::render_shadow_pass;
pub use skybox::render_skybox_pass;
pub use transparency::render_transparency_pass;
pub use ui::render_ui_pass;

use bytemuck::Pod;

use crate::foundation::math::Mat4;
use crate::render::api::CommandContext;
use crate::render::constants::{ObjectConstants, OBJECT_SLOT};
use crate::render::renderable::RenderableComponent;
use crate::render::technique::{self, Technique};

/// Technique of the shadow depth pass
pub const SHADOW_TECHNIQUE: &str = "ShadowDepth";
/// Technique of the full-screen lighting pass
pub const LIGHTING_TECHNIQUE: &str = "DeferredLighting";
/// Technique of the skybox pass
pub const SKYBOX_TECHNIQUE: &str = "Skybox";
/// Technique of the post-process pass
pub const POST_PROCESS_TECHNIQUE: &str = "PostProcess";
/// Technique of the debug line pass
pub const DEBUG_TECHNIQUE: &str = "DebugLines";
/// Technique of the composite pass
pub const COMPOSITE_TECHNIQUE: &str = "Composite";

/// Upload a constant block to `slot`
pub(crate) fn upload<T: Pod>(ctx: &mut dyn CommandContext, slot: u32, value: &T) {
    ctx.update_constants(slot, bytemuck::bytes_of(value));
}

/// Draw scene components seen through `view_projection`
///
/// Switches technique only when it changes between consecutive components.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn draw_components(
    ctx: &mut dyn CommandContext,
    components: &[&RenderableComponent],
    view_projection: &Mat4,
    global: &Technique,
) -> u32 {
    let mut current: Option<&str> = None;
    for component in components {
        let name = technique::resolve(component.technique.as_deref(), global);
        if current != Some(name) {
            ctx.set_technique(name);
            current = Some(name);
        }
        let constants = ObjectConstants::new(&component.world_transform, view_projection, component.color);
        upload(ctx, OBJECT_SLOT, &constants);
        ctx.draw_mesh(component.mesh);
    }
    components.len() as u32
}


#[cfg(test)]
mod tests {
    use super::test_support::{component, setup};
    use super::*;
    use crate::render::backends::recording::RecordedCommand;

    #[test]
    fn test_technique_switches_only_on_change() {
        let (device, mut ctx, camera) = setup(64, 64);
        let a = component(1, 1.0);
        let b = component(2, 2.0);
        let c = component(3, 3.0).with_technique("Toon");
        let global = Technique::default();

        let draws = draw_components(&mut ctx, &[&a, &b, &c], camera.view_projection(), &global);
        assert_eq!(draws, 3);

        let techniques: Vec<_> = device
            .commands()
            .into_iter()
            .filter_map(|cmd| match cmd {
                RecordedCommand::SetTechnique(name) => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(techniques, vec!["Deferred".to_string(), "Toon".to_string()]);
    }
}
