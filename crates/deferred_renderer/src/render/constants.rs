//! GPU constant buffer layouts and binding slots
//!
//! All layouts are `#[repr(C)]` and [`bytemuck::Pod`] so they can be uploaded
//! with [`bytemuck::bytes_of`]. Every field is a multiple of 16 bytes or packs
//! into one, matching std140-style alignment.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{to_gpu_matrix, Mat4, Vec3};
use crate::render::lighting::{Light, LightType, LightingEnvironment};
use crate::render::primitives::CameraContext;

/// Constant slot for [`CameraConstants`]
pub const CAMERA_SLOT: u32 = 0;
/// Constant slot for [`ObjectConstants`]
pub const OBJECT_SLOT: u32 = 1;
/// Constant slot for [`LightConstants`]
pub const LIGHT_SLOT: u32 = 2;
/// Constant slot for [`FrameConstants`]
pub const FRAME_SLOT: u32 = 3;

/// Shader slot of the first G-buffer read-binding (position, normal, albedo follow)
pub const GBUFFER_FIRST_SLOT: u32 = 0;
/// Shader slot of the shadow map array during lighting
pub const SHADOW_MAP_SLOT: u32 = 3;
/// Shader slot of the main input of full-screen passes
pub const SCENE_COLOR_SLOT: u32 = 0;
/// Shader slot of the scene depth during post-processing
pub const SCENE_DEPTH_SLOT: u32 = 1;

/// Sampler slot for the linear clamp sampler
pub const LINEAR_SAMPLER_SLOT: u32 = 0;
/// Sampler slot for the shadow comparison sampler
pub const SHADOW_SAMPLER_SLOT: u32 = 1;

/// Maximum number of lights uploaded to the lighting pass
pub const MAX_LIGHTS: usize = 8;

/// Vertices of a full-screen triangle
pub const FULLSCREEN_TRIANGLE_VERTICES: u32 = 3;
/// Vertices of the skybox cube (12 triangles)
pub const SKYBOX_CUBE_VERTICES: u32 = 36;

/// Per-view camera data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraConstants {
    /// Combined view-projection
    pub view_projection: [[f32; 4]; 4],
    /// View matrix
    pub view: [[f32; 4]; 4],
    /// Projection matrix
    pub projection: [[f32; 4]; 4],
    /// Camera position (w unused)
    pub position: [f32; 4],
    /// Viewport width, height and their reciprocals
    pub viewport: [f32; 4],
}

impl CameraConstants {
    /// Constants for the camera snapshot
    #[allow(clippy::cast_precision_loss)]
    pub fn from_context(camera: &CameraContext) -> Self {
        let (width, height) = camera.viewport_size();
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let position = camera.position();
        Self {
            view_projection: to_gpu_matrix(camera.view_projection()),
            view: to_gpu_matrix(camera.view()),
            projection: to_gpu_matrix(camera.projection()),
            position: [position.x, position.y, position.z, 1.0],
            viewport: [w, h, 1.0 / w, 1.0 / h],
        }
    }

    /// Constants for an arbitrary view-projection (shadow and overlay views)
    pub fn from_view_projection(view_projection: &Mat4, position: Vec3, viewport: (u32, u32)) -> Self {
        let identity = to_gpu_matrix(&Mat4::identity());
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        Self {
            view_projection: to_gpu_matrix(view_projection),
            view: identity,
            projection: identity,
            position: [position.x, position.y, position.z, 1.0],
            viewport: [w, h, 1.0 / w, 1.0 / h],
        }
    }
}

/// Per-draw object data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// Object to world transform
    pub world: [[f32; 4]; 4],
    /// Object to clip transform
    pub world_view_projection: [[f32; 4]; 4],
    /// Base color (RGBA)
    pub color: [f32; 4],
}

impl ObjectConstants {
    /// Object constants for `world` seen through `view_projection`
    pub fn new(world: &Mat4, view_projection: &Mat4, color: [f32; 4]) -> Self {
        Self {
            world: to_gpu_matrix(world),
            world_view_projection: to_gpu_matrix(&(view_projection * world)),
            color,
        }
    }
}

/// One light as seen by the lighting shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// Position and range
    pub position_range: [f32; 4],
    /// Direction and light type (0 directional, 1 point, 2 spot)
    pub direction_type: [f32; 4],
    /// Color and intensity
    pub color_intensity: [f32; 4],
    /// Inner cone, outer cone, shadow slice (-1 for none), unused
    pub cone_shadow: [f32; 4],
    /// World to shadow clip transform
    pub shadow_matrix: [[f32; 4]; 4],
}

impl GpuLight {
    /// Pack a light, with its shadow slice and matrix if it has one
    #[allow(clippy::cast_precision_loss)]
    pub fn from_light(light: &Light, shadow: Option<(u32, Mat4)>) -> Self {
        let light_type = match light.light_type {
            LightType::Directional => 0.0,
            LightType::Point => 1.0,
            LightType::Spot => 2.0,
        };
        let (slice, matrix) = shadow.map_or((-1.0, Mat4::identity()), |(slice, m)| (slice as f32, m));
        Self {
            position_range: [light.position.x, light.position.y, light.position.z, light.range],
            direction_type: [light.direction.x, light.direction.y, light.direction.z, light_type],
            color_intensity: [light.color.x, light.color.y, light.color.z, light.intensity],
            cone_shadow: [light.inner_cone_angle, light.outer_cone_angle, slice, 0.0],
            shadow_matrix: to_gpu_matrix(&matrix),
        }
    }
}

/// All light data for the lighting pass
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightConstants {
    /// Ambient color and intensity
    pub ambient: [f32; 4],
    /// Light count, shadow caster count, unused, unused
    pub counts: [u32; 4],
    /// Light array, first `counts[0]` entries valid
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl LightConstants {
    /// Pack the environment
    ///
    /// `shadow_matrices` holds one matrix per shadow caster in slice order.
    /// Lights beyond [`MAX_LIGHTS`] are dropped with a warning.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_environment(environment: &LightingEnvironment, shadow_matrices: &[Mat4]) -> Self {
        let mut constants = Self::zeroed();
        constants.ambient = [
            environment.ambient_color.x,
            environment.ambient_color.y,
            environment.ambient_color.z,
            environment.ambient_intensity,
        ];

        if environment.lights.len() > MAX_LIGHTS {
            log::warn!(
                "{} lights in environment, only the first {} are uploaded",
                environment.lights.len(),
                MAX_LIGHTS
            );
        }

        let mut next_slice = 0usize;
        let mut count = 0u32;
        for (slot, light) in constants.lights.iter_mut().zip(&environment.lights) {
            let shadow = if light.is_shadow_caster() {
                let entry = shadow_matrices.get(next_slice).map(|m| (next_slice as u32, *m));
                next_slice += 1;
                entry
            } else {
                None
            };
            *slot = GpuLight::from_light(light, shadow);
            count += 1;
        }

        constants.counts = [count, shadow_matrices.len() as u32, 0, 0];
        constants
    }
}

/// Per-frame timing data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    /// Seconds since the pipeline started rendering
    pub time: f32,
    /// Seconds since the previous frame
    pub delta_time: f32,
    /// Frame counter
    pub frame_index: u32,
    /// Padding
    pub _padding: u32,
}

/// Vertex of the debug line buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    /// World position
    pub position: [f32; 3],
    /// Line color (RGBA)
    pub color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitives::Camera;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<CameraConstants>(), 224);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 144);
        assert_eq!(std::mem::size_of::<GpuLight>(), 128);
        assert_eq!(std::mem::size_of::<LightConstants>(), 32 + 128 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<DebugVertex>(), 28);
    }

    #[test]
    fn test_camera_constants_viewport() {
        let ctx = Camera::default().context(1920, 1080);
        let constants = CameraConstants::from_context(&ctx);
        assert_eq!(constants.viewport[0], 1920.0);
        assert_eq!(constants.viewport[1], 1080.0);
        assert_eq!(bytemuck::bytes_of(&constants).len(), 224);
    }

    #[test]
    fn test_light_constants_assign_shadow_slices() {
        let env = LightingEnvironment::new()
            .add_light(Light::point(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), 1.0, 5.0))
            .add_light(Light::directional(-Vec3::y(), Vec3::new(1.0, 1.0, 1.0), 1.0).with_shadows(true));

        let constants = LightConstants::from_environment(&env, &[Mat4::identity()]);
        assert_eq!(constants.counts[0], 2);
        assert_eq!(constants.counts[1], 1);
        assert_eq!(constants.lights[0].cone_shadow[2], -1.0);
        assert_eq!(constants.lights[1].cone_shadow[2], 0.0);
    }

    #[test]
    fn test_excess_lights_are_dropped() {
        let mut env = LightingEnvironment::new();
        for i in 0..MAX_LIGHTS + 3 {
            env = env.add_light(Light::point(Vec3::new(i as f32, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0, 5.0));
        }

        let constants = LightConstants::from_environment(&env, &[]);
        assert_eq!(constants.counts[0] as usize, MAX_LIGHTS);
    }
}
