//! # 3D Camera
//!
//! [`Camera`] is the mutable, user-facing camera. Each frame it produces an
//! immutable [`CameraContext`] snapshot that every pass receives by reference.
//!
//! ## Coordinate System
//! View space looks down +Z with Y up. Projections map depth to `[0, 1]`.

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Per-frame camera snapshot
///
/// Holds view, projection, the combined view-projection, an orthographic
/// matrix in pixel units for overlays, the camera position and the viewport
/// size. The view-projection is recomputed whenever view or projection change.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraContext {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    orthographic: Mat4,
    position: Vec3,
    width: u32,
    height: u32,
}

impl CameraContext {
    /// Build a snapshot for a `width` x `height` viewport
    #[allow(clippy::cast_precision_loss)]
    pub fn new(view: Mat4, projection: Mat4, position: Vec3, width: u32, height: u32) -> Self {
        Self {
            view,
            projection,
            view_projection: projection * view,
            // Pixel space with the origin in the top-left corner
            orthographic: Mat4::orthographic(0.0, width as f32, height as f32, 0.0, 0.0, 1.0),
            position,
            width,
            height,
        }
    }

    /// Replace the view matrix and camera position
    pub fn with_view(mut self, view: Mat4, position: Vec3) -> Self {
        self.view = view;
        self.position = position;
        self.view_projection = self.projection * self.view;
        self
    }

    /// Replace the projection matrix
    pub fn with_projection(mut self, projection: Mat4) -> Self {
        self.projection = projection;
        self.view_projection = self.projection * self.view;
        self
    }

    /// World-to-view transform
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// View-to-clip transform
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// `projection * view`
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Pixel-space orthographic transform for UI and overlays
    pub fn orthographic(&self) -> &Mat4 {
        &self.orthographic
    }

    /// View-projection with the camera translation removed, for the skybox
    pub fn rotation_only_view_projection(&self) -> Mat4 {
        self.projection * self.view.without_translation()
    }

    /// Camera position in world space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Viewport dimensions in pixels
    pub fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Perspective camera
///
/// Matrices are computed on demand. Call [`Camera::context`] once per frame
/// to hand the result to the pipeline.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Point the camera at `target` with the given up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update the aspect ratio after a viewport change
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// View-to-clip transform
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// Snapshot for a `width` x `height` viewport
    pub fn context(&self, width: u32, height: u32) -> CameraContext {
        CameraContext::new(self.view_matrix(), self.projection_matrix(), self.position, width, height)
    }
}

impl Default for Camera {
    /// Camera above and behind the origin, looking at it with a 45 degree FOV
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, -3.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec4};
    use approx::assert_relative_eq;

    #[test]
    fn test_view_projection_is_product() {
        let camera = Camera::perspective(Vec3::new(1.0, 2.0, -10.0), 60.0, 16.0 / 9.0, 0.1, 100.0);
        let ctx = camera.context(1920, 1080);

        let expected = camera.projection_matrix() * camera.view_matrix();
        assert_relative_eq!(*ctx.view_projection(), expected, epsilon = 1e-6);
        assert_eq!(ctx.viewport_size(), (1920, 1080));
    }

    #[test]
    fn test_with_view_recomputes_view_projection() {
        let camera = Camera::default();
        let ctx = camera.context(800, 600);
        let new_view = Mat4::look_at(Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), Vec3::y());

        let ctx = ctx.with_view(new_view, Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(*ctx.view_projection(), ctx.projection() * new_view, epsilon = 1e-6);
        assert_relative_eq!(ctx.position(), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_with_projection_recomputes_view_projection() {
        let ctx = Camera::default().context(800, 600);
        let projection = Mat4::perspective(1.0, 1.0, 1.0, 10.0);

        let ctx = ctx.with_projection(projection);
        assert_relative_eq!(*ctx.view_projection(), projection * ctx.view(), epsilon = 1e-6);
    }

    #[test]
    fn test_orthographic_covers_viewport() {
        let ctx = Camera::default().context(800, 600);
        let bottom_right = ctx.orthographic() * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert_relative_eq!(bottom_right.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(bottom_right.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_only_view_ignores_position() {
        let near = Camera::perspective(Vec3::new(0.0, 0.0, -5.0), 60.0, 1.0, 0.1, 100.0);
        let mut far = near.clone();
        far.set_position(Vec3::new(0.0, 0.0, -50.0));

        let direction = Point3::new(0.0, 0.0, 1.0);
        let a = near.context(100, 100).rotation_only_view_projection().transform_point(&direction);
        let b = far.context(100, 100).rotation_only_view_projection().transform_point(&direction);
        assert_relative_eq!(a, b, epsilon = 1e-5);
    }
}
