//! Scene lights
//!
//! Light definitions consumed by the shadow and lighting passes. Lights are
//! plain data; the pipeline decides per frame which of them cast shadows and
//! assigns each caster one slice of the shadow map array.
//!
//! Directional and spot lights can cast shadows. Point lights would need a
//! cube map per light and never cast shadows here.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// Near plane used for spot light shadow projections
const SPOT_SHADOW_NEAR: f32 = 0.1;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot,
}

/// Light source
#[derive(Debug, Clone)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position (for point/spot lights)
    pub position: Vec3,
    /// Light direction (for directional/spot lights)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Light range (for point/spot lights)
    pub range: f32,
    /// Inner cone angle for spot lights (in radians)
    pub inner_cone_angle: f32,
    /// Outer cone angle for spot lights (in radians)
    pub outer_cone_angle: f32,
    /// Whether the light renders into a shadow map slice
    pub casts_shadows: bool,
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::zeros(),
            direction: direction.normalize(),
            color,
            intensity,
            range: 0.0,
            inner_cone_angle: 0.0,
            outer_cone_angle: 0.0,
            casts_shadows: false,
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            position,
            direction: Vec3::zeros(),
            color,
            intensity,
            range,
            inner_cone_angle: 0.0,
            outer_cone_angle: 0.0,
            casts_shadows: false,
        }
    }

    /// Create a spot light
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    ) -> Self {
        Self {
            light_type: LightType::Spot,
            position,
            direction: direction.normalize(),
            color,
            intensity,
            range,
            inner_cone_angle,
            outer_cone_angle,
            casts_shadows: false,
        }
    }

    /// Enable or disable shadow casting
    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.casts_shadows = enabled;
        self
    }

    /// Whether this light gets a shadow map slice
    pub fn is_shadow_caster(&self) -> bool {
        self.casts_shadows && self.light_type != LightType::Point
    }

    /// View-projection used to render and sample this light's shadow map
    ///
    /// Directional lights cover a cube of half-size `extent` centred on
    /// `focus`. Returns `None` for lights that cannot cast shadows.
    pub fn shadow_view_projection(&self, focus: Vec3, extent: f32) -> Option<Mat4> {
        match self.light_type {
            LightType::Directional => {
                let eye = focus - self.direction * extent;
                let view = Mat4::look_at(eye, focus, up_for(&self.direction));
                let projection = Mat4::orthographic(-extent, extent, -extent, extent, 0.0, 2.0 * extent);
                Some(projection * view)
            }
            LightType::Spot => {
                let view = Mat4::look_at(self.position, self.position + self.direction, up_for(&self.direction));
                let far = self.range.max(SPOT_SHADOW_NEAR * 2.0);
                let projection = Mat4::perspective(2.0 * self.outer_cone_angle, 1.0, SPOT_SHADOW_NEAR, far);
                Some(projection * view)
            }
            LightType::Point => None,
        }
    }
}

fn up_for(direction: &Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::z()
    } else {
        Vec3::y()
    }
}

/// Lighting environment containing multiple lights
#[derive(Debug, Clone)]
pub struct LightingEnvironment {
    /// List of lights in the scene
    pub lights: Vec<Light>,
    /// Ambient light color
    pub ambient_color: Vec3,
    /// Ambient light intensity
    pub ambient_intensity: f32,
}

impl LightingEnvironment {
    /// Create a new empty lighting environment
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            ambient_color: Vec3::new(1.0, 1.0, 1.0),
            ambient_intensity: 0.1,
        }
    }

    /// Add a light to the environment
    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Set ambient lighting
    pub fn with_ambient(mut self, color: Vec3, intensity: f32) -> Self {
        self.ambient_color = color;
        self.ambient_intensity = intensity;
        self
    }

    /// Lights that render into the shadow map array, in slice order
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|light| light.is_shadow_caster())
    }

    /// Number of shadow map slices this environment needs
    pub fn shadow_caster_count(&self) -> usize {
        self.shadow_casters().count()
    }

    /// Outdoor daylight with a shadow-casting sun
    pub fn outdoor_daylight() -> Self {
        Self::new()
            .with_ambient(Vec3::new(0.5, 0.7, 1.0), 0.3)
            .add_light(
                Light::directional(Vec3::new(-0.2, -1.0, -0.3), Vec3::new(1.0, 1.0, 0.9), 1.0)
                    .with_shadows(true),
            )
    }
}

impl Default for LightingEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
