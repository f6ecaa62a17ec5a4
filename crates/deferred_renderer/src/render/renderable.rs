//! Renderable components
//!
//! A [`RenderableComponent`] is the scene layer's description of one drawable
//! object. The pipeline borrows a slice of them for one frame and never keeps
//! references past the end of [`RenderingSystem::render_frame`](crate::render::RenderingSystem::render_frame).

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::MeshHandle;

/// Identifier of the scene entity owning a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Which part of the frame draws a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderLayer {
    /// Deferred-shaded through the G-buffer
    #[default]
    Opaque,
    /// Forward-shaded and blended after lighting
    Transparent,
    /// Screen-space overlay drawn last with the orthographic matrix
    Ui,
}

/// Component for entities that can be rendered
#[derive(Debug, Clone)]
pub struct RenderableComponent {
    /// Owning entity
    pub entity: EntityId,

    /// Geometry to draw
    pub mesh: MeshHandle,

    /// Object to world transform
    pub world_transform: Mat4,

    /// Render layer
    pub layer: RenderLayer,

    /// Technique override; the global technique is used when `None`
    pub technique: Option<String>,

    /// Whether this object is visible
    pub visible: bool,

    /// Whether this object renders into shadow maps
    pub casts_shadows: bool,

    /// Base color (RGBA), alpha drives transparency blending
    pub color: [f32; 4],
}

impl RenderableComponent {
    /// Create a visible, opaque, shadow-casting component
    pub fn new(entity: EntityId, mesh: MeshHandle, world_transform: Mat4) -> Self {
        Self {
            entity,
            mesh,
            world_transform,
            layer: RenderLayer::Opaque,
            technique: None,
            visible: true,
            casts_shadows: true,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    /// Create a transparent component
    ///
    /// Transparent objects do not cast shadows by default.
    pub fn new_transparent(entity: EntityId, mesh: MeshHandle, world_transform: Mat4, alpha: f32) -> Self {
        Self {
            layer: RenderLayer::Transparent,
            casts_shadows: false,
            color: [1.0, 1.0, 1.0, alpha],
            ..Self::new(entity, mesh, world_transform)
        }
    }

    /// Create a screen-space UI component, `world_transform` in pixels
    pub fn new_ui(entity: EntityId, mesh: MeshHandle, world_transform: Mat4) -> Self {
        Self {
            layer: RenderLayer::Ui,
            casts_shadows: false,
            ..Self::new(entity, mesh, world_transform)
        }
    }

    /// Set the technique override
    pub fn with_technique(mut self, name: impl Into<String>) -> Self {
        self.technique = Some(name.into());
        self
    }

    /// Set the base color
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Set visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Check if this component should be rendered
    pub fn should_render(&self) -> bool {
        self.visible
    }

    /// World-space position (translation of the world transform)
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(
            self.world_transform[(0, 3)],
            self.world_transform[(1, 3)],
            self.world_transform[(2, 3)],
        )
    }
}
