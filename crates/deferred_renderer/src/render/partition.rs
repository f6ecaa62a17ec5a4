//! # Renderable Partition
//!
//! Splits the frame's renderable components into the lists each pass draws.
//!
//! ## Ordering
//!
//! - **opaque**: front-to-back (near to far) for early depth rejection
//! - **transparent**: back-to-front (far to near) for correct alpha blending,
//!   ties keep submission order
//! - **ui**: submission order
//!
//! The partition borrows the components and is rebuilt every frame.

use crate::foundation::math::{utils, Vec3};
use crate::render::renderable::{RenderLayer, RenderableComponent};

/// Per-frame split of renderable components
#[derive(Debug, Default)]
pub struct RenderablePartition<'a> {
    /// Opaque components, nearest first
    pub opaque: Vec<&'a RenderableComponent>,
    /// Transparent components, farthest first
    pub transparent: Vec<&'a RenderableComponent>,
    /// UI components in submission order
    pub ui: Vec<&'a RenderableComponent>,
}

impl<'a> RenderablePartition<'a> {
    /// Classify `components` relative to `camera_position`
    ///
    /// Invisible components are left out of every list.
    pub fn build(components: &'a [RenderableComponent], camera_position: Vec3) -> Self {
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        let mut ui = Vec::new();

        for component in components.iter().filter(|c| c.should_render()) {
            match component.layer {
                RenderLayer::Opaque => opaque.push(keyed(component, camera_position)),
                RenderLayer::Transparent => transparent.push(keyed(component, camera_position)),
                RenderLayer::Ui => ui.push(component),
            }
        }

        // Both sorts are stable
        opaque.sort_by(|a, b| a.0.total_cmp(&b.0));
        transparent.sort_by(|a, b| b.0.total_cmp(&a.0));

        log::trace!(
            "Partitioned {} components: {} opaque, {} transparent, {} ui",
            components.len(),
            opaque.len(),
            transparent.len(),
            ui.len()
        );

        Self {
            opaque: opaque.into_iter().map(|(_, c)| c).collect(),
            transparent: transparent.into_iter().map(|(_, c)| c).collect(),
            ui,
        }
    }

    /// Opaque components that render into shadow maps
    pub fn shadow_casters(&self) -> impl Iterator<Item = &'a RenderableComponent> + '_ {
        self.opaque.iter().copied().filter(|c| c.casts_shadows)
    }

    /// Total number of partitioned components
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len() + self.ui.len()
    }

    /// Whether nothing is drawn this frame
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn keyed(component: &RenderableComponent, camera_position: Vec3) -> (f32, &RenderableComponent) {
    (utils::distance_squared(&component.world_position(), &camera_position), component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::render::api::MeshHandle;
    use crate::render::renderable::EntityId;

    fn at(id: u64, position: Vec3, layer: RenderLayer) -> RenderableComponent {
        let mut component = RenderableComponent::new(EntityId(id), MeshHandle(id), Mat4::new_translation(&position));
        component.layer = layer;
        component
    }

    fn distance(component: &RenderableComponent, camera: Vec3) -> f32 {
        (component.world_position() - camera).norm()
    }

    #[test]
    fn test_ten_opaque_five_transparent() {
        let mut components = Vec::new();
        for i in 0..10 {
            components.push(at(i, Vec3::new(i as f32, 0.0, 5.0), RenderLayer::Opaque));
        }
        for i in 10..15 {
            components.push(at(i, Vec3::new(0.0, 0.0, (i - 9) as f32 * 3.0), RenderLayer::Transparent));
        }

        let camera = Vec3::zeros();
        let partition = RenderablePartition::build(&components, camera);

        assert_eq!(partition.opaque.len(), 10);
        assert_eq!(partition.transparent.len(), 5);
        for pair in partition.transparent.windows(2) {
            assert!(distance(pair[0], camera) >= distance(pair[1], camera));
        }
        assert_eq!(partition.transparent[0].entity, EntityId(14));
    }

    #[test]
    fn test_transparent_back_to_front_for_any_camera() {
        let components: Vec<_> = (0..20)
            .map(|i| {
                let f = i as f32;
                at(i, Vec3::new((f * 7.3) % 11.0 - 5.0, (f * 3.1) % 4.0, (f * 5.7) % 13.0 - 6.0), RenderLayer::Transparent)
            })
            .collect();

        let cameras = [
            Vec3::zeros(),
            Vec3::new(10.0, 2.0, -10.0),
            Vec3::new(-4.0, 8.0, 3.0),
            Vec3::new(0.5, -3.0, 20.0),
        ];

        for camera in cameras {
            let partition = RenderablePartition::build(&components, camera);
            assert_eq!(partition.transparent.len(), 20);
            for pair in partition.transparent.windows(2) {
                assert!(distance(pair[0], camera) >= distance(pair[1], camera));
            }
        }
    }

    #[test]
    fn test_ties_keep_submission_order() {
        let components = vec![
            at(1, Vec3::new(1.0, 0.0, 0.0), RenderLayer::Transparent),
            at(2, Vec3::new(-1.0, 0.0, 0.0), RenderLayer::Transparent),
            at(3, Vec3::new(0.0, 1.0, 0.0), RenderLayer::Transparent),
        ];

        let partition = RenderablePartition::build(&components, Vec3::zeros());
        let ids: Vec<_> = partition.transparent.iter().map(|c| c.entity.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_opaque_front_to_back() {
        let components = vec![
            at(1, Vec3::new(0.0, 0.0, 30.0), RenderLayer::Opaque),
            at(2, Vec3::new(0.0, 0.0, 10.0), RenderLayer::Opaque),
            at(3, Vec3::new(0.0, 0.0, 20.0), RenderLayer::Opaque),
        ];

        let partition = RenderablePartition::build(&components, Vec3::zeros());
        let ids: Vec<_> = partition.opaque.iter().map(|c| c.entity.0).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_ui_and_invisible() {
        let mut hidden = at(4, Vec3::zeros(), RenderLayer::Opaque);
        hidden.set_visible(false);
        let components = vec![
            at(1, Vec3::new(100.0, 0.0, 0.0), RenderLayer::Ui),
            at(2, Vec3::new(0.0, 0.0, 0.0), RenderLayer::Ui),
            at(3, Vec3::zeros(), RenderLayer::Opaque),
            hidden,
        ];

        let partition = RenderablePartition::build(&components, Vec3::zeros());
        let ui: Vec<_> = partition.ui.iter().map(|c| c.entity.0).collect();
        assert_eq!(ui, vec![1, 2]);
        assert_eq!(partition.opaque.len(), 1);
        assert_eq!(partition.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let partition = RenderablePartition::build(&[], Vec3::zeros());
        assert!(partition.is_empty());
        assert_eq!(partition.shadow_casters().count(), 0);
    }
}
