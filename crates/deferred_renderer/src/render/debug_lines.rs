//! Debug line geometry
//!
//! Line segments queued for the debug pass, and helpers that expand them into
//! the vertex layout of the debug line buffer.

use crate::foundation::math::Vec3;
use crate::render::constants::DebugVertex;

/// World-space line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Segment start
    pub start: Vec3,
    /// Segment end
    pub end: Vec3,
    /// Line color (RGBA)
    pub color: [f32; 4],
}

impl DebugLine {
    /// Create a line segment
    pub fn new(start: Vec3, end: Vec3, color: [f32; 4]) -> Self {
        Self { start, end, color }
    }

    /// The twelve edges of an axis-aligned box
    pub fn box_edges(min: Vec3, max: Vec3, color: [f32; 4]) -> [Self; 12] {
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let edge = |a: (bool, bool, bool), b: (bool, bool, bool)| {
            Self::new(corner(a.0, a.1, a.2), corner(b.0, b.1, b.2), color)
        };

        [
            // bottom
            edge((false, false, false), (true, false, false)),
            edge((true, false, false), (true, false, true)),
            edge((true, false, true), (false, false, true)),
            edge((false, false, true), (false, false, false)),
            // top
            edge((false, true, false), (true, true, false)),
            edge((true, true, false), (true, true, true)),
            edge((true, true, true), (false, true, true)),
            edge((false, true, true), (false, true, false)),
            // verticals
            edge((false, false, false), (false, true, false)),
            edge((true, false, false), (true, true, false)),
            edge((true, false, true), (true, true, true)),
            edge((false, false, true), (false, true, true)),
        ]
    }
}

/// Expand segments into a line-list vertex array
pub fn to_vertices(lines: &[DebugLine]) -> Vec<DebugVertex> {
    lines
        .iter()
        .flat_map(|line| {
            [
                DebugVertex {
                    position: [line.start.x, line.start.y, line.start.z],
                    color: line.color,
                },
                DebugVertex {
                    position: [line.end.x, line.end.y, line.end.z],
                    color: line.color,
                },
            ]
        })
        .collect()
}

/// Capacity to grow a vertex buffer to so it holds `required` vertices
///
/// Doubles from `current` (or `initial` for a buffer not yet created).
pub fn grown_capacity(current: u32, initial: u32, required: u32) -> u32 {
    let mut capacity = current.max(initial).max(1);
    while capacity < required {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}
