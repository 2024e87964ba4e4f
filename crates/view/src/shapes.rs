use std::f32::consts::{FRAC_PI_2, TAU};

use crate::config::ViewConfig;
use crate::math::Vec3;
use crate::world::EntityCategory;

pub const MAX_CIRCLE_SEGMENTS: u32 = u16::MAX as u32 - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Diamond,
    LargeCircle,
    SmallCircle,
    Triangle,
    BarQuad,
}

impl ShapeKind {
    pub fn for_category(category: EntityCategory) -> Self {
        match category {
            EntityCategory::Building => Self::Diamond,
            EntityCategory::Army => Self::LargeCircle,
            EntityCategory::Villager => Self::SmallCircle,
            EntityCategory::Resource => Self::Triangle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMesh {
    pub kind: ShapeKind,
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u16>,
}

impl ShapeMesh {
    pub fn diamond(half_extent: f32) -> Self {
        Self {
            kind: ShapeKind::Diamond,
            vertices: vec![
                Vec3::new(0.0, half_extent, 0.0),
                Vec3::new(half_extent, 0.0, 0.0),
                Vec3::new(0.0, -half_extent, 0.0),
                Vec3::new(-half_extent, 0.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn circle(kind: ShapeKind, radius: f32, segments: u32) -> Self {
        let segments = segments.clamp(3, MAX_CIRCLE_SEGMENTS);
        let mut vertices = Vec::with_capacity(segments as usize + 1);
        vertices.push(Vec3::ZERO);
        for step in 0..segments {
            let angle = FRAC_PI_2 + TAU * step as f32 / segments as f32;
            vertices.push(Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
        }
        let mut indices = Vec::with_capacity(segments as usize * 3);
        for step in 0..segments {
            let current = step as u16 + 1;
            let next = (step + 1) % segments;
            indices.extend_from_slice(&[0, current, next as u16 + 1]);
        }
        Self {
            kind,
            vertices,
            indices,
        }
    }

    pub fn triangle(circumradius: f32) -> Self {
        let vertices = (0..3)
            .map(|corner| {
                let angle = FRAC_PI_2 + TAU * corner as f32 / 3.0;
                Vec3::new(circumradius * angle.cos(), circumradius * angle.sin(), 0.0)
            })
            .collect();
        Self {
            kind: ShapeKind::Triangle,
            vertices,
            indices: vec![0, 1, 2],
        }
    }

    // Left edge sits on x = 0, so scaling x fills from the left.
    pub fn bar_quad(width: f32, height: f32) -> Self {
        let half = height * 0.5;
        Self {
            kind: ShapeKind::BarQuad,
            vertices: vec![
                Vec3::new(0.0, -half, 0.0),
                Vec3::new(width, -half, 0.0),
                Vec3::new(width, half, 0.0),
                Vec3::new(0.0, half, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    pub fn bottom_extent(&self) -> f32 {
        self.vertices
            .iter()
            .map(|vertex| -vertex.y)
            .fold(0.0, f32::max)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone)]
pub struct ShapeLibrary {
    diamond: ShapeMesh,
    large_circle: ShapeMesh,
    small_circle: ShapeMesh,
    triangle: ShapeMesh,
    bar_quad: ShapeMesh,
}

impl ShapeLibrary {
    pub fn new(config: &ViewConfig, hex_radius: f32) -> Self {
        Self {
            diamond: ShapeMesh::diamond(config.building_size * hex_radius),
            large_circle: ShapeMesh::circle(
                ShapeKind::LargeCircle,
                config.army_radius * hex_radius,
                config.circle_segments,
            ),
            small_circle: ShapeMesh::circle(
                ShapeKind::SmallCircle,
                config.villager_radius * hex_radius,
                config.circle_segments,
            ),
            triangle: ShapeMesh::triangle(config.resource_size * hex_radius),
            bar_quad: ShapeMesh::bar_quad(
                config.bar_width_fraction * hex_radius,
                config.bar_height_fraction * hex_radius,
            ),
        }
    }

    pub fn mesh(&self, kind: ShapeKind) -> &ShapeMesh {
        match kind {
            ShapeKind::Diamond => &self.diamond,
            ShapeKind::LargeCircle => &self.large_circle,
            ShapeKind::SmallCircle => &self.small_circle,
            ShapeKind::Triangle => &self.triangle,
            ShapeKind::BarQuad => &self.bar_quad,
        }
    }

    pub fn for_category(&self, category: EntityCategory) -> &ShapeMesh {
        self.mesh(ShapeKind::for_category(category))
    }

    pub fn all(&self) -> [&ShapeMesh; 5] {
        [
            &self.diamond,
            &self.large_circle,
            &self.small_circle,
            &self.triangle,
            &self.bar_quad,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_fan_has_one_triangle_per_segment() {
        let mesh = ShapeMesh::circle(ShapeKind::LargeCircle, 1.0, 12);
        assert_eq!(mesh.vertices.len(), 13);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh
            .indices
            .iter()
            .all(|index| (*index as usize) < mesh.vertices.len()));
    }

    #[test]
    fn circle_clamps_degenerate_segment_count() {
        let mesh = ShapeMesh::circle(ShapeKind::SmallCircle, 1.0, 1);
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn oversized_circle_is_capped_to_u16_indices() {
        let mesh = ShapeMesh::circle(ShapeKind::LargeCircle, 1.0, 70_000);
        assert_eq!(mesh.triangle_count(), MAX_CIRCLE_SEGMENTS as usize);
        assert_eq!(mesh.vertices.len(), u16::MAX as usize);
        assert_eq!(mesh.indices[mesh.indices.len() - 1], 1);
    }

    #[test]
    fn bottom_extent_matches_geometry() {
        assert!((ShapeMesh::diamond(0.5).bottom_extent() - 0.5).abs() < 1e-6);
        assert!((ShapeMesh::triangle(1.0).bottom_extent() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn armies_draw_larger_than_villagers() {
        let library = ShapeLibrary::new(&ViewConfig::default(), 1.0);
        let army = library.for_category(EntityCategory::Army).bottom_extent();
        let villager = library.for_category(EntityCategory::Villager).bottom_extent();
        assert!(army > villager);
    }

    #[test]
    fn bar_quad_grows_from_left_edge() {
        let mesh = ShapeMesh::bar_quad(2.0, 0.2);
        let min_x = mesh.vertices.iter().map(|v| v.x).fold(f32::MAX, f32::min);
        assert_eq!(min_x, 0.0);
    }
}
