use std::f32::consts::{FRAC_PI_6, PI};

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

const SQRT_3: f32 = 1.732_050_8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    pub fn distance(&self, other: &HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = ((self.q + self.r) - (other.q + other.r)).abs();
        (dq + dr + ds) / 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexLayout {
    pub radius: f32,
    pub vertical_scale: f32,
    pub origin: Vec3,
}

impl Default for HexLayout {
    fn default() -> Self {
        Self {
            radius: 1.0,
            vertical_scale: 1.0,
            origin: Vec3::ZERO,
        }
    }
}

impl HexLayout {
    pub fn new(radius: f32, vertical_scale: f32) -> Self {
        Self {
            radius,
            vertical_scale,
            origin: Vec3::ZERO,
        }
    }

    pub fn to_world(&self, coord: HexCoord) -> Vec3 {
        let q = coord.q as f32;
        let r = coord.r as f32;
        let x = self.radius * SQRT_3 * (q + r * 0.5);
        let y = -self.radius * 1.5 * r * self.vertical_scale;
        self.origin + Vec3::new(x, y, 0.0)
    }

    // Corners run counter-clockwise starting at 30°.
    pub fn corner_offset(&self, index: usize) -> Vec3 {
        let angle = FRAC_PI_6 + (index % 6) as f32 * (PI / 3.0);
        Vec3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin() * self.vertical_scale,
            0.0,
        )
    }

    // Edge `index` joins corner `index` and corner `index + 1`.
    pub fn edge_midpoint_offset(&self, index: usize) -> Vec3 {
        let a = self.corner_offset(index);
        let b = self.corner_offset(index + 1);
        a.lerp(b, 0.5)
    }

    pub fn edge_angle(&self, index: usize) -> f32 {
        let a = self.corner_offset(index);
        let b = self.corner_offset(index + 1);
        (b.y - a.y).atan2(b.x - a.x)
    }
}
