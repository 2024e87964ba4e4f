use std::time::Instant;

use crate::hex::HexCoord;
use crate::math::{smoothstep, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    pub from: HexCoord,
    pub to: HexCoord,
    pub path_len: usize,
    pub path_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementAnchor {
    pub from: Vec3,
    pub to: Vec3,
    pub segment: PathSegment,
    pub progress: f32,
    pub speed: f32,
    pub read_at: Instant,
    pub cells_remaining: usize,
}

impl MovementAnchor {
    pub fn predicted_progress(&self, now: Instant, game_speed: f32) -> f32 {
        let elapsed = now.saturating_duration_since(self.read_at).as_secs_f32();
        predict_progress(self.progress, self.speed, elapsed, game_speed)
    }

    pub fn target_position(&self, predicted_progress: f32) -> Vec3 {
        self.from.lerp(self.to, smoothstep(predicted_progress))
    }

    pub fn eta_seconds(&self, predicted_progress: f32) -> Option<f32> {
        eta_seconds(self.cells_remaining, predicted_progress, self.speed)
    }
}

pub fn predict_progress(
    last_progress: f32,
    speed: f32,
    elapsed_seconds: f32,
    game_speed: f32,
) -> f32 {
    let last = last_progress.clamp(0.0, 1.0);
    let rate = speed.max(0.0) * game_speed.max(0.0);
    let advanced = last + rate * elapsed_seconds.max(0.0);
    if advanced.is_finite() {
        advanced.clamp(last, 1.0)
    } else {
        last
    }
}

pub fn eta_seconds(cells_remaining: usize, progress: f32, speed: f32) -> Option<f32> {
    if !speed.is_finite() || speed <= 0.0 || cells_remaining == 0 {
        return None;
    }
    let later_cells = cells_remaining.saturating_sub(1) as f32;
    let current_hop = 1.0 - progress.clamp(0.0, 1.0);
    Some((later_cells + current_hop) / speed)
}

pub fn format_eta(seconds: f32) -> String {
    let total = if seconds.is_finite() {
        seconds.max(0.0).ceil() as u64
    } else {
        0
    };
    if total < 60 {
        format!("{total}s")
    } else {
        format!("{}m {}s", total / 60, total % 60)
    }
}
