use crate::config::ViewConfig;
use crate::hex::HexLayout;
use crate::math::{exp_smoothing_factor, Vec3};
use crate::palette::{health_bar_color, BAR_BACKGROUND_COLOR, UPGRADE_FILL_COLOR};
use crate::surface::{MeshId, RenderSurface, VisualHandle};
use crate::world::{BuildingState, BuildingView};

const FILL_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarTargets {
    pub health: f32,
    pub upgrade: f32,
    pub upgrading: bool,
}

pub fn bar_targets(building: &BuildingView) -> BarTargets {
    let health_ratio = if building.max_health > 0.0 {
        building.health / building.max_health
    } else {
        0.0
    };
    let health = match building.state {
        BuildingState::Constructing => building.construction_progress,
        BuildingState::Completed | BuildingState::Upgrading | BuildingState::Damaged => {
            health_ratio
        }
        BuildingState::Demolishing => 1.0 - building.demolition_progress,
        BuildingState::Planning | BuildingState::Destroyed => 0.0,
    };
    let upgrading = building.state == BuildingState::Upgrading;
    BarTargets {
        health: sanitize_fraction(health),
        upgrade: if upgrading {
            sanitize_fraction(building.upgrade_progress)
        } else {
            0.0
        },
        upgrading,
    }
}

fn sanitize_fraction(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingBars {
    pub container: VisualHandle,
    pub background: VisualHandle,
    pub health_fill: VisualHandle,
    pub upgrade_fill: VisualHandle,
    pub displayed_health: f32,
    pub displayed_upgrade: f32,
    targets: BarTargets,
}

impl BuildingBars {
    pub(crate) fn spawn<S: RenderSurface>(
        surface: &mut S,
        parent: VisualHandle,
        bar_mesh: MeshId,
        layout: &HexLayout,
        config: &ViewConfig,
        targets: BarTargets,
    ) -> Self {
        let edge = config.bar_edge_index as usize;
        let container = surface.spawn_group(
            Some(parent),
            layout.edge_midpoint_offset(edge),
            layout.edge_angle(edge),
        );
        let width = config.bar_width_fraction * layout.radius;
        let height = config.bar_height_fraction * layout.radius;
        let left = Vec3::new(-width * 0.5, 0.0, -0.001);
        let background = surface.spawn_shape(Some(container), bar_mesh, left, BAR_BACKGROUND_COLOR);
        let health_fill = surface.spawn_shape(
            Some(container),
            bar_mesh,
            left.with_z(-0.002),
            health_bar_color(targets.health),
        );
        surface.set_scale_x(health_fill, targets.health);
        let upgrade_fill = surface.spawn_shape(
            Some(container),
            bar_mesh,
            Vec3::new(left.x, -height, -0.002),
            UPGRADE_FILL_COLOR,
        );
        surface.set_scale_x(upgrade_fill, targets.upgrade);
        surface.set_visible(upgrade_fill, targets.upgrading);

        Self {
            container,
            background,
            health_fill,
            upgrade_fill,
            displayed_health: targets.health,
            displayed_upgrade: targets.upgrade,
            targets,
        }
    }

    pub fn targets(&self) -> BarTargets {
        self.targets
    }

    pub(crate) fn set_targets<S: RenderSurface>(&mut self, surface: &mut S, targets: BarTargets) {
        if targets.upgrading != self.targets.upgrading {
            surface.set_visible(self.upgrade_fill, targets.upgrading);
        }
        self.targets = targets;
    }

    pub(crate) fn advance<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        dt_seconds: f32,
        rate: f32,
    ) -> bool {
        let factor = exp_smoothing_factor(rate, dt_seconds);
        let mut changed = false;

        if let Some(health) = ease(self.displayed_health, self.targets.health, factor) {
            self.displayed_health = health;
            surface.set_scale_x(self.health_fill, health);
            surface.set_color(self.health_fill, health_bar_color(health));
            changed = true;
        }
        if let Some(upgrade) = ease(self.displayed_upgrade, self.targets.upgrade, factor) {
            self.displayed_upgrade = upgrade;
            surface.set_scale_x(self.upgrade_fill, upgrade);
            changed = true;
        }
        changed
    }

    pub(crate) fn despawn<S: RenderSurface>(self, surface: &mut S) {
        surface.despawn(self.upgrade_fill);
        surface.despawn(self.health_fill);
        surface.despawn(self.background);
        surface.despawn(self.container);
    }
}

fn ease(displayed: f32, target: f32, factor: f32) -> Option<f32> {
    if displayed == target {
        return None;
    }
    let next = displayed + (target - displayed) * factor;
    if (target - next).abs() <= FILL_EPSILON {
        Some(target)
    } else if next == displayed {
        None
    } else {
        Some(next)
    }
}
