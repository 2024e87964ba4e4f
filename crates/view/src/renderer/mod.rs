use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, info};

use crate::bars::{bar_targets, BarTargets, BuildingBars};
use crate::config::ViewConfig;
use crate::hex::HexLayout;
use crate::math::{exp_smoothing_factor, Vec3};
use crate::motion::{format_eta, MovementAnchor, PathSegment};
use crate::palette::{contrasting_text_color, TIMER_TEXT_COLOR};
use crate::placement::{compute_desired_states, DesiredStates, RenderState};
use crate::shapes::{ShapeKind, ShapeLibrary};
use crate::surface::{MeshId, RenderSurface, VisualHandle};
use crate::world::{EntityCategory, EntityId, FrameClock, WorldSnapshot};

const LABEL_LOCAL_OFFSET: Vec3 = Vec3::new(0.0, 0.0, -0.005);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
    pub recreated: usize,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub moved: usize,
    pub bars_eased: usize,
    pub timers_shown: usize,
    pub timers_hidden: usize,
    pub timers_removed: usize,
}

#[derive(Debug, Clone, Copy)]
struct CategoryMeshes {
    building: MeshId,
    army: MeshId,
    villager: MeshId,
    resource: MeshId,
    bar: MeshId,
}

impl CategoryMeshes {
    fn register<S: RenderSurface>(surface: &mut S, shapes: &ShapeLibrary) -> Self {
        Self {
            building: surface.register_mesh(shapes.mesh(ShapeKind::Diamond)),
            army: surface.register_mesh(shapes.mesh(ShapeKind::LargeCircle)),
            villager: surface.register_mesh(shapes.mesh(ShapeKind::SmallCircle)),
            resource: surface.register_mesh(shapes.mesh(ShapeKind::Triangle)),
            bar: surface.register_mesh(shapes.mesh(ShapeKind::BarQuad)),
        }
    }

    fn for_category(&self, category: EntityCategory) -> MeshId {
        match category {
            EntityCategory::Building => self.building,
            EntityCategory::Army => self.army,
            EntityCategory::Villager => self.villager,
            EntityCategory::Resource => self.resource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct EntityVisual {
    root: VisualHandle,
    label: Option<VisualHandle>,
    displayed_position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
struct TimerLabel {
    handle: VisualHandle,
    visible: bool,
    text: String,
}

pub struct EntityRenderer<S: RenderSurface> {
    surface: S,
    layout: HexLayout,
    config: ViewConfig,
    shapes: ShapeLibrary,
    meshes: CategoryMeshes,
    visuals: HashMap<EntityId, EntityVisual>,
    current_states: HashMap<EntityId, RenderState>,
    anchors: HashMap<EntityId, MovementAnchor>,
    timers: HashMap<EntityId, TimerLabel>,
    bars: HashMap<EntityId, BuildingBars>,
}

impl<S: RenderSurface> EntityRenderer<S> {
    pub fn new(mut surface: S, layout: HexLayout, config: ViewConfig) -> Self {
        let shapes = ShapeLibrary::new(&config, layout.radius);
        let meshes = CategoryMeshes::register(&mut surface, &shapes);
        Self {
            surface,
            layout,
            config,
            shapes,
            meshes,
            visuals: HashMap::new(),
            current_states: HashMap::new(),
            anchors: HashMap::new(),
            timers: HashMap::new(),
            bars: HashMap::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn reconcile(&mut self, snapshot: &WorldSnapshot, now: Instant) -> ReconcileReport {
        let mut desired = compute_desired_states(snapshot, &self.layout, &self.config);
        self.refresh_movement(snapshot, &mut desired, now);

        let mut report = ReconcileReport::default();
        let removed: Vec<EntityId> = self
            .current_states
            .keys()
            .chain(self.visuals.keys())
            .filter(|id| !desired.states.contains_key(*id))
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        for id in removed {
            self.destroy_entity(id);
            report.destroyed += 1;
        }

        for (id, state) in desired.states {
            let alive = self
                .visuals
                .get(&id)
                .map(|visual| self.surface.is_alive(visual.root));
            match alive {
                None => {
                    self.create_visual(state);
                    report.created += 1;
                }
                Some(false) => {
                    debug!(entity = id.0, "stale_visual_recreated");
                    self.release_visuals(id);
                    self.create_visual(state);
                    report.recreated += 1;
                }
                Some(true) => {
                    if self.update_visual(state) {
                        report.updated += 1;
                    }
                }
            }
        }

        self.refresh_bars(snapshot);

        debug!(
            created = report.created,
            updated = report.updated,
            destroyed = report.destroyed,
            recreated = report.recreated,
            tracked = self.visuals.len(),
            moving = self.anchors.len(),
            "reconcile"
        );
        report
    }

    fn refresh_movement(
        &mut self,
        snapshot: &WorldSnapshot,
        desired: &mut DesiredStates,
        now: Instant,
    ) {
        let mut moving = HashSet::new();
        for mover in snapshot.movers() {
            if !mover.is_moving() {
                continue;
            }
            let Some(next) = mover.next_cell() else {
                continue;
            };
            let Some(state) = desired.states.get_mut(&mover.id) else {
                continue;
            };
            let offset = desired
                .tile_offsets
                .get(&mover.id)
                .copied()
                .unwrap_or_default();
            let from = state.position;
            let to = (self.layout.to_world(next) + offset).with_z(from.z);
            let segment = PathSegment {
                from: mover.coord,
                to: next,
                path_len: mover.path.len(),
                path_index: mover.path_index,
            };
            let reported = if mover.movement_progress.is_finite() {
                mover.movement_progress.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let progress = match self.anchors.get(&mover.id) {
                Some(previous) if previous.segment == segment => reported.max(previous.progress),
                _ => reported,
            };

            state.position = from.lerp(to, progress);
            self.anchors.insert(
                mover.id,
                MovementAnchor {
                    from,
                    to,
                    segment,
                    progress,
                    speed: mover.movement_speed,
                    read_at: now,
                    cells_remaining: mover.cells_remaining(),
                },
            );
            moving.insert(mover.id);
        }

        let stopped: Vec<EntityId> = self
            .anchors
            .keys()
            .filter(|id| !moving.contains(*id))
            .copied()
            .collect();
        for id in stopped {
            self.anchors.remove(&id);
            if let Some(timer) = self.timers.remove(&id) {
                self.surface.despawn(timer.handle);
            }
        }
    }

    fn create_visual(&mut self, state: RenderState) {
        let mesh = self.meshes.for_category(state.category);
        let root = self
            .surface
            .spawn_shape(None, mesh, state.position, state.color);
        let label = state.label.map(|text| {
            self.surface.spawn_text(
                root,
                text,
                LABEL_LOCAL_OFFSET,
                contrasting_text_color(state.color),
                self.config.label_font_size * self.layout.radius,
            )
        });
        self.visuals.insert(
            state.id,
            EntityVisual {
                root,
                label,
                displayed_position: state.position,
            },
        );
        self.current_states.insert(state.id, state);
    }

    fn update_visual(&mut self, state: RenderState) -> bool {
        let anchored = self.anchors.contains_key(&state.id);
        let (Some(visual), Some(current)) = (
            self.visuals.get_mut(&state.id),
            self.current_states.get_mut(&state.id),
        ) else {
            return false;
        };
        let mut touched = false;

        if !anchored
            && (current.position != state.position || visual.displayed_position != state.position)
        {
            self.surface.set_position(visual.root, state.position);
            visual.displayed_position = state.position;
            touched = true;
        }

        if current.color != state.color {
            self.surface.set_color(visual.root, state.color);
            if let Some(label) = visual.label {
                self.surface
                    .set_color(label, contrasting_text_color(state.color));
            }
            touched = true;
        }

        if current.label != state.label {
            match (visual.label, state.label) {
                (Some(label), Some(text)) => self.surface.set_text(label, text),
                (Some(label), None) => {
                    self.surface.despawn(label);
                    visual.label = None;
                }
                (None, Some(text)) => {
                    visual.label = Some(self.surface.spawn_text(
                        visual.root,
                        text,
                        LABEL_LOCAL_OFFSET,
                        contrasting_text_color(state.color),
                        self.config.label_font_size * self.layout.radius,
                    ));
                }
                (None, None) => {}
            }
            touched = true;
        }

        if *current != state {
            *current = state;
        }
        touched
    }

    fn refresh_bars(&mut self, snapshot: &WorldSnapshot) {
        for building in &snapshot.buildings {
            let Some(visual) = self.visuals.get(&building.id) else {
                continue;
            };
            if building.max_health <= 0.0 {
                if let Some(bars) = self.bars.remove(&building.id) {
                    bars.despawn(&mut self.surface);
                }
                continue;
            }
            let targets = bar_targets(building);
            if let Some(bars) = self.bars.get_mut(&building.id) {
                bars.set_targets(&mut self.surface, targets);
                continue;
            }
            let bars = BuildingBars::spawn(
                &mut self.surface,
                visual.root,
                self.meshes.bar,
                &self.layout,
                &self.config,
                targets,
            );
            self.bars.insert(building.id, bars);
        }
    }

    pub fn advance_frame(
        &mut self,
        dt_seconds: f32,
        clock: FrameClock,
        now: Instant,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        if clock.paused || !dt_seconds.is_finite() || dt_seconds <= 0.0 {
            return report;
        }

        for bars in self.bars.values_mut() {
            if bars.advance(&mut self.surface, dt_seconds, self.config.bar_smoothing_rate) {
                report.bars_eased += 1;
            }
        }

        if self.anchors.is_empty() {
            return report;
        }

        let factor = exp_smoothing_factor(self.config.movement_smoothing_rate, dt_seconds);
        let timer_offset = Vec3::new(
            0.0,
            self.config.timer_offset_fraction * self.layout.radius,
            -0.01,
        );
        for (id, anchor) in &self.anchors {
            let Some(visual) = self.visuals.get_mut(id) else {
                continue;
            };
            if !self.surface.is_alive(visual.root) {
                continue;
            }
            let predicted = anchor.predicted_progress(now, clock.game_speed);
            let target = anchor.target_position(predicted);
            let next = visual.displayed_position.lerp(target, factor);
            if next != visual.displayed_position {
                self.surface.set_position(visual.root, next);
                visual.displayed_position = next;
                report.moved += 1;
            }

            match anchor.eta_seconds(predicted) {
                None => {
                    if let Some(timer) = self.timers.remove(id) {
                        self.surface.despawn(timer.handle);
                        report.timers_removed += 1;
                    }
                }
                Some(eta) if eta < self.config.eta_hide_threshold_seconds => {
                    if let Some(timer) = self.timers.get_mut(id) {
                        if timer.visible {
                            self.surface.set_visible(timer.handle, false);
                            timer.visible = false;
                            report.timers_hidden += 1;
                        }
                    }
                }
                Some(eta) => {
                    let text = format_eta(eta);
                    if let Some(timer) = self.timers.get_mut(id) {
                        if !timer.visible {
                            self.surface.set_visible(timer.handle, true);
                            timer.visible = true;
                            report.timers_shown += 1;
                        }
                        if timer.text != text {
                            self.surface.set_text(timer.handle, &text);
                            timer.text = text;
                        }
                    } else {
                        let handle = self.surface.spawn_text(
                            visual.root,
                            &text,
                            timer_offset,
                            TIMER_TEXT_COLOR,
                            self.config.timer_font_size * self.layout.radius,
                        );
                        self.timers.insert(
                            *id,
                            TimerLabel {
                                handle,
                                visible: true,
                                text,
                            },
                        );
                        report.timers_shown += 1;
                    }
                }
            }
        }
        report
    }

    pub fn bottom_anchor(&self, id: EntityId) -> Option<Vec3> {
        let visual = self.visuals.get(&id)?;
        if !self.surface.is_alive(visual.root) {
            return None;
        }
        let category = self.current_states.get(&id)?.category;
        let extent = self.shapes.for_category(category).bottom_extent();
        Some(visual.displayed_position - Vec3::new(0.0, extent, 0.0))
    }

    pub fn dispose(&mut self) {
        let ids: Vec<EntityId> = self.visuals.keys().copied().collect();
        let released = ids.len();
        for id in ids {
            self.release_visuals(id);
        }
        self.visuals.clear();
        self.current_states.clear();
        self.anchors.clear();
        self.timers.clear();
        self.bars.clear();
        info!(released, "entity_renderer_disposed");
    }

    fn destroy_entity(&mut self, id: EntityId) {
        self.release_visuals(id);
        self.anchors.remove(&id);
        self.current_states.remove(&id);
    }

    /// Despawns the visual tree of `id`, children first. Movement anchors and
    /// the current state survive so a stale visual can be rebuilt in place.
    fn release_visuals(&mut self, id: EntityId) {
        if let Some(timer) = self.timers.remove(&id) {
            self.surface.despawn(timer.handle);
        }
        if let Some(bars) = self.bars.remove(&id) {
            bars.despawn(&mut self.surface);
        }
        if let Some(visual) = self.visuals.remove(&id) {
            if let Some(label) = visual.label {
                self.surface.despawn(label);
            }
            self.surface.despawn(visual.root);
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn moving_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_tracked(&self, id: EntityId) -> bool {
        self.visuals.contains_key(&id)
    }

    pub fn current_state(&self, id: EntityId) -> Option<&RenderState> {
        self.current_states.get(&id)
    }

    pub fn visual_root(&self, id: EntityId) -> Option<VisualHandle> {
        self.visuals.get(&id).map(|visual| visual.root)
    }

    pub fn label_handle(&self, id: EntityId) -> Option<VisualHandle> {
        self.visuals.get(&id).and_then(|visual| visual.label)
    }

    pub fn displayed_position(&self, id: EntityId) -> Option<Vec3> {
        self.visuals.get(&id).map(|visual| visual.displayed_position)
    }

    pub fn anchor(&self, id: EntityId) -> Option<&MovementAnchor> {
        self.anchors.get(&id)
    }

    pub fn has_anchor(&self, id: EntityId) -> bool {
        self.anchors.contains_key(&id)
    }

    pub fn has_timer(&self, id: EntityId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn timer_text(&self, id: EntityId) -> Option<&str> {
        self.timers.get(&id).map(|timer| timer.text.as_str())
    }

    pub fn timer_visible(&self, id: EntityId) -> Option<bool> {
        self.timers.get(&id).map(|timer| timer.visible)
    }

    pub fn has_bars(&self, id: EntityId) -> bool {
        self.bars.contains_key(&id)
    }

    pub fn bar_fill(&self, id: EntityId) -> Option<(f32, f32)> {
        self.bars
            .get(&id)
            .map(|bars| (bars.displayed_health, bars.displayed_upgrade))
    }

    pub fn bar_targets(&self, id: EntityId) -> Option<BarTargets> {
        self.bars.get(&id).map(BuildingBars::targets)
    }
}

#[cfg(test)]
mod tests;
