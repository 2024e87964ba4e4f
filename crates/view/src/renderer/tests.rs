use std::time::{Duration, Instant};

use super::*;
use crate::hex::HexCoord;
use crate::math::Color;
use crate::palette::{building_abbreviation, DARK_TEXT_COLOR, LIGHT_TEXT_COLOR};
use crate::placement::category_offset;
use crate::shapes::ShapeMesh;
use crate::surface::HeadlessSurface;
use crate::world::{BuildingKind, BuildingView, MoverView, PlayerId, ResourceKind, ResourcePointView};

const BLUE: Color = Color::rgb(0.1, 0.2, 0.8);
const YELLOW: Color = Color::rgb(1.0, 1.0, 0.2);

fn renderer() -> EntityRenderer<HeadlessSurface> {
    EntityRenderer::new(HeadlessSurface::new(), HexLayout::default(), ViewConfig::default())
}

fn colors() -> WorldSnapshot {
    let mut snapshot = WorldSnapshot::default();
    snapshot.player_colors.insert(PlayerId(1), BLUE);
    snapshot.player_colors.insert(PlayerId(2), YELLOW);
    snapshot
}

fn marching_army(id: u64, progress: f32) -> MoverView {
    MoverView::new(EntityId(id), Some(PlayerId(1)), HexCoord::new(0, 0)).with_path(
        vec![HexCoord::new(1, 0), HexCoord::new(2, 0), HexCoord::new(3, 0)],
        0,
        progress,
        1.0,
    )
}

fn mixed_world() -> WorldSnapshot {
    let mut snapshot = colors();
    snapshot.buildings.push(BuildingView::new(
        EntityId(1),
        Some(PlayerId(1)),
        HexCoord::new(0, 0),
        BuildingKind::CityCenter,
    ));
    snapshot.armies.push(marching_army(2, 0.25));
    snapshot.armies.push(MoverView::new(
        EntityId(3),
        Some(PlayerId(2)),
        HexCoord::new(-1, 1),
    ));
    snapshot.villager_groups.push(MoverView::new(
        EntityId(4),
        Some(PlayerId(1)),
        HexCoord::new(0, 0),
    ));
    snapshot.resource_points.push(ResourcePointView::new(
        EntityId(5),
        HexCoord::new(2, -1),
        ResourceKind::Trees,
        120,
    ));
    snapshot
}

fn army_position(coord: HexCoord, layout: &HexLayout) -> Vec3 {
    let offset = category_offset(EntityCategory::Army, 0, false, layout, &ViewConfig::default());
    (layout.to_world(coord) + offset).with_z(EntityCategory::Army.depth())
}

#[test]
fn shared_meshes_are_registered_once() {
    let mut renderer = renderer();
    assert_eq!(renderer.surface().mesh_count(), 5);

    renderer.reconcile(&mixed_world(), Instant::now());
    assert_eq!(renderer.tracked_count(), 5);
    assert_eq!(renderer.surface().mesh_count(), 5);
}

#[test]
fn reconciling_the_same_snapshot_twice_is_a_no_op() {
    let mut renderer = renderer();
    let now = Instant::now();
    let world = mixed_world();
    let first = renderer.reconcile(&world, now);
    assert_eq!(first.created, 5);

    renderer.surface_mut().reset_counters();
    let second = renderer.reconcile(&world, now);
    assert!(second.is_noop(), "{second:?}");
    let counters = renderer.surface().counters();
    assert_eq!(counters.spawned, 0);
    assert_eq!(counters.despawned, 0);
    assert_eq!(counters.mutations(), 0);
}

#[test]
fn recoloring_one_owner_touches_only_its_visual() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = mixed_world();
    renderer.reconcile(&world, now);
    renderer.surface_mut().reset_counters();

    world.player_colors.insert(PlayerId(2), Color::rgb(0.9, 0.1, 0.1));
    let report = renderer.reconcile(&world, now);

    assert_eq!(report.updated, 1);
    assert_eq!(report.created + report.destroyed + report.recreated, 0);
    let counters = renderer.surface().counters();
    assert_eq!(counters.recolored, 1);
    assert_eq!(counters.mutations(), 1);
}

#[test]
fn vanished_entities_release_every_node() {
    let mut renderer = renderer();
    let now = Instant::now();
    renderer.reconcile(&mixed_world(), now);
    renderer.advance_frame(1.0 / 60.0, FrameClock::default(), now);
    assert!(renderer.has_bars(EntityId(1)));
    assert!(renderer.has_timer(EntityId(2)));

    let report = renderer.reconcile(&colors(), now);

    assert_eq!(report.destroyed, 5);
    assert_eq!(renderer.tracked_count(), 0);
    assert_eq!(renderer.moving_count(), 0);
    assert!(!renderer.has_timer(EntityId(2)));
    assert!(!renderer.has_bars(EntityId(1)));
    assert_eq!(renderer.surface().live_count(), 0);
}

#[test]
fn externally_destroyed_visual_is_rebuilt() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.resource_points.push(ResourcePointView::new(
        EntityId(9),
        HexCoord::new(1, 1),
        ResourceKind::OreMine,
        40,
    ));
    renderer.reconcile(&world, now);
    let old_root = renderer.visual_root(EntityId(9)).expect("root");
    assert!(renderer.surface_mut().kill(old_root));

    let report = renderer.reconcile(&world, now);

    assert_eq!(report.recreated, 1);
    assert_eq!(report.created, 0);
    let new_root = renderer.visual_root(EntityId(9)).expect("root");
    assert_ne!(new_root, old_root);
    assert!(renderer.surface().is_alive(new_root));
    // new root and label, the orphaned label is gone
    assert_eq!(renderer.surface().live_count(), 2);
}

#[test]
fn moving_entity_starts_at_reported_blend() {
    let mut renderer = renderer();
    let mut world = colors();
    world.armies.push(marching_army(2, 0.5));
    renderer.reconcile(&world, Instant::now());

    let layout = HexLayout::default();
    let from = army_position(HexCoord::new(0, 0), &layout);
    let to = army_position(HexCoord::new(1, 0), &layout);
    let expected = from.lerp(to, 0.5);
    assert!(renderer.has_anchor(EntityId(2)));
    assert_eq!(renderer.displayed_position(EntityId(2)), Some(expected));
    assert_eq!(
        renderer.current_state(EntityId(2)).map(|state| state.position),
        Some(expected)
    );
}

#[test]
fn frames_glide_toward_predicted_position() {
    let mut renderer = renderer();
    let start = Instant::now();
    let mut world = colors();
    world.armies.push(marching_army(2, 0.5));
    renderer.reconcile(&world, start);
    let before = renderer.displayed_position(EntityId(2)).expect("position");

    let anchor = *renderer.anchor(EntityId(2)).expect("anchor");
    let later = start + Duration::from_millis(100);
    let target = anchor.target_position(anchor.predicted_progress(later, 1.0));
    let report = renderer.advance_frame(0.1, FrameClock::default(), later);

    assert_eq!(report.moved, 1);
    let after = renderer.displayed_position(EntityId(2)).expect("position");
    assert!(after.x > before.x);
    assert!(after.x < target.x);
    let root = renderer.visual_root(EntityId(2)).expect("root");
    assert_eq!(renderer.surface().node(root).map(|node| node.local_position), Some(after));
}

#[test]
fn paused_frames_touch_nothing() {
    let mut renderer = renderer();
    let start = Instant::now();
    renderer.reconcile(&mixed_world(), start);
    renderer.surface_mut().reset_counters();

    let paused = FrameClock {
        paused: true,
        game_speed: 1.0,
    };
    let report = renderer.advance_frame(0.1, paused, start + Duration::from_secs(1));

    assert_eq!(report, FrameReport::default());
    assert_eq!(renderer.surface().counters().mutations(), 0);
    assert_eq!(renderer.surface().counters().spawned, 0);
}

#[test]
fn anchor_progress_never_regresses_within_a_segment() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.armies.push(marching_army(2, 0.6));
    renderer.reconcile(&world, now);

    world.armies[0].movement_progress = 0.4;
    renderer.reconcile(&world, now);
    assert_eq!(renderer.anchor(EntityId(2)).map(|a| a.progress), Some(0.6));

    world.armies[0].coord = HexCoord::new(1, 0);
    world.armies[0].path_index = 1;
    world.armies[0].movement_progress = 0.1;
    renderer.reconcile(&world, now);
    let anchor = renderer.anchor(EntityId(2)).expect("anchor");
    assert_eq!(anchor.progress, 0.1);
    assert_eq!((anchor.segment.from, anchor.segment.to), (HexCoord::new(1, 0), HexCoord::new(2, 0)));
}

#[test]
fn replacement_path_through_the_same_hop_resets_the_anchor() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.armies.push(marching_army(2, 0.7));
    renderer.reconcile(&world, now);

    world.armies[0] = world.armies[0].clone().with_path(
        vec![HexCoord::new(1, 0), HexCoord::new(1, 1)],
        0,
        0.2,
        1.0,
    );
    renderer.reconcile(&world, now);

    let anchor = renderer.anchor(EntityId(2)).expect("anchor");
    assert_eq!(anchor.progress, 0.2);
    assert_eq!(anchor.segment.path_len, 2);
    assert_eq!(anchor.cells_remaining, 2);
}

#[test]
fn stopping_snaps_to_the_final_cell_and_drops_the_timer() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.armies.push(marching_army(2, 0.5));
    renderer.reconcile(&world, now);
    renderer.advance_frame(1.0 / 60.0, FrameClock::default(), now);
    assert!(renderer.has_timer(EntityId(2)));

    world.armies[0] = MoverView::new(EntityId(2), Some(PlayerId(1)), HexCoord::new(1, 0));
    renderer.reconcile(&world, now);

    assert!(!renderer.has_anchor(EntityId(2)));
    assert!(!renderer.has_timer(EntityId(2)));
    assert_eq!(
        renderer.displayed_position(EntityId(2)),
        Some(army_position(HexCoord::new(1, 0), &HexLayout::default()))
    );
}

#[test]
fn eta_label_counts_down() {
    let mut renderer = renderer();
    let start = Instant::now();
    let mut world = colors();
    world.armies.push(marching_army(2, 0.0));
    renderer.reconcile(&world, start);

    let report = renderer.advance_frame(1.0 / 60.0, FrameClock::default(), start);
    assert_eq!(report.timers_shown, 1);
    assert_eq!(renderer.timer_text(EntityId(2)), Some("3s"));
    assert_eq!(renderer.timer_visible(EntityId(2)), Some(true));

    renderer.advance_frame(1.0 / 60.0, FrameClock::default(), start + Duration::from_millis(1500));
    assert_eq!(renderer.timer_text(EntityId(2)), Some("2s"));
}

#[test]
fn eta_label_hides_near_arrival() {
    let mut renderer = renderer();
    let start = Instant::now();
    let mut world = colors();
    world.armies.push(
        MoverView::new(EntityId(2), Some(PlayerId(1)), HexCoord::new(0, 0)).with_path(
            vec![HexCoord::new(1, 0)],
            0,
            0.0,
            1.0,
        ),
    );
    renderer.reconcile(&world, start);
    renderer.advance_frame(1.0 / 60.0, FrameClock::default(), start);
    assert_eq!(renderer.timer_text(EntityId(2)), Some("1s"));

    let report =
        renderer.advance_frame(1.0 / 60.0, FrameClock::default(), start + Duration::from_millis(700));
    assert_eq!(report.timers_hidden, 1);
    assert_eq!(renderer.timer_visible(EntityId(2)), Some(false));
    assert!(renderer.has_timer(EntityId(2)));
}

#[test]
fn zero_speed_mover_gets_no_anchor_or_timer() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    let mut army = marching_army(2, 0.3);
    army.movement_speed = 0.0;
    world.armies.push(army);
    renderer.reconcile(&world, now);
    renderer.advance_frame(1.0 / 60.0, FrameClock::default(), now);

    assert!(!renderer.has_anchor(EntityId(2)));
    assert!(!renderer.has_timer(EntityId(2)));
    assert_eq!(
        renderer.displayed_position(EntityId(2)),
        Some(army_position(HexCoord::new(0, 0), &HexLayout::default()))
    );
}

#[test]
fn label_color_contrasts_with_fill() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.buildings.push(BuildingView::new(
        EntityId(1),
        Some(PlayerId(2)),
        HexCoord::new(0, 0),
        BuildingKind::Market,
    ));
    renderer.reconcile(&world, now);
    let label = renderer.label_handle(EntityId(1)).expect("label");
    assert_eq!(renderer.surface().node(label).map(|n| n.color), Some(DARK_TEXT_COLOR));

    world.buildings[0].owner = Some(PlayerId(1));
    renderer.reconcile(&world, now);
    assert_eq!(renderer.surface().node(label).map(|n| n.color), Some(LIGHT_TEXT_COLOR));
}

#[test]
fn label_text_follows_building_kind() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.buildings.push(BuildingView::new(
        EntityId(1),
        None,
        HexCoord::new(0, 0),
        BuildingKind::Farm,
    ));
    renderer.reconcile(&world, now);

    world.buildings[0].kind = BuildingKind::Barracks;
    let report = renderer.reconcile(&world, now);

    assert_eq!(report.updated, 1);
    let label = renderer.label_handle(EntityId(1)).expect("label");
    assert_eq!(
        renderer.surface().text(label),
        Some(building_abbreviation(BuildingKind::Barracks))
    );
}

#[test]
fn bottom_anchor_sits_under_the_shape() {
    let mut renderer = renderer();
    let mut world = colors();
    world.buildings.push(BuildingView::new(
        EntityId(1),
        Some(PlayerId(1)),
        HexCoord::new(1, 1),
        BuildingKind::Castle,
    ));
    renderer.reconcile(&world, Instant::now());

    let config = ViewConfig::default();
    let extent = ShapeMesh::diamond(config.building_size).bottom_extent();
    let displayed = renderer.displayed_position(EntityId(1)).expect("position");
    assert_eq!(
        renderer.bottom_anchor(EntityId(1)),
        Some(displayed - Vec3::new(0.0, extent, 0.0))
    );
    assert_eq!(renderer.bottom_anchor(EntityId(42)), None);
}

#[test]
fn bars_exist_only_while_building_has_health() {
    let mut renderer = renderer();
    let now = Instant::now();
    let mut world = colors();
    world.buildings.push(
        BuildingView::new(EntityId(1), None, HexCoord::new(0, 0), BuildingKind::Neighborhood)
            .with_health(0.0, 0.0),
    );
    renderer.reconcile(&world, now);
    assert!(!renderer.has_bars(EntityId(1)));

    world.buildings[0] = world.buildings[0].clone().with_health(50.0, 100.0);
    renderer.reconcile(&world, now);
    assert!(renderer.has_bars(EntityId(1)));
    assert_eq!(renderer.bar_fill(EntityId(1)), Some((0.5, 0.0)));

    world.buildings[0] = world.buildings[0].clone().with_health(100.0, 100.0);
    renderer.reconcile(&world, now);
    let report = renderer.advance_frame(1.0 / 60.0, FrameClock::default(), now);
    assert_eq!(report.bars_eased, 1);
    let (health, _) = renderer.bar_fill(EntityId(1)).expect("bars");
    assert!(health > 0.5 && health < 1.0);

    world.buildings[0] = world.buildings[0].clone().with_health(0.0, 0.0);
    renderer.reconcile(&world, now);
    assert!(!renderer.has_bars(EntityId(1)));
}

#[test]
fn dispose_releases_all_nodes_but_keeps_meshes() {
    let mut renderer = renderer();
    let now = Instant::now();
    renderer.reconcile(&mixed_world(), now);
    renderer.advance_frame(1.0 / 60.0, FrameClock::default(), now);
    assert!(renderer.surface().live_count() > 0);

    renderer.dispose();

    assert_eq!(renderer.surface().live_count(), 0);
    assert_eq!(renderer.tracked_count(), 0);
    assert_eq!(renderer.moving_count(), 0);
    assert_eq!(renderer.surface().mesh_count(), 5);
}
