use std::collections::HashMap;

use tracing::{debug, info};
use view::{
    BuildingKind, BuildingState, BuildingView, Color, EntityId, HexCoord, MoverView, PlayerId,
    ResourceKind, ResourcePointView, WorldSnapshot,
};

pub(crate) const BLUE_PLAYER: PlayerId = PlayerId(1);
pub(crate) const RED_PLAYER: PlayerId = PlayerId(2);

const CONSTRUCTION_SECONDS: f32 = 4.0;
const UPGRADE_SECONDS: f32 = 5.0;
const DEMOLITION_SECONDS: f32 = 3.0;
const REPAIR_PER_SECOND: f32 = 12.0;
const FIRST_SPAWNED_ID: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
enum DemoEvent {
    StartUpgrade(EntityId),
    StartDemolition(EntityId),
    BreakGround(EntityId),
    Damage { id: EntityId, amount: f32 },
    SpawnArmy(PatrolPlan),
    Disband(EntityId),
    HuntDeer(EntityId),
    Recolor(PlayerId, Color),
}

#[derive(Debug, Clone, PartialEq)]
struct PatrolPlan {
    owner: PlayerId,
    home: HexCoord,
    waypoints: Vec<HexCoord>,
    speed: f32,
    rest_seconds: f32,
}

#[derive(Debug, Clone)]
struct Patrol {
    view: MoverView,
    waypoints: Vec<HexCoord>,
    next_waypoint: usize,
    speed: f32,
    rest_seconds: f32,
    resting: f32,
}

impl Patrol {
    fn new(id: EntityId, plan: PatrolPlan) -> Self {
        Self {
            view: MoverView::new(id, Some(plan.owner), plan.home),
            waypoints: plan.waypoints,
            next_waypoint: 0,
            speed: plan.speed,
            rest_seconds: plan.rest_seconds,
            resting: 0.0,
        }
    }

    fn step(&mut self, dt_seconds: f32) {
        if self.view.next_cell().is_none() {
            self.resting -= dt_seconds;
            if self.resting > 0.0 {
                return;
            }
            self.depart();
            if self.view.next_cell().is_none() {
                return;
            }
        }

        self.view.movement_progress += self.speed * dt_seconds;
        while self.view.movement_progress >= 1.0 {
            let Some(next) = self.view.next_cell() else {
                break;
            };
            self.view.coord = next;
            self.view.path_index += 1;
            self.view.movement_progress -= 1.0;
        }
        if self.view.next_cell().is_none() {
            self.arrive();
        }
    }

    fn depart(&mut self) {
        let Some(target) = self.waypoints.get(self.next_waypoint).copied() else {
            return;
        };
        let path = hex_path(self.view.coord, target);
        self.view = self.view.clone().with_path(path, 0, 0.0, self.speed);
    }

    fn arrive(&mut self) {
        self.view.path.clear();
        self.view.path_index = 0;
        self.view.movement_progress = 0.0;
        self.view.movement_speed = 0.0;
        self.resting = self.rest_seconds;
        if !self.waypoints.is_empty() {
            self.next_waypoint = (self.next_waypoint + 1) % self.waypoints.len();
        }
    }
}

#[derive(Debug, Clone)]
struct DemoResource {
    view: ResourcePointView,
    harvest_per_second: f32,
    carry: f32,
}

impl DemoResource {
    fn new(id: EntityId, coord: HexCoord, kind: ResourceKind, amount: u32, harvest_per_second: f32) -> Self {
        Self {
            view: ResourcePointView::new(id, coord, kind, amount),
            harvest_per_second,
            carry: 0.0,
        }
    }

    fn step(&mut self, dt_seconds: f32) {
        self.carry += self.harvest_per_second * dt_seconds;
        let whole = self.carry.floor();
        if whole >= 1.0 {
            self.carry -= whole;
            self.view.remaining_amount = self.view.remaining_amount.saturating_sub(whole as u32);
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DemoWorld {
    elapsed: f32,
    ticks: u64,
    next_id: u64,
    player_colors: HashMap<PlayerId, Color>,
    buildings: Vec<BuildingView>,
    armies: Vec<Patrol>,
    villagers: Vec<Patrol>,
    resources: Vec<DemoResource>,
    timeline: Vec<(f32, DemoEvent)>,
    next_event: usize,
}

impl DemoWorld {
    pub(crate) fn new() -> Self {
        let mut player_colors = HashMap::new();
        player_colors.insert(BLUE_PLAYER, Color::rgb(0.2, 0.45, 0.9));
        player_colors.insert(RED_PLAYER, Color::rgb(0.85, 0.25, 0.2));

        let buildings = vec![
            BuildingView::new(EntityId(1), Some(BLUE_PLAYER), HexCoord::new(0, 0), BuildingKind::CityCenter),
            BuildingView::new(EntityId(2), Some(BLUE_PLAYER), HexCoord::new(1, -1), BuildingKind::Farm)
                .with_state(BuildingState::Constructing),
            BuildingView::new(EntityId(3), Some(RED_PLAYER), HexCoord::new(4, 0), BuildingKind::Barracks),
            BuildingView::new(EntityId(4), Some(RED_PLAYER), HexCoord::new(5, -2), BuildingKind::Market),
            BuildingView::new(EntityId(5), None, HexCoord::new(2, 2), BuildingKind::Temple),
            BuildingView::new(EntityId(6), Some(RED_PLAYER), HexCoord::new(3, 2), BuildingKind::Tower)
                .with_state(BuildingState::Planning),
        ];

        let armies = vec![
            Patrol::new(
                EntityId(10),
                PatrolPlan {
                    owner: BLUE_PLAYER,
                    home: HexCoord::new(0, 1),
                    waypoints: vec![HexCoord::new(3, 1), HexCoord::new(0, 1)],
                    speed: 1.2,
                    rest_seconds: 1.0,
                },
            ),
            Patrol::new(
                EntityId(11),
                PatrolPlan {
                    owner: RED_PLAYER,
                    home: HexCoord::new(4, 1),
                    waypoints: vec![HexCoord::new(1, 2), HexCoord::new(4, 1)],
                    speed: 0.9,
                    rest_seconds: 2.0,
                },
            ),
        ];

        let villagers = vec![
            Patrol::new(
                EntityId(20),
                PatrolPlan {
                    owner: BLUE_PLAYER,
                    home: HexCoord::new(0, 0),
                    waypoints: vec![HexCoord::new(2, -1), HexCoord::new(0, 0)],
                    speed: 0.8,
                    rest_seconds: 1.5,
                },
            ),
            Patrol::new(
                EntityId(21),
                PatrolPlan {
                    owner: RED_PLAYER,
                    home: HexCoord::new(4, 0),
                    waypoints: vec![HexCoord::new(5, -1), HexCoord::new(4, 0)],
                    speed: 0.7,
                    rest_seconds: 1.0,
                },
            ),
        ];

        let resources = vec![
            DemoResource::new(EntityId(30), HexCoord::new(2, -1), ResourceKind::Trees, 30, 3.0),
            DemoResource::new(EntityId(31), HexCoord::new(5, -1), ResourceKind::OreMine, 40, 2.0),
            DemoResource::new(EntityId(32), HexCoord::new(-1, 2), ResourceKind::Deer, 10, 0.0),
            DemoResource::new(EntityId(33), HexCoord::new(1, -1), ResourceKind::StoneQuarry, 80, 0.0),
        ];

        let timeline = vec![
            (3.0, DemoEvent::StartUpgrade(EntityId(1))),
            (
                4.0,
                DemoEvent::SpawnArmy(PatrolPlan {
                    owner: RED_PLAYER,
                    home: HexCoord::new(6, -1),
                    waypoints: vec![HexCoord::new(3, -1), HexCoord::new(6, -1)],
                    speed: 1.0,
                    rest_seconds: 0.5,
                }),
            ),
            (6.0, DemoEvent::BreakGround(EntityId(6))),
            (
                6.5,
                DemoEvent::Damage {
                    id: EntityId(3),
                    amount: 55.0,
                },
            ),
            (8.0, DemoEvent::HuntDeer(EntityId(32))),
            (9.0, DemoEvent::StartDemolition(EntityId(4))),
            (10.0, DemoEvent::Recolor(RED_PLAYER, Color::rgb(0.95, 0.6, 0.15))),
            (12.0, DemoEvent::Disband(EntityId(21))),
        ];

        Self {
            elapsed: 0.0,
            ticks: 0,
            next_id: FIRST_SPAWNED_ID,
            player_colors,
            buildings,
            armies,
            villagers,
            resources,
            timeline,
            next_event: 0,
        }
    }

    pub(crate) fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn step(&mut self, dt_seconds: f32) {
        self.elapsed += dt_seconds;
        self.ticks += 1;

        self.buildings
            .retain_mut(|building| advance_building(building, dt_seconds));
        for patrol in self.armies.iter_mut().chain(self.villagers.iter_mut()) {
            patrol.step(dt_seconds);
        }
        for resource in &mut self.resources {
            resource.step(dt_seconds);
        }
        self.resources.retain(|resource| !resource.view.is_depleted());

        while let Some((at, event)) = self.timeline.get(self.next_event).cloned() {
            if at > self.elapsed {
                break;
            }
            self.next_event += 1;
            self.apply(event);
        }
    }

    fn apply(&mut self, event: DemoEvent) {
        debug!(elapsed = self.elapsed, event = ?event, "demo_event");
        match event {
            DemoEvent::StartUpgrade(id) => {
                if let Some(building) = self.building_mut(id) {
                    building.state = BuildingState::Upgrading;
                    building.upgrade_progress = 0.0;
                }
            }
            DemoEvent::StartDemolition(id) => {
                if let Some(building) = self.building_mut(id) {
                    building.state = BuildingState::Demolishing;
                    building.demolition_progress = 0.0;
                }
            }
            DemoEvent::BreakGround(id) => {
                if let Some(building) = self.building_mut(id) {
                    building.state = BuildingState::Constructing;
                    building.construction_progress = 0.0;
                }
            }
            DemoEvent::Damage { id, amount } => {
                if let Some(building) = self.building_mut(id) {
                    building.health = (building.health - amount).max(1.0);
                    building.state = BuildingState::Damaged;
                }
            }
            DemoEvent::SpawnArmy(plan) => {
                let id = EntityId(self.next_id);
                self.next_id += 1;
                info!(entity = id.0, owner = plan.owner.0, "demo_army_spawned");
                self.armies.push(Patrol::new(id, plan));
            }
            DemoEvent::Disband(id) => {
                self.armies.retain(|patrol| patrol.view.id != id);
                self.villagers.retain(|patrol| patrol.view.id != id);
            }
            DemoEvent::HuntDeer(id) => {
                if let Some(resource) = self.resources.iter_mut().find(|r| r.view.id == id) {
                    resource.view.kind = ResourceKind::DeerCarcass;
                }
            }
            DemoEvent::Recolor(player, color) => {
                self.player_colors.insert(player, color);
            }
        }
    }

    fn building_mut(&mut self, id: EntityId) -> Option<&mut BuildingView> {
        self.buildings.iter_mut().find(|building| building.id == id)
    }

    pub(crate) fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            buildings: self.buildings.clone(),
            armies: self.armies.iter().map(|patrol| patrol.view.clone()).collect(),
            villager_groups: self.villagers.iter().map(|patrol| patrol.view.clone()).collect(),
            resource_points: self.resources.iter().map(|r| r.view.clone()).collect(),
            player_colors: self.player_colors.clone(),
        }
    }

    pub(crate) fn focus_mover(&self) -> Option<&MoverView> {
        self.armies
            .iter()
            .map(|patrol| &patrol.view)
            .find(|view| view.is_moving())
    }
}

fn advance_building(building: &mut BuildingView, dt_seconds: f32) -> bool {
    match building.state {
        BuildingState::Constructing => {
            building.construction_progress += dt_seconds / CONSTRUCTION_SECONDS;
            if building.construction_progress >= 1.0 {
                building.construction_progress = 1.0;
                building.state = BuildingState::Completed;
            }
        }
        BuildingState::Upgrading => {
            building.upgrade_progress += dt_seconds / UPGRADE_SECONDS;
            if building.upgrade_progress >= 1.0 {
                building.upgrade_progress = 0.0;
                building.state = BuildingState::Completed;
            }
        }
        BuildingState::Damaged => {
            building.health += REPAIR_PER_SECOND * dt_seconds;
            if building.health >= building.max_health {
                building.health = building.max_health;
                building.state = BuildingState::Completed;
            }
        }
        BuildingState::Demolishing => {
            building.demolition_progress += dt_seconds / DEMOLITION_SECONDS;
            if building.demolition_progress >= 1.0 {
                return false;
            }
        }
        BuildingState::Destroyed => return false,
        BuildingState::Planning | BuildingState::Completed => {}
    }
    true
}

fn hex_path(from: HexCoord, to: HexCoord) -> Vec<HexCoord> {
    let mut path = Vec::new();
    let mut current = from;
    while current != to {
        let Some(next) = current
            .neighbors()
            .into_iter()
            .min_by_key(|neighbor| neighbor.distance(&to))
        else {
            break;
        };
        path.push(next);
        current = next;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn run_for(world: &mut DemoWorld, seconds: f32) {
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            world.step(DT);
        }
    }

    fn building(world: &DemoWorld, id: u64) -> Option<BuildingView> {
        world.snapshot().building(EntityId(id)).cloned()
    }

    #[test]
    fn hex_path_walks_adjacent_cells_to_target() {
        let from = HexCoord::new(0, 1);
        let to = HexCoord::new(3, -1);
        let path = hex_path(from, to);

        assert_eq!(path.len() as i32, from.distance(&to));
        assert_eq!(path.last(), Some(&to));
        let mut previous = from;
        for cell in path {
            assert_eq!(previous.distance(&cell), 1);
            previous = cell;
        }
    }

    #[test]
    fn construction_completes_and_planned_tower_breaks_ground() {
        let mut world = DemoWorld::new();
        assert_eq!(
            building(&world, 6).map(|b| b.state),
            Some(BuildingState::Planning)
        );

        run_for(&mut world, 4.5);
        assert_eq!(
            building(&world, 2).map(|b| b.state),
            Some(BuildingState::Completed)
        );

        run_for(&mut world, 2.0);
        assert_eq!(
            building(&world, 6).map(|b| b.state),
            Some(BuildingState::Constructing)
        );
    }

    #[test]
    fn upgrade_runs_then_returns_to_completed() {
        let mut world = DemoWorld::new();
        run_for(&mut world, 4.0);
        let city = building(&world, 1).expect("city center");
        assert_eq!(city.state, BuildingState::Upgrading);
        assert!(city.upgrade_progress > 0.0);

        run_for(&mut world, 5.0);
        assert_eq!(
            building(&world, 1).map(|b| b.state),
            Some(BuildingState::Completed)
        );
    }

    #[test]
    fn demolished_market_leaves_the_snapshot() {
        let mut world = DemoWorld::new();
        run_for(&mut world, 10.0);
        assert_eq!(
            building(&world, 4).map(|b| b.state),
            Some(BuildingState::Demolishing)
        );
        run_for(&mut world, 3.0);
        assert!(building(&world, 4).is_none());
    }

    #[test]
    fn damaged_barracks_repairs() {
        let mut world = DemoWorld::new();
        run_for(&mut world, 7.0);
        let barracks = building(&world, 3).expect("barracks");
        assert_eq!(barracks.state, BuildingState::Damaged);
        assert!(barracks.health < barracks.max_health);

        run_for(&mut world, 6.0);
        assert_eq!(
            building(&world, 3).map(|b| b.state),
            Some(BuildingState::Completed)
        );
    }

    #[test]
    fn patrols_walk_their_paths() {
        let mut world = DemoWorld::new();
        world.step(DT);
        let army = world.snapshot().armies[0].clone();
        assert!(army.is_moving());
        assert_eq!(army.path.last(), Some(&HexCoord::new(3, 1)));
        assert!(army.movement_progress > 0.0);

        run_for(&mut world, 3.0);
        let army = world.snapshot().armies[0].clone();
        assert_eq!(army.coord, HexCoord::new(3, 1));
        assert!(!army.is_moving());
    }

    #[test]
    fn late_spawn_disband_and_depletion_change_membership() {
        let mut world = DemoWorld::new();
        run_for(&mut world, 4.5);
        let snapshot = world.snapshot();
        assert_eq!(snapshot.armies.len(), 3);
        assert!(snapshot
            .armies
            .iter()
            .any(|army| army.id == EntityId(FIRST_SPAWNED_ID)));

        run_for(&mut world, 8.0);
        let snapshot = world.snapshot();
        assert!(snapshot.villager_groups.iter().all(|v| v.id != EntityId(21)));
        assert!(snapshot.resource_points.iter().all(|r| r.id != EntityId(30)));
        let deer = snapshot
            .resource_points
            .iter()
            .find(|r| r.id == EntityId(32))
            .expect("deer carcass stays in the world");
        assert!(deer.kind.is_carcass());
    }

    #[test]
    fn recolor_event_changes_player_color() {
        let mut world = DemoWorld::new();
        let before = world.snapshot().owner_color(Some(RED_PLAYER));
        run_for(&mut world, 10.5);
        assert_ne!(world.snapshot().owner_color(Some(RED_PLAYER)), before);
    }

    #[test]
    fn same_steps_give_same_world() {
        let mut a = DemoWorld::new();
        let mut b = DemoWorld::new();
        run_for(&mut a, 7.3);
        run_for(&mut b, 7.3);
        let (a, b) = (a.snapshot(), b.snapshot());
        assert_eq!(a.buildings, b.buildings);
        assert_eq!(a.armies, b.armies);
        assert_eq!(a.villager_groups, b.villager_groups);
        assert_eq!(a.resource_points, b.resource_points);
    }
}
