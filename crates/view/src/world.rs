use std::collections::HashMap;

use crate::hex::HexCoord;
use crate::math::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    Building,
    Army,
    Villager,
    Resource,
}

impl EntityCategory {
    pub fn depth(self) -> f32 {
        match self {
            Self::Building => 0.0,
            Self::Resource => -0.01,
            Self::Villager => -0.02,
            Self::Army => -0.03,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildingKind {
    CityCenter,
    Farm,
    Neighborhood,
    Warehouse,
    LumberCamp,
    MiningCamp,
    Market,
    Barracks,
    ArcheryRange,
    Stable,
    SiegeWorkshop,
    Blacksmith,
    Tower,
    Wall,
    Gate,
    Castle,
    WoodenFort,
    Library,
    University,
    Temple,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildingState {
    Planning,
    Constructing,
    #[default]
    Completed,
    Upgrading,
    Damaged,
    Demolishing,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingView {
    pub id: EntityId,
    pub owner: Option<PlayerId>,
    pub coord: HexCoord,
    pub kind: BuildingKind,
    pub state: BuildingState,
    pub construction_progress: f32,
    pub health: f32,
    pub max_health: f32,
    pub upgrade_progress: f32,
    pub demolition_progress: f32,
}

impl BuildingView {
    pub fn new(id: EntityId, owner: Option<PlayerId>, coord: HexCoord, kind: BuildingKind) -> Self {
        Self {
            id,
            owner,
            coord,
            kind,
            state: BuildingState::Completed,
            construction_progress: 1.0,
            health: 100.0,
            max_health: 100.0,
            upgrade_progress: 0.0,
            demolition_progress: 0.0,
        }
    }

    pub fn with_state(mut self, state: BuildingState) -> Self {
        self.state = state;
        self
    }

    pub fn with_health(mut self, health: f32, max_health: f32) -> Self {
        self.health = health;
        self.max_health = max_health;
        self
    }

    pub fn is_placed(&self) -> bool {
        self.state != BuildingState::Planning
    }
}

/// Anything that walks a hex path: armies and villager groups.
///
/// `path[path_index]` is the next cell; `movement_progress` is the fraction of
/// the current hop already covered and `movement_speed` is in cells per second.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverView {
    pub id: EntityId,
    pub owner: Option<PlayerId>,
    pub coord: HexCoord,
    pub path: Vec<HexCoord>,
    pub path_index: usize,
    pub movement_progress: f32,
    pub movement_speed: f32,
}

impl MoverView {
    pub fn new(id: EntityId, owner: Option<PlayerId>, coord: HexCoord) -> Self {
        Self {
            id,
            owner,
            coord,
            path: Vec::new(),
            path_index: 0,
            movement_progress: 0.0,
            movement_speed: 0.0,
        }
    }

    pub fn with_path(
        mut self,
        path: Vec<HexCoord>,
        path_index: usize,
        movement_progress: f32,
        movement_speed: f32,
    ) -> Self {
        self.path = path;
        self.path_index = path_index;
        self.movement_progress = movement_progress;
        self.movement_speed = movement_speed;
        self
    }

    pub fn next_cell(&self) -> Option<HexCoord> {
        self.path.get(self.path_index).copied()
    }

    pub fn cells_remaining(&self) -> usize {
        self.path.len().saturating_sub(self.path_index)
    }

    pub fn is_moving(&self) -> bool {
        self.movement_speed.is_finite() && self.movement_speed > 0.0 && self.next_cell().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Trees,
    Forage,
    OreMine,
    StoneQuarry,
    Farmland,
    Deer,
    WildBoar,
    DeerCarcass,
    WildBoarCarcass,
}

impl ResourceKind {
    pub fn is_carcass(self) -> bool {
        matches!(self, Self::DeerCarcass | Self::WildBoarCarcass)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePointView {
    pub id: EntityId,
    pub coord: HexCoord,
    pub kind: ResourceKind,
    pub remaining_amount: u32,
}

impl ResourcePointView {
    pub fn new(id: EntityId, coord: HexCoord, kind: ResourceKind, remaining_amount: u32) -> Self {
        Self {
            id,
            coord,
            kind,
            remaining_amount,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining_amount == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorldSnapshot {
    pub buildings: Vec<BuildingView>,
    pub armies: Vec<MoverView>,
    pub villager_groups: Vec<MoverView>,
    pub resource_points: Vec<ResourcePointView>,
    pub player_colors: HashMap<PlayerId, Color>,
}

impl WorldSnapshot {
    pub fn owner_color(&self, owner: Option<PlayerId>) -> Option<Color> {
        owner.and_then(|player| self.player_colors.get(&player).copied())
    }

    pub fn building(&self, id: EntityId) -> Option<&BuildingView> {
        self.buildings.iter().find(|building| building.id == id)
    }

    pub fn movers(&self) -> impl Iterator<Item = &MoverView> {
        self.armies.iter().chain(self.villager_groups.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    pub paused: bool,
    pub game_speed: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            paused: false,
            game_speed: 1.0,
        }
    }
}
