use std::collections::HashMap;

use tracing::debug;

use crate::config::ViewConfig;
use crate::hex::{HexCoord, HexLayout};
use crate::math::{Color, Vec3};
use crate::palette::{building_abbreviation, resource_abbreviation, resource_color, UNOWNED_COLOR};
use crate::world::{BuildingView, EntityCategory, EntityId, MoverView, ResourcePointView, WorldSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub id: EntityId,
    pub category: EntityCategory,
    pub color: Color,
    pub label: Option<&'static str>,
    pub position: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct DesiredStates {
    pub states: HashMap<EntityId, RenderState>,
    pub tile_offsets: HashMap<EntityId, Vec3>,
}

impl DesiredStates {
    fn insert(&mut self, state: RenderState, offset: Vec3) {
        self.tile_offsets.insert(state.id, offset);
        self.states.insert(state.id, state);
    }
}

#[derive(Default)]
struct TileBucket<'a> {
    buildings: Vec<&'a BuildingView>,
    armies: Vec<&'a MoverView>,
    villagers: Vec<&'a MoverView>,
    resources: Vec<&'a ResourcePointView>,
}

pub fn compute_desired_states(
    snapshot: &WorldSnapshot,
    layout: &HexLayout,
    config: &ViewConfig,
) -> DesiredStates {
    let mut tiles: HashMap<HexCoord, TileBucket<'_>> = HashMap::new();
    for building in snapshot.buildings.iter().filter(|b| b.is_placed()) {
        tiles.entry(building.coord).or_default().buildings.push(building);
    }
    for army in &snapshot.armies {
        tiles.entry(army.coord).or_default().armies.push(army);
    }
    for villagers in &snapshot.villager_groups {
        tiles.entry(villagers.coord).or_default().villagers.push(villagers);
    }
    for resource in snapshot
        .resource_points
        .iter()
        .filter(|r| !r.is_depleted() && !r.kind.is_carcass())
    {
        tiles.entry(resource.coord).or_default().resources.push(resource);
    }

    let mut desired = DesiredStates::default();
    for (coord, bucket) in &tiles {
        let center = layout.to_world(*coord);
        let has_building = !bucket.buildings.is_empty();

        if let Some((building, extra)) = bucket.buildings.split_first() {
            if !extra.is_empty() {
                debug!(q = coord.q, r = coord.r, skipped = extra.len(), "tile_has_multiple_buildings");
            }
            let category = EntityCategory::Building;
            desired.insert(
                RenderState {
                    id: building.id,
                    category,
                    color: snapshot.owner_color(building.owner).unwrap_or(UNOWNED_COLOR),
                    label: Some(building_abbreviation(building.kind)),
                    position: center.with_z(category.depth()),
                },
                Vec3::ZERO,
            );
        }

        for resource in &bucket.resources {
            let category = EntityCategory::Resource;
            let offset = category_offset(category, 0, has_building, layout, config);
            desired.insert(
                RenderState {
                    id: resource.id,
                    category,
                    color: resource_color(resource.kind),
                    label: Some(resource_abbreviation(resource.kind)),
                    position: (center + offset).with_z(category.depth()),
                },
                offset,
            );
        }

        for (category, movers) in [
            (EntityCategory::Army, &bucket.armies),
            (EntityCategory::Villager, &bucket.villagers),
        ] {
            for (index, mover) in movers.iter().enumerate() {
                let offset = category_offset(category, index, has_building, layout, config);
                desired.insert(
                    RenderState {
                        id: mover.id,
                        category,
                        color: snapshot.owner_color(mover.owner).unwrap_or(UNOWNED_COLOR),
                        label: None,
                        position: (center + offset).with_z(category.depth()),
                    },
                    offset,
                );
            }
        }
    }
    desired
}

pub fn category_offset(
    category: EntityCategory,
    index: usize,
    has_building: bool,
    layout: &HexLayout,
    config: &ViewConfig,
) -> Vec3 {
    let side = if index % 2 == 0 { -1.0 } else { 1.0 };
    match category {
        EntityCategory::Building => Vec3::ZERO,
        EntityCategory::Resource => {
            if has_building {
                let distance = config.resource_offset_fraction * layout.radius;
                Vec3::new(0.0, -distance * layout.vertical_scale, 0.0)
            } else {
                Vec3::ZERO
            }
        }
        EntityCategory::Army => {
            let distance = config.army_offset_fraction * layout.radius;
            Vec3::new(side * distance, distance * layout.vertical_scale, 0.0)
        }
        EntityCategory::Villager => {
            let distance = config.villager_offset_fraction * layout.radius;
            Vec3::new(side * distance, -distance * layout.vertical_scale, 0.0)
        }
    }
}
