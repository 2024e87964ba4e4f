use crate::math::Color;
use crate::world::{BuildingKind, ResourceKind};

pub const UNOWNED_COLOR: Color = Color::rgb(0.62, 0.62, 0.62);
pub const LIGHT_TEXT_COLOR: Color = Color::WHITE;
pub const DARK_TEXT_COLOR: Color = Color::rgb(0.08, 0.08, 0.1);
pub const LABEL_LUMINANCE_THRESHOLD: f32 = 0.5;
pub const TIMER_TEXT_COLOR: Color = Color::rgb(1.0, 0.95, 0.7);
pub const BAR_BACKGROUND_COLOR: Color = Color::rgba(0.1, 0.1, 0.1, 0.85);
pub const HEALTH_LOW_COLOR: Color = Color::rgb(0.85, 0.2, 0.15);
pub const HEALTH_FULL_COLOR: Color = Color::rgb(0.25, 0.8, 0.3);
pub const UPGRADE_FILL_COLOR: Color = Color::rgb(0.35, 0.6, 1.0);

const TREES_COLOR: Color = Color::rgb(0.13, 0.45, 0.16);
const FORAGE_COLOR: Color = Color::rgb(0.55, 0.75, 0.25);
const ORE_COLOR: Color = Color::rgb(0.45, 0.45, 0.55);
const STONE_COLOR: Color = Color::rgb(0.6, 0.58, 0.52);
const FARMLAND_COLOR: Color = Color::rgb(0.85, 0.75, 0.35);
const DEER_COLOR: Color = Color::rgb(0.6, 0.4, 0.2);
const BOAR_COLOR: Color = Color::rgb(0.4, 0.25, 0.15);
const CARCASS_COLOR: Color = Color::rgb(0.5, 0.15, 0.12);

pub fn resource_color(kind: ResourceKind) -> Color {
    match kind {
        ResourceKind::Trees => TREES_COLOR,
        ResourceKind::Forage => FORAGE_COLOR,
        ResourceKind::OreMine => ORE_COLOR,
        ResourceKind::StoneQuarry => STONE_COLOR,
        ResourceKind::Farmland => FARMLAND_COLOR,
        ResourceKind::Deer => DEER_COLOR,
        ResourceKind::WildBoar => BOAR_COLOR,
        ResourceKind::DeerCarcass | ResourceKind::WildBoarCarcass => CARCASS_COLOR,
    }
}

pub fn building_abbreviation(kind: BuildingKind) -> &'static str {
    match kind {
        BuildingKind::CityCenter => "CC",
        BuildingKind::Farm => "F",
        BuildingKind::Neighborhood => "N",
        BuildingKind::Warehouse => "W",
        BuildingKind::LumberCamp => "LC",
        BuildingKind::MiningCamp => "MC",
        BuildingKind::Market => "M",
        BuildingKind::Barracks => "B",
        BuildingKind::ArcheryRange => "AR",
        BuildingKind::Stable => "S",
        BuildingKind::SiegeWorkshop => "SW",
        BuildingKind::Blacksmith => "BS",
        BuildingKind::Tower => "T",
        BuildingKind::Wall => "Wa",
        BuildingKind::Gate => "G",
        BuildingKind::Castle => "C",
        BuildingKind::WoodenFort => "WF",
        BuildingKind::Library => "L",
        BuildingKind::University => "U",
        BuildingKind::Temple => "Te",
    }
}

pub fn resource_abbreviation(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Trees => "T",
        ResourceKind::Forage => "Fg",
        ResourceKind::OreMine => "O",
        ResourceKind::StoneQuarry => "St",
        ResourceKind::Farmland => "Fm",
        ResourceKind::Deer => "D",
        ResourceKind::WildBoar => "WB",
        ResourceKind::DeerCarcass | ResourceKind::WildBoarCarcass => "X",
    }
}

pub fn contrasting_text_color(background: Color) -> Color {
    if background.luminance() > LABEL_LUMINANCE_THRESHOLD {
        DARK_TEXT_COLOR
    } else {
        LIGHT_TEXT_COLOR
    }
}

pub fn health_bar_color(fraction: f32) -> Color {
    HEALTH_LOW_COLOR.lerp(HEALTH_FULL_COLOR, fraction)
}
