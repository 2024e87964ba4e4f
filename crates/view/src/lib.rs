pub mod bars;
pub mod config;
pub mod hex;
pub mod math;
pub mod motion;
pub mod palette;
pub mod placement;
pub mod renderer;
pub mod shapes;
pub mod surface;
pub mod world;

pub use bars::{bar_targets, BarTargets};
pub use config::{load_view_config, ConfigError, ViewConfig};
pub use hex::{HexCoord, HexLayout};
pub use math::{Color, Vec3};
pub use motion::{format_eta, MovementAnchor, PathSegment};
pub use placement::{compute_desired_states, DesiredStates, RenderState};
pub use renderer::{EntityRenderer, FrameReport, ReconcileReport};
pub use shapes::{ShapeKind, ShapeLibrary, ShapeMesh, MAX_CIRCLE_SEGMENTS};
pub use surface::{
    HeadlessNode, HeadlessSurface, MeshId, NodeKind, RenderSurface, SurfaceCounters, VisualHandle,
};
pub use world::{
    BuildingKind, BuildingState, BuildingView, EntityCategory, EntityId, FrameClock, MoverView,
    PlayerId, ResourceKind, ResourcePointView, WorldSnapshot,
};
