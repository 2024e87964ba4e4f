mod headless;

pub use headless::{HeadlessNode, HeadlessSurface, NodeKind, SurfaceCounters};

use crate::math::{Color, Vec3};
use crate::shapes::ShapeMesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle {
    index: u32,
    generation: u32,
}

impl VisualHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Backend the reconciler draws through.
///
/// Positions passed for child nodes are local to the parent; root positions
/// are world positions. Despawning a node does not touch its children: the
/// caller releases children explicitly. Every mutator must ignore dead handles.
pub trait RenderSurface {
    fn register_mesh(&mut self, mesh: &ShapeMesh) -> MeshId;
    fn spawn_group(
        &mut self,
        parent: Option<VisualHandle>,
        local_position: Vec3,
        rotation_radians: f32,
    ) -> VisualHandle;
    fn spawn_shape(
        &mut self,
        parent: Option<VisualHandle>,
        mesh: MeshId,
        local_position: Vec3,
        color: Color,
    ) -> VisualHandle;
    fn spawn_text(
        &mut self,
        parent: VisualHandle,
        text: &str,
        local_position: Vec3,
        color: Color,
        font_size: f32,
    ) -> VisualHandle;
    fn set_position(&mut self, handle: VisualHandle, local_position: Vec3);
    fn set_color(&mut self, handle: VisualHandle, color: Color);
    fn set_text(&mut self, handle: VisualHandle, text: &str);
    fn set_visible(&mut self, handle: VisualHandle, visible: bool);
    fn set_scale_x(&mut self, handle: VisualHandle, scale: f32);
    fn is_alive(&self, handle: VisualHandle) -> bool;
    fn despawn(&mut self, handle: VisualHandle);
}
