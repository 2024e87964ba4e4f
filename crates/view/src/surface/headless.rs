use crate::math::{Color, Vec3};
use crate::shapes::{ShapeKind, ShapeMesh};

use super::{MeshId, RenderSurface, VisualHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Shape { mesh: MeshId },
    Text { text: String, font_size: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessNode {
    pub kind: NodeKind,
    pub parent: Option<VisualHandle>,
    pub local_position: Vec3,
    pub rotation_radians: f32,
    pub color: Color,
    pub visible: bool,
    pub scale_x: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceCounters {
    pub spawned: u64,
    pub despawned: u64,
    pub moved: u64,
    pub recolored: u64,
    pub text_updates: u64,
    pub visibility_changes: u64,
    pub fill_updates: u64,
}

impl SurfaceCounters {
    pub fn mutations(&self) -> u64 {
        self.moved + self.recolored + self.text_updates + self.visibility_changes + self.fill_updates
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<HeadlessNode>,
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    meshes: Vec<ShapeKind>,
    counters: SurfaceCounters,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> SurfaceCounters {
        self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = SurfaceCounters::default();
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh_kind(&self, mesh: MeshId) -> Option<ShapeKind> {
        self.meshes.get(mesh.0 as usize).copied()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn node(&self, handle: VisualHandle) -> Option<&HeadlessNode> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn text(&self, handle: VisualHandle) -> Option<&str> {
        match &self.node(handle)?.kind {
            NodeKind::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn world_position(&self, handle: VisualHandle) -> Option<Vec3> {
        let node = self.node(handle)?;
        let mut position = node.local_position;
        let mut parent = node.parent;
        while let Some(parent_handle) = parent {
            let parent_node = self.node(parent_handle)?;
            position = position + parent_node.local_position;
            parent = parent_node.parent;
        }
        Some(position)
    }

    pub fn kill(&mut self, handle: VisualHandle) -> bool {
        self.release(handle)
    }

    fn node_mut(&mut self, handle: VisualHandle) -> Option<&mut HeadlessNode> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn insert(&mut self, node: HeadlessNode) -> VisualHandle {
        self.counters.spawned += 1;
        if let Some(index) = self.free_slots.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.node = Some(node);
                return VisualHandle::new(index, slot.generation);
            }
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        VisualHandle::new(index, 0)
    }

    fn release(&mut self, handle: VisualHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index() as usize) else {
            return false;
        };
        if slot.generation != handle.generation() || slot.node.is_none() {
            return false;
        }
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index());
        true
    }
}

impl RenderSurface for HeadlessSurface {
    fn register_mesh(&mut self, mesh: &ShapeMesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh.kind);
        id
    }

    fn spawn_group(
        &mut self,
        parent: Option<VisualHandle>,
        local_position: Vec3,
        rotation_radians: f32,
    ) -> VisualHandle {
        self.insert(HeadlessNode {
            kind: NodeKind::Group,
            parent,
            local_position,
            rotation_radians,
            color: Color::WHITE,
            visible: true,
            scale_x: 1.0,
        })
    }

    fn spawn_shape(
        &mut self,
        parent: Option<VisualHandle>,
        mesh: MeshId,
        local_position: Vec3,
        color: Color,
    ) -> VisualHandle {
        self.insert(HeadlessNode {
            kind: NodeKind::Shape { mesh },
            parent,
            local_position,
            rotation_radians: 0.0,
            color,
            visible: true,
            scale_x: 1.0,
        })
    }

    fn spawn_text(
        &mut self,
        parent: VisualHandle,
        text: &str,
        local_position: Vec3,
        color: Color,
        font_size: f32,
    ) -> VisualHandle {
        self.insert(HeadlessNode {
            kind: NodeKind::Text {
                text: text.to_string(),
                font_size,
            },
            parent: Some(parent),
            local_position,
            rotation_radians: 0.0,
            color,
            visible: true,
            scale_x: 1.0,
        })
    }

    fn set_position(&mut self, handle: VisualHandle, local_position: Vec3) {
        if let Some(node) = self.node_mut(handle) {
            node.local_position = local_position;
            self.counters.moved += 1;
        }
    }

    fn set_color(&mut self, handle: VisualHandle, color: Color) {
        if let Some(node) = self.node_mut(handle) {
            node.color = color;
            self.counters.recolored += 1;
        }
    }

    fn set_text(&mut self, handle: VisualHandle, text: &str) {
        if let Some(node) = self.node_mut(handle) {
            if let NodeKind::Text { text: current, .. } = &mut node.kind {
                current.clear();
                current.push_str(text);
                self.counters.text_updates += 1;
            }
        }
    }

    fn set_visible(&mut self, handle: VisualHandle, visible: bool) {
        if let Some(node) = self.node_mut(handle) {
            node.visible = visible;
            self.counters.visibility_changes += 1;
        }
    }

    fn set_scale_x(&mut self, handle: VisualHandle, scale: f32) {
        if let Some(node) = self.node_mut(handle) {
            node.scale_x = scale;
            self.counters.fill_updates += 1;
        }
    }

    fn is_alive(&self, handle: VisualHandle) -> bool {
        self.node(handle).is_some()
    }

    fn despawn(&mut self, handle: VisualHandle) {
        if self.release(handle) {
            self.counters.despawned += 1;
        }
    }
}
