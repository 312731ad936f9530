//! Scene node data model and the capability traits the editor core works
//! through.
//!
//! The rendering engine owns the real scene; the core only ever sees node
//! ids and the [`Transformable`]/[`Pickable`] capabilities. [`SceneGraph`]
//! is the crate's own in-memory host, used headless and in tests, and as
//! the source for arrangement export.

pub mod export;

use glam::Vec3;

/// Opaque handle to a scene node. Allocated by the scene host; the editor
/// core never holds an owning reference to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Transform access on scene nodes. Setters return false for unknown ids.
pub trait Transformable {
    fn contains(&self, node: NodeId) -> bool;
    fn name(&self, node: NodeId) -> Option<&str>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn position(&self, node: NodeId) -> Option<Vec3>;
    /// Euler angles, radians.
    fn rotation(&self, node: NodeId) -> Option<Vec3>;
    fn scale(&self, node: NodeId) -> Option<Vec3>;
    fn set_position(&mut self, node: NodeId, position: Vec3) -> bool;
    fn set_rotation(&mut self, node: NodeId, rotation: Vec3) -> bool;
    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> bool;
}

/// Whether a node can be hit by pointer ray-casts. Non-pickable nodes
/// (ground grid, point clouds) are invisible to selection.
pub trait Pickable {
    fn is_pickable(&self, node: NodeId) -> bool;
}

/// Everything the editor core needs from a scene host.
pub trait SceneHost: Transformable + Pickable {}

impl<T: Transformable + Pickable> SceneHost for T {}

/// Result of a pointer ray-cast, produced by the scene host.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickResult {
    pub picked: Option<NodeId>,
}

impl PickResult {
    pub fn miss() -> Self {
        Self { picked: None }
    }

    pub fn hit(node: NodeId) -> Self {
        Self { picked: Some(node) }
    }

    pub fn is_miss(&self) -> bool {
        self.picked.is_none()
    }
}

/// A manipulable scene entity.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub position: Vec3,
    /// Euler angles, radians.
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Set for parts of a compound object; selection resolves to the
    /// topmost ancestor.
    pub parent: Option<NodeId>,
    pub pickable: bool,
}

/// Flat in-memory scene host. Nodes are created by the import pipeline or
/// programmatically and destroyed by explicit delete.
#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node with default transform (origin, zero rotation, unit
    /// scale) that participates in picking.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), None)
    }

    /// Add a child of `parent`, e.g. a sub-mesh of a compound object.
    /// Returns `None` when the parent does not exist.
    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> Option<NodeId> {
        if !self.contains(parent) {
            log::warn!("add_child: unknown parent {:?}", parent);
            return None;
        }
        Some(self.insert(name.into(), Some(parent)))
    }

    fn insert(&mut self, name: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(SceneNode {
            id,
            name,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            parent,
            pickable: true,
        });
        id
    }

    pub fn set_pickable(&mut self, node: NodeId, pickable: bool) -> bool {
        match self.node_mut(node) {
            Some(n) => {
                n.pickable = pickable;
                true
            }
            None => false,
        }
    }

    /// Remove a node and all of its descendants. Returns false for unknown
    /// ids. Callers that track a selection should report the removal to the
    /// controller so selection state is reset.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if !self.contains(node) {
            return false;
        }
        let mut doomed = vec![node];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor];
            for n in &self.nodes {
                if n.parent == Some(parent) && !doomed.contains(&n.id) {
                    doomed.push(n.id);
                }
            }
            cursor += 1;
        }
        self.nodes.retain(|n| !doomed.contains(&n.id));
        true
    }

    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == node)
    }

    fn node_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == node)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Transformable for SceneGraph {
    fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn position(&self, node: NodeId) -> Option<Vec3> {
        self.node(node).map(|n| n.position)
    }

    fn rotation(&self, node: NodeId) -> Option<Vec3> {
        self.node(node).map(|n| n.rotation)
    }

    fn scale(&self, node: NodeId) -> Option<Vec3> {
        self.node(node).map(|n| n.scale)
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) -> bool {
        match self.node_mut(node) {
            Some(n) => {
                n.position = position;
                true
            }
            None => false,
        }
    }

    fn set_rotation(&mut self, node: NodeId, rotation: Vec3) -> bool {
        match self.node_mut(node) {
            Some(n) => {
                n.rotation = rotation;
                true
            }
            None => false,
        }
    }

    fn set_scale(&mut self, node: NodeId, scale: Vec3) -> bool {
        match self.node_mut(node) {
            Some(n) => {
                n.scale = scale;
                true
            }
            None => false,
        }
    }
}

impl Pickable for SceneGraph {
    fn is_pickable(&self, node: NodeId) -> bool {
        self.node(node).map(|n| n.pickable).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_defaults() {
        let mut graph = SceneGraph::new();
        let id = graph.add_node("mesh");
        let node = graph.node(id).unwrap();
        assert_eq!(node.name, "mesh");
        assert_eq!(node.position, Vec3::ZERO);
        assert_eq!(node.scale, Vec3::ONE);
        assert!(node.pickable);
        assert!(node.parent.is_none());
    }

    #[test]
    fn child_requires_existing_parent() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node("group");
        let child = graph.add_child(root, "part").unwrap();
        assert_eq!(graph.parent(child), Some(root));

        graph.remove(root);
        assert!(graph.add_child(root, "orphan").is_none());
    }

    #[test]
    fn remove_is_recursive() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node("group");
        let child = graph.add_child(root, "part").unwrap();
        let grandchild = graph.add_child(child, "detail").unwrap();
        let other = graph.add_node("other");

        assert!(graph.remove(root));
        assert!(!graph.contains(root));
        assert!(!graph.contains(child));
        assert!(!graph.contains(grandchild));
        assert!(graph.contains(other));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut graph = SceneGraph::new();
        let first = graph.add_node("a");
        graph.remove(first);
        let second = graph.add_node("b");
        assert_ne!(first, second);
    }

    #[test]
    fn setters_reject_unknown_ids() {
        let mut graph = SceneGraph::new();
        let id = graph.add_node("mesh");
        graph.remove(id);
        assert!(!graph.set_position(id, Vec3::ONE));
        assert!(!graph.is_pickable(id));
    }
}
