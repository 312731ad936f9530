//! Arrangement export: serialize the edited scene to a JSON document.
//!
//! Serialized transforms use plain float arrays with rotations in degrees,
//! matching what the property panel shows. The live data model keeps
//! radians.

use crate::scene::SceneGraph;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// One exported node. `parent` refers to the parent node's name, if any.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportedNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<String>,
    pub position: [f32; 3],
    pub rotation_deg: [f32; 3],
    pub scale: [f32; 3],
}

/// Serializable form of the full arrangement.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneDocument {
    pub nodes: Vec<ExportedNode>,
}

pub fn export_scene(graph: &SceneGraph) -> SceneDocument {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| ExportedNode {
            name: node.name.clone(),
            parent: node
                .parent
                .and_then(|p| graph.node(p))
                .map(|p| p.name.clone()),
            position: node.position.to_array(),
            rotation_deg: [
                node.rotation.x.to_degrees(),
                node.rotation.y.to_degrees(),
                node.rotation.z.to_degrees(),
            ],
            scale: node.scale.to_array(),
        })
        .collect();
    SceneDocument { nodes }
}

pub fn scene_to_json(graph: &SceneGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_scene(graph))?)
}

pub fn save_scene_to_file(graph: &SceneGraph, path: &Path) -> Result<()> {
    let json = scene_to_json(graph)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_scene_from_file(path: &Path) -> Result<SceneDocument> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transformable;
    use glam::Vec3;

    #[test]
    fn export_converts_rotation_to_degrees() {
        let mut graph = SceneGraph::new();
        let id = graph.add_node("helmet");
        graph.set_position(id, Vec3::new(1.0, 2.0, 3.0));
        graph.set_rotation(id, Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0));

        let doc = export_scene(&graph);
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].position, [1.0, 2.0, 3.0]);
        assert!((doc.nodes[0].rotation_deg[0] - 90.0).abs() < 1e-4);
        assert!(doc.nodes[0].parent.is_none());
    }

    #[test]
    fn export_records_parent_by_name() {
        let mut graph = SceneGraph::new();
        let group = graph.add_node("group");
        graph.add_child(group, "part").unwrap();

        let doc = export_scene(&graph);
        assert_eq!(doc.nodes[1].parent.as_deref(), Some("group"));
    }

    #[test]
    fn save_load_via_file() {
        let mut graph = SceneGraph::new();
        let id = graph.add_node("cloud");
        graph.set_scale(id, Vec3::new(2.0, 2.0, 2.0));
        graph.set_pickable(id, false);

        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!(
            "stagehand_scene_{}_{}.json",
            std::process::id(),
            nonce
        ));

        save_scene_to_file(&graph, &path).unwrap();
        let loaded = load_scene_from_file(&path).unwrap();
        assert_eq!(loaded.nodes.len(), 1);
        assert_eq!(loaded.nodes[0].name, "cloud");
        assert_eq!(loaded.nodes[0].scale, [2.0, 2.0, 2.0]);

        let _ = std::fs::remove_file(path);
    }
}
