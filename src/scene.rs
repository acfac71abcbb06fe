//! Renderable 3D scene description
//!
//! Converts a laid-out attention graph into the wire format the front end
//! renders: one line primitive per edge (width encodes normalized weight)
//! and one labeled marker per node. The whole structure serializes to
//! JSON without loss; this is the visualization contract of the service.

use serde::{Deserialize, Serialize};

use crate::error::{EntenderError, Result};
use crate::graph::AttentionGraph;

/// Display width of the heaviest edge in a scene
pub const MAX_EDGE_WIDTH: f32 = 5.0;

/// Line primitive for one attention edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    /// Source node index
    pub source: usize,
    /// Target node index
    pub target: usize,
    /// Line start position (layout position of the source)
    pub start: [f32; 3],
    /// Line end position (layout position of the target)
    pub end: [f32; 3],
    /// Raw attention weight
    pub weight: f32,
    /// Display width: `5 * weight / max_weight`
    pub width: f32,
}

/// Labeled marker primitive for one token node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Node index (token position)
    pub index: usize,
    /// Display label (token text, marker stripped)
    pub label: String,
    /// Layout position
    pub position: [f32; 3],
}

/// Complete renderable scene for one `(layer, head)` selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Display title
    pub title: String,
    /// Selected layer index
    pub layer: usize,
    /// Selected head index
    pub head: usize,
    /// One marker per token node
    pub nodes: Vec<SceneNode>,
    /// One line per attention edge
    pub edges: Vec<SceneEdge>,
}

impl Scene {
    /// Build a scene from a graph, its layout, and node labels
    ///
    /// Edge widths are scaled linearly so the heaviest edge always renders
    /// at [`MAX_EDGE_WIDTH`]; an empty edge set uses a max weight of 1.0
    /// and produces a node-only scene.
    ///
    /// # Errors
    ///
    /// Returns error if `positions` or `labels` do not have exactly one
    /// entry per graph node.
    pub fn build(
        graph: &AttentionGraph,
        positions: &[[f32; 3]],
        labels: &[String],
        layer: usize,
        head: usize,
    ) -> Result<Self> {
        let n = graph.num_nodes();
        if positions.len() != n {
            return Err(EntenderError::InvalidShape {
                reason: format!("Expected {n} positions, got {}", positions.len()),
            });
        }
        if labels.len() != n {
            return Err(EntenderError::InvalidShape {
                reason: format!("Expected {n} labels, got {}", labels.len()),
            });
        }

        let max_weight = graph.max_weight();

        let edges = graph
            .edges()
            .iter()
            .map(|e| SceneEdge {
                source: e.source,
                target: e.target,
                start: positions[e.source],
                end: positions[e.target],
                weight: e.weight,
                width: MAX_EDGE_WIDTH * (e.weight / max_weight),
            })
            .collect();

        let nodes = (0..n)
            .map(|i| SceneNode {
                index: i,
                label: labels[i].clone(),
                position: positions[i],
            })
            .collect();

        Ok(Self {
            title: format!("3D Attention Graph (Layer {layer}, Head {head})"),
            layer,
            head,
            nodes,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::spring_layout;
    use crate::tensor::Tensor;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn graph_from(n: usize, data: Vec<f32>, threshold: f32) -> AttentionGraph {
        let matrix = Tensor::from_vec(vec![n, n], data).unwrap();
        AttentionGraph::from_matrix(&matrix, threshold).unwrap()
    }

    #[test]
    fn test_scene_has_one_node_per_token() {
        let graph = graph_from(3, vec![0.5; 9], 0.1);
        let positions = spring_layout(&graph, 42);
        let scene = Scene::build(&graph, &positions, &labels(&["a", "b", "c"]), 0, 0).unwrap();
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.edges.len(), 9);
    }

    #[test]
    fn test_heaviest_edge_width_is_max() {
        let data = vec![
            0.0, 0.8, //
            0.2, 0.0,
        ];
        let graph = graph_from(2, data, 0.1);
        let positions = spring_layout(&graph, 42);
        let scene = Scene::build(&graph, &positions, &labels(&["a", "b"]), 0, 0).unwrap();

        let max_width = scene.edges.iter().map(|e| e.width).fold(0.0_f32, f32::max);
        assert!((max_width - MAX_EDGE_WIDTH).abs() < 1e-5);
        for edge in &scene.edges {
            assert!(edge.width > 0.0 && edge.width <= MAX_EDGE_WIDTH);
        }
    }

    #[test]
    fn test_empty_edge_set_does_not_fail() {
        let graph = graph_from(3, vec![0.0; 9], 0.01);
        let positions = spring_layout(&graph, 42);
        let scene = Scene::build(&graph, &positions, &labels(&["a", "b", "c"]), 1, 2).unwrap();
        assert!(scene.edges.is_empty());
        assert_eq!(scene.nodes.len(), 3);
    }

    #[test]
    fn test_title_carries_layer_and_head() {
        let graph = graph_from(1, vec![0.0], 0.01);
        let positions = spring_layout(&graph, 42);
        let scene = Scene::build(&graph, &positions, &labels(&["a"]), 3, 7).unwrap();
        assert!(scene.title.contains("Layer 3"));
        assert!(scene.title.contains("Head 7"));
        assert_eq!(scene.layer, 3);
        assert_eq!(scene.head, 7);
    }

    #[test]
    fn test_edge_endpoints_match_layout() {
        let data = vec![
            0.0, 0.9, //
            0.0, 0.0,
        ];
        let graph = graph_from(2, data, 0.5);
        let positions = spring_layout(&graph, 42);
        let scene = Scene::build(&graph, &positions, &labels(&["a", "b"]), 0, 0).unwrap();
        assert_eq!(scene.edges[0].start, positions[0]);
        assert_eq!(scene.edges[0].end, positions[1]);
    }

    #[test]
    fn test_position_count_mismatch_rejected() {
        let graph = graph_from(2, vec![0.0; 4], 0.01);
        let result = Scene::build(&graph, &[[0.0; 3]], &labels(&["a", "b"]), 0, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let graph = graph_from(2, vec![0.0; 4], 0.01);
        let positions = spring_layout(&graph, 42);
        let result = Scene::build(&graph, &positions, &labels(&["a"]), 0, 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_scene_json_round_trip() {
        let graph = graph_from(2, vec![0.0, 0.9, 0.0, 0.0], 0.5);
        let positions = spring_layout(&graph, 42);
        let scene = Scene::build(&graph, &positions, &labels(&["a", "b"]), 0, 0).unwrap();

        let json = serde_json::to_string(&scene).unwrap();
        let parsed: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, scene);
    }
}
