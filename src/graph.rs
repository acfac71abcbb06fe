//! Attention graph construction
//!
//! Thresholds a single attention matrix into a weighted directed graph
//! over token positions. Every position becomes a node even when isolated;
//! an edge `(i, j)` exists iff `matrix[i][j]` is strictly greater than the
//! threshold. Self-loops are allowed.

use serde::{Deserialize, Serialize};

use crate::error::{EntenderError, Result};
use crate::tensor::Tensor;

/// One directed edge of the attention graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionEdge {
    /// Query position (edge origin)
    pub source: usize,
    /// Key position (edge destination)
    pub target: usize,
    /// Raw attention weight, unnormalized
    pub weight: f32,
}

/// Weighted directed graph over token positions
///
/// Node set is exactly `0..num_nodes`; at most one edge per ordered pair.
#[derive(Debug, Clone)]
pub struct AttentionGraph {
    /// Number of nodes (= sequence length)
    num_nodes: usize,
    /// Edges above the threshold
    edges: Vec<AttentionEdge>,
}

impl AttentionGraph {
    /// Build a graph from a square attention matrix
    ///
    /// Edge inclusion uses strict comparison: an entry exactly equal to
    /// the threshold does not produce an edge.
    ///
    /// # Errors
    ///
    /// Returns error if the matrix is not a square 2-D tensor.
    ///
    /// # Examples
    ///
    /// ```
    /// use entender::{AttentionGraph, Tensor};
    ///
    /// let matrix = Tensor::from_vec(vec![2, 2], vec![
    ///     0.9, 0.1,
    ///     0.5, 0.5,
    /// ]).unwrap();
    /// let graph = AttentionGraph::from_matrix(&matrix, 0.4).unwrap();
    /// assert_eq!(graph.num_nodes(), 2);
    /// assert_eq!(graph.num_edges(), 3);
    /// ```
    pub fn from_matrix(matrix: &Tensor, threshold: f32) -> Result<Self> {
        if !matrix.is_square_matrix() {
            return Err(EntenderError::InvalidShape {
                reason: format!(
                    "Attention matrix must be square 2-D, got shape {:?}",
                    matrix.shape()
                ),
            });
        }

        let num_nodes = matrix.shape()[0];
        let data = matrix.data();
        let mut edges = Vec::new();

        for i in 0..num_nodes {
            for j in 0..num_nodes {
                let weight = data[i * num_nodes + j];
                if weight > threshold {
                    edges.push(AttentionEdge {
                        source: i,
                        target: j,
                        weight,
                    });
                }
            }
        }

        Ok(Self { num_nodes, edges })
    }

    /// Number of nodes
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edges above the threshold
    #[must_use]
    pub fn edges(&self) -> &[AttentionEdge] {
        &self.edges
    }

    /// Maximum edge weight, or 1.0 for an empty edge set
    ///
    /// The 1.0 default keeps downstream width normalization free of
    /// division by zero.
    #[must_use]
    pub fn max_weight(&self) -> f32 {
        if self.edges.is_empty() {
            return 1.0;
        }
        self.edges
            .iter()
            .map(|e| e.weight)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}
