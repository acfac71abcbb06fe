//! Deterministic 3D force-directed graph layout
//!
//! Fruchterman–Reingold spring embedding in three dimensions. All node
//! pairs repel; connected nodes attract with force scaled by edge weight.
//! Initial positions come from a seeded RNG and the iteration schedule is
//! fixed, so the same graph and seed always produce the same layout.
//!
//! Isolated nodes participate in repulsion only and drift away from the
//! connected mass, which is the intended visual behavior.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::AttentionGraph;

/// Fixed seed used by the HTTP layer so repeated requests for the same
/// graph render identically
pub const LAYOUT_SEED: u64 = 42;

/// Number of relaxation iterations
const ITERATIONS: usize = 50;

/// Initial temperature as a fraction of the unit cube
const INITIAL_TEMPERATURE: f32 = 0.1;

/// Minimum inter-node distance used to avoid singular forces
const MIN_DISTANCE: f32 = 1e-4;

/// Compute a 3D spring layout for the graph
///
/// # Arguments
///
/// * `graph` - Graph to embed
/// * `seed` - RNG seed for initial positions; same graph + same seed
///   yields identical output
///
/// # Returns
///
/// One `[x, y, z]` position per node, indexed by node id, centered on the
/// origin. Every node receives a position, including isolated nodes.
///
/// # Examples
///
/// ```
/// use entender::{spring_layout, AttentionGraph, Tensor, LAYOUT_SEED};
///
/// let matrix = Tensor::from_vec(vec![3, 3], vec![
///     0.0, 0.8, 0.0,
///     0.0, 0.0, 0.6,
///     0.0, 0.0, 0.0,
/// ]).unwrap();
/// let graph = AttentionGraph::from_matrix(&matrix, 0.5).unwrap();
///
/// let positions = spring_layout(&graph, LAYOUT_SEED);
/// assert_eq!(positions.len(), 3);
/// assert_eq!(positions, spring_layout(&graph, LAYOUT_SEED));
/// ```
#[must_use]
pub fn spring_layout(graph: &AttentionGraph, seed: u64) -> Vec<[f32; 3]> {
    let n = graph.num_nodes();
    if n == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<[f32; 3]> = (0..n)
        .map(|_| {
            [
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            ]
        })
        .collect();

    if n == 1 {
        return vec![[0.0, 0.0, 0.0]];
    }

    // Ideal pairwise distance: cube root of volume per node in a unit cube
    #[allow(clippy::cast_precision_loss)]
    let k = (1.0 / n as f32).cbrt();

    let mut temperature = INITIAL_TEMPERATURE;
    #[allow(clippy::cast_precision_loss)]
    let cooling = INITIAL_TEMPERATURE / (ITERATIONS as f32 + 1.0);

    for _ in 0..ITERATIONS {
        let mut displacement = vec![[0.0_f32; 3]; n];

        // Repulsion between every node pair: k^2 / d
        for i in 0..n {
            for j in (i + 1)..n {
                let delta = sub(positions[i], positions[j]);
                let dist = norm(delta).max(MIN_DISTANCE);
                let force = k * k / dist;
                let push = scale(delta, force / dist);
                displacement[i] = add(displacement[i], push);
                displacement[j] = sub(displacement[j], push);
            }
        }

        // Attraction along edges: d^2 / k, scaled by edge weight.
        // Self-loops exert no force.
        for edge in graph.edges() {
            if edge.source == edge.target {
                continue;
            }
            let delta = sub(positions[edge.source], positions[edge.target]);
            let dist = norm(delta).max(MIN_DISTANCE);
            let force = dist * dist / k * edge.weight;
            let pull = scale(delta, force / dist);
            displacement[edge.source] = sub(displacement[edge.source], pull);
            displacement[edge.target] = add(displacement[edge.target], pull);
        }

        // Move each node along its displacement, capped by temperature
        for i in 0..n {
            let dist = norm(displacement[i]);
            if dist > MIN_DISTANCE {
                let step = dist.min(temperature);
                positions[i] = add(positions[i], scale(displacement[i], step / dist));
            }
        }

        temperature -= cooling;
    }

    center(&mut positions);
    positions
}

fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn norm(a: [f32; 3]) -> f32 {
    (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt()
}

/// Translate positions so their centroid sits at the origin
fn center(positions: &mut [[f32; 3]]) {
    if positions.is_empty() {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = positions.len() as f32;
    let mut centroid = [0.0_f32; 3];
    for p in positions.iter() {
        centroid = add(centroid, *p);
    }
    centroid = scale(centroid, 1.0 / n);
    for p in positions.iter_mut() {
        *p = sub(*p, centroid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    fn graph_from(n: usize, data: Vec<f32>, threshold: f32) -> AttentionGraph {
        let matrix = Tensor::from_vec(vec![n, n], data).unwrap();
        AttentionGraph::from_matrix(&matrix, threshold).unwrap()
    }

    #[test]
    fn test_layout_is_deterministic() {
        let graph = graph_from(4, vec![0.5; 16], 0.1);
        let a = spring_layout(&graph, 42);
        let b = spring_layout(&graph, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_give_different_layouts() {
        let graph = graph_from(4, vec![0.5; 16], 0.1);
        let a = spring_layout(&graph, 42);
        let b = spring_layout(&graph, 43);
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_node_positioned_including_isolated() {
        // Only the (0, 1) edge survives; nodes 2 and 3 are isolated
        let mut data = vec![0.0; 16];
        data[1] = 0.9;
        let graph = graph_from(4, data, 0.5);
        let positions = spring_layout(&graph, 42);
        assert_eq!(positions.len(), 4);
        for p in &positions {
            assert!(p.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_empty_edge_graph_still_positions_all_nodes() {
        let graph = graph_from(3, vec![0.0; 9], 0.01);
        let positions = spring_layout(&graph, 42);
        assert_eq!(positions.len(), 3);
    }

    #[test]
    fn test_single_node_at_origin() {
        let graph = graph_from(1, vec![0.0], 0.01);
        let positions = spring_layout(&graph, 42);
        assert_eq!(positions, vec![[0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_nodes_are_separated() {
        let graph = graph_from(3, vec![0.5; 9], 0.1);
        let positions = spring_layout(&graph, 42);
        for i in 0..3 {
            for j in (i + 1)..3 {
                let d = norm(sub(positions[i], positions[j]));
                assert!(d > 1e-3, "nodes {i} and {j} collapsed to distance {d}");
            }
        }
    }

    #[test]
    fn test_layout_is_centered() {
        let graph = graph_from(5, vec![0.3; 25], 0.1);
        let positions = spring_layout(&graph, 42);
        let mut centroid = [0.0_f32; 3];
        for p in &positions {
            centroid = add(centroid, *p);
        }
        for c in centroid {
            assert!(c.abs() / 5.0 < 1e-4);
        }
    }

    #[test]
    fn test_heavier_edges_pull_closer() {
        // Chain 0-1 heavy, 1-2 light; expect 0-1 to sit closer than 1-2
        let data = vec![
            0.0, 0.9, 0.0, //
            0.0, 0.0, 0.1, //
            0.0, 0.0, 0.0,
        ];
        let graph = graph_from(3, data, 0.05);
        let positions = spring_layout(&graph, 42);
        let d01 = norm(sub(positions[0], positions[1]));
        let d12 = norm(sub(positions[1], positions[2]));
        assert!(d01 < d12);
    }
}
