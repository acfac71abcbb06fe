//! End-to-end tests for the attention visualization pipeline
//!
//! Exercises extraction → graph → layout → scene as one flow, plus the
//! saliency cache contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use entender::{
    compute_saliency, extract_attention, spring_layout, AttentionGraph, Model, ModelConfig,
    SaliencyCache, Scene, Tensor, Tokenizer, LAYOUT_SEED, MAX_EDGE_WIDTH,
};

fn fixture() -> (Model, Tokenizer) {
    let tokenizer =
        Tokenizer::from_words(&["The", "cat", "sat", "on", "a", "mat", "foo", "bar"]).unwrap();
    let config = ModelConfig {
        vocab_size: tokenizer.vocab_size(),
        hidden_dim: 16,
        num_heads: 2,
        num_layers: 2,
        intermediate_dim: 32,
        eps: 1e-5,
    };
    let model = Model::seeded(config, 42).unwrap();
    (model, tokenizer)
}

fn run_pipeline(
    model: &Model,
    tokenizer: &Tokenizer,
    text: &str,
    layer: usize,
    head: usize,
    threshold: f32,
) -> Scene {
    let (stack, ids) = extract_attention(model, tokenizer, text, "").unwrap();
    let graph = AttentionGraph::from_matrix(stack.matrix(layer, head).unwrap(), threshold).unwrap();
    let positions = spring_layout(&graph, LAYOUT_SEED);
    let labels = tokenizer.labels(&ids);
    Scene::build(&graph, &positions, &labels, layer, head).unwrap()
}

#[test]
fn identical_requests_produce_identical_scenes() {
    let (model, tokenizer) = fixture();
    let a = run_pipeline(&model, &tokenizer, "The cat sat on a mat", 0, 1, 0.01);
    let b = run_pipeline(&model, &tokenizer, "The cat sat on a mat", 0, 1, 0.01);
    assert_eq!(a, b);
}

#[test]
fn threshold_boundary_is_strict() {
    let matrix = Tensor::from_vec(vec![2, 2], vec![0.01, 0.010_000_1, 0.005, 0.0]).unwrap();
    let graph = AttentionGraph::from_matrix(&matrix, 0.01).unwrap();
    assert_eq!(graph.num_edges(), 1);
    assert_eq!(graph.edges()[0].target, 1);
}

#[test]
fn every_token_becomes_a_node_and_a_position() {
    let (model, tokenizer) = fixture();
    let text = "The cat sat on a mat";
    let (stack, ids) = extract_attention(&model, &tokenizer, text, "").unwrap();
    assert_eq!(ids.len(), 6);

    // High threshold isolates most nodes; they must still appear
    let graph = AttentionGraph::from_matrix(stack.matrix(1, 0).unwrap(), 0.99).unwrap();
    assert_eq!(graph.num_nodes(), 6);
    let positions = spring_layout(&graph, LAYOUT_SEED);
    assert_eq!(positions.len(), 6);

    let scene = run_pipeline(&model, &tokenizer, text, 1, 0, 0.99);
    assert_eq!(scene.nodes.len(), 6);
}

#[test]
fn widths_are_bounded_and_max_is_reached() {
    let (model, tokenizer) = fixture();
    let scene = run_pipeline(&model, &tokenizer, "The cat sat", 0, 0, 0.01);
    assert!(!scene.edges.is_empty());

    let max_width = scene.edges.iter().map(|e| e.width).fold(0.0_f32, f32::max);
    assert!((max_width - MAX_EDGE_WIDTH).abs() < 1e-4);
    for edge in &scene.edges {
        assert!(edge.width > 0.0);
        assert!(edge.width <= MAX_EDGE_WIDTH + 1e-6);
    }
}

#[test]
fn empty_edge_set_builds_a_node_only_scene() {
    let (model, tokenizer) = fixture();
    // Nothing exceeds a threshold of 1.0 (rows sum to 1.0 exactly)
    let scene = run_pipeline(&model, &tokenizer, "The cat sat", 0, 0, 1.0);
    assert!(scene.edges.is_empty());
    assert_eq!(scene.nodes.len(), 3);
}

#[test]
fn example_three_tokens_scene_matches_matrix() {
    let (model, tokenizer) = fixture();
    let (stack, ids) = extract_attention(&model, &tokenizer, "The cat sat", "").unwrap();
    assert_eq!(ids.len(), 3);

    let matrix = stack.matrix(0, 0).unwrap();
    let scene = run_pipeline(&model, &tokenizer, "The cat sat", 0, 0, 0.01);
    assert_eq!(scene.nodes.len(), 3);
    assert!(scene.edges.len() <= 9);

    // Every matrix entry above the threshold has a corresponding line
    let data = matrix.data();
    for i in 0..3 {
        for j in 0..3 {
            let weight = data[i * 3 + j];
            let edge = scene
                .edges
                .iter()
                .find(|e| e.source == i && e.target == j);
            if weight > 0.01 {
                let edge = edge.expect("missing edge for above-threshold entry");
                assert!(edge.width > 0.0);
            } else {
                assert!(edge.is_none());
            }
        }
    }
}

#[test]
fn context_is_prefixed_with_a_single_space() {
    let (model, tokenizer) = fixture();

    let (_, with_context) = extract_attention(&model, &tokenizer, "foo", "bar").unwrap();
    assert_eq!(with_context, tokenizer.encode("bar foo"));

    let (_, no_context) = extract_attention(&model, &tokenizer, "foo", "").unwrap();
    assert_eq!(no_context, tokenizer.encode("foo"));
}

#[test]
fn saliency_cache_serves_second_request_without_recompute() {
    let (model, tokenizer) = fixture();
    let cache = SaliencyCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let compute = |calls: Arc<AtomicUsize>| {
        let model = model.clone();
        let tokenizer = tokenizer.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            compute_saliency(&model, &tokenizer, "The cat")
        }
    };

    let first = cache
        .get_or_compute("The cat", compute(Arc::clone(&calls)))
        .unwrap();
    let second = cache
        .get_or_compute("The cat", compute(Arc::clone(&calls)))
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.tokens.len(), 2);
    assert_eq!(first.saliency.len(), 2);
}

#[test]
fn attention_rows_sum_to_one() {
    let (model, tokenizer) = fixture();
    let (stack, ids) = extract_attention(&model, &tokenizer, "The cat sat on a mat", "").unwrap();
    let n = ids.len();
    for layer in 0..stack.num_layers() {
        for head in 0..stack.num_heads() {
            let data = stack.matrix(layer, head).unwrap().data().to_vec();
            for i in 0..n {
                let row_sum: f32 = data[i * n..(i + 1) * n].iter().sum();
                assert!((row_sum - 1.0).abs() < 1e-4);
            }
        }
    }
}

#[test]
fn scene_survives_json_round_trip() {
    let (model, tokenizer) = fixture();
    let scene = run_pipeline(&model, &tokenizer, "The cat sat", 1, 1, 0.01);
    let json = serde_json::to_string(&scene).unwrap();
    let parsed: Scene = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, scene);
}
