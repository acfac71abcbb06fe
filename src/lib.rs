//! # Entender
//!
//! Pure Rust transformer interpretability server: chat with a hosted
//! language model and visualize what a local transformer attends to.
//!
//! Entender (Spanish: "to understand") exposes two interpretability
//! artifacts over HTTP:
//!
//! - **Token saliency**: the L2 norm of the gradient of the summed output
//!   logits with respect to each input embedding
//! - **Attention graphs**: one selected `(layer, head)` attention matrix,
//!   thresholded into a sparse directed graph, laid out with a
//!   deterministic 3D spring embedding, and serialized as a renderable
//!   scene
//!
//! ## Pipeline
//!
//! ```text
//! text → Tokenizer → Model (attention collection) → AttentionStack
//!      → AttentionGraph (threshold) → spring_layout → Scene → JSON
//! ```
//!
//! ## Example
//!
//! ```
//! use entender::{
//!     extract_attention, spring_layout, AttentionGraph, Model, ModelConfig, Scene, Tokenizer,
//!     LAYOUT_SEED,
//! };
//!
//! let tokenizer = Tokenizer::from_words(&["The", "cat", "sat"]).unwrap();
//! let config = ModelConfig {
//!     vocab_size: tokenizer.vocab_size(),
//!     hidden_dim: 8,
//!     num_heads: 2,
//!     num_layers: 2,
//!     intermediate_dim: 16,
//!     eps: 1e-5,
//! };
//! let model = Model::seeded(config, 42).unwrap();
//!
//! let (stack, ids) = extract_attention(&model, &tokenizer, "The cat sat", "").unwrap();
//! let graph = AttentionGraph::from_matrix(stack.matrix(0, 0).unwrap(), 0.01).unwrap();
//! let positions = spring_layout(&graph, LAYOUT_SEED);
//! let labels = tokenizer.labels(&ids);
//! let scene = Scene::build(&graph, &positions, &labels, 0, 0).unwrap();
//!
//! assert_eq!(scene.nodes.len(), 3);
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

#[cfg(feature = "server")]
pub mod api;
pub mod attention;
#[cfg(feature = "server")]
pub mod chat;
#[cfg(feature = "server")]
pub mod config;
pub mod error;
pub mod graph;
pub mod layers;
pub mod layout;
#[cfg(feature = "server")]
pub mod metrics;
pub mod saliency;
pub mod scene;
pub mod tensor;
pub mod tokenizer;

// Re-exports for convenience
pub use attention::{extract_attention, AttentionStack, LayerAttention};
pub use error::{EntenderError, Result};
pub use graph::{AttentionEdge, AttentionGraph};
pub use layers::{Model, ModelConfig};
pub use layout::{spring_layout, LAYOUT_SEED};
pub use saliency::{compute_saliency, SaliencyCache, SaliencyResult};
pub use scene::{Scene, SceneEdge, SceneNode, MAX_EDGE_WIDTH};
pub use tensor::Tensor;
pub use tokenizer::Tokenizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
