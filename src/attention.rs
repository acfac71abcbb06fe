//! Attention extraction
//!
//! Runs text through the model with attention collection enabled and
//! returns the full per-layer, per-head stack of weight matrices plus the
//! encoded token IDs. This is the entry point of the visualization
//! pipeline; downstream stages threshold one selected matrix into a graph.

use crate::error::{EntenderError, Result};
use crate::layers::Model;
use crate::tensor::Tensor;
use crate::tokenizer::Tokenizer;

/// Attention weights for one layer, one matrix per head
#[derive(Debug, Clone)]
pub struct LayerAttention {
    /// Per-head `[seq_len, seq_len]` weight matrices
    heads: Vec<Tensor>,
}

impl LayerAttention {
    /// Per-head matrices
    #[must_use]
    pub fn heads(&self) -> &[Tensor] {
        &self.heads
    }
}

/// Full stack of attention weights: one entry per layer
///
/// Invariant: every matrix in the stack is square with side length equal
/// to the number of encoded tokens.
#[derive(Debug, Clone)]
pub struct AttentionStack {
    /// Per-layer attention
    layers: Vec<LayerAttention>,
}

impl AttentionStack {
    /// Number of layers
    #[must_use]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of heads per layer
    #[must_use]
    pub fn num_heads(&self) -> usize {
        self.layers.first().map_or(0, |l| l.heads.len())
    }

    /// Sequence length shared by every matrix in the stack
    #[must_use]
    pub fn seq_len(&self) -> usize {
        self.layers
            .first()
            .and_then(|l| l.heads.first())
            .map_or(0, |m| m.shape()[0])
    }

    /// Look up the weight matrix for a `(layer, head)` selection
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if either index is out of range.
    pub fn matrix(&self, layer: usize, head: usize) -> Result<&Tensor> {
        let layer_attention =
            self.layers
                .get(layer)
                .ok_or_else(|| EntenderError::InvalidArgument {
                    reason: format!(
                        "Layer {layer} out of range (model has {} layers)",
                        self.layers.len()
                    ),
                })?;
        layer_attention
            .heads
            .get(head)
            .ok_or_else(|| EntenderError::InvalidArgument {
                reason: format!(
                    "Head {head} out of range (model has {} heads)",
                    layer_attention.heads.len()
                ),
            })
    }
}

/// Extract attention weights for the given text
///
/// The optional context is prefixed to the text with a single separating
/// space; empty context leaves the text untouched. The encoded sequence is
/// run through the model once with attention collection enabled.
///
/// # Returns
///
/// The attention stack and the encoded token IDs (used downstream for
/// node labels).
///
/// # Errors
///
/// Returns [`EntenderError::Extraction`] carrying the underlying message
/// if encoding produces no tokens or the forward pass fails. No partial
/// result is returned.
///
/// # Examples
///
/// ```
/// use entender::{extract_attention, Model, ModelConfig, Tokenizer};
///
/// let tokenizer = Tokenizer::from_words(&["The", "cat", "sat"]).unwrap();
/// let config = ModelConfig {
///     vocab_size: tokenizer.vocab_size(),
///     hidden_dim: 8,
///     num_heads: 2,
///     num_layers: 2,
///     intermediate_dim: 16,
///     eps: 1e-5,
/// };
/// let model = Model::seeded(config, 42).unwrap();
///
/// let (stack, ids) = extract_attention(&model, &tokenizer, "The cat sat", "").unwrap();
/// assert_eq!(ids.len(), 3);
/// assert_eq!(stack.num_layers(), 2);
/// assert_eq!(stack.seq_len(), 3);
/// ```
pub fn extract_attention(
    model: &Model,
    tokenizer: &Tokenizer,
    text: &str,
    context: &str,
) -> Result<(AttentionStack, Vec<u32>)> {
    let combined = if context.is_empty() {
        text.to_string()
    } else {
        format!("{context} {text}")
    };

    let token_ids = tokenizer.encode(&combined);
    if token_ids.is_empty() {
        return Err(EntenderError::Extraction {
            reason: "Input encodes to zero tokens".to_string(),
        });
    }

    let (_logits, weights) =
        model
            .forward_with_attentions(&token_ids)
            .map_err(|e| EntenderError::Extraction {
                reason: e.to_string(),
            })?;

    let layers = weights
        .into_iter()
        .map(|heads| LayerAttention { heads })
        .collect();

    Ok((AttentionStack { layers }, token_ids))
}
