//! Neural network layers for transformer inference
//!
//! Pure Rust implementation of the layers needed by the interpretability
//! pipeline:
//! - Layer normalization
//! - Linear projection
//! - Feed-forward network (GELU)
//! - Multi-head causal self-attention with inspectable weights
//! - Token embedding with sinusoidal positions
//! - Complete transformer model
//!
//! The model is inference-only. Weights are filled from a seeded RNG
//! ([`Model::seeded`]) so that identical inputs always produce identical
//! activations and attention maps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EntenderError, Result};
use crate::tensor::Tensor;

/// Apply softmax along the last dimension
///
/// Uses the numerically stable max-subtraction form. Entries equal to
/// `f32::NEG_INFINITY` (masked positions) contribute zero probability.
///
/// # Errors
///
/// Returns error if the input is empty.
pub fn softmax(input: &Tensor) -> Result<Tensor> {
    let data = input.data();
    if data.is_empty() {
        return Err(EntenderError::InvalidShape {
            reason: "Cannot apply softmax to empty tensor".to_string(),
        });
    }

    let shape = input.shape();
    let row_len = shape[shape.len() - 1];
    let num_rows = data.len() / row_len;

    let mut output = Vec::with_capacity(data.len());
    for row_idx in 0..num_rows {
        let row = &data[row_idx * row_len..(row_idx + 1) * row_len];
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = row.iter().map(|&x| (x - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        output.extend(exps.iter().map(|&e| e / sum));
    }

    Tensor::from_vec(shape.to_vec(), output)
}

/// Apply GELU activation element-wise
///
/// Uses the tanh approximation:
/// `0.5 * x * (1 + tanh(sqrt(2/π) * (x + 0.044715 * x³)))`
///
/// # Errors
///
/// Returns error if the input is empty.
pub fn gelu(input: &Tensor) -> Result<Tensor> {
    let data = input.data();
    if data.is_empty() {
        return Err(EntenderError::InvalidShape {
            reason: "Cannot apply GELU to empty tensor".to_string(),
        });
    }

    let sqrt_2_over_pi = 0.797_884_6_f32;
    let c = 0.044_715_f32;
    let output: Vec<f32> = data
        .iter()
        .map(|&x| {
            let inner = sqrt_2_over_pi * (x + c * x * x * x);
            0.5 * x * (1.0 + inner.tanh())
        })
        .collect();

    Tensor::from_vec(input.shape().to_vec(), output)
}

/// Layer normalization
///
/// Normalizes activations across the feature dimension:
/// ```text
/// y = (x - mean(x)) / sqrt(variance(x) + eps) * gamma + beta
/// ```
#[derive(Debug, Clone)]
pub struct LayerNorm {
    /// Feature dimension being normalized
    normalized_shape: usize,
    /// Epsilon for numerical stability
    eps: f32,
    /// Scale parameter (gamma)
    weight: Vec<f32>,
    /// Shift parameter (beta)
    bias: Vec<f32>,
}

impl LayerNorm {
    /// Create a new layer normalization layer
    ///
    /// # Errors
    ///
    /// Returns error if `normalized_shape` is zero.
    pub fn new(normalized_shape: usize, eps: f32) -> Result<Self> {
        if normalized_shape == 0 {
            return Err(EntenderError::InvalidShape {
                reason: "normalized_shape must be > 0".to_string(),
            });
        }

        Ok(Self {
            normalized_shape,
            eps,
            weight: vec![1.0; normalized_shape],
            bias: vec![0.0; normalized_shape],
        })
    }

    /// Forward pass
    ///
    /// # Errors
    ///
    /// Returns error if the last dimension does not match `normalized_shape`.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let shape = input.shape();
        let last_dim = shape[shape.len() - 1];
        if last_dim != self.normalized_shape {
            return Err(EntenderError::InvalidShape {
                reason: format!(
                    "Last dimension {} doesn't match normalized_shape {}",
                    last_dim, self.normalized_shape
                ),
            });
        }

        let data = input.data();
        let num_groups = data.len() / self.normalized_shape;
        let mut output = Vec::with_capacity(data.len());

        #[allow(clippy::cast_precision_loss)]
        let n = self.normalized_shape as f32;
        for group_idx in 0..num_groups {
            let start = group_idx * self.normalized_shape;
            let group = &data[start..start + self.normalized_shape];

            let mean: f32 = group.iter().sum::<f32>() / n;
            let variance: f32 = group.iter().map(|&x| (x - mean) * (x - mean)).sum::<f32>() / n;
            let inv_std = 1.0 / (variance + self.eps).sqrt();

            for (i, &x) in group.iter().enumerate() {
                output.push((x - mean) * inv_std * self.weight[i] + self.bias[i]);
            }
        }

        Tensor::from_vec(shape.to_vec(), output)
    }

    /// Get the normalized feature dimension
    #[must_use]
    pub fn normalized_shape(&self) -> usize {
        self.normalized_shape
    }

    /// Get epsilon
    #[must_use]
    pub fn eps(&self) -> f32 {
        self.eps
    }
}

/// Linear (fully-connected) layer
#[derive(Debug, Clone)]
pub struct Linear {
    /// Input features
    in_features: usize,
    /// Output features
    out_features: usize,
    /// Weight matrix `[in_features, out_features]`
    weight: Vec<f32>,
    /// Bias vector `[out_features]`
    bias: Vec<f32>,
}

impl Linear {
    /// Create a new linear layer with zeroed parameters
    ///
    /// # Errors
    ///
    /// Returns error if either dimension is zero.
    pub fn new(in_features: usize, out_features: usize) -> Result<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(EntenderError::InvalidShape {
                reason: "in_features and out_features must be > 0".to_string(),
            });
        }

        Ok(Self {
            in_features,
            out_features,
            weight: vec![0.0; in_features * out_features],
            bias: vec![0.0; out_features],
        })
    }

    /// Forward pass: `output = input @ weight + bias`
    ///
    /// # Errors
    ///
    /// Returns error if the input last dimension does not match `in_features`.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let shape = input.shape();
        let last_dim = shape[shape.len() - 1];
        if last_dim != self.in_features {
            return Err(EntenderError::InvalidShape {
                reason: format!(
                    "Last dimension {} doesn't match in_features {}",
                    last_dim, self.in_features
                ),
            });
        }

        let data = input.data();
        let num_rows = data.len() / self.in_features;
        let mut output = Vec::with_capacity(num_rows * self.out_features);

        for row_idx in 0..num_rows {
            let input_row = &data[row_idx * self.in_features..(row_idx + 1) * self.in_features];
            for j in 0..self.out_features {
                let mut sum = self.bias[j];
                for (i, &x) in input_row.iter().enumerate() {
                    sum += x * self.weight[i * self.out_features + j];
                }
                output.push(sum);
            }
        }

        let mut output_shape = shape[..shape.len() - 1].to_vec();
        output_shape.push(self.out_features);
        Tensor::from_vec(output_shape, output)
    }

    /// Fill parameters from the given RNG
    pub fn randomize(&mut self, rng: &mut StdRng) {
        for w in &mut self.weight {
            *w = rng.gen_range(-0.1..0.1);
        }
        for b in &mut self.bias {
            *b = rng.gen_range(-0.01..0.01);
        }
    }

    /// Get input features
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Get output features
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

/// Feed-forward network with GELU activation
///
/// ```text
/// FFN(x) = Linear2(GELU(Linear1(x)))
/// ```
#[derive(Debug, Clone)]
pub struct FeedForward {
    /// Expansion layer
    fc1: Linear,
    /// Projection layer
    fc2: Linear,
}

impl FeedForward {
    /// Create a new feed-forward network
    ///
    /// # Errors
    ///
    /// Returns error if either dimension is zero.
    pub fn new(hidden_dim: usize, intermediate_dim: usize) -> Result<Self> {
        Ok(Self {
            fc1: Linear::new(hidden_dim, intermediate_dim)?,
            fc2: Linear::new(intermediate_dim, hidden_dim)?,
        })
    }

    /// Forward pass
    ///
    /// # Errors
    ///
    /// Returns error on shape mismatch.
    pub fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let hidden = self.fc1.forward(input)?;
        let activated = gelu(&hidden)?;
        self.fc2.forward(&activated)
    }

    /// Fill parameters from the given RNG
    pub fn randomize(&mut self, rng: &mut StdRng) {
        self.fc1.randomize(rng);
        self.fc2.randomize(rng);
    }
}

/// Multi-head causal self-attention with inspectable weights
///
/// Computes scaled dot-product attention per head over Q/K/V projections
/// of the input, with a causal mask (position `i` attends only to
/// positions `j <= i`):
///
/// ```text
/// Attention(Q, K, V) = softmax(mask(Q @ K.T / sqrt(d_k))) @ V
/// ```
///
/// The per-head post-softmax weight matrices are returned alongside the
/// output so callers can inspect where each position attends.
#[derive(Debug, Clone)]
pub struct MultiHeadAttention {
    /// Model dimension
    hidden_dim: usize,
    /// Number of attention heads
    num_heads: usize,
    /// Dimension per head (`hidden_dim / num_heads`)
    head_dim: usize,
    /// Scale factor: 1 / sqrt(head_dim)
    scale: f32,
    /// Query projection
    wq: Linear,
    /// Key projection
    wk: Linear,
    /// Value projection
    wv: Linear,
    /// Output projection
    wo: Linear,
}

impl MultiHeadAttention {
    /// Create a new multi-head attention layer
    ///
    /// # Errors
    ///
    /// Returns error if `num_heads` is zero or does not divide `hidden_dim`.
    pub fn new(hidden_dim: usize, num_heads: usize) -> Result<Self> {
        if num_heads == 0 {
            return Err(EntenderError::InvalidShape {
                reason: "num_heads must be > 0".to_string(),
            });
        }
        if hidden_dim % num_heads != 0 {
            return Err(EntenderError::InvalidShape {
                reason: format!(
                    "hidden_dim {hidden_dim} must be divisible by num_heads {num_heads}"
                ),
            });
        }

        let head_dim = hidden_dim / num_heads;
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / (head_dim as f32).sqrt();

        Ok(Self {
            hidden_dim,
            num_heads,
            head_dim,
            scale,
            wq: Linear::new(hidden_dim, hidden_dim)?,
            wk: Linear::new(hidden_dim, hidden_dim)?,
            wv: Linear::new(hidden_dim, hidden_dim)?,
            wo: Linear::new(hidden_dim, hidden_dim)?,
        })
    }

    /// Forward pass returning the output and per-head attention weights
    ///
    /// # Arguments
    ///
    /// * `input` - Input tensor `[seq_len, hidden_dim]`
    ///
    /// # Returns
    ///
    /// `(output [seq_len, hidden_dim], weights)` where `weights` holds one
    /// `[seq_len, seq_len]` matrix per head. Row `i` of each matrix sums
    /// to 1.0 and is zero above the diagonal (causal mask).
    ///
    /// # Errors
    ///
    /// Returns error if the input is not `[seq_len, hidden_dim]`.
    pub fn forward_with_weights(&self, input: &Tensor) -> Result<(Tensor, Vec<Tensor>)> {
        let shape = input.shape();
        if shape.len() != 2 || shape[1] != self.hidden_dim {
            return Err(EntenderError::InvalidShape {
                reason: format!(
                    "Expected input [seq_len, {}], got {:?}",
                    self.hidden_dim, shape
                ),
            });
        }
        let seq_len = shape[0];

        let q = self.wq.forward(input)?;
        let k = self.wk.forward(input)?;
        let v = self.wv.forward(input)?;
        let q_data = q.data();
        let k_data = k.data();
        let v_data = v.data();

        let mut head_weights = Vec::with_capacity(self.num_heads);
        let mut concat = vec![0.0; seq_len * self.hidden_dim];

        for h in 0..self.num_heads {
            let offset = h * self.head_dim;

            // Masked scores: Q @ K.T / sqrt(d_k), -inf above the diagonal
            let mut scores = Vec::with_capacity(seq_len * seq_len);
            for i in 0..seq_len {
                for j in 0..seq_len {
                    if j > i {
                        scores.push(f32::NEG_INFINITY);
                    } else {
                        let mut dot = 0.0;
                        for d in 0..self.head_dim {
                            dot += q_data[i * self.hidden_dim + offset + d]
                                * k_data[j * self.hidden_dim + offset + d];
                        }
                        scores.push(dot * self.scale);
                    }
                }
            }

            let weights = softmax(&Tensor::from_vec(vec![seq_len, seq_len], scores)?)?;
            let w_data = weights.data();

            // Weighted sum of values, written into the head's slice
            for i in 0..seq_len {
                for d in 0..self.head_dim {
                    let mut sum = 0.0;
                    for j in 0..=i {
                        sum += w_data[i * seq_len + j] * v_data[j * self.hidden_dim + offset + d];
                    }
                    concat[i * self.hidden_dim + offset + d] = sum;
                }
            }

            head_weights.push(weights);
        }

        let concat = Tensor::from_vec(vec![seq_len, self.hidden_dim], concat)?;
        let output = self.wo.forward(&concat)?;
        Ok((output, head_weights))
    }

    /// Fill parameters from the given RNG
    pub fn randomize(&mut self, rng: &mut StdRng) {
        self.wq.randomize(rng);
        self.wk.randomize(rng);
        self.wv.randomize(rng);
        self.wo.randomize(rng);
    }

    /// Get number of heads
    #[must_use]
    pub fn num_heads(&self) -> usize {
        self.num_heads
    }

    /// Get dimension per head
    #[must_use]
    pub fn head_dim(&self) -> usize {
        self.head_dim
    }
}

/// Transformer block (pre-norm architecture)
///
/// ```text
/// x = x + Attention(LayerNorm(x))
/// x = x + FFN(LayerNorm(x))
/// ```
#[derive(Debug, Clone)]
pub struct TransformerBlock {
    /// Layer normalization before attention
    attn_norm: LayerNorm,
    /// Self-attention layer
    attention: MultiHeadAttention,
    /// Layer normalization before FFN
    ffn_norm: LayerNorm,
    /// Feed-forward network
    ffn: FeedForward,
}

impl TransformerBlock {
    /// Create a new transformer block
    ///
    /// # Errors
    ///
    /// Returns error if the dimensions are invalid.
    pub fn new(
        hidden_dim: usize,
        num_heads: usize,
        intermediate_dim: usize,
        eps: f32,
    ) -> Result<Self> {
        Ok(Self {
            attn_norm: LayerNorm::new(hidden_dim, eps)?,
            attention: MultiHeadAttention::new(hidden_dim, num_heads)?,
            ffn_norm: LayerNorm::new(hidden_dim, eps)?,
            ffn: FeedForward::new(hidden_dim, intermediate_dim)?,
        })
    }

    /// Forward pass returning the block output and per-head attention weights
    ///
    /// # Errors
    ///
    /// Returns error on shape mismatch.
    pub fn forward_with_weights(&self, input: &Tensor) -> Result<(Tensor, Vec<Tensor>)> {
        let normed = self.attn_norm.forward(input)?;
        let (attn_out, weights) = self.attention.forward_with_weights(&normed)?;

        let mut residual1 = Vec::with_capacity(input.size());
        for (&x, &a) in input.data().iter().zip(attn_out.data()) {
            residual1.push(x + a);
        }
        let after_attn = Tensor::from_vec(input.shape().to_vec(), residual1)?;

        let normed2 = self.ffn_norm.forward(&after_attn)?;
        let ffn_out = self.ffn.forward(&normed2)?;

        let mut residual2 = Vec::with_capacity(after_attn.size());
        for (&x, &f) in after_attn.data().iter().zip(ffn_out.data()) {
            residual2.push(x + f);
        }

        let output = Tensor::from_vec(input.shape().to_vec(), residual2)?;
        Ok((output, weights))
    }

    /// Fill parameters from the given RNG
    pub fn randomize(&mut self, rng: &mut StdRng) {
        self.attention.randomize(rng);
        self.ffn.randomize(rng);
    }
}

/// Token embedding layer
#[derive(Debug, Clone)]
pub struct Embedding {
    /// Vocabulary size
    vocab_size: usize,
    /// Embedding dimension
    embed_dim: usize,
    /// Embedding weights `[vocab_size, embed_dim]`
    weights: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding layer with zeroed weights
    ///
    /// # Errors
    ///
    /// Returns error if either dimension is zero.
    pub fn new(vocab_size: usize, embed_dim: usize) -> Result<Self> {
        if vocab_size == 0 || embed_dim == 0 {
            return Err(EntenderError::InvalidShape {
                reason: "vocab_size and embed_dim must be > 0".to_string(),
            });
        }

        Ok(Self {
            vocab_size,
            embed_dim,
            weights: vec![0.0; vocab_size * embed_dim],
        })
    }

    /// Look up embeddings for token IDs
    ///
    /// # Errors
    ///
    /// Returns error if `token_ids` is empty or any ID is out of bounds.
    pub fn forward(&self, token_ids: &[u32]) -> Result<Tensor> {
        if token_ids.is_empty() {
            return Err(EntenderError::InvalidShape {
                reason: "Token IDs cannot be empty".to_string(),
            });
        }

        let mut output = Vec::with_capacity(token_ids.len() * self.embed_dim);
        for &token_id in token_ids {
            let idx = token_id as usize;
            if idx >= self.vocab_size {
                return Err(EntenderError::InvalidShape {
                    reason: format!(
                        "Token ID {token_id} out of bounds (vocab_size={})",
                        self.vocab_size
                    ),
                });
            }
            let offset = idx * self.embed_dim;
            output.extend_from_slice(&self.weights[offset..offset + self.embed_dim]);
        }

        Tensor::from_vec(vec![token_ids.len(), self.embed_dim], output)
    }

    /// Fill weights from the given RNG
    pub fn randomize(&mut self, rng: &mut StdRng) {
        for w in &mut self.weights {
            *w = rng.gen_range(-0.1..0.1);
        }
    }

    /// Get vocabulary size
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Get embedding dimension
    #[must_use]
    pub fn embed_dim(&self) -> usize {
        self.embed_dim
    }
}

/// Sinusoidal positional encoding `[seq_len, dim]`, flattened row-major
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn positional_encoding(seq_len: usize, dim: usize) -> Vec<f32> {
    let mut encoding = Vec::with_capacity(seq_len * dim);
    for pos in 0..seq_len {
        for d in 0..dim {
            let i = (d / 2) as f32;
            let angle = pos as f32 / 10_000_f32.powf(2.0 * i / dim as f32);
            encoding.push(if d % 2 == 0 { angle.sin() } else { angle.cos() });
        }
    }
    encoding
}

/// Configuration for the transformer model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Vocabulary size
    pub vocab_size: usize,
    /// Hidden dimension
    pub hidden_dim: usize,
    /// Number of attention heads
    pub num_heads: usize,
    /// Number of transformer blocks
    pub num_layers: usize,
    /// FFN intermediate dimension
    pub intermediate_dim: usize,
    /// Layer normalization epsilon
    pub eps: f32,
}

/// Transformer language model
///
/// ```text
/// Token IDs → Embedding (+positions) → [TransformerBlock × N] → LayerNorm → Linear → Logits
/// ```
///
/// Inference-only: there is no training path. The saliency computer uses
/// [`Model::embed`] and [`Model::forward_from_embeddings`] to evaluate the
/// model at perturbed embeddings.
#[derive(Debug, Clone)]
pub struct Model {
    /// Token embedding layer
    embedding: Embedding,
    /// Stack of transformer blocks
    blocks: Vec<TransformerBlock>,
    /// Final layer normalization
    final_norm: LayerNorm,
    /// Output projection (LM head)
    lm_head: Linear,
    /// Model configuration
    config: ModelConfig,
}

impl Model {
    /// Create a new model with zeroed parameters
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let embedding = Embedding::new(config.vocab_size, config.hidden_dim)?;

        let mut blocks = Vec::with_capacity(config.num_layers);
        for _ in 0..config.num_layers {
            blocks.push(TransformerBlock::new(
                config.hidden_dim,
                config.num_heads,
                config.intermediate_dim,
                config.eps,
            )?);
        }

        let final_norm = LayerNorm::new(config.hidden_dim, config.eps)?;
        let lm_head = Linear::new(config.hidden_dim, config.vocab_size)?;

        Ok(Self {
            embedding,
            blocks,
            final_norm,
            lm_head,
            config,
        })
    }

    /// Create a model with parameters drawn from a seeded RNG
    ///
    /// The same configuration and seed always produce the same model, so
    /// attention maps and saliency scores are reproducible across runs.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn seeded(config: ModelConfig, seed: u64) -> Result<Self> {
        let mut model = Self::new(config)?;
        let mut rng = StdRng::seed_from_u64(seed);
        model.embedding.randomize(&mut rng);
        for block in &mut model.blocks {
            block.randomize(&mut rng);
        }
        model.lm_head.randomize(&mut rng);
        Ok(model)
    }

    /// Embed token IDs and add sinusoidal positions
    ///
    /// # Errors
    ///
    /// Returns error if `token_ids` is empty or any ID is out of bounds.
    pub fn embed(&self, token_ids: &[u32]) -> Result<Tensor> {
        let mut embeds = self.embedding.forward(token_ids)?;
        let positions = positional_encoding(token_ids.len(), self.config.hidden_dim);
        for (e, p) in embeds.data_mut().iter_mut().zip(positions) {
            *e += p;
        }
        Ok(embeds)
    }

    /// Forward pass from token IDs to logits
    ///
    /// # Returns
    ///
    /// Logits tensor `[seq_len, vocab_size]`
    ///
    /// # Errors
    ///
    /// Returns error if the input is invalid.
    pub fn forward(&self, token_ids: &[u32]) -> Result<Tensor> {
        let embeds = self.embed(token_ids)?;
        self.forward_from_embeddings(&embeds)
    }

    /// Forward pass from precomputed input embeddings to logits
    ///
    /// # Errors
    ///
    /// Returns error if `embeds` is not `[seq_len, hidden_dim]`.
    pub fn forward_from_embeddings(&self, embeds: &Tensor) -> Result<Tensor> {
        let mut hidden = embeds.clone();
        for block in &self.blocks {
            let (out, _) = block.forward_with_weights(&hidden)?;
            hidden = out;
        }
        let hidden = self.final_norm.forward(&hidden)?;
        self.lm_head.forward(&hidden)
    }

    /// Forward pass that also collects every layer's attention weights
    ///
    /// # Returns
    ///
    /// `(logits, weights)` where `weights[layer][head]` is a
    /// `[seq_len, seq_len]` matrix of post-softmax attention.
    ///
    /// # Errors
    ///
    /// Returns error if the input is invalid.
    pub fn forward_with_attentions(&self, token_ids: &[u32]) -> Result<(Tensor, Vec<Vec<Tensor>>)> {
        let mut hidden = self.embed(token_ids)?;
        let mut all_weights = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            let (out, weights) = block.forward_with_weights(&hidden)?;
            hidden = out;
            all_weights.push(weights);
        }
        let hidden = self.final_norm.forward(&hidden)?;
        let logits = self.lm_head.forward(&hidden)?;
        Ok((logits, all_weights))
    }

    /// Get model configuration
    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Total number of parameters
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        let c = &self.config;
        let embed = c.vocab_size * c.hidden_dim;
        let attn = 4 * (c.hidden_dim * c.hidden_dim + c.hidden_dim);
        let norms = 2 * (2 * c.hidden_dim);
        let ffn = 2 * c.hidden_dim * c.intermediate_dim + c.intermediate_dim + c.hidden_dim;
        let block = attn + norms + ffn;
        let head = c.hidden_dim * c.vocab_size + c.vocab_size;
        embed + c.num_layers * block + 2 * c.hidden_dim + head
    }
}
