//! Gradient-based token saliency
//!
//! Scores each input token by the L2 norm of the gradient of the summed
//! output logits with respect to that token's input embedding. The
//! inference stack is forward-only, so the gradient is evaluated by
//! central differences over [`Model::forward_from_embeddings`].
//!
//! Results are cached by exact input text in an explicitly owned
//! [`SaliencyCache`] that the application constructs at startup and
//! injects into request handlers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{EntenderError, Result};
use crate::layers::Model;
use crate::tensor::Tensor;
use crate::tokenizer::Tokenizer;

/// Perturbation size for central differences
const EPSILON: f32 = 1e-2;

/// Per-token saliency scores for one input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaliencyResult {
    /// Vocabulary tokens for the encoded input (word marker retained)
    pub tokens: Vec<String>,
    /// One non-negative score per token
    pub saliency: Vec<f32>,
}

/// Compute gradient saliency for the given text
///
/// # Errors
///
/// Returns [`EntenderError::Extraction`] if the text encodes to zero
/// tokens or the forward pass fails.
///
/// # Examples
///
/// ```
/// use entender::{compute_saliency, Model, ModelConfig, Tokenizer};
///
/// let tokenizer = Tokenizer::from_words(&["The", "cat"]).unwrap();
/// let config = ModelConfig {
///     vocab_size: tokenizer.vocab_size(),
///     hidden_dim: 8,
///     num_heads: 2,
///     num_layers: 1,
///     intermediate_dim: 16,
///     eps: 1e-5,
/// };
/// let model = Model::seeded(config, 42).unwrap();
///
/// let result = compute_saliency(&model, &tokenizer, "The cat").unwrap();
/// assert_eq!(result.tokens.len(), 2);
/// assert_eq!(result.saliency.len(), 2);
/// ```
pub fn compute_saliency(
    model: &Model,
    tokenizer: &Tokenizer,
    text: &str,
) -> Result<SaliencyResult> {
    let token_ids = tokenizer.encode(text);
    if token_ids.is_empty() {
        return Err(EntenderError::Extraction {
            reason: "Input encodes to zero tokens".to_string(),
        });
    }

    let embeds = model.embed(&token_ids).map_err(wrap_extraction)?;
    let hidden_dim = model.config().hidden_dim;
    let seq_len = token_ids.len();

    let mut saliency = Vec::with_capacity(seq_len);
    for pos in 0..seq_len {
        let mut squared_sum = 0.0_f32;
        for d in 0..hidden_dim {
            let idx = pos * hidden_dim + d;
            let gradient = central_difference(model, &embeds, idx)?;
            squared_sum += gradient * gradient;
        }
        saliency.push(squared_sum.sqrt());
    }

    Ok(SaliencyResult {
        tokens: tokenizer.tokens(&token_ids),
        saliency,
    })
}

/// Gradient of the summed logits with respect to one embedding coordinate
fn central_difference(model: &Model, embeds: &Tensor, idx: usize) -> Result<f32> {
    let mut plus = embeds.clone();
    plus.data_mut()[idx] += EPSILON;
    let f_plus = logits_sum(model, &plus)?;

    let mut minus = embeds.clone();
    minus.data_mut()[idx] -= EPSILON;
    let f_minus = logits_sum(model, &minus)?;

    Ok((f_plus - f_minus) / (2.0 * EPSILON))
}

fn logits_sum(model: &Model, embeds: &Tensor) -> Result<f32> {
    let logits = model.forward_from_embeddings(embeds).map_err(wrap_extraction)?;
    Ok(logits.data().iter().sum())
}

fn wrap_extraction(err: EntenderError) -> EntenderError {
    EntenderError::Extraction {
        reason: err.to_string(),
    }
}

/// Thread-safe cache of saliency results keyed by exact input text
///
/// Values are shared via `Arc`, so a cache hit returns the same object
/// that was stored, not a copy. The compute closure runs outside the
/// lock: two concurrent misses for the same key may both compute, and the
/// first insert wins.
///
/// Unbounded by default; [`SaliencyCache::bounded`] caps the entry count
/// with insertion-order eviction.
#[derive(Debug, Default)]
pub struct SaliencyCache {
    /// Map plus insertion order for eviction
    inner: Mutex<CacheInner>,
    /// Maximum entries, `None` for unbounded
    max_entries: Option<usize>,
    /// Number of lookups served from the cache
    hits: AtomicU64,
    /// Number of lookups that required computation
    misses: AtomicU64,
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, Arc<SaliencyResult>>,
    order: VecDeque<String>,
}

impl SaliencyCache {
    /// Create an unbounded cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `max_entries` results
    ///
    /// When full, the oldest entry by insertion order is evicted.
    #[must_use]
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    /// Look up a cached result without computing
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<SaliencyResult>> {
        self.lock().map.get(text).cloned()
    }

    /// Return the cached result for `text`, computing and storing it on miss
    ///
    /// # Errors
    ///
    /// Propagates the compute closure's error; failed computations are not
    /// cached.
    pub fn get_or_compute<F>(&self, text: &str, compute: F) -> Result<Arc<SaliencyResult>>
    where
        F: FnOnce() -> Result<SaliencyResult>,
    {
        if let Some(hit) = self.lock().map.get(text).cloned() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(compute()?);

        let mut inner = self.lock();
        if let Some(existing) = inner.map.get(text).cloned() {
            // A concurrent request computed the same key first
            return Ok(existing);
        }

        inner.map.insert(text.to_string(), Arc::clone(&value));
        inner.order.push_back(text.to_string());

        if let Some(max) = self.max_entries {
            while inner.map.len() > max {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.map.remove(&oldest);
                    }
                    None => break,
                }
            }
        }

        Ok(value)
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lookups served from the cache
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that required computation
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        self.inner.lock().expect("saliency cache lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::ModelConfig;
    use std::cell::Cell;

    fn fixture() -> (Model, Tokenizer) {
        let tokenizer = Tokenizer::from_words(&["The", "cat", "sat"]).unwrap();
        let config = ModelConfig {
            vocab_size: tokenizer.vocab_size(),
            hidden_dim: 8,
            num_heads: 2,
            num_layers: 1,
            intermediate_dim: 16,
            eps: 1e-5,
        };
        let model = Model::seeded(config, 42).unwrap();
        (model, tokenizer)
    }

    #[test]
    fn test_one_score_per_token() {
        let (model, tokenizer) = fixture();
        let result = compute_saliency(&model, &tokenizer, "The cat sat").unwrap();
        assert_eq!(result.tokens.len(), 3);
        assert_eq!(result.saliency.len(), 3);
        assert!(result.saliency.iter().all(|&s| s >= 0.0 && s.is_finite()));
    }

    #[test]
    fn test_tokens_keep_word_marker() {
        let (model, tokenizer) = fixture();
        let result = compute_saliency(&model, &tokenizer, "The cat").unwrap();
        assert_eq!(result.tokens[1], "Ġcat");
    }

    #[test]
    fn test_empty_text_is_extraction_error() {
        let (model, tokenizer) = fixture();
        let result = compute_saliency(&model, &tokenizer, "");
        assert!(matches!(result, Err(EntenderError::Extraction { .. })));
    }

    #[test]
    fn test_saliency_is_deterministic() {
        let (model, tokenizer) = fixture();
        let a = compute_saliency(&model, &tokenizer, "The cat").unwrap();
        let b = compute_saliency(&model, &tokenizer, "The cat").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_returns_same_object_on_hit() {
        let cache = SaliencyCache::new();
        let make = || {
            Ok(SaliencyResult {
                tokens: vec!["a".to_string()],
                saliency: vec![1.0],
            })
        };

        let first = cache.get_or_compute("a", make).unwrap();
        let second = cache.get_or_compute("a", make).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_cache_does_not_recompute_on_hit() {
        let cache = SaliencyCache::new();
        let calls = Cell::new(0);
        let make = || {
            calls.set(calls.get() + 1);
            Ok(SaliencyResult {
                tokens: vec![],
                saliency: vec![],
            })
        };

        cache.get_or_compute("text", make).unwrap();
        let make_again = || {
            calls.set(calls.get() + 1);
            Ok(SaliencyResult {
                tokens: vec![],
                saliency: vec![],
            })
        };
        cache.get_or_compute("text", make_again).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_cache_distinct_keys() {
        let cache = SaliencyCache::new();
        let make = |v: f32| {
            move || {
                Ok(SaliencyResult {
                    tokens: vec![],
                    saliency: vec![v],
                })
            }
        };

        let a = cache.get_or_compute("a", make(1.0)).unwrap();
        let b = cache.get_or_compute("b", make(2.0)).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_computation_not_cached() {
        let cache = SaliencyCache::new();
        let fail = || {
            Err(EntenderError::Extraction {
                reason: "boom".to_string(),
            })
        };
        assert!(cache.get_or_compute("x", fail).is_err());
        assert!(cache.is_empty());

        // A later successful computation for the same key is stored
        let ok = || {
            Ok(SaliencyResult {
                tokens: vec![],
                saliency: vec![],
            })
        };
        assert!(cache.get_or_compute("x", ok).is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_bounded_cache_evicts_oldest() {
        let cache = SaliencyCache::bounded(2);
        let make = || {
            Ok(SaliencyResult {
                tokens: vec![],
                saliency: vec![],
            })
        };

        cache.get_or_compute("a", make).unwrap();
        cache.get_or_compute("b", make).unwrap();
        cache.get_or_compute("c", make).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }
}
