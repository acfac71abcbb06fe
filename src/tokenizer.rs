//! Tokenizer for text encoding and decoding
//!
//! Subword tokenization with a fixed vocabulary and ordered merge rules.
//! Word boundaries are encoded GPT-2 style: every word after the first
//! carries a leading `Ġ` marker, which display code strips via [`Tokenizer::labels`].
//!
//! ## Example
//!
//! ```
//! use entender::Tokenizer;
//!
//! let tokenizer = Tokenizer::from_words(&["The", "cat", "sat"]).unwrap();
//! let ids = tokenizer.encode("The cat sat");
//! assert_eq!(ids.len(), 3);
//! assert_eq!(tokenizer.labels(&ids), vec!["The", "cat", "sat"]);
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::{EntenderError, Result};

/// Word-boundary marker carried by every non-initial word token
pub const WORD_MARKER: char = 'Ġ';

/// Subword tokenizer with vocabulary and merge rules
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Token to ID mapping
    token_to_id: HashMap<String, u32>,
    /// ID to token mapping
    id_to_token: HashMap<u32, String>,
    /// Merge rules applied in order during encoding
    merges: Vec<(String, String)>,
    /// Unknown token ID
    unk_token_id: u32,
}

impl Tokenizer {
    /// Create a new tokenizer
    ///
    /// # Arguments
    ///
    /// * `vocab` - List of tokens (index = token ID)
    /// * `merges` - Merge pairs applied in order during encoding
    /// * `unk_token` - Unknown token string, must appear in `vocab`
    ///
    /// # Errors
    ///
    /// Returns error if the vocabulary is empty, contains duplicates, or
    /// does not contain the unknown token.
    pub fn new(vocab: Vec<String>, merges: Vec<(String, String)>, unk_token: &str) -> Result<Self> {
        if vocab.is_empty() {
            return Err(EntenderError::InvalidArgument {
                reason: "Vocabulary cannot be empty".to_string(),
            });
        }

        let mut token_to_id = HashMap::new();
        let mut id_to_token = HashMap::new();

        for (id, token) in vocab.into_iter().enumerate() {
            let id = u32::try_from(id).map_err(|_| EntenderError::InvalidArgument {
                reason: format!("Token ID {id} exceeds u32 limit"),
            })?;
            if token_to_id.contains_key(&token) {
                return Err(EntenderError::InvalidArgument {
                    reason: format!("Duplicate token: {token}"),
                });
            }
            token_to_id.insert(token.clone(), id);
            id_to_token.insert(id, token);
        }

        let unk_token_id =
            *token_to_id
                .get(unk_token)
                .ok_or_else(|| EntenderError::InvalidArgument {
                    reason: format!("Unknown token '{unk_token}' not in vocabulary"),
                })?;

        Ok(Self {
            token_to_id,
            id_to_token,
            merges,
            unk_token_id,
        })
    }

    /// Build a tokenizer whose vocabulary contains the given words as
    /// whole tokens, in both bare and `Ġ`-marked forms
    ///
    /// Derives the character vocabulary and the merge chain needed to
    /// assemble each word from characters. Earlier words take merge
    /// priority, so a listed word normally encodes to a single token.
    /// Unknown words fall back to character tokens, then to `<unk>`.
    ///
    /// # Errors
    ///
    /// Returns error if `words` is empty.
    pub fn from_words(words: &[&str]) -> Result<Self> {
        if words.is_empty() {
            return Err(EntenderError::InvalidArgument {
                reason: "Word list cannot be empty".to_string(),
            });
        }

        let mut vocab = vec!["<unk>".to_string()];
        let mut seen: HashSet<String> = vocab.iter().cloned().collect();
        let mut merges: Vec<(String, String)> = Vec::new();
        let mut merge_seen: HashSet<(String, String)> = HashSet::new();

        let mut add_form = |form: &str, vocab: &mut Vec<String>| {
            let chars: Vec<String> = form.chars().map(|c| c.to_string()).collect();
            for c in &chars {
                if seen.insert(c.clone()) {
                    vocab.push(c.clone());
                }
            }
            let mut prefix = chars[0].clone();
            for next in &chars[1..] {
                let pair = (prefix.clone(), next.clone());
                let merged = format!("{prefix}{next}");
                if merge_seen.insert(pair.clone()) {
                    merges.push(pair);
                }
                if seen.insert(merged.clone()) {
                    vocab.push(merged.clone());
                }
                prefix = merged;
            }
        };

        for word in words {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            // Marked form first so its merge chain wins over the bare
            // chain when both could apply to a Ġ-prefixed word.
            add_form(&format!("{WORD_MARKER}{word}"), &mut vocab);
            add_form(word, &mut vocab);
        }

        Self::new(vocab, merges, "<unk>")
    }

    /// Encode text to token IDs
    ///
    /// Words after the first are prefixed with the `Ġ` marker before
    /// subword assembly. Unmatched fragments map to the unknown token.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u32> {
        if text.is_empty() {
            return Vec::new();
        }

        let words: Vec<String> = text
            .split(' ')
            .enumerate()
            .flat_map(|(i, word)| {
                if word.is_empty() {
                    vec![]
                } else if i == 0 {
                    vec![word.to_string()]
                } else {
                    vec![format!("{WORD_MARKER}{word}")]
                }
            })
            .collect();

        let mut result = Vec::new();

        for word in words {
            let mut tokens: Vec<String> = word.chars().map(|c| c.to_string()).collect();

            for (first, second) in &self.merges {
                tokens = Self::apply_merge(&tokens, first, second);
            }

            for token in tokens {
                let id = self
                    .token_to_id
                    .get(&token)
                    .copied()
                    .unwrap_or(self.unk_token_id);
                result.push(id);
            }
        }

        result
    }

    /// Apply a single merge rule to a token list, left to right
    fn apply_merge(tokens: &[String], first: &str, second: &str) -> Vec<String> {
        if tokens.len() < 2 {
            return tokens.to_vec();
        }

        let mut result = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            if i + 1 < tokens.len() && tokens[i] == first && tokens[i + 1] == second {
                result.push(format!("{first}{second}"));
                i += 2;
            } else {
                result.push(tokens[i].clone());
                i += 1;
            }
        }

        result
    }

    /// Decode token IDs back to text
    ///
    /// The `Ġ` marker turns back into a separating space.
    ///
    /// # Errors
    ///
    /// Returns error if any token ID is not in the vocabulary.
    pub fn decode(&self, token_ids: &[u32]) -> Result<String> {
        let mut result = String::new();

        for &id in token_ids {
            let token = self
                .id_to_token
                .get(&id)
                .ok_or_else(|| EntenderError::InvalidArgument {
                    reason: format!("Invalid token ID: {id}"),
                })?;
            if let Some(rest) = token.strip_prefix(WORD_MARKER) {
                result.push(' ');
                result.push_str(rest);
            } else {
                result.push_str(token);
            }
        }

        Ok(result)
    }

    /// Raw vocabulary tokens for the given IDs (marker retained)
    ///
    /// Unknown IDs map to the unknown token.
    #[must_use]
    pub fn tokens(&self, token_ids: &[u32]) -> Vec<String> {
        let unk = &self.id_to_token[&self.unk_token_id];
        token_ids
            .iter()
            .map(|id| self.id_to_token.get(id).unwrap_or(unk).clone())
            .collect()
    }

    /// Display labels for the given IDs, with the leading `Ġ` marker stripped
    #[must_use]
    pub fn labels(&self, token_ids: &[u32]) -> Vec<String> {
        self.tokens(token_ids)
            .iter()
            .map(|t| t.trim_start_matches(WORD_MARKER).to_string())
            .collect()
    }

    /// Get vocabulary size
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.token_to_id.len()
    }

    /// Get token ID for a token
    #[must_use]
    pub fn get_token_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Get token for a token ID
    #[must_use]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(&id).map(String::as_str)
    }

    /// Demo tokenizer with a small English vocabulary
    ///
    /// # Errors
    ///
    /// Returns error if construction fails (does not happen for the
    /// built-in word list).
    pub fn demo() -> Result<Self> {
        Self::from_words(&[
            "The", "the", "a", "cat", "dog", "sat", "on", "mat", "hello", "world", "what", "is",
            "rust", "model", "attention", "graph", "token", "chased",
        ])
    }
}
