//! Random baseline agent
//!
//! Speaks the same text protocol as a language model: it reads the legal-move
//! list out of the latest user message and answers with one of them. Useful as
//! a floor for ratings and for dry runs without provider credentials.

use std::cell::RefCell;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use crate::error::ProviderError;
use crate::prompt::parse_move_list;
use crate::provider::{ChatMessage, ChatProvider, ChatRole};

/// Seeded random mover. `random:<seed>` agents get their own stream.
pub struct RandomAgent {
    base_seed: u64,
    rngs: RefCell<FxHashMap<String, ChaCha8Rng>>,
}

impl RandomAgent {
    pub fn new(base_seed: u64) -> Self {
        Self {
            base_seed,
            rngs: RefCell::new(FxHashMap::default()),
        }
    }

    fn seed_for(&self, model: &str) -> u64 {
        model
            .strip_prefix("random:")
            .and_then(|s| s.parse().ok())
            .unwrap_or(self.base_seed)
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new(42)
    }
}

impl ChatProvider for RandomAgent {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let moves = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| parse_move_list(&m.content))
            .unwrap_or_default();

        let mut rngs = self.rngs.borrow_mut();
        let rng = rngs
            .entry(model.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(self.seed_for(model)));

        Ok(moves
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| "pass".to_string()))
    }
}
