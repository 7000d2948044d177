//! Generation counters for cooperative cancellation.
//!
//! Every new request advances the shared counter. Work started for an older
//! generation sees its token go stale and must stop producing observable
//! effects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A shared, monotonically increasing generation counter.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    counter: Arc<AtomicU64>,
}

impl Generation {
    /// Creates a counter at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current generation.
    #[inline]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }

    /// Advances to a new generation and returns it.
    #[inline]
    pub fn advance(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns a token for `generation`.
    pub fn token(&self, generation: u64) -> GenerationToken {
        GenerationToken {
            counter: self.counter.clone(),
            issued: generation,
        }
    }
}

/// A handle that tells whether the generation it was issued for is still current.
#[derive(Clone, Debug)]
pub struct GenerationToken {
    counter: Arc<AtomicU64>,
    issued: u64,
}

impl GenerationToken {
    /// The generation this token was issued for.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.issued
    }

    /// Returns true if a newer generation has started.
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.counter.load(Ordering::Acquire) != self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let generation = Generation::new();
        assert_eq!(generation.current(), 0);
        assert_eq!(generation.advance(), 1);
        assert_eq!(generation.advance(), 2);
        assert_eq!(generation.current(), 2);
    }

    #[test]
    fn test_token_goes_stale() {
        let generation = Generation::new();
        let token = generation.token(generation.advance());
        assert!(!token.is_stale());
        assert_eq!(token.generation(), 1);

        let shared = generation.clone();
        shared.advance();
        assert!(token.is_stale());
    }
}
