//! Line-level memoization for repeated lexing of an edited document
//!
//! Because lexing is line-local, a keystroke only changes the tokens of the
//! line being edited. `LineCache` keeps the tokens of every line seen in the
//! previous pass, keyed by line text, and only lexes lines it has not seen.
//! Cached tokens are restamped with the line's current index.

use crate::lexer::tokenize_line_at;
use crate::token::Token;
use std::collections::HashMap;
use tracing::debug;

/// Hit/miss counters for the most recent `LineCache::tokenize` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

#[derive(Debug, Default)]
pub struct LineCache {
    lines: HashMap<String, Vec<Token>>,
    stats: CacheStats,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize `source`, reusing tokens for lines seen in the previous pass.
    ///
    /// Output is identical to `lexer::tokenize(source)`.
    pub fn tokenize(&mut self, source: &str) -> Vec<Vec<Token>> {
        let mut previous = std::mem::take(&mut self.lines);
        let mut stats = CacheStats::default();
        let mut lines = Vec::new();

        for (index, line) in source.split('\n').enumerate() {
            let cached = previous
                .remove(line)
                .or_else(|| self.lines.get(line).cloned());

            let tokens = match cached {
                Some(mut tokens) => {
                    stats.hits += 1;
                    for token in &mut tokens {
                        token.line = index;
                    }
                    tokens
                }
                None => {
                    stats.misses += 1;
                    tokenize_line_at(line, index)
                }
            };

            self.lines.insert(line.to_string(), tokens.clone());
            lines.push(tokens);
        }

        debug!(
            hits = stats.hits,
            misses = stats.misses,
            evicted = previous.len(),
            "Line cache pass complete"
        );
        self.stats = stats;
        lines
    }

    /// Counters from the most recent pass
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of distinct line texts currently cached
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.stats = CacheStats::default();
    }
}
