// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Identifier generator.
//!
//! Combines an unbounded [`Counter`] with [`Entropy`]. The counter makes
//! every token distinct; the random part makes tokens hard to guess.
//!
//! Identifier layout:
//! ```text
//! RRRRRRR1:RRRRRRRRRRR/RRRRRRRRRRR/.../RRRRRRRRRRR:{d0,d1,...}
//! ^ 7 chars  ^ 8 groups of 11 chars joined by '/'  ^ counter token
//! ```

#[cfg(test)]
mod generator_test;

use crate::counter::Counter;
use crate::entropy::Entropy;

/// First code point of the random alphabet (`A`).
pub const ALPHABET_START: u32 = 65;

/// Number of code points in the random alphabet (`A` through `}`).
pub const ALPHABET_LEN: u32 = 61;

/// Random characters appended to each [`IdentifierGenerator::next_token`].
const TOKEN_SUFFIX_LEN: usize = 8;

const PREFIX_LEN: usize = 7;
const GROUP_COUNT: usize = 8;
const GROUP_LEN: usize = 11;

/// Produces unique, hard-to-guess tokens.
#[derive(Debug, Default)]
pub struct IdentifierGenerator {
    counter: Counter,
    entropy: Entropy,
}

impl IdentifierGenerator {
    /// Create a generator backed by environment entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_entropy(Entropy::from_environment())
    }

    /// Create a generator with an explicit entropy source.
    #[must_use]
    pub fn with_entropy(entropy: Entropy) -> Self {
        Self {
            counter: Counter::new(),
            entropy,
        }
    }

    /// Next counter token followed by a short random suffix.
    ///
    /// Distinct from every token previously returned by this generator.
    pub fn next_token(&mut self) -> String {
        let mut token = self.counter.advance();
        token.push_str(&self.random_string(TOKEN_SUFFIX_LEN));
        token
    }

    /// Random string of `len` characters from the `A`..=`}` alphabet.
    pub fn random_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let offset = self.entropy.next_below(ALPHABET_LEN);
                char::from_u32(ALPHABET_START + offset).unwrap_or('A')
            })
            .collect()
    }

    /// Long identifier suitable for namespace ids and marker keys.
    pub fn identifier(&mut self) -> String {
        let prefix = self.random_string(PREFIX_LEN);
        let groups: Vec<String> = (0..GROUP_COUNT)
            .map(|_| self.random_string(GROUP_LEN))
            .collect();
        let sequence = self.counter.advance();
        format!("{prefix}1:{}:{sequence}", groups.join("/"))
    }

    /// Returns true if the random part comes from the environment.
    #[must_use]
    pub const fn is_environment_backed(&self) -> bool {
        self.entropy.is_environment_backed()
    }
}
