// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Randomness for identifiers.
//!
//! Bytes are drawn in blocks of [`BLOCK_SIZE`] from the operating system's
//! entropy source. If the source fails its probe at construction, or fails
//! later on refill, the entropy switches permanently to a seeded `StdRng`.


use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// Number of bytes fetched per refill.
pub const BLOCK_SIZE: usize = 16;

/// Size of the probe read used to check that the environment source works.
const PROBE_SIZE: usize = 4;

/// Mixed into fallback seeds so two fallbacks created in the same instant differ.
static FALLBACK_SALT: AtomicU64 = AtomicU64::new(0x9e37_79b9_7f4a_7c15);

enum Source {
    Environment,
    Fallback(Box<StdRng>),
}

/// Buffered random byte source.
pub struct Entropy {
    source: Source,
    block: [u8; BLOCK_SIZE],
    index: usize,
}

impl Entropy {
    /// Use the environment's entropy source, falling back to a seeded
    /// generator if it is unavailable.
    #[must_use]
    pub fn from_environment() -> Self {
        let mut probe = [0_u8; PROBE_SIZE];
        let mut os = OsRng;
        if os.try_fill_bytes(&mut probe).is_ok() {
            Self::with_source(Source::Environment)
        } else {
            Self::fallback()
        }
    }

    /// Deterministic entropy for reproducible sequences.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(Source::Fallback(Box::new(StdRng::seed_from_u64(seed))))
    }

    /// Returns true while bytes come from the environment source.
    #[must_use]
    pub const fn is_environment_backed(&self) -> bool {
        matches!(self.source, Source::Environment)
    }

    /// Next random byte.
    pub fn next_byte(&mut self) -> u8 {
        if self.index >= BLOCK_SIZE {
            self.refill();
        }
        let byte = self.block[self.index];
        self.index += 1;
        byte
    }

    /// Next value in `0..bound`, scaled from one byte.
    ///
    /// Returns 0 when `bound` is 0.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        let scaled = u64::from(self.next_byte()) * u64::from(bound) / 256;
        // scaled < bound
        u32::try_from(scaled).unwrap_or(0)
    }

    const fn with_source(source: Source) -> Self {
        Self {
            source,
            block: [0; BLOCK_SIZE],
            index: BLOCK_SIZE,
        }
    }

    fn fallback() -> Self {
        Self::seeded(fallback_seed())
    }

    fn refill(&mut self) {
        self.index = 0;
        match &mut self.source {
            Source::Environment => {
                let mut os = OsRng;
                if os.try_fill_bytes(&mut self.block).is_err() {
                    let mut rng = StdRng::seed_from_u64(fallback_seed());
                    rng.fill_bytes(&mut self.block);
                    self.source = Source::Fallback(Box::new(rng));
                }
            }
            Source::Fallback(rng) => rng.fill_bytes(&mut self.block),
        }
    }
}

impl Default for Entropy {
    fn default() -> Self {
        Self::from_environment()
    }
}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.is_environment_backed() {
            "environment"
        } else {
            "fallback"
        };
        write!(f, "Entropy({source})")
    }
}

fn fallback_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            elapsed
                .as_secs()
                .wrapping_mul(1_000_000_000)
                .wrapping_add(u64::from(elapsed.subsec_nanos()))
        });
    nanos ^ FALLBACK_SALT.fetch_add(0x6a09_e667_f3bc_c909, Ordering::Relaxed)
}
