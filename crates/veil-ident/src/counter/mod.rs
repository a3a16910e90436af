// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Unbounded counter.
//!
//! The counter is a `BigUint`, i.e. a little-endian sequence of 64-bit
//! digits. Incrementing carries into the next digit and grows a new one when
//! every digit is saturated, so the token space never wraps.
//!
//! Tokens render the digits lowest first:
//! ```text
//! {1}  {2}  ...  {18446744073709551615}  {0,1}  {1,1}  ...
//! ```


use core::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Monotonic counter backed by arbitrary-precision digits.
#[derive(Clone, Default)]
pub struct Counter {
    value: BigUint,
}

impl Counter {
    /// Create a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: BigUint::zero(),
        }
    }

    /// Create a counter that continues from `value`.
    #[must_use]
    pub const fn starting_at(value: BigUint) -> Self {
        Self { value }
    }

    /// Advance by one and return the rendered token for the new value.
    pub fn advance(&mut self) -> String {
        self.value += BigUint::one();
        self.render()
    }

    /// Number of 64-bit digits currently in use (at least one).
    #[must_use]
    pub fn digit_count(&self) -> usize {
        self.value.to_u64_digits().len().max(1)
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> &BigUint {
        &self.value
    }

    fn render(&self) -> String {
        let digits = self.value.to_u64_digits();
        if digits.is_empty() {
            return String::from("{0}");
        }
        let joined: Vec<String> = digits.iter().map(u64::to_string).collect();
        format!("{{{}}}", joined.join(","))
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Counter({})", self.render())
    }
}
