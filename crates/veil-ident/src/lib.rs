// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Veil identifiers
//!
//! Token and identifier generation shared by the Veil crates.
//!
//! This crate provides:
//! - [`Counter`]: an unbounded counter whose rendering never repeats
//! - [`Entropy`]: environment randomness with a seeded fallback
//! - [`IdentifierGenerator`]: namespace ids and marker keys
//!
//! Nothing here depends on the host object model, so a generator can be
//! created before any realm exists.

pub mod counter;
pub mod entropy;
pub mod generator;

pub use counter::Counter;
pub use entropy::Entropy;
pub use generator::IdentifierGenerator;
