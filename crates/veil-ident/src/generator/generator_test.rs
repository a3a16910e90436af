// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tests for the identifier generator.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn in_alphabet(c: char) -> bool {
    let code = u32::from(c);
    (ALPHABET_START..ALPHABET_START + ALPHABET_LEN).contains(&code)
}

#[test]
fn tokens_are_distinct() {
    let mut ids = IdentifierGenerator::with_entropy(Entropy::seeded(3));
    let mut seen = HashSet::new();
    for _ in 0..5000 {
        assert!(seen.insert(ids.next_token()));
    }
}

#[test]
fn token_starts_with_counter() {
    let mut ids = IdentifierGenerator::with_entropy(Entropy::seeded(3));
    let first = ids.next_token();
    let second = ids.next_token();
    assert!(first.starts_with("{1}"));
    assert!(second.starts_with("{2}"));
    assert_eq!(first.len(), "{1}".len() + TOKEN_SUFFIX_LEN);
}

#[test]
fn random_string_uses_alphabet() {
    let mut ids = IdentifierGenerator::with_entropy(Entropy::seeded(11));
    let s = ids.random_string(500);
    assert_eq!(s.chars().count(), 500);
    assert!(s.chars().all(in_alphabet));
}

#[test]
fn identifier_layout() {
    let mut ids = IdentifierGenerator::with_entropy(Entropy::seeded(5));
    let id = ids.identifier();

    let parts: Vec<&str> = id.splitn(3, ':').collect();
    assert_eq!(parts.len(), 3);

    let (prefix, marker) = parts[0].split_at(PREFIX_LEN);
    assert!(prefix.chars().all(in_alphabet));
    assert_eq!(marker, "1");

    let groups: Vec<&str> = parts[1].split('/').collect();
    assert_eq!(groups.len(), GROUP_COUNT);
    assert!(groups.iter().all(|g| g.chars().count() == GROUP_LEN));

    assert_eq!(parts[2], "{1}");
}

#[test]
fn identifiers_share_the_counter() {
    let mut ids = IdentifierGenerator::with_entropy(Entropy::seeded(5));
    let _ = ids.next_token();
    let id = ids.identifier();
    assert!(id.ends_with(":{2}"));
}

#[test]
fn same_seed_same_identifiers() {
    let mut a = IdentifierGenerator::with_entropy(Entropy::seeded(8));
    let mut b = IdentifierGenerator::with_entropy(Entropy::seeded(8));
    assert_eq!(a.identifier(), b.identifier());
}

proptest! {
    #[test]
    fn identifiers_unique_for_any_seed(seed in any::<u64>(), count in 1_usize..200) {
        let mut ids = IdentifierGenerator::with_entropy(Entropy::seeded(seed));
        let mut seen = HashSet::new();
        for _ in 0..count {
            prop_assert!(seen.insert(ids.identifier()));
        }
    }
}
