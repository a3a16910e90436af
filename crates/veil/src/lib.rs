// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Veil
//!
//! Private, mutually invisible per-object state.
//!
//! A [`Secrets`] factory creates namespaces. Each namespace is reachable
//! only through its [`Coupler`], which maps any host object to a
//! [`CompanionRecord`]:
//!
//! - the same object always yields the same record
//! - different namespaces yield different records for the same object
//! - a record delegates to the record of its object's delegate
//! - records are never visible through the realm's reflection surface
//! - a record lives exactly as long as its object
//!
//! ```text
//! Secrets ──create──> Coupler ──call(object)──> MirrorResolver
//!                                                    │
//!                                              IdentityStore
//!                                    ┌───────────────┴──────────────┐
//!                           HiddenSlotBackend              NativeWeakBackend
//!                     (concealed capability slot)           (host weak map)
//! ```

pub mod config;
pub mod error;
pub mod record;
mod resolver;
pub mod secrets;
pub mod store;

pub use config::{SecretsConfig, StorageKind};
pub use error::SecretError;
pub use record::CompanionRecord;
pub use secrets::{Coupler, Secrets};
pub use store::{HiddenSlotBackend, IdentityStore, NamespaceId, NativeWeakBackend, StoreFactory};
