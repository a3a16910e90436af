// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Errors raised by host object operations.

use crate::value::PropertyKey;

/// A host operation refused to complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// New properties cannot be added to the object.
    #[error("object is not extensible")]
    NotExtensible,
    /// The property cannot be redefined or deleted.
    #[error("property `{0}` is not configurable")]
    NonConfigurable(PropertyKey),
    /// The property's value cannot be changed.
    #[error("property `{0}` is not writable")]
    NotWritable(PropertyKey),
    /// The requested delegate would make the chain cyclic.
    #[error("delegate chain would contain a cycle")]
    DelegateCycle,
    /// The host refuses to replace this object's delegate.
    #[error("delegate of this object cannot be replaced")]
    DelegateImmutable,
    /// The realm lacks a capability.
    #[error("host does not support {0}")]
    Unsupported(&'static str),
    /// Raised by a host function.
    #[error("{0}")]
    Thrown(String),
}
