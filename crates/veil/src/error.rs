// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Errors surfaced to namespace owners.

use veil_host::HostError;

/// Failure of a storage, resolution or configuration operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    /// A value that is not an object was passed where an object identity
    /// is required.
    #[error("object expected, received {received}")]
    InvalidArgument {
        /// Rendering of the rejected value.
        received: String,
    },
    /// The object is not extensible and has nothing to attach a record to.
    #[error("object is not extensible and carries no companion record")]
    UnsupportedObject,
    /// The requested storage backend is unknown or unavailable.
    #[error("storage configuration not found for storage type \"{requested}\"")]
    ConfigurationError {
        /// The backend name that was asked for.
        requested: String,
    },
    /// The hidden slot protocol observed an inconsistent state.
    ///
    /// Integrity of every namespace sharing the backend is compromised.
    #[error("parallel object support has been compromised")]
    TamperDetected,
    /// The host lacks a capability required at initialization.
    #[error("host environment does not support {capability}")]
    EnvironmentUnsupported {
        /// The missing capability.
        capability: &'static str,
    },
    /// A host operation failed unexpectedly.
    #[error("host operation failed: {0}")]
    Host(#[from] HostError),
}
