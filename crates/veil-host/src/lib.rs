// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! # Veil host
//!
//! The object model Veil attaches private state to.
//!
//! This crate provides:
//! - [`Value`] and [`HostFunction`]: the values a property can hold
//! - [`ObjectRef`]: identity-compared objects with a mutable delegate
//! - [`Realm`]: object creation, the reflection surface, and the
//!   [`ReflectionGuard`] registry consulted by every enumeration and
//!   extensibility change
//! - [`WeakMap`]: identity-keyed storage that never outlives its keys
//!
//! Objects are reference counted and single-threaded; the realm reclaims
//! objects that only keep each other alive. Reflection that can
//! reveal property names only exists on [`Realm`], so registered guards see
//! every such request.

pub mod error;
mod heap;
pub mod object;
pub mod realm;
pub mod value;
pub mod weak;

pub use error::HostError;
pub use object::{Attributes, ObjectId, ObjectRef, PropertyDescriptor, WeakObjectRef};
pub use realm::{Capabilities, DelegateMutation, Realm, ReflectionGuard};
pub use value::{HostFunction, PropertyKey, Value};
pub use weak::WeakMap;
