// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Callable host values.

use core::fmt;
use std::rc::Rc;

use super::Value;
use crate::error::HostError;
use crate::object::ObjectRef;

type Free = dyn Fn(&[Value]) -> Result<Value, HostError>;
type Bound = dyn Fn(&ObjectRef, &[Value]) -> Result<Value, HostError>;

enum Body {
    Free(Box<Free>),
    /// The object is owned by the function and visible to cycle collection.
    Bound(ObjectRef, Box<Bound>),
}

struct Inner {
    name: Box<str>,
    body: Body,
}

/// A function value.
///
/// Clones share the same body; equality is identity of that body.
#[derive(Clone)]
pub struct HostFunction(Rc<Inner>);

impl HostFunction {
    /// Wrap a closure as a host function.
    ///
    /// Objects captured by the closure are opaque to the realm's cycle
    /// collection; use [`HostFunction::bound`] for an object the function
    /// owns.
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + 'static,
    {
        Self::with_body(name, Body::Free(Box::new(body)))
    }

    /// Wrap a closure that receives `target` on every call.
    pub fn bound<F>(name: &str, target: ObjectRef, body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> Result<Value, HostError> + 'static,
    {
        Self::with_body(name, Body::Bound(target, Box::new(body)))
    }

    fn with_body(name: &str, body: Body) -> Self {
        Self(Rc::new(Inner {
            name: Box::from(name),
            body,
        }))
    }

    /// The function's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Invoke the function.
    ///
    /// # Errors
    ///
    /// Returns whatever error the body raises.
    pub fn call(&self, args: &[Value]) -> Result<Value, HostError> {
        match &self.0.body {
            Body::Free(body) => body(args),
            Body::Bound(target, body) => body(target, args),
        }
    }

    pub(crate) fn bound_object(&self) -> Option<&ObjectRef> {
        match &self.0.body {
            Body::Free(_) => None,
            Body::Bound(target, _) => Some(target),
        }
    }

    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast()
    }
}

impl PartialEq for HostFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HostFunction {}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFunction({})", self.0.name)
    }
}
