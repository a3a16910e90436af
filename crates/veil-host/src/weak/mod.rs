// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Identity-keyed weak map.
//!
//! Entries are stored inside the key object's internal table, tagged with a
//! liveness token of the map. The key object therefore owns its values: when
//! the key is reclaimed, so are its entries, without any sweep. When a map is
//! dropped its token dies and the key objects discard the stale entries the
//! next time one of their tables is written.
//!
//! Because the table is internal, entries can be added to non-extensible
//! objects and are invisible to every reflection operation.


use core::fmt;
use std::rc::Rc;

use crate::object::ObjectRef;
use crate::value::Value;

/// Weak map keyed by object identity.
#[derive(Clone)]
pub struct WeakMap {
    token: Rc<()>,
}

impl WeakMap {
    pub(crate) fn new() -> Self {
        Self { token: Rc::new(()) }
    }

    /// Value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &ObjectRef) -> Option<Value> {
        key.weak_get(&self.token)
    }

    /// Returns true if an entry exists for `key`.
    #[must_use]
    pub fn has(&self, key: &ObjectRef) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` for `key`, replacing any previous entry.
    pub fn set(&self, key: &ObjectRef, value: Value) {
        key.weak_set(&self.token, value);
    }

    /// Remove the entry for `key`. Returns `false` if there was none.
    pub fn delete(&self, key: &ObjectRef) -> bool {
        key.weak_remove(&self.token)
    }
}

impl fmt::Debug for WeakMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakMap({:p})", Rc::as_ptr(&self.token))
    }
}
