// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Cycle collection for realm objects.
//!
//! Objects are reference counted, so objects that refer to each other are
//! never freed by dropping handles alone. A record holding its own key
//! object is the typical case. The realm therefore tracks every object it
//! creates and periodically reclaims the ones only reachable from each
//! other:
//!
//! ```text
//! count:  references held by tracked objects and their bound functions
//! roots:  objects and functions with more strong references than counted
//! mark:   everything reachable from a root; weak map entries are only
//!         followed while their map is alive
//! sweep:  clear every unmarked object, which breaks its cycles
//! ```
//!
//! Closures built with [`HostFunction::new`] are opaque, so whatever they
//! capture counts as held from outside and is never reclaimed here.

#[cfg(test)]
mod heap_test;

use core::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::object::{ObjectRef, WeakObjectRef};
use crate::value::{HostFunction, Value};

/// Number of tracked objects below which no automatic collection runs.
pub(crate) const COLLECTION_THRESHOLD: usize = 1024;

/// A reference held by an object.
pub(crate) enum Edge<'a> {
    Object(&'a ObjectRef),
    Function(&'a HostFunction),
}

impl<'a> Edge<'a> {
    pub(crate) const fn of_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self::Object(object)),
            Value::Function(function) => Some(Self::Function(function)),
            _ => None,
        }
    }
}

/// Every object of a realm, held weakly.
pub(crate) struct Heap {
    objects: RefCell<Vec<WeakObjectRef>>,
    /// Tracked object count at which the next automatic collection runs.
    next_collection: Cell<usize>,
}

impl Heap {
    pub(crate) const fn new() -> Self {
        Self {
            objects: RefCell::new(Vec::new()),
            next_collection: Cell::new(COLLECTION_THRESHOLD),
        }
    }

    /// Track `object`. Returns true when a collection is due.
    pub(crate) fn track(&self, object: &ObjectRef) -> bool {
        let mut objects = self.objects.borrow_mut();
        objects.push(object.downgrade());
        objects.len() >= self.next_collection.get()
    }

    /// Number of tracked objects still alive.
    pub(crate) fn live_count(&self) -> usize {
        self.objects
            .borrow()
            .iter()
            .filter(|object| !object.is_dead())
            .count()
    }

    /// Reclaim unreachable objects. Returns how many were cleared.
    pub(crate) fn collect(&self) -> usize {
        let live: Vec<ObjectRef> = {
            let mut objects = self.objects.borrow_mut();
            objects.retain(|object| !object.is_dead());
            objects.iter().filter_map(WeakObjectRef::upgrade).collect()
        };
        let Some(reclaimed) = reclaim(&live) else {
            tracing::trace!(tracked = live.len(), "cycle collection skipped, object in use");
            return 0;
        };
        let survivors = live.len() - reclaimed;
        self.next_collection
            .set(COLLECTION_THRESHOLD.max(survivors.saturating_mul(2)));
        tracing::debug!(tracked = live.len(), reclaimed, "cycle collection finished");
        reclaimed
    }
}

/// Count, mark and sweep `objects`.
///
/// Returns `None` if an object could not be inspected; nothing is cleared
/// in that case.
fn reclaim(objects: &[ObjectRef]) -> Option<usize> {
    let index: HashMap<*const (), usize> = objects
        .iter()
        .enumerate()
        .map(|(i, object)| (object.addr(), i))
        .collect();
    let mut internal = vec![0_usize; objects.len()];
    let mut functions: Vec<(HostFunction, usize)> = Vec::new();
    let mut function_index: HashMap<*const (), usize> = HashMap::new();

    // Count
    for object in objects {
        let complete = object.try_trace(true, &mut |edge| match edge {
            Edge::Object(target) => {
                if let Some(&i) = index.get(&target.addr()) {
                    internal[i] += 1;
                }
            }
            Edge::Function(function) => {
                let slot = *function_index.entry(function.addr()).or_insert_with(|| {
                    functions.push((function.clone(), 0));
                    functions.len() - 1
                });
                functions[slot].1 += 1;
            }
        });
        if !complete {
            return None;
        }
    }
    for (function, _) in &functions {
        if let Some(&i) = function
            .bound_object()
            .and_then(|target| index.get(&target.addr()))
        {
            internal[i] += 1;
        }
    }

    // Roots; `objects` and `functions` each hold one reference themselves
    let mut marked = vec![false; objects.len()];
    let mut function_marked = vec![false; functions.len()];
    let mut work: Vec<usize> = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        if object.strong_count().saturating_sub(1) > internal[i] {
            marked[i] = true;
            work.push(i);
        }
    }
    for (slot, (function, held)) in functions.iter().enumerate() {
        if function.strong_count().saturating_sub(1) <= *held {
            continue;
        }
        function_marked[slot] = true;
        if let Some(&i) = function
            .bound_object()
            .and_then(|target| index.get(&target.addr()))
        {
            if !marked[i] {
                marked[i] = true;
                work.push(i);
            }
        }
    }

    // Mark
    while let Some(i) = work.pop() {
        let complete = objects[i].try_trace(false, &mut |edge| {
            let target = match edge {
                Edge::Object(target) => Some(target),
                Edge::Function(function) => {
                    let Some(&slot) = function_index.get(&function.addr()) else {
                        return;
                    };
                    if function_marked[slot] {
                        return;
                    }
                    function_marked[slot] = true;
                    function.bound_object()
                }
            };
            if let Some(&j) = target.and_then(|target| index.get(&target.addr())) {
                if !marked[j] {
                    marked[j] = true;
                    work.push(j);
                }
            }
        });
        if !complete {
            return None;
        }
    }

    // Sweep
    let mut reclaimed = 0;
    for (object, reachable) in objects.iter().zip(&marked) {
        if !reachable {
            object.clear();
            reclaimed += 1;
        }
    }
    Some(reclaimed)
}
