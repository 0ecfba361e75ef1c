//! Open-handle table.
//!
//! Driver front ends hand out numeric handles for every open and keep the
//! per-open state here. The table is a `DashMap`, so opens, closes and
//! lookups from different threads do not block each other, while
//! [`HandleTable::with_mut`] gives exclusive access to one handle's state for
//! the duration of a callback.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Numeric id of an open handle. 0 is never issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Concurrent map from [`HandleId`] to per-open state.
///
/// ```
/// use cmisdrive_mount::HandleTable;
///
/// let table: HandleTable<String> = HandleTable::new();
/// let a = table.open("\\a.txt".to_string());
/// let b = table.open("\\a.txt".to_string());
/// assert_ne!(a, b);
///
/// assert_eq!(table.close(a).as_deref(), Some("\\a.txt"));
/// assert!(table.contains(b));
/// ```
#[derive(Debug)]
pub struct HandleTable<V> {
    handles: DashMap<HandleId, V>,
    next_id: AtomicU64,
}

impl<V> HandleTable<V> {
    pub fn new() -> Self {
        Self {
            handles: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `value` under a fresh handle id.
    pub fn open(&self, value: V) -> HandleId {
        let mut value = Some(value);
        loop {
            let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
            // Wrapped around: skip the reserved id and anything still open
            if raw == 0 {
                continue;
            }
            if let Entry::Vacant(entry) = self.handles.entry(HandleId(raw)) {
                if let Some(value) = value.take() {
                    entry.insert(value);
                }
                return HandleId(raw);
            }
        }
    }

    /// Run `f` with exclusive access to the state of `id`.
    ///
    /// Returns `None` when the handle is not open.
    pub fn with_mut<R>(&self, id: HandleId, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let mut entry = self.handles.get_mut(&id)?;
        Some(f(entry.value_mut()))
    }

    /// Remove a handle and return its state.
    pub fn close(&self, id: HandleId) -> Option<V> {
        self.handles.remove(&id).map(|(_, v)| v)
    }

    pub fn contains(&self, id: HandleId) -> bool {
        self.handles.contains_key(&id)
    }

    /// Number of open handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Remove every handle, returning their states.
    pub fn drain(&self) -> Vec<(HandleId, V)> {
        let ids: Vec<HandleId> = self.handles.iter().map(|e| *e.key()).collect();
        ids.into_iter()
            .filter_map(|id| self.handles.remove(&id))
            .collect()
    }
}

impl<V: Clone> HandleTable<V> {
    /// Clone out the state of `id` so it can be used without holding the table.
    pub fn get(&self, id: HandleId) -> Option<V> {
        self.handles.get(&id).map(|entry| entry.value().clone())
    }
}

impl<V> Default for HandleTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
