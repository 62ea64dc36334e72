//! Shared outside-click dismissal registry.
//!
//! Open pickers register their identity here. An outside click dismisses
//! every registered picker; a targeted dismissal reaches only the picker
//! whose identity it names.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use once_cell::sync::Lazy;

use crate::bridge::{DismissHandle, PopupBridge};
use crate::identity::Identity;

static GLOBAL: Lazy<DismissalRegistry> = Lazy::new(DismissalRegistry::new);

#[derive(Debug, Default)]
pub struct DismissalRegistry {
    entries: Mutex<HashMap<Identity, DismissHandle>>,
    last_position: Mutex<Option<(String, String)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DismissalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static DismissalRegistry {
        &GLOBAL
    }

    pub fn is_registered(&self, identity: Identity) -> bool {
        lock(&self.entries).contains_key(&identity)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Signal one registered picker and drop its registration.
    /// Returns false if `identity` was not registered.
    pub fn dismiss(&self, identity: Identity) -> bool {
        let handle = lock(&self.entries).remove(&identity);
        match handle {
            Some(handle) => {
                debug!("dismissing {}", identity);
                handle.signal(identity);
                true
            }
            None => false,
        }
    }

    /// Outside click: signal every registered picker, then clear.
    /// Returns how many pickers were signalled.
    pub fn dismiss_all(&self) -> usize {
        let drained: Vec<(Identity, DismissHandle)> = lock(&self.entries).drain().collect();

        for (identity, handle) in &drained {
            debug!("dismissing {} on outside click", identity);
            handle.signal(*identity);
        }

        drained.len()
    }

    /// The most recent positioning request as (anchor, popup) element ids.
    pub fn last_position_request(&self) -> Option<(String, String)> {
        lock(&self.last_position).clone()
    }
}

impl PopupBridge for DismissalRegistry {
    fn register(&self, identity: Identity, handle: DismissHandle) {
        debug!("registering {}", identity);
        lock(&self.entries).insert(identity, handle);
    }

    fn unregister(&self, identity: Identity) {
        if lock(&self.entries).remove(&identity).is_some() {
            debug!("unregistered {}", identity);
        }
    }

    fn position_popup(&self, anchor_element_id: &str, popup_element_id: &str) {
        debug!("positioning {} at {}", popup_element_id, anchor_element_id);
        *lock(&self.last_position) =
            Some((anchor_element_id.to_string(), popup_element_id.to_string()));
    }
}

impl PopupBridge for &'static DismissalRegistry {
    fn register(&self, identity: Identity, handle: DismissHandle) {
        (**self).register(identity, handle)
    }

    fn unregister(&self, identity: Identity) {
        (**self).unregister(identity)
    }

    fn position_popup(&self, anchor_element_id: &str, popup_element_id: &str) {
        (**self).position_popup(anchor_element_id, popup_element_id)
    }
}
