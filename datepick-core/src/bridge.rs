//! Seam between the engine and the UI runtime.
//!
//! Opening a popup registers the engine's identity for outside-click
//! dismissal and asks the runtime to position the popup. The engine only
//! knows this trait; storage of registrations belongs to the implementor.

use log::debug;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::identity::Identity;

pub trait PopupBridge: Send + Sync {
    fn register(&self, identity: Identity, handle: DismissHandle);

    fn unregister(&self, identity: Identity);

    fn position_popup(&self, anchor_element_id: &str, popup_element_id: &str);
}

/// Route back to the host for dismissal signals.
///
/// The bridge signals by sending the identity; the host drains the receiver
/// and forwards each identity to the matching engine's `dismissed`.
#[derive(Debug, Clone, Default)]
pub struct DismissHandle {
    tx: Option<UnboundedSender<Identity>>,
}

impl DismissHandle {
    pub fn channel() -> (DismissHandle, UnboundedReceiver<Identity>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DismissHandle { tx: Some(tx) }, rx)
    }

    /// A handle whose signals go nowhere.
    pub fn detached() -> Self {
        DismissHandle { tx: None }
    }

    /// Send a dismissal signal. Returns false if nobody is listening.
    pub fn signal(&self, identity: Identity) -> bool {
        match &self.tx {
            Some(tx) => tx.send(identity).is_ok(),
            None => false,
        }
    }
}

/// Bridge for engines running without a UI runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedBridge;

impl PopupBridge for DetachedBridge {
    fn register(&self, identity: Identity, _handle: DismissHandle) {
        debug!("detached bridge: register {}", identity);
    }

    fn unregister(&self, identity: Identity) {
        debug!("detached bridge: unregister {}", identity);
    }

    fn position_popup(&self, anchor_element_id: &str, popup_element_id: &str) {
        debug!("detached bridge: position {} at {}", popup_element_id, anchor_element_id);
    }
}
