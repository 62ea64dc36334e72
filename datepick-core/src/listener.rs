//! Change notification sinks.

use log::warn;
use tokio::sync::mpsc::UnboundedSender;

use crate::value::ComposedValue;

/// Receives every composed value the engine emits.
///
/// Delivery is fire-and-forget: the engine never waits on the listener and
/// does not depend on it succeeding.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, value: ComposedValue);
}

impl<F> ChangeListener for F
where
    F: Fn(ComposedValue) + Send + Sync,
{
    fn on_change(&self, value: ComposedValue) {
        self(value)
    }
}

impl ChangeListener for UnboundedSender<ComposedValue> {
    fn on_change(&self, value: ComposedValue) {
        if self.send(value).is_err() {
            warn!("change receiver dropped, discarding {}", value);
        }
    }
}

/// Listener that ignores every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ChangeListener for NoopListener {
    fn on_change(&self, _value: ComposedValue) {}
}
