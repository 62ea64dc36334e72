//! Per-instance identity tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token addressing one engine instance in the dismissal registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(Uuid);

impl Identity {
    pub fn new() -> Self {
        Identity(Uuid::new_v4())
    }

    /// Id of the input element the popup is anchored to.
    pub fn anchor_element_id(&self) -> String {
        format!("input-{}", self.0)
    }

    /// Id of the popup element.
    pub fn popup_element_id(&self) -> String {
        format!("popup-{}", self.0)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
