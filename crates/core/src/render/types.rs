//! Ticket descriptor.

use serde::{Deserialize, Serialize};

/// One record to render. Immutable once handed to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDescriptor {
    /// Opaque string encoded into the QR code.
    pub payload: String,
    /// Category label used to pick the template.
    #[serde(default)]
    pub zone: Option<String>,
    /// Attendee name, used for the archive entry name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Position in the submitted list.
    pub sequence_number: u64,
}

impl TicketDescriptor {
    pub fn new(payload: impl Into<String>, sequence_number: u64) -> Self {
        Self {
            payload: payload.into(),
            zone: None,
            display_name: None,
            sequence_number,
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
