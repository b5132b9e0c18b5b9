//! Start/return marker
//!
//! Same hold contract as a pad, without lifecycle or instability. The marker
//! only reports that it was held long enough; whether that starts a route or
//! closes a round trip is the sequencer's call.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contact::{ContactDebouncer, Side};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartMarker {
    pub position: Vec2,
    contact: ContactDebouncer,
    visible: bool,
}

impl StartMarker {
    pub fn new(position: Vec2, buffer_duration: f32) -> Self {
        Self {
            position,
            contact: ContactDebouncer::new(buffer_duration),
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hide the marker; a running hold is dropped
    pub fn hide(&mut self) {
        self.visible = false;
        self.contact.disarm();
    }

    pub fn on_contact_change(&mut self, side: Side, present: bool) {
        self.contact.on_contact_change(side, present);
    }

    pub fn is_engaged(&self) -> bool {
        self.contact.is_engaged()
    }

    /// Advance one tick; true when the marker was held long enough
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.visible {
            return false;
        }
        self.contact.update(dt).confirmed
    }
}
