//! Per-frame update
//!
//! One pass per frame with a single shared `dt`. Order within a tick:
//! commands, then raw contact levels, then every timer, then the signals
//! those timers raised. Signals are collected before any is handled, so a pad
//! raised mid-tick first runs on the following tick.

use serde::{Deserialize, Serialize};

use super::contact::Side;
use super::events::EventRecord;
use super::sequencer::RouteSequencer;
use crate::difficulty::Tier;

/// What a contact report refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactTarget {
    Pad { route: usize, step: usize },
    StartMarker,
    Selector(Tier),
}

/// One raw foot-contact change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInput {
    pub target: ContactTarget,
    pub side: Side,
    pub present: bool,
}

impl ContactInput {
    /// Both feet placed on or lifted off a target
    pub fn both(target: ContactTarget, present: bool) -> [ContactInput; 2] {
        [Side::Left, Side::Right].map(|side| ContactInput {
            target,
            side,
            present,
        })
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Contact changes in arrival order
    pub contacts: Vec<ContactInput>,
    pub begin_route: Option<usize>,
    pub select_difficulty: Option<Tier>,
    /// Collisions reported by the obstacle collaborator this tick
    pub obstacle_hits: u32,
    /// Rise animation finished for these pads
    pub finished_emerging: Vec<(usize, usize)>,
}

/// Advance the sequencer by one frame and return the events it emitted
pub fn tick(seq: &mut RouteSequencer, input: &TickInput, dt: f32) -> Vec<EventRecord> {
    seq.advance_clock(dt);

    if let Some(route) = input.begin_route {
        seq.begin_route(route);
    }
    if let Some(tier) = input.select_difficulty {
        seq.select_difficulty(tier);
    }
    for _ in 0..input.obstacle_hits {
        seq.register_obstacle_hit();
    }

    for contact in &input.contacts {
        apply_contact(seq, contact);
    }
    for &(route, step) in &input.finished_emerging {
        if let Some(pad) = seq.pad_mut(route, step) {
            pad.finish_emerging();
        }
    }

    let reports = seq.advance_pads(dt);
    let marker_stepped = seq.start_marker.advance(dt);
    let selected = seq.selectors.advance(dt);

    for report in reports {
        seq.on_pad_signal(report);
    }
    if marker_stepped {
        seq.on_start_marker_stepped();
    }
    if let Some(tier) = selected {
        seq.select_difficulty(tier);
    }

    seq.drain_events()
}

fn apply_contact(seq: &mut RouteSequencer, contact: &ContactInput) {
    match contact.target {
        ContactTarget::Pad { route, step } => match seq.pad_mut(route, step) {
            Some(pad) => pad.on_contact_change(contact.side, contact.present),
            None => log::warn!("Contact for unknown pad {}/{} ignored", route, step),
        },
        ContactTarget::StartMarker => seq
            .start_marker
            .on_contact_change(contact.side, contact.present),
        ContactTarget::Selector(tier) => {
            seq.selectors
                .on_contact_change(tier, contact.side, contact.present);
        }
    }
}
