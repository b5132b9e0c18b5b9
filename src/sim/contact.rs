//! Dual-contact debouncing
//!
//! Turns two raw foot-contact booleans into a latched "engaged" level and a
//! one-shot confirmation once engagement has been held for the hold duration.

use serde::{Deserialize, Serialize};

/// Which foot a contact signal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Change of the latched engaged level observed during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngageEdge {
    Engaged,
    Released,
}

/// Result of one debouncer update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStep {
    pub edge: Option<EngageEdge>,
    /// Hold completed this update (fires once per engagement episode)
    pub confirmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDebouncer {
    left: bool,
    right: bool,
    /// Engaged level as of the last update
    engaged: bool,
    /// Time held in the current episode; `None` once confirmed or released
    hold: Option<f32>,
    pub hold_duration: f32,
}

impl ContactDebouncer {
    pub fn new(hold_duration: f32) -> Self {
        Self {
            left: false,
            right: false,
            engaged: false,
            hold: None,
            hold_duration,
        }
    }

    /// Record a raw contact level; takes effect on the next update
    pub fn on_contact_change(&mut self, side: Side, present: bool) {
        match side {
            Side::Left => self.left = present,
            Side::Right => self.right = present,
        }
    }

    pub fn contact(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Latched engaged level (both feet down as of the last update)
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Time held so far in a running episode
    pub fn hold_elapsed(&self) -> Option<f32> {
        self.hold
    }

    /// Latch the raw contacts, then advance the hold timer by `dt`.
    ///
    /// Contacts that flicker between two updates are collapsed into their
    /// final level, so a release and re-press inside one tick is no edge.
    pub fn update(&mut self, dt: f32) -> DebounceStep {
        let mut step = DebounceStep::default();

        let now = self.left && self.right;
        if now != self.engaged {
            self.engaged = now;
            if now {
                self.hold = Some(0.0);
                step.edge = Some(EngageEdge::Engaged);
            } else {
                self.hold = None;
                step.edge = Some(EngageEdge::Released);
            }
        }

        if let Some(held) = self.hold.as_mut() {
            *held += dt;
            if *held >= self.hold_duration {
                self.hold = None;
                step.confirmed = true;
            }
        }

        step
    }

    /// Drop the latched level and any running hold, keeping raw contacts.
    ///
    /// Feet still on the target re-engage on the next update.
    pub fn disarm(&mut self) {
        self.engaged = false;
        self.hold = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 16.0;

    fn press_both(d: &mut ContactDebouncer) {
        d.on_contact_change(Side::Left, true);
        d.on_contact_change(Side::Right, true);
    }

    #[test]
    fn test_single_foot_never_engages() {
        let mut d = ContactDebouncer::new(1.0);
        d.on_contact_change(Side::Left, true);
        for _ in 0..64 {
            let step = d.update(DT);
            assert!(step.edge.is_none());
            assert!(!step.confirmed);
        }
        assert!(!d.is_engaged());
    }

    #[test]
    fn test_confirms_after_full_hold() {
        let mut d = ContactDebouncer::new(1.0);
        press_both(&mut d);

        let first = d.update(DT);
        assert_eq!(first.edge, Some(EngageEdge::Engaged));
        assert!(!first.confirmed);

        let confirmations = (1..16).filter(|_| d.update(DT).confirmed).count();
        assert_eq!(confirmations, 1);
        assert!(d.hold_elapsed().is_none());

        // One-shot: holding longer doesn't fire again
        assert!((0..64).all(|_| !d.update(DT).confirmed));
    }

    #[test]
    fn test_release_just_before_hold_does_not_confirm() {
        let mut d = ContactDebouncer::new(1.0);
        press_both(&mut d);
        for _ in 0..15 {
            assert!(!d.update(DT).confirmed);
        }
        d.on_contact_change(Side::Right, false);
        let step = d.update(DT);
        assert_eq!(step.edge, Some(EngageEdge::Released));
        assert!(!step.confirmed);
    }

    #[test]
    fn test_rearms_on_next_engagement() {
        let mut d = ContactDebouncer::new(1.0);
        press_both(&mut d);
        for _ in 0..8 {
            d.update(DT);
        }
        d.on_contact_change(Side::Left, false);
        d.update(DT);

        d.on_contact_change(Side::Left, true);
        let confirmed_at = (1..=16).find(|_| d.update(DT).confirmed);
        assert_eq!(confirmed_at, Some(16));
    }

    #[test]
    fn test_flicker_within_one_tick_is_collapsed() {
        let mut d = ContactDebouncer::new(1.0);
        press_both(&mut d);
        for _ in 0..10 {
            d.update(DT);
        }
        d.on_contact_change(Side::Left, false);
        d.on_contact_change(Side::Left, true);
        let step = d.update(DT);
        assert!(step.edge.is_none());
        assert_eq!(d.hold_elapsed(), Some(11.0 * DT));
    }

    #[test]
    fn test_disarm_reengages_standing_feet() {
        let mut d = ContactDebouncer::new(1.0);
        press_both(&mut d);
        d.update(DT);
        d.disarm();
        assert!(!d.is_engaged());
        assert_eq!(d.update(DT).edge, Some(EngageEdge::Engaged));
    }

    proptest! {
        #[test]
        fn confirmation_requires_continuous_hold(
            levels in prop::collection::vec((any::<bool>(), any::<bool>()), 1..200)
        ) {
            let mut d = ContactDebouncer::new(1.0);
            let mut run = 0u32;
            for (left, right) in levels {
                d.on_contact_change(Side::Left, left);
                d.on_contact_change(Side::Right, right);
                let step = d.update(DT);
                run = if left && right { run + 1 } else { 0 };
                prop_assert_eq!(step.confirmed, run == 16);
            }
        }
    }
}
