//! Difficulty selector pads
//!
//! One selector per selectable tier, revealed together after the tutorial or
//! a finished route. The first one held long enough wins and the whole bank
//! goes away, so a reveal yields at most one selection.

use serde::{Deserialize, Serialize};

use super::contact::{ContactDebouncer, Side};
use crate::difficulty::Tier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorPad {
    pub tier: Tier,
    contact: ContactDebouncer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorBank {
    pads: Vec<SelectorPad>,
    visible: bool,
}

impl SelectorBank {
    pub fn new(buffer_duration: f32) -> Self {
        Self {
            pads: Tier::SELECTABLE
                .iter()
                .map(|&tier| SelectorPad {
                    tier,
                    contact: ContactDebouncer::new(buffer_duration),
                })
                .collect(),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        for pad in &mut self.pads {
            pad.contact.disarm();
        }
    }

    /// Raw contact for one selector; unknown tiers are ignored
    pub fn on_contact_change(&mut self, tier: Tier, side: Side, present: bool) {
        if let Some(pad) = self.pads.iter_mut().find(|p| p.tier == tier) {
            pad.contact.on_contact_change(side, present);
        }
    }

    /// Tier whose selector is being held, if any
    pub fn engaged_tier(&self) -> Option<Tier> {
        self.pads
            .iter()
            .find(|p| p.contact.is_engaged())
            .map(|p| p.tier)
    }

    /// Advance one tick; returns the chosen tier and hides the bank
    pub fn advance(&mut self, dt: f32) -> Option<Tier> {
        if !self.visible {
            return None;
        }
        let chosen = self
            .pads
            .iter_mut()
            .map(|p| (p.tier, p.contact.update(dt).confirmed))
            .fold(None, |chosen, (tier, confirmed)| {
                chosen.or(confirmed.then_some(tier))
            });
        if let Some(tier) = chosen {
            log::info!("Selector {} held, hiding selector bank", tier);
            self.hide();
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.125;

    fn stand(bank: &mut SelectorBank, tier: Tier, present: bool) {
        bank.on_contact_change(tier, Side::Left, present);
        bank.on_contact_change(tier, Side::Right, present);
    }

    #[test]
    fn test_hidden_bank_selects_nothing() {
        let mut bank = SelectorBank::new(1.0);
        stand(&mut bank, Tier::Easy, true);
        assert!((0..16).all(|_| bank.advance(DT).is_none()));
    }

    #[test]
    fn test_selection_hides_bank() {
        let mut bank = SelectorBank::new(1.0);
        bank.show();
        stand(&mut bank, Tier::Hard, true);
        let chosen: Vec<_> = (0..16).filter_map(|_| bank.advance(DT)).collect();
        assert_eq!(chosen, vec![Tier::Hard]);
        assert!(!bank.is_visible());
    }

    #[test]
    fn test_first_held_selector_wins() {
        let mut bank = SelectorBank::new(1.0);
        bank.show();
        stand(&mut bank, Tier::Medium, true);
        for _ in 0..4 {
            bank.advance(DT);
        }
        assert_eq!(bank.engaged_tier(), Some(Tier::Medium));

        stand(&mut bank, Tier::Easy, true);
        let chosen: Vec<_> = (0..16).filter_map(|_| bank.advance(DT)).collect();
        assert_eq!(chosen, vec![Tier::Medium]);
    }

    #[test]
    fn test_tutorial_is_not_selectable() {
        let mut bank = SelectorBank::new(1.0);
        bank.show();
        stand(&mut bank, Tier::Tutorial, true);
        assert!((0..16).all(|_| bank.advance(DT).is_none()));
    }
}
