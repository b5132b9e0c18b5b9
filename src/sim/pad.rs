//! Pad lifecycle automaton
//!
//! Each pad owns its debouncer and instability timer and knows only its own
//! `step_index`. The sequencer raises and lowers pads; everything between is
//! driven by contact and time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contact::{ContactDebouncer, EngageEdge, Side};
use super::instability::{Instability, InstabilityTimer};
use crate::tuning::CourseConfig;

/// Lifecycle phase of one pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadPhase {
    /// Not in play
    Inactive,
    /// Rising; becomes armed when the rise completes
    Emerging,
    /// Up and waiting for both feet
    Armed,
    /// Both feet down, hold timer running
    Buffering,
    /// Held long enough; still raised and still timing dwell
    Confirmed,
    /// Stood on too long; shaking before failure
    Warning,
    /// Timed out (terminal for this activation)
    Failed,
    /// Going down
    Sinking,
}

impl PadPhase {
    /// Phase of a pad that has not resolved this activation
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            PadPhase::Emerging | PadPhase::Armed | PadPhase::Buffering | PadPhase::Warning
        )
    }
}

/// Something the sequencer has to hear about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadSignal {
    Confirmed,
    Warning,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pad {
    pub step_index: usize,
    pub position: Vec2,
    phase: PadPhase,
    contact: ContactDebouncer,
    stability: InstabilityTimer,
    /// Confirmed during this activation; later overstay no longer counts
    resolved: bool,
    /// Progress through the current emerge/sink transition (seconds)
    transition: f32,
    emerge_duration: f32,
    sink_duration: f32,
}

impl Pad {
    pub fn new(step_index: usize, position: Vec2, config: &CourseConfig) -> Self {
        Self {
            step_index,
            position,
            phase: PadPhase::Inactive,
            contact: ContactDebouncer::new(config.buffer_duration),
            stability: InstabilityTimer::new(config.warning_duration, config.enable_instability),
            resolved: false,
            transition: 0.0,
            emerge_duration: config.emerge_duration,
            sink_duration: config.sink_duration,
        }
    }

    /// Override the course-wide hold needed to confirm this pad
    pub fn with_buffer_duration(mut self, buffer_duration: f32) -> Self {
        self.contact.hold_duration = buffer_duration;
        self
    }

    pub fn phase(&self) -> PadPhase {
        self.phase
    }

    /// Raised and awaiting confirmation or failure
    pub fn is_pending(&self) -> bool {
        !self.resolved && self.phase.is_pending()
    }

    pub fn dwell_time(&self) -> f32 {
        self.stability.dwell()
    }

    /// Both feet down as of the last tick
    pub fn is_engaged(&self) -> bool {
        self.contact.is_engaged()
    }

    pub fn contact(&self, side: Side) -> bool {
        self.contact.contact(side)
    }

    /// Raw contact report; the pad tracks feet even while not in play
    pub fn on_contact_change(&mut self, side: Side, present: bool) {
        self.contact.on_contact_change(side, present);
    }

    /// Raise the pad (sequencer only). Re-raising restarts the activation.
    pub fn activate(&mut self) {
        log::debug!("pad {}: {:?} -> Emerging", self.step_index, self.phase);
        self.contact.disarm();
        self.stability.halt();
        self.resolved = false;
        self.transition = 0.0;
        self.phase = PadPhase::Emerging;
    }

    /// Lower the pad (sequencer only). Halts both timers immediately.
    pub fn deactivate(&mut self) {
        if matches!(self.phase, PadPhase::Inactive | PadPhase::Sinking) {
            return;
        }
        self.begin_sinking();
    }

    /// External signal that the rise animation has finished
    pub fn finish_emerging(&mut self) {
        if self.phase == PadPhase::Emerging {
            self.arm();
        }
    }

    fn arm(&mut self) {
        log::debug!("pad {}: Emerging -> Armed", self.step_index);
        self.phase = PadPhase::Armed;
    }

    fn begin_sinking(&mut self) {
        log::debug!("pad {}: {:?} -> Sinking", self.step_index, self.phase);
        self.contact.disarm();
        self.stability.halt();
        self.transition = 0.0;
        self.phase = PadPhase::Sinking;
    }

    /// Advance one tick. Contact edges are latched before dwell is
    /// evaluated, and a warning that starts this tick beats a confirmation.
    pub fn advance(&mut self, dt: f32, max_stand_time: f32) -> Option<PadSignal> {
        match self.phase {
            PadPhase::Inactive => None,
            PadPhase::Confirmed => {
                // Still raised until the sequencer lowers it
                self.contact.update(dt);
                self.check_stability(dt, max_stand_time)
            }
            PadPhase::Failed => {
                self.begin_sinking();
                None
            }
            PadPhase::Sinking => {
                self.transition += dt;
                if self.transition >= self.sink_duration {
                    log::debug!("pad {}: Sinking -> Inactive", self.step_index);
                    self.phase = PadPhase::Inactive;
                }
                None
            }
            PadPhase::Warning => {
                // Keep latching contact so feet are known when the pad returns
                self.contact.update(dt);
                match self.stability.update(false, dt, max_stand_time) {
                    Instability::Failed => {
                        log::debug!("pad {}: Warning -> Failed", self.step_index);
                        self.phase = PadPhase::Failed;
                        Some(PadSignal::Failed)
                    }
                    _ => None,
                }
            }
            PadPhase::Emerging => {
                self.transition += dt;
                if self.transition < self.emerge_duration {
                    return None;
                }
                self.arm();
                self.advance_engagement(dt, max_stand_time)
            }
            PadPhase::Armed | PadPhase::Buffering => self.advance_engagement(dt, max_stand_time),
        }
    }

    fn advance_engagement(&mut self, dt: f32, max_stand_time: f32) -> Option<PadSignal> {
        let step = self.contact.update(dt);
        match step.edge {
            Some(EngageEdge::Engaged) => self.phase = PadPhase::Buffering,
            Some(EngageEdge::Released) => self.phase = PadPhase::Armed,
            None => {}
        }

        if let Some(signal) = self.check_stability(dt, max_stand_time) {
            return Some(signal);
        }

        if step.confirmed {
            log::debug!("pad {}: Buffering -> Confirmed", self.step_index);
            self.phase = PadPhase::Confirmed;
            self.resolved = true;
            return Some(PadSignal::Confirmed);
        }
        None
    }

    fn check_stability(&mut self, dt: f32, max_stand_time: f32) -> Option<PadSignal> {
        if self.stability.update(self.contact.is_engaged(), dt, max_stand_time)
            != Instability::WarningStarted
        {
            return None;
        }
        log::debug!("pad {}: {:?} -> Warning", self.step_index, self.phase);
        self.phase = PadPhase::Warning;
        Some(PadSignal::Warning)
    }
}
