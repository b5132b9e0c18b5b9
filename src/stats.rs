//! Session statistics
//!
//! Listens on a sequencer's bus and builds the one-line record for a
//! finished non-tutorial session. Storing the record is up to the embedder.

use serde::{Deserialize, Serialize};

use crate::difficulty::Tier;
use crate::sim::events::{CoreEvent, EventRecord, EventSink};

/// Summary of one completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub participant_id: u32,
    pub difficulty: Option<Tier>,
    /// Seconds from route start to return
    pub elapsed: f64,
    pub obstacle_hits: u32,
    pub pad_timeouts: u32,
}

impl std::fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let difficulty = self.difficulty.map_or("None", |t| t.as_str());
        write!(
            f,
            "Participant: {}, Difficulty: {}, Time: {:.2}, Obstacles Hit: {}, Pad Timeouts: {}",
            self.participant_id, difficulty, self.elapsed, self.obstacle_hits, self.pad_timeouts
        )
    }
}

/// Next participant id: one past the last issued id, else one past the
/// number of stored records, else 1
pub fn next_participant_id(last_id: Option<u32>, stored_records: usize) -> u32 {
    match last_id {
        Some(id) => id.saturating_add(1),
        None => u32::try_from(stored_records).map_or(u32::MAX, |n| n.saturating_add(1)),
    }
}

#[derive(Debug, Clone)]
pub struct SessionStats {
    pub participant_id: u32,
    pub difficulty: Option<Tier>,
    pub obstacle_hits: u32,
    pub pad_timeouts: u32,
    in_tutorial: bool,
    started_at: Option<f64>,
    record: Option<SessionRecord>,
}

impl SessionStats {
    pub fn new(participant_id: u32) -> Self {
        Self {
            participant_id,
            difficulty: None,
            obstacle_hits: 0,
            pad_timeouts: 0,
            in_tutorial: true,
            started_at: None,
            record: None,
        }
    }

    /// Timer running and session not yet finished
    pub fn is_running(&self) -> bool {
        !self.in_tutorial && self.started_at.is_some() && self.record.is_none()
    }

    /// The finished session, once the return trip completes
    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    fn finish(&mut self, at: f64) {
        let Some(started) = self.started_at else {
            return;
        };
        let record = SessionRecord {
            participant_id: self.participant_id,
            difficulty: self.difficulty,
            elapsed: at - started,
            obstacle_hits: self.obstacle_hits,
            pad_timeouts: self.pad_timeouts,
        };
        log::info!("Session data: {}", record);
        self.record = Some(record);
    }
}

impl EventSink for SessionStats {
    fn on_event(&mut self, record: &EventRecord) {
        match record.event {
            CoreEvent::DifficultySelected { tier } => {
                if self.record.is_none() {
                    self.in_tutorial = false;
                    self.difficulty = Some(tier);
                }
            }
            CoreEvent::RouteStarted { .. } => {
                if !self.in_tutorial && self.started_at.is_none() {
                    log::info!("[Session {}] Timer started", self.participant_id);
                    self.started_at = Some(record.time);
                }
            }
            CoreEvent::PadFailed { .. } => {
                if self.is_running() {
                    self.pad_timeouts += 1;
                    log::info!("Pad timeout! Total: {}", self.pad_timeouts);
                }
            }
            CoreEvent::ObstacleHit => {
                if self.is_running() {
                    self.obstacle_hits += 1;
                    log::info!("Obstacle hit! Total: {}", self.obstacle_hits);
                }
            }
            CoreEvent::RouteReturnComplete { .. } => {
                if self.is_running() {
                    self.finish(record.time);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(stats: &mut SessionStats, time: f64, event: CoreEvent) {
        stats.on_event(&EventRecord { time, event });
    }

    #[test]
    fn test_tutorial_is_not_counted() {
        let mut stats = SessionStats::new(7);
        feed(&mut stats, 0.0, CoreEvent::RouteStarted { route: 0 });
        feed(&mut stats, 1.0, CoreEvent::ObstacleHit);
        feed(&mut stats, 2.0, CoreEvent::PadFailed { step: 1 });
        feed(&mut stats, 3.0, CoreEvent::RouteReturnComplete { route: 0 });
        assert!(!stats.is_running());
        assert_eq!(stats.obstacle_hits, 0);
        assert_eq!(stats.pad_timeouts, 0);
        assert!(stats.record().is_none());
    }

    #[test]
    fn test_session_record() {
        let mut stats = SessionStats::new(3);
        feed(&mut stats, 10.0, CoreEvent::DifficultySelected { tier: Tier::Medium });
        feed(&mut stats, 10.0, CoreEvent::RouteStarted { route: 2 });
        feed(&mut stats, 12.0, CoreEvent::ObstacleHit);
        feed(&mut stats, 15.0, CoreEvent::PadFailed { step: 1 });
        feed(&mut stats, 16.0, CoreEvent::PadFailed { step: 1 });
        feed(&mut stats, 32.5, CoreEvent::RouteReturnComplete { route: 2 });

        let record = stats.record().unwrap();
        assert_eq!(record.elapsed, 22.5);
        assert_eq!(
            record.to_string(),
            "Participant: 3, Difficulty: Medium, Time: 22.50, Obstacles Hit: 1, Pad Timeouts: 2"
        );

        // Nothing counts after the session ends
        feed(&mut stats, 40.0, CoreEvent::ObstacleHit);
        assert_eq!(stats.obstacle_hits, 1);
    }

    #[test]
    fn test_timer_starts_once() {
        let mut stats = SessionStats::new(1);
        feed(&mut stats, 5.0, CoreEvent::DifficultySelected { tier: Tier::Hard });
        feed(&mut stats, 5.0, CoreEvent::RouteStarted { route: 3 });
        feed(&mut stats, 9.0, CoreEvent::RouteStarted { route: 3 });
        feed(&mut stats, 20.0, CoreEvent::RouteReturnComplete { route: 3 });
        assert_eq!(stats.record().unwrap().elapsed, 15.0);
    }

    #[test]
    fn test_next_participant_id() {
        assert_eq!(next_participant_id(Some(41), 3), 42);
        assert_eq!(next_participant_id(None, 3), 4);
        assert_eq!(next_participant_id(None, 0), 1);
        assert_eq!(next_participant_id(Some(u32::MAX), 0), u32::MAX);
    }
}
