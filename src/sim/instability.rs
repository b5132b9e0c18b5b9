//! Dwell-time instability timer
//!
//! Runs beside the debouncer: standing on a pad for too long turns it
//! unstable, and an unstable pad always fails once the warning window ends.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum Stage {
    Stable,
    Warning { elapsed: f32 },
    Expired,
}

/// Outcome of one timer update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instability {
    /// Nothing changed this update
    Steady,
    /// Dwell crossed the stand limit; the warning window starts now
    WarningStarted,
    /// Warning window ran out
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstabilityTimer {
    dwell: f32,
    stage: Stage,
    pub warning_duration: f32,
    pub enabled: bool,
}

impl InstabilityTimer {
    pub fn new(warning_duration: f32, enabled: bool) -> Self {
        Self {
            dwell: 0.0,
            stage: Stage::Stable,
            warning_duration,
            enabled,
        }
    }

    /// Continuous engaged time in the current episode
    pub fn dwell(&self) -> f32 {
        self.dwell
    }

    pub fn in_warning(&self) -> bool {
        matches!(self.stage, Stage::Warning { .. })
    }

    pub fn is_expired(&self) -> bool {
        self.stage == Stage::Expired
    }

    /// Advance by `dt`.
    ///
    /// While stable, dwell accumulates when `engaged` and resets otherwise.
    /// Once warning, `engaged` is ignored and the window runs to failure.
    pub fn update(&mut self, engaged: bool, dt: f32, max_stand_time: f32) -> Instability {
        match self.stage {
            Stage::Warning { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.warning_duration {
                    self.stage = Stage::Expired;
                    Instability::Failed
                } else {
                    self.stage = Stage::Warning { elapsed };
                    Instability::Steady
                }
            }
            Stage::Expired => Instability::Steady,
            Stage::Stable => {
                if !engaged {
                    self.dwell = 0.0;
                    return Instability::Steady;
                }
                if !self.enabled {
                    return Instability::Steady;
                }
                self.dwell += dt;
                if self.dwell >= max_stand_time {
                    self.stage = Stage::Warning { elapsed: 0.0 };
                    Instability::WarningStarted
                } else {
                    Instability::Steady
                }
            }
        }
    }

    /// Stop everything (pad deactivated or re-raised)
    pub fn halt(&mut self) {
        self.dwell = 0.0;
        self.stage = Stage::Stable;
    }
}
