//! Lily Route - route-progression engine for a stepping-pad exercise
//!
//! Core modules:
//! - `sim`: Tick-driven pad automatons and the route sequencer
//! - `difficulty`: Tiers and the max-stand-time policy
//! - `tuning`: Data-driven course layout and timing
//! - `stats`: Session statistics collaborator

pub mod difficulty;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use difficulty::{Tier, max_stand_time};
pub use stats::{SessionRecord, SessionStats};
pub use tuning::{ConfigError, CourseConfig, FailurePolicy};

/// Engine configuration constants
pub mod consts {
    /// Fixed update step (90 Hz headset refresh)
    pub const SIM_DT: f32 = 1.0 / 90.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Both feet must stay down this long to confirm a target
    pub const BUFFER_DURATION: f32 = 1.0;
    /// Shake window before an unstable pad fails
    pub const WARNING_DURATION: f32 = 1.0;
    /// Sink animation length
    pub const SINK_DURATION: f32 = 1.0;

    /// Distance between consecutive pads on the default course (metres)
    pub const DEFAULT_PAD_SPACING: f32 = 0.6;
}
