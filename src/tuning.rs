//! Course configuration
//!
//! Data-driven timing and route layout. Loaded from JSON or built from
//! [`CourseConfig::default`], and validated once before a sequencer is built.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::difficulty::Tier;

/// Setup-time configuration faults
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("course has no routes")]
    NoRoutes,

    #[error("route {route} has no pads")]
    EmptyRoute { route: usize },

    #[error("course has no tutorial route")]
    NoTutorialRoute,

    #[error("tutorial routes must come first; route {route} breaks the block")]
    TutorialNotLeading { route: usize },

    #[error("tier {tier} has no route")]
    UnmappedTier { tier: Tier },

    #[error("{name} must be a finite non-negative number, got {value}")]
    InvalidDuration { name: &'static str, value: f32 },

    #[error("invalid course JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("can't serialize course: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// What the core does after a pad times out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Emit the failure and wait for a recovery command
    #[default]
    Hold,
    /// Raise the failed pad again
    RetryPad,
    /// Move on as if the pad had been confirmed
    Advance,
    /// Start the current route over from pad 0
    RestartRoute,
}

/// Where one pad sits on the floor plane (metres)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadPlacement {
    pub position: Vec2,
    /// Per-pad hold override; the course `buffer_duration` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_duration: Option<f32>,
}

/// One route: a tier and its pads in visiting order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub tier: Tier,
    pub pads: Vec<PadPlacement>,
}

/// Full course configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Continuous dual contact needed to confirm a pad, marker or selector
    pub buffer_duration: f32,
    /// Shake window between instability and failure
    pub warning_duration: f32,
    /// Rise time before a pad is armed
    pub emerge_duration: f32,
    /// Sink time before a pad is inactive again
    pub sink_duration: f32,
    /// Whether pads time out at all
    pub enable_instability: bool,
    pub failure_policy: FailurePolicy,
    pub start_marker: Vec2,
    /// Tutorial routes first, then the tier routes
    pub routes: Vec<RouteConfig>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        let line = |x: f32| RouteConfig {
            tier: Tier::Tutorial,
            pads: (1..=3)
                .map(|i| PadPlacement {
                    position: Vec2::new(x, i as f32 * DEFAULT_PAD_SPACING),
                    buffer_duration: None,
                })
                .collect(),
        };

        let mut routes = vec![line(0.0), line(-0.4), line(0.0), line(0.4)];
        routes[1].tier = Tier::Easy;
        routes[2].tier = Tier::Medium;
        routes[3].tier = Tier::Hard;

        Self {
            buffer_duration: BUFFER_DURATION,
            warning_duration: WARNING_DURATION,
            emerge_duration: 0.0,
            sink_duration: SINK_DURATION,
            enable_instability: true,
            failure_policy: FailurePolicy::Hold,
            start_marker: Vec2::ZERO,
            routes,
        }
    }
}

impl CourseConfig {
    /// Parse and validate a course from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check the course for faults that would leave the sequencer stuck
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("buffer_duration", self.buffer_duration),
            ("warning_duration", self.warning_duration),
            ("emerge_duration", self.emerge_duration),
            ("sink_duration", self.sink_duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { name, value });
            }
        }
        let overrides = self
            .routes
            .iter()
            .flat_map(|r| &r.pads)
            .filter_map(|p| p.buffer_duration);
        for value in overrides {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration {
                    name: "pad buffer_duration",
                    value,
                });
            }
        }

        if self.routes.is_empty() {
            return Err(ConfigError::NoRoutes);
        }
        if let Some(route) = self.routes.iter().position(|r| r.pads.is_empty()) {
            return Err(ConfigError::EmptyRoute { route });
        }

        let tutorials = self.tutorial_route_count();
        if tutorials == 0 {
            return Err(ConfigError::NoTutorialRoute);
        }
        if let Some(route) = self.routes[tutorials..]
            .iter()
            .position(|r| r.tier == Tier::Tutorial)
        {
            return Err(ConfigError::TutorialNotLeading {
                route: route + tutorials,
            });
        }

        for tier in Tier::SELECTABLE {
            if self.route_for_tier(tier).is_none() {
                return Err(ConfigError::UnmappedTier { tier });
            }
        }
        Ok(())
    }

    /// Number of leading tutorial routes
    pub fn tutorial_route_count(&self) -> usize {
        self.routes
            .iter()
            .take_while(|r| r.tier == Tier::Tutorial)
            .count()
    }

    /// Fixed tier → route table (first route of the tier)
    pub fn route_for_tier(&self, tier: Tier) -> Option<usize> {
        self.routes.iter().position(|r| r.tier == tier)
    }
}
