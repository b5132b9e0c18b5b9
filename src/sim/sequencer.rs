//! Route sequencer
//!
//! The only component with cross-pad knowledge. It owns the routes, the start
//! marker and the selector bank, keeps the step cursor, and turns pad
//! signals into route progress. Pads report their own `step_index`; anything
//! that doesn't match the cursor is stale and dropped.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{CoreEvent, EventBus, EventRecord, EventSink};
use super::pad::{Pad, PadPhase, PadSignal};
use super::selector::SelectorBank;
use super::start_pad::StartMarker;
use crate::difficulty::{Tier, max_stand_time};
use crate::tuning::{ConfigError, CourseConfig, FailurePolicy};

/// Where the participant is in the current round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutePhase {
    /// Waiting on the start marker
    AwaitingStart,
    /// Walking the pads; the cursor names the pending pad
    Forward,
    /// All pads done, walking back to the start marker
    AwaitingReturn,
    /// Selector bank revealed, waiting for a tier
    AwaitingSelection,
}

/// Per-playthrough state, mutated only by the sequencer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub current_route_index: usize,
    /// Cursor into the active route, `0..=route.len()`
    pub current_step_index: usize,
    pub difficulty: Option<Tier>,
    pub is_tutorial: bool,
    pub phase: RoutePhase,
    /// Cursor pad failed and no recovery has happened yet
    pub failure_pending: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            current_route_index: 0,
            current_step_index: 0,
            difficulty: None,
            is_tutorial: true,
            phase: RoutePhase::AwaitingStart,
            failure_pending: false,
        }
    }

    pub fn is_returning(&self) -> bool {
        self.phase == RoutePhase::AwaitingReturn
    }
}

/// An ordered, fixed-length run of pads for one tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub tier: Tier,
    pub pads: Vec<Pad>,
}

impl Route {
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

/// A signal raised by one pad during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadReport {
    pub route: usize,
    pub step: usize,
    pub signal: PadSignal,
}

#[derive(Debug)]
pub struct RouteSequencer {
    routes: Vec<Route>,
    session: Session,
    pub(crate) start_marker: StartMarker,
    pub(crate) selectors: SelectorBank,
    bus: EventBus,
    failure_policy: FailurePolicy,
    tutorial_routes: usize,
    /// Fixed tier → route table
    tier_routes: Vec<(Tier, usize)>,
    /// Session clock in seconds
    clock: f64,
}

impl RouteSequencer {
    /// Build a sequencer from a validated course
    pub fn new(config: &CourseConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let routes = config
            .routes
            .iter()
            .map(|route| Route {
                tier: route.tier,
                pads: route
                    .pads
                    .iter()
                    .enumerate()
                    .map(|(i, placement)| {
                        let pad = Pad::new(i, placement.position, config);
                        match placement.buffer_duration {
                            Some(buffer) => pad.with_buffer_duration(buffer),
                            None => pad,
                        }
                    })
                    .collect(),
            })
            .collect();

        let tier_routes = Tier::SELECTABLE
            .iter()
            .filter_map(|&tier| config.route_for_tier(tier).map(|r| (tier, r)))
            .collect();

        log::info!(
            "Course ready: {} routes ({} tutorial)",
            config.routes.len(),
            config.tutorial_route_count()
        );

        Ok(Self {
            routes,
            session: Session::new(),
            start_marker: StartMarker::new(config.start_marker, config.buffer_duration),
            selectors: SelectorBank::new(config.buffer_duration),
            bus: EventBus::new(),
            failure_policy: config.failure_policy,
            tutorial_routes: config.tutorial_route_count(),
            tier_routes,
            clock: 0.0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn pad(&self, route: usize, step: usize) -> Option<&Pad> {
        self.routes.get(route).and_then(|r| r.pads.get(step))
    }

    pub(crate) fn pad_mut(&mut self, route: usize, step: usize) -> Option<&mut Pad> {
        self.routes.get_mut(route).and_then(|r| r.pads.get_mut(step))
    }

    pub fn start_marker(&self) -> &StartMarker {
        &self.start_marker
    }

    pub fn selectors(&self) -> &SelectorBank {
        &self.selectors
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.bus.subscribe(sink);
    }

    /// Events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.bus.drain()
    }

    /// Stand limit for the current tier, queried every tick
    pub fn max_stand_time(&self) -> f32 {
        max_stand_time(self.session.difficulty)
    }

    /// Where the participant should head next: the pending pad while walking
    /// forward, the start marker otherwise
    pub fn next_target_position(&self) -> Vec2 {
        if self.session.phase == RoutePhase::Forward {
            if let Some(pad) = self.pad(self.session.current_route_index, self.session.current_step_index)
            {
                return pad.position;
            }
        }
        self.start_marker.position
    }

    /// Pads currently raised and unresolved, across every route
    pub fn pending_pads(&self) -> impl Iterator<Item = (usize, &Pad)> + '_ {
        self.routes.iter().enumerate().flat_map(|(r, route)| {
            route
                .pads
                .iter()
                .filter(|p| p.is_pending())
                .map(move |p| (r, p))
        })
    }

    fn emit(&mut self, event: CoreEvent) {
        self.bus.emit(self.clock, event);
    }

    pub(crate) fn advance_clock(&mut self, dt: f32) {
        self.clock += f64::from(dt);
    }

    /// Start a route from pad 0. Out-of-range indices are ignored.
    pub fn begin_route(&mut self, route_index: usize) {
        let Some(route) = self.routes.get(route_index) else {
            log::warn!(
                "begin_route({}) ignored: only {} routes",
                route_index,
                self.routes.len()
            );
            return;
        };
        let tier = route.tier;

        for pad in self.routes.iter_mut().flat_map(|r| r.pads.iter_mut()) {
            pad.deactivate();
        }

        self.session.current_route_index = route_index;
        self.session.current_step_index = 0;
        self.session.is_tutorial = tier == Tier::Tutorial;
        self.session.phase = RoutePhase::Forward;
        self.session.failure_pending = false;

        self.selectors.hide();
        if tier != Tier::Tutorial {
            self.start_marker.hide();
        }
        self.routes[route_index].pads[0].activate();

        log::info!("Route {} ({}) started", route_index, tier);
        self.emit(CoreEvent::RouteStarted { route: route_index });
    }

    /// Pick a tier and start its route. Works at any time, including
    /// mid-tutorial, and always restarts from pad 0.
    pub fn select_difficulty(&mut self, tier: Tier) {
        let Some(&(_, route_index)) = self.tier_routes.iter().find(|(t, _)| *t == tier) else {
            log::warn!("select_difficulty({}) ignored: tier has no route", tier);
            return;
        };

        if self.session.phase == RoutePhase::Forward {
            log::warn!(
                "Difficulty {} selected mid-route; abandoning route {}",
                tier,
                self.session.current_route_index
            );
        }

        self.session.difficulty = Some(tier);
        self.session.is_tutorial = false;
        log::info!("Difficulty selected: {}", tier);
        self.emit(CoreEvent::DifficultySelected { tier });
        self.begin_route(route_index);
    }

    fn is_cursor(&self, route: usize, step: usize) -> bool {
        self.session.phase == RoutePhase::Forward
            && route == self.session.current_route_index
            && step == self.session.current_step_index
    }

    /// Dispatch a signal from one pad
    pub fn on_pad_signal(&mut self, report: PadReport) {
        match report.signal {
            PadSignal::Confirmed => self.on_pad_confirmed(report.route, report.step),
            PadSignal::Warning => self.on_pad_warning(report.route, report.step),
            PadSignal::Failed => self.on_pad_failed(report.route, report.step),
        }
    }

    pub fn on_pad_confirmed(&mut self, route: usize, step: usize) {
        if !self.is_cursor(route, step) || self.session.failure_pending {
            log::debug!("Stale confirmation from pad {}/{} dropped", route, step);
            return;
        }
        self.emit(CoreEvent::PadConfirmed { step });
        self.advance_cursor();
    }

    pub fn on_pad_warning(&mut self, route: usize, step: usize) {
        if !self.is_cursor(route, step) {
            log::debug!("Stale warning from pad {}/{} dropped", route, step);
            return;
        }
        self.emit(CoreEvent::PadWarning { step });
    }

    pub fn on_pad_failed(&mut self, route: usize, step: usize) {
        if !self.is_cursor(route, step) || self.session.failure_pending {
            log::debug!("Stale failure from pad {}/{} dropped", route, step);
            return;
        }
        log::info!("Pad {} on route {} timed out", step, route);
        self.emit(CoreEvent::PadFailed { step });

        match self.failure_policy {
            FailurePolicy::Hold => self.session.failure_pending = true,
            FailurePolicy::RetryPad => {
                if let Some(pad) = self.pad_mut(route, step) {
                    pad.activate();
                }
            }
            FailurePolicy::Advance => self.advance_cursor(),
            FailurePolicy::RestartRoute => self.begin_route(route),
        }
    }

    /// Re-raise the failed cursor pad (recovery under `FailurePolicy::Hold`)
    pub fn retry_pad(&mut self) {
        if !self.session.failure_pending {
            log::warn!("retry_pad ignored: no failed pad awaiting recovery");
            return;
        }
        self.session.failure_pending = false;
        let (route, step) = (self.session.current_route_index, self.session.current_step_index);
        if let Some(pad) = self.pad_mut(route, step) {
            pad.activate();
        }
    }

    /// Move past the failed cursor pad (recovery under `FailurePolicy::Hold`)
    pub fn skip_pad(&mut self) {
        if !self.session.failure_pending {
            log::warn!("skip_pad ignored: no failed pad awaiting recovery");
            return;
        }
        self.session.failure_pending = false;
        self.advance_cursor();
    }

    fn advance_cursor(&mut self) {
        let route = self.session.current_route_index;
        let step = self.session.current_step_index;

        if step > 0 {
            if let Some(prev) = self.pad_mut(route, step - 1) {
                prev.deactivate();
            }
        }

        self.session.current_step_index = step + 1;
        let next = self.session.current_step_index;
        if let Some(pad) = self.pad_mut(route, next) {
            pad.activate();
            return;
        }

        log::info!("Route {} forward leg complete, heading back", route);
        self.session.phase = RoutePhase::AwaitingReturn;
        self.start_marker.show();
        self.emit(CoreEvent::RouteForwardComplete { route });
    }

    /// The start marker was held long enough
    pub fn on_start_marker_stepped(&mut self) {
        match self.session.phase {
            RoutePhase::AwaitingReturn => self.complete_round_trip(),
            RoutePhase::AwaitingStart => {
                let route = self.session.current_route_index;
                if route < self.tutorial_routes {
                    self.begin_route(route);
                } else {
                    log::debug!("Start marker held; route {} needs a tier selection", route);
                }
            }
            RoutePhase::Forward => log::debug!("Start marker held while heading out"),
            RoutePhase::AwaitingSelection => {
                log::debug!("Start marker held while waiting for a selection");
            }
        }
    }

    fn complete_round_trip(&mut self) {
        let route = self.session.current_route_index;
        if let Some(last) = self.routes.get_mut(route).and_then(|r| r.pads.last_mut()) {
            last.deactivate();
        }

        log::info!("Route {} round trip complete", route);
        self.emit(CoreEvent::RouteReturnComplete { route });

        self.session.current_route_index = route + 1;
        self.session.current_step_index = 0;

        if self.session.is_tutorial && self.session.current_route_index < self.tutorial_routes {
            self.begin_route(self.session.current_route_index);
            return;
        }

        self.session.phase = RoutePhase::AwaitingSelection;
        self.selectors.show();
        self.emit(CoreEvent::SelectionRequested);
    }

    /// Forward an obstacle collision to the stats collaborator
    pub fn register_obstacle_hit(&mut self) {
        self.emit(CoreEvent::ObstacleHit);
    }

    /// Advance every pad and collect what they reported, in route/step order
    pub(crate) fn advance_pads(&mut self, dt: f32) -> Vec<PadReport> {
        let max_stand = self.max_stand_time();
        let mut reports = Vec::new();
        for (r, route) in self.routes.iter_mut().enumerate() {
            for pad in &mut route.pads {
                if let Some(signal) = pad.advance(dt, max_stand) {
                    reports.push(PadReport {
                        route: r,
                        step: pad.step_index,
                        signal,
                    });
                }
            }
        }
        reports
    }

    /// Phase of the pad under the cursor, if the cursor is on a pad
    pub fn cursor_phase(&self) -> Option<PadPhase> {
        self.pad(self.session.current_route_index, self.session.current_step_index)
            .map(|p| p.phase())
    }
}
