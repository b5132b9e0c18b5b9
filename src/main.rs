//! Lily Route demo driver
//!
//! Runs a seeded simulated participant through the tutorial and one tier,
//! stepping the engine at a fixed rate and logging every event.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use lily_route::consts::*;
use lily_route::sim::{ContactInput, ContactTarget, RoutePhase, RouteSequencer, Side, TickInput, tick};
use lily_route::stats::next_participant_id;
use lily_route::{CourseConfig, SessionStats, Tier};

/// Give up if the simulated session runs longer than this (seconds)
const MAX_RUN_SECONDS: f64 = 600.0;
/// Chance per tick that a planted foot briefly loses tracking
const FLICKER_CHANCE: f64 = 0.002;
/// Chance per tick of clipping an obstacle while walking between targets
const OBSTACLE_CHANCE: f64 = 0.004;

const USAGE: &str = "usage: lily-route [--config PATH] [--seed N] [--tier easy|medium|hard]";

struct Args {
    config: Option<PathBuf>,
    seed: u64,
    tier: Tier,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Self {
            config: None,
            seed: 12345,
            tier: Tier::Easy,
        };
        while let Some(flag) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--seed" => {
                    let raw = value()?;
                    parsed.seed = raw.parse().map_err(|_| format!("bad seed: {raw}"))?;
                }
                "--tier" => {
                    let raw = value()?;
                    parsed.tier = Tier::from_str(&raw)
                        .filter(|t| *t != Tier::Tutorial)
                        .ok_or_else(|| format!("bad tier: {raw}"))?;
                }
                _ => return Err(format!("unknown argument: {flag}")),
            }
        }
        Ok(parsed)
    }
}

/// Simulated participant: walks to whatever the engine wants next, plants
/// the feet one after the other, and lingers a little before moving on
struct Walker {
    rng: Pcg32,
    tier: Tier,
    standing_on: Option<ContactTarget>,
    /// Seconds of walking left before landing
    travel: f32,
    /// Seconds to stay once the target has moved on
    linger: f32,
    right_foot_delay: Option<f32>,
    flicker: Option<ContactTarget>,
}

impl Walker {
    fn new(seed: u64, tier: Tier) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tier,
            standing_on: None,
            travel: 0.5,
            linger: 0.0,
            right_foot_delay: None,
            flicker: None,
        }
    }

    fn desired(&self, seq: &RouteSequencer) -> Option<ContactTarget> {
        let session = seq.session();
        match session.phase {
            RoutePhase::AwaitingStart | RoutePhase::AwaitingReturn => Some(ContactTarget::StartMarker),
            RoutePhase::Forward if session.failure_pending => None,
            RoutePhase::Forward => Some(ContactTarget::Pad {
                route: session.current_route_index,
                step: session.current_step_index,
            }),
            RoutePhase::AwaitingSelection => Some(ContactTarget::Selector(self.tier)),
        }
    }

    fn contact(target: ContactTarget, side: Side, present: bool) -> ContactInput {
        ContactInput {
            target,
            side,
            present,
        }
    }

    fn step(&mut self, seq: &RouteSequencer, dt: f32) -> TickInput {
        let mut input = TickInput::default();
        let desired = self.desired(seq);

        if let Some(target) = self.flicker.take() {
            input.contacts.push(Self::contact(target, Side::Left, true));
        }

        match self.standing_on {
            Some(current) if Some(current) != desired => {
                self.linger -= dt;
                if self.linger <= 0.0 {
                    input.contacts.extend(ContactInput::both(current, false));
                    self.standing_on = None;
                    self.right_foot_delay = None;
                    self.travel = self.rng.random_range(0.4..0.9);
                }
            }
            Some(current) => {
                if self.right_foot_delay.is_none() && self.rng.random_bool(FLICKER_CHANCE) {
                    input.contacts.push(Self::contact(current, Side::Left, false));
                    self.flicker = Some(current);
                }
            }
            None => {
                if self.rng.random_bool(OBSTACLE_CHANCE) {
                    input.obstacle_hits += 1;
                }
                if let Some(target) = desired {
                    self.travel -= dt;
                    if self.travel <= 0.0 {
                        input.contacts.push(Self::contact(target, Side::Left, true));
                        self.standing_on = Some(target);
                        self.right_foot_delay = Some(self.rng.random_range(0.0..0.2));
                        self.linger = self.rng.random_range(0.1..0.5);
                    }
                }
            }
        }

        if let (Some(target), Some(delay)) = (self.standing_on, self.right_foot_delay) {
            let delay = delay - dt;
            if delay <= 0.0 {
                input.contacts.push(Self::contact(target, Side::Right, true));
                self.right_foot_delay = None;
            } else {
                self.right_foot_delay = Some(delay);
            }
        }

        input
    }
}

fn load_config(args: &Args) -> CourseConfig {
    let Some(path) = &args.config else {
        return CourseConfig::default();
    };
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Can't read {}: {}", path.display(), e);
            std::process::exit(2);
        }
    };
    match CourseConfig::from_json(&json) {
        Ok(config) => {
            log::info!("Loaded course from {}", path.display());
            config
        }
        Err(e) => {
            log::error!("Invalid course {}: {}", path.display(), e);
            std::process::exit(2);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(64);
        }
    };

    let config = load_config(&args);
    let mut seq = match RouteSequencer::new(&config) {
        Ok(seq) => seq,
        Err(e) => {
            log::error!("Invalid course: {}", e);
            std::process::exit(2);
        }
    };

    let stats = Rc::new(RefCell::new(SessionStats::new(next_participant_id(None, 0))));
    seq.subscribe(Box::new(stats.clone()));

    log::info!("Lily Route starting (seed {}, tier {})", args.seed, args.tier);
    let mut walker = Walker::new(args.seed, args.tier);
    let mut frame_rng = Pcg32::seed_from_u64(args.seed.wrapping_add(1));
    let mut accumulator = 0.0;

    while seq.clock() < MAX_RUN_SECONDS && stats.borrow().record().is_none() {
        // Uneven frame times, drained in fixed steps
        accumulator += frame_rng.random_range(0.008..0.02_f32);

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = walker.step(&seq, SIM_DT);
            for record in tick(&mut seq, &input, SIM_DT) {
                log::info!("[{:7.2}s] {:?}", record.time, record.event);
            }
            if seq.session().failure_pending {
                seq.retry_pad();
            }
            accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    let record = stats.borrow().record().cloned();
    match record {
        Some(record) => println!("{record}"),
        None => {
            log::warn!("Session did not finish within {}s", MAX_RUN_SECONDS);
            std::process::exit(1);
        }
    }
}
