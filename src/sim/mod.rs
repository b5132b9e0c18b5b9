//! Route-progression engine
//!
//! All decision logic lives here. Like any fixed-step simulation it is pure:
//! - One `tick` per frame with a shared `dt`
//! - Timers are accumulators, never suspended work
//! - Stable iteration order (route, then step)
//! - No rendering, audio or tracking dependencies

pub mod contact;
pub mod events;
pub mod instability;
pub mod pad;
pub mod selector;
pub mod sequencer;
pub mod start_pad;
pub mod tick;

pub use contact::{ContactDebouncer, DebounceStep, EngageEdge, Side};
pub use events::{CoreEvent, EventBus, EventLog, EventRecord, EventSink};
pub use instability::{Instability, InstabilityTimer};
pub use pad::{Pad, PadPhase, PadSignal};
pub use selector::{SelectorBank, SelectorPad};
pub use sequencer::{PadReport, Route, RoutePhase, RouteSequencer, Session};
pub use start_pad::StartMarker;
pub use tick::{ContactInput, ContactTarget, TickInput, tick};
