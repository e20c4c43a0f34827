pub mod counter;
pub mod metrics;
pub mod session;

pub use counter::{HoldEvent, HoldTimer, RepCounter, RepEvent};
pub use metrics::{burn_rate_for, SessionMetrics, DEFAULT_BURN_RATE};
pub use session::{
    process_frame, ExerciseTracker, FrameResult, SessionRules, SessionState, SessionSummary,
};
