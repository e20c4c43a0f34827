pub mod kind;
pub mod phase;
pub mod posture;

pub use kind::{CountingRule, ExerciseKind};
pub use phase::{classify, HoldPhase, Phase, PhaseReading, RepPhase};
pub use posture::{PostureCheck, PostureFault, PostureValidator, Rejection};
