//! Per-frame pipeline: features → posture gate → phase → counting → metrics.
//!
//! [`process_frame`] is a pure transition over an explicit [`SessionState`].
//! [`ExerciseTracker`] owns one state and threads it through successive
//! frames for callers that just want to push landmarks.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::{SessionConfig, DEFAULT_MIN_REP_INTERVAL};
use crate::error::ExerciseError;
use crate::exercise::{
    classify, CountingRule, ExerciseKind, Phase, PhaseReading, PostureValidator, Rejection,
};
use crate::pose::{extract_features, AngleSet, Pose};

use super::counter::{HoldEvent, HoldTimer, RepCounter, RepEvent};
use super::metrics::SessionMetrics;

/// Immutable per-session settings.
#[derive(Debug, Clone)]
pub struct SessionRules {
    exercise: ExerciseKind,
    validator: PostureValidator,
    min_rep_interval: Option<Duration>,
}

impl SessionRules {
    /// Default thresholds for `exercise`.
    pub fn new(exercise: ExerciseKind) -> Self {
        let config = SessionConfig::for_exercise(exercise);
        Self {
            exercise,
            validator: PostureValidator::new(exercise, config.visibility_threshold),
            min_rep_interval: Some(DEFAULT_MIN_REP_INTERVAL),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self, ExerciseError> {
        let exercise = config.validate()?;
        Ok(Self {
            exercise,
            validator: PostureValidator::new(exercise, config.visibility_threshold),
            min_rep_interval: config.min_rep_interval()?,
        })
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }
}

/// Progress of one session.
#[derive(Debug, Clone)]
pub struct SessionState {
    exercise: ExerciseKind,
    counter: RepCounter,
    hold: HoldTimer,
    metrics: SessionMetrics,
    bad_posture: bool,
}

impl SessionState {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self {
            exercise,
            counter: RepCounter::new(),
            hold: HoldTimer::new(),
            metrics: SessionMetrics::new(),
            bad_posture: false,
        }
    }

    /// Exercise this state was created for.
    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    /// Counted repetitions, or whole seconds of the running hold for Plank.
    pub fn rep_count(&self) -> u64 {
        match self.exercise.counting_rule() {
            CountingRule::Hold => self.hold.current_secs(),
            _ => self.counter.count(),
        }
    }

    pub fn in_progress(&self) -> bool {
        match self.exercise.counting_rule() {
            CountingRule::Hold => self.hold.is_running(),
            _ => self.counter.in_progress(),
        }
    }

    pub fn bad_posture(&self) -> bool {
        self.bad_posture
    }

    pub fn longest_hold_secs(&self) -> u64 {
        self.hold.longest_secs()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Advances the state with the angles of a frame that passed the posture gate.
    pub fn advance(
        &mut self,
        angles: &AngleSet,
        now: Instant,
        min_rep_interval: Option<Duration>,
    ) -> PhaseReading {
        if !self.metrics.is_started() {
            log::info!("{} session started", self.exercise);
        }

        let reading = classify(self.exercise, angles);
        log::trace!(
            "{} phase: {} (bad_posture={})",
            self.exercise,
            reading.phase,
            reading.bad_posture
        );
        self.bad_posture = reading.bad_posture;

        match self.exercise.counting_rule() {
            CountingRule::Hold => match self.hold.advance(reading.phase, now) {
                HoldEvent::Started => log::info!("{} hold started", self.exercise),
                HoldEvent::Ended { secs } => {
                    log::info!("{} hold ended after {}s", self.exercise, secs)
                }
                HoldEvent::Holding { .. } | HoldEvent::Idle => {}
            },
            rule => match self.counter.advance(rule, reading.phase, now, min_rep_interval) {
                RepEvent::Counted => {
                    log::info!("{} rep {}", self.exercise, self.counter.count())
                }
                RepEvent::Debounced => {
                    log::debug!("{} rep edge ignored (too soon after last rep)", self.exercise)
                }
                RepEvent::Armed | RepEvent::None => {}
            },
        }

        self.metrics.record(now, self.exercise.burn_rate());
        reading
    }
}

/// Per-frame output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    /// `None` on a rejected frame.
    pub phase: Option<Phase>,
    pub posture_ok: bool,
    pub failure_reason: Option<String>,
    pub bad_posture: bool,
    pub rep_count: u64,
    pub elapsed_seconds: f32,
    pub calories: f32,
    #[serde(skip)]
    pub rejection: Option<Rejection>,
}

impl FrameResult {
    fn from_state(state: &SessionState, phase: Option<Phase>, rejection: Option<Rejection>) -> Self {
        Self {
            phase,
            posture_ok: rejection.is_none(),
            failure_reason: rejection.map(|r| r.to_string()),
            bad_posture: state.bad_posture,
            rep_count: state.rep_count(),
            elapsed_seconds: state.metrics.elapsed_secs(),
            calories: state.metrics.calories(),
            rejection,
        }
    }
}

/// One frame through the pipeline.
///
/// A rejected frame returns the input state unchanged.
pub fn process_frame(
    rules: &SessionRules,
    state: &SessionState,
    pose: &Pose,
    now: Instant,
) -> (SessionState, FrameResult) {
    let features = extract_features(pose);

    if let Err(rejection) = rules.validator.validate(pose, &features) {
        log::debug!("{} frame rejected: {}", rules.exercise, rejection);
        let result = FrameResult::from_state(state, None, Some(rejection));
        return (state.clone(), result);
    }

    let mut next = state.clone();
    let reading = next.advance(&features.angles, now, rules.min_rep_interval);
    let result = FrameResult::from_state(&next, Some(reading.phase), None);
    (next, result)
}

/// End-of-session report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub exercise: ExerciseKind,
    pub reps: u64,
    pub longest_hold_secs: u64,
    pub elapsed_seconds: f32,
    pub calories: f32,
    pub accepted_frames: u64,
    pub rejected_frames: u64,
}

/// Owns one session's state and threads it through successive frames.
pub struct ExerciseTracker {
    rules: SessionRules,
    state: SessionState,
    accepted_frames: u64,
    rejected_frames: u64,
}

impl ExerciseTracker {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self::with_rules(SessionRules::new(exercise))
    }

    /// Fails on an unknown exercise or out-of-range thresholds.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ExerciseError> {
        Ok(Self::with_rules(SessionRules::from_config(config)?))
    }

    fn with_rules(rules: SessionRules) -> Self {
        Self {
            state: SessionState::new(rules.exercise),
            rules,
            accepted_frames: 0,
            rejected_frames: 0,
        }
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.rules.exercise
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Processes a frame stamped with `Instant::now()`.
    pub fn process(&mut self, pose: &Pose) -> FrameResult {
        self.process_at(pose, Instant::now())
    }

    pub fn process_at(&mut self, pose: &Pose, now: Instant) -> FrameResult {
        let (next, result) = process_frame(&self.rules, &self.state, pose, now);
        self.state = next;
        if result.posture_ok {
            self.accepted_frames += 1;
        } else {
            self.rejected_frames += 1;
        }
        result
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            exercise: self.rules.exercise,
            reps: self.state.rep_count(),
            longest_hold_secs: self.state.longest_hold_secs(),
            elapsed_seconds: self.state.metrics.elapsed_secs(),
            calories: self.state.metrics.calories(),
            accepted_frames: self.accepted_frames,
            rejected_frames: self.rejected_frames,
        }
    }

    /// Discards progress. The exercise and thresholds are kept.
    pub fn reset(&mut self) {
        self.state = SessionState::new(self.rules.exercise);
        self.accepted_frames = 0;
        self.rejected_frames = 0;
    }
}
