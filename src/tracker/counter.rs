use std::time::{Duration, Instant};

use crate::exercise::{CountingRule, HoldPhase, Phase, RepPhase};

/// 位相が回数カウンタに与えた変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepEvent {
    /// エッジなし
    None,
    /// アーム側のエッジ
    Armed,
    /// 1 回カウントした
    Counted,
    /// 最小間隔内のカウントエッジ。回数は増やしていない
    Debounced,
}

/// 回数カウントの状態機械
///
/// 数える側のエッジとアームする側のエッジは `CountingRule` で決まる。
#[derive(Debug, Clone, Default)]
pub struct RepCounter {
    count: u64,
    in_progress: bool,
    last_rep_at: Option<Instant>,
}

impl RepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// 1 フレーム分の位相で状態を進める
    ///
    /// `min_interval` が `Some` のとき、前回カウントからその時間内に来た
    /// カウントエッジは `in_progress` だけ切り替えて回数は増やさない。
    pub fn advance(
        &mut self,
        rule: CountingRule,
        phase: Phase,
        now: Instant,
        min_interval: Option<Duration>,
    ) -> RepEvent {
        let Phase::Rep(phase) = phase else {
            return RepEvent::None;
        };

        match (rule, phase, self.in_progress) {
            (CountingRule::CountOnDown, RepPhase::Down, false) => {
                self.in_progress = true;
                self.count_at(now, min_interval)
            }
            (CountingRule::CountOnDown, RepPhase::Up, true) => {
                self.in_progress = false;
                RepEvent::Armed
            }
            (CountingRule::CountOnReturn, RepPhase::Up, false) => {
                self.in_progress = true;
                RepEvent::Armed
            }
            (CountingRule::CountOnReturn, RepPhase::Down, true) => {
                self.in_progress = false;
                self.count_at(now, min_interval)
            }
            _ => RepEvent::None,
        }
    }

    fn count_at(&mut self, now: Instant, min_interval: Option<Duration>) -> RepEvent {
        if let (Some(last), Some(min)) = (self.last_rep_at, min_interval) {
            if now.saturating_duration_since(last) < min {
                return RepEvent::Debounced;
            }
        }
        self.count += 1;
        self.last_rep_at = Some(now);
        RepEvent::Counted
    }
}

/// 位相がホールドタイマーに与えた変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldEvent {
    Idle,
    Started,
    Holding { secs: u64 },
    Ended { secs: u64 },
}

/// プランクのホールドタイマー。再開時は 0 秒から数え直す
#[derive(Debug, Clone, Default)]
pub struct HoldTimer {
    started_at: Option<Instant>,
    current_secs: u64,
    longest_secs: u64,
}

impl HoldTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// 継続中ホールドの経過秒（整数）。停止中は 0
    pub fn current_secs(&self) -> u64 {
        self.current_secs
    }

    pub fn longest_secs(&self) -> u64 {
        self.longest_secs
    }

    pub fn advance(&mut self, phase: Phase, now: Instant) -> HoldEvent {
        let Phase::Hold(phase) = phase else {
            return HoldEvent::Idle;
        };

        match (phase, self.started_at) {
            (HoldPhase::Plank, None) => {
                self.started_at = Some(now);
                self.current_secs = 0;
                HoldEvent::Started
            }
            (HoldPhase::Plank, Some(start)) => {
                self.current_secs = now.saturating_duration_since(start).as_secs();
                self.longest_secs = self.longest_secs.max(self.current_secs);
                HoldEvent::Holding {
                    secs: self.current_secs,
                }
            }
            (HoldPhase::NotPlank, Some(start)) => {
                let secs = now.saturating_duration_since(start).as_secs();
                self.longest_secs = self.longest_secs.max(secs);
                self.started_at = None;
                self.current_secs = 0;
                HoldEvent::Ended { secs }
            }
            (HoldPhase::NotPlank, None) => HoldEvent::Idle,
        }
    }
}
