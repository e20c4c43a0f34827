use std::time::{Duration, Instant};

use crate::exercise::ExerciseKind;

/// 対応外の種目名に使う消費レート (kcal/min)
pub const DEFAULT_BURN_RATE: f32 = 5.0;

/// 種目名から消費レートを引く。不明な名前は [`DEFAULT_BURN_RATE`]
pub fn burn_rate_for(name: &str) -> f32 {
    name.parse::<ExerciseKind>()
        .map(|kind| kind.burn_rate())
        .unwrap_or(DEFAULT_BURN_RATE)
}

/// セッション全体の経過時間と消費カロリー
///
/// カロリーは回数ではなく時間から推定する。
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    started_at: Option<Instant>,
    elapsed: Duration,
    calories: f32,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 受理されたフレームごとに呼ぶ。最初の呼び出しが開始時刻になる
    ///
    /// 時刻が巻き戻っても経過時間とカロリーは減らない。
    pub fn record(&mut self, now: Instant, burn_rate: f32) {
        let start = *self.started_at.get_or_insert(now);
        self.elapsed = self.elapsed.max(now.saturating_duration_since(start));
        self.calories = burn_rate * self.elapsed.as_secs_f32() / 60.0;
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn calories(&self) -> f32 {
        self.calories
    }
}
