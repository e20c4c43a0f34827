use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ExerciseError;
use crate::exercise::ExerciseKind;

/// 連続カウントを抑える最小間隔のデフォルト
pub const DEFAULT_MIN_REP_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// 種目名 (e.g. "Push-up", "tricep_dip")
    #[serde(default = "default_exercise")]
    pub exercise: String,
    /// 必須ランドマークの最低信頼度
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
    /// 連続カウントを抑える最小間隔（秒）
    #[serde(default = "default_min_rep_interval_secs")]
    pub min_rep_interval_secs: f32,
    /// false なら最小間隔を使わない
    #[serde(default = "default_debounce")]
    pub debounce: bool,
}

fn default_exercise() -> String { "Plank".to_string() }
fn default_visibility_threshold() -> f32 { 0.1 }
fn default_min_rep_interval_secs() -> f32 { DEFAULT_MIN_REP_INTERVAL.as_secs_f32() }
fn default_debounce() -> bool { true }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exercise: default_exercise(),
            visibility_threshold: default_visibility_threshold(),
            min_rep_interval_secs: default_min_rep_interval_secs(),
            debounce: default_debounce(),
        }
    }
}

impl SessionConfig {
    /// 指定種目のデフォルト設定
    pub fn for_exercise(kind: ExerciseKind) -> Self {
        Self {
            exercise: kind.name().to_string(),
            ..Self::default()
        }
    }

    pub fn exercise_kind(&self) -> Result<ExerciseKind, ExerciseError> {
        self.exercise.parse()
    }

    /// 最小カウント間隔。debounce が false なら `None`
    ///
    /// 負値・NaN・`Duration` に収まらない値は `InvalidConfig`。
    pub fn min_rep_interval(&self) -> Result<Option<Duration>, ExerciseError> {
        let interval = Duration::try_from_secs_f32(self.min_rep_interval_secs).map_err(|e| {
            ExerciseError::InvalidConfig(format!(
                "min_rep_interval_secs must be a non-negative number of seconds, got {} ({})",
                self.min_rep_interval_secs, e
            ))
        })?;
        Ok(self.debounce.then_some(interval))
    }

    pub fn validate(&self) -> Result<ExerciseKind, ExerciseError> {
        let kind = self.exercise_kind()?;
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(ExerciseError::InvalidConfig(format!(
                "visibility_threshold must be within [0, 1], got {}",
                self.visibility_threshold
            )));
        }
        self.min_rep_interval()?;
        Ok(kind)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.session.validate()?;
        Ok(config)
    }

    /// ファイルが無い・壊れている場合はデフォルト設定で続行する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "config {} not loaded ({:#}), using defaults",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.session.exercise, "Plank");
        assert_eq!(config.session.visibility_threshold, 0.1);
        assert!(config.session.debounce);
        assert_eq!(
            config.session.min_rep_interval(),
            Ok(Some(DEFAULT_MIN_REP_INTERVAL))
        );
        assert_eq!(config.session.validate(), Ok(ExerciseKind::Plank));
    }

    #[test]
    fn test_session_table() {
        let config = Config::from_toml_str(
            r#"
            [session]
            exercise = "hammer_curl"
            min_rep_interval_secs = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.session.exercise_kind(), Ok(ExerciseKind::HammerCurl));
        assert_eq!(
            config.session.min_rep_interval(),
            Ok(Some(Duration::from_millis(500)))
        );
    }

    #[test]
    fn test_debounce_off() {
        let config = Config::from_toml_str("[session]\ndebounce = false\n").unwrap();
        assert_eq!(config.session.min_rep_interval(), Ok(None));
    }

    #[test]
    fn test_unknown_exercise_rejected() {
        let err = Config::from_toml_str("[session]\nexercise = \"Squat\"\n").unwrap_err();
        assert!(err.to_string().contains("Squat"));
    }

    #[test]
    fn test_validate_threshold_range() {
        let config = SessionConfig {
            visibility_threshold: 1.5,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExerciseError::InvalidConfig(_))));

        let config = SessionConfig {
            min_rep_interval_secs: -0.1,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExerciseError::InvalidConfig(_))));
    }

    #[test]
    fn test_interval_too_large_for_duration() {
        let err = Config::from_toml_str(
            "[session]\nexercise = \"push_up\"\nmin_rep_interval_secs = 1e30\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("min_rep_interval_secs"));

        let config = SessionConfig {
            min_rep_interval_secs: 1e30,
            ..SessionConfig::for_exercise(ExerciseKind::PushUp)
        };
        assert!(matches!(config.validate(), Err(ExerciseError::InvalidConfig(_))));
        assert!(matches!(
            config.min_rep_interval(),
            Err(ExerciseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_interval_rejected_even_when_debounce_off() {
        let config = SessionConfig {
            min_rep_interval_secs: f32::NAN,
            debounce: false,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ExerciseError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/exercise.toml");
        assert_eq!(config.session.exercise, "Plank");
    }

    #[test]
    fn test_for_exercise() {
        let config = SessionConfig::for_exercise(ExerciseKind::TricepDip);
        assert_eq!(config.validate(), Ok(ExerciseKind::TricepDip));
    }
}
