use std::time::Duration;

use mcp360_core::ScheduleError;
use thiserror::Error;

use super::models::DeckConfig;

/// Longest reveal timeline that does not trigger a warning. Visitors rarely
/// sit on one slate longer than this.
pub const LONG_SCHEDULE_WARNING: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("deck must contain at least one slate")]
    NoSlates,
    #[error("viewport_height must be positive and finite, got {0}")]
    InvalidViewportHeight(f64),
    #[error("scroll.frame_interval_ms must be greater than zero")]
    ZeroFrameInterval,
    #[error("slate {slate} has an invalid schedule: {source}")]
    InvalidSchedule {
        slate: usize,
        #[source]
        source: ScheduleError,
    },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

pub fn apply_guard_rails(
    config: &DeckConfig,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.slates.is_empty() {
        return Err(ConfigGuardRailError::NoSlates);
    }
    if !config.viewport_height.is_finite() || config.viewport_height <= 0.0 {
        return Err(ConfigGuardRailError::InvalidViewportHeight(
            config.viewport_height,
        ));
    }
    if config.scroll.frame_interval_ms == 0 {
        return Err(ConfigGuardRailError::ZeroFrameInterval);
    }

    for (slate, slate_config) in config.slates.iter().enumerate() {
        let schedule = slate_config.schedule().map_err(|source| {
            ConfigGuardRailError::InvalidSchedule { slate, source }
        })?;

        if slate_config.label.trim().is_empty() {
            warnings.push_with_hint(
                format!("slate {slate} has no label"),
                format!("navigation will show \"Slide {}\"", slate + 1),
            );
        }

        if schedule.total_duration() > LONG_SCHEDULE_WARNING {
            warnings.push_with_hint(
                format!(
                    "slate {slate} schedule runs for {:?}",
                    schedule.total_duration()
                ),
                "visitors usually scroll on before late cues fire",
            );
        }
    }

    if config.scroll.duration_ms == 0 {
        warnings.push(
            "scroll.duration_ms is 0; navigation jumps without animating",
        );
    }

    Ok(warnings)
}
