use anyhow::{Context, anyhow};
use mcp360_core::{
    DeckLayout, EasingFunction, ScheduleError, SlateId, SlateSpec, StepCue,
    StepSchedule, deck::DEFAULT_VIEWPORT_HEIGHT,
};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DECK_CONFIG_PATH_ENV: &str = "MCP360_DECK_CONFIG_PATH";
pub const DECK_CONFIG_JSON_ENV: &str = "MCP360_DECK_CONFIG_JSON";

/// Source that produced the deck configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeckConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl std::fmt::Display for DeckConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckConfigSource::Default => f.write_str("built-in defaults"),
            DeckConfigSource::EnvPath(path) => {
                write!(f, "${DECK_CONFIG_PATH_ENV} ({})", path.display())
            }
            DeckConfigSource::EnvInline => {
                write!(f, "${DECK_CONFIG_JSON_ENV}")
            }
            DeckConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How navigation requests animate the scroll offset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Length of a navigation scroll. 0 jumps straight to the target.
    pub duration_ms: u64,
    /// Curve applied over `duration_ms`.
    pub easing: EasingFunction,
    /// Gap between emitted scroll positions while animating. Roughly one
    /// display frame; lower values produce more scroll events.
    pub frame_interval_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            duration_ms: 600,
            easing: EasingFunction::EaseInOutCubic,
            frame_interval_ms: 16,
        }
    }
}

impl ScrollConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CueConfig {
    pub step: u32,
    pub delay_ms: u64,
}

impl From<CueConfig> for StepCue {
    fn from(cue: CueConfig) -> Self {
        StepCue::from_millis(cue.step, cue.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SlateConfig {
    /// Built-in slate this entry renders. Only used to name cues in logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SlateId>,
    /// Navigation label. Blank labels fall back to "Slide N".
    #[serde(default)]
    pub label: String,
    /// Reveal timeline; delays are measured from activation.
    #[serde(default)]
    pub schedule: Vec<CueConfig>,
}

impl SlateConfig {
    pub fn schedule(&self) -> Result<StepSchedule, ScheduleError> {
        StepSchedule::new(
            self.schedule.iter().copied().map(StepCue::from).collect(),
        )
    }
}

impl From<SlateId> for SlateConfig {
    fn from(id: SlateId) -> Self {
        Self {
            id: Some(id),
            label: id.label().to_string(),
            schedule: id
                .schedule()
                .cues()
                .iter()
                .map(|cue| CueConfig {
                    step: cue.step,
                    delay_ms: u64::try_from(cue.delay.as_millis())
                        .unwrap_or(u64::MAX),
                })
                .collect(),
        }
    }
}

fn default_slates() -> Vec<SlateConfig> {
    SlateId::ALL.into_iter().map(SlateConfig::from).collect()
}

/// Top-level deck settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeckConfig {
    /// Viewport height (px) assumed until the environment reports one.
    pub viewport_height: f64,
    pub scroll: ScrollConfig,
    /// Slates from top to bottom. Defaults to the eight-slate MCP360 page.
    #[serde(default = "default_slates")]
    pub slates: Vec<SlateConfig>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll: ScrollConfig::default(),
            slates: default_slates(),
        }
    }
}

impl DeckConfig {
    /// Load deck configuration using environment variables.
    /// Evaluation order:
    /// 1) `$MCP360_DECK_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$MCP360_DECK_CONFIG_JSON` (inline JSON),
    /// 3) the first of `deck.toml`, `deck.json`, `config/deck.toml`,
    ///    `config/deck.json` that exists,
    /// 4) defaults if none of the above is present.
    pub fn load_from_env() -> anyhow::Result<(Self, DeckConfigSource)> {
        if let Ok(path_str) = env::var(DECK_CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, DeckConfigSource::EnvPath(path)));
        }

        if let Ok(raw) = env::var(DECK_CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| {
                    format!("failed to parse {DECK_CONFIG_JSON_ENV}")
                })?;
            return Ok((parsed, DeckConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, DeckConfigSource::File(path)));
        }

        Ok((Self::default(), DeckConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read deck config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid deck config {}", path.display())
            }),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!("invalid deck config {}: {}", path.display(), err)
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse deck config {}: toml: {}; json: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid deck config json: {err}"))
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "deck.toml",
            "deck.json",
            "config/deck.toml",
            "config/deck.json",
        ];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(|path| path.to_path_buf())
    }

    /// Build the core layout. Fails on the first slate whose schedule is not
    /// strictly ascending.
    pub fn to_layout(&self) -> Result<DeckLayout, mcp360_core::DeckError> {
        let slates = self
            .slates
            .iter()
            .enumerate()
            .map(|(slate, config)| {
                let schedule = config.schedule().map_err(|source| {
                    mcp360_core::DeckError::Schedule { slate, source }
                })?;
                Ok(SlateSpec {
                    id: config.id,
                    label: config.label.clone(),
                    schedule,
                })
            })
            .collect::<Result<Vec<_>, mcp360_core::DeckError>>()?;

        Ok(DeckLayout {
            viewport_height: self.viewport_height,
            slates,
        })
    }
}
