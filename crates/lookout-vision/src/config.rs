use crate::PipelineError;
use lookout_camera::RetryPolicy;
use lookout_infer::{Detection, COCO_CLASS_NAMES};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Which detections get drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    pub target_classes: BTreeSet<String>,
    /// Extra threshold on top of the detector's own.
    pub confidence_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            target_classes: BTreeSet::from(["person".to_string()]),
            confidence_threshold: 0.0,
        }
    }
}

impl DetectionConfig {
    pub fn selects(&self, detection: &Detection) -> bool {
        detection.confidence >= self.confidence_threshold
            && detection
                .class_name()
                .is_some_and(|name| self.target_classes.contains(name))
    }
}

/// What the hand stage does each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Off,
    /// Landmarks computed inline and drawn on the same frame.
    Sync,
    /// Landmarks and gestures computed on a worker thread, drawn on a later frame.
    Live,
}

impl FromStr for GestureMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(GestureMode::Off),
            "sync" => Ok(GestureMode::Sync),
            "live" => Ok(GestureMode::Live),
            other => Err(PipelineError::Config(format!(
                "unknown gesture mode '{other}' (expected off, sync or live)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub detection: DetectionConfig,
    pub gesture_mode: GestureMode,
    /// How many frames a gesture result stays drawable after the frame it was computed on.
    pub stale_after_frames: u64,
    pub retry: RetryPolicy,
    pub window_title: String,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            gesture_mode: GestureMode::Sync,
            stale_after_frames: 5,
            retry: RetryPolicy::fail_fast(),
            window_title: "Webcam".to_string(),
            max_frames: None,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, PipelineError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PipelineError::Config(format!("{key}={value}: {e}")))
}

impl PipelineConfig {
    /// Reads `LOOKOUT_*` settings from the process environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset keys.
    ///
    /// | key | value |
    /// |---|---|
    /// | `LOOKOUT_TARGET_CLASSES` | comma separated class names |
    /// | `LOOKOUT_CONFIDENCE` | 0.0 to 1.0 |
    /// | `LOOKOUT_GESTURE_MODE` | `off`, `sync` or `live` |
    /// | `LOOKOUT_STALE_FRAMES` | frames |
    /// | `LOOKOUT_CAPTURE_RETRIES` | consecutive transient capture errors to retry |
    /// | `LOOKOUT_RETRY_BACKOFF_MS` | first retry wait, doubled per retry |
    /// | `LOOKOUT_MAX_FRAMES` | frames |
    /// | `LOOKOUT_WINDOW_TITLE` | text |
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let mut config = Self::default();

        if let Some(value) = lookup("LOOKOUT_TARGET_CLASSES") {
            let mut classes = BTreeSet::new();
            for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
                if !COCO_CLASS_NAMES.contains(&name) {
                    return Err(PipelineError::Config(format!(
                        "LOOKOUT_TARGET_CLASSES: unknown class '{name}'"
                    )));
                }
                classes.insert(name.to_string());
            }
            config.detection.target_classes = classes;
        }

        if let Some(value) = lookup("LOOKOUT_CONFIDENCE") {
            let threshold: f32 = parse("LOOKOUT_CONFIDENCE", &value)?;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(PipelineError::Config(format!(
                    "LOOKOUT_CONFIDENCE={value}: must be between 0 and 1"
                )));
            }
            config.detection.confidence_threshold = threshold;
        }

        if let Some(value) = lookup("LOOKOUT_GESTURE_MODE") {
            config.gesture_mode = value.parse()?;
        }

        if let Some(value) = lookup("LOOKOUT_STALE_FRAMES") {
            config.stale_after_frames = parse("LOOKOUT_STALE_FRAMES", &value)?;
        }

        let retries: Option<u32> = lookup("LOOKOUT_CAPTURE_RETRIES")
            .map(|v| parse("LOOKOUT_CAPTURE_RETRIES", &v))
            .transpose()?;
        let backoff: Option<u64> = lookup("LOOKOUT_RETRY_BACKOFF_MS")
            .map(|v| parse("LOOKOUT_RETRY_BACKOFF_MS", &v))
            .transpose()?;
        if let Some(retries) = retries.filter(|&r| r > 0) {
            let backoff = backoff.map(Duration::from_millis).unwrap_or(DEFAULT_RETRY_BACKOFF);
            config.retry = RetryPolicy::new(retries, backoff);
        }

        if let Some(value) = lookup("LOOKOUT_MAX_FRAMES") {
            config.max_frames = Some(parse("LOOKOUT_MAX_FRAMES", &value)?);
        }

        if let Some(value) = lookup("LOOKOUT_WINDOW_TITLE") {
            config.window_title = value;
        }

        Ok(config)
    }
}
