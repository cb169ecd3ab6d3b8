use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use faceshow_core::classification::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use faceshow_core::shared::constants::{
    DEFAULT_GROUPS, DETECTION_SCALE, MATCH_THRESHOLD, PROCESS_EVERY_N_FRAMES, SLIDE_INTERVAL,
    STOP_TIMEOUT,
};

/// Accepted bound, in milliseconds, on waiting for a slideshow to stop.
pub const STOP_TIMEOUT_RANGE_MS: RangeInclusive<u64> = 1..=5000;

/// Persistent session settings. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub references: PathBuf,
    pub slides: PathBuf,
    pub groups: Vec<String>,
    pub camera: String,
    pub camera_format: Option<String>,
    pub threshold: f64,
    pub process_every: usize,
    pub slide_interval_secs: f64,
    pub scale: f64,
    pub slide_output: PathBuf,
    pub detector_confidence: f64,
    pub models_dir: Option<PathBuf>,
    pub stop_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            references: PathBuf::from("students"),
            slides: PathBuf::from("posters"),
            groups: DEFAULT_GROUPS.iter().map(|g| g.to_string()).collect(),
            camera: "/dev/video0".to_string(),
            camera_format: None,
            threshold: MATCH_THRESHOLD,
            process_every: PROCESS_EVERY_N_FRAMES,
            slide_interval_secs: SLIDE_INTERVAL.as_secs_f64(),
            scale: DETECTION_SCALE,
            slide_output: std::env::temp_dir().join("faceshow").join("slide.png"),
            detector_confidence: DEFAULT_CONFIDENCE,
            models_dir: None,
            stop_timeout_ms: STOP_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("faceshow").join("settings.json"))
    }

    /// Reads `path`; a missing or unparsable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn load(path: Option<&Path>) -> Self {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_secs_f64(self.slide_interval_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.threshold > 0.0 && self.threshold <= 2.0) {
            return Err(format!(
                "Threshold must be in (0, 2], got {}",
                self.threshold
            ));
        }
        if self.process_every < 1 {
            return Err("Process-every must be at least 1".to_string());
        }
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(format!("Scale must be in (0, 1], got {}", self.scale));
        }
        if !(self.slide_interval_secs > 0.0 && self.slide_interval_secs.is_finite()) {
            return Err(format!(
                "Slide interval must be positive, got {}",
                self.slide_interval_secs
            ));
        }
        if !(0.0..=1.0).contains(&self.detector_confidence) {
            return Err(format!(
                "Detector confidence must be between 0.0 and 1.0, got {}",
                self.detector_confidence
            ));
        }
        if !STOP_TIMEOUT_RANGE_MS.contains(&self.stop_timeout_ms) {
            return Err(format!(
                "Stop timeout must be between {} and {} ms, got {}",
                STOP_TIMEOUT_RANGE_MS.start(),
                STOP_TIMEOUT_RANGE_MS.end(),
                self.stop_timeout_ms
            ));
        }
        if self.groups.is_empty() {
            return Err("At least one group is required".to_string());
        }
        Ok(())
    }
}
