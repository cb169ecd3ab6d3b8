use std::time::{Duration, Instant};

use crate::presentation::domain::frame_presenter::FramePresenter;
use crate::presentation::domain::overlay::Overlay;
use crate::shared::frame::Frame;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Headless presenter: writes the overlay text to the log.
///
/// A line is emitted only when the overlay text changed, and at most once
/// per `min_interval`. Face labels go to `debug`.
pub struct LogFramePresenter {
    min_interval: Duration,
    last_text: Option<String>,
    last_at: Option<Instant>,
}

impl LogFramePresenter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_text: None,
            last_at: None,
        }
    }

    /// Records `text` and returns whether it should be logged at `now`.
    fn should_log(&mut self, text: &str, now: Instant) -> bool {
        if self.last_text.as_deref() == Some(text) {
            return false;
        }
        if let Some(at) = self.last_at {
            if now.duration_since(at) < self.min_interval {
                return false;
            }
        }
        self.last_text = Some(text.to_string());
        self.last_at = Some(now);
        true
    }
}

impl Default for LogFramePresenter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl FramePresenter for LogFramePresenter {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
        let text = overlay.summary();
        if !self.should_log(&text, Instant::now()) {
            return Ok(());
        }
        log::info!("[frame {}] {text}", frame.index());
        for face in &overlay.faces {
            let b = face.bbox;
            log::debug!(
                "  {} at ({}, {})-({}, {})",
                face.label,
                b.left,
                b.top,
                b.right,
                b.bottom
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_is_logged() {
        let mut p = LogFramePresenter::default();
        assert!(p.should_log("Science: 1", Instant::now()));
    }

    #[test]
    fn test_repeated_text_is_suppressed() {
        let mut p = LogFramePresenter::new(Duration::ZERO);
        let now = Instant::now();
        assert!(p.should_log("Science: 1", now));
        assert!(!p.should_log("Science: 1", now + Duration::from_secs(5)));
    }

    #[test]
    fn test_changes_are_throttled() {
        let mut p = LogFramePresenter::new(Duration::from_secs(1));
        let now = Instant::now();
        assert!(p.should_log("Science: 1", now));
        assert!(!p.should_log("Science: 2", now + Duration::from_millis(200)));
        assert!(p.should_log("Science: 2", now + Duration::from_millis(1200)));
    }

    #[test]
    fn test_present_accepts_frames() {
        let mut p = LogFramePresenter::default();
        let frame = Frame::new(vec![0; 3], 1, 1, 0);
        assert!(p.present(&frame, &Overlay::default()).is_ok());
    }
}
