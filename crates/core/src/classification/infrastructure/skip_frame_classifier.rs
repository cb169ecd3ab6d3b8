use crate::classification::domain::detection_result::DetectionResult;
use crate::classification::domain::frame_classifier::{Classification, FrameClassifier};
use crate::shared::frame::Frame;

/// Decorator that classifies every Nth frame and reuses the last result in
/// between.
///
/// Reused results are returned as [`Classification::Reused`]. Until one
/// classification has succeeded every frame goes to the inner classifier.
pub struct SkipFrameClassifier {
    inner: Box<dyn FrameClassifier>,
    interval: usize,
    frame_count: usize,
    last: Option<DetectionResult>,
}

impl SkipFrameClassifier {
    pub fn new(inner: Box<dyn FrameClassifier>, interval: usize) -> Result<Self, &'static str> {
        if interval < 1 {
            return Err("interval must be >= 1");
        }
        Ok(Self {
            inner,
            interval,
            frame_count: 0,
            last: None,
        })
    }
}

impl FrameClassifier for SkipFrameClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Classification, Box<dyn std::error::Error>> {
        let due = self.frame_count % self.interval == 0;
        self.frame_count += 1;

        match (&self.last, due) {
            (Some(last), false) => Ok(Classification::Reused(last.clone())),
            _ => {
                let result = self.inner.classify(frame)?.into_result();
                self.last = Some(result.clone());
                Ok(Classification::Fresh(result))
            }
        }
    }
}
