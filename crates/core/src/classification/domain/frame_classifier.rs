use crate::classification::domain::detection_result::DetectionResult;
use crate::shared::frame::Frame;

/// Result of asking a classifier about one frame.
///
/// `Reused` carries the last computed result when the frame itself was not
/// analysed; the arbiter only learns from `Fresh` results.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    Fresh(DetectionResult),
    Reused(DetectionResult),
}

impl Classification {
    pub fn result(&self) -> &DetectionResult {
        match self {
            Classification::Fresh(r) | Classification::Reused(r) => r,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Classification::Fresh(_))
    }

    pub fn into_result(self) -> DetectionResult {
        match self {
            Classification::Fresh(r) | Classification::Reused(r) => r,
        }
    }
}

/// Turns a frame into per-face group matches.
///
/// Stateful implementations (frame skipping) need `&mut self`.
pub trait FrameClassifier: Send {
    fn classify(&mut self, frame: &Frame) -> Result<Classification, Box<dyn std::error::Error>>;
}
