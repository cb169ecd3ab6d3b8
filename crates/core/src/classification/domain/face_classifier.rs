use std::sync::Arc;

use crate::classification::domain::detection_result::{Detection, DetectionResult};
use crate::classification::domain::face_detector::FaceDetector;
use crate::classification::domain::face_encoder::FaceEncoder;
use crate::classification::domain::frame_classifier::{Classification, FrameClassifier};
use crate::classification::domain::group_matcher::GroupMatcher;
use crate::classification::domain::reference_set::ReferenceSet;
use crate::shared::frame::Frame;

/// Detect, encode and match every face in a frame.
///
/// The frame is shrunk by `scale` before detection and encoding; boxes in
/// the result are mapped back to full-frame coordinates. Faces whose crop is
/// empty after clamping are dropped.
pub struct FaceClassifier {
    detector: Box<dyn FaceDetector>,
    encoder: Box<dyn FaceEncoder>,
    references: Arc<ReferenceSet>,
    matcher: GroupMatcher,
    scale: f64,
}

impl FaceClassifier {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        encoder: Box<dyn FaceEncoder>,
        references: Arc<ReferenceSet>,
        matcher: GroupMatcher,
        scale: f64,
    ) -> Result<Self, &'static str> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err("scale must be in (0, 1]");
        }
        Ok(Self {
            detector,
            encoder,
            references,
            matcher,
            scale,
        })
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    fn analyse(&mut self, frame: &Frame) -> Result<DetectionResult, Box<dyn std::error::Error>> {
        let small = frame.scaled(self.scale);
        let boxes = self.detector.detect(&small)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let Some(crop) = small.crop(&bbox) else {
                continue;
            };
            let embedding = self.encoder.encode(&crop)?;
            let matched = self.matcher.match_face(&embedding, &self.references);
            detections.push(Detection {
                bbox: bbox.scaled(1.0 / self.scale),
                group: matched.group,
                confidence: matched.confidence,
            });
        }

        Ok(DetectionResult::new(
            self.references.catalog(),
            frame.index(),
            detections,
        ))
    }
}

impl FrameClassifier for FaceClassifier {
    fn classify(&mut self, frame: &Frame) -> Result<Classification, Box<dyn std::error::Error>> {
        self.analyse(frame).map(Classification::Fresh)
    }
}
