//! YOLO face detector on ONNX Runtime.
//!
//! Letterboxes the frame to the model's square input, runs one inference and
//! keeps boxes above the confidence floor after greedy non-maximum
//! suppression. Any keypoint columns in the output are ignored.
use std::path::Path;

use ndarray::Array4;

use crate::classification::domain::face_detector::FaceDetector;
use crate::classification::infrastructure::execution_provider::{
    intra_op_threads, preferred_execution_providers,
};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::{Frame, CHANNELS};

/// Used when the model input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.25;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value, YOLO convention.
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloFaceDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloFaceDetector {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_intra_threads(intra_op_threads())?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        // NCHW: [1, 3, H, W]
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { shape, .. } if shape.len() >= 4 && shape[2] > 0 => {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!("YOLO face detector loaded, input {input_size}x{input_size}");
        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let letterboxed = letterbox(frame, self.input_size);

        let input = ort::value::Tensor::from_array(letterboxed.tensor.clone())?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        // Either [1, features, detections] or [1, detections, features].
        let transposed = shape[1] < shape[2];
        let (num_dets, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if num_feats < 5 {
            return Ok(Vec::new());
        }
        let at = |det: usize, feat: usize| -> f64 {
            let i = if transposed {
                feat * num_dets + det
            } else {
                det * num_feats + feat
            };
            data[i] as f64
        };

        let mut candidates = Vec::new();
        for d in 0..num_dets {
            let score = at(d, 4);
            if score < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (at(d, 0), at(d, 1), at(d, 2), at(d, 3));
            let bbox = letterboxed.unmap(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0);
            if let Some(bbox) = bbox.clamp_to(frame.width(), frame.height()) {
                candidates.push((bbox, score));
            }
        }

        Ok(nms(candidates, NMS_IOU_THRESH))
    }
}

struct Letterboxed {
    tensor: Array4<f32>,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterboxed {
    /// Letterbox corner coordinates back to source-frame pixels.
    fn unmap(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        let px = self.pad_x as f64;
        let py = self.pad_y as f64;
        BoundingBox::from_corners(
            (x1 - px) / self.scale,
            (y1 - py) / self.scale,
            (x2 - px) / self.scale,
            (y2 - py) / self.scale,
        )
    }
}

/// Aspect-preserving nearest-neighbour resize into a padded square NCHW tensor.
fn letterbox(frame: &Frame, target_size: u32) -> Letterboxed {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let size = target_size as usize;
    let mut tensor = Array4::<f32>::from_elem((1, CHANNELS, size, size), PAD_VALUE);

    let src = frame.data();
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;
    for y in 0..new_h as usize {
        let sy = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            let offset = (sy * src_w + sx) * CHANNELS;
            for c in 0..CHANNELS {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] = src[offset + c] as f32 / 255.0;
            }
        }
    }

    Letterboxed {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}

/// Greedy NMS, highest score first.
fn nms(mut candidates: Vec<(BoundingBox, f64)>, iou_thresh: f64) -> Vec<BoundingBox> {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut keep: Vec<BoundingBox> = Vec::new();
    for (bbox, _) in candidates {
        if keep.iter().all(|k| k.iou(&bbox) <= iou_thresh) {
            keep.push(bbox);
        }
    }
    keep
}
