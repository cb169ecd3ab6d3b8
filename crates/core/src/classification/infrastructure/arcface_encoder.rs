//! ArcFace identity embeddings on ONNX Runtime.
use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;

use crate::classification::domain::embedding::Embedding;
use crate::classification::domain::face_encoder::FaceEncoder;
use crate::classification::infrastructure::execution_provider::{
    intra_op_threads, preferred_execution_providers,
};
use crate::shared::frame::{Frame, CHANNELS};

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

/// Encodes face crops as L2-normalized ArcFace vectors.
///
/// The session sits behind a mutex because `ort` needs `&mut` to run while
/// `FaceEncoder::encode` takes `&self`.
pub struct ArcFaceEncoder {
    session: Mutex<ort::session::Session>,
}

impl ArcFaceEncoder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_op_threads())?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl FaceEncoder for ArcFaceEncoder {
    fn encode(&self, face: &Frame) -> Result<Embedding, Box<dyn std::error::Error>> {
        let input = ort::value::Tensor::from_array(preprocess(face))?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs![input])?;
        let array = outputs[0].try_extract_array::<f32>()?;
        let values = array.as_slice().ok_or("Cannot get embedding slice")?;
        Ok(Embedding::normalized(values.to_vec()))
    }
}

/// Resize to 112x112 (pixel-centre sampling), normalize to [-1, 1], NCHW.
fn preprocess(face: &Frame) -> Array4<f32> {
    let src = face.data();
    let src_w = face.width() as usize;
    let src_h = face.height() as usize;

    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, INPUT_SIZE, INPUT_SIZE));
    if src_w == 0 || src_h == 0 {
        return tensor;
    }

    for y in 0..INPUT_SIZE {
        let sy = (((y as f64 + 0.5) * src_h as f64 / INPUT_SIZE as f64) as usize).min(src_h - 1);
        for x in 0..INPUT_SIZE {
            let sx = (((x as f64 + 0.5) * src_w as f64 / INPUT_SIZE as f64) as usize).min(src_w - 1);
            let offset = (sy * src_w + sx) * CHANNELS;
            for c in 0..CHANNELS {
                tensor[[0, c, y, x]] = (src[offset + c] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }
    tensor
}
