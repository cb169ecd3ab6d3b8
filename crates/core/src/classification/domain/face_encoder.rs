use crate::classification::domain::embedding::Embedding;
use crate::shared::frame::Frame;

/// Domain interface for turning a cropped face into an identity embedding.
pub trait FaceEncoder: Send {
    fn encode(&self, face: &Frame) -> Result<Embedding, Box<dyn std::error::Error>>;
}
