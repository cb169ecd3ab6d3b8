use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to open camera {device:?}: {reason}")]
    Open { device: String, reason: String },
    #[error("failed to grab frame: {0}")]
    Read(String),
    #[error("camera stream ended")]
    EndOfStream,
}

impl From<ffmpeg_next::Error> for CaptureError {
    fn from(e: ffmpeg_next::Error) -> Self {
        CaptureError::Read(e.to_string())
    }
}
