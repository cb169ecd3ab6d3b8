use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// A live frame source. Any error from `read` ends the session.
pub trait CameraSource: Send {
    fn read(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the device. Further reads fail.
    fn close(&mut self);
}
