use crate::presentation::domain::overlay::Overlay;
use crate::shared::frame::Frame;

/// Displays live frames with their overlay.
pub trait FramePresenter: Send {
    fn present(&mut self, frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>>;

    fn close(&mut self) {}
}
