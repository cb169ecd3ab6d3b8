pub mod command_source;
pub mod frame_presenter;
pub mod overlay;
