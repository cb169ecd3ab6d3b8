pub mod channel_command_source;
pub mod log_frame_presenter;
