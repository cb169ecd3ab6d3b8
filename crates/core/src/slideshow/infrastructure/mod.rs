pub mod image_file_loader;
pub mod image_file_slide_presenter;
