pub mod image_loader;
pub mod slide;
pub mod slide_presenter;
