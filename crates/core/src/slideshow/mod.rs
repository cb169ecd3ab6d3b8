pub mod domain;
pub mod infrastructure;
pub mod slideshow_task;
