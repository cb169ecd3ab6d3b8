pub mod command;
pub mod history;
pub mod slideshow_arbiter;
