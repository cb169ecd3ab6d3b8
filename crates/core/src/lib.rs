pub mod arbiter;
pub mod assets;
pub mod capture;
pub mod classification;
pub mod pipeline;
pub mod presentation;
pub mod shared;
pub mod slideshow;
