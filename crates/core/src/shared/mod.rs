pub mod bounding_box;
pub mod constants;
pub mod frame;
pub mod group;
pub mod model_resolver;
