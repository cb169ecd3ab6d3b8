pub mod detection_result;
pub mod embedding;
pub mod face_classifier;
pub mod face_detector;
pub mod face_encoder;
pub mod frame_classifier;
pub mod group_matcher;
pub mod reference_set;
