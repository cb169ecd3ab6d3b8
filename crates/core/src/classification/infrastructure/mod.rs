pub mod arcface_encoder;
pub mod execution_provider;
pub mod onnx_yolo_detector;
pub mod skip_frame_classifier;
