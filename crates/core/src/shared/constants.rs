use std::time::Duration;

pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

/// Groups used when neither the CLI nor the settings file names any.
pub const DEFAULT_GROUPS: &[&str] = &["science", "arts", "commerce"];

/// Per-frame majority labels kept in the stability window.
pub const HISTORY_CAPACITY: usize = 15;

/// Votes a group needs inside the window to count as the stable majority.
pub const STABLE_MIN_VOTES: usize = 10;

/// Strict upper bound on embedding distance for a face to match a group.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Classify every Nth captured frame, reusing the last result in between.
pub const PROCESS_EVERY_N_FRAMES: usize = 3;

/// Frames are shrunk by this factor before detection and encoding.
pub const DETECTION_SCALE: f64 = 0.25;

pub const SLIDE_INTERVAL: Duration = Duration::from_secs(3);

/// Granularity at which a running slideshow checks for a stop request.
pub const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound the main loop waits for a slideshow to acknowledge a stop.
pub const STOP_TIMEOUT: Duration = Duration::from_millis(500);

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Extension of precomputed reference embeddings (a JSON array of floats).
pub const EMBEDDING_EXTENSION: &str = "json";
