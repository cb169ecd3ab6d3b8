mod settings;

use std::io::BufReader;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use faceshow_core::arbiter::command::Command;
use faceshow_core::arbiter::slideshow_arbiter::{ArbiterConfig, SlideshowArbiter};
use faceshow_core::assets::infrastructure::directory_scanner::scan_slides;
use faceshow_core::assets::infrastructure::reference_loader::ReferenceLoader;
use faceshow_core::capture::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;
use faceshow_core::classification::domain::face_classifier::FaceClassifier;
use faceshow_core::classification::domain::group_matcher::GroupMatcher;
use faceshow_core::classification::infrastructure::arcface_encoder::ArcFaceEncoder;
use faceshow_core::classification::infrastructure::onnx_yolo_detector::OnnxYoloFaceDetector;
use faceshow_core::classification::infrastructure::skip_frame_classifier::SkipFrameClassifier;
use faceshow_core::pipeline::live_session_use_case::{LiveSessionUseCase, SessionEnd};
use faceshow_core::pipeline::session_logger::LogSessionLogger;
use faceshow_core::presentation::infrastructure::channel_command_source::ChannelCommandSource;
use faceshow_core::presentation::infrastructure::log_frame_presenter::LogFramePresenter;
use faceshow_core::shared::constants::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, STOP_POLL_INTERVAL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use faceshow_core::shared::group::GroupCatalog;
use faceshow_core::shared::model_resolver::{self, ModelSpec, ProgressFn};
use faceshow_core::slideshow::infrastructure::image_file_loader::ImageFileLoader;
use faceshow_core::slideshow::infrastructure::image_file_slide_presenter::ImageFileSlidePresenter;
use faceshow_core::slideshow::slideshow_task::SlideshowTiming;

use settings::Settings;

const SLIDE_MAX_SIZE: (u32, u32) = (800, 600);

/// Shows a slideshow for whichever student group dominates the camera view.
///
/// Options left unset fall back to the settings file, then to built-in defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "faceshow")]
struct Cli {
    /// Folder with one sub-folder of reference photos per group.
    #[arg(long)]
    references: Option<PathBuf>,

    /// Folder with one sub-folder of slide images per group.
    #[arg(long)]
    slides: Option<PathBuf>,

    /// Group names in display order (comma-separated).
    #[arg(long, value_delimiter = ',')]
    groups: Option<Vec<String>>,

    /// Camera device or video file (default /dev/video0).
    #[arg(long)]
    camera: Option<String>,

    /// Input format for the camera, e.g. video4linux2 or avfoundation.
    #[arg(long)]
    camera_format: Option<String>,

    /// Maximum embedding distance for a face to match a group (default 0.6).
    #[arg(long)]
    threshold: Option<f64>,

    /// Classify every Nth frame (default 3).
    #[arg(long)]
    process_every: Option<usize>,

    /// Seconds each slide stays up (default 3).
    #[arg(long)]
    slide_interval: Option<f64>,

    /// Downscale factor applied before detection (default 0.25).
    #[arg(long)]
    scale: Option<f64>,

    /// Where the current slide is written.
    #[arg(long)]
    slide_output: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    detector_confidence: Option<f64>,

    /// Directory searched for model files before the cache.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Settings file (default: platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings to the settings file and exit.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Overlays every option given on the command line onto `settings`.
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(v) = &self.references {
            settings.references = v.clone();
        }
        if let Some(v) = &self.slides {
            settings.slides = v.clone();
        }
        if let Some(v) = &self.groups {
            settings.groups = v.clone();
        }
        if let Some(v) = &self.camera {
            settings.camera = v.clone();
        }
        if let Some(v) = &self.camera_format {
            settings.camera_format = Some(v.clone());
        }
        if let Some(v) = self.threshold {
            settings.threshold = v;
        }
        if let Some(v) = self.process_every {
            settings.process_every = v;
        }
        if let Some(v) = self.slide_interval {
            settings.slide_interval_secs = v;
        }
        if let Some(v) = self.scale {
            settings.scale = v;
        }
        if let Some(v) = &self.slide_output {
            settings.slide_output = v.clone();
        }
        if let Some(v) = self.detector_confidence {
            settings.detector_confidence = v;
        }
        if let Some(v) = &self.models_dir {
            settings.models_dir = Some(v.clone());
        }
        settings
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.apply(Settings::load(cli.config.as_deref()));
    let catalog = validate(&settings)?;

    if cli.save_config {
        let path = cli
            .config
            .clone()
            .or_else(Settings::default_path)
            .ok_or("No config directory available; pass --config")?;
        settings.save_to(&path)?;
        log::info!("Settings written to {}", path.display());
        return Ok(());
    }

    let detector_path = resolve_model(YOLO_MODEL_NAME, YOLO_MODEL_URL, &settings, "face detection")?;
    let encoder_path = resolve_model(
        EMBEDDING_MODEL_NAME,
        EMBEDDING_MODEL_URL,
        &settings,
        "face embedding",
    )?;

    let mut loader = ReferenceLoader::new(
        Box::new(OnnxYoloFaceDetector::new(
            &detector_path,
            settings.detector_confidence,
        )?),
        Box::new(ArcFaceEncoder::new(&encoder_path)?),
    );
    let references = Arc::new(loader.load(&settings.references, &catalog));
    if references.total() == 0 {
        log::warn!(
            "No reference faces found under {}; every face will be Unknown",
            settings.references.display()
        );
    }
    let (detector, encoder) = loader.into_parts();

    let classifier = FaceClassifier::new(
        detector,
        encoder,
        references,
        GroupMatcher::new(settings.threshold),
        settings.scale,
    )?;
    let classifier = SkipFrameClassifier::new(Box::new(classifier), settings.process_every)?;

    let images = Arc::new(scan_slides(&settings.slides, &catalog));
    for (group, paths) in images.iter() {
        log::info!("{}: {} slide(s)", group.title(), paths.len());
    }

    let arbiter = SlideshowArbiter::new(
        images,
        Arc::new(ImageFileLoader::new()),
        Arc::new(ImageFileSlidePresenter::new(
            settings.slide_output.clone(),
            Some(SLIDE_MAX_SIZE),
        )),
        ArbiterConfig {
            stop_timeout: settings.stop_timeout(),
            timing: SlideshowTiming {
                interval: settings.slide_interval(),
                poll: STOP_POLL_INTERVAL,
            },
            ..ArbiterConfig::default()
        },
    );

    let camera = FfmpegCameraSource::open(&settings.camera, settings.camera_format.as_deref())?;
    let commands = ChannelCommandSource::from_lines(BufReader::new(std::io::stdin()))?;

    log::info!("Slides are written to {}", settings.slide_output.display());
    for line in Command::help() {
        log::info!("{line}");
    }

    let mut use_case = LiveSessionUseCase::new(
        Box::new(camera),
        Box::new(classifier),
        arbiter,
        Box::new(LogFramePresenter::default()),
        Box::new(commands),
        Box::new(LogSessionLogger::default()),
        catalog,
        settings.stop_timeout(),
    );
    let report = use_case.execute()?;

    match &report.end {
        SessionEnd::Quit => log::info!("Session ended by user"),
        SessionEnd::CameraFailed(reason) => log::error!("Session ended: {reason}"),
    }
    log::info!(
        "{} frames, {} classified, {} slideshow switch(es)",
        report.frames,
        report.classified,
        report.switches
    );
    if !report.slideshow_stopped {
        log::warn!("Slideshow did not stop within the timeout");
    }
    Ok(())
}

fn validate(settings: &Settings) -> Result<GroupCatalog, Box<dyn std::error::Error>> {
    settings.validate()?;
    Ok(GroupCatalog::new(&settings.groups)?)
}

fn resolve_model(
    name: &'static str,
    url: &'static str,
    settings: &Settings,
    label: &'static str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {name}");
    let path = model_resolver::resolve(
        ModelSpec { name, url },
        settings.models_dir.as_deref(),
        Some(download_progress(label)),
    )?;
    eprintln!();
    Ok(path)
}

fn download_progress(label: &'static str) -> ProgressFn {
    Box::new(move |downloaded: u64, total: u64| {
        if total > 0 {
            let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
            eprint!("\rDownloading {label} model... {pct}%");
        } else {
            eprint!("\rDownloading {label} model... {downloaded} bytes");
        }
    })
}
