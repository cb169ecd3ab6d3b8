use std::time::{Duration, Instant};

use crate::arbiter::slideshow_arbiter::{Flow, Ingest, SlideshowArbiter};
use crate::capture::domain::camera_source::CameraSource;
use crate::classification::domain::detection_result::DetectionResult;
use crate::classification::domain::frame_classifier::{Classification, FrameClassifier};
use crate::pipeline::session_logger::SessionLogger;
use crate::presentation::domain::command_source::CommandSource;
use crate::presentation::domain::frame_presenter::FramePresenter;
use crate::presentation::domain::overlay::Overlay;
use crate::shared::frame::Frame;
use crate::shared::group::GroupCatalog;

/// Why a session ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEnd {
    Quit,
    /// The camera failed or ran dry. Holds the error text.
    CameraFailed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    pub end: SessionEnd,
    pub frames: usize,
    pub classified: usize,
    pub switches: usize,
    /// False if the last slideshow outlived the stop timeout.
    pub slideshow_stopped: bool,
}

/// The capture → classify → arbitrate → present loop.
///
/// Runs on the calling thread until a quit command or a camera failure.
/// Commands are polled before every capture. While paused, frames are still
/// captured and presented but not classified. Only fresh classifications
/// reach the arbiter. On every exit path the slideshow is stopped with a
/// bounded wait and the camera and presenter are released.
pub struct LiveSessionUseCase {
    camera: Box<dyn CameraSource>,
    classifier: Box<dyn FrameClassifier>,
    arbiter: SlideshowArbiter,
    presenter: Box<dyn FramePresenter>,
    commands: Box<dyn CommandSource>,
    logger: Box<dyn SessionLogger>,
    catalog: GroupCatalog,
    stop_timeout: Duration,
    frames: usize,
    classified: usize,
}

impl LiveSessionUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        camera: Box<dyn CameraSource>,
        classifier: Box<dyn FrameClassifier>,
        arbiter: SlideshowArbiter,
        presenter: Box<dyn FramePresenter>,
        commands: Box<dyn CommandSource>,
        logger: Box<dyn SessionLogger>,
        catalog: GroupCatalog,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            camera,
            classifier,
            arbiter,
            presenter,
            commands,
            logger,
            catalog,
            stop_timeout,
            frames: 0,
            classified: 0,
        }
    }

    pub fn execute(&mut self) -> Result<SessionReport, Box<dyn std::error::Error>> {
        self.logger.info("===== STUDENT RECOGNITION SYSTEM =====");
        let outcome = self.run();

        let slideshow_stopped = self.arbiter.shutdown(self.stop_timeout);
        self.camera.close();
        self.presenter.close();
        self.logger.summary();

        let end = outcome?;
        Ok(SessionReport {
            end,
            frames: self.frames,
            classified: self.classified,
            switches: self.arbiter.switches(),
            slideshow_stopped,
        })
    }

    fn run(&mut self) -> Result<SessionEnd, Box<dyn std::error::Error>> {
        loop {
            while let Some(command) = self.commands.poll() {
                log::debug!("Command: {command}");
                if self.arbiter.handle(command) == Flow::Quit {
                    return Ok(SessionEnd::Quit);
                }
            }

            let t0 = Instant::now();
            let frame = match self.camera.read() {
                Ok(frame) => frame,
                Err(e) => {
                    log::error!("Failed to grab frame: {e}");
                    return Ok(SessionEnd::CameraFailed(e.to_string()));
                }
            };
            self.frames += 1;
            self.logger.timing("capture", elapsed_ms(t0));

            let classification = if self.arbiter.is_paused() {
                None
            } else {
                self.classify(&frame)
            };
            let fresh = classification.as_ref().is_some_and(Classification::is_fresh);
            self.logger.frame(frame.index(), fresh);

            if let Some(Classification::Fresh(result)) = &classification {
                self.classified += 1;
                self.logger.metric("faces", result.detections().len() as f64);
                if let Ingest::Switched { from, to } = self.arbiter.ingest(result.majority())? {
                    self.logger.switched(from.as_ref(), &to);
                }
            }

            let result = classification
                .map(Classification::into_result)
                .unwrap_or_else(|| DetectionResult::empty(&self.catalog, frame.index()));
            let overlay = Overlay::build(&result, self.arbiter.showing(), self.arbiter.is_paused());

            let t0 = Instant::now();
            self.presenter.present(&frame, &overlay)?;
            self.logger.timing("present", elapsed_ms(t0));
        }
    }

    /// Classification failures skip the frame.
    fn classify(&mut self, frame: &Frame) -> Option<Classification> {
        let t0 = Instant::now();
        match self.classifier.classify(frame) {
            Ok(classification) => {
                if classification.is_fresh() {
                    self.logger.timing("classify", elapsed_ms(t0));
                }
                Some(classification)
            }
            Err(e) => {
                log::warn!("Classification failed on frame {}: {e}", frame.index());
                None
            }
        }
    }

    pub fn arbiter(&self) -> &SlideshowArbiter {
        &self.arbiter
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::command::Command;
    use crate::arbiter::slideshow_arbiter::ArbiterConfig;
    use crate::assets::domain::image_catalog::ImageCatalog;
    use crate::capture::domain::capture_error::CaptureError;
    use crate::classification::infrastructure::skip_frame_classifier::SkipFrameClassifier;
    use crate::pipeline::session_logger::NullSessionLogger;
    use crate::shared::group::Group;
    use crate::slideshow::slideshow_task::tests::{fast_timing, Behavior, FakeLoader, RecordingPresenter};
    use crate::classification::domain::detection_result::Detection;
    use crate::shared::bounding_box::BoundingBox;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct ScriptedCamera {
        remaining: usize,
        reads: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
    }

    impl CameraSource for ScriptedCamera {
        fn read(&mut self) -> Result<Frame, CaptureError> {
            if self.remaining == 0 {
                return Err(CaptureError::EndOfStream);
            }
            self.remaining -= 1;
            let index = self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Frame::new(vec![0; 4 * 4 * 3], 4, 4, index))
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    /// Every frame holds one face of `group`; frames listed in `fail_on` error.
    struct FixedClassifier {
        catalog: GroupCatalog,
        group: Option<Group>,
        calls: Arc<AtomicUsize>,
        fail_on: Vec<usize>,
    }

    impl FrameClassifier for FixedClassifier {
        fn classify(&mut self, frame: &Frame) -> Result<Classification, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.contains(&frame.index()) {
                return Err("inference failed".into());
            }
            let detections = vec![Detection {
                bbox: BoundingBox::new(0, 2, 2, 0),
                group: self.group.clone(),
                confidence: 80.0,
            }];
            Ok(Classification::Fresh(DetectionResult::new(&self.catalog, frame.index(), detections)))
        }
    }

    /// Releases each command once the camera has delivered `after` frames.
    struct ScheduledCommands {
        schedule: VecDeque<(usize, Command)>,
        reads: Arc<AtomicUsize>,
    }

    impl CommandSource for ScheduledCommands {
        fn poll(&mut self) -> Option<Command> {
            let (after, _) = self.schedule.front()?;
            if self.reads.load(Ordering::SeqCst) >= *after {
                self.schedule.pop_front().map(|(_, c)| c)
            } else {
                None
            }
        }
    }

    #[derive(Default)]
    struct RecordingFramePresenter {
        overlays: Arc<Mutex<Vec<Overlay>>>,
        closed: Arc<AtomicBool>,
    }

    impl FramePresenter for RecordingFramePresenter {
        fn present(&mut self, _frame: &Frame, overlay: &Overlay) -> Result<(), Box<dyn std::error::Error>> {
            self.overlays.lock().unwrap().push(overlay.clone());
            Ok(())
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    struct Harness {
        session: LiveSessionUseCase,
        classifier_calls: Arc<AtomicUsize>,
        camera_closed: Arc<AtomicBool>,
        presenter_closed: Arc<AtomicBool>,
        overlays: Arc<Mutex<Vec<Overlay>>>,
        slides: Arc<RecordingPresenter>,
    }

    struct Setup {
        frames: usize,
        group: Option<&'static str>,
        commands: Vec<(usize, Command)>,
        skip_interval: usize,
        fail_on: Vec<usize>,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                frames: 12,
                group: Some("science"),
                commands: Vec::new(),
                skip_interval: 1,
                fail_on: Vec::new(),
            }
        }
    }

    fn harness(setup: Setup) -> Harness {
        let catalog = GroupCatalog::default();
        let reads = Arc::new(AtomicUsize::new(0));
        let camera_closed = Arc::new(AtomicBool::new(false));
        let classifier_calls = Arc::new(AtomicUsize::new(0));

        let camera = ScriptedCamera {
            remaining: setup.frames,
            reads: Arc::clone(&reads),
            closed: Arc::clone(&camera_closed),
        };
        let inner = FixedClassifier {
            catalog: catalog.clone(),
            group: setup.group.and_then(|n| catalog.get(n)).cloned(),
            calls: Arc::clone(&classifier_calls),
            fail_on: setup.fail_on,
        };
        let classifier = SkipFrameClassifier::new(Box::new(inner), setup.skip_interval).unwrap();

        let mut images = ImageCatalog::new(catalog.clone());
        for group in &catalog {
            images.set(group, vec![PathBuf::from(format!("{}.png", group.name()))]);
        }
        let slides = RecordingPresenter::new(Behavior::Record);
        let config = ArbiterConfig {
            stop_timeout: Duration::from_secs(2),
            timing: fast_timing(),
            ..ArbiterConfig::default()
        };
        let arbiter = SlideshowArbiter::new(Arc::new(images), Arc::new(FakeLoader), slides.clone(), config);

        let presenter = RecordingFramePresenter::default();
        let overlays = Arc::clone(&presenter.overlays);
        let presenter_closed = Arc::clone(&presenter.closed);
        let commands = ScheduledCommands {
            schedule: setup.commands.into_iter().collect(),
            reads,
        };

        let session = LiveSessionUseCase::new(
            Box::new(camera),
            Box::new(classifier),
            arbiter,
            Box::new(presenter),
            Box::new(commands),
            Box::new(NullSessionLogger),
            catalog,
            Duration::from_secs(2),
        );
        Harness {
            session,
            classifier_calls,
            camera_closed,
            presenter_closed,
            overlays,
            slides,
        }
    }

    #[test]
    fn test_camera_end_shuts_down_cleanly() {
        let mut h = harness(Setup::default());
        let report = h.session.execute().unwrap();

        assert_eq!(report.end, SessionEnd::CameraFailed("camera stream ended".into()));
        assert_eq!(report.frames, 12);
        assert_eq!(report.classified, 12);
        assert_eq!(report.switches, 1);
        assert!(report.slideshow_stopped);
        assert!(!h.session.arbiter().is_running());
        assert!(h.camera_closed.load(Ordering::SeqCst));
        assert!(h.presenter_closed.load(Ordering::SeqCst));
        assert_eq!(*h.slides.closed.lock().unwrap(), vec!["science".to_string()]);
    }

    #[test]
    fn test_overlay_shows_slideshow_after_switch() {
        let mut h = harness(Setup::default());
        h.session.execute().unwrap();

        let overlays = h.overlays.lock().unwrap();
        assert_eq!(overlays.len(), 12);
        assert!(overlays[..9].iter().all(|o| o.banner.is_none()));
        assert_eq!(overlays[9].banner.as_ref().unwrap().text, "SLIDESHOW: SCIENCE");
        assert_eq!(overlays[0].faces[0].label, "Science 80%");
    }

    #[test]
    fn test_quit_command_ends_session() {
        let mut h = harness(Setup {
            frames: 100,
            commands: vec![(3, Command::Quit)],
            ..Setup::default()
        });
        let report = h.session.execute().unwrap();

        assert_eq!(report.end, SessionEnd::Quit);
        assert_eq!(report.frames, 3);
        assert!(h.camera_closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_paused_frames_are_not_classified() {
        let mut h = harness(Setup {
            frames: 20,
            commands: vec![(0, Command::TogglePause)],
            ..Setup::default()
        });
        let report = h.session.execute().unwrap();

        assert_eq!(h.classifier_calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.classified, 0);
        assert_eq!(report.switches, 0);
        let overlays = h.overlays.lock().unwrap();
        assert_eq!(overlays.len(), 20);
        assert!(overlays.iter().all(|o| o.paused));
    }

    #[test]
    fn test_reused_results_do_not_vote() {
        let mut h = harness(Setup {
            frames: 27,
            skip_interval: 3,
            ..Setup::default()
        });
        let report = h.session.execute().unwrap();
        assert_eq!(report.classified, 9);
        assert_eq!(report.switches, 0);

        let mut h = harness(Setup {
            frames: 28,
            skip_interval: 3,
            ..Setup::default()
        });
        let report = h.session.execute().unwrap();
        assert_eq!(report.classified, 10);
        assert_eq!(report.switches, 1);
    }

    #[test]
    fn test_classification_errors_skip_frame() {
        let mut h = harness(Setup {
            frames: 12,
            fail_on: vec![4, 7],
            ..Setup::default()
        });
        let report = h.session.execute().unwrap();

        assert_eq!(report.frames, 12);
        assert_eq!(report.classified, 10);
        assert_eq!(report.switches, 1);
    }

    #[test]
    fn test_faces_without_group_never_switch() {
        let mut h = harness(Setup {
            frames: 30,
            group: None,
            ..Setup::default()
        });
        let report = h.session.execute().unwrap();
        assert_eq!(report.switches, 0);
        assert!(h.slides.captions.lock().unwrap().is_empty());
    }
}
