//! Background slideshow bound to one group.
//!
//! The arbiter owns a [`SlideshowHandle`] per launched task. Stopping is
//! cooperative: the task polls its stop flag while waiting between slides
//! and reports completion over a one-shot channel, which is sent from a drop
//! guard so it fires on every exit path, panics included.
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::shared::constants::{SLIDE_INTERVAL, STOP_POLL_INTERVAL};
use crate::shared::group::Group;
use crate::slideshow::domain::image_loader::ImageLoader;
use crate::slideshow::domain::slide::Slide;
use crate::slideshow::domain::slide_presenter::SlidePresenter;

#[derive(Clone, Copy, Debug)]
pub struct SlideshowTiming {
    /// Time each slide stays up.
    pub interval: Duration,
    /// Upper bound on how long a stop request goes unnoticed.
    pub poll: Duration,
}

impl Default for SlideshowTiming {
    fn default() -> Self {
        Self {
            interval: SLIDE_INTERVAL,
            poll: STOP_POLL_INTERVAL,
        }
    }
}

#[derive(Default)]
struct Signals {
    stop_requested: AtomicBool,
    running: AtomicBool,
}

/// Clears `running` and reports completion when the task thread exits.
struct CompletionGuard {
    signals: Arc<Signals>,
    done: Sender<()>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.signals.running.store(false, Ordering::SeqCst);
        let _ = self.done.try_send(());
    }
}

pub struct SlideshowTask {
    group: Group,
    images: Vec<PathBuf>,
    loader: Arc<dyn ImageLoader>,
    presenter: Arc<dyn SlidePresenter>,
    timing: SlideshowTiming,
}

impl SlideshowTask {
    pub fn new(
        group: Group,
        images: Vec<PathBuf>,
        loader: Arc<dyn ImageLoader>,
        presenter: Arc<dyn SlidePresenter>,
        timing: SlideshowTiming,
    ) -> Self {
        Self {
            group,
            images,
            loader,
            presenter,
            timing,
        }
    }

    /// Starts the slideshow thread.
    ///
    /// `running` is raised here, before the thread exists. With no images
    /// nothing is spawned and the returned handle is already complete.
    pub fn spawn(self) -> std::io::Result<SlideshowHandle> {
        let group = self.group.clone();
        let signals = Arc::new(Signals::default());
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        if self.images.is_empty() {
            log::info!("No slides available for {}", group.title());
            return Ok(SlideshowHandle {
                group,
                signals,
                done: done_rx,
                thread: None,
                finished: true,
            });
        }

        signals.running.store(true, Ordering::SeqCst);
        let task_signals = Arc::clone(&signals);
        let spawned = thread::Builder::new()
            .name(format!("slideshow-{}", group.name()))
            .spawn(move || {
                let _guard = CompletionGuard {
                    signals: Arc::clone(&task_signals),
                    done: done_tx,
                };
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(&task_signals)));
                if let Err(payload) = outcome {
                    log::error!(
                        "Slideshow for {} panicked: {}",
                        self.group,
                        panic_message(payload.as_ref())
                    );
                }
            });

        match spawned {
            Ok(thread) => Ok(SlideshowHandle {
                group,
                signals,
                done: done_rx,
                thread: Some(thread),
                finished: false,
            }),
            Err(e) => {
                signals.running.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    fn run(&self, signals: &Signals) {
        let banner = self.group.banner();
        log::info!("----- STARTING {banner} SLIDESHOW -----");

        let total = self.images.len();
        let mut position = 0;
        while !signals.stop_requested.load(Ordering::SeqCst) {
            let path = &self.images[position];
            match self.loader.load(path) {
                Ok(image) => {
                    let slide = Slide {
                        group: self.group.clone(),
                        position,
                        total,
                        path: path.clone(),
                        image,
                    };
                    if let Err(e) = self.presenter.show(&slide) {
                        log::error!("Slide presenter failed, ending {banner} slideshow: {e}");
                        break;
                    }
                }
                Err(e) => log::warn!("Could not load {}: {e}", path.display()),
            }

            position = (position + 1) % total;
            if wait_for_stop(signals, self.timing) {
                break;
            }
        }

        if let Err(e) = self.presenter.close(&self.group) {
            log::warn!("Failed to close {banner} slideshow: {e}");
        }
        log::info!("----- {banner} SLIDESHOW ENDED -----");
    }
}

/// Sleeps for one slide interval in `poll` steps. True if a stop was seen.
fn wait_for_stop(signals: &Signals, timing: SlideshowTiming) -> bool {
    let deadline = Instant::now() + timing.interval;
    loop {
        if signals.stop_requested.load(Ordering::SeqCst) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(timing.poll.min(deadline - now));
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Control side of a launched slideshow.
///
/// Dropping a handle whose task has not completed requests a stop and
/// detaches the thread.
pub struct SlideshowHandle {
    group: Group,
    signals: Arc<Signals>,
    done: Receiver<()>,
    thread: Option<JoinHandle<()>>,
    finished: bool,
}

impl SlideshowHandle {
    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn request_stop(&self) {
        self.signals.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.signals.stop_requested.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.signals.running.load(Ordering::SeqCst)
    }

    /// Waits up to `timeout` for the task to exit. True once it has.
    ///
    /// Does not request a stop by itself.
    pub fn await_completion(&mut self, timeout: Duration) -> bool {
        if self.finished {
            return true;
        }
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.finished = true;
                if let Some(thread) = self.thread.take() {
                    if thread.join().is_err() {
                        log::error!("Slideshow thread for {} did not exit cleanly", self.group);
                    }
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

impl Drop for SlideshowHandle {
    fn drop(&mut self) {
        if !self.finished {
            self.request_stop();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::shared::frame::Frame;
    use crate::shared::group::GroupCatalog;
    use std::path::Path;
    use std::sync::Mutex;

    /// Decodes any path to a 1x1 frame, failing for names starting with `bad`.
    pub(crate) struct FakeLoader;

    impl ImageLoader for FakeLoader {
        fn load(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name.starts_with("bad") {
                return Err(format!("cannot decode {name}").into());
            }
            Ok(Frame::new(vec![0, 0, 0], 1, 1, 0))
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    pub(crate) enum Behavior {
        Record,
        Fail,
        Panic,
    }

    pub(crate) struct RecordingPresenter {
        behavior: Behavior,
        pub captions: Mutex<Vec<String>>,
        pub closed: Mutex<Vec<String>>,
    }

    impl RecordingPresenter {
        pub(crate) fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                captions: Mutex::new(Vec::new()),
                closed: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn shown(&self) -> usize {
            self.captions.lock().unwrap().len()
        }
    }

    impl SlidePresenter for RecordingPresenter {
        fn show(&self, slide: &Slide) -> Result<(), Box<dyn std::error::Error>> {
            match self.behavior {
                Behavior::Record => {
                    self.captions.lock().unwrap().push(slide.caption());
                    Ok(())
                }
                Behavior::Fail => Err("display gone".into()),
                Behavior::Panic => panic!("display exploded"),
            }
        }

        fn close(&self, group: &Group) -> Result<(), Box<dyn std::error::Error>> {
            self.closed.lock().unwrap().push(group.name().to_string());
            Ok(())
        }
    }

    pub(crate) fn fast_timing() -> SlideshowTiming {
        SlideshowTiming {
            interval: Duration::from_millis(10),
            poll: Duration::from_millis(2),
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn science() -> Group {
        GroupCatalog::default().get("science").unwrap().clone()
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_empty_list_never_runs() {
        let presenter = RecordingPresenter::new(Behavior::Record);
        let task = SlideshowTask::new(science(), vec![], Arc::new(FakeLoader), presenter.clone(), fast_timing());
        let mut handle = task.spawn().unwrap();

        assert!(!handle.is_running());
        assert!(handle.await_completion(Duration::ZERO));
        assert_eq!(presenter.shown(), 0);
        assert!(presenter.closed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rotates_through_images_until_stopped() {
        let presenter = RecordingPresenter::new(Behavior::Record);
        let task = SlideshowTask::new(
            science(),
            paths(&["a.png", "b.png", "c.png"]),
            Arc::new(FakeLoader),
            presenter.clone(),
            fast_timing(),
        );
        let mut handle = task.spawn().unwrap();
        assert!(handle.is_running());

        wait_until(|| presenter.shown() >= 4);
        handle.request_stop();
        assert!(handle.await_completion(Duration::from_secs(2)));
        assert!(!handle.is_running());

        let captions = presenter.captions.lock().unwrap();
        assert_eq!(
            &captions[..4],
            &["SCIENCE - 1/3", "SCIENCE - 2/3", "SCIENCE - 3/3", "SCIENCE - 1/3"]
        );
        assert_eq!(*presenter.closed.lock().unwrap(), vec!["science".to_string()]);
    }

    #[test]
    fn test_unloadable_image_is_skipped() {
        let presenter = RecordingPresenter::new(Behavior::Record);
        let task = SlideshowTask::new(
            science(),
            paths(&["a.png", "bad.png", "c.png"]),
            Arc::new(FakeLoader),
            presenter.clone(),
            fast_timing(),
        );
        let mut handle = task.spawn().unwrap();

        wait_until(|| presenter.shown() >= 3);
        handle.request_stop();
        assert!(handle.await_completion(Duration::from_secs(2)));

        let captions = presenter.captions.lock().unwrap();
        assert_eq!(&captions[..3], &["SCIENCE - 1/3", "SCIENCE - 3/3", "SCIENCE - 1/3"]);
    }

    #[test]
    fn test_stop_is_seen_within_poll_interval() {
        let presenter = RecordingPresenter::new(Behavior::Record);
        let timing = SlideshowTiming {
            interval: Duration::from_secs(30),
            poll: Duration::from_millis(10),
        };
        let task = SlideshowTask::new(science(), paths(&["a.png"]), Arc::new(FakeLoader), presenter.clone(), timing);
        let mut handle = task.spawn().unwrap();

        wait_until(|| presenter.shown() == 1);
        assert!(!handle.await_completion(Duration::from_millis(20)));
        assert!(handle.is_running());

        handle.request_stop();
        assert!(handle.await_completion(Duration::from_secs(2)));
        assert!(!handle.is_running());
    }

    #[test]
    fn test_presenter_failure_ends_task() {
        let presenter = RecordingPresenter::new(Behavior::Fail);
        let task = SlideshowTask::new(science(), paths(&["a.png"]), Arc::new(FakeLoader), presenter.clone(), fast_timing());
        let mut handle = task.spawn().unwrap();

        assert!(handle.await_completion(Duration::from_secs(2)));
        assert!(!handle.is_running());
        assert!(!handle.stop_requested());
    }

    #[test]
    fn test_panic_is_contained_and_clears_running() {
        let presenter = RecordingPresenter::new(Behavior::Panic);
        let task = SlideshowTask::new(science(), paths(&["a.png"]), Arc::new(FakeLoader), presenter, fast_timing());
        let mut handle = task.spawn().unwrap();

        assert!(handle.await_completion(Duration::from_secs(2)));
        assert!(!handle.is_running());
    }

    #[test]
    fn test_wait_for_stop_returns_early() {
        let signals = Signals::default();
        signals.stop_requested.store(true, Ordering::SeqCst);
        let started = Instant::now();
        assert!(wait_for_stop(&signals, SlideshowTiming::default()));
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_wait_for_stop_times_out() {
        let signals = Signals::default();
        assert!(!wait_for_stop(&signals, fast_timing()));
    }
}
