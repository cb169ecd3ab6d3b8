//! Turns a stream of per-frame majorities into slideshow switches.
//!
//! A group takes over once it holds a stable majority of the recent
//! history and differs from the active group. The previous slideshow must
//! have exited before the next one is launched; if it does not finish within
//! the stop timeout the switch is deferred to a later frame, so at most one
//! slideshow thread is ever running.
use std::sync::Arc;
use std::time::Duration;

use crate::arbiter::command::Command;
use crate::arbiter::history::History;
use crate::assets::domain::image_catalog::ImageCatalog;
use crate::shared::constants::{HISTORY_CAPACITY, STABLE_MIN_VOTES, STOP_TIMEOUT};
use crate::shared::group::Group;
use crate::slideshow::domain::image_loader::ImageLoader;
use crate::slideshow::domain::slide_presenter::SlidePresenter;
use crate::slideshow::slideshow_task::{SlideshowHandle, SlideshowTask, SlideshowTiming};

#[derive(Clone, Copy, Debug)]
pub struct ArbiterConfig {
    pub history_capacity: usize,
    pub stable_votes: usize,
    /// Bound on waiting for a slideshow to exit.
    pub stop_timeout: Duration,
    pub timing: SlideshowTiming,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            stable_votes: STABLE_MIN_VOTES,
            stop_timeout: STOP_TIMEOUT,
            timing: SlideshowTiming::default(),
        }
    }
}

/// What one `ingest` call did.
#[derive(Clone, Debug, PartialEq)]
pub enum Ingest {
    /// Ingestion is suspended; history untouched.
    Paused,
    /// No stable new majority.
    Unchanged,
    /// A new slideshow was launched for `to`.
    Switched { from: Option<Group>, to: Group },
    /// `to` is stable but the previous slideshow has not exited yet.
    Deferred { to: Group },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct SlideshowArbiter {
    history: History,
    active: Option<Group>,
    slideshow: Option<SlideshowHandle>,
    paused: bool,
    images: Arc<ImageCatalog>,
    loader: Arc<dyn ImageLoader>,
    presenter: Arc<dyn SlidePresenter>,
    config: ArbiterConfig,
    switches: usize,
}

impl SlideshowArbiter {
    pub fn new(
        images: Arc<ImageCatalog>,
        loader: Arc<dyn ImageLoader>,
        presenter: Arc<dyn SlidePresenter>,
        config: ArbiterConfig,
    ) -> Self {
        Self {
            history: History::new(config.history_capacity, config.stable_votes),
            active: None,
            slideshow: None,
            paused: false,
            images,
            loader,
            presenter,
            config,
            switches: 0,
        }
    }

    /// Feeds one classified frame's majority.
    ///
    /// Only call this for frames that were actually classified; reused
    /// results must not vote twice.
    pub fn ingest(&mut self, majority: Option<&Group>) -> std::io::Result<Ingest> {
        if self.paused {
            return Ok(Ingest::Paused);
        }
        if let Some(group) = majority {
            self.history.push(group.clone());
        }

        let stable = match self.history.stable_majority() {
            Some(g) if Some(g) != self.active.as_ref() || self.stopping() => g.clone(),
            _ => return Ok(Ingest::Unchanged),
        };
        self.transition(stable)
    }

    /// True once the active slideshow was told to stop by a deferred switch.
    /// The active group then has to win again to get its slideshow back.
    fn stopping(&self) -> bool {
        self.active.is_some()
            && self
                .slideshow
                .as_ref()
                .is_some_and(SlideshowHandle::stop_requested)
    }

    fn transition(&mut self, to: Group) -> std::io::Result<Ingest> {
        if let Some(handle) = self.slideshow.as_mut() {
            handle.request_stop();
            if !handle.await_completion(self.config.stop_timeout) {
                log::warn!(
                    "{} slideshow still running after {:?}, deferring switch to {}",
                    handle.group(),
                    self.config.stop_timeout,
                    to
                );
                return Ok(Ingest::Deferred { to });
            }
        }
        self.slideshow = None;

        let from = self.active.replace(to.clone());
        self.history.clear();
        log::info!("Stable majority detected: {} students", to.banner());

        let task = SlideshowTask::new(
            to.clone(),
            self.images.images(&to).to_vec(),
            Arc::clone(&self.loader),
            Arc::clone(&self.presenter),
            self.config.timing,
        );
        self.slideshow = Some(task.spawn()?);
        self.switches += 1;
        Ok(Ingest::Switched { from, to })
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Quit => {
                log::info!("Exiting program...");
                self.request_stop();
                Flow::Quit
            }
            Command::Restart => {
                self.reset();
                Flow::Continue
            }
            Command::TogglePause => {
                self.paused = !self.paused;
                log::info!("Recognition {}", if self.paused { "paused" } else { "resumed" });
                Flow::Continue
            }
        }
    }

    /// Asks the current slideshow, if any, to stop. Does not wait.
    pub fn request_stop(&self) {
        if let Some(handle) = &self.slideshow {
            handle.request_stop();
        }
    }

    /// Forgets the active group and history and stops the slideshow.
    ///
    /// The handle is kept so the next switch still waits for the old task.
    pub fn reset(&mut self) {
        if self.is_running() {
            log::info!("Stopping slideshow...");
        }
        self.request_stop();
        self.history.clear();
        self.active = None;
        log::info!("Recognition reset.");
    }

    /// Stops the slideshow and waits up to `timeout`. True when it exited.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.slideshow.as_mut() else {
            return true;
        };
        handle.request_stop();
        let stopped = handle.await_completion(timeout);
        if stopped {
            self.slideshow = None;
        } else {
            log::warn!("{} slideshow did not stop within {timeout:?}", handle.group());
        }
        stopped
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn active_group(&self) -> Option<&Group> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.slideshow.as_ref().is_some_and(SlideshowHandle::is_running)
    }

    /// The group whose slideshow is on screen right now.
    pub fn showing(&self) -> Option<&Group> {
        self.slideshow
            .as_ref()
            .filter(|h| h.is_running())
            .map(SlideshowHandle::group)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn switches(&self) -> usize {
        self.switches
    }
}

impl Drop for SlideshowArbiter {
    fn drop(&mut self) {
        self.request_stop();
    }
}
