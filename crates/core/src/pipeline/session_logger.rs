use std::collections::BTreeMap;
use std::time::Instant;

use crate::shared::group::Group;

/// Observer for live-session events.
///
/// Keeps the session loop free of output concerns; the binary logs, tests
/// stay silent.
pub trait SessionLogger: Send {
    /// A frame was captured; `classified` is false when a result was reused
    /// or ingestion is paused.
    fn frame(&mut self, index: usize, classified: bool);

    /// Duration of one stage for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Point-in-time value such as the number of faces in a frame.
    fn metric(&mut self, name: &str, value: f64);

    /// The arbiter launched a slideshow for `to`.
    fn switched(&mut self, from: Option<&Group>, to: &Group);

    fn info(&mut self, message: &str);

    /// End-of-session report. Default: nothing.
    fn summary(&self) {}
}

pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _index: usize, _classified: bool) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn switched(&mut self, _from: Option<&Group>, _to: &Group) {}
    fn info(&mut self, _message: &str) {}
}

/// Writes session events through the `log` facade.
///
/// Frame progress is reported every `throttle_frames` frames. Timings and
/// metrics are accumulated for the summary.
pub struct LogSessionLogger {
    throttle_frames: usize,
    started: Instant,
    frames_seen: usize,
    frames_classified: usize,
    switches: Vec<String>,
    timings: BTreeMap<String, (f64, usize)>,
    metrics: BTreeMap<String, (f64, usize)>,
}

impl LogSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            started: Instant::now(),
            frames_seen: 0,
            frames_classified: 0,
            switches: Vec::new(),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    pub fn frames_classified(&self) -> usize {
        self.frames_classified
    }

    pub fn average_timing(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(|(sum, n)| sum / *n as f64)
    }

    pub fn average_metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|(sum, n)| sum / *n as f64)
    }

    pub fn summary_string(&self) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} frames, {} classified, {elapsed:.1}s):",
            self.frames_seen, self.frames_classified
        )];

        for (stage, (sum, n)) in &self.timings {
            lines.push(format!(
                "  {stage:12}: avg {:6.1}ms  total {sum:7.0}ms",
                sum / *n as f64
            ));
        }
        for (name, (sum, n)) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1}", sum / *n as f64));
        }

        if self.switches.is_empty() {
            lines.push("  Slideshows: none".to_string());
        } else {
            lines.push(format!(
                "  Slideshows ({}): {}",
                self.switches.len(),
                self.switches.join(" -> ")
            ));
        }

        if self.frames_seen > 0 && elapsed > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames_seen as f64 / elapsed
            ));
        }
        lines.join("\n")
    }
}

impl Default for LogSessionLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl SessionLogger for LogSessionLogger {
    fn frame(&mut self, _index: usize, classified: bool) {
        self.frames_seen += 1;
        if classified {
            self.frames_classified += 1;
        }
        if self.frames_seen % self.throttle_frames == 0 {
            log::info!(
                "Frames: {} captured, {} classified",
                self.frames_seen,
                self.frames_classified
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.timings.entry(stage.to_string()).or_insert((0.0, 0));
        entry.0 += duration_ms;
        entry.1 += 1;
    }

    fn metric(&mut self, name: &str, value: f64) {
        let entry = self.metrics.entry(name.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    fn switched(&mut self, from: Option<&Group>, to: &Group) {
        match from {
            Some(from) => log::info!("Slideshow switched: {} -> {}", from.banner(), to.banner()),
            None => log::info!("Slideshow started: {}", to.banner()),
        }
        self.switches.push(to.banner());
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        log::info!("\n\n{}", self.summary_string());
    }
}
