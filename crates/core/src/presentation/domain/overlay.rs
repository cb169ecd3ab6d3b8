use crate::classification::domain::detection_result::DetectionResult;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::group::Group;

pub type Rgb = [u8; 3];

pub const UNKNOWN_COLOR: Rgb = [200, 200, 200];
pub const TITLE_COLOR: Rgb = [0, 0, 0];
pub const ALERT_COLOR: Rgb = [255, 0, 0];

/// Per-group colors by catalog position, repeating past the end.
const PALETTE: [Rgb; 6] = [
    [0, 255, 0],
    [255, 0, 0],
    [0, 0, 255],
    [255, 255, 0],
    [255, 0, 255],
    [0, 255, 255],
];

pub fn group_color(group: Option<&Group>) -> Rgb {
    group.map_or(UNKNOWN_COLOR, |g| PALETTE[g.rank() % PALETTE.len()])
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceBox {
    pub bbox: BoundingBox,
    pub color: Rgb,
    /// `"Science 87%"` or `"Unknown"`.
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub color: Rgb,
}

impl TextLine {
    fn new(text: impl Into<String>, color: Rgb) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// What to draw on top of a camera frame. Rendering is up to the presenter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    pub faces: Vec<FaceBox>,
    /// Top-left block: title, one count line per group, then the majority.
    pub lines: Vec<TextLine>,
    /// Bottom line while a slideshow is running.
    pub banner: Option<TextLine>,
    pub paused: bool,
}

impl Overlay {
    pub fn build(result: &DetectionResult, showing: Option<&Group>, paused: bool) -> Self {
        let faces = result
            .detections()
            .iter()
            .map(|d| FaceBox {
                bbox: d.bbox,
                color: group_color(d.group.as_ref()),
                label: match &d.group {
                    Some(g) => format!("{} {:.0}%", g.title(), d.confidence),
                    None => "Unknown".to_string(),
                },
            })
            .collect();

        let mut lines = vec![TextLine::new("Detected Students:", TITLE_COLOR)];
        for (group, n) in result.counts() {
            lines.push(TextLine::new(format!("{}: {n}", group.title()), group_color(Some(group))));
        }
        if let Some(majority) = result.majority() {
            lines.push(TextLine::new(format!("MAJORITY: {}", majority.banner()), ALERT_COLOR));
        }

        let banner = showing.map(|g| TextLine::new(format!("SLIDESHOW: {}", g.banner()), ALERT_COLOR));

        Self {
            faces,
            lines,
            banner,
            paused,
        }
    }

    /// One-line text rendering, used for logs.
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = self.lines.iter().skip(1).map(|l| l.text.as_str()).collect();
        if let Some(banner) = &self.banner {
            parts.push(&banner.text);
        }
        if self.paused {
            parts.push("PAUSED");
        }
        parts.join(" | ")
    }
}
