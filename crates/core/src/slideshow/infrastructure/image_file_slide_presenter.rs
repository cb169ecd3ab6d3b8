use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};

use crate::shared::group::Group;
use crate::slideshow::domain::slide::Slide;
use crate::slideshow::domain::slide_presenter::SlidePresenter;

/// Publishes the current slide as an image file for an external viewer.
///
/// Each slide replaces the file atomically (write to a sibling temp file,
/// then rename) so a viewer never reads a half-written image. Slides larger
/// than `max_size` are shrunk to fit. The caption goes to the log. Closing
/// removes the file.
pub struct ImageFileSlidePresenter {
    output: PathBuf,
    max_size: Option<(u32, u32)>,
}

impl ImageFileSlidePresenter {
    pub fn new(output: PathBuf, max_size: Option<(u32, u32)>) -> Self {
        Self { output, max_size }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .output
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        let mut temp = self.output.with_file_name(name);
        if let Some(ext) = self.output.extension() {
            // Keep the real extension last so the encoder can be inferred.
            let mut stem = temp.file_name().map(|n| n.to_os_string()).unwrap_or_default();
            stem.push(".");
            stem.push(ext);
            temp.set_file_name(stem);
        }
        temp
    }
}

/// Largest size with the same aspect ratio that fits in `max`.
fn fit_within(width: u32, height: u32, max: (u32, u32)) -> (u32, u32) {
    if width <= max.0 && height <= max.1 {
        return (width, height);
    }
    let scale = (max.0 as f64 / width as f64).min(max.1 as f64 / height as f64);
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

impl SlidePresenter for ImageFileSlidePresenter {
    fn show(&self, slide: &Slide) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = slide
            .image
            .to_image()
            .ok_or("Failed to create image from slide data")?;
        let img = match self.max_size {
            Some(max) => {
                let (w, h) = fit_within(img.width(), img.height(), max);
                if (w, h) == img.dimensions() {
                    img
                } else {
                    imageops::resize(&img, w, h, FilterType::Triangle)
                }
            }
            None => img,
        };

        let temp = self.temp_path();
        img.save(&temp)?;
        std::fs::rename(&temp, &self.output)?;

        log::info!("{}  [{}]", slide.caption(), slide.file_name());
        Ok(())
    }

    fn close(&self, group: &Group) -> Result<(), Box<dyn std::error::Error>> {
        match std::fs::remove_file(&self.output) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        log::debug!("Closed {} slide output {}", group, self.output.display());
        Ok(())
    }
}
