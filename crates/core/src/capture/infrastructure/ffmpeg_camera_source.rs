//! Camera capture through libavdevice.
use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::capture::domain::camera_source::CameraSource;
use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::{Frame, CHANNELS};

/// Opens a V4L2/AVFoundation/DirectShow device, or any file or URL ffmpeg
/// can demux, and decodes its best video stream to RGB24 frames.
pub struct FfmpegCameraSource {
    device: String,
    input: Option<Input>,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    frame_index: usize,
}

// Safety: the source is owned and driven by the capture loop only; the raw
// ffmpeg pointers never cross threads while in use.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    /// `format` names an ffmpeg input format such as `video4linux2`. When it
    /// is `None`, `/dev/video*` paths use the platform capture format and
    /// everything else is probed.
    pub fn open(device: &str, format: Option<&str>) -> Result<Self, CaptureError> {
        let open_err = |reason: String| CaptureError::Open {
            device: device.to_string(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| open_err(e.to_string()))?;
        ffmpeg_next::device::register_all();

        let format = format.or_else(|| default_format(device));
        let input = match format {
            Some(name) => {
                let fmt = ffmpeg_next::device::input::video()
                    .find(|f| f.name().split(',').any(|n| n == name))
                    .ok_or_else(|| open_err(format!("input format '{name}' not available")))?;
                ffmpeg_next::format::open_with(
                    &device,
                    &ffmpeg_next::format::Format::Input(fmt),
                    ffmpeg_next::Dictionary::new(),
                )
                .map_err(|e| open_err(e.to_string()))?
                .input()
            }
            None => ffmpeg_next::format::input(&device).map_err(|e| open_err(e.to_string()))?,
        };

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| open_err("no video stream".into()))?;
        let stream_index = stream.index();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|e| open_err(e.to_string()))?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| open_err(e.to_string()))?;

        log::info!("Camera {device} opened at {width}x{height}");
        Ok(Self {
            device: device.to_string(),
            input: Some(input),
            decoder,
            scaler,
            stream_index,
            width,
            height,
            frame_index: 0,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, CaptureError> {
        let mut decoded = Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb = Video::empty();
        self.scaler.run(&decoded, &mut rgb)?;

        let frame = Frame::new(
            packed_rgb(&rgb, self.width, self.height),
            self.width,
            self.height,
            self.frame_index,
        );
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

fn default_format(device: &str) -> Option<&'static str> {
    if !device.starts_with("/dev/video") || Path::new(device).is_file() {
        return None;
    }
    if cfg!(target_os = "linux") {
        Some("video4linux2")
    } else {
        None
    }
}

/// Copies the RGB plane row by row, dropping line padding.
fn packed_rgb(rgb: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_len = width as usize * CHANNELS;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}

impl CameraSource for FfmpegCameraSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        if let Some(frame) = self.try_receive()? {
            return Ok(frame);
        }
        loop {
            let Some(input) = self.input.as_mut() else {
                return Err(CaptureError::Read(format!("{} is closed", self.device)));
            };
            let Some((stream, packet)) = input.packets().next() else {
                let _ = self.decoder.send_eof();
                return self.try_receive()?.ok_or(CaptureError::EndOfStream);
            };
            if stream.index() != self.stream_index {
                continue;
            }
            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Dropping undecodable packet: {e}");
                continue;
            }
            if let Some(frame) = self.try_receive()? {
                return Ok(frame);
            }
        }
    }

    fn close(&mut self) {
        if self.input.take().is_some() {
            log::info!("Camera {} released", self.device);
        }
    }
}

impl Drop for FfmpegCameraSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_for_regular_paths() {
        assert_eq!(default_format("clip.mp4"), None);
        assert_eq!(default_format("rtsp://camera.local/stream"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_default_format_for_v4l2_device() {
        assert_eq!(default_format("/dev/video0"), Some("video4linux2"));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp4");
        let result = FfmpegCameraSource::open(path.to_str().unwrap(), None);
        assert!(matches!(result, Err(CaptureError::Open { .. })));
    }
}
