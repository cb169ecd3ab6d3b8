use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{ArrayView3, ShapeError};

use crate::shared::bounding_box::BoundingBox;

/// Bytes per pixel; frames are always packed RGB.
pub const CHANNELS: usize = 3;

/// A camera frame or decoded image: packed RGB bytes in row-major order.
///
/// `index` is the capture sequence number. Derived frames (crops, scaled
/// copies) keep the index of the frame they came from.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn from_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    pub fn to_image(&self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// `[height, width, channel]` view over the pixel buffer.
    pub fn as_ndarray(&self) -> Result<ArrayView3<'_, u8>, ShapeError> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, CHANNELS),
            &self.data,
        )
    }

    /// Resized copy; both sides are multiplied by `factor` (at least 1px).
    pub fn scaled(&self, factor: f64) -> Frame {
        if (factor - 1.0).abs() < f64::EPSILON {
            return self.clone();
        }
        let w = ((self.width as f64 * factor).round() as u32).max(1);
        let h = ((self.height as f64 * factor).round() as u32).max(1);
        match self.to_image() {
            Some(img) => Frame::from_image(imageops::resize(&img, w, h, FilterType::Triangle), self.index),
            None => self.clone(),
        }
    }

    /// Copies the pixels inside `bbox` after clamping it to the frame.
    pub fn crop(&self, bbox: &BoundingBox) -> Option<Frame> {
        let area = bbox.clamp_to(self.width, self.height)?;
        let stride = self.width as usize * CHANNELS;
        let row_len = area.width() as usize * CHANNELS;

        let mut data = Vec::with_capacity(row_len * area.height() as usize);
        for y in area.top..area.bottom {
            let start = y as usize * stride + area.left as usize * CHANNELS;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(Frame::new(
            data,
            area.width() as u32,
            area.height() as u32,
            self.index,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x2 frame where each pixel's red channel encodes `y * 10 + x`.
    fn gradient_frame() -> Frame {
        let mut data = Vec::new();
        for y in 0..2u8 {
            for x in 0..4u8 {
                data.extend_from_slice(&[y * 10 + x, 0, 0]);
            }
        }
        Frame::new(data, 4, 2, 7)
    }

    #[test]
    fn test_accessors() {
        let frame = gradient_frame();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.data().len(), 24);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_is_row_major() {
        let frame = gradient_frame();
        let arr = frame.as_ndarray().unwrap();
        assert_eq!(arr.shape(), &[2, 4, 3]);
        assert_eq!(arr[[1, 2, 0]], 12);
    }

    #[test]
    fn test_crop_copies_region() {
        let frame = gradient_frame();
        let crop = frame.crop(&BoundingBox::new(1, 3, 2, 1)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 1);
        assert_eq!(crop.data()[0], 11);
        assert_eq!(crop.data()[3], 12);
        assert_eq!(crop.index(), 7);
    }

    #[test]
    fn test_crop_clamps_to_frame() {
        let frame = gradient_frame();
        let crop = frame.crop(&BoundingBox::new(-5, 100, 100, 2)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
    }

    #[test]
    fn test_crop_outside_frame_is_none() {
        let frame = gradient_frame();
        assert!(frame.crop(&BoundingBox::new(10, 20, 20, 10)).is_none());
    }

    #[test]
    fn test_scaled_quarter() {
        let frame = Frame::new(vec![200u8; 40 * 20 * 3], 40, 20, 3);
        let small = frame.scaled(0.25);
        assert_eq!(small.width(), 10);
        assert_eq!(small.height(), 5);
        assert_eq!(small.index(), 3);
        assert_eq!(small.data()[0], 200);
    }

    #[test]
    fn test_scaled_identity_is_clone() {
        let frame = gradient_frame();
        let same = frame.scaled(1.0);
        assert_eq!(same.data(), frame.data());
    }

    #[test]
    fn test_image_conversion_keeps_pixels() {
        let frame = gradient_frame();
        let img = frame.to_image().unwrap();
        assert_eq!(img.get_pixel(3, 1).0, [13, 0, 0]);
        let back = Frame::from_image(img, 9);
        assert_eq!(back.data(), frame.data());
        assert_eq!(back.index(), 9);
    }
}
