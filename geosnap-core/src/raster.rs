//! Dense RGBA raster buffer with incremental segment rasterization.
//!
//! The buffer is the visual state of the annotation canvas: a pixel grid,
//! never a vector description of the drawn shapes. Segments rasterize with
//! round caps and round joins by covering every pixel whose center lies
//! within half the stroke width of the segment.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{CoreError, CoreResult};
use crate::stroke::StrokeStyle;

/// A dense grid of RGBA pixel values (4 bytes per pixel, row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Create a transparent buffer of the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Decode an image and copy its pixels in. The buffer takes the decoded
    /// image's pixel dimensions, never any display size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Decode`] if the bytes are not a decodable image.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| CoreError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            data: rgba.into_raw(),
        })
    }

    /// Buffer width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Buffer dimensions as (width, height).
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// RGBA value at (x, y), or `None` outside the buffer.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let slice = &self.data[offset..offset + 4];
        Some([slice[0], slice[1], slice[2], slice[3]])
    }

    /// Whether a canvas-space coordinate falls inside the buffer bounds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32
    }

    /// Rasterize one stroke segment from `from` to `to`.
    ///
    /// Coverage is distance-to-segment at half the stroke width, which
    /// produces round caps at both endpoints and round joins between
    /// consecutive segments. Pixels outside the buffer are clipped.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn draw_segment(&mut self, from: (f32, f32), to: (f32, f32), style: &StrokeStyle) {
        let radius = style.width as f32 / 2.0;

        let min_x = (from.0.min(to.0) - radius).floor().max(0.0) as u32;
        let min_y = (from.1.min(to.1) - radius).floor().max(0.0) as u32;
        let max_x = ((from.0.max(to.0) + radius).ceil() as u32).min(self.width.saturating_sub(1));
        let max_y = ((from.1.max(to.1) + radius).ceil() as u32).min(self.height.saturating_sub(1));

        if self.width == 0 || self.height == 0 {
            return;
        }

        let radius_sq = radius * radius;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let center = (x as f32 + 0.5, y as f32 + 0.5);
                if segment_distance_sq(center, from, to) <= radius_sq {
                    self.set_pixel(x, y, [style.color.r, style.color.g, style.color.b, 255]);
                }
            }
        }
    }

    /// Encode the buffer as a PNG blob.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encode`] if the buffer cannot be encoded.
    pub fn encode_png(&self) -> CoreResult<Vec<u8>> {
        let img = RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| CoreError::Encode("buffer size mismatch".to_string()))?;

        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(|e| CoreError::Encode(e.to_string()))?;

        Ok(out)
    }

    fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        debug_assert!(x < self.width && y < self.height);
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[offset..offset + 4].copy_from_slice(&rgba);
    }
}

/// Squared distance from a point to the closest point on a segment.
fn segment_distance_sq(point: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let ab = (b.0 - a.0, b.1 - a.1);
    let len_sq = ab.0 * ab.0 + ab.1 * ab.1;

    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((point.0 - a.0) * ab.0 + (point.1 - a.1) * ab.1) / len_sq).clamp(0.0, 1.0)
    };

    let closest = (a.0 + t * ab.0, a.1 + t * ab.1);
    let dx = point.0 - closest.0;
    let dy = point.1 - closest.1;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Rgb;

    fn white_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .expect("encode test png");
        out
    }

    #[test]
    fn test_from_bytes_takes_source_dimensions() {
        let buffer = RasterBuffer::from_bytes(&white_png(64, 48)).expect("decode");
        assert_eq!(buffer.dimensions(), (64, 48));
        assert_eq!(buffer.pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            RasterBuffer::from_bytes(b"not an image"),
            Err(CoreError::Decode(_))
        ));
    }

    #[test]
    fn test_vertical_segment_paints_swept_region_only() {
        let mut buffer = RasterBuffer::from_bytes(&white_png(60, 60)).expect("decode");
        let style = StrokeStyle::new(Rgb::new(0, 255, 0), 5);

        buffer.draw_segment((10.0, 10.0), (10.0, 50.0), &style);

        let green = [0, 255, 0, 255];
        let white = [255, 255, 255, 255];

        // On the segment.
        assert_eq!(buffer.pixel(10, 30), Some(green));
        assert_eq!(buffer.pixel(10, 10), Some(green));
        assert_eq!(buffer.pixel(10, 50), Some(green));
        // Within half-width of the segment line.
        assert_eq!(buffer.pixel(9, 30), Some(green));
        assert_eq!(buffer.pixel(11, 30), Some(green));
        // Outside the swept region.
        assert_eq!(buffer.pixel(20, 30), Some(white));
        assert_eq!(buffer.pixel(10, 5), Some(white));
        assert_eq!(buffer.pixel(10, 55), Some(white));
        assert_eq!(buffer.pixel(0, 0), Some(white));
        assert_eq!(buffer.pixel(59, 59), Some(white));
    }

    #[test]
    fn test_zero_length_segment_paints_round_dot() {
        let mut buffer = RasterBuffer::from_bytes(&white_png(20, 20)).expect("decode");
        let style = StrokeStyle::new(Rgb::new(0, 0, 255), 6);

        buffer.draw_segment((10.0, 10.0), (10.0, 10.0), &style);

        let blue = [0, 0, 255, 255];
        assert_eq!(buffer.pixel(10, 10), Some(blue));
        assert_eq!(buffer.pixel(12, 10), Some(blue));
        // Corner of the bounding box is outside the disc.
        assert_eq!(buffer.pixel(13, 13), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_segment_clips_at_buffer_edges() {
        let mut buffer = RasterBuffer::from_bytes(&white_png(10, 10)).expect("decode");
        let style = StrokeStyle::new(Rgb::new(0, 0, 0), 8);

        // Mostly outside the buffer; must not panic and must clip.
        buffer.draw_segment((-5.0, -5.0), (2.0, 2.0), &style);
        assert_eq!(buffer.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let buffer = RasterBuffer::new(7, 3);
        let png = buffer.encode_png().expect("encode");
        let decoded = RasterBuffer::from_bytes(&png).expect("decode");
        assert_eq!(decoded.dimensions(), (7, 3));
    }
}
