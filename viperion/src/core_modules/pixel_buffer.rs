// THEORY:
// `PixelBuffer` is the 2D grid every algorithm reads from and writes to. It is a
// flat, row-major `Vec<Color>` with bounds-checked accessors, so a stray
// coordinate becomes an `OutOfRange` error instead of silently touching the
// wrong row.
//
// Buffers never resize. Algorithms compute their final dimensions up front and
// allocate once; the source buffer is only ever borrowed (or shared behind an
// `Arc` by the parallel pipeline) and never written.

use std::ops::Range;

use image::RgbaImage;

use crate::core_modules::color::color::Color;
use crate::error::{EditorError, EditorResult};

#[cfg(test)]
thread_local! {
    static ALLOCATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

#[cfg(test)]
pub(crate) fn allocations_on_this_thread() -> usize {
    ALLOCATIONS.with(|count| count.get())
}

#[cfg(test)]
fn record_allocation() {
    ALLOCATIONS.with(|count| count.set(count.get() + 1));
}

#[cfg(not(test))]
#[inline(always)]
fn record_allocation() {}

/// A width x height grid of colors, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Allocates a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        record_allocation();
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Adopts a row-major pixel vector.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> EditorResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(EditorError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        record_allocation();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds an opaque buffer where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        record_allocation();
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Color> {
        self.pixels
    }

    /// The pixels of rows `rows.start..rows.end`, clamped to the buffer.
    pub fn rows(&self, rows: Range<u32>) -> &[Color] {
        let start = rows.start.min(self.height) as usize * self.width as usize;
        let end = rows.end.min(self.height) as usize * self.width as usize;
        &self.pixels[start..end.max(start)]
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> EditorResult<usize> {
        if !self.contains(x, y) {
            return Err(EditorError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> EditorResult<Color> {
        let index = self.index(x, y)?;
        Ok(self.pixels[index])
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) -> EditorResult<()> {
        let index = self.index(x, y)?;
        self.pixels[index] = color;
        Ok(())
    }

    /// Converts to an `image` buffer for encoding.
    pub fn to_rgba_image(&self) -> EditorResult<RgbaImage> {
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|color| [color.red, color.green, color.blue, color.alpha])
            .collect();
        let actual = raw.len();
        RgbaImage::from_raw(self.width, self.height, raw).ok_or(EditorError::BufferSize {
            expected: self.width as usize * self.height as usize * 4,
            actual,
        })
    }
}

impl From<&RgbaImage> for PixelBuffer {
    /// Decoded pixels are treated as opaque.
    fn from(image: &RgbaImage) -> Self {
        record_allocation();
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.pixels().map(|rgba| Color::from(*rgba)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_transparent() {
        let buffer = PixelBuffer::new(4, 3);
        assert_eq!(buffer.dimensions(), (4, 3));
        assert_eq!(buffer.pixels().len(), 12);
        assert!(buffer.pixels().iter().all(|c| *c == Color::TRANSPARENT));
    }

    #[test]
    fn get_and_set_respect_bounds() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.set(1, 1, Color::WHITE).unwrap();
        assert_eq!(buffer.get(1, 1).unwrap(), Color::WHITE);
        assert_eq!(buffer.get(0, 1).unwrap(), Color::TRANSPARENT);

        assert!(matches!(
            buffer.get(2, 0),
            Err(EditorError::OutOfRange { x: 2, y: 0, width: 2, height: 2 })
        ));
        assert!(matches!(
            buffer.set(0, 2, Color::BLACK),
            Err(EditorError::OutOfRange { .. })
        ));
    }

    #[test]
    fn storage_is_row_major() {
        let mut buffer = PixelBuffer::new(3, 2);
        buffer.set(2, 0, Color::new(1, 1, 1)).unwrap();
        buffer.set(0, 1, Color::new(2, 2, 2)).unwrap();
        assert_eq!(buffer.pixels()[2], Color::new(1, 1, 1));
        assert_eq!(buffer.pixels()[3], Color::new(2, 2, 2));
        assert_eq!(buffer.rows(1..2)[0], Color::new(2, 2, 2));
        assert_eq!(buffer.rows(1..9).len(), 3);
        assert!(buffer.rows(5..9).is_empty());
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(PixelBuffer::from_pixels(2, 2, vec![Color::BLACK; 4]).is_ok());
        assert!(matches!(
            PixelBuffer::from_pixels(2, 2, vec![Color::BLACK; 3]),
            Err(EditorError::BufferSize { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn rgba_image_round_trip() {
        let mut buffer = PixelBuffer::filled(3, 2, Color::new(9, 8, 7));
        buffer.set(0, 0, Color::TRANSPARENT).unwrap();
        let image = buffer.to_rgba_image().unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(2, 1).0, [9, 8, 7, 255]);

        // Decoding forces opacity, so the transparent pixel comes back black.
        let back = PixelBuffer::from(&image);
        assert_eq!(back.get(0, 0).unwrap(), Color::BLACK);
        assert_eq!(back.get(2, 1).unwrap(), Color::new(9, 8, 7));
    }

    #[test]
    fn allocation_counter_tracks_this_thread() {
        let before = allocations_on_this_thread();
        let _ = PixelBuffer::new(1, 1);
        let _ = PixelBuffer::filled(1, 1, Color::BLACK);
        assert_eq!(allocations_on_this_thread(), before + 2);
    }
}
