// THEORY:
// Per-pixel recoloring: every output pixel depends only on the source pixel at
// the same coordinates. Output dimensions always equal the input's.
//
// The work is expressed per row range so the parallel pipeline can hand each
// worker a disjoint band and stitch the bands back together in order.

use std::ops::Range;

use crate::core_modules::color::color::Color;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::EditorResult;

/// The one-to-one transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recolor {
    Identity,
    Grayscale,
    Invert,
}

impl Recolor {
    #[inline]
    pub fn apply(self, color: Color) -> Color {
        match self {
            // Decoded colors are already opaque; identity is a plain copy.
            Recolor::Identity => color,
            Recolor::Grayscale => color.to_grayscale(),
            Recolor::Invert => color.invert(),
        }
    }
}

/// Recolors the rows in `rows`, returning them row-major.
pub(crate) fn recolor_rows(source: &PixelBuffer, recolor: Recolor, rows: Range<u32>) -> Vec<Color> {
    source
        .rows(rows)
        .iter()
        .map(|color| recolor.apply(*color))
        .collect()
}

/// Recolors the whole buffer.
pub(crate) fn recolor(source: &PixelBuffer, recolor: Recolor) -> EditorResult<PixelBuffer> {
    let pixels = recolor_rows(source, recolor, 0..source.height());
    PixelBuffer::from_pixels(source.width(), source.height(), pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> PixelBuffer {
        let mut buffer = PixelBuffer::filled(3, 2, Color::new(200, 100, 50));
        buffer.set(1, 0, Color::new(10, 20, 30)).unwrap();
        buffer.set(2, 1, Color::WHITE).unwrap();
        buffer
    }

    #[test]
    fn identity_copies_source() {
        let source = checker();
        let output = recolor(&source, Recolor::Identity).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn grayscale_keeps_dimensions() {
        let source = checker();
        let output = recolor(&source, Recolor::Grayscale).unwrap();
        assert_eq!(output.dimensions(), source.dimensions());
        assert_eq!(output.get(1, 0).unwrap(), Color::new(18, 18, 18));
        assert_eq!(output.get(2, 1).unwrap(), Color::new(254, 254, 254));
    }

    #[test]
    fn invert_every_pixel() {
        let source = checker();
        let output = recolor(&source, Recolor::Invert).unwrap();
        for (a, b) in source.pixels().iter().zip(output.pixels()) {
            assert_eq!(a.invert(), *b);
        }
    }

    #[test]
    fn row_ranges_concatenate_to_full_output() {
        let source = checker();
        let mut pixels = recolor_rows(&source, Recolor::Invert, 0..1);
        pixels.extend(recolor_rows(&source, Recolor::Invert, 1..2));
        assert_eq!(
            pixels,
            recolor(&source, Recolor::Invert).unwrap().into_pixels()
        );
    }
}
