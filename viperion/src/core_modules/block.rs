// THEORY:
// A `Block` is a square region of a `PixelBuffer` summarized by its average color.
// It is the shared engine behind compression, pixelation and pointillism: all
// three reduce an s x s neighbourhood to one color and then place that color
// somewhere in the output.
//
// Key points:
// 1.  **Clipping**: a block anchored near the right or bottom edge is clipped to
//     the buffer. Only pixels that exist are summed.
// 2.  **Edge-aware divisor**: the sums are divided by the number of pixels that
//     were actually visited, not by `side * side`. A clipped block therefore
//     averages its real content instead of drifting toward black.
// 3.  **Wide accumulators**: channel sums are `u64`, enough for any block that
//     fits in memory.

pub mod block {
    use crate::core_modules::color::color::Color;
    use crate::core_modules::pixel_buffer::PixelBuffer;
    use crate::error::{EditorError, EditorResult};

    /// A square region anchored at its top-left corner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Block {
        /// Column of the top-left pixel.
        pub x: u32,
        /// Row of the top-left pixel.
        pub y: u32,
        /// Side length in pixels.
        pub side: u32,
    }

    impl Block {
        pub fn new(x: u32, y: u32, side: u32) -> Self {
            Self { x, y, side }
        }

        /// The columns covered by this block inside `buffer`.
        pub fn columns(&self, buffer: &PixelBuffer) -> std::ops::Range<u32> {
            self.x..self.x.saturating_add(self.side).min(buffer.width())
        }

        /// The rows covered by this block inside `buffer`.
        pub fn rows(&self, buffer: &PixelBuffer) -> std::ops::Range<u32> {
            self.y..self.y.saturating_add(self.side).min(buffer.height())
        }

        /// Average color of the block, clipped to `buffer`.
        ///
        /// Fails with `OutOfRange` when the clipped block holds no pixels, i.e. the
        /// anchor is outside the buffer or the side is zero.
        pub fn average(&self, buffer: &PixelBuffer) -> EditorResult<Color> {
            let columns = self.columns(buffer);
            let rows = self.rows(buffer);
            if columns.is_empty() || rows.is_empty() {
                return Err(EditorError::OutOfRange {
                    x: self.x,
                    y: self.y,
                    width: buffer.width(),
                    height: buffer.height(),
                });
            }

            let mut sum_r = 0u64;
            let mut sum_g = 0u64;
            let mut sum_b = 0u64;
            let mut count = 0u64;

            for row in rows {
                let line = buffer.rows(row..row + 1);
                for color in &line[columns.start as usize..columns.end as usize] {
                    sum_r += color.red as u64;
                    sum_g += color.green as u64;
                    sum_b += color.blue as u64;
                    count += 1;
                }
            }

            Ok(Color::new(
                (sum_r / count) as u8,
                (sum_g / count) as u8,
                (sum_b / count) as u8,
            ))
        }

        /// Paints every pixel of the block (clipped to `buffer`) with `color`.
        pub fn paint(&self, buffer: &mut PixelBuffer, color: Color) -> EditorResult<()> {
            for y in self.rows(buffer) {
                for x in self.columns(buffer) {
                    buffer.set(x, y, color)?;
                }
            }
            Ok(())
        }
    }
}
