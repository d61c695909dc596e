// THEORY:
// Block-average resampling backs two effects that differ only in where the
// averaged color lands:
//
// - **Compress** shrinks the image by the block size. Block (bx, by) of the
//   scanned region becomes output pixel (bx, by).
// - **Pixelate** keeps the scanned size and paints each block's average over the
//   whole block, producing a mosaic.
//
// Both crop first: whatever does not fill a whole block on the right and bottom
// edges is dropped, and the amount lost is reported back to the caller as a
// status line because it changes what ends up in the file.
//
// Work is expressed in block rows so that the parallel pipeline can split the
// output into bands without any two workers touching the same pixels.

use std::ops::Range;

use log::debug;

use crate::core_modules::block::block::Block;
use crate::core_modules::color::color::Color;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::EditorResult;

/// The crop implied by a block size.
///
/// Only the pipelines build one, after the block size has been checked:
///
/// ```compile_fail
/// let cropping = viperion::core_modules::resample::Cropping::new(4, 4, 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cropping {
    /// Side of one block in pixels.
    pub block_size: u32,
    /// Pixels dropped from the right edge.
    pub loss_width: u32,
    /// Pixels dropped from the bottom edge.
    pub loss_height: u32,
    /// Width of the region made of whole blocks.
    pub scan_width: u32,
    /// Height of the region made of whole blocks.
    pub scan_height: u32,
}

impl Cropping {
    /// `block_size` must be non-zero; the dispatcher guarantees it.
    pub(crate) fn new(width: u32, height: u32, block_size: u32) -> Self {
        let loss_width = width % block_size;
        let loss_height = height % block_size;
        Self {
            block_size,
            loss_width,
            loss_height,
            scan_width: width - loss_width,
            scan_height: height - loss_height,
        }
    }

    /// Number of whole blocks across.
    pub fn blocks_wide(&self) -> u32 {
        self.scan_width / self.block_size
    }

    /// Number of whole blocks down.
    pub fn blocks_high(&self) -> u32 {
        self.scan_height / self.block_size
    }

    pub fn is_empty(&self) -> bool {
        self.scan_width == 0 || self.scan_height == 0
    }

    pub fn status_line(&self) -> String {
        format!(
            "The image lost {} pixels on the right, and {} pixels on the bottom",
            self.loss_width, self.loss_height
        )
    }
}

/// A resampled buffer and the crop that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    pub buffer: PixelBuffer,
    pub cropping: Cropping,
}

/// Compressed output pixels for block rows `block_rows`, row-major.
pub(crate) fn compress_rows(
    source: &PixelBuffer,
    cropping: &Cropping,
    block_rows: Range<u32>,
) -> EditorResult<Vec<Color>> {
    let size = cropping.block_size;
    let mut pixels = Vec::with_capacity(block_rows.len() * cropping.blocks_wide() as usize);

    for block_y in block_rows {
        for block_x in 0..cropping.blocks_wide() {
            let block = Block::new(block_x * size, block_y * size, size);
            pixels.push(block.average(source)?);
        }
    }

    Ok(pixels)
}

/// Pixelated output pixels for block rows `block_rows`, row-major.
///
/// Each block row expands to `block_size` output rows of `scan_width` pixels.
pub(crate) fn pixelate_rows(
    source: &PixelBuffer,
    cropping: &Cropping,
    block_rows: Range<u32>,
) -> EditorResult<Vec<Color>> {
    let size = cropping.block_size as usize;
    let scan_width = cropping.scan_width as usize;
    let mut pixels = Vec::with_capacity(block_rows.len() * size * scan_width);

    for block_y in block_rows {
        // One average per block across this block row.
        let averages = compress_rows(source, cropping, block_y..block_y + 1)?;
        for _ in 0..size {
            for average in &averages {
                pixels.extend(std::iter::repeat_n(*average, size));
            }
        }
    }

    Ok(pixels)
}

/// Shrinks `source` by `block_size`, averaging each block into one pixel.
pub(crate) fn compress(source: &PixelBuffer, block_size: u32) -> EditorResult<Resampled> {
    let cropping = Cropping::new(source.width(), source.height(), block_size);
    debug!("compress: {:?}", cropping);

    let pixels = compress_rows(source, &cropping, 0..cropping.blocks_high())?;
    let buffer = PixelBuffer::from_pixels(cropping.blocks_wide(), cropping.blocks_high(), pixels)?;

    Ok(Resampled { buffer, cropping })
}

/// Paints each block of `source` with its average color, cropping partial blocks.
pub(crate) fn pixelate(source: &PixelBuffer, block_size: u32) -> EditorResult<Resampled> {
    let cropping = Cropping::new(source.width(), source.height(), block_size);
    debug!("pixelate: {:?}", cropping);

    let pixels = pixelate_rows(source, &cropping, 0..cropping.blocks_high())?;
    let buffer = PixelBuffer::from_pixels(cropping.scan_width, cropping.scan_height, pixels)?;

    Ok(Resampled { buffer, cropping })
}
