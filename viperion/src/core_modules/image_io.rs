// THEORY:
// The boundary to the image codec. Decoding accepts whatever formats the `image`
// crate recognises; encoding always writes PNG (RGBA8), whatever the destination
// extension says, so the filtered pixels land on disk without lossy artifacts.

use std::fs;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageReader};
use log::debug;

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{EditorError, EditorResult};

/// Reads and decodes the image at `path`. The format is sniffed from the content.
pub fn decode(path: &Path) -> EditorResult<PixelBuffer> {
    let decode_error = |source: ImageError| EditorError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| decode_error(ImageError::IoError(err)))?
        .decode()
        .map_err(decode_error)?;
    let rgba = image.to_rgba8();
    debug!(
        "decoded {} ({}x{})",
        path.display(),
        rgba.width(),
        rgba.height()
    );
    Ok(PixelBuffer::from(&rgba))
}

/// Encodes `buffer` as PNG at `path`, replacing any existing file.
pub fn encode(buffer: &PixelBuffer, path: &Path) -> EditorResult<()> {
    let encode_error = |source: ImageError| EditorError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let rgba = buffer.to_rgba_image()?;
    // The destination is only touched once the whole PNG exists in memory.
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(encode_error)?;

    if let Err(err) = fs::write(path, &png) {
        // Drop whatever part of the file made it to disk.
        fs::remove_file(path).ok();
        return Err(encode_error(ImageError::IoError(err)));
    }

    debug!(
        "encoded {} ({}x{})",
        path.display(),
        buffer.width(),
        buffer.height()
    );
    Ok(())
}
