// THEORY:
// Every failure the engine can surface is one variant of `EditorError`. Decode and
// encode failures wrap the codec's own error so callers can inspect the cause,
// parameter failures are raised by the dispatcher before anything is allocated,
// and the accessor variants mark programming errors inside an algorithm.
//
// A pointillism run that stops early is *not* an error: it comes back as
// `Outcome::Partial` so the work done so far is kept.

use std::path::PathBuf;

use thiserror::Error;

use crate::effect::Effect;

#[derive(Debug, Error)]
pub enum EditorError {
    /// The source path could not be read or is not an image.
    #[error("could not decode image at {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A numeric parameter was required but missing or unusable.
    #[error("{effect} needs a positive numeric parameter: {reason}")]
    InvalidParameter { effect: Effect, reason: String },

    /// A pixel access fell outside the buffer.
    #[error("pixel ({x}, {y}) is outside a {width}x{height} buffer")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// A pixel vector did not match the dimensions it was adopted with.
    #[error("expected {expected} pixels, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// The destination could not be written.
    #[error("could not encode image to {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A band worker panicked or was torn down by the runtime.
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl EditorError {
    pub(crate) fn invalid_parameter(effect: Effect, reason: impl Into<String>) -> Self {
        EditorError::InvalidParameter {
            effect,
            reason: reason.into(),
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
