// THEORY:
// Pointillism rebuilds the image out of many filled circles. Each circle takes
// the average color of the block under a random point and is painted, opaque,
// on top of whatever earlier circles left there. The order of the draws is part
// of the picture, so the loop is strictly sequential.
//
// Algorithm, for a base diameter `d`:
// 1.  **Density**: `(width * height) / d` circles are drawn onto a transparent
//     canvas of the source's size.
// 2.  **Sampling**: a random point (x, y) inside the image anchors a `d x d`
//     block (top-left at the point, clipped to the image) whose average becomes
//     the circle's color.
// 3.  **Jitter**: the circle's diameter is `d + variance`, with the variance drawn
//     from `[-d/2, d - d/2)`, so circles are never smaller than half the base.
// 4.  **Raster**: the circle is centred on (x, y). A pixel is covered when its
//     centre lies inside the circle.
//
// A step that cannot be computed stops the run but keeps the canvas painted so
// far; the same happens when the cancel token is raised between two draws.

use std::fmt;

use log::{debug, warn};

use crate::core_modules::block::block::Block;
use crate::core_modules::cancel::CancelToken;
use crate::core_modules::color::color::Color;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::random_source::RandomSource;

/// Why a pointillism run stopped before drawing every circle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawFailure {
    /// The circle anchored at (x, y) could not be computed.
    Point { x: u32, y: u32, reason: String },
    /// The cancel token was raised after `drawn` circles.
    Cancelled { drawn: u64 },
}

impl fmt::Display for DrawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawFailure::Point { x, y, reason } => {
                write!(f, "Could not pointilize at point ({x}, {y}): {reason}")
            }
            DrawFailure::Cancelled { drawn } => {
                write!(f, "Pointillism cancelled after {drawn} circles")
            }
        }
    }
}

/// The canvas produced by a pointillism run.
///
/// Runs are started through the pipelines, which reject a zero diameter:
///
/// ```compile_fail
/// let circles = viperion::core_modules::pointillism::density(4, 4, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stippled {
    pub buffer: PixelBuffer,
    /// Circles the run was asked to draw.
    pub density: u64,
    /// Circles actually drawn.
    pub circles_drawn: u64,
    /// Set when the run stopped early.
    pub failure: Option<DrawFailure>,
}

/// Number of circles drawn for a `width x height` image.
pub(crate) fn density(width: u32, height: u32, diameter: u32) -> u64 {
    (width as u64 * height as u64) / diameter as u64
}

/// Runs pointillism over `source` with base circle diameter `diameter` (> 0).
pub(crate) fn stipple<R: RandomSource>(
    source: &PixelBuffer,
    diameter: u32,
    rng: &mut R,
    cancel: &CancelToken,
) -> Stippled {
    let (width, height) = source.dimensions();
    let mut canvas = PixelBuffer::new(width, height);
    let density = density(width, height, diameter);
    debug!("pointillism: {density} circles of base diameter {diameter}");

    let mut circles_drawn = 0u64;
    let mut failure = None;

    for _ in 0..density {
        if cancel.is_cancelled() {
            failure = Some(DrawFailure::Cancelled {
                drawn: circles_drawn,
            });
            break;
        }

        let x = rng.next_below(width);
        let y = rng.next_below(height);

        if let Err(reason) = draw_circle(source, &mut canvas, diameter, x, y, rng) {
            let step_failure = DrawFailure::Point { x, y, reason };
            warn!("{step_failure}");
            failure = Some(step_failure);
            break;
        }
        circles_drawn += 1;
    }

    Stippled {
        buffer: canvas,
        density,
        circles_drawn,
        failure,
    }
}

fn draw_circle<R: RandomSource>(
    source: &PixelBuffer,
    canvas: &mut PixelBuffer,
    diameter: u32,
    x: u32,
    y: u32,
    rng: &mut R,
) -> Result<(), String> {
    let color = Block::new(x, y, diameter)
        .average(source)
        .map_err(|err| err.to_string())?;

    let variance = rng.next_below(diameter) as i64 - (diameter / 2) as i64;
    let circle_diameter = diameter as i64 + variance;
    if circle_diameter <= 0 {
        return Err(format!("circle diameter {circle_diameter} is not positive"));
    }

    paint_circle(canvas, color, x as i64, y as i64, circle_diameter).map_err(|err| err.to_string())
}

/// Fills the circle of `diameter` centred on (`center_x`, `center_y`), clipped to `canvas`.
pub(crate) fn paint_circle(
    canvas: &mut PixelBuffer,
    color: Color,
    center_x: i64,
    center_y: i64,
    diameter: i64,
) -> crate::error::EditorResult<()> {
    // Bounding square, top-left corner shifted so (center_x, center_y) is the middle.
    let left = center_x - diameter / 2;
    let top = center_y - diameter / 2;

    let radius = diameter as f64 / 2.0;
    let middle_x = left as f64 + radius;
    let middle_y = top as f64 + radius;
    let radius_squared = radius * radius;

    let x_range = left.max(0)..(left + diameter).min(canvas.width() as i64);
    let y_range = top.max(0)..(top + diameter).min(canvas.height() as i64);

    for py in y_range {
        let dy = py as f64 + 0.5 - middle_y;
        for px in x_range.clone() {
            let dx = px as f64 + 0.5 - middle_x;
            if dx * dx + dy * dy <= radius_squared {
                canvas.set(px as u32, py as u32, color)?;
            }
        }
    }
    Ok(())
}
