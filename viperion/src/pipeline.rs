// THEORY:
// The `pipeline` module is the top-level API of the engine and its single
// validated entry point. A caller describes what it wants with an immutable
// `EffectRequest` (or an `EditRequest` when files are involved) and gets back an
// `Outcome`; nothing is remembered between calls.
//
// Flow of one request:
// 1.  **Validation**: the effect's parameter table decides whether a numeric
//     parameter is needed. Missing, negative or oversized parameters are rejected
//     here, before a single buffer is allocated.
// 2.  **Planning**: the request is turned into a `Plan` naming exactly one
//     algorithm and its argument. A parameter of 0 plans to do nothing.
// 3.  **Execution**: the chosen algorithm reads the source and builds a new buffer.
// 4.  **Reporting**: status lines (cropped pixels, pointillism notices) travel
//     back with the buffer so callers can show them; they are logged as well.
//
// `EffectPipeline` runs everything on the calling thread. `ParallelPipeline`
// (see `parallel_pipeline`) follows the same plan but spreads rows over workers.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::core_modules::image_io;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::pointillism::stipple;
use crate::core_modules::random_source::{RandomSource, wyrand};
use crate::core_modules::recolor::recolor;
use crate::core_modules::resample::{compress, pixelate};
use crate::error::{EditorError, EditorResult};

// Re-export key data structures for the public API.
pub use crate::core_modules::cancel::CancelToken;
pub use crate::core_modules::color::color::Color;
pub use crate::core_modules::pointillism::{DrawFailure, Stippled};
pub use crate::core_modules::recolor::Recolor;
pub use crate::core_modules::resample::{Cropping, Resampled};
pub use crate::effect::Effect;

/// An effect plus its optional numeric parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRequest {
    pub effect: Effect,
    /// Block size or circle diameter. Ignored by parameter-free effects.
    pub parameter: Option<i64>,
    /// Seed for pointillism. `None` draws from system entropy.
    pub seed: Option<u64>,
}

impl EffectRequest {
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            parameter: None,
            seed: None,
        }
    }

    pub fn with_parameter(mut self, parameter: i64) -> Self {
        self.parameter = Some(parameter);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the parameter without looking at any image.
    pub fn validate(&self) -> EditorResult<()> {
        if self.effect.requires_parameter() {
            self.required_parameter()?;
        }
        Ok(())
    }

    fn required_parameter(&self) -> EditorResult<u32> {
        let meaning = self.effect.parameter_meaning().unwrap_or("parameter");
        match self.parameter {
            None => Err(EditorError::invalid_parameter(
                self.effect,
                format!("no {meaning} was supplied"),
            )),
            Some(value) if value < 0 => Err(EditorError::invalid_parameter(
                self.effect,
                format!("{meaning} {value} is negative"),
            )),
            Some(value) => u32::try_from(value).map_err(|_| {
                EditorError::invalid_parameter(self.effect, format!("{meaning} {value} is too large"))
            }),
        }
    }

    fn block_size(&self, width: u32, height: u32) -> EditorResult<Option<u32>> {
        let size = self.required_parameter()?;
        if size == 0 {
            return Ok(None);
        }
        if size > width || size > height {
            return Err(EditorError::invalid_parameter(
                self.effect,
                format!("block size {size} does not fit in a {width}x{height} image"),
            ));
        }
        Ok(Some(size))
    }

    /// Resolves the request against an image of `width x height`.
    pub fn plan(&self, width: u32, height: u32) -> EditorResult<Plan> {
        let plan = match self.effect {
            Effect::Normal => Plan::Recolor(Recolor::Identity),
            Effect::BlackAndWhite => Plan::Recolor(Recolor::Grayscale),
            Effect::InvertColors => Plan::Recolor(Recolor::Invert),
            Effect::Compress => self
                .block_size(width, height)?
                .map_or(Plan::Skip, Plan::Compress),
            Effect::Pixelate => self
                .block_size(width, height)?
                .map_or(Plan::Skip, Plan::Pixelate),
            Effect::Pointillism => match self.required_parameter()? {
                0 => Plan::Skip,
                diameter => Plan::Pointillism(diameter),
            },
        };
        Ok(plan)
    }
}

/// Exactly one algorithm and its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Parameter was 0: produce nothing.
    Skip,
    Recolor(Recolor),
    Compress(u32),
    Pixelate(u32),
    Pointillism(u32),
}

/// A file-to-file edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub effect: EffectRequest,
}

impl EditRequest {
    /// The destination is `output_dir/name`.
    pub fn new(
        source: impl Into<PathBuf>,
        output_dir: impl AsRef<Path>,
        name: impl AsRef<Path>,
        effect: EffectRequest,
    ) -> Self {
        Self {
            source: source.into(),
            destination: output_dir.as_ref().join(name),
            effect,
        }
    }
}

/// A produced buffer and the human-readable status that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendering {
    pub buffer: PixelBuffer,
    pub status: Vec<String>,
}

/// The result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The parameter was 0; no output was produced.
    Skipped,
    Complete(Rendering),
    /// Pointillism stopped early; the canvas holds everything drawn before that.
    Partial {
        rendering: Rendering,
        failure: DrawFailure,
    },
}

impl Outcome {
    pub fn rendering(&self) -> Option<&Rendering> {
        match self {
            Outcome::Skipped => None,
            Outcome::Complete(rendering) | Outcome::Partial { rendering, .. } => Some(rendering),
        }
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.rendering().map(|rendering| &rendering.buffer)
    }

    pub fn status(&self) -> &[String] {
        self.rendering()
            .map(|rendering| rendering.status.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Outcome::Partial { .. })
    }
}

pub(crate) fn recolor_outcome(effect: Effect, buffer: PixelBuffer) -> Outcome {
    let status = vec![format!("Applied {effect}")];
    log_status(&status);
    Outcome::Complete(Rendering { buffer, status })
}

pub(crate) fn resample_outcome(effect: Effect, resampled: Resampled) -> Outcome {
    let verb = match effect {
        Effect::Compress => "Image was compressed.",
        _ => "Image was pixelated.",
    };
    let status = vec![verb.to_string(), resampled.cropping.status_line()];
    log_status(&status);
    Outcome::Complete(Rendering {
        buffer: resampled.buffer,
        status,
    })
}

pub(crate) fn stipple_outcome(stippled: Stippled) -> Outcome {
    match stippled.failure {
        None => {
            let status = vec![
                "Pointillism applied".to_string(),
                format!("Drew {} circles", stippled.circles_drawn),
            ];
            log_status(&status);
            Outcome::Complete(Rendering {
                buffer: stippled.buffer,
                status,
            })
        }
        Some(failure) => {
            warn!(
                "pointillism stopped after {} of {} circles",
                stippled.circles_drawn, stippled.density
            );
            Outcome::Partial {
                rendering: Rendering {
                    buffer: stippled.buffer,
                    status: vec![failure.to_string()],
                },
                failure,
            }
        }
    }
}

/// Writes the outcome's buffer (complete or partial) to `destination`.
pub(crate) fn save_outcome(mut outcome: Outcome, destination: &Path) -> EditorResult<Outcome> {
    match &mut outcome {
        Outcome::Skipped => {
            info!("nothing to write to {}", destination.display());
        }
        Outcome::Complete(rendering) | Outcome::Partial { rendering, .. } => {
            image_io::encode(&rendering.buffer, destination)?;
            let saved = "Image was saved.".to_string();
            info!("{saved}");
            rendering.status.push(saved);
        }
    }
    Ok(outcome)
}

fn log_status(status: &[String]) {
    for line in status {
        info!("{line}");
    }
}

/// Runs effects on the calling thread.
pub struct EffectPipeline {
    cancel: CancelToken,
}

impl EffectPipeline {
    pub fn new() -> Self {
        Self {
            cancel: CancelToken::new(),
        }
    }

    /// Token that stops a running pointillism pass between two circles.
    ///
    /// A cancellation stops one run: the token is cleared when `apply` or
    /// `edit_file` returns, so the same pipeline can be used again.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Applies `request` to `source`, seeding pointillism from `request.seed`.
    pub fn apply(&self, source: &PixelBuffer, request: &EffectRequest) -> EditorResult<Outcome> {
        let mut rng = wyrand(request.seed);
        self.apply_with_rng(source, request, &mut rng)
    }

    /// Applies `request` to `source` drawing randomness from `rng`.
    pub fn apply_with_rng<R: RandomSource>(
        &self,
        source: &PixelBuffer,
        request: &EffectRequest,
        rng: &mut R,
    ) -> EditorResult<Outcome> {
        let outcome = self.dispatch(source, request, rng);
        self.cancel.reset();
        outcome
    }

    fn dispatch<R: RandomSource>(
        &self,
        source: &PixelBuffer,
        request: &EffectRequest,
        rng: &mut R,
    ) -> EditorResult<Outcome> {
        let (width, height) = source.dimensions();
        let plan = request.plan(width, height)?;
        info!("{} on a {width}x{height} image: {plan:?}", request.effect);

        let outcome = match plan {
            Plan::Skip => {
                info!("{} skipped: parameter is 0", request.effect);
                Outcome::Skipped
            }
            Plan::Recolor(transform) => recolor_outcome(request.effect, recolor(source, transform)?),
            Plan::Compress(size) => resample_outcome(Effect::Compress, compress(source, size)?),
            Plan::Pixelate(size) => resample_outcome(Effect::Pixelate, pixelate(source, size)?),
            Plan::Pointillism(diameter) => {
                stipple_outcome(stipple(source, diameter, rng, &self.cancel))
            }
        };
        Ok(outcome)
    }

    /// Decodes `request.source`, applies the effect and writes PNG to `request.destination`.
    pub fn edit_file(&self, request: &EditRequest) -> EditorResult<Outcome> {
        let saved = self.edit(request);
        self.cancel.reset();
        saved
    }

    fn edit(&self, request: &EditRequest) -> EditorResult<Outcome> {
        request.effect.validate()?;
        let source = image_io::decode(&request.source)?;
        let mut rng = wyrand(request.effect.seed);
        let outcome = self.dispatch(&source, &request.effect, &mut rng)?;
        save_outcome(outcome, &request.destination)
    }
}

impl Default for EffectPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel_buffer::allocations_on_this_thread;

    fn sample(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buffer
                    .set(x, y, Color::new((x * 25) as u8, (y * 25) as u8, 128))
                    .unwrap();
            }
        }
        buffer
    }

    #[test]
    fn missing_parameter_fails_before_allocation() {
        let pipeline = EffectPipeline::default();
        let source = sample(4, 4);

        for effect in [Effect::Compress, Effect::Pixelate, Effect::Pointillism] {
            let before = allocations_on_this_thread();
            let err = pipeline
                .apply(&source, &EffectRequest::new(effect))
                .unwrap_err();
            assert!(matches!(err, EditorError::InvalidParameter { effect: e, .. } if e == effect));
            assert_eq!(allocations_on_this_thread(), before);
        }
    }

    #[test]
    fn negative_and_oversized_parameters_are_rejected() {
        let pipeline = EffectPipeline::default();
        let source = sample(4, 4);

        let negative = EffectRequest::new(Effect::Pixelate).with_parameter(-3);
        assert!(matches!(
            pipeline.apply(&source, &negative),
            Err(EditorError::InvalidParameter { .. })
        ));

        let huge = EffectRequest::new(Effect::Pointillism).with_parameter(i64::MAX);
        assert!(matches!(
            pipeline.apply(&source, &huge),
            Err(EditorError::InvalidParameter { .. })
        ));

        let too_wide = EffectRequest::new(Effect::Compress).with_parameter(5);
        let before = allocations_on_this_thread();
        assert!(matches!(
            pipeline.apply(&source, &too_wide),
            Err(EditorError::InvalidParameter { .. })
        ));
        assert_eq!(allocations_on_this_thread(), before);
    }

    #[test]
    fn zero_parameter_is_skipped() {
        let pipeline = EffectPipeline::default();
        let source = sample(4, 4);
        for effect in [Effect::Compress, Effect::Pixelate, Effect::Pointillism] {
            let request = EffectRequest::new(effect).with_parameter(0);
            let outcome = pipeline.apply(&source, &request).unwrap();
            assert_eq!(outcome, Outcome::Skipped);
            assert!(outcome.buffer().is_none());
            assert!(outcome.status().is_empty());
        }
    }

    #[test]
    fn parameter_free_effects_ignore_parameter() {
        let pipeline = EffectPipeline::default();
        let source = sample(3, 2);
        let request = EffectRequest::new(Effect::InvertColors).with_parameter(-9);
        let outcome = pipeline.apply(&source, &request).unwrap();
        let buffer = outcome.buffer().unwrap();
        assert_eq!(buffer.get(1, 1).unwrap(), source.get(1, 1).unwrap().invert());
        assert_eq!(outcome.status(), ["Applied invert-colors"]);
    }

    #[test]
    fn normal_is_identity() {
        let pipeline = EffectPipeline::default();
        let source = sample(5, 5);
        let outcome = pipeline.apply(&source, &EffectRequest::new(Effect::Normal)).unwrap();
        assert_eq!(outcome.buffer(), Some(&source));
    }

    #[test]
    fn compress_reports_cropping() {
        let pipeline = EffectPipeline::default();
        let source = sample(10, 10);
        let request = EffectRequest::new(Effect::Compress).with_parameter(3);
        let outcome = pipeline.apply(&source, &request).unwrap();

        assert_eq!(outcome.buffer().unwrap().dimensions(), (3, 3));
        assert_eq!(
            outcome.status(),
            [
                "Image was compressed.",
                "The image lost 1 pixels on the right, and 1 pixels on the bottom"
            ]
        );
    }

    #[test]
    fn pixelate_reports_cropping() {
        let pipeline = EffectPipeline::default();
        let source = sample(10, 7);
        let request = EffectRequest::new(Effect::Pixelate).with_parameter(3);
        let outcome = pipeline.apply(&source, &request).unwrap();

        assert_eq!(outcome.buffer().unwrap().dimensions(), (9, 6));
        assert_eq!(outcome.status()[0], "Image was pixelated.");
        assert_eq!(
            outcome.status()[1],
            "The image lost 1 pixels on the right, and 1 pixels on the bottom"
        );
    }

    #[test]
    fn seeded_pointillism_is_deterministic() {
        let pipeline = EffectPipeline::default();
        let source = sample(9, 9);
        let request = EffectRequest::new(Effect::Pointillism)
            .with_parameter(2)
            .with_seed(1234);
        let first = pipeline.apply(&source, &request).unwrap();
        let second = pipeline.apply(&source, &request).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.status(), ["Pointillism applied", "Drew 40 circles"]);
    }

    #[test]
    fn pointillism_on_single_pixel_terminates() {
        let pipeline = EffectPipeline::default();
        let source = sample(1, 1);
        for diameter in [1, 2, 50] {
            let request = EffectRequest::new(Effect::Pointillism)
                .with_parameter(diameter)
                .with_seed(5);
            let outcome = pipeline.apply(&source, &request).unwrap();
            assert!(outcome.buffer().is_some());
        }
    }

    #[test]
    fn cancelled_pointillism_is_partial() {
        let pipeline = EffectPipeline::default();
        pipeline.cancel_token().cancel();
        let source = sample(6, 6);
        let request = EffectRequest::new(Effect::Pointillism)
            .with_parameter(2)
            .with_seed(5);
        let outcome = pipeline.apply(&source, &request).unwrap();

        assert!(outcome.is_partial());
        assert_eq!(outcome.status(), ["Pointillism cancelled after 0 circles"]);
        assert_eq!(outcome.buffer().unwrap().dimensions(), (6, 6));
    }

    #[test]
    fn cancellation_stops_only_one_run() {
        let pipeline = EffectPipeline::default();
        let source = sample(6, 6);
        let request = EffectRequest::new(Effect::Pointillism)
            .with_parameter(2)
            .with_seed(5);

        pipeline.cancel_token().cancel();
        assert!(pipeline.apply(&source, &request).unwrap().is_partial());
        assert!(!pipeline.cancel_token().is_cancelled());

        let retry = pipeline.apply(&source, &request).unwrap();
        assert!(matches!(retry, Outcome::Complete(_)));
        assert_eq!(retry.status(), ["Pointillism applied", "Drew 18 circles"]);
        assert!(retry.buffer().unwrap().pixels().iter().any(|c| c.is_opaque()));
    }

    #[test]
    fn cancellation_is_cleared_after_a_failed_run() {
        let pipeline = EffectPipeline::default();
        let source = sample(6, 6);
        pipeline.cancel_token().cancel();
        assert!(pipeline
            .apply(&source, &EffectRequest::new(Effect::Compress))
            .is_err());
        assert!(!pipeline.cancel_token().is_cancelled());
    }

    #[test]
    fn edit_file_validates_before_decoding() {
        let pipeline = EffectPipeline::default();
        let request = EditRequest::new(
            "/definitely/not/here.png",
            "/tmp",
            "out.png",
            EffectRequest::new(Effect::Compress),
        );
        assert!(matches!(
            pipeline.edit_file(&request),
            Err(EditorError::InvalidParameter { .. })
        ));

        let request = EditRequest::new(
            "/definitely/not/here.png",
            "/tmp",
            "out.png",
            EffectRequest::new(Effect::Normal),
        );
        assert!(matches!(
            pipeline.edit_file(&request),
            Err(EditorError::Decode { .. })
        ));
    }

    #[test]
    fn edit_request_joins_destination() {
        let request = EditRequest::new(
            "in.jpg",
            "/out",
            "result.png",
            EffectRequest::new(Effect::Normal),
        );
        assert_eq!(request.destination, PathBuf::from("/out/result.png"));
    }
}
