// THEORY:
// `ParallelPipeline` answers the same requests as `EffectPipeline` but splits the
// output of the row-independent effects into contiguous bands of rows and hands
// each band to a blocking worker on the tokio runtime.
//
// - The source buffer is shared read-only behind an `Arc`; no worker ever sees
//   another worker's output.
// - Each worker returns its band as a row-major `Vec<Color>`. Bands are joined in
//   order, so concatenation is the whole image and the result is bit-identical to
//   the sequential pipeline.
// - Pointillism is order-dependent (later circles overwrite earlier ones), so it
//   runs as a single blocking task.
// - Decoding and encoding also run off the async threads.

use std::ops::Range;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, info, trace};
use tokio::task::{JoinError, spawn_blocking};

use crate::config::EditorConfig;
use crate::core_modules::cancel::CancelToken;
use crate::core_modules::color::color::Color;
use crate::core_modules::image_io;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::pointillism::stipple;
use crate::core_modules::random_source::wyrand;
use crate::core_modules::recolor::recolor_rows;
use crate::core_modules::resample::{Cropping, Resampled, compress_rows, pixelate_rows};
use crate::effect::Effect;
use crate::error::{EditorError, EditorResult};
use crate::pipeline::{
    EditRequest, EffectRequest, Outcome, Plan, recolor_outcome, resample_outcome, save_outcome,
    stipple_outcome,
};

fn worker_error(err: JoinError) -> EditorError {
    EditorError::Worker(err.to_string())
}

pub struct ParallelPipeline {
    config: EditorConfig,
    cancel: CancelToken,
}

impl ParallelPipeline {
    pub fn new(config: EditorConfig) -> Self {
        info!("parallel pipeline with up to {} workers", config.workers);
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Token that stops a running pointillism pass. Cleared when the run returns.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs `job` over bands of `0..rows` and concatenates the results in band order.
    async fn run_bands<F>(&self, rows: u32, job: F) -> EditorResult<Vec<Color>>
    where
        F: Fn(Range<u32>) -> EditorResult<Vec<Color>> + Send + Sync + 'static,
    {
        let job = Arc::new(job);
        let bands = self.config.bands(rows);
        debug!("{rows} rows split into {} bands", bands.len());

        let workers = bands.into_iter().map(|band| {
            let job = Arc::clone(&job);
            spawn_blocking(move || {
                trace!("band {band:?} started");
                job(band)
            })
        });

        let mut pixels = Vec::new();
        for band in join_all(workers).await {
            pixels.extend(band.map_err(worker_error)??);
        }
        Ok(pixels)
    }

    /// Applies `request` to `source`. Must be called from within a tokio runtime.
    pub async fn apply(
        &self,
        source: Arc<PixelBuffer>,
        request: &EffectRequest,
    ) -> EditorResult<Outcome> {
        let outcome = self.dispatch(source, request).await;
        self.cancel.reset();
        outcome
    }

    async fn dispatch(
        &self,
        source: Arc<PixelBuffer>,
        request: &EffectRequest,
    ) -> EditorResult<Outcome> {
        let (width, height) = source.dimensions();
        let plan = request.plan(width, height)?;
        info!("{} on a {width}x{height} image: {plan:?}", request.effect);

        let outcome = match plan {
            Plan::Skip => {
                info!("{} skipped: parameter is 0", request.effect);
                Outcome::Skipped
            }
            Plan::Recolor(transform) => {
                let pixels = self
                    .run_bands(height, move |rows| Ok(recolor_rows(&source, transform, rows)))
                    .await?;
                let buffer = PixelBuffer::from_pixels(width, height, pixels)?;
                recolor_outcome(request.effect, buffer)
            }
            Plan::Compress(size) => {
                let cropping = Cropping::new(width, height, size);
                let pixels = self
                    .run_bands(cropping.blocks_high(), move |block_rows| {
                        compress_rows(&source, &cropping, block_rows)
                    })
                    .await?;
                let buffer =
                    PixelBuffer::from_pixels(cropping.blocks_wide(), cropping.blocks_high(), pixels)?;
                resample_outcome(Effect::Compress, Resampled { buffer, cropping })
            }
            Plan::Pixelate(size) => {
                let cropping = Cropping::new(width, height, size);
                let pixels = self
                    .run_bands(cropping.blocks_high(), move |block_rows| {
                        pixelate_rows(&source, &cropping, block_rows)
                    })
                    .await?;
                let buffer =
                    PixelBuffer::from_pixels(cropping.scan_width, cropping.scan_height, pixels)?;
                resample_outcome(Effect::Pixelate, Resampled { buffer, cropping })
            }
            Plan::Pointillism(diameter) => {
                let mut rng = wyrand(request.seed);
                let cancel = self.cancel.clone();
                let stippled = spawn_blocking(move || stipple(&source, diameter, &mut rng, &cancel))
                    .await
                    .map_err(worker_error)?;
                stipple_outcome(stippled)
            }
        };
        Ok(outcome)
    }

    /// Decodes `request.source`, applies the effect and writes PNG to `request.destination`.
    pub async fn edit_file(&self, request: &EditRequest) -> EditorResult<Outcome> {
        let saved = self.edit(request).await;
        self.cancel.reset();
        saved
    }

    async fn edit(&self, request: &EditRequest) -> EditorResult<Outcome> {
        request.effect.validate()?;

        let source_path = request.source.clone();
        let source = spawn_blocking(move || image_io::decode(&source_path))
            .await
            .map_err(worker_error)??;

        let outcome = self.dispatch(Arc::new(source), &request.effect).await?;

        let destination = request.destination.clone();
        spawn_blocking(move || save_outcome(outcome, &destination))
            .await
            .map_err(worker_error)?
    }
}

impl Default for ParallelPipeline {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
