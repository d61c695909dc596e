// THEORY:
// This file is the main entry point for the `viperion` library crate. It exposes
// the two dispatchers (`EffectPipeline` and its band-parallel twin
// `ParallelPipeline`) together with the request, outcome and error types callers
// need to drive them.
//
// The algorithms themselves live in `core_modules`: the color model, the pixel
// buffer, block averaging, and one module per family of effects. Their value
// types are public, but the effect functions are crate-private: the pipelines
// are the only way to run an effect, so every parameter is validated first.

pub mod config;
pub mod core_modules;
pub mod effect;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::EditorConfig;
pub use core_modules::color::color::Color;
pub use core_modules::pixel_buffer::PixelBuffer;
pub use effect::Effect;
pub use error::{EditorError, EditorResult};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::{EditRequest, EffectPipeline, EffectRequest, Outcome, Rendering};
