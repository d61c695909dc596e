pub mod block;
pub mod cancel;
pub mod color;
pub mod image_io;
pub mod pixel_buffer;
pub mod pointillism;
pub mod random_source;
pub mod recolor;
pub mod resample;
