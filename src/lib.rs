//! glyphcast library crate.
//!
//! Renders RGB frames as block glyph art and hands each frame to a display
//! backend as a batched command buffer.

pub mod ascii;
pub mod command;
pub mod config;
pub mod error;
pub mod font;
pub mod logging;
pub mod pipeline;
pub mod pixel;
pub mod ppm;
pub mod raster;

pub use command::{CommandBuffer, DisplayBackend, SurfaceHandle, Surfaces};
pub use config::{Config, DitherMode, RenderConfig, RenderSettings};
pub use error::RenderError;
pub use pipeline::{PresentError, RenderContext};
pub use pixel::{PixelBuffer, Rgb};
