//! Block-quantized glyph analysis.
//!
//! This module turns raw RGB frames into per-block glyph and color decisions:
//!
//! 1. **Grayscale conversion** - luma `0.3R + 0.59G + 0.11B`
//! 2. **Edge detection** - optional DoG + Sobel gradient analysis
//! 3. **Block analysis** - brightness/color/edge sums per square tile
//! 4. **Glyph selection** - brightness ramp or edge-direction glyph
//! 5. **Dithering** - optional Floyd-Steinberg diffusion across blocks
//!
//! # Glyph Sets
//!
//! Presets are available via [`GlyphPreset`]:
//! - `Sparse` - 10-level ASCII ramp
//! - `Blocks` - Unicode shade blocks
//! - `Dense` - 70-level ASCII ramp

mod blocks;
mod charset;
mod dither;
mod edges;
mod grayscale;
mod mapping;

pub use blocks::{output_dimensions, BlockAnalyzer, BlockGrid, BlockRect, BlockStats};
pub use charset::{
    GlyphInfo, GlyphPreset, GlyphTable, BLOCK_GLYPHS, DENSE_GLYPHS, SPARSE_GLYPHS,
};
pub use dither::Ditherer;
pub use edges::{
    detect_edges, gaussian_kernel, gaussian_kernel_into, kernel_size, EdgeData, EdgeDetector,
    MAX_SIGMA,
};
pub use grayscale::{luma, to_grayscale, to_grayscale_into};
pub use mapping::{
    EdgeDirection, GlyphChoice, GlyphSelector, Selection, EDGE_THRESHOLD, SPACE_GLYPH,
};
