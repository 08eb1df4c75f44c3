//! Block partitioning and per-block statistics.

use super::edges::EdgeData;
use super::grayscale::luma;
use crate::pixel::{PixelBuffer, Rgb};

/// Output region for a `width x height` frame at `block_size`.
///
/// Each side is truncated to a whole number of blocks and floored to 1.
pub fn output_dimensions(width: u32, height: u32, block_size: u8) -> (u32, u32) {
    let bs = block_size.max(1) as u32;
    let out_w = (width / bs * bs).max(1);
    let out_h = (height / bs * bs).max(1);
    (out_w, out_h)
}

/// One square tile, in output (and source) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Tile layout of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    pub block_size: u32,
    pub columns: u32,
    pub rows: u32,
    pub out_width: u32,
    pub out_height: u32,
}

impl BlockGrid {
    pub fn new(width: u32, height: u32, block_size: u8) -> Self {
        let bs = block_size.max(1) as u32;
        let (out_width, out_height) = output_dimensions(width, height, block_size);
        Self {
            block_size: bs,
            columns: out_width.div_ceil(bs),
            rows: out_height.div_ceil(bs),
            out_width,
            out_height,
        }
    }

    pub fn tile(&self, column: u32, row: u32) -> BlockRect {
        BlockRect {
            x: column * self.block_size,
            y: row * self.block_size,
            size: self.block_size,
        }
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = BlockRect> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| self.tile(col, row)))
    }
}

/// Aggregate of every source pixel inside one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockStats {
    pub brightness_sum: u64,
    pub color_sum: [u64; 3],
    pub pixel_count: u32,
    pub magnitude_sum: f32,
    pub direction_sum: f32,
}

impl BlockStats {
    pub fn average_brightness(&self) -> f32 {
        if self.pixel_count == 0 {
            return 0.0;
        }
        self.brightness_sum as f32 / self.pixel_count as f32
    }

    pub fn average_color(&self) -> Rgb {
        if self.pixel_count == 0 {
            return Rgb::BLACK;
        }
        let n = self.pixel_count as u64;
        Rgb::new(
            (self.color_sum[0] / n) as u8,
            (self.color_sum[1] / n) as u8,
            (self.color_sum[2] / n) as u8,
        )
    }

    pub fn average_magnitude(&self) -> f32 {
        if self.pixel_count == 0 {
            return 0.0;
        }
        self.magnitude_sum / self.pixel_count as f32
    }

    pub fn average_direction(&self) -> f32 {
        if self.pixel_count == 0 {
            return 0.0;
        }
        self.direction_sum / self.pixel_count as f32
    }
}

/// Sums luma, color and edge data per tile.
#[derive(Debug, Clone, Copy)]
pub struct BlockAnalyzer {
    collect_color: bool,
}

impl BlockAnalyzer {
    pub fn new(collect_color: bool) -> Self {
        Self { collect_color }
    }

    /// Aggregate the source pixels under `tile`.
    ///
    /// The tile is clipped to the source image. Returns `None` when no
    /// source pixel falls inside it.
    pub fn analyze(
        &self,
        image: &PixelBuffer,
        edges: Option<&EdgeData>,
        tile: BlockRect,
    ) -> Option<BlockStats> {
        let end_x = (tile.x + tile.size).min(image.width());
        let end_y = (tile.y + tile.size).min(image.height());
        let width = image.width() as usize;
        let channels = image.channels() as usize;
        let data = image.data();

        let mut stats = BlockStats::default();
        for py in tile.y..end_y {
            for px in tile.x..end_x {
                let pixel_index = py as usize * width + px as usize;
                let idx = pixel_index * channels;
                let Some(rgb) = data.get(idx..idx + 3) else {
                    continue;
                };

                stats.brightness_sum += luma(rgb[0], rgb[1], rgb[2]) as u64;
                if self.collect_color {
                    stats.color_sum[0] += rgb[0] as u64;
                    stats.color_sum[1] += rgb[1] as u64;
                    stats.color_sum[2] += rgb[2] as u64;
                }
                if let Some(edges) = edges {
                    if let (Some(m), Some(d)) =
                        (edges.magnitude.get(pixel_index), edges.direction.get(pixel_index))
                    {
                        stats.magnitude_sum += m;
                        stats.direction_sum += d;
                    }
                }
                stats.pixel_count += 1;
            }
        }

        (stats.pixel_count > 0).then_some(stats)
    }
}
