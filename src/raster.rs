//! Paints 8x8 glyph bitmaps into a pixel buffer.

use crate::ascii::BlockRect;
use crate::font::{GlyphBitmap, GLYPH_SIZE};
use crate::pixel::{PixelBuffer, Rgb};

/// Draws one glyph per block into the output buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphRasterizer;

impl GlyphRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Paint `bitmap` over `rect`: set bits get `foreground`, clear bits `background`.
    ///
    /// Tile pixel `(dx, dy)` reads bit `7 - dx` of row `dy`. Smaller tiles
    /// show the top-left crop of the glyph; tile pixels past the 8x8 bitmap
    /// are painted `background`. Pixels outside `out` are skipped.
    pub fn draw(
        &self,
        out: &mut PixelBuffer,
        rect: BlockRect,
        bitmap: &GlyphBitmap,
        foreground: Rgb,
        background: Rgb,
    ) {
        if rect.size == 0 {
            return;
        }
        let end_x = (rect.x + rect.size).min(out.width());
        let end_y = (rect.y + rect.size).min(out.height());

        for py in rect.y..end_y {
            let dy = py - rect.y;
            let bits = if dy < GLYPH_SIZE { bitmap[dy as usize] } else { 0 };
            for px in rect.x..end_x {
                let dx = px - rect.x;
                let set = dx < GLYPH_SIZE && bits & (0x80 >> dx) != 0;
                out.set_pixel(px, py, if set { foreground } else { background });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{Font8x8, GlyphBitmapSource};

    const FG: Rgb = Rgb::WHITE;
    const BG: Rgb = Rgb::new(1, 2, 3);

    #[test]
    fn test_msb_is_leftmost() {
        let mut out = PixelBuffer::new(8, 8).unwrap();
        let bitmap = [0x80, 0, 0, 0, 0, 0, 0, 0x01];
        let rect = BlockRect { x: 0, y: 0, size: 8 };
        GlyphRasterizer::new().draw(&mut out, rect, &bitmap, FG, BG);
        assert_eq!(out.pixel(0, 0), Some(FG));
        assert_eq!(out.pixel(1, 0), Some(BG));
        assert_eq!(out.pixel(7, 7), Some(FG));
        assert_eq!(out.pixel(6, 7), Some(BG));
    }

    #[test]
    fn test_vertical_bar_one_to_one() {
        let mut out = PixelBuffer::new(8, 8).unwrap();
        let bitmap = Font8x8.resolve("|").unwrap();
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 0, y: 0, size: 8 }, &bitmap, FG, BG);
        for y in 0..7 {
            assert_eq!(out.pixel(3, y), Some(FG));
            assert_eq!(out.pixel(4, y), Some(FG));
            assert_eq!(out.pixel(2, y), Some(BG));
        }
        assert_eq!(out.pixel(3, 7), Some(BG));
    }

    #[test]
    fn test_large_tile_pads_with_background() {
        let mut out = PixelBuffer::new(16, 16).unwrap();
        let bitmap = [0x01; 8]; // column 7 only
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 0, y: 0, size: 16 }, &bitmap, FG, BG);
        for y in 0..8 {
            assert_eq!(out.pixel(7, y), Some(FG));
            assert_eq!(out.pixel(6, y), Some(BG));
            assert_eq!(out.pixel(8, y), Some(BG));
        }
        assert_eq!(out.pixel(7, 8), Some(BG));
        assert_eq!(out.pixel(15, 15), Some(BG));
    }

    #[test]
    fn test_full_bitmap_on_large_tile_lights_top_left_only() {
        let mut out = PixelBuffer::new(16, 16).unwrap();
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 0, y: 0, size: 16 }, &[0xFF; 8], FG, BG);
        let lit = (0..256).filter(|i| out.pixel(i % 16, i / 16) == Some(FG)).count();
        assert_eq!(lit, 64);
        assert_eq!(out.pixel(7, 7), Some(FG));
        assert_eq!(out.pixel(8, 7), Some(BG));
    }

    #[test]
    fn test_small_tile_crops_bitmap() {
        let mut out = PixelBuffer::new(4, 4).unwrap();
        let mut bitmap = [0u8; 8];
        bitmap[0] = 0x40; // column 1
        bitmap[3] = 0x10; // column 3
        bitmap[4] = 0xFF; // cropped away
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 0, y: 0, size: 4 }, &bitmap, FG, BG);
        assert_eq!(out.pixel(1, 0), Some(FG));
        assert_eq!(out.pixel(0, 0), Some(BG));
        assert_eq!(out.pixel(2, 0), Some(BG));
        assert_eq!(out.pixel(3, 3), Some(FG));
        assert_eq!(out.pixel(3, 2), Some(BG));
    }

    #[test]
    fn test_small_tile_ignores_right_half() {
        let mut out = PixelBuffer::new(4, 4).unwrap();
        let bitmap = [0x0F; 8]; // columns 4..8
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 0, y: 0, size: 4 }, &bitmap, FG, BG);
        assert!((0..16).all(|i| out.pixel(i % 4, i / 4) == Some(BG)));
    }

    #[test]
    fn test_clips_out_of_bounds() {
        let mut out = PixelBuffer::new(5, 5).unwrap();
        let bitmap = [0xFF; 8];
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 0, y: 0, size: 8 }, &bitmap, FG, BG);
        assert_eq!(out.pixel(4, 4), Some(FG));
        assert_eq!(out.data().len(), 75);
    }

    #[test]
    fn test_offset_tile() {
        let mut out = PixelBuffer::new(16, 8).unwrap();
        let bitmap = [0xFF; 8];
        GlyphRasterizer::new().draw(&mut out, BlockRect { x: 8, y: 0, size: 8 }, &bitmap, FG, BG);
        assert_eq!(out.pixel(7, 0), Some(Rgb::BLACK));
        assert_eq!(out.pixel(8, 0), Some(FG));
    }
}
