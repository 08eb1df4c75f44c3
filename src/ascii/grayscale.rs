//! RGB to grayscale conversion using the `0.3R + 0.59G + 0.11B` luma weights.

use crate::pixel::PixelBuffer;

/// Luma of one RGB pixel, truncated to an integer.
///
/// Integer math keeps the truncation exact: coefficients are scaled by 100
/// (30 + 59 + 11 = 100), so white maps to exactly 255.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((30 * r as u32 + 59 * g as u32 + 11 * b as u32) / 100) as u8
}

/// Convert a pixel buffer to grayscale, reusing `buffer`.
///
/// # Returns
/// The number of pixels written to the buffer
pub fn to_grayscale_into(image: &PixelBuffer, buffer: &mut Vec<u8>) -> usize {
    let pixel_count = image.width() as usize * image.height() as usize;
    buffer.clear();
    buffer.reserve(pixel_count);

    for px in image.data().chunks_exact(image.channels() as usize) {
        buffer.push(luma(px[0], px[1], px[2]));
    }

    pixel_count
}

/// Allocating convenience wrapper around [`to_grayscale_into`].
pub fn to_grayscale(image: &PixelBuffer) -> Vec<u8> {
    let mut gray = Vec::new();
    to_grayscale_into(image, &mut gray);
    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_primaries() {
        assert_eq!(luma(255, 0, 0), 76); // 76.5 truncated
        assert_eq!(luma(0, 255, 0), 150); // 150.45 truncated
        assert_eq!(luma(0, 0, 255), 28); // 28.05 truncated
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(128, 128, 128), 128);
    }

    #[test]
    fn test_to_grayscale_rgba_stride() {
        let image =
            PixelBuffer::from_raw(vec![255, 255, 255, 0, 0, 0, 0, 255], 2, 1, 4).unwrap();
        assert_eq!(to_grayscale(&image), vec![255, 0]);
    }
}
