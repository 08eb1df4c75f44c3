//! Raw pixel storage shared by every stage of the pipeline.
//!
//! A [`PixelBuffer`] is allocated once and reused across frames. Reshaping
//! keeps the existing allocation whenever the new frame fits in it.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Channel count of packed RGB data.
pub const RGB_CHANNELS: u8 = 3;

/// Channel count of packed RGBA data. The alpha byte is carried but ignored.
pub const RGBA_CHANNELS: u8 = 4;

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel `255 - c`.
    pub const fn inverted(self) -> Self {
        Self {
            r: 255 - self.r,
            g: 255 - self.g,
            b: 255 - self.b,
        }
    }
}

/// Owned, row-major pixel storage.
///
/// Invariant: `data.len() >= width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl PixelBuffer {
    /// Allocate a zeroed RGB buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Self::with_channels(width, height, RGB_CHANNELS)
    }

    /// Allocate a zeroed buffer with the given channel count.
    pub fn with_channels(width: u32, height: u32, channels: u8) -> Result<Self, RenderError> {
        check_dimensions(width, height)?;
        check_channels(channels)?;
        let len = required_len(width, height, channels);
        let mut data = Vec::new();
        grow_zeroed(&mut data, len)?;
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Wrap existing pixel data, validating it against the dimensions.
    pub fn from_raw(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, RenderError> {
        let buffer = Self {
            data,
            width,
            height,
            channels,
        };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Check the dimension, channel and length invariants.
    pub fn validate(&self) -> Result<(), RenderError> {
        check_dimensions(self.width, self.height)?;
        check_channels(self.channels)?;
        let expected = required_len(self.width, self.height, self.channels);
        if self.data.len() < expected {
            return Err(RenderError::InvalidImageData {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Change the logical dimensions, reusing the allocation when it is large enough.
    ///
    /// Newly exposed bytes are zeroed. Existing bytes are not rearranged.
    pub fn reshape(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        check_dimensions(width, height)?;
        let len = required_len(width, height, self.channels);
        if len > self.data.len() {
            grow_zeroed(&mut self.data, len)?;
        } else {
            self.data.truncate(len);
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Overwrite this buffer with the contents and shape of `other`.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> Result<(), RenderError> {
        other.validate()?;
        self.channels = other.channels;
        self.reshape(other.width, other.height)?;
        let len = self.byte_len();
        self.data[..len].copy_from_slice(&other.data[..len]);
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of meaningful bytes (`width * height * channels`).
    pub fn byte_len(&self) -> usize {
        required_len(self.width, self.height, self.channels)
    }

    /// Meaningful pixel bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.byte_len()]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let len = self.byte_len();
        &mut self.data[..len]
    }

    /// Consume the buffer and return its bytes, trimmed to `byte_len`.
    pub fn into_raw(mut self) -> Vec<u8> {
        self.data.truncate(self.byte_len());
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * self.channels as usize)
    }

    /// Read the color at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let idx = self.offset(x, y)?;
        let px = self.data.get(idx..idx + 3)?;
        Some(Rgb::new(px[0], px[1], px[2]))
    }

    /// Write the color at `(x, y)`. Out-of-bounds writes are skipped and return false.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> bool {
        let Some(idx) = self.offset(x, y) else {
            return false;
        };
        match self.data.get_mut(idx..idx + 3) {
            Some(px) => {
                px[0] = color.r;
                px[1] = color.g;
                px[2] = color.b;
                true
            }
            None => false,
        }
    }

    /// Paint every pixel with one color.
    pub fn fill(&mut self, color: Rgb) {
        let channels = self.channels as usize;
        for px in self.data_mut().chunks_exact_mut(channels) {
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
        }
    }
}

/// Bytes needed for a `width x height` image with `channels` bytes per pixel.
pub fn required_len(width: u32, height: u32, channels: u8) -> usize {
    width as usize * height as usize * channels as usize
}

/// Nearest-neighbour scale of `src` into `dst`, using `dst`'s current dimensions.
///
/// Fails without touching `dst` if any source or target dimension is zero.
pub fn resize_nearest_into(src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<(), RenderError> {
    if src.width == 0 || src.height == 0 || dst.width == 0 || dst.height == 0 {
        return Err(RenderError::InvalidResizeDimensions {
            src_width: src.width,
            src_height: src.height,
            dst_width: dst.width,
            dst_height: dst.height,
        });
    }
    src.validate()?;
    dst.validate()?;

    for y in 0..dst.height {
        let sy = (y as u64 * src.height as u64 / dst.height as u64) as u32;
        for x in 0..dst.width {
            let sx = (x as u64 * src.width as u64 / dst.width as u64) as u32;
            if let Some(color) = src.pixel(sx, sy) {
                dst.set_pixel(x, y, color);
            }
        }
    }
    Ok(())
}

fn check_dimensions(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidImageDimensions { width, height });
    }
    Ok(())
}

fn check_channels(channels: u8) -> Result<(), RenderError> {
    match channels {
        RGB_CHANNELS | RGBA_CHANNELS => Ok(()),
        other => Err(RenderError::UnsupportedChannels(other)),
    }
}

/// Grow `data` to `len` zeroed bytes, surfacing allocator failure instead of aborting.
fn grow_zeroed(data: &mut Vec<u8>, len: usize) -> Result<(), RenderError> {
    let additional = len.saturating_sub(data.len());
    data.try_reserve_exact(additional)
        .map_err(|_| RenderError::AllocationFailed { bytes: len })?;
    data.resize(len, 0);
    Ok(())
}
