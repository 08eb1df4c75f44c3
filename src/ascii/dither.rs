//! Floyd-Steinberg error diffusion at block granularity.
//!
//! Each block is one sample: its brightness is quantized to the glyph ramp
//! and the residual is pushed to neighbouring blocks. Error diffusion pattern:
//! ```text
//!        [*]  7/16
//! 3/16  5/16  1/16
//! ```

/// Two error rows sized to the block columns, reused across frames.
#[derive(Debug, Default, Clone)]
pub struct Ditherer {
    current: Vec<i32>,
    next: Vec<i32>,
}

impl Ditherer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero both error rows for a frame with `columns` blocks per row.
    pub fn begin_frame(&mut self, columns: usize) {
        self.current.clear();
        self.current.resize(columns, 0);
        self.next.clear();
        self.next.resize(columns, 0);
    }

    /// Quantize the block at column `x` and diffuse the residual.
    ///
    /// Returns the quantized brightness, which maps back onto level
    /// `round(raw / (256 / levels))` of the glyph ramp.
    pub fn quantize(&mut self, x: usize, brightness: f32, levels: usize) -> f32 {
        let carried = self.current.get(x).copied().unwrap_or(0);
        let raw = brightness as i32 + carried;
        if levels == 0 {
            return raw.clamp(0, 255) as f32;
        }

        // Nearest level, then the smallest brightness that maps back onto it.
        let levels = levels as i32;
        let level = ((raw.max(0) * levels + 128) / 256).min(levels - 1);
        let quantized = ((level * 256 + levels - 1) / levels).min(255);
        let error = raw - quantized;

        if let Some(right) = self.current.get_mut(x + 1) {
            *right += (error * 7) >> 4;
        }
        if let Some(below_right) = self.next.get_mut(x + 1) {
            *below_right += error >> 4;
        }
        if x > 0 {
            if let Some(below_left) = self.next.get_mut(x - 1) {
                *below_left += (error * 3) >> 4;
            }
        }
        if let Some(below) = self.next.get_mut(x) {
            *below += (error * 5) >> 4;
        }

        quantized as f32
    }

    /// Advance to the next block row.
    pub fn end_row(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.iter_mut().for_each(|e| *e = 0);
    }

    /// Accumulated error waiting for the current row.
    pub fn current_errors(&self) -> &[i32] {
        &self.current
    }

    /// Accumulated error waiting for the next row.
    pub fn next_errors(&self) -> &[i32] {
        &self.next
    }
}
