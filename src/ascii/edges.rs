//! Difference-of-Gaussians + Sobel edge detection.
//!
//! The detector converts the frame to grayscale, blurs it at two scales,
//! subtracts the blurs to isolate edges, then runs the Sobel operator over
//! the result to get per-pixel gradient magnitude and direction.
//!
//! The Sobel kernels used are:
//! ```text
//! Gx:          Gy:
//! [-1  0  1]   [-1 -2 -1]
//! [-2  0  2]   [ 0  0  0]
//! [-1  0  1]   [ 1  2  1]
//! ```

use super::grayscale::to_grayscale_into;
use crate::config::RenderConfig;
use crate::pixel::PixelBuffer;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Offset added to the difference of Gaussians so that "no edge" sits mid-gray.
const DOG_BIAS: f32 = 128.0;

/// Per-pixel edge analysis of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeData {
    pub width: u32,
    pub height: u32,
    /// Luma of each source pixel.
    pub grayscale: Vec<u8>,
    /// Sobel gradient magnitude, `sqrt(gx² + gy²)`.
    pub magnitude: Vec<f32>,
    /// Sobel gradient direction, `atan2(gy, gx)` in radians.
    pub direction: Vec<f32>,
}

impl EdgeData {
    fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.grayscale.clear();
        self.magnitude.clear();
        self.direction.clear();
    }
}

/// Largest Gaussian sigma the blur honours. Larger values are treated as this.
pub const MAX_SIGMA: f32 = 32.0;

/// Number of taps for a Gaussian of standard deviation `sigma`.
///
/// `6σ` rounded up to the next odd count, never less than 1. Sigma is
/// capped at [`MAX_SIGMA`].
pub fn kernel_size(sigma: f32) -> usize {
    if sigma.is_nan() {
        return 1;
    }
    let span = (6.0 * sigma.min(MAX_SIGMA)).ceil();
    if span < 1.0 {
        return 1;
    }
    let size = span as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Build a normalized 1-D Gaussian kernel into `kernel`.
pub fn gaussian_kernel_into(sigma: f32, kernel: &mut Vec<f32>) {
    let size = kernel_size(sigma);
    kernel.clear();
    if size == 1 {
        kernel.push(1.0);
        return;
    }

    let sigma = sigma.min(MAX_SIGMA);
    let radius = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;
    kernel.extend((0..size).map(|i| {
        let x = i as f32 - radius;
        (-(x * x) / denom).exp()
    }));

    let sum: f32 = kernel.iter().sum();
    for weight in kernel.iter_mut() {
        *weight /= sum;
    }
}

/// Allocating convenience wrapper around [`gaussian_kernel_into`].
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::new();
    gaussian_kernel_into(sigma, &mut kernel);
    kernel
}

/// Separable Gaussian blur: horizontal pass into `scratch`, vertical pass into `out`.
///
/// Samples past the border are clamped to the nearest edge pixel.
fn blur_into(
    gray: &[u8],
    width: usize,
    height: usize,
    kernel: &[f32],
    scratch: &mut Vec<f32>,
    out: &mut Vec<f32>,
) {
    let radius = (kernel.len() / 2) as isize;
    let max_x = width as isize - 1;
    let max_y = height as isize - 1;

    scratch.clear();
    scratch.resize(width * height, 0.0);
    for y in 0..height {
        let row = &gray[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, max_x) as usize;
                acc += row[sx] as f32 * weight;
            }
            scratch[y * width + x] = acc;
        }
    }

    out.clear();
    out.resize(width * height, 0.0);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - radius).clamp(0, max_y) as usize;
                acc += scratch[sy * width + x] * weight;
            }
            out[y * width + x] = acc;
        }
    }
}

/// Sobel magnitude and direction over `image`, leaving a zero 1-pixel border.
fn sobel_into(image: &[u8], width: usize, height: usize, magnitude: &mut [f32], direction: &mut [f32]) {
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx: i32 = 0;
            let mut gy: i32 = 0;

            for ky in 0..3 {
                for kx in 0..3 {
                    let idx = (y + ky - 1) * width + (x + kx - 1);
                    let val = image[idx] as i32;
                    gx += val * SOBEL_X[ky][kx];
                    gy += val * SOBEL_Y[ky][kx];
                }
            }

            let (gx, gy) = (gx as f32, gy as f32);
            let idx = y * width + x;
            magnitude[idx] = (gx * gx + gy * gy).sqrt();
            direction[idx] = gy.atan2(gx);
        }
    }
}

/// Reusable edge detector.
///
/// Owns every intermediate buffer, so steady-state frames of a constant
/// size do not allocate.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    kernel1: Vec<f32>,
    kernel2: Vec<f32>,
    sigmas: Option<(f32, f32)>,
    scratch: Vec<f32>,
    blur1: Vec<f32>,
    blur2: Vec<f32>,
    dog: Vec<u8>,
    data: EdgeData,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run edge detection when the config enables it.
    pub fn run(&mut self, image: &PixelBuffer, config: &RenderConfig) -> Option<&EdgeData> {
        if !config.detect_edges() {
            return None;
        }
        Some(self.detect(image, config.sigma1(), config.sigma2()))
    }

    /// Analyze `image` with the two blur scales.
    ///
    /// A zero-sized image yields empty arrays. Images smaller than 3x3 get
    /// zero-filled magnitude and direction.
    pub fn detect(&mut self, image: &PixelBuffer, sigma1: f32, sigma2: f32) -> &EdgeData {
        let width = image.width() as usize;
        let height = image.height() as usize;
        if width == 0 || height == 0 {
            self.data.clear();
            return &self.data;
        }

        if self.sigmas != Some((sigma1, sigma2)) {
            gaussian_kernel_into(sigma1, &mut self.kernel1);
            gaussian_kernel_into(sigma2, &mut self.kernel2);
            self.sigmas = Some((sigma1, sigma2));
        }

        let pixel_count = width * height;
        self.data.width = image.width();
        self.data.height = image.height();
        to_grayscale_into(image, &mut self.data.grayscale);

        self.data.magnitude.clear();
        self.data.magnitude.resize(pixel_count, 0.0);
        self.data.direction.clear();
        self.data.direction.resize(pixel_count, 0.0);

        if width < 3 || height < 3 {
            return &self.data;
        }

        let gray = &self.data.grayscale;
        blur_into(gray, width, height, &self.kernel1, &mut self.scratch, &mut self.blur1);
        blur_into(gray, width, height, &self.kernel2, &mut self.scratch, &mut self.blur2);

        // Rounded, not truncated: flat regions must land on exactly DOG_BIAS.
        self.dog.clear();
        self.dog.extend(
            self.blur1
                .iter()
                .zip(&self.blur2)
                .map(|(a, b)| (a - b + DOG_BIAS).round().clamp(0.0, 255.0) as u8),
        );

        sobel_into(
            &self.dog,
            width,
            height,
            &mut self.data.magnitude,
            &mut self.data.direction,
        );

        &self.data
    }

    /// The result of the most recent [`detect`](Self::detect).
    pub fn data(&self) -> &EdgeData {
        &self.data
    }
}

/// One-shot edge detection for callers that do not keep a detector around.
pub fn detect_edges(image: &PixelBuffer, sigma1: f32, sigma2: f32) -> EdgeData {
    let mut detector = EdgeDetector::new();
    detector.detect(image, sigma1, sigma2);
    detector.data
}
