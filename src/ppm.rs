//! Binary PPM (`P6`) reading and writing, plus a file-backed display backend.
//!
//! Only 8-bit images (`maxval` 255) are supported. Header tokens may be
//! separated by any whitespace and `#` comments run to end of line.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::command::{decode_commands, Command, CommandDecodeError, DisplayBackend, Surfaces};
use crate::error::RenderError;
use crate::pixel::{PixelBuffer, RGB_CHANNELS};

const MAGIC: &[u8; 2] = b"P6";
const MAX_VALUE: u32 = 255;

/// Errors reading, writing or presenting PPM images.
#[derive(Debug, thiserror::Error)]
pub enum PpmError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("not a binary PPM image (expected P6 header)")]
    BadMagic,

    #[error("malformed PPM header: {0}")]
    BadHeader(String),

    #[error("unsupported PPM maxval {0}: only 255 is supported")]
    UnsupportedMaxValue(u32),

    #[error(transparent)]
    Image(#[from] RenderError),

    #[error(transparent)]
    Commands(#[from] CommandDecodeError),

    #[error("draw issued before any surface was uploaded")]
    NothingUploaded,
}

/// Parse a P6 image from a byte stream into an RGB buffer.
pub fn read_ppm<R: Read>(mut reader: R) -> Result<PixelBuffer, PpmError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_ppm(&bytes)
}

/// Parse a P6 image held in memory.
pub fn decode_ppm(bytes: &[u8]) -> Result<PixelBuffer, PpmError> {
    if bytes.len() < 2 || &bytes[..2] != MAGIC {
        return Err(PpmError::BadMagic);
    }

    let mut cursor = HeaderCursor { bytes, pos: 2 };
    let width = cursor.number("width")?;
    let height = cursor.number("height")?;
    let max_value = cursor.number("maxval")?;
    if max_value != MAX_VALUE {
        return Err(PpmError::UnsupportedMaxValue(max_value));
    }

    // Exactly one whitespace byte separates the header from the raster.
    match bytes.get(cursor.pos) {
        Some(b) if b.is_ascii_whitespace() => cursor.pos += 1,
        _ => return Err(PpmError::BadHeader("missing separator before pixel data".into())),
    }

    let raster = &bytes[cursor.pos..];
    let expected = width as usize * height as usize * RGB_CHANNELS as usize;
    let data = raster.get(..expected).unwrap_or(raster).to_vec();
    Ok(PixelBuffer::from_raw(data, width, height, RGB_CHANNELS)?)
}

struct HeaderCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl HeaderCursor<'_> {
    fn skip_blank(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.bytes.get(self.pos) {
                    if c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn number(&mut self, field: &str) -> Result<u32, PpmError> {
        self.skip_blank();
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PpmError::BadHeader(format!("missing or invalid {}", field)))
    }
}

/// Write `image` as P6. Alpha, if present, is dropped.
pub fn write_ppm<W: Write>(mut writer: W, image: &PixelBuffer) -> Result<(), PpmError> {
    image.validate()?;
    write!(
        writer,
        "P6\n{} {}\n{}\n",
        image.width(),
        image.height(),
        MAX_VALUE
    )?;
    if image.channels() == RGB_CHANNELS {
        writer.write_all(image.data())?;
    } else {
        let stride = image.channels() as usize;
        let mut row = Vec::with_capacity(image.width() as usize * RGB_CHANNELS as usize);
        for line in image.data().chunks_exact(stride * image.width() as usize) {
            row.clear();
            for px in line.chunks_exact(stride) {
                row.extend_from_slice(&px[..3]);
            }
            writer.write_all(&row)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn load_ppm(path: &Path) -> Result<PixelBuffer, PpmError> {
    let bytes = std::fs::read(path).map_err(|e| PpmError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_ppm(&bytes)
}

pub fn save_ppm(path: &Path, image: &PixelBuffer) -> Result<(), PpmError> {
    let file = std::fs::File::create(path).map_err(|e| PpmError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_ppm(std::io::BufWriter::new(file), image)
}

/// Display backend that writes every drawn surface to a PPM file.
///
/// An upload selects the surface; the following draw writes it. A draw
/// without a preceding upload in the same buffer is an error.
#[derive(Debug)]
pub struct PpmFileBackend {
    path: PathBuf,
    frames_written: u64,
}

impl PpmFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl DisplayBackend for PpmFileBackend {
    type Error = PpmError;

    fn submit(&mut self, commands: &[u32], surfaces: &Surfaces) -> Result<(), Self::Error> {
        let mut uploaded = None;
        for command in decode_commands(commands)? {
            match command {
                Command::UploadTexture(handle) => {
                    let surface = surfaces
                        .get(handle)
                        .ok_or(RenderError::UnknownSurface(handle.0))?;
                    uploaded = Some(surface);
                }
                Command::DrawArrays => {
                    let surface = uploaded.ok_or(PpmError::NothingUploaded)?;
                    save_ppm(&self.path, surface)?;
                    self.frames_written += 1;
                    log::debug!(
                        "Wrote {}x{} frame to {}",
                        surface.width(),
                        surface.height(),
                        self.path.display()
                    );
                }
            }
        }
        Ok(())
    }
}
