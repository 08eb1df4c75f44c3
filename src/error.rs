//! Error types for the glyph rendering pipeline.

/// Errors that can occur while validating input or rendering a frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("invalid image dimensions {width}x{height}: width and height must be non-zero")]
    InvalidImageDimensions { width: u32, height: u32 },

    #[error("invalid image data: expected at least {expected} bytes, got {actual}")]
    InvalidImageData { expected: usize, actual: usize },

    #[error(
        "invalid resize dimensions {src_width}x{src_height} -> {dst_width}x{dst_height}: \
         all dimensions must be non-zero"
    )]
    InvalidResizeDimensions {
        src_width: u32,
        src_height: u32,
        dst_width: u32,
        dst_height: u32,
    },

    #[error("unsupported channel count {0}: expected 3 (RGB) or 4 (RGBA)")]
    UnsupportedChannels(u8),

    #[error("no bitmap available for glyph {0:?}")]
    UnknownGlyph(String),

    #[error("no surface registered under handle {0}")]
    UnknownSurface(u32),

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to allocate {bytes} bytes for pixel storage")]
    AllocationFailed { bytes: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_error_display() {
        let err = RenderError::InvalidImageDimensions {
            width: 0,
            height: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x10"));
        assert!(msg.contains("non-zero"));
    }

    #[test]
    fn test_data_error_display() {
        let err = RenderError::InvalidImageData {
            expected: 12,
            actual: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("9"));
    }

    #[test]
    fn test_unknown_glyph_display() {
        let err = RenderError::UnknownGlyph("☃".to_string());
        assert!(err.to_string().contains('☃'));
    }
}
