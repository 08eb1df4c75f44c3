//! CLI enum types for glyph presets and dithering.

use clap::ValueEnum;

use glyphcast::ascii::GlyphPreset;
use glyphcast::DitherMode;

/// Built-in glyph set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    #[default]
    Sparse,
    Blocks,
    Dense,
}

impl From<Preset> for GlyphPreset {
    fn from(p: Preset) -> Self {
        match p {
            Preset::Sparse => GlyphPreset::Sparse,
            Preset::Blocks => GlyphPreset::Blocks,
            Preset::Dense => GlyphPreset::Dense,
        }
    }
}

/// Error diffusion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Dither {
    #[default]
    None,
    FloydSteinberg,
}

impl From<Dither> for DitherMode {
    fn from(d: Dither) -> Self {
        match d {
            Dither::None => DitherMode::None,
            Dither::FloydSteinberg => DitherMode::FloydSteinberg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_to_glyph_preset() {
        assert_eq!(GlyphPreset::from(Preset::Sparse), GlyphPreset::Sparse);
        assert_eq!(GlyphPreset::from(Preset::Blocks), GlyphPreset::Blocks);
        assert_eq!(GlyphPreset::from(Preset::Dense), GlyphPreset::Dense);
    }

    #[test]
    fn test_dither_to_mode() {
        assert_eq!(DitherMode::from(Dither::None), DitherMode::None);
        assert_eq!(
            DitherMode::from(Dither::FloydSteinberg),
            DitherMode::FloydSteinberg
        );
    }
}
