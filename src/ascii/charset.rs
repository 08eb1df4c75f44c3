//! Glyph set definitions and the per-glyph byte index.

use crate::error::RenderError;

/// Sparse ASCII density ramp (10 levels), darkest (space) to densest (@).
pub const SPARSE_GLYPHS: &str = " .:-=+*#%@";

/// Unicode block ramp (5 levels).
pub const BLOCK_GLYPHS: &str = " ░▒▓█";

/// Dense ASCII ramp (70 levels), darkest (space) to densest ($).
pub const DENSE_GLYPHS: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Built-in glyph set, selectable by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphPreset {
    /// 10-level ASCII ramp
    #[default]
    Sparse,
    /// 5-level Unicode block ramp
    Blocks,
    /// 70-level ASCII ramp
    Dense,
}

impl GlyphPreset {
    pub const ALL: [GlyphPreset; 3] = [GlyphPreset::Sparse, GlyphPreset::Blocks, GlyphPreset::Dense];

    /// Look up a preset by its index (0 = sparse, 1 = blocks, 2 = dense).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Look up a preset by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn index(&self) -> usize {
        match self {
            GlyphPreset::Sparse => 0,
            GlyphPreset::Blocks => 1,
            GlyphPreset::Dense => 2,
        }
    }

    /// Glyph string for this preset, ordered darkest to densest.
    pub fn glyphs(&self) -> &'static str {
        match self {
            GlyphPreset::Sparse => SPARSE_GLYPHS,
            GlyphPreset::Blocks => BLOCK_GLYPHS,
            GlyphPreset::Dense => DENSE_GLYPHS,
        }
    }

    /// Cycle to the next preset.
    ///
    /// Order: Sparse -> Blocks -> Dense -> Sparse
    pub fn next(&self) -> Self {
        match self {
            GlyphPreset::Sparse => GlyphPreset::Blocks,
            GlyphPreset::Blocks => GlyphPreset::Dense,
            GlyphPreset::Dense => GlyphPreset::Sparse,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GlyphPreset::Sparse => "sparse",
            GlyphPreset::Blocks => "blocks",
            GlyphPreset::Dense => "dense",
        }
    }
}

/// Byte range of one glyph inside the glyph string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphInfo {
    pub byte_start: usize,
    pub byte_len: usize,
}

/// Ordered glyph set with precomputed byte ranges.
///
/// Built once per glyph string and reused every frame. Glyphs may be
/// multi-byte UTF-8 sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    glyphs: String,
    infos: Vec<GlyphInfo>,
}

impl GlyphTable {
    pub fn new(glyphs: &str) -> Result<Self, RenderError> {
        if glyphs.is_empty() {
            return Err(RenderError::InvalidConfig(
                "glyph string must not be empty".to_string(),
            ));
        }
        Ok(Self::from_glyphs(glyphs))
    }

    pub fn from_preset(preset: GlyphPreset) -> Self {
        Self::from_glyphs(preset.glyphs())
    }

    fn from_glyphs(glyphs: &str) -> Self {
        let infos = glyphs
            .char_indices()
            .map(|(byte_start, ch)| GlyphInfo {
                byte_start,
                byte_len: ch.len_utf8(),
            })
            .collect();
        Self {
            glyphs: glyphs.to_string(),
            infos,
        }
    }

    /// Number of glyphs (not bytes).
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.glyphs
    }

    pub fn info(&self, index: usize) -> Option<GlyphInfo> {
        self.infos.get(index).copied()
    }

    /// Glyph substring at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        let info = self.infos.get(index)?;
        self.glyphs.get(info.byte_start..info.byte_start + info.byte_len)
    }

    /// Iterate glyph substrings in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::from_preset(GlyphPreset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_sizes() {
        assert_eq!(SPARSE_GLYPHS.chars().count(), 10);
        assert_eq!(BLOCK_GLYPHS.chars().count(), 5);
        assert_eq!(DENSE_GLYPHS.chars().count(), 70);
    }

    #[test]
    fn test_presets_start_with_space() {
        for preset in GlyphPreset::ALL {
            assert!(preset.glyphs().starts_with(' '), "{}", preset.name());
        }
    }

    #[test]
    fn test_preset_index_roundtrip() {
        for preset in GlyphPreset::ALL {
            assert_eq!(GlyphPreset::from_index(preset.index()), Some(preset));
        }
        assert_eq!(GlyphPreset::from_index(3), None);
    }

    #[test]
    fn test_preset_cycle() {
        let start = GlyphPreset::Sparse;
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_preset_from_name() {
        assert_eq!(GlyphPreset::from_name("Dense"), Some(GlyphPreset::Dense));
        assert_eq!(GlyphPreset::from_name("braille"), None);
    }

    #[test]
    fn test_table_multibyte_offsets() {
        let table = GlyphTable::new(BLOCK_GLYPHS).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.info(0), Some(GlyphInfo { byte_start: 0, byte_len: 1 }));
        assert_eq!(table.info(1), Some(GlyphInfo { byte_start: 1, byte_len: 3 }));
        assert_eq!(table.info(4), Some(GlyphInfo { byte_start: 10, byte_len: 3 }));
        assert_eq!(table.get(4), Some("█"));
        assert_eq!(table.get(5), None);
    }

    #[test]
    fn test_preset_table_matches_string_table() {
        for preset in GlyphPreset::ALL {
            assert_eq!(
                GlyphTable::from_preset(preset),
                GlyphTable::new(preset.glyphs()).unwrap()
            );
        }
    }

    #[test]
    fn test_table_rejects_empty() {
        assert!(matches!(
            GlyphTable::new(""),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_table_iter_matches_chars() {
        let table = GlyphTable::from_preset(GlyphPreset::Dense);
        let collected: String = table.iter().collect();
        assert_eq!(collected, DENSE_GLYPHS);
    }
}
