//! Block statistics to glyph and color selection.

use std::f32::consts::PI;

use super::blocks::BlockStats;
use super::charset::GlyphTable;
use crate::config::RenderConfig;
use crate::pixel::Rgb;

/// Average edge magnitude below which a block falls back to its brightness glyph.
pub const EDGE_THRESHOLD: f32 = 50.0;

/// Glyph used for blocks with zero brightness.
pub const SPACE_GLYPH: &str = " ";

/// Dominant gradient orientation of a block, in 45° buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Bucket centered at 0°
    Horizontal,
    /// Bucket centered at 45°
    DiagonalDown,
    /// Bucket centered at 90°
    Vertical,
    /// Bucket centered at 135°
    DiagonalUp,
}

impl EdgeDirection {
    /// Bucket a gradient direction from `atan2` (radians in `[-π, π]`).
    ///
    /// The angle is shifted by π into `[0°, 360°]` and folded onto `[0°, 180°)`
    /// since opposite gradients describe the same edge line.
    pub fn from_radians(theta: f32) -> Self {
        let degrees = (theta + PI).to_degrees().rem_euclid(180.0);
        match (((degrees + 22.5) / 45.0) as usize) % 4 {
            0 => EdgeDirection::Horizontal,
            1 => EdgeDirection::DiagonalDown,
            2 => EdgeDirection::Vertical,
            _ => EdgeDirection::DiagonalUp,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            EdgeDirection::Horizontal => "-",
            EdgeDirection::DiagonalDown => "\\",
            EdgeDirection::Vertical => "|",
            EdgeDirection::DiagonalUp => "/",
        }
    }
}

/// Which glyph a block resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphChoice {
    Space,
    /// Index into the configured glyph table.
    Ramp(usize),
    Edge(EdgeDirection),
}

impl GlyphChoice {
    pub fn glyph<'a>(&self, table: &'a GlyphTable) -> &'a str {
        match self {
            GlyphChoice::Space => SPACE_GLYPH,
            GlyphChoice::Ramp(index) => table.get(*index).unwrap_or(SPACE_GLYPH),
            GlyphChoice::Edge(direction) => direction.glyph(),
        }
    }
}

/// Glyph plus the colors to paint it with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub choice: GlyphChoice,
    pub foreground: Rgb,
    pub background: Rgb,
}

/// Per-frame glyph selector, built from the render config and glyph table.
#[derive(Debug, Clone, Copy)]
pub struct GlyphSelector {
    glyph_count: usize,
    brightness_boost: f32,
    detect_edges: bool,
    threshold_disabled: bool,
    color: bool,
    invert_color: bool,
    foreground: Rgb,
    background: Rgb,
}

impl GlyphSelector {
    pub fn new(config: &RenderConfig, table: &GlyphTable) -> Self {
        Self {
            glyph_count: table.len(),
            brightness_boost: config.brightness_boost(),
            detect_edges: config.detect_edges(),
            threshold_disabled: config.threshold_disabled(),
            color: config.color(),
            invert_color: config.invert_color(),
            foreground: config.foreground(),
            background: config.background(),
        }
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    /// Average block luma times the boost, clamped to `[0, 255]`.
    pub fn boosted_brightness(&self, stats: &BlockStats) -> f32 {
        (stats.average_brightness() * self.brightness_boost).clamp(0.0, 255.0)
    }

    /// Map a brightness in `[0, 255]` to a ramp glyph.
    pub fn brightness_glyph(&self, brightness: f32) -> GlyphChoice {
        if brightness <= 0.0 || self.glyph_count == 0 {
            return GlyphChoice::Space;
        }
        let index = (brightness * self.glyph_count as f32 / 256.0) as usize;
        GlyphChoice::Ramp(index.min(self.glyph_count - 1))
    }

    /// Edge glyph for the block, if edge detection is on and the edge is strong enough.
    pub fn edge_direction(&self, stats: &BlockStats) -> Option<EdgeDirection> {
        if !self.detect_edges {
            return None;
        }
        if stats.average_magnitude() < EDGE_THRESHOLD && !self.threshold_disabled {
            return None;
        }
        Some(EdgeDirection::from_radians(stats.average_direction()))
    }

    /// Foreground and background for the block.
    pub fn colors(&self, stats: &BlockStats) -> (Rgb, Rgb) {
        if !self.color {
            return (self.foreground, self.background);
        }
        let average = stats.average_color();
        let foreground = if self.invert_color {
            average.inverted()
        } else {
            average
        };
        (foreground, self.background)
    }

    /// Select the glyph and colors for one block.
    ///
    /// `brightness` overrides the boosted block brightness (used after
    /// dithering). Edge glyphs win over brightness glyphs.
    pub fn select(&self, stats: &BlockStats, brightness: Option<f32>) -> Selection {
        let choice = match self.edge_direction(stats) {
            Some(direction) => GlyphChoice::Edge(direction),
            None => {
                let brightness = brightness.unwrap_or_else(|| self.boosted_brightness(stats));
                self.brightness_glyph(brightness)
            }
        };
        let (foreground, background) = self.colors(stats);
        Selection {
            choice,
            foreground,
            background,
        }
    }
}
