//! CLI argument parsing with clap.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use glyphcast::ascii::{GlyphPreset, MAX_SIGMA};
use glyphcast::{RenderSettings, Rgb};

use super::enums::{Dither, Preset};

/// Parse and validate a Gaussian sigma (0 < sigma <= MAX_SIGMA)
fn parse_sigma(s: &str) -> Result<f32, String> {
    let sigma: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(format!("Sigma must be greater than 0, got {}", sigma));
    }
    if sigma > MAX_SIGMA {
        return Err(format!("Sigma must be at most {}, got {}", MAX_SIGMA, sigma));
    }
    Ok(sigma)
}

/// Parse and validate brightness boost (>= 0)
fn parse_boost(s: &str) -> Result<f32, String> {
    let boost: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !boost.is_finite() || boost < 0.0 {
        return Err(format!("Brightness boost must be 0 or more, got {}", boost));
    }
    Ok(boost)
}

/// Parse and validate block size (1-255)
fn parse_block_size(s: &str) -> Result<u8, String> {
    let size: u8 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid block size (1-255)", s))?;
    if size == 0 {
        return Err("Block size must be at least 1".to_string());
    }
    Ok(size)
}

/// Parse a color as `R,G,B` or `#RRGGBB`
fn parse_rgb(s: &str) -> Result<Rgb, String> {
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("Invalid hex color '{}'. Use #RRGGBB", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("Invalid hex color '{}'. Use #RRGGBB", s))
        };
        return Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?));
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!(
            "Invalid color format '{}'. Use R,G,B (e.g., 255,128,0) or #RRGGBB",
            s
        ));
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("Invalid color component '{}' (0-255)", part))?;
    }
    Ok(Rgb::new(channels[0], channels[1], channels[2]))
}

/// glyphcast: block glyph renderer
#[derive(Parser, Debug)]
#[command(name = "glyphcast")]
#[command(version, about = "Render images as block glyph art", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Render with the default sparse ramp
    glyphcast render photo.ppm -o ascii.ppm

    # Dense ramp, color, edges and dithering
    glyphcast render photo.ppm -o ascii.ppm --preset dense --color --edges --dither floyd-steinberg

    # Write a starter config file
    glyphcast config init")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a PPM image to a glyph-art PPM image
    Render(RenderArgs),
    /// List built-in glyph presets
    Presets,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Options for the render subcommand. Unset options fall back to the config file.
#[derive(ClapArgs, Debug, Clone)]
pub struct RenderArgs {
    /// Input image (binary PPM, P6)
    pub input: PathBuf,

    /// Output image path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Explicit glyph string, darkest first (overrides --preset)
    #[arg(long)]
    pub glyphs: Option<String>,

    /// Built-in glyph set
    #[arg(long, short)]
    pub preset: Option<Preset>,

    /// Block size in pixels
    #[arg(long, short, value_parser = parse_block_size)]
    pub block_size: Option<u8>,

    /// Color glyphs with the block's average color
    #[arg(long, overrides_with = "no_color")]
    pub color: bool,

    /// Use the flat foreground color even if the config enables color
    #[arg(long, overrides_with = "color")]
    pub no_color: bool,

    /// Invert glyph colors
    #[arg(long, overrides_with = "no_invert_color")]
    pub invert_color: bool,

    /// Keep glyph colors as sampled even if the config inverts them
    #[arg(long, overrides_with = "invert_color")]
    pub no_invert_color: bool,

    /// Draw edge glyphs along strong gradients
    #[arg(long, short, overrides_with = "no_edges")]
    pub edges: bool,

    /// Disable edge detection even if the config enables it
    #[arg(long, overrides_with = "edges")]
    pub no_edges: bool,

    /// Inner Gaussian sigma for edge detection
    #[arg(long, value_parser = parse_sigma)]
    pub sigma1: Option<f32>,

    /// Outer Gaussian sigma for edge detection
    #[arg(long, value_parser = parse_sigma)]
    pub sigma2: Option<f32>,

    /// Brightness multiplier applied before glyph lookup
    #[arg(long, value_parser = parse_boost)]
    pub boost: Option<f32>,

    /// Use edge glyphs for every block with nonzero gradient
    #[arg(long, overrides_with = "threshold")]
    pub no_threshold: bool,

    /// Require a strong gradient for edge glyphs even if the config disables the threshold
    #[arg(long, overrides_with = "no_threshold")]
    pub threshold: bool,

    /// Error diffusion across blocks
    #[arg(long)]
    pub dither: Option<Dither>,

    /// Background color (R,G,B or #RRGGBB)
    #[arg(long, value_parser = parse_rgb)]
    pub bg: Option<Rgb>,

    /// Foreground color when color mode is off (R,G,B or #RRGGBB)
    #[arg(long, value_parser = parse_rgb)]
    pub fg: Option<Rgb>,

    /// Skip glyph rendering and write the input unchanged
    #[arg(long, overrides_with = "ascii")]
    pub passthrough: bool,

    /// Render glyphs even if the config selects passthrough
    #[arg(long, overrides_with = "passthrough")]
    pub ascii: bool,
}

/// Resolve a `--flag` / `--no-flag` pair. `None` keeps the config value.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl RenderArgs {
    /// Layer command-line overrides on top of file settings.
    pub fn apply(&self, settings: &mut RenderSettings) {
        if let Some(glyphs) = &self.glyphs {
            settings.glyphs = Some(glyphs.clone());
        } else if let Some(preset) = self.preset {
            settings.glyphs = None;
            settings.preset = Some(GlyphPreset::from(preset).name().to_string());
        }
        if let Some(size) = self.block_size {
            settings.block_size = size;
        }
        if let Some(color) = flag_pair(self.color, self.no_color) {
            settings.color = color;
        }
        if let Some(invert) = flag_pair(self.invert_color, self.no_invert_color) {
            settings.invert_color = invert;
        }
        if let Some(edges) = flag_pair(self.edges, self.no_edges) {
            settings.detect_edges = edges;
        }
        if let Some(sigma) = self.sigma1 {
            settings.sigma1 = sigma;
        }
        if let Some(sigma) = self.sigma2 {
            settings.sigma2 = sigma;
        }
        if let Some(boost) = self.boost {
            settings.brightness_boost = boost;
        }
        if let Some(disabled) = flag_pair(self.no_threshold, self.threshold) {
            settings.threshold_disabled = disabled;
        }
        if let Some(dither) = self.dither {
            settings.dither = dither.into();
        }
        if self.bg.is_some() {
            settings.bg_color = self.bg;
        }
        if self.fg.is_some() {
            settings.fg_color = self.fg;
        }
        if let Some(passthrough) = flag_pair(self.passthrough, self.ascii) {
            settings.ascii_enabled = !passthrough;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphcast::DitherMode;

    fn render_args(extra: &[&str]) -> RenderArgs {
        let mut argv = vec!["glyphcast", "render", "in.ppm", "-o", "out.ppm"];
        argv.extend_from_slice(extra);
        match Args::parse_from(argv).command {
            Command::Render(args) => args,
            other => panic!("Expected Render subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_render_defaults() {
        let args = render_args(&[]);
        assert_eq!(args.input, PathBuf::from("in.ppm"));
        assert_eq!(args.output, PathBuf::from("out.ppm"));
        assert!(args.glyphs.is_none());
        assert!(args.preset.is_none());
        assert!(args.block_size.is_none());
        assert!(!args.color);
        assert!(!args.edges);
        assert!(!args.passthrough);
    }

    #[test]
    fn test_defaults_leave_settings_unchanged() {
        let mut settings = RenderSettings::default();
        render_args(&[]).apply(&mut settings);
        assert_eq!(settings, RenderSettings::default());
    }

    #[test]
    fn test_overrides_apply() {
        let args = render_args(&[
            "--preset",
            "dense",
            "-b",
            "4",
            "--color",
            "--edges",
            "--sigma1",
            "0.5",
            "--boost",
            "1.5",
            "--dither",
            "floyd-steinberg",
            "--bg",
            "#102030",
            "--fg",
            "1,2,3",
            "--no-threshold",
        ]);
        let mut settings = RenderSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.preset.as_deref(), Some("dense"));
        assert_eq!(settings.block_size, 4);
        assert!(settings.color);
        assert!(settings.detect_edges);
        assert_eq!(settings.sigma1, 0.5);
        assert_eq!(settings.sigma2, 2.0);
        assert_eq!(settings.brightness_boost, 1.5);
        assert_eq!(settings.dither, DitherMode::FloydSteinberg);
        assert_eq!(settings.bg_color, Some(Rgb::new(0x10, 0x20, 0x30)));
        assert_eq!(settings.fg_color, Some(Rgb::new(1, 2, 3)));
        assert!(settings.threshold_disabled);
    }

    #[test]
    fn test_glyphs_beat_preset() {
        let args = render_args(&["--glyphs", " .#", "--preset", "blocks"]);
        let mut settings = RenderSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.glyphs.as_deref(), Some(" .#"));
    }

    #[test]
    fn test_passthrough_disables_ascii() {
        let mut settings = RenderSettings::default();
        render_args(&["--passthrough"]).apply(&mut settings);
        assert!(!settings.ascii_enabled);
    }

    #[test]
    fn test_negative_flags_override_config() {
        let mut settings = RenderSettings {
            color: true,
            invert_color: true,
            detect_edges: true,
            threshold_disabled: true,
            ascii_enabled: false,
            ..Default::default()
        };
        render_args(&[
            "--no-color",
            "--no-invert-color",
            "--no-edges",
            "--threshold",
            "--ascii",
        ])
        .apply(&mut settings);
        assert!(!settings.color);
        assert!(!settings.invert_color);
        assert!(!settings.detect_edges);
        assert!(!settings.threshold_disabled);
        assert!(settings.ascii_enabled);
    }

    #[test]
    fn test_unset_flags_keep_config_values() {
        let enabled = RenderSettings {
            color: true,
            detect_edges: true,
            ascii_enabled: false,
            ..Default::default()
        };
        let mut settings = enabled.clone();
        render_args(&[]).apply(&mut settings);
        assert_eq!(settings, enabled);
    }

    #[test]
    fn test_last_flag_of_pair_wins() {
        let mut settings = RenderSettings::default();
        render_args(&["--color", "--no-color", "--no-edges", "--edges"]).apply(&mut settings);
        assert!(!settings.color);
        assert!(settings.detect_edges);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = ["glyphcast", "render", "in.ppm", "-o", "out.ppm"];
        for bad in [
            ["--block-size", "0"],
            ["--sigma1", "0"],
            ["--sigma2", "-1"],
            ["--sigma1", "1e30"],
            ["--sigma2", "33"],
            ["--boost", "-0.5"],
            ["--bg", "1,2"],
            ["--fg", "#12345"],
            ["--bg", "300,0,0"],
        ] {
            let argv: Vec<&str> = base.iter().chain(bad.iter()).copied().collect();
            assert!(Args::try_parse_from(argv).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_sigma_bounds() {
        assert_eq!(parse_sigma("32"), Ok(MAX_SIGMA));
        assert!(parse_sigma("1e30").is_err());
        assert!(parse_sigma("inf").is_err());
    }

    #[test]
    fn test_parse_rgb_forms() {
        assert_eq!(parse_rgb("255, 0, 10"), Ok(Rgb::new(255, 0, 10)));
        assert_eq!(parse_rgb("#ff0080"), Ok(Rgb::new(255, 0, 128)));
        assert!(parse_rgb("#zzzzzz").is_err());
    }

    #[test]
    fn test_global_options() {
        let args = Args::parse_from(["glyphcast", "-vv", "presets", "-c", "/tmp/g.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/g.toml")));
        assert!(matches!(args.command, Command::Presets));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["glyphcast", "config", "show"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
        let args = Args::parse_from(["glyphcast", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }
}
