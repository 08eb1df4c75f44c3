//! Render configuration and config file handling for glyphcast.
//!
//! [`RenderSettings`] is the raw, serde-friendly form (as found in
//! `~/.config/glyphcast/config.toml` or built by the CLI). [`RenderConfig`]
//! is the validated form the pipeline consumes; it can only be obtained
//! through [`RenderConfig::new`], so every numeric field has been checked.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ascii::{GlyphPreset, MAX_SIGMA, SPARSE_GLYPHS};
use crate::command::DEFAULT_COMMAND_CAPACITY;
use crate::error::RenderError;
use crate::pixel::Rgb;

/// Error diffusion applied before glyph quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMode {
    #[default]
    None,
    FloydSteinberg,
}

/// Unvalidated render options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Explicit glyph string, darkest first. Takes precedence over `preset`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyphs: Option<String>,
    /// Preset name ("sparse", "blocks", "dense") or index ("0".."2").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub color: bool,
    pub invert_color: bool,
    pub block_size: u8,
    pub detect_edges: bool,
    pub sigma1: f32,
    pub sigma2: f32,
    pub brightness_boost: f32,
    pub threshold_disabled: bool,
    pub dither: DitherMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg_color: Option<Rgb>,
    pub ascii_enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            glyphs: None,
            preset: None,
            color: false,
            invert_color: false,
            block_size: 8,
            detect_edges: false,
            sigma1: 1.0,
            sigma2: 2.0,
            brightness_boost: 1.0,
            threshold_disabled: false,
            dither: DitherMode::None,
            bg_color: None,
            fg_color: None,
            ascii_enabled: true,
        }
    }
}

impl RenderSettings {
    /// Resolve the glyph string: explicit glyphs, then preset, then the sparse ramp.
    pub fn resolved_glyphs(&self) -> Result<String, RenderError> {
        if let Some(glyphs) = &self.glyphs {
            return Ok(glyphs.clone());
        }
        match &self.preset {
            Some(name) => {
                let preset = name
                    .parse::<usize>()
                    .ok()
                    .and_then(GlyphPreset::from_index)
                    .or_else(|| GlyphPreset::from_name(name))
                    .ok_or_else(|| {
                        RenderError::InvalidConfig(format!("unknown glyph preset '{}'", name))
                    })?;
                Ok(preset.glyphs().to_string())
            }
            None => Ok(SPARSE_GLYPHS.to_string()),
        }
    }
}

/// Validated, immutable-per-frame render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    glyphs: String,
    color: bool,
    invert_color: bool,
    block_size: u8,
    detect_edges: bool,
    sigma1: f32,
    sigma2: f32,
    brightness_boost: f32,
    threshold_disabled: bool,
    dither: DitherMode,
    bg_color: Option<Rgb>,
    fg_color: Option<Rgb>,
    ascii_enabled: bool,
}

impl RenderConfig {
    pub fn new(settings: RenderSettings) -> Result<Self, RenderError> {
        let glyphs = settings.resolved_glyphs()?;
        if glyphs.is_empty() {
            return Err(RenderError::InvalidConfig(
                "glyph string must not be empty".to_string(),
            ));
        }
        if settings.block_size == 0 {
            return Err(RenderError::InvalidConfig(
                "block size must be at least 1".to_string(),
            ));
        }
        for (name, sigma) in [("sigma1", settings.sigma1), ("sigma2", settings.sigma2)] {
            if !sigma.is_finite() || sigma <= 0.0 || sigma > MAX_SIGMA {
                return Err(RenderError::InvalidConfig(format!(
                    "{} must be in (0, {}], got {}",
                    name, MAX_SIGMA, sigma
                )));
            }
        }
        if !settings.brightness_boost.is_finite() || settings.brightness_boost < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "brightness boost must be >= 0, got {}",
                settings.brightness_boost
            )));
        }

        Ok(Self::from_checked(glyphs, settings))
    }

    fn from_checked(glyphs: String, settings: RenderSettings) -> Self {
        Self {
            glyphs,
            color: settings.color,
            invert_color: settings.invert_color,
            block_size: settings.block_size,
            detect_edges: settings.detect_edges,
            sigma1: settings.sigma1,
            sigma2: settings.sigma2,
            brightness_boost: settings.brightness_boost,
            threshold_disabled: settings.threshold_disabled,
            dither: settings.dither,
            bg_color: settings.bg_color,
            fg_color: settings.fg_color,
            ascii_enabled: settings.ascii_enabled,
        }
    }

    /// Back to the editable form, e.g. to derive a modified config.
    pub fn to_settings(&self) -> RenderSettings {
        RenderSettings {
            glyphs: Some(self.glyphs.clone()),
            preset: None,
            color: self.color,
            invert_color: self.invert_color,
            block_size: self.block_size,
            detect_edges: self.detect_edges,
            sigma1: self.sigma1,
            sigma2: self.sigma2,
            brightness_boost: self.brightness_boost,
            threshold_disabled: self.threshold_disabled,
            dither: self.dither,
            bg_color: self.bg_color,
            fg_color: self.fg_color,
            ascii_enabled: self.ascii_enabled,
        }
    }

    pub fn glyphs(&self) -> &str {
        &self.glyphs
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn invert_color(&self) -> bool {
        self.invert_color
    }

    pub fn block_size(&self) -> u8 {
        self.block_size
    }

    pub fn detect_edges(&self) -> bool {
        self.detect_edges
    }

    pub fn sigma1(&self) -> f32 {
        self.sigma1
    }

    pub fn sigma2(&self) -> f32 {
        self.sigma2
    }

    pub fn brightness_boost(&self) -> f32 {
        self.brightness_boost
    }

    pub fn threshold_disabled(&self) -> bool {
        self.threshold_disabled
    }

    pub fn dither(&self) -> DitherMode {
        self.dither
    }

    pub fn bg_color(&self) -> Option<Rgb> {
        self.bg_color
    }

    pub fn fg_color(&self) -> Option<Rgb> {
        self.fg_color
    }

    /// Background color with the black default applied.
    pub fn background(&self) -> Rgb {
        self.bg_color.unwrap_or(Rgb::BLACK)
    }

    /// Foreground color with the white default applied.
    pub fn foreground(&self) -> Rgb {
        self.fg_color.unwrap_or(Rgb::WHITE)
    }

    pub fn ascii_enabled(&self) -> bool {
        self.ascii_enabled
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_checked(SPARSE_GLYPHS.to_string(), RenderSettings::default())
    }
}

impl TryFrom<RenderSettings> for RenderConfig {
    type Error = RenderError;

    fn try_from(settings: RenderSettings) -> Result<Self, Self::Error> {
        RenderConfig::new(settings)
    }
}

/// Configuration file structure for glyphcast.
/// Loaded from ~/.config/glyphcast/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Command slots per frame buffer.
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

fn default_command_capacity() -> usize {
    DEFAULT_COMMAND_CAPACITY
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// With no explicit path, the default location is used and a missing file
    /// yields the default config. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::read(path)
            }
            None => {
                let path = default_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Starter config file contents.
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Config::default()).map_err(ConfigError::SerializeError)
    }

    /// Validated render config from the `[render]` table.
    pub fn render_config(&self) -> Result<RenderConfig, ConfigError> {
        RenderConfig::new(self.render.clone()).map_err(ConfigError::Invalid)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError(toml::ser::Error),
    Invalid(RenderError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "Config file '{}' not found", path.display())
            }
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound(_) => None,
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
            ConfigError::Invalid(source) => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("glyphcast").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/glyphcast/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenderConfig::new(RenderSettings::default()).unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.glyphs(), SPARSE_GLYPHS);
        assert_eq!(config.block_size(), 8);
        assert!(config.ascii_enabled());
    }

    #[test]
    fn test_rejects_zero_block_size() {
        let settings = RenderSettings {
            block_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            RenderConfig::new(settings),
            Err(RenderError::InvalidConfig(msg)) if msg.contains("block size")
        ));
    }

    #[test]
    fn test_rejects_bad_sigma() {
        for sigma in [0.0, -1.0, f32::NAN] {
            let settings = RenderSettings {
                sigma2: sigma,
                ..Default::default()
            };
            assert!(RenderConfig::new(settings).is_err(), "sigma {}", sigma);
        }
    }

    #[test]
    fn test_rejects_oversized_sigma() {
        let settings = RenderSettings {
            sigma1: 1e30,
            detect_edges: true,
            ..Default::default()
        };
        assert!(matches!(
            RenderConfig::new(settings),
            Err(RenderError::InvalidConfig(msg)) if msg.contains("sigma1")
        ));

        let at_cap = RenderSettings {
            sigma2: MAX_SIGMA,
            ..Default::default()
        };
        assert_eq!(RenderConfig::new(at_cap).unwrap().sigma2(), MAX_SIGMA);
    }

    #[test]
    fn test_rejects_negative_boost() {
        let settings = RenderSettings {
            brightness_boost: -0.5,
            ..Default::default()
        };
        assert!(RenderConfig::new(settings).is_err());
    }

    #[test]
    fn test_rejects_empty_glyphs() {
        let settings = RenderSettings {
            glyphs: Some(String::new()),
            ..Default::default()
        };
        assert!(RenderConfig::new(settings).is_err());
    }

    #[test]
    fn test_preset_by_name_and_index() {
        let by_name = RenderSettings {
            preset: Some("blocks".to_string()),
            ..Default::default()
        };
        let by_index = RenderSettings {
            preset: Some("2".to_string()),
            ..Default::default()
        };
        assert_eq!(by_name.resolved_glyphs().unwrap(), GlyphPreset::Blocks.glyphs());
        assert_eq!(by_index.resolved_glyphs().unwrap(), GlyphPreset::Dense.glyphs());
    }

    #[test]
    fn test_explicit_glyphs_win_over_preset() {
        let settings = RenderSettings {
            glyphs: Some(" #".to_string()),
            preset: Some("dense".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolved_glyphs().unwrap(), " #");
    }

    #[test]
    fn test_unknown_preset() {
        let settings = RenderSettings {
            preset: Some("braille".to_string()),
            ..Default::default()
        };
        assert!(RenderConfig::new(settings).is_err());
    }

    #[test]
    fn test_color_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.background(), Rgb::BLACK);
        assert_eq!(config.foreground(), Rgb::WHITE);
    }

    #[test]
    fn test_settings_roundtrip_through_config() {
        let settings = RenderSettings {
            color: true,
            dither: DitherMode::FloydSteinberg,
            bg_color: Some(Rgb::new(1, 2, 3)),
            ..Default::default()
        };
        let config = RenderConfig::new(settings).unwrap();
        let again = RenderConfig::new(config.to_settings()).unwrap();
        assert_eq!(config, again);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[render]
preset = "dense"
block_size = 4
dither = "floyd-steinberg"
bg_color = {{ r = 10, g = 20, b = 30 }}

[output]
command_capacity = 8
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.output.command_capacity, 8);
        let render = config.render_config().unwrap();
        assert_eq!(render.block_size(), 4);
        assert_eq!(render.dither(), DitherMode::FloydSteinberg);
        assert_eq!(render.background(), Rgb::new(10, 20, 30));
        assert_eq!(render.glyphs(), GlyphPreset::Dense.glyphs());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nblock_size = \"big\"").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_toml_parses_back() {
        let text = Config::default_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
