//! Subcommand handlers for render, presets and config actions.

use std::path::{Path, PathBuf};

use glyphcast::ascii::GlyphPreset;
use glyphcast::config::{default_path, ConfigError};
use glyphcast::font::Font8x8;
use glyphcast::ppm::{self, PpmError, PpmFileBackend};
use glyphcast::{Config, PresentError, RenderConfig, RenderContext, RenderError};

use super::args::{ConfigAction, RenderArgs};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Image(#[from] PpmError),

    #[error(transparent)]
    Present(#[from] PresentError<PpmError>),

    #[error("config file already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render one PPM image through the glyph pipeline and write the result.
pub fn render(args: &RenderArgs, config_path: Option<&Path>) -> Result<(), CliError> {
    let config = Config::load(config_path)?;
    let mut settings = config.render.clone();
    args.apply(&mut settings);
    let render_config = RenderConfig::new(settings)?;

    let frame = ppm::load_ppm(&args.input)?;
    log::info!(
        "Loaded {}x{} image from {}",
        frame.width(),
        frame.height(),
        args.input.display()
    );

    let mut ctx = RenderContext::with_font(
        render_config,
        frame.width(),
        frame.height(),
        Font8x8,
        config.output.command_capacity,
    )?;
    ctx.load_frame(&frame)?;

    let mut backend = PpmFileBackend::new(&args.output);
    ctx.present(&mut backend)?;

    if backend.frames_written() == 0 {
        log::warn!(
            "No frame drawn: command buffer holds {} slot(s), a frame needs 2",
            config.output.command_capacity
        );
    } else {
        let out = ctx.output()?;
        log::info!(
            "Rendered {}x{} blocks with {} glyphs",
            out.width() / ctx.config().block_size() as u32,
            out.height() / ctx.config().block_size() as u32,
            ctx.glyph_table().len()
        );
        println!("Wrote {}", backend.path().display());
    }

    ctx.teardown();
    Ok(())
}

/// Print the built-in glyph presets.
pub fn list_presets() {
    println!("Available presets:");
    for preset in GlyphPreset::ALL {
        println!(
            "  [{}] {:<7} {:>3} glyphs  \"{}\"",
            preset.index(),
            preset.name(),
            preset.glyphs().chars().count(),
            preset.glyphs()
        );
    }
    println!();
    println!("Use --preset <name> or set `preset` in the [render] config table.");
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            let config = Config::load(config_path)?;
            // Validate before printing so a broken file is reported.
            config.render_config()?;
            let rendered = toml::to_string_pretty(&config).map_err(ConfigError::SerializeError)?;

            println!("Current configuration:");
            println!();
            print!("{}", rendered);
            println!();

            let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_path);
            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found, using defaults)", path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_path);
            if path.exists() {
                return Err(CliError::ConfigExists(path));
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CliError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }

            let contents = format!("# glyphcast configuration\n\n{}", Config::default_toml()?);
            std::fs::write(&path, contents).map_err(|e| CliError::Write {
                path: path.clone(),
                source: e,
            })?;

            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use glyphcast::{PixelBuffer, Rgb};

    use crate::cli::{Args, Command};

    fn render_args(argv: &[&str]) -> RenderArgs {
        match Args::parse_from(argv).command {
            Command::Render(args) => args,
            other => panic!("Expected Render subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_config_init_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        handle_config_action(ConfigAction::Init, Some(&path)).unwrap();
        assert!(path.exists());

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, Config::default());
        handle_config_action(ConfigAction::Show, Some(&path)).unwrap();
    }

    #[test]
    fn test_config_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        let err = handle_config_action(ConfigAction::Init, Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::ConfigExists(_)));
    }

    #[test]
    fn test_render_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.ppm");
        let output = dir.path().join("out.ppm");
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "").unwrap();

        let mut image = PixelBuffer::new(20, 10).unwrap();
        image.fill(Rgb::new(200, 200, 200));
        ppm::save_ppm(&input, &image).unwrap();

        let argv = [
            "glyphcast",
            "render",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ];
        render(&render_args(&argv), Some(&config)).unwrap();

        let out = ppm::load_ppm(&output).unwrap();
        assert_eq!((out.width(), out.height()), (16, 8));
    }

    #[test]
    fn test_render_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "").unwrap();
        let missing = dir.path().join("missing.ppm");
        let argv = [
            "glyphcast",
            "render",
            missing.to_str().unwrap(),
            "-o",
            "out.ppm",
        ];
        let err = render(&render_args(&argv), Some(&config)).unwrap_err();
        assert!(matches!(err, CliError::Image(PpmError::Io { .. })));
    }
}
