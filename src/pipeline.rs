//! Per-frame render pipeline.
//!
//! [`RenderContext`] owns every buffer the pipeline touches: the input and
//! output surfaces, edge-detection scratch, dither rows and the command
//! buffer. All of them are allocated at construction and reused, so a
//! steady stream of same-sized frames runs without allocating.
//!
//! One frame is: write pixels into [`RenderContext::input_mut`] (or
//! [`RenderContext::load_frame`]), then [`RenderContext::present`], which
//! renders, encodes `reset -> upload -> draw -> finalize`, and hands the
//! command buffer to the display backend in a single call.

use crate::ascii::{
    BlockAnalyzer, BlockGrid, Ditherer, EdgeDetector, EdgeDirection, GlyphChoice, GlyphPreset,
    GlyphSelector, GlyphTable,
};
use crate::command::{
    CommandBuffer, DisplayBackend, SurfaceHandle, Surfaces, DEFAULT_COMMAND_CAPACITY,
};
use crate::config::{DitherMode, RenderConfig};
use crate::error::RenderError;
use crate::font::{Font8x8, GlyphBitmap, GlyphBitmapSource};
use crate::pixel::PixelBuffer;
use crate::raster::GlyphRasterizer;

/// Errors from [`RenderContext::present`].
#[derive(Debug, thiserror::Error)]
pub enum PresentError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("display backend failed: {0}")]
    Backend(#[source] E),
}

/// Bitmaps for every glyph the selector can produce, resolved once per glyph set.
#[derive(Debug, Clone)]
struct GlyphAtlas {
    ramp: Vec<GlyphBitmap>,
    edges: [GlyphBitmap; 4],
    space: GlyphBitmap,
}

impl GlyphAtlas {
    fn build<F: GlyphBitmapSource>(
        table: &GlyphTable,
        font: &F,
        detect_edges: bool,
    ) -> Result<Self, RenderError> {
        let ramp = table
            .iter()
            .map(|glyph| font.resolve(glyph))
            .collect::<Result<Vec<_>, _>>()?;

        let mut edges = [[0u8; 8]; 4];
        if detect_edges {
            for direction in [
                EdgeDirection::Horizontal,
                EdgeDirection::DiagonalDown,
                EdgeDirection::Vertical,
                EdgeDirection::DiagonalUp,
            ] {
                edges[edge_slot(direction)] = font.resolve(direction.glyph())?;
            }
        }

        Ok(Self {
            ramp,
            edges,
            space: font.bitmap(" ").unwrap_or([0; 8]),
        })
    }

    fn bitmap(&self, choice: GlyphChoice) -> &GlyphBitmap {
        match choice {
            GlyphChoice::Space => &self.space,
            GlyphChoice::Ramp(index) => self.ramp.get(index).unwrap_or(&self.space),
            GlyphChoice::Edge(direction) => &self.edges[edge_slot(direction)],
        }
    }
}

fn edge_slot(direction: EdgeDirection) -> usize {
    match direction {
        EdgeDirection::Horizontal => 0,
        EdgeDirection::DiagonalDown => 1,
        EdgeDirection::Vertical => 2,
        EdgeDirection::DiagonalUp => 3,
    }
}

/// Owns the render state for one display.
#[derive(Debug)]
pub struct RenderContext<F: GlyphBitmapSource = Font8x8> {
    config: RenderConfig,
    table: GlyphTable,
    atlas: GlyphAtlas,
    font: F,
    surfaces: Surfaces,
    input: SurfaceHandle,
    output: SurfaceHandle,
    edges: EdgeDetector,
    ditherer: Ditherer,
    rasterizer: GlyphRasterizer,
    commands: CommandBuffer,
    frames: u64,
}

impl RenderContext<Font8x8> {
    /// Context using the built-in font and a two-slot command buffer.
    pub fn new(config: RenderConfig, width: u32, height: u32) -> Result<Self, RenderError> {
        Self::with_font(config, width, height, Font8x8, DEFAULT_COMMAND_CAPACITY)
    }
}

impl<F: GlyphBitmapSource> RenderContext<F> {
    pub fn with_font(
        config: RenderConfig,
        width: u32,
        height: u32,
        font: F,
        command_capacity: usize,
    ) -> Result<Self, RenderError> {
        let table = GlyphTable::new(config.glyphs())?;
        let atlas = GlyphAtlas::build(&table, &font, config.detect_edges())?;

        let grid = BlockGrid::new(width, height, config.block_size());
        let mut surfaces = Surfaces::new();
        let input = surfaces.register(PixelBuffer::new(width, height)?);
        let output = surfaces.register(PixelBuffer::new(grid.out_width, grid.out_height)?);

        log::debug!(
            "Render context {}x{} -> {}x{} (block {}, {} glyphs, {} command slots)",
            width,
            height,
            grid.out_width,
            grid.out_height,
            config.block_size(),
            table.len(),
            command_capacity
        );

        Ok(Self {
            config,
            table,
            atlas,
            font,
            surfaces,
            input,
            output,
            edges: EdgeDetector::new(),
            ditherer: Ditherer::new(),
            rasterizer: GlyphRasterizer::new(),
            commands: CommandBuffer::new(command_capacity),
            frames: 0,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn glyph_table(&self) -> &GlyphTable {
        &self.table
    }

    /// Replace the render config, rebuilding glyph metadata first.
    ///
    /// On error the previous config and glyph table stay in effect.
    pub fn set_config(&mut self, config: RenderConfig) -> Result<(), RenderError> {
        let table = GlyphTable::new(config.glyphs())?;
        let atlas = GlyphAtlas::build(&table, &self.font, config.detect_edges())?;
        self.table = table;
        self.atlas = atlas;
        self.config = config;
        Ok(())
    }

    /// Switch to a new glyph string.
    pub fn set_glyphs(&mut self, glyphs: &str) -> Result<(), RenderError> {
        let mut settings = self.config.to_settings();
        settings.glyphs = Some(glyphs.to_string());
        let config = RenderConfig::new(settings)?;
        self.set_config(config)?;
        log::debug!("Switched glyph set ({} glyphs)", self.table.len());
        Ok(())
    }

    pub fn set_preset(&mut self, preset: GlyphPreset) -> Result<(), RenderError> {
        self.set_glyphs(preset.glyphs())
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    pub fn input_handle(&self) -> SurfaceHandle {
        self.input
    }

    pub fn output_handle(&self) -> SurfaceHandle {
        self.output
    }

    fn surface(&self, handle: SurfaceHandle) -> Result<&PixelBuffer, RenderError> {
        self.surfaces
            .get(handle)
            .ok_or(RenderError::UnknownSurface(handle.0))
    }

    pub fn input(&self) -> Result<&PixelBuffer, RenderError> {
        self.surface(self.input)
    }

    /// The input surface, for hosts that write frames in place.
    pub fn input_mut(&mut self) -> Result<&mut PixelBuffer, RenderError> {
        let handle = self.input;
        self.surfaces
            .get_mut(handle)
            .ok_or(RenderError::UnknownSurface(handle.0))
    }

    pub fn output(&self) -> Result<&PixelBuffer, RenderError> {
        self.surface(self.output)
    }

    /// Copy `frame` into the input surface, reusing its allocation.
    pub fn load_frame(&mut self, frame: &PixelBuffer) -> Result<(), RenderError> {
        frame.validate()?;
        self.input_mut()?.copy_from(frame)
    }

    /// Run the glyph pipeline on the input surface.
    ///
    /// Returns the surface to upload: the output surface, or the input
    /// surface untouched when ascii rendering is disabled. The input is
    /// validated before anything is written.
    pub fn render(&mut self) -> Result<SurfaceHandle, RenderError> {
        let (source, target) = self
            .surfaces
            .pair_mut(self.input, self.output)
            .ok_or(RenderError::UnknownSurface(self.output.0))?;
        source.validate()?;

        if !self.config.ascii_enabled() {
            return Ok(self.input);
        }

        let config = &self.config;
        let grid = BlockGrid::new(source.width(), source.height(), config.block_size());
        target.reshape(grid.out_width, grid.out_height)?;

        let edges = self.edges.run(source, config);
        let analyzer = BlockAnalyzer::new(config.color());
        let selector = GlyphSelector::new(config, &self.table);
        let dither = config.dither() == DitherMode::FloydSteinberg;
        if dither {
            self.ditherer.begin_frame(grid.columns as usize);
        }

        let background = config.background();
        for row in 0..grid.rows {
            for col in 0..grid.columns {
                let tile = grid.tile(col, row);
                let Some(stats) = analyzer.analyze(source, edges, tile) else {
                    self.rasterizer
                        .draw(target, tile, &self.atlas.space, background, background);
                    continue;
                };

                let brightness = dither.then(|| {
                    self.ditherer.quantize(
                        col as usize,
                        selector.boosted_brightness(&stats),
                        selector.glyph_count(),
                    )
                });
                let selection = selector.select(&stats, brightness);
                self.rasterizer.draw(
                    target,
                    tile,
                    self.atlas.bitmap(selection.choice),
                    selection.foreground,
                    selection.background,
                );
            }
            if dither {
                self.ditherer.end_row();
            }
        }

        self.frames += 1;
        log::trace!(
            "Rendered frame {} ({}x{} blocks)",
            self.frames,
            grid.columns,
            grid.rows
        );
        Ok(self.output)
    }

    /// Encode one frame's commands for `surface`.
    pub fn encode(&mut self, surface: SurfaceHandle) -> &[u32] {
        encode_frame(&mut self.commands, surface)
    }

    /// Render, encode and submit one frame in a single backend call.
    pub fn present<B: DisplayBackend>(
        &mut self,
        backend: &mut B,
    ) -> Result<(), PresentError<B::Error>> {
        let surface = self.render()?;
        let words = encode_frame(&mut self.commands, surface);
        backend
            .submit(words, &self.surfaces)
            .map_err(PresentError::Backend)
    }

    /// Load `frame`, render it, and return the surface that would be uploaded.
    pub fn render_frame(&mut self, frame: &PixelBuffer) -> Result<&PixelBuffer, RenderError> {
        self.load_frame(frame)?;
        let handle = self.render()?;
        self.surface(handle)
    }

    /// Command buffer as of the last encode.
    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Release every buffer owned by the context.
    pub fn teardown(self) {
        log::debug!("Tearing down render context after {} frames", self.frames);
    }
}

fn encode_frame(commands: &mut CommandBuffer, surface: SurfaceHandle) -> &[u32] {
    commands.reset();
    commands.add_upload_command(surface);
    commands.add_draw_command();
    commands.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSettings;
    use crate::pixel::Rgb;

    fn context(settings: RenderSettings, width: u32, height: u32) -> RenderContext {
        RenderContext::new(RenderConfig::new(settings).unwrap(), width, height).unwrap()
    }

    fn solid(width: u32, height: u32, color: Rgb) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height).unwrap();
        buf.fill(color);
        buf
    }

    #[test]
    fn test_output_size_follows_block_truncation() {
        let mut ctx = context(RenderSettings::default(), 20, 12);
        let out = ctx.render_frame(&solid(20, 12, Rgb::WHITE)).unwrap();
        assert_eq!((out.width(), out.height()), (16, 8));
        assert_eq!(out.data().len(), 16 * 8 * 3);
    }

    #[test]
    fn test_output_follows_input_size_changes() {
        let mut ctx = context(RenderSettings::default(), 8, 8);
        ctx.render_frame(&solid(8, 8, Rgb::WHITE)).unwrap();
        let out = ctx.render_frame(&solid(24, 16, Rgb::WHITE)).unwrap();
        assert_eq!((out.width(), out.height()), (24, 16));
        let out = ctx.render_frame(&solid(8, 8, Rgb::BLACK)).unwrap();
        assert_eq!(out.data().len(), 8 * 8 * 3);
    }

    #[test]
    fn test_passthrough_uploads_input() {
        let mut ctx = context(
            RenderSettings {
                ascii_enabled: false,
                ..Default::default()
            },
            4,
            4,
        );
        ctx.load_frame(&solid(4, 4, Rgb::new(9, 9, 9))).unwrap();
        let handle = ctx.render().unwrap();
        assert_eq!(handle, ctx.input_handle());
        let words = ctx.encode(handle).to_vec();
        assert_eq!(words[0], 2);
        assert_eq!(words[2], ctx.input_handle().0);
    }

    #[test]
    fn test_set_glyphs_rejects_unknown_and_keeps_old_table() {
        let mut ctx = context(RenderSettings::default(), 8, 8);
        let err = ctx.set_glyphs(" ☃").unwrap_err();
        assert_eq!(err, RenderError::UnknownGlyph("☃".to_string()));
        assert_eq!(ctx.glyph_table().len(), 10);
    }

    #[test]
    fn test_set_preset_switches_table() {
        let mut ctx = context(RenderSettings::default(), 8, 8);
        ctx.set_preset(GlyphPreset::Dense).unwrap();
        assert_eq!(ctx.glyph_table().len(), 70);
        assert_eq!(ctx.config().glyphs(), GlyphPreset::Dense.glyphs());
    }

    #[test]
    fn test_frame_counter() {
        let mut ctx = context(RenderSettings::default(), 8, 8);
        ctx.render().unwrap();
        ctx.render().unwrap();
        assert_eq!(ctx.frames_rendered(), 2);
        ctx.teardown();
    }
}
