use crate::backend::{ContextRequest, RenderContext};
use crate::content::{PaintCtx, PaintOutcome, StartCtx};
use crate::foundation::error::{StrobeError, StrobeResult};
use crate::foundation::rng::Rng64;

/// One entry of a solid colour list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolidColor {
    Value(u32),
    /// A fresh pseudo-random value each time the entry comes up.
    Random,
}

/// Parse a whitespace-separated list of hex colours and `random` keywords.
///
/// Malformed entries are skipped with a warning. An empty result falls back to `[Random]`.
pub fn parse_colors(content: &str, surface: &str) -> Vec<SolidColor> {
    let mut colors: Vec<SolidColor> = content
        .split_whitespace()
        .filter_map(|tok| {
            if tok.eq_ignore_ascii_case("random") {
                return Some(SolidColor::Random);
            }
            let hex = tok
                .strip_prefix("0x")
                .or_else(|| tok.strip_prefix("0X"))
                .unwrap_or(tok);
            match u32::from_str_radix(hex, 16) {
                Ok(v) => Some(SolidColor::Value(v)),
                Err(_) => {
                    tracing::warn!(surface, "ignoring invalid colour '{tok}'");
                    None
                }
            }
        })
        .collect();

    if colors.is_empty() {
        tracing::warn!(surface, "no colours given, using random");
        colors.push(SolidColor::Random);
    }
    colors
}

/// Split `value` into the leading `bpp` bytes of a pixel, most significant byte first.
///
/// The value is right-aligned to the pixel size: `0xf800` at two bytes per pixel is `[f8, 00]`.
pub fn color_bytes(value: u32, bpp: u32) -> [u8; 4] {
    let shift = (4 - bpp.clamp(1, 4)) * 8;
    ((u64::from(value) << shift) as u32).to_be_bytes()
}

/// Rotating flat-colour fill.
pub struct SolidFill {
    colors: Vec<SolidColor>,
    cursor: usize,
    bpp: u32,
    rng: Rng64,
    context: Option<Box<dyn RenderContext>>,
}

impl SolidFill {
    pub fn from_content(content: &str, surface: &str) -> Self {
        Self {
            colors: parse_colors(content, surface),
            cursor: 0,
            bpp: 0,
            rng: Rng64::for_name(surface),
            context: None,
        }
    }

    pub fn colors(&self) -> &[SolidColor] {
        &self.colors
    }

    /// Index of the colour used by the next paint.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn prepare(&mut self, ctx: StartCtx<'_>) -> StrobeResult<()> {
        let bpp = ctx.spec.format.bytes_per_pixel();
        if !(1..=4).contains(&bpp) {
            return Err(StrobeError::content(format!(
                "solid fill cannot handle {} ({bpp} bytes per pixel)",
                ctx.spec.format.name()
            )));
        }
        self.bpp = bpp;

        if ctx.spec.gl {
            let config = ctx.spec.format.channel_config().ok_or_else(|| {
                StrobeError::content(format!(
                    "no render context configuration for {}",
                    ctx.spec.format.name()
                ))
            })?;
            self.context = Some(ctx.surface.create_context(&ContextRequest {
                config,
                client_version: 2,
            })?);
        }
        Ok(())
    }

    fn next_value(&mut self) -> u32 {
        let entry = self.colors[self.cursor];
        self.cursor = (self.cursor + 1) % self.colors.len();
        match entry {
            SolidColor::Value(v) => v,
            SolidColor::Random => self.rng.next_u32(),
        }
    }

    pub(crate) fn paint(&mut self, ctx: PaintCtx<'_>) -> StrobeResult<PaintOutcome> {
        let bytes = color_bytes(self.next_value(), self.bpp);
        let bpp = self.bpp as usize;

        if let Some(gl) = self.context.as_mut() {
            gl.clear(bytes.map(|b| f32::from(b) / 255.0))?;
            gl.present()?;
            return Ok(PaintOutcome::Painted);
        }

        ctx.surface.draw(&mut |buf| {
            if buf.bytes_per_pixel as usize != bpp {
                return Err(StrobeError::content(format!(
                    "locked buffer has {} bytes per pixel, expected {bpp}",
                    buf.bytes_per_pixel
                )));
            }
            for y in 0..buf.height {
                for px in buf.row_mut(y).chunks_exact_mut(bpp) {
                    px.copy_from_slice(&bytes[..bpp]);
                }
            }
            Ok(())
        })?;
        Ok(PaintOutcome::Painted)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/solid.rs"]
mod tests;
