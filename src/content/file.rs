use std::path::PathBuf;

use anyhow::Context as _;

use crate::backend::BufferView;
use crate::content::{PaintCtx, PaintOutcome, StartCtx};
use crate::foundation::error::{StrobeError, StrobeResult};

/// Raw frame playback from a file of back-to-back frames.
///
/// A frame is `stride * height * bytes_per_pixel` bytes of the source geometry. Playback wraps
/// around after the last frame.
#[derive(Debug)]
pub struct FileFrames {
    path: PathBuf,
    max_frames: Option<u64>,
    data: Vec<u8>,
    frame_size: usize,
    frame_count: u64,
    cursor: u64,
    src_pitch: usize,
    src_rows: usize,
}

impl FileFrames {
    /// Parse `path [max_frames]`.
    pub fn from_content(content: &str) -> Self {
        let mut parts = content.split_whitespace();
        let path = PathBuf::from(parts.next().unwrap_or_default());
        let max_frames = parts.next().and_then(|m| match m.parse::<u64>() {
            Ok(0) => None,
            Ok(n) => Some(n),
            Err(_) => {
                tracing::warn!(path = %path.display(), "ignoring invalid frame limit '{m}'");
                None
            }
        });
        Self {
            path,
            max_frames,
            data: Vec::new(),
            frame_size: 0,
            frame_count: 0,
            cursor: 0,
            src_pitch: 0,
            src_rows: 0,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Index of the frame the next paint shows.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn frame(&self, idx: u64) -> Option<&[u8]> {
        if idx >= self.frame_count {
            return None;
        }
        let start = idx as usize * self.frame_size;
        self.data.get(start..start + self.frame_size)
    }

    pub(crate) fn prepare(&mut self, ctx: StartCtx<'_>) -> StrobeResult<()> {
        if self.path.as_os_str().is_empty() {
            return Err(StrobeError::content("no frame file given"));
        }

        let spec = ctx.spec;
        let bpp = spec.format.bytes_per_pixel() as usize;
        let stride = spec.src.row_pixels().max(0) as usize;
        let rows = spec.src.height.max(0) as usize;
        let frame_size = stride * rows * bpp;
        if frame_size == 0 {
            return Err(StrobeError::content(format!(
                "source geometry {}x{} (stride {}) in {} gives empty frames",
                spec.src.width,
                spec.src.height,
                spec.src.stride,
                spec.format.name()
            )));
        }

        let data = std::fs::read(&self.path)
            .with_context(|| format!("read frame file '{}'", self.path.display()))?;
        if data.is_empty() || data.len() % frame_size != 0 {
            return Err(StrobeError::content(format!(
                "'{}' ({} bytes) does not hold a whole number of {frame_size}-byte frames",
                self.path.display(),
                data.len()
            )));
        }

        let available = (data.len() / frame_size) as u64;
        let frame_count = match self.max_frames {
            Some(max) if max < available => max,
            _ => available,
        };
        tracing::debug!(
            surface = %spec.display_name(),
            frames = frame_count,
            frame_size,
            "frame file loaded"
        );

        self.data = data;
        self.frame_size = frame_size;
        self.frame_count = frame_count;
        self.cursor = 0;
        self.src_pitch = stride * bpp;
        self.src_rows = rows;
        Ok(())
    }

    pub(crate) fn paint(&mut self, ctx: PaintCtx<'_>) -> StrobeResult<PaintOutcome> {
        if self.frame_count == 0 {
            return Err(StrobeError::content("frame file not loaded"));
        }
        let idx = self.cursor;
        let start = idx as usize * self.frame_size;
        let frame = self
            .data
            .get(start..start + self.frame_size)
            .ok_or_else(|| StrobeError::content(format!("frame {idx} out of range")))?;
        let (pitch, rows) = (self.src_pitch, self.src_rows);

        ctx.surface.draw(&mut |buf| {
            copy_frame(buf, frame, pitch, rows);
            Ok(())
        })?;

        self.cursor = (idx + 1) % self.frame_count;
        Ok(PaintOutcome::Painted)
    }
}

/// Copy one frame into a locked buffer, row by row when the layouts differ.
fn copy_frame(buf: &mut BufferView<'_>, frame: &[u8], src_pitch: usize, src_rows: usize) {
    if buf.row_pitch() == src_pitch && buf.height as usize == src_rows {
        let n = frame.len().min(buf.bits.len());
        buf.bits[..n].copy_from_slice(&frame[..n]);
        return;
    }

    let rows = src_rows.min(buf.height as usize);
    for (y, src) in frame.chunks_exact(src_pitch).take(rows).enumerate() {
        let dst = buf.row_mut(y as u32);
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/file.rs"]
mod tests;
