use std::time::Duration;

use crate::foundation::core::{PixelFormat, Rect, SURFACE_HIDDEN};
use crate::foundation::error::{StrobeError, StrobeResult};
use crate::schedule::duty::DutyCycle;

/// How a surface's pixels are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Rotating list of flat colours.
    #[default]
    Solid,
    /// Raw frames read from a file.
    File,
    /// Frames rendered by a loaded plugin.
    Plugin,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::File => "file",
            Self::Plugin => "plugin",
        }
    }
}

/// Geometry of the source content (file frames, buffer allocation fallback).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SrcGeometry {
    pub width: i32,
    pub height: i32,
    /// Row length in pixels; never smaller than `width`.
    pub stride: i32,
    /// Source crop; empty means uncropped.
    pub crop: Rect,
}

impl SrcGeometry {
    /// Effective row length in pixels; an unset stride means tightly packed rows.
    pub fn row_pixels(&self) -> i32 {
        self.stride.max(self.width)
    }
}

/// Per-surface animation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UpdateParams {
    /// Iteration budget. Negative runs until cancelled; zero performs no iterations.
    pub iterations: i64,
    /// Minimum spacing between iterations in microseconds.
    pub latency_us: u64,
    pub content_cycle: DutyCycle,
    pub show_cycle: DutyCycle,
    pub position_cycle: DutyCycle,
    pub size_cycle: DutyCycle,
    /// `left`/`top` are the position deltas; `width()`/`height()` are the size deltas.
    pub output_step: Rect,
    /// `left`/`top` bound the position walk; `width()`/`height()` bound the size walk.
    pub output_limit: Rect,
}

impl Default for UpdateParams {
    fn default() -> Self {
        Self {
            iterations: 0,
            latency_us: 0,
            content_cycle: DutyCycle::ALWAYS,
            show_cycle: DutyCycle::NEVER,
            position_cycle: DutyCycle::ALWAYS,
            size_cycle: DutyCycle::ALWAYS,
            output_step: Rect::default(),
            output_limit: Rect::default(),
        }
    }
}

impl UpdateParams {
    pub fn is_unbounded(&self) -> bool {
        self.iterations < 0
    }

    /// Minimum iteration spacing, `None` when unpaced.
    pub fn latency(&self) -> Option<Duration> {
        (self.latency_us > 0).then(|| Duration::from_micros(self.latency_us))
    }
}

/// Declarative description of one animated surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfaceSpec {
    pub name: String,
    pub format: PixelFormat,
    pub z_order: i32,
    pub transform: i32,
    pub src: SrcGeometry,
    /// Initial output rectangle on screen.
    pub output: Rect,
    pub content_type: ContentType,
    /// Strategy payload: colour list, `path [max_frames]`, or `library [args...]`.
    pub content: String,
    pub update: UpdateParams,
    /// Retain the surface as a ghost after the worker finishes.
    pub keep_alive: bool,
    /// Paint through a render context instead of locking the buffer.
    pub gl: bool,
    /// Raw surface creation flags.
    pub flags: u32,
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            format: PixelFormat::Rgba8888,
            z_order: 0,
            transform: 0,
            src: SrcGeometry::default(),
            output: Rect::default(),
            content_type: ContentType::Solid,
            content: String::new(),
            update: UpdateParams::default(),
            keep_alive: false,
            gl: false,
            flags: 0,
        }
    }
}

impl SurfaceSpec {
    /// Allocation size: the output rectangle's extent per axis, else the source geometry's.
    pub fn initial_size(&self) -> (i32, i32) {
        let w = if self.output.width() > 0 {
            self.output.width()
        } else {
            self.src.width
        };
        let h = if self.output.height() > 0 {
            self.output.height()
        } else {
            self.src.height
        };
        (w, h)
    }

    pub fn starts_hidden(&self) -> bool {
        self.flags & SURFACE_HIDDEN != 0
    }

    /// Name used in logs; falls back to a placeholder for anonymous surfaces.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "<unnamed>"
        } else {
            &self.name
        }
    }

    /// Checks that must hold before a surface can be acquired.
    pub fn validate(&self) -> StrobeResult<()> {
        let (w, h) = self.initial_size();
        if w <= 0 || h <= 0 {
            return Err(StrobeError::validation(format!(
                "surface '{}' has invalid geometry {w}x{h}",
                self.display_name()
            )));
        }
        Ok(())
    }
}

/// JSON document form: `{"surfaces": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpecDocument {
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
}
