//! Content strategies: how a worker fills its surface.
//!
//! Each strategy is prepared once while the worker is starting and then asked to paint whenever
//! the content schedule fires. Strategies keep their own frame cursor.

pub mod file;
pub mod plugin;
pub mod solid;

use crate::backend::Surface;
use crate::foundation::error::StrobeResult;
use crate::plugin::PluginLoader;
use crate::spec::model::{ContentType, SurfaceSpec};
use crate::worker::cancel::CancelToken;

pub use file::FileFrames;
pub use plugin::PluginContent;
pub use solid::SolidFill;

/// Inputs available while a strategy prepares.
pub struct StartCtx<'a> {
    pub spec: &'a SurfaceSpec,
    pub surface: &'a mut dyn Surface,
    pub plugins: &'a dyn PluginLoader,
}

/// Inputs available for one paint.
pub struct PaintCtx<'a> {
    pub spec: &'a SurfaceSpec,
    pub surface: &'a mut dyn Surface,
    /// Current surface size after this iteration's transaction.
    pub size: (u32, u32),
    pub cancel: &'a CancelToken,
}

/// Result of a successful paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    Painted,
    /// The content has finished; the worker should complete gracefully.
    Completed,
    /// Cancellation was observed inside the strategy; nothing was painted.
    Cancelled,
}

/// Per-surface painter, selected from [`SurfaceSpec::content_type`].
pub enum ContentStrategy {
    Solid(SolidFill),
    FileFrames(FileFrames),
    Plugin(PluginContent),
}

impl ContentStrategy {
    pub fn for_spec(spec: &SurfaceSpec) -> Self {
        match spec.content_type {
            ContentType::Solid => Self::Solid(SolidFill::from_content(&spec.content, &spec.name)),
            ContentType::File => Self::FileFrames(FileFrames::from_content(&spec.content)),
            ContentType::Plugin => Self::Plugin(PluginContent::from_content(&spec.content)),
        }
    }

    pub fn kind(&self) -> ContentType {
        match self {
            Self::Solid(_) => ContentType::Solid,
            Self::FileFrames(_) => ContentType::File,
            Self::Plugin(_) => ContentType::Plugin,
        }
    }

    pub fn prepare(&mut self, ctx: StartCtx<'_>) -> StrobeResult<()> {
        match self {
            Self::Solid(s) => s.prepare(ctx),
            Self::FileFrames(f) => f.prepare(ctx),
            Self::Plugin(p) => p.prepare(ctx),
        }
    }

    pub fn paint(&mut self, ctx: PaintCtx<'_>) -> StrobeResult<PaintOutcome> {
        match self {
            Self::Solid(s) => s.paint(ctx),
            Self::FileFrames(f) => f.paint(ctx),
            Self::Plugin(p) => p.paint(ctx),
        }
    }

    /// Index of the next frame the strategy will paint.
    pub fn frame_cursor(&self) -> u64 {
        match self {
            Self::Solid(s) => s.cursor() as u64,
            Self::FileFrames(f) => f.cursor(),
            Self::Plugin(p) => p.frames(),
        }
    }
}
