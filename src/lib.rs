//! Strobe drives many animated compositor surfaces at once to stress a display server.
//!
//! Each surface is described by a [`SurfaceSpec`] and animated by its own [`Worker`] thread:
//!
//! - duty cycles decide per iteration whether to repaint, move, resize, or show/hide
//! - a [`ContentStrategy`] (solid colours, raw file frames, or a renderer plugin) paints
//! - the [`WorkerManager`] runs all workers concurrently and keeps finished keep-alive
//!   surfaces on screen as ghosts
#![forbid(unsafe_code)]

pub mod backend;
pub mod content;
mod foundation;
pub mod manager;
pub mod plugin;
pub mod schedule;
pub mod spec;
pub mod worker;

pub use crate::foundation::core::{ChannelConfig, PixelFormat, Rect, SURFACE_HIDDEN, SurfaceId};
pub use crate::foundation::error::{StrobeError, StrobeResult};
pub use crate::foundation::rng::Rng64;

pub use crate::backend::headless::{HeadlessCompositor, HeadlessFaults, SurfaceSnapshot};
pub use crate::backend::{Compositor, RenderContext, Surface, SurfaceOp, Transaction};
pub use crate::content::{ContentStrategy, PaintOutcome};
pub use crate::manager::{RunReport, WorkerManager};
pub use crate::plugin::{PluginLoader, PluginRegistry, StaticLibrary};
pub use crate::schedule::UpdateSchedule;
pub use crate::schedule::duty::{DutyCycle, ScheduleState, VisibilitySignal, decide, visibility};
pub use crate::schedule::step::bounce_step;
pub use crate::spec::load_specs;
pub use crate::spec::model::{ContentType, SrcGeometry, SurfaceSpec, UpdateParams};
pub use crate::worker::cancel::CancelToken;
pub use crate::worker::{Worker, WorkerEnv, WorkerId, WorkerOutcome, WorkerReport, WorkerState};
