//! Compositor boundary.
//!
//! Workers talk to the display server through three traits: a [`Compositor`] that hands out
//! surfaces, the [`Surface`] itself (batched geometry transactions and locked-buffer painting),
//! and an optional hardware [`RenderContext`] bound to a surface. [`headless`] provides an
//! in-memory implementation.

pub mod headless;

use smallvec::SmallVec;

use crate::foundation::core::{ChannelConfig, PixelFormat, Rect, SurfaceId};
use crate::foundation::error::StrobeResult;
use crate::spec::model::SurfaceSpec;

/// Parameters for acquiring a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub flags: u32,
    pub transform: i32,
    pub crop: Option<Rect>,
}

impl SurfaceRequest {
    pub fn from_spec(spec: &SurfaceSpec) -> Self {
        let (w, h) = spec.initial_size();
        Self {
            name: spec.name.clone(),
            width: w.max(0) as u32,
            height: h.max(0) as u32,
            format: spec.format,
            flags: spec.flags,
            transform: spec.transform,
            crop: (!spec.src.crop.is_empty()).then_some(spec.src.crop),
        }
    }
}

/// One change inside a [`Transaction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceOp {
    SetLayer(i32),
    SetPosition { left: i32, top: i32 },
    SetSize { width: i32, height: i32 },
    Show,
    Hide,
}

/// A batch of surface changes applied atomically by the compositor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    ops: SmallVec<[SurfaceOp; 4]>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: SurfaceOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// A locked surface buffer.
#[derive(Debug)]
pub struct BufferView<'a> {
    pub width: u32,
    pub height: u32,
    /// Row length in pixels.
    pub stride: u32,
    pub bytes_per_pixel: u32,
    pub bits: &'a mut [u8],
}

impl BufferView<'_> {
    /// Bytes between the start of consecutive rows.
    pub fn row_pitch(&self) -> usize {
        self.stride as usize * self.bytes_per_pixel as usize
    }

    /// Visible bytes of row `y` (`width * bytes_per_pixel`).
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let pitch = self.row_pitch();
        let start = y as usize * pitch;
        let len = self.width as usize * self.bytes_per_pixel as usize;
        let end = (start + len).min(self.bits.len());
        &mut self.bits[start.min(end)..end]
    }
}

/// Render-context creation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextRequest {
    pub config: ChannelConfig,
    pub client_version: u32,
}

/// Display server connection.
pub trait Compositor: Send + Sync {
    /// Confirm the connection is usable before creating surfaces.
    fn init_check(&self) -> StrobeResult<()>;
    /// Acquire a new surface. Dropping the returned box releases it.
    fn create_surface(&self, req: &SurfaceRequest) -> StrobeResult<Box<dyn Surface>>;
}

/// A compositor surface owned by exactly one worker (or one ghost).
pub trait Surface: Send {
    fn id(&self) -> SurfaceId;

    /// Apply a batched transaction.
    fn apply(&mut self, txn: &Transaction) -> StrobeResult<()>;

    /// Lock the buffer, run `paint`, then unlock and post it. Nothing is posted if `paint` fails.
    fn draw(
        &mut self,
        paint: &mut dyn FnMut(&mut BufferView<'_>) -> StrobeResult<()>,
    ) -> StrobeResult<()>;

    /// Bind a hardware render context to this surface.
    fn create_context(&mut self, req: &ContextRequest) -> StrobeResult<Box<dyn RenderContext>>;
}

/// Hardware rendering context bound to a surface. Dropping it tears the context down.
pub trait RenderContext: Send {
    fn config(&self) -> ChannelConfig;
    /// Clear the whole surface to a normalized RGBA colour.
    fn clear(&mut self, rgba: [f32; 4]) -> StrobeResult<()>;
    /// Present the back buffer.
    fn present(&mut self) -> StrobeResult<()>;
    /// Drop buffers sized for the previous surface geometry.
    fn purge_buffers(&mut self) -> StrobeResult<()>;
}
