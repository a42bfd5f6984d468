use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::{
    BufferView, Compositor, ContextRequest, RenderContext, Surface, SurfaceOp, SurfaceRequest,
    Transaction,
};
use crate::foundation::core::{ChannelConfig, PixelFormat, SURFACE_HIDDEN, SurfaceId};
use crate::foundation::error::{StrobeError, StrobeResult};

/// Failures the headless compositor injects on request.
#[derive(Clone, Debug, Default)]
pub struct HeadlessFaults {
    /// Fail [`Compositor::init_check`].
    pub fail_init_check: bool,
    /// Refuse to create surfaces with these names.
    pub fail_create: BTreeSet<String>,
    /// Fail the Nth (1-based) transaction of the named surface.
    pub fail_transaction: BTreeMap<String, u64>,
    /// Refuse render contexts for these surface names.
    pub fail_context: BTreeSet<String>,
}

impl HeadlessFaults {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn fail_init_check(mut self) -> Self {
        self.fail_init_check = true;
        self
    }

    pub fn fail_create(mut self, name: impl Into<String>) -> Self {
        self.fail_create.insert(name.into());
        self
    }

    pub fn fail_transaction(mut self, name: impl Into<String>, nth: u64) -> Self {
        self.fail_transaction.insert(name.into(), nth);
        self
    }

    pub fn fail_context(mut self, name: impl Into<String>) -> Self {
        self.fail_context.insert(name.into());
        self
    }
}

/// Recorded state of one headless surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSnapshot {
    pub id: SurfaceId,
    pub name: String,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub layer: i32,
    pub visible: bool,
    /// Transactions applied successfully.
    pub transactions: u64,
    /// Buffers posted, through `draw` or a context `present`.
    pub posts: u64,
    pub presents: u64,
    pub purges: u64,
    pub last_clear: Option<[f32; 4]>,
    pub live_contexts: u32,
    pub destroyed: bool,
    /// Tightly packed pixels (`width * height * bytes_per_pixel`).
    pub pixels: Vec<u8>,
}

impl SurfaceSnapshot {
    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.bytes_per_pixel()
    }

    /// Convert the pixels to RGBA8 for inspection. `None` for formats without a byte layout.
    pub fn to_rgba8(&self) -> Option<image::RgbaImage> {
        let bpp = self.bytes_per_pixel() as usize;
        if bpp == 0 || self.width == 0 || self.height == 0 {
            return None;
        }
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.pixels.chunks_exact(bpp) {
            let rgba = match self.format {
                PixelFormat::Bgra8888 => [px[2], px[1], px[0], px[3]],
                PixelFormat::Rgbx8888 | PixelFormat::Opaque => [px[0], px[1], px[2], 0xff],
                _ if bpp == 4 => [px[0], px[1], px[2], px[3]],
                _ if bpp == 3 => [px[0], px[1], px[2], 0xff],
                PixelFormat::Rgb565 => {
                    let v = u16::from_be_bytes([px[0], px[1]]);
                    let r = ((v >> 11) & 0x1f) as u8;
                    let g = ((v >> 5) & 0x3f) as u8;
                    let b = (v & 0x1f) as u8;
                    [r << 3 | r >> 2, g << 2 | g >> 4, b << 3 | b >> 2, 0xff]
                }
                _ => [px[0], px[0], px[0], 0xff],
            };
            out.extend_from_slice(&rgba);
        }
        image::RgbaImage::from_raw(self.width, self.height, out)
    }
}

#[derive(Debug, Default)]
struct Shared {
    next_id: u64,
    surfaces: BTreeMap<SurfaceId, SurfaceSnapshot>,
    faults: HeadlessFaults,
}

impl Shared {
    fn surface_mut(&mut self, id: SurfaceId) -> StrobeResult<&mut SurfaceSnapshot> {
        self.surfaces
            .get_mut(&id)
            .ok_or_else(|| StrobeError::surface(format!("unknown surface {}", id.0)))
    }
}

fn pixel_len(width: u32, height: u32, format: PixelFormat) -> usize {
    width as usize * height as usize * format.bytes_per_pixel() as usize
}

/// In-memory compositor. Clones share the same surface table.
#[derive(Clone, Debug, Default)]
pub struct HeadlessCompositor {
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: HeadlessFaults) -> Self {
        let c = Self::default();
        c.state().faults = faults;
        c
    }

    fn state(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Most recently created surface with `name`.
    pub fn snapshot(&self, name: &str) -> Option<SurfaceSnapshot> {
        self.state()
            .surfaces
            .values()
            .rev()
            .find(|s| s.name == name)
            .cloned()
    }

    /// Every surface ever created, in creation order.
    pub fn snapshots(&self) -> Vec<SurfaceSnapshot> {
        self.state().surfaces.values().cloned().collect()
    }

    /// Surfaces created and not yet released.
    pub fn live_surfaces(&self) -> usize {
        self.state().surfaces.values().filter(|s| !s.destroyed).count()
    }
}

impl Compositor for HeadlessCompositor {
    fn init_check(&self) -> StrobeResult<()> {
        if self.state().faults.fail_init_check {
            return Err(StrobeError::surface("compositor connection unavailable"));
        }
        Ok(())
    }

    fn create_surface(&self, req: &SurfaceRequest) -> StrobeResult<Box<dyn Surface>> {
        let mut st = self.state();
        if st.faults.fail_create.contains(&req.name) {
            return Err(StrobeError::surface(format!(
                "compositor refused surface '{}'",
                req.name
            )));
        }
        if req.width == 0 || req.height == 0 {
            return Err(StrobeError::surface(format!(
                "invalid surface size {}x{}",
                req.width, req.height
            )));
        }

        st.next_id += 1;
        let id = SurfaceId(st.next_id);
        st.surfaces.insert(
            id,
            SurfaceSnapshot {
                id,
                name: req.name.clone(),
                format: req.format,
                width: req.width,
                height: req.height,
                left: 0,
                top: 0,
                layer: 0,
                visible: req.flags & SURFACE_HIDDEN == 0,
                transactions: 0,
                posts: 0,
                presents: 0,
                purges: 0,
                last_clear: None,
                live_contexts: 0,
                destroyed: false,
                pixels: vec![0; pixel_len(req.width, req.height, req.format)],
            },
        );
        tracing::debug!(surface = %req.name, id = id.0, "headless surface created");

        Ok(Box::new(HeadlessSurface {
            id,
            name: req.name.clone(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct HeadlessSurface {
    id: SurfaceId,
    name: String,
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessSurface {
    fn state(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn apply(&mut self, txn: &Transaction) -> StrobeResult<()> {
        let mut st = self.state();
        let fail_at = st.faults.fail_transaction.get(&self.name).copied();
        let s = st.surface_mut(self.id)?;
        if fail_at == Some(s.transactions + 1) {
            return Err(StrobeError::surface(format!(
                "transaction {} rejected for '{}'",
                s.transactions + 1,
                self.name
            )));
        }

        for op in txn.ops() {
            match *op {
                SurfaceOp::SetLayer(z) => s.layer = z,
                SurfaceOp::SetPosition { left, top } => {
                    s.left = left;
                    s.top = top;
                }
                SurfaceOp::SetSize { width, height } => {
                    if width <= 0 || height <= 0 {
                        return Err(StrobeError::surface(format!(
                            "invalid size {width}x{height}"
                        )));
                    }
                    s.width = width as u32;
                    s.height = height as u32;
                    s.pixels = vec![0; pixel_len(s.width, s.height, s.format)];
                }
                SurfaceOp::Show => s.visible = true,
                SurfaceOp::Hide => s.visible = false,
            }
        }
        s.transactions += 1;
        Ok(())
    }

    fn draw(
        &mut self,
        paint: &mut dyn FnMut(&mut BufferView<'_>) -> StrobeResult<()>,
    ) -> StrobeResult<()> {
        let mut st = self.state();
        let s = st.surface_mut(self.id)?;
        let mut view = BufferView {
            width: s.width,
            height: s.height,
            stride: s.width,
            bytes_per_pixel: s.format.bytes_per_pixel(),
            bits: &mut s.pixels,
        };
        paint(&mut view)?;
        s.posts += 1;
        Ok(())
    }

    fn create_context(&mut self, req: &ContextRequest) -> StrobeResult<Box<dyn RenderContext>> {
        let mut st = self.state();
        if st.faults.fail_context.contains(&self.name) {
            return Err(StrobeError::surface(format!(
                "no render context for '{}'",
                self.name
            )));
        }
        let s = st.surface_mut(self.id)?;
        s.live_contexts += 1;
        Ok(Box::new(HeadlessContext {
            surface: self.id,
            config: req.config,
            shared: Arc::clone(&self.shared),
        }))
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        if let Some(s) = self.state().surfaces.get_mut(&self.id) {
            s.destroyed = true;
        }
        tracing::debug!(surface = %self.name, id = self.id.0, "headless surface released");
    }
}

struct HeadlessContext {
    surface: SurfaceId,
    config: ChannelConfig,
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessContext {
    fn with_surface<T>(&self, f: impl FnOnce(&mut SurfaceSnapshot) -> T) -> StrobeResult<T> {
        let mut st = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(st.surface_mut(self.surface)?))
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl RenderContext for HeadlessContext {
    fn config(&self) -> ChannelConfig {
        self.config
    }

    fn clear(&mut self, rgba: [f32; 4]) -> StrobeResult<()> {
        self.with_surface(|s| {
            let bytes = rgba.map(unit_to_byte);
            let bpp = s.format.bytes_per_pixel() as usize;
            if bpp > 0 {
                for px in s.pixels.chunks_exact_mut(bpp) {
                    px.copy_from_slice(&bytes[..bpp.min(4)]);
                }
            }
            s.last_clear = Some(rgba);
        })
    }

    fn present(&mut self) -> StrobeResult<()> {
        self.with_surface(|s| {
            s.presents += 1;
            s.posts += 1;
        })
    }

    fn purge_buffers(&mut self) -> StrobeResult<()> {
        self.with_surface(|s| s.purges += 1)
    }
}

impl Drop for HeadlessContext {
    fn drop(&mut self) {
        let _ = self.with_surface(|s| s.live_contexts = s.live_contexts.saturating_sub(1));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/headless.rs"]
mod tests;
