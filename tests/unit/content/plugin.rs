use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::*;
use crate::backend::headless::HeadlessCompositor;
use crate::backend::{Compositor, SurfaceRequest};
use crate::foundation::core::Rect;
use crate::plugin::{PluginRegistry, StaticLibrary};
use crate::spec::model::{ContentType, SurfaceSpec};
use crate::worker::cancel::CancelToken;

#[derive(Default)]
struct Calls {
    renders: AtomicU32,
    inits: AtomicU32,
    destroys: AtomicU32,
    contexts: AtomicU32,
    resized: Mutex<Option<(u32, u32)>>,
    configs: Mutex<Vec<ChannelConfig>>,
}

/// Library whose `render` replays `statuses`, then returns 0.
fn scripted(statuses: &[i32], calls: Arc<Calls>) -> StaticLibrary {
    let queue = Arc::new(Mutex::new(statuses.iter().copied().collect::<VecDeque<_>>()));
    let (c1, c2, c3, c4, c5) = (
        Arc::clone(&calls),
        Arc::clone(&calls),
        Arc::clone(&calls),
        Arc::clone(&calls),
        Arc::clone(&calls),
    );
    StaticLibrary::new("scripted")
        .create(|_, _, _| Ok(Box::new(0u32)))
        .init(move |_| {
            c1.inits.fetch_add(1, Ordering::SeqCst);
            0
        })
        .render(move |_, gl| {
            c2.renders.fetch_add(1, Ordering::SeqCst);
            c2.configs.lock().unwrap().push(gl.config());
            queue.lock().unwrap().pop_front().unwrap_or(0)
        })
        .destroy(move |_| {
            c3.destroys.fetch_add(1, Ordering::SeqCst);
        })
        .size_changed(move |_, w, h| {
            *c4.resized.lock().unwrap() = Some((w, h));
            0
        })
        .create_context(move |_| {
            c5.contexts.fetch_add(1, Ordering::SeqCst);
            None
        })
        .choose_config(|_, _| None)
}

fn spec(content: &str) -> SurfaceSpec {
    SurfaceSpec {
        name: "plug".to_string(),
        content_type: ContentType::Plugin,
        content: content.to_string(),
        output: Rect::from_xywh(0, 0, 4, 4),
        format: PixelFormat::Rgb565,
        ..SurfaceSpec::default()
    }
}

struct Rig {
    comp: HeadlessCompositor,
    surface: Box<dyn Surface>,
    content: PluginContent,
    spec: SurfaceSpec,
    cancel: CancelToken,
}

impl Rig {
    fn new(content: &str, reg: &PluginRegistry) -> StrobeResult<Self> {
        let spec = spec(content);
        let comp = HeadlessCompositor::new();
        let mut surface = comp.create_surface(&SurfaceRequest::from_spec(&spec))?;
        let mut plugin = PluginContent::from_content(&spec.content);
        plugin.prepare(StartCtx {
            spec: &spec,
            surface: surface.as_mut(),
            plugins: reg,
        })?;
        Ok(Self {
            comp,
            surface,
            content: plugin,
            spec,
            cancel: CancelToken::new(),
        })
    }

    fn paint_at(&mut self, size: (u32, u32)) -> StrobeResult<PaintOutcome> {
        self.content.paint(PaintCtx {
            spec: &self.spec,
            surface: self.surface.as_mut(),
            size,
            cancel: &self.cancel,
        })
    }

    fn paint(&mut self) -> StrobeResult<PaintOutcome> {
        self.paint_at((4, 4))
    }

    fn presents(&self) -> u64 {
        self.comp.snapshot("plug").unwrap().presents
    }
}

fn registry(statuses: &[i32]) -> (PluginRegistry, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let mut reg = PluginRegistry::with_builtins();
    reg.register(scripted(statuses, Arc::clone(&calls)));
    (reg, calls)
}

#[test]
fn content_payload_splits_library_and_args() {
    let p = PluginContent::from_content("libpulse.so 30 fast");
    assert_eq!(p.library(), "libpulse.so");
    assert_eq!(p.args(), ["30".to_string(), "fast".to_string()]);
}

#[test]
fn pulse_renders_until_its_frame_limit() {
    let (reg, _) = registry(&[]);
    let mut rig = Rig::new("pulse 2", &reg).unwrap();
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Completed);
    assert_eq!(rig.presents(), 2);
}

#[test]
fn unknown_library_fails_prepare() {
    let (reg, _) = registry(&[]);
    assert!(matches!(
        Rig::new("nonexistent", &reg),
        Err(StrobeError::Plugin(_))
    ));
    assert!(matches!(Rig::new("", &reg), Err(StrobeError::Plugin(_))));
}

#[test]
fn status_codes_control_presentation() {
    let (reg, calls) = registry(&[3, 9, 0]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    assert_eq!(calls.inits.load(Ordering::SeqCst), 1);

    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);
    assert_eq!(rig.presents(), 0);
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);
    assert_eq!(rig.presents(), 1);
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);
    assert_eq!(rig.presents(), 2);
    assert_eq!(rig.content.frames(), 3);
}

#[test]
fn negative_status_is_fatal() {
    let (reg, _) = registry(&[-1]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    assert!(matches!(rig.paint(), Err(StrobeError::Plugin(_))));
}

#[test]
fn done_status_completes_without_presenting() {
    let (reg, _) = registry(&[2]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Completed);
    assert_eq!(rig.presents(), 0);
}

#[test]
fn reinit_rebuilds_context_and_retries_once() {
    let (reg, calls) = registry(&[1, 0]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);

    assert_eq!(calls.renders.load(Ordering::SeqCst), 2);
    assert_eq!(calls.contexts.load(Ordering::SeqCst), 2);
    // init belongs to the plugin instance, not the context
    assert_eq!(calls.inits.load(Ordering::SeqCst), 1);
    assert_eq!(rig.presents(), 1);
    assert_eq!(rig.comp.snapshot("plug").unwrap().live_contexts, 1);
}

#[test]
fn second_consecutive_reinit_is_not_retried_again() {
    let (reg, calls) = registry(&[1, 1, 0]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Painted);
    assert_eq!(calls.renders.load(Ordering::SeqCst), 2);
    assert_eq!(rig.presents(), 0);
}

#[test]
fn reinit_observes_cancellation() {
    let (reg, calls) = registry(&[1]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    rig.cancel.cancel();
    assert_eq!(rig.paint().unwrap(), PaintOutcome::Cancelled);
    assert_eq!(calls.renders.load(Ordering::SeqCst), 1);
}

#[test]
fn size_change_purges_and_notifies() {
    let (reg, calls) = registry(&[]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    rig.paint().unwrap();
    assert_eq!(*calls.resized.lock().unwrap(), None);

    rig.paint_at((8, 4)).unwrap();
    assert_eq!(*calls.resized.lock().unwrap(), Some((8, 4)));
    assert_eq!(rig.comp.snapshot("plug").unwrap().purges, 1);

    // one frame at the old size, then one at the new size
    assert_eq!(calls.renders.load(Ordering::SeqCst), 3);
    assert_eq!(rig.presents(), 3);
    assert_eq!(rig.content.frames(), 3);

    rig.paint_at((8, 4)).unwrap();
    assert_eq!(calls.renders.load(Ordering::SeqCst), 4);
    assert_eq!(rig.comp.snapshot("plug").unwrap().purges, 1);
}

#[test]
fn done_before_resize_completes_without_resizing() {
    let (reg, calls) = registry(&[0, 2]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    rig.paint().unwrap();

    assert_eq!(rig.paint_at((8, 8)).unwrap(), PaintOutcome::Completed);
    assert_eq!(calls.renders.load(Ordering::SeqCst), 2);
    assert_eq!(*calls.resized.lock().unwrap(), None);
    assert_eq!(rig.comp.snapshot("plug").unwrap().purges, 0);
}

#[test]
fn declined_config_falls_back_to_format_default() {
    let (reg, calls) = registry(&[]);
    let mut rig = Rig::new("scripted", &reg).unwrap();
    rig.paint().unwrap();
    let cfg = calls.configs.lock().unwrap()[0];
    assert_eq!((cfg.red, cfg.green, cfg.blue, cfg.alpha), (5, 6, 5, 0));
}

#[test]
fn destroy_runs_on_drop() {
    let (reg, calls) = registry(&[]);
    let rig = Rig::new("scripted", &reg).unwrap();
    drop(rig);
    assert_eq!(calls.destroys.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_init_is_fatal() {
    let lib = StaticLibrary::new("grumpy")
        .create(|_, _, _| Ok(Box::new(())))
        .render(|_, _| 0)
        .init(|_| -3);
    let mut reg = PluginRegistry::new();
    reg.register(lib);
    let err = Rig::new("grumpy", &reg).err().unwrap();
    assert!(err.to_string().contains("init failed"));
}
