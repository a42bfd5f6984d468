use std::time::Duration;

use super::*;
use crate::backend::headless::{HeadlessCompositor, HeadlessFaults};
use crate::foundation::core::{PixelFormat, Rect};
use crate::plugin::PluginRegistry;
use crate::schedule::duty::DutyCycle;
use crate::spec::model::ContentType;

fn env(comp: &HeadlessCompositor) -> WorkerEnv {
    WorkerEnv {
        compositor: Arc::new(comp.clone()),
        plugins: Arc::new(PluginRegistry::with_builtins()),
        cancel: CancelToken::new(),
    }
}

fn solid(name: &str, iterations: i64) -> SurfaceSpec {
    SurfaceSpec {
        name: name.to_string(),
        format: PixelFormat::Rgba8888,
        output: Rect::from_xywh(0, 0, 8, 8),
        content: "ff0000ff 00ff00ff".to_string(),
        update: crate::spec::model::UpdateParams {
            iterations,
            ..Default::default()
        },
        ..SurfaceSpec::default()
    }
}

fn worker(spec: SurfaceSpec, env: WorkerEnv) -> Worker {
    Worker::new(WorkerId(0), Arc::new(spec), env)
}

#[test]
fn solid_budget_of_five_paints_five_times() {
    let comp = HeadlessCompositor::new();
    let mut w = worker(solid("five", 5), env(&comp));
    assert_eq!(w.run(), WorkerOutcome::Finished);
    assert_eq!(w.state(), WorkerState::Terminated);

    let report = w.report(false);
    assert_eq!((report.iterations, report.paints), (5, 5));
    assert_eq!(report.transactions, 0);

    let snap = comp.snapshot("five").unwrap();
    assert_eq!(snap.posts, 5);
    // colours alternate 0,1,0,1,0
    assert_eq!(&snap.pixels[..4], &[0xff, 0x00, 0x00, 0xff]);
    // only the initial layer/position transaction
    assert_eq!(snap.transactions, 1);
}

#[test]
fn zero_budget_acquires_surface_but_never_paints() {
    let comp = HeadlessCompositor::new();
    let mut w = worker(solid("idle", 0), env(&comp));
    assert_eq!(w.run(), WorkerOutcome::Finished);
    assert!(w.surface_id().is_some());
    assert_eq!(comp.snapshot("idle").unwrap().posts, 0);
}

#[test]
fn refused_surface_is_a_start_failure() {
    let comp = HeadlessCompositor::with_faults(HeadlessFaults::none().fail_create("nope"));
    let mut w = worker(solid("nope", 5), env(&comp));
    assert!(matches!(w.run(), WorkerOutcome::StartFailed(_)));
    assert_eq!(w.state(), WorkerState::Terminated);
    assert_eq!(w.surface_id(), None);
    assert_eq!(w.iterations(), 0);
}

#[test]
fn unusable_compositor_is_a_start_failure() {
    let comp = HeadlessCompositor::with_faults(HeadlessFaults::none().fail_init_check());
    let mut w = worker(solid("down", 5), env(&comp));
    assert!(w.run().is_error());
    assert!(comp.snapshots().is_empty());
}

#[test]
fn invalid_geometry_is_a_start_failure() {
    let comp = HeadlessCompositor::new();
    let mut spec = solid("flat", 5);
    spec.output = Rect::default();
    let mut w = worker(spec, env(&comp));
    assert!(matches!(w.run(), WorkerOutcome::StartFailed(_)));
}

#[test]
fn transaction_failure_stops_the_loop() {
    // transaction #1 is the initial placement; #3 is the second loop iteration
    let comp = HeadlessCompositor::with_faults(HeadlessFaults::none().fail_transaction("mover", 3));
    let mut spec = solid("mover", 10);
    spec.update.output_step = Rect::from_xywh(2, 0, 0, 0);
    spec.update.output_limit = Rect::from_xywh(100, 0, 0, 0);
    let mut w = worker(spec, env(&comp));

    assert!(matches!(w.run(), WorkerOutcome::Failed(_)));
    assert_eq!(w.iterations(), 2);
    assert_eq!(w.report(false).paints, 1);
    assert_eq!(comp.snapshot("mover").unwrap().left, 2);
}

#[test]
fn plugin_completion_ends_early_without_error() {
    let comp = HeadlessCompositor::new();
    let mut spec = solid("plug", 10);
    spec.content_type = ContentType::Plugin;
    spec.content = "pulse 3".to_string();
    let mut w = worker(spec, env(&comp));

    let outcome = w.run();
    assert_eq!(outcome, WorkerOutcome::Completed);
    assert!(!outcome.is_error());
    assert_eq!(w.iterations(), 4);
    assert_eq!(w.report(false).paints, 3);
}

#[test]
fn cancelled_before_first_iteration() {
    let comp = HeadlessCompositor::new();
    let env = env(&comp);
    env.cancel.cancel();
    let mut w = worker(solid("forever", -1), env);
    assert_eq!(w.run(), WorkerOutcome::Cancelled);
    assert_eq!(w.iterations(), 0);
}

#[test]
fn unbounded_worker_stops_on_cancel_from_another_thread() {
    let comp = HeadlessCompositor::new();
    let env = env(&comp);
    let cancel = env.cancel.clone();
    let mut spec = solid("forever", -1);
    spec.update.latency_us = 1_000;
    let mut w = worker(spec, env);

    let handle = std::thread::spawn(move || {
        let outcome = w.run();
        (outcome, w.iterations())
    });
    std::thread::sleep(Duration::from_millis(30));
    cancel.cancel();
    let (outcome, iterations) = handle.join().unwrap();
    assert_eq!(outcome, WorkerOutcome::Cancelled);
    assert!(iterations > 0);
}

#[test]
fn show_cycle_toggles_visibility_in_transactions() {
    let comp = HeadlessCompositor::new();
    let mut spec = solid("blink", 4);
    spec.update.show_cycle = DutyCycle::new(1, 1);
    let mut w = worker(spec, env(&comp));
    w.run();

    assert_eq!(w.report(false).transactions, 4);
    assert!(w.is_visible());
    let snap = comp.snapshot("blink").unwrap();
    assert!(snap.visible);
    assert_eq!(snap.transactions, 5);
}

#[test]
fn resize_forces_a_paint_outside_the_content_window() {
    let comp = HeadlessCompositor::new();
    let mut spec = solid("grow", 6);
    spec.update.content_cycle = DutyCycle::new(1, 100);
    spec.update.size_cycle = DutyCycle::new(1, 2);
    spec.update.output_step = Rect::from_xywh(0, 0, 4, 0);
    spec.update.output_limit = Rect::from_xywh(0, 0, 40, 0);
    let mut w = worker(spec, env(&comp));
    w.run();

    // sizes change on iterations 1 and 4, each forcing a paint
    assert_eq!(w.report(false).paints, 2);
    assert_eq!(w.size(), (16, 8));
    let snap = comp.snapshot("grow").unwrap();
    assert_eq!((snap.width, snap.height), (16, 8));
    assert!(snap.pixels.chunks_exact(4).all(|p| p[3] == 0xff));
}

#[test]
fn latency_paces_iterations() {
    let comp = HeadlessCompositor::new();
    let mut spec = solid("slow", 3);
    spec.update.latency_us = 5_000;
    let mut w = worker(spec, env(&comp));
    let t0 = std::time::Instant::now();
    w.run();
    assert!(t0.elapsed() >= Duration::from_millis(10));
}

#[test]
fn run_is_idempotent_after_termination() {
    let comp = HeadlessCompositor::new();
    let mut w = worker(solid("again", 2), env(&comp));
    let first = w.run();
    let second = w.run();
    assert_eq!(first, second);
    assert_eq!(w.iterations(), 2);
    assert_eq!(comp.snapshot("again").unwrap().posts, 2);
}
