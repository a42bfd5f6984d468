use super::*;
use crate::foundation::core::{Rect, SURFACE_HIDDEN};

fn spec_with(f: impl FnOnce(&mut SurfaceSpec)) -> SurfaceSpec {
    let mut spec = SurfaceSpec {
        name: "s".to_string(),
        output: Rect::from_xywh(0, 0, 40, 40),
        ..SurfaceSpec::default()
    };
    f(&mut spec);
    spec
}

#[test]
fn content_cycle_drives_paints() {
    let spec = spec_with(|s| s.update.content_cycle = DutyCycle::new(2, 3));
    let mut sched = UpdateSchedule::new(&spec);
    let paints: Vec<bool> = (0..5).map(|_| sched.tick().paint).collect();
    assert_eq!(paints, vec![true, true, false, false, false]);
}

#[test]
fn size_change_forces_paint() {
    let spec = spec_with(|s| {
        s.update.content_cycle = DutyCycle::new(1, 100);
        s.update.output_step = Rect::from_xywh(0, 0, 5, 0);
        s.update.output_limit = Rect::from_xywh(0, 0, 60, 0);
        s.update.size_cycle = DutyCycle::new(1, 2);
    });
    let mut sched = UpdateSchedule::new(&spec);
    let first = sched.tick();
    assert!(first.size_changed && first.paint);
    let second = sched.tick();
    assert!(!second.size_changed && !second.paint);
    sched.tick();
    let fourth = sched.tick();
    assert!(fourth.size_changed && fourth.paint);
    assert_eq!(sched.size(), (50, 40));
}

#[test]
fn position_walk_follows_bounce() {
    let spec = spec_with(|s| {
        s.update.output_step = Rect::from_xywh(3, 0, 0, 0);
        s.update.output_limit = Rect::from_xywh(10, 0, 0, 0);
    });
    let mut sched = UpdateSchedule::new(&spec);
    let xs: Vec<i32> = (0..6)
        .map(|_| {
            sched.tick();
            sched.position().0
        })
        .collect();
    assert_eq!(xs, vec![3, 6, 9, 8, 5, 2]);
}

#[test]
fn idle_position_cycle_freezes_geometry() {
    let spec = spec_with(|s| {
        s.update.position_cycle = DutyCycle::NEVER;
        s.update.output_step = Rect::from_xywh(3, 3, 0, 0);
        s.update.output_limit = Rect::from_xywh(10, 10, 0, 0);
    });
    let mut sched = UpdateSchedule::new(&spec);
    for _ in 0..5 {
        let d = sched.tick();
        assert!(!d.position_changed);
        assert!(!d.needs_transaction());
    }
    assert_eq!(sched.position(), (0, 0));
}

#[test]
fn hidden_surface_with_default_show_cycle_is_shown_once() {
    let spec = spec_with(|s| s.flags = SURFACE_HIDDEN);
    let mut sched = UpdateSchedule::new(&spec);
    assert!(!sched.is_visible());
    assert_eq!(sched.tick().visibility, VisibilitySignal::Show);
    assert_eq!(sched.tick().visibility, VisibilitySignal::NoChange);
    assert!(sched.is_visible());
}
