use super::*;

fn walk(origin: i32, delta: i32, limit: i32, n: usize) -> Vec<i32> {
    let mut axis = AxisStep::new(origin, delta, limit);
    let mut out = vec![axis.value()];
    for _ in 0..n {
        axis.advance();
        out.push(axis.value());
    }
    out
}

#[test]
fn bounce_reflects_overshoot() {
    assert_eq!(walk(0, 3, 10, 8), vec![0, 3, 6, 9, 8, 5, 2, 1, 4]);
}

#[test]
fn bounce_with_limit_below_origin() {
    // -2 mirrors back onto 2, so the turn-around iteration reports no movement.
    assert_eq!(walk(10, -4, 0, 6), vec![10, 6, 2, 2, 6, 10, 6]);
    let mut dir = 1;
    assert_eq!(bounce_step(2, -4, 10, 0, &mut dir), (2, false));
    assert_eq!(dir, -1);
}

#[test]
fn zero_delta_is_noop() {
    let mut dir = 1;
    assert_eq!(bounce_step(5, 0, 0, 10, &mut dir), (5, false));
    assert_eq!(dir, 1);
}

#[test]
fn direction_flips_only_on_overshoot() {
    let mut dir = 1;
    let (v, changed) = bounce_step(9, 3, 0, 10, &mut dir);
    assert_eq!((v, changed, dir), (8, true, -1));
    let (v, _) = bounce_step(v, 3, 0, 10, &mut dir);
    assert_eq!((v, dir), (5, -1));
}

#[test]
fn values_stay_bounded_for_any_step() {
    for delta in [-13, -7, -1, 1, 2, 5, 11, 40] {
        for (origin, limit) in [(0, 10), (10, 0), (-5, 5), (3, 3)] {
            let lo = origin.min(limit);
            let hi = origin.max(limit);
            let got = walk(origin, delta, limit, 200);
            assert!(
                got.iter().all(|v| (lo..=hi).contains(v)),
                "delta={delta} origin={origin} limit={limit}"
            );
        }
    }
}

#[test]
fn size_axis_without_positive_limit_is_held() {
    let mut size = SizeStep::new((100, 50), (10, 10), (0, 80));
    assert!(!size.width.is_enabled());
    assert!(size.advance());
    assert_eq!(size.value(), (100, 60));
    for _ in 0..20 {
        size.advance();
        assert_eq!(size.value().0, 100);
        assert!((50..=80).contains(&size.value().1));
    }
}

#[test]
fn position_axes_are_independent() {
    let mut pos = PositionStep::new((0, 0), (3, 0), (10, 10));
    assert!(pos.advance());
    assert_eq!(pos.value(), (3, 0));
    for _ in 0..10 {
        pos.advance();
    }
    assert_eq!(pos.value().1, 0);
}
