/// Advance `current` by `direction * delta`, reflecting off the closed interval spanned by
/// `origin` and `limit`.
///
/// On leaving the interval the direction flips and the overshoot is mirrored back inside, so the
/// walk `0 → 3 → 6 → 9 → 8 → 5 → 2` results for `delta = 3` on `[0, 10]`. The returned flag
/// reports whether the value moved; `delta == 0` is always a no-op.
pub fn bounce_step(
    current: i32,
    delta: i32,
    origin: i32,
    limit: i32,
    direction: &mut i32,
) -> (i32, bool) {
    if delta == 0 {
        return (current, false);
    }

    let lo = i64::from(origin.min(limit));
    let hi = i64::from(origin.max(limit));
    let dir = if *direction < 0 { -1 } else { 1 };
    let mut candidate = i64::from(current) + dir * i64::from(delta);

    if candidate < lo || candidate > hi {
        *direction = -dir as i32;
        let bound = if candidate > hi { hi } else { lo };
        candidate = (2 * bound - candidate).clamp(lo, hi);
    }

    // lo..=hi came from i32 values.
    let next = candidate as i32;
    (next, next != current)
}

/// One bouncing coordinate: current value plus its fixed step, interval, and direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisStep {
    value: i32,
    delta: i32,
    origin: i32,
    limit: i32,
    direction: i32,
    enabled: bool,
}

impl AxisStep {
    pub fn new(origin: i32, delta: i32, limit: i32) -> Self {
        Self {
            value: origin,
            delta,
            origin,
            limit,
            direction: 1,
            enabled: true,
        }
    }

    /// An axis that never moves from `origin`.
    pub fn fixed(origin: i32) -> Self {
        Self {
            enabled: false,
            ..Self::new(origin, 0, origin)
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn direction(&self) -> i32 {
        self.direction
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.delta != 0
    }

    /// Take one step; returns whether the value changed.
    pub fn advance(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        let (next, changed) = bounce_step(
            self.value,
            self.delta,
            self.origin,
            self.limit,
            &mut self.direction,
        );
        self.value = next;
        changed
    }
}

/// Output-rectangle origin stepping. Both axes step on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionStep {
    pub left: AxisStep,
    pub top: AxisStep,
}

impl PositionStep {
    pub fn new(origin: (i32, i32), delta: (i32, i32), limit: (i32, i32)) -> Self {
        Self {
            left: AxisStep::new(origin.0, delta.0, limit.0),
            top: AxisStep::new(origin.1, delta.1, limit.1),
        }
    }

    pub fn advance(&mut self) -> bool {
        let moved_x = self.left.advance();
        let moved_y = self.top.advance();
        moved_x || moved_y
    }

    pub fn value(&self) -> (i32, i32) {
        (self.left.value(), self.top.value())
    }
}

/// Output-rectangle size stepping.
///
/// An axis whose limit is not positive is held at its initial extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeStep {
    pub width: AxisStep,
    pub height: AxisStep,
}

impl SizeStep {
    pub fn new(origin: (i32, i32), delta: (i32, i32), limit: (i32, i32)) -> Self {
        let axis = |o: i32, d: i32, l: i32| {
            if l > 0 {
                AxisStep::new(o, d, l)
            } else {
                AxisStep::fixed(o)
            }
        };
        Self {
            width: axis(origin.0, delta.0, limit.0),
            height: axis(origin.1, delta.1, limit.1),
        }
    }

    pub fn advance(&mut self) -> bool {
        let w = self.width.advance();
        let h = self.height.advance();
        w || h
    }

    pub fn value(&self) -> (i32, i32) {
        (self.width.value(), self.height.value())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/step.rs"]
mod tests;
