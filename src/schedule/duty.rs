/// A periodic on/off pattern measured in loop iterations.
///
/// `on == 0` means "never, unless forced"; `off == 0` (with `on > 0`) means "always".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DutyCycle {
    /// Iterations inside the active window.
    pub on: u32,
    /// Iterations inside the idle window.
    pub off: u32,
}

impl DutyCycle {
    /// Active on every iteration.
    pub const ALWAYS: Self = Self { on: 1, off: 0 };
    /// Never active unless forced.
    pub const NEVER: Self = Self { on: 0, off: 0 };

    pub const fn new(on: u32, off: u32) -> Self {
        Self { on, off }
    }

    /// Return `true` when either count is zero and the cycle has no alternation.
    pub fn is_degenerate(self) -> bool {
        self.on == 0 || self.off == 0
    }

    /// Iterations in one full active+idle period.
    pub fn period(self) -> u64 {
        u64::from(self.on) + u64::from(self.off)
    }
}

impl Default for DutyCycle {
    fn default() -> Self {
        Self::ALWAYS
    }
}

/// Mutable position inside a [`DutyCycle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleState {
    pub(crate) counter: u32,
    pub(crate) active: bool,
}

impl ScheduleState {
    /// Fresh state at the start of an active window.
    pub fn new() -> Self {
        Self::starting(true)
    }

    /// Fresh state starting in the active (`true`) or idle window.
    pub fn starting(active: bool) -> Self {
        Self { counter: 0, active }
    }

    /// Iterations elapsed inside the current window.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Whether the current window is the active one.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether this iteration acts, advancing `state`.
///
/// `force` restarts the active window from the idle window. Within the active window the
/// decision is `true` for exactly `on` consecutive calls, then `false` for exactly `off` calls.
pub fn decide(cycle: DutyCycle, state: &mut ScheduleState, force: bool) -> bool {
    if cycle.on == 0 {
        return force;
    }
    if cycle.off == 0 {
        return true;
    }

    if force && !state.active {
        state.active = true;
        state.counter = 0;
    }

    state.counter = state.counter.saturating_add(1);
    if state.active {
        if state.counter >= cycle.on {
            state.active = false;
            state.counter = 0;
        }
        return true;
    }

    if state.counter >= cycle.off {
        state.active = true;
        state.counter = 0;
    }
    false
}

/// Edge-triggered visibility change emitted by [`visibility`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilitySignal {
    Show,
    Hide,
    NoChange,
}

/// Advance a visibility cycle and report only the transitions.
///
/// `state.active` is the current visibility. A degenerate cycle keeps the surface visible,
/// emitting a single `Show` if it starts hidden.
pub fn visibility(cycle: DutyCycle, state: &mut ScheduleState) -> VisibilitySignal {
    if cycle.is_degenerate() {
        if state.active {
            return VisibilitySignal::NoChange;
        }
        state.active = true;
        state.counter = 0;
        return VisibilitySignal::Show;
    }

    state.counter = state.counter.saturating_add(1);
    if state.active {
        if state.counter >= cycle.on {
            state.active = false;
            state.counter = 0;
            return VisibilitySignal::Hide;
        }
    } else if state.counter >= cycle.off {
        state.active = true;
        state.counter = 0;
        return VisibilitySignal::Show;
    }
    VisibilitySignal::NoChange
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/duty.rs"]
mod tests;
