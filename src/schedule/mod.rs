//! Per-iteration scheduling: duty cycles, bouncing geometry, and the combined
//! [`UpdateSchedule`] a worker consults once per loop iteration.
//!
//! Decisions are evaluated in a fixed order each iteration: position, size, visibility, then
//! content. Content is forced whenever the size changed in the same iteration, so a resized
//! surface never shows stale pixels.

pub mod duty;
pub mod step;

use crate::spec::model::{SurfaceSpec, UpdateParams};
use duty::{DutyCycle, ScheduleState, VisibilitySignal, decide, visibility};
use step::{PositionStep, SizeStep};

/// What one iteration should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickDecision {
    pub position_changed: bool,
    pub size_changed: bool,
    pub visibility: VisibilitySignal,
    pub paint: bool,
}

impl TickDecision {
    /// Whether a compositor transaction is needed.
    pub fn needs_transaction(&self) -> bool {
        self.position_changed || self.size_changed || self.visibility != VisibilitySignal::NoChange
    }
}

/// Stateful schedule owned by a single worker.
#[derive(Clone, Debug)]
pub struct UpdateSchedule {
    content_cycle: DutyCycle,
    show_cycle: DutyCycle,
    position_cycle: DutyCycle,
    size_cycle: DutyCycle,
    content: ScheduleState,
    shown: ScheduleState,
    position_gate: ScheduleState,
    size_gate: ScheduleState,
    position: PositionStep,
    size: SizeStep,
}

impl UpdateSchedule {
    pub fn new(spec: &SurfaceSpec) -> Self {
        let up: &UpdateParams = &spec.update;
        let out = spec.output;
        let step = up.output_step;
        let limit = up.output_limit;

        Self {
            content_cycle: up.content_cycle,
            show_cycle: up.show_cycle,
            position_cycle: up.position_cycle,
            size_cycle: up.size_cycle,
            content: ScheduleState::new(),
            shown: ScheduleState::starting(!spec.starts_hidden()),
            position_gate: ScheduleState::new(),
            size_gate: ScheduleState::new(),
            position: PositionStep::new(
                (out.left, out.top),
                (step.left, step.top),
                (limit.left, limit.top),
            ),
            size: SizeStep::new(
                spec.initial_size(),
                (step.width(), step.height()),
                (limit.width(), limit.height()),
            ),
        }
    }

    /// Step the output origin if the position cycle allows it.
    pub fn update_position(&mut self) -> bool {
        decide(self.position_cycle, &mut self.position_gate, false) && self.position.advance()
    }

    /// Step the output size if the size cycle allows it.
    pub fn update_size(&mut self) -> bool {
        decide(self.size_cycle, &mut self.size_gate, false) && self.size.advance()
    }

    pub fn update_visibility(&mut self) -> VisibilitySignal {
        visibility(self.show_cycle, &mut self.shown)
    }

    pub fn update_content(&mut self, force: bool) -> bool {
        decide(self.content_cycle, &mut self.content, force)
    }

    /// Evaluate all four decisions for one iteration, in order.
    pub fn tick(&mut self) -> TickDecision {
        let position_changed = self.update_position();
        let size_changed = self.update_size();
        let visibility = self.update_visibility();
        let paint = self.update_content(size_changed);
        TickDecision {
            position_changed,
            size_changed,
            visibility,
            paint,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        self.position.value()
    }

    pub fn size(&self) -> (i32, i32) {
        self.size.value()
    }

    pub fn is_visible(&self) -> bool {
        self.shown.is_active()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/update.rs"]
mod tests;
