//! One animated surface, driven on its own thread.
//!
//! A [`Worker`] moves through `Starting → Running → Completing → Terminated` exactly once.
//! Starting acquires the surface and prepares the content strategy; Running executes the
//! iteration loop until the budget is spent, the content completes, cancellation is observed,
//! or a backend call fails. Whatever the reason, the worker ends in `Terminated` with a
//! [`WorkerOutcome`] describing why.

pub mod cancel;
pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use crate::backend::{Compositor, Surface, SurfaceOp, SurfaceRequest, Transaction};
use crate::content::{ContentStrategy, PaintCtx, PaintOutcome, StartCtx};
use crate::foundation::core::SurfaceId;
use crate::foundation::error::{StrobeError, StrobeResult};
use crate::plugin::PluginLoader;
use crate::schedule::UpdateSchedule;
use crate::schedule::duty::VisibilitySignal;
use crate::spec::model::SurfaceSpec;
use cancel::CancelToken;
use stats::Stat;

/// Manager-assigned worker index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Running,
    Completing,
    Terminated,
}

/// Why a worker terminated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The iteration budget was exhausted.
    Finished,
    /// The content strategy reported that it is done.
    Completed,
    /// Cancellation was observed.
    Cancelled,
    /// Surface, context, file, or plugin acquisition failed; the loop never ran.
    StartFailed(String),
    /// A backend or content call failed mid-run.
    Failed(String),
}

impl WorkerOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::StartFailed(_) | Self::Failed(_))
    }
}

/// Summary of a terminated worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: WorkerId,
    pub name: String,
    pub outcome: WorkerOutcome,
    pub iterations: u64,
    pub paints: u64,
    pub transactions: u64,
    pub retained: bool,
}

/// Shared collaborators every worker uses.
#[derive(Clone)]
pub struct WorkerEnv {
    pub compositor: Arc<dyn Compositor>,
    pub plugins: Arc<dyn PluginLoader>,
    pub cancel: CancelToken,
}

enum Flow {
    Continue,
    Complete,
    Cancelled,
}

pub struct Worker {
    id: WorkerId,
    spec: Arc<SurfaceSpec>,
    env: WorkerEnv,
    state: WorkerState,
    // Declared before `surface`: a render context held by the content must drop first.
    content: ContentStrategy,
    surface: Option<Box<dyn Surface>>,
    schedule: UpdateSchedule,
    stat: Stat,
    last_iter: Option<Instant>,
    iterations: u64,
    paints: u64,
    transactions: u64,
    outcome: Option<WorkerOutcome>,
}

impl Worker {
    pub fn new(id: WorkerId, spec: Arc<SurfaceSpec>, env: WorkerEnv) -> Self {
        Self {
            id,
            content: ContentStrategy::for_spec(&spec),
            schedule: UpdateSchedule::new(&spec),
            spec,
            env,
            state: WorkerState::Starting,
            surface: None,
            stat: Stat::new(),
            last_iter: None,
            iterations: 0,
            paints: 0,
            transactions: 0,
            outcome: None,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.spec.display_name()
    }

    pub fn spec(&self) -> &SurfaceSpec {
        &self.spec
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn outcome(&self) -> Option<&WorkerOutcome> {
        self.outcome.as_ref()
    }

    /// Surface held by this worker, if acquisition succeeded and it has not been released.
    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.as_ref().map(|s| s.id())
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn position(&self) -> (i32, i32) {
        self.schedule.position()
    }

    pub fn size(&self) -> (i32, i32) {
        self.schedule.size()
    }

    pub fn is_visible(&self) -> bool {
        self.schedule.is_visible()
    }

    pub fn report(&self, retained: bool) -> WorkerReport {
        WorkerReport {
            id: self.id,
            name: self.name().to_string(),
            outcome: self
                .outcome
                .clone()
                .unwrap_or_else(|| WorkerOutcome::Failed("worker never ran".to_string())),
            iterations: self.iterations,
            paints: self.paints,
            transactions: self.transactions,
            retained,
        }
    }

    /// Drive the worker to `Terminated`. Calling it again returns the recorded outcome.
    #[tracing::instrument(skip(self), fields(surface = %self.spec.display_name()))]
    pub fn run(&mut self) -> WorkerOutcome {
        if let Some(done) = self.outcome.as_ref() {
            return done.clone();
        }

        tracing::debug!("starting");
        self.state = WorkerState::Starting;
        if let Err(e) = self.start() {
            tracing::error!(error = %e, "start failed");
            return self.terminate(WorkerOutcome::StartFailed(e.to_string()));
        }

        self.state = WorkerState::Running;
        let outcome = self.run_loop();

        self.state = WorkerState::Completing;
        self.stat.dump(self.spec.display_name());
        tracing::debug!(?outcome, iterations = self.iterations, "worker exiting");
        self.terminate(outcome)
    }

    fn terminate(&mut self, outcome: WorkerOutcome) -> WorkerOutcome {
        self.state = WorkerState::Terminated;
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn start(&mut self) -> StrobeResult<()> {
        self.env.compositor.init_check()?;
        self.spec.validate()?;

        let mut surface = self
            .env
            .compositor
            .create_surface(&SurfaceRequest::from_spec(&self.spec))?;

        let mut txn = Transaction::new();
        txn.push(SurfaceOp::SetLayer(self.spec.z_order))
            .push(SurfaceOp::SetPosition {
                left: self.spec.output.left,
                top: self.spec.output.top,
            });
        surface.apply(&txn)?;

        self.content.prepare(StartCtx {
            spec: &self.spec,
            surface: surface.as_mut(),
            plugins: self.env.plugins.as_ref(),
        })?;

        self.surface = Some(surface);
        self.stat.clear();
        self.last_iter = Some(Instant::now());
        Ok(())
    }

    fn run_loop(&mut self) -> WorkerOutcome {
        let budget = self.spec.update.iterations;
        loop {
            if budget >= 0 && self.iterations >= budget as u64 {
                return WorkerOutcome::Finished;
            }
            if self.env.cancel.is_cancelled() {
                return WorkerOutcome::Cancelled;
            }
            self.pace();
            if self.env.cancel.is_cancelled() {
                return WorkerOutcome::Cancelled;
            }

            let flow = self.step();
            self.iterations += 1;
            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Complete) => return WorkerOutcome::Completed,
                Ok(Flow::Cancelled) => return WorkerOutcome::Cancelled,
                Err(e) => {
                    tracing::error!(error = %e, iteration = self.iterations, "iteration failed");
                    return WorkerOutcome::Failed(e.to_string());
                }
            }

            if self.stat.window_elapsed() {
                self.stat.dump(self.spec.display_name());
                self.stat.clear();
            }
        }
    }

    /// Sleep off whatever remains of the latency since the previous iteration started.
    fn pace(&mut self) {
        let Some(latency) = self.spec.update.latency() else {
            return;
        };
        if let Some(last) = self.last_iter {
            let elapsed = last.elapsed();
            if elapsed < latency {
                std::thread::sleep(latency - elapsed);
            }
        }
        self.last_iter = Some(Instant::now());
    }

    fn step(&mut self) -> StrobeResult<Flow> {
        let decision = self.schedule.tick();
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| StrobeError::surface("worker has no surface"))?;

        if decision.needs_transaction() {
            let mut txn = Transaction::new();
            if decision.position_changed {
                let (left, top) = self.schedule.position();
                txn.push(SurfaceOp::SetPosition { left, top });
                self.stat.positions += 1;
            }
            if decision.size_changed {
                let (width, height) = self.schedule.size();
                txn.push(SurfaceOp::SetSize { width, height });
                self.stat.sizes += 1;
            }
            match decision.visibility {
                VisibilitySignal::Show => {
                    txn.push(SurfaceOp::Show);
                    self.stat.visibility += 1;
                }
                VisibilitySignal::Hide => {
                    txn.push(SurfaceOp::Hide);
                    self.stat.visibility += 1;
                }
                VisibilitySignal::NoChange => {}
            }

            let t0 = Instant::now();
            surface.apply(&txn)?;
            self.stat.transactions.record(t0.elapsed());
            self.transactions += 1;
        }

        if !decision.paint {
            return Ok(Flow::Continue);
        }

        let (w, h) = self.schedule.size();
        let t0 = Instant::now();
        let painted = self.content.paint(PaintCtx {
            spec: &self.spec,
            surface: surface.as_mut(),
            size: (w.max(0) as u32, h.max(0) as u32),
            cancel: &self.env.cancel,
        })?;
        self.stat.updates.record(t0.elapsed());

        Ok(match painted {
            PaintOutcome::Painted => {
                self.paints += 1;
                Flow::Continue
            }
            PaintOutcome::Completed => Flow::Complete,
            PaintOutcome::Cancelled => Flow::Cancelled,
        })
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("state", &self.state)
            .field("content", &self.content.kind())
            .field("surface", &self.surface_id())
            .field("iterations", &self.iterations)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/worker/worker.rs"]
mod tests;
