//! Concurrent worker orchestration and ghost retention.
//!
//! [`WorkerManager::run`] starts one thread per surface spec and blocks until every one of them
//! has terminated. Each worker thread signals its id on a completion channel exactly once when it
//! exits, whether it finished, failed, or panicked. The manager joins every signalled worker and
//! either discards it (releasing its surface) or keeps it as a ghost when its spec asks for
//! keep-alive. Ghosts stay on screen, frozen on their last frame, until the manager is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::backend::Compositor;
use crate::plugin::PluginLoader;
use crate::spec::model::SurfaceSpec;
use crate::worker::cancel::CancelToken;
use crate::worker::{Worker, WorkerEnv, WorkerId, WorkerOutcome, WorkerReport};

/// Per-run summary, in termination order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub workers: Vec<WorkerReport>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.workers.iter().filter(|w| w.outcome.is_error()).count()
    }

    pub fn retained(&self) -> usize {
        self.workers.iter().filter(|w| w.retained).count()
    }

    pub fn get(&self, name: &str) -> Option<&WorkerReport> {
        self.workers.iter().find(|w| w.name == name)
    }
}

/// Sends the worker id on drop, so a worker thread signals once on every exit path.
struct ExitSignal {
    id: WorkerId,
    tx: mpsc::Sender<WorkerId>,
}

impl Drop for ExitSignal {
    fn drop(&mut self) {
        // The manager only stops listening once every worker is joined.
        let _ = self.tx.send(self.id);
    }
}

pub struct WorkerManager {
    env: WorkerEnv,
    retained: Vec<Worker>,
    next_id: usize,
}

impl WorkerManager {
    pub fn new(compositor: Arc<dyn Compositor>, plugins: Arc<dyn PluginLoader>) -> Self {
        Self {
            env: WorkerEnv {
                compositor,
                plugins,
                cancel: CancelToken::new(),
            },
            retained: Vec::new(),
            next_id: 0,
        }
    }

    /// Token that stops every worker of this manager at its next checkpoint.
    pub fn cancel_token(&self) -> CancelToken {
        self.env.cancel.clone()
    }

    /// Terminated keep-alive workers still holding their surfaces.
    pub fn retained(&self) -> &[Worker] {
        &self.retained
    }

    /// Release all ghosts now, returning how many were held.
    pub fn release_retained(&mut self) -> usize {
        let n = self.retained.len();
        if n > 0 {
            tracing::debug!(ghosts = n, "releasing retained surfaces");
        }
        self.retained.clear();
        n
    }

    /// Run one worker per spec concurrently and wait for all of them.
    ///
    /// Worker failures never abort the run; they only show up in the report and the logs.
    #[tracing::instrument(skip_all, fields(workers = specs.len()))]
    pub fn run(&mut self, specs: Vec<SurfaceSpec>) -> RunReport {
        let mut report = RunReport::default();
        let (tx, rx) = mpsc::channel::<WorkerId>();

        thread::scope(|scope| {
            let mut active = BTreeMap::new();

            for spec in specs {
                let id = WorkerId(self.next_id);
                self.next_id += 1;

                let mut worker = Worker::new(id, Arc::new(spec), self.env.clone());
                let name = worker.name().to_string();
                let exit = ExitSignal { id, tx: tx.clone() };
                let spawned = thread::Builder::new()
                    .name(thread_name(&name))
                    .spawn_scoped(scope, move || {
                        let _exit = exit;
                        worker.run();
                        worker
                    });

                match spawned {
                    Ok(handle) => {
                        tracing::debug!(surface = %name, worker = id.0, "worker spawned");
                        active.insert(id, (name, handle));
                    }
                    Err(e) => {
                        tracing::error!(surface = %name, error = %e, "unable to spawn worker thread");
                        report.workers.push(lost_worker(
                            id,
                            name,
                            WorkerOutcome::StartFailed(format!("thread spawn failed: {e}")),
                        ));
                    }
                }
            }
            drop(tx);

            while !active.is_empty() {
                tracing::debug!(active = active.len(), "waiting for workers");
                let Ok(first) = rx.recv() else {
                    tracing::error!(active = active.len(), "completion channel closed early");
                    break;
                };
                for id in std::iter::once(first).chain(rx.try_iter()) {
                    if let Some((name, handle)) = active.remove(&id) {
                        let joined = handle.join().map_err(|_| name);
                        self.settle(id, joined, &mut report);
                    }
                }
            }

            for (id, (name, handle)) in std::mem::take(&mut active) {
                let joined = handle.join().map_err(|_| name);
                self.settle(id, joined, &mut report);
            }
        });

        tracing::info!(
            workers = report.workers.len(),
            failed = report.failed(),
            ghosts = self.retained.len(),
            "all workers terminated"
        );
        report
    }

    /// Record a joined worker and keep it as a ghost if its spec asks for it.
    fn settle(&mut self, id: WorkerId, joined: Result<Worker, String>, report: &mut RunReport) {
        let worker = match joined {
            Ok(worker) => worker,
            Err(name) => {
                tracing::error!(surface = %name, worker = id.0, "worker thread panicked");
                report.workers.push(lost_worker(
                    id,
                    name,
                    WorkerOutcome::Failed("worker thread panicked".to_string()),
                ));
                return;
            }
        };

        let keep = worker.spec().keep_alive;
        let entry = worker.report(keep);
        tracing::info!(
            surface = %entry.name,
            outcome = ?entry.outcome,
            iterations = entry.iterations,
            paints = entry.paints,
            "worker terminated"
        );
        report.workers.push(entry);

        if keep {
            tracing::debug!(surface = %worker.name(), "retaining ghost");
            self.retained.push(worker);
        }
    }
}

/// Worker thread name for a surface. std rejects interior NUL bytes in thread names.
fn thread_name(surface: &str) -> String {
    format!("strobe-{}", surface.replace('\0', "\u{fffd}"))
}

fn lost_worker(id: WorkerId, name: String, outcome: WorkerOutcome) -> WorkerReport {
    WorkerReport {
        id,
        name,
        outcome,
        iterations: 0,
        paints: 0,
        transactions: 0,
        retained: false,
    }
}

impl Drop for WorkerManager {
    fn drop(&mut self) {
        self.release_retained();
    }
}
