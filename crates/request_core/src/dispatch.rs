//! Dispatch queue and the single background worker that drains it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use shared::domain::RecordId;
use tracing::{debug, error, info};

use crate::transport::{Exchange, Transport, TransportError, TransportRequest};

/// Where a submitted record currently sits in the pipeline. A record that is
/// neither queued nor in flight has completed (or was never enqueued).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Pending,
    InFlight,
    Completed,
}

#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub id: RecordId,
    pub request: TransportRequest,
}

/// Exactly one of the two shapes per completed record.
#[derive(Debug)]
pub enum Outcome {
    Success(Exchange),
    Failure(TransportError),
}

/// Published by the worker for every dequeued job, success or failure.
#[derive(Debug)]
pub struct Completed {
    pub id: RecordId,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<DispatchJob>,
    worker_alive: bool,
    in_flight: Option<RecordId>,
}

struct DispatchShared {
    state: Mutex<QueueState>,
    transport: Arc<dyn Transport>,
    results_tx: Sender<Completed>,
}

/// FIFO queue with a lazily spawned single consumer. The mutex around
/// `QueueState` is the only synchronization: submission checks-and-sets
/// `worker_alive` under it, and the worker clears the flag under it only
/// after observing the queue empty, so exactly one worker is alive at any
/// time and no job can be stranded.
pub struct Dispatcher {
    shared: Arc<DispatchShared>,
    results_rx: Receiver<Completed>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (results_tx, results_rx) = unbounded();
        Self {
            shared: Arc::new(DispatchShared {
                state: Mutex::new(QueueState::default()),
                transport,
                results_tx,
            }),
            results_rx,
        }
    }

    /// Enqueues a job and spawns the worker if none is draining the queue.
    pub fn enqueue(&self, job: DispatchJob) {
        let record_id = job.id.0;
        let spawn = {
            let mut state = self.shared.state.lock().expect("dispatch state poisoned");
            state.queue.push_back(job);
            if state.worker_alive {
                false
            } else {
                state.worker_alive = true;
                true
            }
        };
        debug!(record_id, spawn, "dispatch: job queued");
        if spawn {
            let shared = Arc::clone(&self.shared);
            thread::spawn(move || run_worker(shared));
        }
    }

    /// Drains everything currently published without blocking.
    pub fn drain_completed(&self) -> Vec<Completed> {
        let mut completed = Vec::new();
        while let Ok(done) = self.results_rx.try_recv() {
            completed.push(done);
        }
        completed
    }

    pub fn phase(&self, id: RecordId) -> RequestPhase {
        let state = self.shared.state.lock().expect("dispatch state poisoned");
        if state.in_flight == Some(id) {
            RequestPhase::InFlight
        } else if state.queue.iter().any(|job| job.id == id) {
            RequestPhase::Pending
        } else {
            RequestPhase::Completed
        }
    }

    pub fn queued_len(&self) -> usize {
        let state = self.shared.state.lock().expect("dispatch state poisoned");
        state.queue.len()
    }

    /// True once the queue is empty and the worker has exited.
    pub fn is_idle(&self) -> bool {
        let state = self.shared.state.lock().expect("dispatch state poisoned");
        state.queue.is_empty() && !state.worker_alive
    }
}

fn run_worker(shared: Arc<DispatchShared>) {
    info!("dispatch: worker starting");
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            // Queued jobs stay put; the next submission retries with a
            // fresh worker.
            error!("dispatch: failed to build worker runtime: {err}");
            let mut state = shared.state.lock().expect("dispatch state poisoned");
            state.worker_alive = false;
            return;
        }
    };

    runtime.block_on(async {
        loop {
            let job = {
                let mut state = shared.state.lock().expect("dispatch state poisoned");
                match state.queue.pop_front() {
                    Some(job) => {
                        state.in_flight = Some(job.id);
                        job
                    }
                    None => {
                        state.worker_alive = false;
                        state.in_flight = None;
                        break;
                    }
                }
            };

            let started = Instant::now();
            let outcome = match shared.transport.send(&job.request).await {
                Ok(exchange) => Outcome::Success(exchange),
                Err(err) => {
                    error!(record_id = job.id.0, "dispatch: transport failure: {err}");
                    Outcome::Failure(err)
                }
            };
            let elapsed = started.elapsed();

            {
                let mut state = shared.state.lock().expect("dispatch state poisoned");
                state.in_flight = None;
            }
            let published = shared.results_tx.send(Completed {
                id: job.id,
                elapsed,
                outcome,
            });
            if published.is_err() {
                // Session dropped; nobody is left to poll.
                let mut state = shared.state.lock().expect("dispatch state poisoned");
                state.worker_alive = false;
                break;
            }
        }
    });
    info!("dispatch: queue empty, worker exiting");
}
