use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::intake::{IntakeRequest, SubmitAck};
use crate::scheduler::{Job, JobQueue};
use crate::worker::executor::{self, ExecutionReport};

/// The scheduling core: owns the shared job queue and runs the intake and
/// dispatch loops against it.
///
/// The queue is the only shared mutable state. Every access goes through
/// the single `RwLock` here; neither loop holds it across a suspension
/// point (the dispatch sleep, the child wait, the intake channel wait).
pub struct Node {
    pub config: SchedulerConfig,
    pub job_queue: Arc<RwLock<JobQueue>>,
    intake_rx: mpsc::Receiver<IntakeRequest>,
    results_tx: mpsc::Sender<ExecutionReport>,
}

impl Node {
    /// Build a node together with its two channel endpoints: the sender
    /// the submission frontend feeds requests into, and the receiver the
    /// execution result sink drains.
    pub fn new(
        config: SchedulerConfig,
    ) -> (
        Self,
        mpsc::Sender<IntakeRequest>,
        mpsc::Receiver<ExecutionReport>,
    ) {
        let (intake_tx, intake_rx) = mpsc::channel(config.channel_buffer);
        let (results_tx, results_rx) = mpsc::channel(config.channel_buffer);

        let node = Self {
            config,
            job_queue: Arc::new(RwLock::new(JobQueue::new())),
            intake_rx,
            results_tx,
        };

        (node, intake_tx, results_rx)
    }

    /// Run the node until the shutdown token fires.
    ///
    /// Spawns the two control loops:
    /// 1. The intake loop, servicing submit/list/cancel requests
    /// 2. The dispatch loop, moving ready jobs into execution tasks
    ///
    /// Execution tasks are spawned by the dispatch loop as jobs become
    /// ready and are not tracked here; whatever is still running when the
    /// token fires is abandoned.
    pub async fn run(self, shutdown: CancellationToken) {
        let intake_queue = self.job_queue.clone();
        let intake_shutdown = shutdown.clone();
        let intake_rx = self.intake_rx;
        tokio::spawn(async move {
            Self::intake_loop(intake_queue, intake_rx, intake_shutdown).await;
        });

        let dispatch_queue = self.job_queue.clone();
        let dispatch_shutdown = shutdown.clone();
        let dispatch_config = self.config.clone();
        let results_tx = self.results_tx.clone();
        tokio::spawn(async move {
            Self::dispatch_loop(dispatch_queue, results_tx, dispatch_config, dispatch_shutdown)
                .await;
        });

        shutdown.cancelled().await;
    }

    /// Intake loop servicing requests from the submission frontend.
    ///
    /// Each request is handled to completion before the next is read:
    /// - `Submit`: validate, stamp the submit time, insert in sorted position
    /// - `List`: reply with an ordered snapshot of the queue
    /// - `CancelHead`: remove and return the head job without executing it
    ///
    /// A rejected submission is reported back through its reply channel
    /// and never aborts the loop.
    async fn intake_loop(
        job_queue: Arc<RwLock<JobQueue>>,
        mut intake_rx: mpsc::Receiver<IntakeRequest>,
        shutdown: CancellationToken,
    ) {
        loop {
            let request = tokio::select! {
                _ = shutdown.cancelled() => break,
                request = intake_rx.recv() => match request {
                    Some(request) => request,
                    // All frontends dropped their senders
                    None => break,
                },
            };

            match request {
                IntakeRequest::Submit {
                    command,
                    start_delay_secs,
                    reply,
                } => {
                    let accepted = match Job::new(command, start_delay_secs) {
                        Ok(job) => {
                            let ack = SubmitAck {
                                job_id: job.id,
                                ready_time: job.ready_time(),
                            };
                            tracing::info!(
                                job_id = %job.id,
                                command = %job.command.join(" "),
                                start_delay_secs,
                                "Job queued"
                            );
                            job_queue.write().await.insert(job);
                            Ok(ack)
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Submission rejected");
                            Err(e)
                        }
                    };
                    let _ = reply.send(accepted);
                }
                IntakeRequest::List { reply } => {
                    let jobs = job_queue.read().await.ordered_jobs();
                    let _ = reply.send(jobs);
                }
                IntakeRequest::CancelHead { reply } => {
                    let cancelled = job_queue.write().await.remove_head();
                    if let Some(job) = &cancelled {
                        tracing::info!(job_id = %job.id, "Head job cancelled before dispatch");
                    }
                    let _ = reply.send(cancelled);
                }
            }
        }

        tracing::debug!("Intake loop stopped");
    }

    /// Dispatch loop moving ready jobs into execution tasks.
    ///
    /// Compares "now" against the head's ready time under one lock
    /// acquisition, so a concurrent cancel can never make it remove a job
    /// whose ready time is still in the future. A dispatched job is handed
    /// to a fresh task and the new head is re-evaluated immediately; an
    /// empty or not-yet-ready queue is re-checked after the polling
    /// interval. Coarse polling is intentional: dispatch latency is
    /// bounded by the interval, not by a precise timer.
    async fn dispatch_loop(
        job_queue: Arc<RwLock<JobQueue>>,
        results_tx: mpsc::Sender<ExecutionReport>,
        config: SchedulerConfig,
        shutdown: CancellationToken,
    ) {
        let limiter = config.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let now = Utc::now();
            let due = {
                let mut queue = job_queue.write().await;
                match queue.peek_head_ready_time() {
                    Some(ready_time) if ready_time <= now => queue.remove_head(),
                    _ => None,
                }
            };

            match due {
                Some(job) => {
                    tracing::info!(
                        job_id = %job.id,
                        command = %job.command.join(" "),
                        "Dispatching job"
                    );

                    let permit = match &limiter {
                        Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                        None => None,
                    };
                    let results_tx = results_tx.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        let report = executor::execute(job).await;
                        if results_tx.send(report).await.is_err() {
                            tracing::warn!("Result sink closed, execution report dropped");
                        }
                    });
                }
                None => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(config.poll_interval) => {}
                    }
                }
            }
        }

        tracing::debug!("Dispatch loop stopped");
    }
}
