//! Dispatcher Module
//!
//! Asynchronous delivery of commands to the engine.
//!
//! ## Architecture
//! - Bounded crossbeam channel as the intake queue
//! - Fixed pool of worker threads executing commands against the engine
//! - One reply channel per submission; each resolves exactly once
//!
//! Dropping a [`Pending`] only suppresses delivery. A command that has been
//! queued always runs to completion.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, TableError};
use crate::protocol::{Command, Outcome};

/// A queued command and where to send its result
struct Job {
    command: Command,
    reply: Sender<Result<Outcome>>,
}

/// Worker pool executing commands against a shared engine
pub struct Dispatcher {
    engine: Arc<Engine>,
    intake: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Start the worker pool described by the engine's config
    pub fn start(engine: Arc<Engine>) -> Result<Self> {
        let config: Config = engine.config().clone();
        let (intake, jobs) = channel::bounded::<Job>(config.dispatch_queue_depth);

        let mut workers = Vec::with_capacity(config.dispatch_workers);
        for id in 0..config.dispatch_workers {
            let engine = Arc::clone(&engine);
            let jobs = jobs.clone();
            let handle = thread::Builder::new()
                .name(format!("tablekv-worker-{}", id))
                .spawn(move || worker_loop(id, engine, jobs))
                .map_err(|e| TableError::Dispatch(format!("failed to spawn worker: {}", e)))?;
            workers.push(handle);
        }

        tracing::debug!(
            "Dispatcher started with {} workers, queue depth {}",
            config.dispatch_workers,
            config.dispatch_queue_depth
        );

        Ok(Self {
            engine,
            intake: Mutex::new(Some(intake)),
            workers: Mutex::new(workers),
        })
    }

    /// Queue a command; blocks while the queue is full
    pub fn submit(&self, command: Command) -> Result<Pending> {
        // Clone the sender so a full queue never blocks shutdown()
        let intake = self.intake.lock().clone().ok_or(TableError::Shutdown)?;

        let (reply, result) = channel::bounded(1);
        intake
            .send(Job { command, reply })
            .map_err(|_| TableError::Shutdown)?;

        Ok(Pending { result })
    }

    /// Submit and wait for the result
    pub fn call(&self, command: Command) -> Result<Outcome> {
        self.submit(command)?.wait()
    }

    /// The engine behind this dispatcher
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Stop accepting commands, drain the queue and join the workers
    pub fn shutdown(&self) {
        if self.intake.lock().take().is_none() {
            return;
        }

        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in workers {
            if handle.join().is_err() {
                tracing::warn!("Dispatcher worker panicked");
            }
        }
        tracing::debug!("Dispatcher stopped");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(id: usize, engine: Arc<Engine>, jobs: Receiver<Job>) {
    // Ends once every sender is gone and the queue is drained
    for job in jobs.iter() {
        let result = engine.execute(job.command);
        if job.reply.send(result).is_err() {
            tracing::trace!("Worker {}: caller dropped pending result", id);
        }
    }
}

/// A submitted command whose result has not been collected yet
pub struct Pending {
    result: Receiver<Result<Outcome>>,
}

impl Pending {
    /// Block until the result arrives
    pub fn wait(self) -> Result<Outcome> {
        self.result.recv().map_err(|_| TableError::Shutdown)?
    }

    /// Block until the result arrives or `timeout` elapses
    ///
    /// On timeout the command still completes; its result is discarded.
    pub fn wait_timeout(self, timeout: Duration) -> Result<Outcome> {
        match self.result.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(TableError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(TableError::Shutdown),
        }
    }

    /// Non-blocking check; returns the pending handle back if not ready
    pub fn try_wait(self) -> std::result::Result<Result<Outcome>, Pending> {
        match self.result.try_recv() {
            Ok(result) => Ok(result),
            Err(channel::TryRecvError::Empty) => Err(self),
            Err(channel::TryRecvError::Disconnected) => Ok(Err(TableError::Shutdown)),
        }
    }
}
