//! Write visibility control.
//!
//! Every mutation carries a `durable` flag. Durable writes are applied
//! inline by the caller and are visible before the call returns. Eventual
//! writes are handed to a single applier thread through a FIFO queue: the
//! call returns immediately with a `WriteReceipt`, and the mutation becomes
//! visible when the thread reaches it.
//!
//! One thread draining one queue preserves submission order globally, and
//! therefore per row. The receipt carries an acknowledgment channel so a
//! caller who needs a deterministic visibility point can `wait()` instead of
//! sleeping; dropping the receipt is the fire-and-forget mode.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::db::Table;
use crate::mutation::{self, RowMutation};
use crate::statistics::Statistics;
use crate::util::{Result, Status};

/// Completion signal for one mutation.
///
/// For a durable write the mutation is already applied when the receipt is
/// handed out and `wait` returns immediately. For an eventual write, `wait`
/// blocks until the applier thread has applied the mutation.
#[derive(Debug)]
pub struct WriteReceipt {
    ack: Option<Receiver<()>>,
}

impl WriteReceipt {
    pub(crate) fn applied() -> Self {
        WriteReceipt { ack: None }
    }

    pub(crate) fn pending(ack: Receiver<()>) -> Self {
        WriteReceipt { ack: Some(ack) }
    }

    /// Was the mutation already applied when this receipt was issued?
    pub fn is_applied(&self) -> bool {
        self.ack.is_none()
    }

    /// Block until the mutation is visible to reads.
    pub fn wait(self) {
        if let Some(ack) = self.ack {
            // A closed channel means the applier already shut down after
            // draining its queue, which also implies the write was applied.
            let _ = ack.recv();
        }
    }
}

struct Job {
    table: Arc<Table>,
    mutation: RowMutation,
    ack: Sender<()>,
}

/// Background applier: one thread, one FIFO queue.
pub struct WriteApplier {
    queue: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WriteApplier {
    pub fn start(statistics: Arc<Statistics>) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let worker = std::thread::Builder::new()
            .name("colfam-applier".to_string())
            .spawn(move || Self::run(rx, statistics))
            .map_err(|e| Status::corruption(format!("failed to spawn applier thread: {e}")))?;

        Ok(WriteApplier {
            queue: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    fn run(queue: Receiver<Job>, statistics: Arc<Statistics>) {
        while let Ok(job) = queue.recv() {
            match mutation::apply(&job.table, &job.mutation) {
                Ok(()) => {
                    statistics.record_applied();
                    trace!(table = job.table.name(), "applied queued mutation");
                }
                Err(status) => {
                    // Paths are validated before enqueueing, so this only
                    // fires for mutations built outside the store boundary.
                    warn!(table = job.table.name(), %status, "queued mutation rejected");
                }
            }
            let _ = job.ack.send(());
        }
        debug!("applier queue closed; worker exiting");
    }

    /// Enqueue a mutation for eventual application.
    pub fn submit(&self, table: Arc<Table>, mutation: RowMutation) -> WriteReceipt {
        let (ack_tx, ack_rx) = mpsc::channel();
        let sender = self.queue.lock().clone();
        match sender {
            Some(sender) => {
                let job = Job {
                    table,
                    mutation,
                    ack: ack_tx,
                };
                if sender.send(job).is_err() {
                    warn!("applier is shut down; eventual write dropped");
                }
            }
            None => warn!("applier is shut down; eventual write dropped"),
        }
        WriteReceipt::pending(ack_rx)
    }

    /// Close the queue and join the worker after it drains pending jobs.
    pub fn shutdown(&self) {
        drop(self.queue.lock().take());
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for WriteApplier {
    fn drop(&mut self) {
        self.shutdown();
    }
}
