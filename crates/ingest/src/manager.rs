use std::sync::Arc;

use log::debug;
use tokio::sync::{mpsc, Mutex};

use crate::{IndexOutcome, Pipeline, Record};

/// The bounded worker pool.
///
/// Queue capacity equals the worker count; when every worker is busy and the
/// queue is full, [`feed`](IndexerManager::feed) blocks the producer. That is
/// the system's only backpressure mechanism; records are never dropped for
/// queue-full reasons.
pub struct IndexerManager {
    tx: mpsc::Sender<Record>,
}

impl IndexerManager {
    /// Spawn `workers` long-lived worker tasks pulling from one shared queue.
    /// Workers run until the manager is dropped and the queue drains.
    pub fn start(pipeline: Pipeline, workers: usize) -> Self {
        let workers = workers.max(1);
        let (tx, rx) = mpsc::channel(workers);
        let rx = Arc::new(Mutex::new(rx));
        let pipeline = Arc::new(pipeline);

        for id in 0..workers {
            tokio::spawn(worker_loop(id, Arc::clone(&rx), Arc::clone(&pipeline)));
        }

        Self { tx }
    }

    /// Enqueue one record, waiting for queue space when full.
    pub async fn feed(&self, record: Record) {
        if self.tx.send(record).await.is_err() {
            debug!("queue closed; record discarded");
        }
    }
}

async fn worker_loop(id: usize, rx: Arc<Mutex<mpsc::Receiver<Record>>>, pipeline: Arc<Pipeline>) {
    loop {
        // Hold the receiver lock only while dequeuing, never while processing.
        let record = { rx.lock().await.recv().await };
        let Some(record) = record else {
            break;
        };

        let path = record.path().to_string();
        match pipeline.process(record).await {
            IndexOutcome::Indexed => debug!("worker {id}: indexed {path}"),
            IndexOutcome::Dropped(reason) => debug!("worker {id}: dropped {path} ({reason:?})"),
        }
        // The record and its body buffer are gone here, before the next
        // dequeue, which bounds peak memory across back-to-back large files.
    }
    debug!("worker {id}: queue closed, exiting");
}
