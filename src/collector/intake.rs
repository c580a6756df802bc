use anyhow::{Result, anyhow};
use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::schema::{Item, ResultCollection};

/// Messages accepted by the collector task.
///
/// Both variants travel through the same FIFO channel, so a `Stop`
/// sent after every worker has returned is always behind the last
/// `Submit`.
#[derive(Debug)]
pub enum CollectorMessage {
    /// Append one item to the result collection
    Submit(Item),

    /// Stop accepting items and hand the collection back on the ack
    Stop(oneshot::Sender<ResultCollection>),
}

/// Cloneable submission side handed to every partition worker.
///
/// `submit` waits while the channel is full; that wait is the
/// backpressure workers see when the collector falls behind.
#[derive(Debug, Clone)]
pub struct Intake {
    tx: mpsc::Sender<CollectorMessage>,
}

impl Intake {
    pub async fn submit(&self, item: Item) -> Result<()> {
        self.tx
            .send(CollectorMessage::Submit(item))
            .await
            .map_err(|_| anyhow!("collector is no longer accepting items"))
    }
}

/// ============================================================
/// Collector
/// ============================================================
///
/// Single-writer owner of the result collection.
///
/// GUARANTEES:
/// - Only the collector task mutates the collection
/// - Items are appended in arrival order
/// - After `stop` returns, nothing is appended again
///
pub struct Collector {
    tx: mpsc::Sender<CollectorMessage>,
    task: JoinHandle<()>,
}

impl Collector {
    /// Spawns the collector task with a bounded intake of `capacity`.
    pub fn spawn(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(run(rx));
        Self { tx, task }
    }

    pub fn intake(&self) -> Intake {
        Intake {
            tx: self.tx.clone(),
        }
    }

    /// Sends `Stop` and waits for the acknowledgment.
    ///
    /// IMPORTANT:
    /// Call only after every worker holding an `Intake` has finished,
    /// otherwise late submissions are rejected.
    pub async fn stop(self) -> Result<ResultCollection> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.tx
            .send(CollectorMessage::Stop(ack_tx))
            .await
            .map_err(|_| anyhow!("collector task exited before stop"))?;

        let items = ack_rx
            .await
            .map_err(|_| anyhow!("collector dropped the stop acknowledgment"))?;

        self.task.await?;
        Ok(items)
    }
}

async fn run(mut rx: mpsc::Receiver<CollectorMessage>) {
    let mut items = ResultCollection::new();

    while let Some(msg) = rx.recv().await {
        match msg {
            CollectorMessage::Submit(item) => items.push(item),

            CollectorMessage::Stop(ack) => {
                rx.close();
                debug!("collector stopping with {} items", items.len());
                if ack.send(items).is_err() {
                    warn!("collector stop requester went away before the ack");
                }
                return;
            }
        }
    }

    // Every sender dropped without a Stop; nobody can read the items.
    warn!("collector intake closed without stop, {} items discarded", items.len());
}
