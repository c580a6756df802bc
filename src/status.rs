use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use colored::Colorize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::progress::{ProgressSnapshot, ProgressTracker};

enum StatusCommand {
    Stop(oneshot::Sender<ProgressSnapshot>),
}

/// Periodic status line for a running enumeration.
///
/// Renders the shared counters every `every` until stopped. Stopping
/// is a request/acknowledge exchange, same as the collector, and the
/// acknowledgment carries the last rendered snapshot.
pub struct StatusReporter {
    tx: mpsc::Sender<StatusCommand>,
    task: JoinHandle<()>,
}

impl StatusReporter {
    pub fn spawn(module: &'static str, progress: Arc<ProgressTracker>, every: Duration) -> Self {
        Self::spawn_with(progress, every, move |snap| {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "\r{}", render_status(module, &snap));
            let _ = stderr.flush();
        })
    }

    /// Same as `spawn`, with a caller supplied renderer.
    pub fn spawn_with<F>(progress: Arc<ProgressTracker>, every: Duration, mut render: F) -> Self
    where
        F: FnMut(ProgressSnapshot) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    cmd = rx.recv() => {
                        let snap = progress.snapshot();
                        render(snap);
                        if let Some(StatusCommand::Stop(ack)) = cmd {
                            let _ = ack.send(snap);
                        }
                        return;
                    }

                    _ = ticker.tick() => render(progress.snapshot()),
                }
            }
        });

        Self { tx, task }
    }

    /// Requests a final render and waits for the reporter to exit.
    pub async fn stop(self) -> Result<ProgressSnapshot> {
        let (ack_tx, ack_rx) = oneshot::channel();

        self.tx
            .send(StatusCommand::Stop(ack_tx))
            .await
            .map_err(|_| anyhow!("status reporter exited before stop"))?;

        let snap = ack_rx
            .await
            .map_err(|_| anyhow!("status reporter dropped the stop acknowledgment"))?;

        self.task.await?;
        Ok(snap)
    }
}

pub fn render_status(module: &str, snap: &ProgressSnapshot) -> String {
    format!(
        "[{}] Status: {}/{} regions complete ({} errors -- {} executing)",
        module.cyan(),
        snap.complete,
        snap.total,
        snap.errored,
        snap.executing,
    )
}
