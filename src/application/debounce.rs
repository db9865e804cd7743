//! Timer-gated coalescing of rapid submissions.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

enum Msg<T> {
    Submit(T),
    Cancel,
    Finish,
}

/// Holds at most one pending value and hands it to the handler once no new
/// value arrived for the quiet period. Each submission restarts the timer and
/// replaces the pending value.
///
/// Dropping the debouncer discards the pending value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Msg<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start the timer task on the current tokio runtime.
    pub fn spawn<F, Fut>(quiet: Duration, handler: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(rx, quiet, handler));
        Self {
            tx,
            task: Some(task),
        }
    }

    /// Returns `false` once the timer task has stopped.
    pub fn submit(&self, value: T) -> bool {
        self.tx.send(Msg::Submit(value)).is_ok()
    }

    /// Discard the pending value, if any.
    pub fn cancel(&self) {
        let _ = self.tx.send(Msg::Cancel);
    }

    /// Hand over the pending value without waiting out the quiet period and
    /// wait for the handler to finish.
    pub async fn finish(mut self) {
        let _ = self.tx.send(Msg::Finish);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<T, F, Fut>(mut rx: mpsc::UnboundedReceiver<Msg<T>>, quiet: Duration, mut handler: F)
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut pending: Option<T> = None;
    loop {
        let Some(value) = pending.take() else {
            match rx.recv().await {
                Some(Msg::Submit(value)) => pending = Some(value),
                Some(Msg::Cancel) => {}
                Some(Msg::Finish) | None => break,
            }
            continue;
        };

        tokio::select! {
            msg = rx.recv() => match msg {
                Some(Msg::Submit(next)) => pending = Some(next),
                Some(Msg::Cancel) => debug!("pending value discarded"),
                Some(Msg::Finish) | None => {
                    handler(value).await;
                    break;
                }
            },
            () = tokio::time::sleep(quiet) => handler(value).await,
        }
    }
}
