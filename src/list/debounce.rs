use super::MovieListController;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Search box front-end for a [`MovieListController`].
///
/// Edits are collapsed until `window` passes with no further input; only the
/// last term of a burst reaches the controller, and a term equal to the last
/// one submitted is dropped. The background task stops when this is dropped.
pub struct SearchInput {
    tx: watch::Sender<String>,
    task: JoinHandle<()>,
}

impl SearchInput {
    pub(super) fn spawn(controller: MovieListController, window: Duration) -> Self {
        let initial = controller.snapshot().query;
        let (tx, rx) = watch::channel(initial.clone());
        let task = tokio::spawn(run(controller, rx, window, initial));
        Self { tx, task }
    }

    pub fn set(&self, term: impl Into<String>) {
        self.tx.send_replace(term.into());
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }
}

impl Drop for SearchInput {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    controller: MovieListController,
    mut rx: watch::Receiver<String>,
    window: Duration,
    initial: String,
) {
    let mut last_submitted = initial;
    loop {
        if rx.changed().await.is_err() {
            return;
        }
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(window) => break,
            }
        }

        let term = rx.borrow_and_update().clone();
        if term == last_submitted {
            debug!("Search term {:?} unchanged, skipping fetch", term);
            continue;
        }
        if controller.search(term.clone()).await {
            last_submitted = term;
        } else {
            debug!("Search for {:?} dropped, a fetch was in flight", term);
        }
    }
}
