use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::capture::backend::CaptureBackend;
use crate::input::RawSnapTarget;

/// Periodically refreshes the list of snappable windows.
///
/// The poll runs on the tokio runtime; the overlay picks up new lists
/// through [`SnapTargetPoller::take_update`] from its own loop. Dropping the
/// poller stops the background task.
pub struct SnapTargetPoller {
    rx: watch::Receiver<Arc<Vec<RawSnapTarget>>>,
    task: JoinHandle<()>,
}

impl SnapTargetPoller {
    pub fn spawn(
        runtime_handle: &tokio::runtime::Handle,
        backend: Arc<dyn CaptureBackend>,
        period: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(Arc::new(Vec::new()));

        let task = runtime_handle.spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let targets = match backend.list_window_snap_targets().await {
                    Ok(targets) => targets,
                    Err(err) => {
                        log::debug!("Window snap target refresh failed: {}", err);
                        Vec::new()
                    }
                };

                let changed = tx.send_if_modified(|current| {
                    if current.as_slice() == targets.as_slice() {
                        false
                    } else {
                        *current = Arc::new(targets);
                        true
                    }
                });
                if changed {
                    log::debug!("Window snap targets updated ({})", tx.borrow().len());
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// Returns the list if it changed since the last call.
    pub fn take_update(&mut self) -> Option<Arc<Vec<RawSnapTarget>>> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }
}

impl Drop for SnapTargetPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
