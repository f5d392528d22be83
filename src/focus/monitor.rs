use anyhow::{Context, Result};
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::proctoring::{ProctoringController, WeakProctoringController};

use super::FocusSource;

/// Forwards events from a [`FocusSource`] into a session. Holds only a weak
/// reference, so dropping the session still releases the camera.
pub struct FocusMonitor {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl FocusMonitor {
    pub fn spawn<S>(controller: &ProctoringController, source: S) -> Self
    where
        S: FocusSource + 'static,
    {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(monitor_loop(
            controller.downgrade(),
            source,
            cancel_token.clone(),
        ));

        Self {
            handle,
            cancel_token,
        }
    }

    /// Resolves once the source closes or the session goes away.
    pub async fn closed(self) -> Result<()> {
        self.handle.await.context("focus monitor task failed to join")
    }

    pub async fn stop(self) -> Result<()> {
        self.cancel_token.cancel();
        self.closed().await
    }
}

async fn monitor_loop<S: FocusSource>(
    controller: WeakProctoringController,
    mut source: S,
    cancel_token: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            event = source.next_event() => event,
        };

        let Some(event) = event else {
            info!("focus source closed");
            break;
        };

        let Some(controller) = controller.upgrade() else {
            break;
        };
        debug!("focus event {event:?}");
        controller.handle_focus_event(event).await;
    }
}
