use std::{sync::Weak, time::Duration};

use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    camera::SharedStream,
    classifier::PresenceThresholds,
    loop_worker::{sampling_loop, PresenceSink, SamplerSettings},
};

/// Owns the recurring frame-sampling task for one stream.
#[derive(Default)]
pub struct SamplerController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SamplerController {
    pub fn start_sampling(
        &mut self,
        stream: SharedStream,
        sink: Weak<dyn PresenceSink>,
        interval: Duration,
        timeout: Duration,
        thresholds: PresenceThresholds,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("sampling already active");
        }

        let cancel_token = CancellationToken::new();
        let settings = SamplerSettings {
            interval,
            timeout,
            thresholds,
        };

        let handle = tokio::spawn(sampling_loop(stream, sink, settings, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("Frame sampling started every {}ms", interval.as_millis());
        Ok(())
    }

    /// Signal the loop to exit without waiting for it. Safe to call from the
    /// sampling task itself.
    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.handle.take();
    }

    /// Detach the running task so it can be awaited without holding whatever
    /// lock guards this controller.
    pub fn take(&mut self) -> SamplerShutdown {
        SamplerShutdown {
            handle: self.handle.take(),
            cancel_token: self.cancel_token.take(),
        }
    }
}

pub struct SamplerShutdown {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SamplerShutdown {
    pub fn cancel(self) {
        if let Some(token) = self.cancel_token {
            token.cancel();
        }
    }

    pub async fn stop(self) -> Result<()> {
        if let Some(token) = self.cancel_token {
            token.cancel();
        }

        if let Some(handle) = self.handle {
            handle
                .await
                .context("sampling loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
