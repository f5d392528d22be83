use std::{ops::ControlFlow, sync::Weak};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{
    camera::SharedStream,
    classifier::{classify_frame, PresenceReading, PresenceThresholds},
};

// Set to false to silence per-tick logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Receives one classification per successful tick. Returning
/// `ControlFlow::Break` ends sampling.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn on_presence(&self, reading: PresenceReading) -> ControlFlow<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerSettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub thresholds: PresenceThresholds,
}

/// Sample the stream every `interval` until cancelled, the sink asks to
/// stop, or the sink has been dropped.
pub async fn sampling_loop(
    stream: SharedStream,
    sink: Weak<dyn PresenceSink>,
    settings: SamplerSettings,
    cancel_token: CancellationToken,
) {
    // First sample one full interval after start, like a browser interval timer.
    let mut ticker = tokio::time::interval_at(Instant::now() + settings.interval, settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("sampling loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let Some(sink) = sink.upgrade() else {
                    log_info!("session dropped; sampling loop exiting");
                    break;
                };

                match sample_with_timeout(&stream, settings.thresholds, settings.timeout).await {
                    Ok(reading) => {
                        if cancel_token.is_cancelled() {
                            break;
                        }
                        if sink.on_presence(reading).await.is_break() {
                            log_info!("sampling loop stopped by session");
                            break;
                        }
                    }
                    Err(err) => log_warn!("frame classification skipped: {err:#}"),
                }
            }
        }
    }
}

pub async fn sample_with_timeout(
    stream: &SharedStream,
    thresholds: PresenceThresholds,
    timeout: Duration,
) -> Result<PresenceReading> {
    match tokio::time::timeout(timeout, sample_stream(stream, thresholds)).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("sample timed out (> {}ms)", timeout.as_millis())),
    }
}

/// Grab the current frame and classify it on a blocking thread. The frame
/// is dropped as soon as classification finishes.
pub async fn sample_stream(stream: &SharedStream, thresholds: PresenceThresholds) -> Result<PresenceReading> {
    let stream = stream.clone();
    let started = Instant::now();

    let reading = tokio::task::spawn_blocking(move || -> Result<PresenceReading> {
        let frame = {
            let mut guard = stream.lock()?;
            if !guard.is_live() {
                return Err(anyhow!("stream is not live"));
            }
            guard.current_frame()?
        };
        classify_frame(&frame, &thresholds)
    })
    .await
    .context("classification worker join failed")??;

    log_debug!(
        "classified frame in {}ms: face={} brightness={:.1} skin={:.3}",
        started.elapsed().as_millis(),
        reading.face_detected,
        reading.average_brightness,
        reading.skin_tone_ratio
    );

    Ok(reading)
}
