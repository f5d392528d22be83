//! Device boundary: the capture device and the live stream it hands out.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use super::classifier::FrameSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub video: bool,
    pub audio: bool,
}

impl CaptureConstraints {
    pub fn video_and_audio(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            video: true,
            audio: true,
        }
    }
}

/// Acquisition failures. The `Display` text is what the host shows the
/// candidate, so keep it readable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Camera or microphone permission was denied. Allow access and try again.")]
    PermissionDenied,
    #[error("No camera or microphone was found.")]
    NotFound,
    #[error("The camera is already in use by another application.")]
    Busy,
    #[error("Unable to access camera: {0}")]
    Other(String),
}

impl From<&std::io::Error> for DeviceError {
    fn from(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => DeviceError::NotFound,
            std::io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied,
            _ => DeviceError::Other(err.to_string()),
        }
    }
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, constraints: CaptureConstraints) -> Result<Box<dyn MediaStream>, DeviceError>;
}

/// A live capture stream. Owned by exactly one session at a time.
pub trait MediaStream: Send {
    /// Native video dimensions; `(0, 0)` while no frame is available.
    fn dimensions(&self) -> (u32, u32);

    /// Render the frame that is current right now.
    fn current_frame(&mut self) -> Result<FrameSample>;

    /// Stop every track and release the hardware. Must be idempotent.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Stream handle shared between the session and its sampling task. Frame
/// reads happen on blocking threads, hence the std mutex.
#[derive(Clone)]
pub struct SharedStream(Arc<Mutex<Box<dyn MediaStream>>>);

impl SharedStream {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self(Arc::new(Mutex::new(stream)))
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Box<dyn MediaStream>>> {
        self.0.lock().map_err(|_| anyhow!("media stream lock poisoned"))
    }

    /// Stops tracks even if a reader panicked while holding the lock.
    pub fn stop(&self) {
        let mut guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.stop();
    }
}
