//! A camera backed by a directory of still images, played back in file-name
//! order at a fixed frame duration. Used by the `proctor` binary and for
//! replaying recorded sessions.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage, ImageError};
use log::info;

use super::{
    camera::{CameraDevice, CaptureConstraints, DeviceError, MediaStream},
    classifier::FrameSample,
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

pub struct ImageSequenceCamera {
    dir: PathBuf,
    frame_duration: Duration,
    in_use: Arc<AtomicBool>,
}

impl ImageSequenceCamera {
    pub fn new(dir: impl Into<PathBuf>, frame_duration: Duration) -> Self {
        Self {
            dir: dir.into(),
            frame_duration,
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    fn list_frames(&self) -> Result<Vec<PathBuf>, DeviceError> {
        let entries = fs::read_dir(&self.dir).map_err(|err| DeviceError::from(&err))?;
        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| has_image_extension(path))
            .collect();
        frames.sort();
        Ok(frames)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(path: &Path, max_width: u32, max_height: u32) -> Result<FrameSample> {
    let img = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(fit_within(img, max_width, max_height).to_rgba8())
}

/// Downscale (never upscale) to the requested capture resolution, keeping
/// the aspect ratio.
fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        img
    } else {
        img.resize(max_width, max_height, FilterType::Triangle)
    }
}

#[async_trait]
impl CameraDevice for ImageSequenceCamera {
    async fn open(&self, constraints: CaptureConstraints) -> Result<Box<dyn MediaStream>, DeviceError> {
        if !constraints.video {
            return Err(DeviceError::Other("video track is required".into()));
        }

        let frames = self.list_frames()?;
        if frames.is_empty() {
            return Err(DeviceError::NotFound);
        }

        if self
            .in_use
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DeviceError::Busy);
        }

        let first = match load_frame(&frames[0], constraints.width, constraints.height) {
            Ok(frame) => frame,
            Err(err) => {
                self.in_use.store(false, Ordering::SeqCst);
                let device_err = match err.downcast_ref::<ImageError>() {
                    Some(ImageError::IoError(io)) => DeviceError::from(io),
                    _ => DeviceError::Other(format!("{err:#}")),
                };
                return Err(device_err);
            }
        };

        info!(
            "Opened image sequence camera at {} ({} frames, {}x{})",
            self.dir.display(),
            frames.len(),
            first.width(),
            first.height()
        );

        Ok(Box::new(ImageSequenceStream {
            frames,
            frame_duration: self.frame_duration,
            constraints,
            started: Instant::now(),
            cached: Some((0, first)),
            in_use: Arc::clone(&self.in_use),
            live: true,
        }))
    }
}

struct ImageSequenceStream {
    frames: Vec<PathBuf>,
    frame_duration: Duration,
    constraints: CaptureConstraints,
    started: Instant,
    cached: Option<(usize, FrameSample)>,
    in_use: Arc<AtomicBool>,
    live: bool,
}

impl ImageSequenceStream {
    fn index_at(&self, elapsed: Duration) -> usize {
        let period = self.frame_duration.as_millis().max(1);
        (elapsed.as_millis() / period) as usize % self.frames.len()
    }
}

impl MediaStream for ImageSequenceStream {
    fn dimensions(&self) -> (u32, u32) {
        match (&self.cached, self.live) {
            (Some((_, frame)), true) => (frame.width(), frame.height()),
            _ => (0, 0),
        }
    }

    fn current_frame(&mut self) -> Result<FrameSample> {
        if !self.live {
            return Err(anyhow!("stream has been stopped"));
        }

        let index = self.index_at(self.started.elapsed());
        if let Some((cached_index, frame)) = &self.cached {
            if *cached_index == index {
                return Ok(frame.clone());
            }
        }

        let frame = load_frame(&self.frames[index], self.constraints.width, self.constraints.height)?;
        self.cached = Some((index, frame.clone()));
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.cached = None;
            self.in_use.store(false, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for ImageSequenceStream {
    fn drop(&mut self) {
        self.stop();
    }
}
