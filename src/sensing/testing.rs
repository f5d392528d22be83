//! Scripted capture device for exercising sessions without hardware.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};

use super::{
    camera::{CameraDevice, CaptureConstraints, DeviceError, MediaStream},
    classifier::{center_region, FrameSample},
};

pub const FRAME_WIDTH: u32 = 64;
pub const FRAME_HEIGHT: u32 = 48;

/// Black border with a skin-toned center block.
pub fn face_frame() -> FrameSample {
    let mut frame = RgbaImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgba([0, 0, 0, 255]));
    let (x0, y0, w, h) = center_region(FRAME_WIDTH, FRAME_HEIGHT);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            frame.put_pixel(x, y, Rgba([200, 150, 120, 255]));
        }
    }
    frame
}

pub fn empty_frame() -> FrameSample {
    RgbaImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgba([0, 0, 0, 255]))
}

#[derive(Default)]
struct Script {
    queued: VecDeque<FrameSample>,
    last: Option<FrameSample>,
    open_errors: VecDeque<DeviceError>,
    failing_reads: u32,
    opens: u32,
    stops: u32,
    live: u32,
}

/// Frames are served from a queue; once it drains the last frame repeats.
#[derive(Clone, Default)]
pub struct ScriptedCamera {
    script: Arc<Mutex<Script>>,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(frames: impl IntoIterator<Item = FrameSample>) -> Self {
        let camera = Self::new();
        for frame in frames {
            camera.push_frame(frame);
        }
        camera
    }

    pub fn push_frame(&self, frame: FrameSample) {
        self.script.lock().unwrap().queued.push_back(frame);
    }

    pub fn fail_next_open(&self, err: DeviceError) {
        self.script.lock().unwrap().open_errors.push_back(err);
    }

    pub fn fail_next_reads(&self, count: u32) {
        self.script.lock().unwrap().failing_reads = count;
    }

    pub fn opens(&self) -> u32 {
        self.script.lock().unwrap().opens
    }

    pub fn stops(&self) -> u32 {
        self.script.lock().unwrap().stops
    }

    /// Streams opened and not yet stopped.
    pub fn live_streams(&self) -> u32 {
        self.script.lock().unwrap().live
    }
}

#[async_trait]
impl CameraDevice for ScriptedCamera {
    async fn open(&self, _constraints: CaptureConstraints) -> Result<Box<dyn MediaStream>, DeviceError> {
        let mut script = self.script.lock().unwrap();
        if let Some(err) = script.open_errors.pop_front() {
            return Err(err);
        }
        script.opens += 1;
        script.live += 1;
        Ok(Box::new(ScriptedStream {
            script: Arc::clone(&self.script),
            live: true,
        }))
    }
}

struct ScriptedStream {
    script: Arc<Mutex<Script>>,
    live: bool,
}

impl MediaStream for ScriptedStream {
    fn dimensions(&self) -> (u32, u32) {
        let script = self.script.lock().unwrap();
        script
            .queued
            .front()
            .or(script.last.as_ref())
            .map(|frame| (frame.width(), frame.height()))
            .unwrap_or((0, 0))
    }

    fn current_frame(&mut self) -> Result<FrameSample> {
        let mut script = self.script.lock().unwrap();
        if script.failing_reads > 0 {
            script.failing_reads -= 1;
            bail!("scripted read failure");
        }
        if let Some(frame) = script.queued.pop_front() {
            script.last = Some(frame);
        }
        match &script.last {
            Some(frame) => Ok(frame.clone()),
            None => bail!("no frame available"),
        }
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            let mut script = self.script.lock().unwrap();
            script.stops += 1;
            script.live -= 1;
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
