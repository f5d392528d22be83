pub mod camera;
pub mod classifier;
pub mod controller;
pub mod image_sequence;
pub mod loop_worker;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::{CameraDevice, CaptureConstraints, DeviceError, MediaStream, SharedStream};
pub use classifier::{classify_frame, FrameSample, PresenceReading, PresenceThresholds};
pub use controller::SamplerController;
pub use image_sequence::ImageSequenceCamera;
pub use loop_worker::PresenceSink;
pub use snapshot::EncodedFrame;
