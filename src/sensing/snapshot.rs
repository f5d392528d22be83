use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{buffer::ConvertBuffer, codecs::jpeg::JpegEncoder, RgbImage};
use serde::Serialize;

use super::classifier::FrameSample;

/// An encoded still handed to the host for optional audit logging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedFrame {
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl EncodedFrame {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

pub fn encode_jpeg(frame: &FrameSample, quality: u8) -> Result<EncodedFrame> {
    // JPEG has no alpha channel.
    let rgb: RgbImage = frame.convert();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&rgb)
        .context("jpeg encoding failed")?;

    Ok(EncodedFrame {
        mime_type: "image/jpeg",
        width: frame.width(),
        height: frame.height(),
        bytes,
    })
}
