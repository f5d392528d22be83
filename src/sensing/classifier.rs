//! Pixel-statistics presence heuristic.
//!
//! This is deliberately not a trained detector: it samples the middle half
//! of the frame, counts skin-tone-like pixels and checks that the scene is
//! neither too dark nor blown out. Results must stay bit-for-bit
//! deterministic for a given frame.

use anyhow::{bail, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// A single sampled frame, owned by the classifier for one pass.
pub type FrameSample = RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PresenceThresholds {
    /// Skin-tone pixels / sampled pixels must be strictly above this.
    pub min_skin_ratio: f64,
    /// Exclusive bounds on the mean brightness of the sampled region.
    pub min_brightness: f64,
    pub max_brightness: f64,
}

impl Default for PresenceThresholds {
    fn default() -> Self {
        Self {
            min_skin_ratio: 0.05,
            min_brightness: 30.0,
            max_brightness: 240.0,
        }
    }
}

impl PresenceThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.min_skin_ratio) {
            bail!("min_skin_ratio must be within [0, 1), got {}", self.min_skin_ratio);
        }
        if self.min_brightness >= self.max_brightness {
            bail!(
                "min_brightness ({}) must be below max_brightness ({})",
                self.min_brightness,
                self.max_brightness
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceReading {
    pub face_detected: bool,
    pub average_brightness: f64,
    pub skin_tone_ratio: f64,
    pub sampled_pixels: u64,
}

/// Sub-rectangle `(x, y, width, height)` covering 25%..75% of both axes.
pub fn center_region(width: u32, height: u32) -> (u32, u32, u32, u32) {
    (width / 4, height / 4, width / 2, height / 2)
}

fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    r > 60 && g > 40 && b > 20 && r > g && r > b && (r - g).abs() > 15 && r - b > 15
}

/// Classify one frame. Errors only when the frame is too small to yield a
/// center region; callers treat that like any other failed tick.
pub fn classify_frame(frame: &FrameSample, thresholds: &PresenceThresholds) -> Result<PresenceReading> {
    let (x0, y0, region_w, region_h) = center_region(frame.width(), frame.height());
    if region_w == 0 || region_h == 0 {
        bail!(
            "frame {}x{} too small to sample a center region",
            frame.width(),
            frame.height()
        );
    }

    let mut total_brightness = 0.0f64;
    let mut skin_pixels: u64 = 0;

    for y in y0..y0 + region_h {
        for x in x0..x0 + region_w {
            let [r, g, b, _] = frame.get_pixel(x, y).0;
            total_brightness += (r as f64 + g as f64 + b as f64) / 3.0;
            if is_skin_tone(r, g, b) {
                skin_pixels += 1;
            }
        }
    }

    let sampled_pixels = region_w as u64 * region_h as u64;
    let average_brightness = total_brightness / sampled_pixels as f64;
    let skin_tone_ratio = skin_pixels as f64 / sampled_pixels as f64;

    let face_detected = skin_tone_ratio > thresholds.min_skin_ratio
        && average_brightness > thresholds.min_brightness
        && average_brightness < thresholds.max_brightness;

    Ok(PresenceReading {
        face_detected,
        average_brightness,
        skin_tone_ratio,
        sampled_pixels,
    })
}
