//! Hue/saturation/value thresholding.
//!
//! All three channels are quantised against their own range: hue in whole
//! degrees `[0, 359]`, saturation and value in 8-bit units `[0, 255]`. Bounds
//! are expressed in the same units, so no channel is rescaled differently
//! from another.

use image::{GrayImage, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    /// Degrees, `0..=359`.
    pub h: u16,
    pub s: u8,
    pub v: u8,
}

/// Converts one 8-bit RGB sample.
///
/// Achromatic pixels (max == min) get hue 0.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 {
        (delta * 255.0 / max).round() as u8
    } else {
        0
    };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta) + 120.0
    } else {
        60.0 * ((r - g) / delta) + 240.0
    };
    let h = h.rem_euclid(360.0).round() as u16 % 360;

    Hsv { h, s, v: max as u8 }
}

/// Tunable parameters of the threshold detector.
///
/// `min_hue`/`max_hue` are degrees and nominally live in `[0, 360]`, `epsilon`
/// is the polygon tolerance in pixels, nominally `[0, 100]`. Nothing is
/// validated: an inverted hue range simply selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    pub min_hue: i32,
    pub max_hue: i32,
    pub epsilon: f64,
    pub min_saturation: u8,
    pub max_saturation: u8,
    pub min_value: u8,
    pub max_value: u8,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            min_hue: 130,
            max_hue: 160,
            epsilon: 40.0,
            min_saturation: 0,
            max_saturation: 255,
            min_value: 0,
            max_value: 255,
        }
    }
}

impl ThresholdParams {
    pub fn with_hue(min_hue: i32, max_hue: i32, epsilon: f64) -> ThresholdParams {
        ThresholdParams {
            min_hue,
            max_hue,
            epsilon,
            ..Default::default()
        }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        let h = hsv.h as i32;
        h >= self.min_hue
            && h <= self.max_hue
            && hsv.s >= self.min_saturation
            && hsv.s <= self.max_saturation
            && hsv.v >= self.min_value
            && hsv.v <= self.max_value
    }
}

/// Builds the binary mask: [`MASK_ON`] where the pixel is inside the range.
pub fn hsv_mask(frame: &RgbImage, params: &ThresholdParams) -> GrayImage {
    let data: Vec<u8> = frame
        .as_raw()
        .par_chunks_exact(3)
        .map(|px| {
            if params.contains(rgb_to_hsv([px[0], px[1], px[2]])) {
                MASK_ON
            } else {
                MASK_OFF
            }
        })
        .collect();
    GrayImage::from_raw(frame.width(), frame.height(), data)
        .unwrap_or_else(|| GrayImage::new(frame.width(), frame.height()))
}
