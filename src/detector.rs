use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::camera::CameraIntrinsics;
use crate::stats::HitRateStats;
use crate::types::RvecTvec;

/// A marker found in one frame: its pose and the four image corners the pose
/// was solved from, in plane-model order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerDetection {
    pub pose: RvecTvec,
    pub corners: [glam::Vec2; 4],
}

/// Given a frame and the camera calibration, try to find one four-corner
/// marker and solve its pose.
///
/// `None` is the normal "nothing this frame" outcome; the consumer must not
/// render anything for that frame.
pub trait MarkerDetector {
    fn detect(&mut self, frame: &RgbImage, camera: &CameraIntrinsics) -> Option<MarkerDetection>;

    fn name(&self) -> &'static str;

    /// Diagnostic counters, for detectors that keep any.
    fn hit_rate(&self) -> Option<HitRateStats> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Colored quadrilateral found by hue thresholding.
    #[default]
    Quad,
    /// Printed fiducial tag.
    Fiducial,
}
