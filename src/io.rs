use std::io::Write;

use nalgebra as na;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::board::PlaneConfig;
use crate::camera::CameraIntrinsics;
use crate::detector::{DetectorKind, MarkerDetection};
use crate::error::MarkerError;
use crate::stats::HitRateStats;
use crate::threshold::ThresholdParams;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &str, object: &T) -> Result<(), MarkerError> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &str) -> Result<T, MarkerError> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// On-disk calibration: row-major camera matrix and distortion vector, the
/// layout calibration tools usually dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationFile {
    pub camera_matrix: [[f64; 3]; 3],
    pub dist_coeffs: Vec<f64>,
}

impl From<&CameraIntrinsics> for CalibrationFile {
    fn from(camera: &CameraIntrinsics) -> Self {
        let m = camera.camera_matrix();
        CalibrationFile {
            camera_matrix: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
            dist_coeffs: camera.distortion().to_vec(),
        }
    }
}

impl TryFrom<&CalibrationFile> for CameraIntrinsics {
    type Error = MarkerError;

    fn try_from(file: &CalibrationFile) -> Result<Self, Self::Error> {
        let rows = &file.camera_matrix;
        let m = na::Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], //
            rows[1][0], rows[1][1], rows[1][2], //
            rows[2][0], rows[2][1], rows[2][2],
        ]);
        if m[(0, 0)] <= 0.0 || m[(1, 1)] <= 0.0 {
            return Err(MarkerError::Calibration(
                "focal lengths must be positive".to_string(),
            ));
        }
        if file.dist_coeffs.iter().skip(5).any(|k| *k != 0.0) {
            return Err(MarkerError::Calibration(format!(
                "{} distortion coefficients given, only [k1, k2, p1, p2, k3] are supported",
                file.dist_coeffs.len()
            )));
        }
        Ok(CameraIntrinsics::new(&m, &file.dist_coeffs))
    }
}

pub fn load_camera_intrinsics(file_path: &str) -> Result<CameraIntrinsics, MarkerError> {
    let file: CalibrationFile = object_from_json(file_path)?;
    CameraIntrinsics::try_from(&file)
}

pub fn save_camera_intrinsics(output_path: &str, camera: &CameraIntrinsics) -> Result<(), MarkerError> {
    object_to_json(output_path, &CalibrationFile::from(camera))
}

/// Detector settings that can live in a JSON file instead of on the command
/// line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub detector: DetectorKind,
    pub threshold: ThresholdParams,
    pub plane: PlaneConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct FramePoseRecord {
    pub frame: usize,
    pub time_ns: i64,
    pub found: bool,
    pub rvec: Option<[f64; 3]>,
    pub tvec: Option<[f64; 3]>,
    pub corners: Option<[[f32; 2]; 4]>,
}

impl FramePoseRecord {
    pub fn new(frame: usize, time_ns: i64, detection: Option<&MarkerDetection>) -> FramePoseRecord {
        FramePoseRecord {
            frame,
            time_ns,
            found: detection.is_some(),
            rvec: detection.map(|d| d.pose.rvec),
            tvec: detection.map(|d| d.pose.tvec),
            corners: detection.map(|d| d.corners.map(|c| [c.x, c.y])),
        }
    }
}

/// Summary written at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub timestamp: String,
    pub detector: DetectorKind,
    pub total_frames: usize,
    pub detected_frames: usize,
    pub hit_rate: Option<HitRateStats>,
    pub frames: Vec<FramePoseRecord>,
}

impl RunReport {
    pub fn new(detector: DetectorKind, frames: Vec<FramePoseRecord>, hit_rate: Option<HitRateStats>) -> RunReport {
        let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
        let timestamp = now
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        RunReport {
            timestamp,
            detector,
            total_frames: frames.len(),
            detected_frames: frames.iter().filter(|f| f.found).count(),
            hit_rate,
            frames,
        }
    }
}

pub fn write_report(output_path: &str, report: &RunReport) -> Result<(), MarkerError> {
    object_to_json(output_path, report)
}
