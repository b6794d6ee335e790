use image::RgbImage;
use rerun::RecordingStream;
use std::io::Cursor;

use crate::camera::CameraIntrinsics;
use crate::detector::MarkerDetection;
use crate::error::MarkerError;
use crate::overlay::{corner_color, projected_box_edges};

fn rerun_err(e: impl std::fmt::Display) -> MarkerError {
    MarkerError::Rerun(e.to_string())
}

/// rerun use top left corner as (0, 0)
pub fn rerun_shift(p2ds: &[(f32, f32)]) -> Vec<(f32, f32)> {
    p2ds.iter().map(|(x, y)| (*x + 0.5, *y + 0.5)).collect()
}

pub fn set_frame_time(recording: &RecordingStream, time_ns: i64) {
    recording.set_time("stable", rerun::TimeCell::from_duration_nanos(time_ns));
}

pub fn log_image_as_compressed(
    recording: &RecordingStream,
    topic: &str,
    img: &RgbImage,
    format: image::ImageFormat,
) -> Result<(), MarkerError> {
    let mut bytes: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), format)?;
    let image = rerun::EncodedImage::from_file_contents(bytes);
    recording
        .log(format!("{}/image", topic), &image)
        .map_err(rerun_err)
}

/// Logs the corners and the projected box, or clears both when the frame had
/// no marker so the viewer does not keep showing a stale pose.
pub fn log_detection(
    recording: &RecordingStream,
    topic: &str,
    detection: Option<&MarkerDetection>,
    camera: &CameraIntrinsics,
) -> Result<(), MarkerError> {
    let Some(detection) = detection else {
        recording
            .log(format!("{}/marker", topic), &rerun::Clear::recursive())
            .map_err(rerun_err)?;
        return Ok(());
    };

    let pts: Vec<(f32, f32)> = detection.corners.iter().map(|c| (c.x, c.y)).collect();
    let colors: Vec<_> = (0..pts.len()).map(corner_color).collect();
    let labels: Vec<String> = (0..pts.len()).map(|i| i.to_string()).collect();
    recording
        .log(
            format!("{}/marker/corners", topic),
            &rerun::Points2D::new(rerun_shift(&pts))
                .with_colors(colors)
                .with_labels(labels)
                .with_radii([rerun::Radius::new_ui_points(5.0)]),
        )
        .map_err(rerun_err)?;

    let strips: Vec<[[f32; 2]; 2]> = projected_box_edges(detection, camera)
        .into_iter()
        .map(|(a, b)| [[a.0 + 0.5, a.1 + 0.5], [b.0 + 0.5, b.1 + 0.5]])
        .collect();
    recording
        .log(
            format!("{}/marker/box", topic),
            &rerun::LineStrips2D::new(strips),
        )
        .map_err(rerun_err)
}
