//! Draws a detection back onto the frame: the projected wireframe box and
//! the corners it was solved from.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::board::WireframeBox;
use crate::camera::CameraIntrinsics;
use crate::detector::MarkerDetection;

const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const POINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

pub fn corner_color(idx: usize) -> (u8, u8, u8, u8) {
    let c = colorous::CATEGORY10[idx % colorous::CATEGORY10.len()];
    (c.r, c.g, c.b, 255)
}

/// Edges of the wireframe box in pixel coordinates. Edges with an endpoint
/// behind the camera are left out.
pub fn projected_box_edges(
    detection: &MarkerDetection,
    camera: &CameraIntrinsics,
) -> Vec<((f32, f32), (f32, f32))> {
    let cube = WireframeBox::unit();
    let p2ds = camera.project(&cube.points, &detection.pose);
    WireframeBox::EDGES
        .iter()
        .filter_map(|(a, b)| {
            let pa = p2ds[*a]?;
            let pb = p2ds[*b]?;
            Some(((pa.x as f32, pa.y as f32), (pb.x as f32, pb.y as f32)))
        })
        .collect()
}

pub fn draw_detection(frame: &mut RgbImage, detection: &MarkerDetection, camera: &CameraIntrinsics) {
    for (start, end) in projected_box_edges(detection, camera) {
        draw_line_segment_mut(frame, start, end, LINE_COLOR);
    }
    for (i, c) in detection.corners.iter().enumerate() {
        let (r, g, b, _) = corner_color(i);
        draw_filled_circle_mut(frame, (c.x.round() as i32, c.y.round() as i32), 4, Rgb([r, g, b]));
    }
    let center = detection.corners.iter().sum::<glam::Vec2>() / 4.0;
    draw_filled_circle_mut(
        frame,
        (center.x.round() as i32, center.y.round() as i32),
        2,
        POINT_COLOR,
    );
}
