//! Synthetic frames for the dataset generator, tests and benches.

use glam::Vec2;
use image::{Rgb, RgbImage};
use nalgebra as na;

use crate::board::PlaneModel;
use crate::camera::CameraIntrinsics;
use crate::dictionary::MarkerDictionary;
use crate::types::RvecTvec;

const TAG_BLACK: [u8; 3] = [0, 0, 0];
const TAG_WHITE: [u8; 3] = [255, 255, 255];

/// `h` in degrees, `s` and `v` in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r, g, b].map(|ch| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

pub fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// Fills the convex polygon (either winding), edges included. Pixel `(x, y)`
/// is sampled at its integer coordinate.
pub fn fill_convex_polygon(img: &mut RgbImage, corners: &[Vec2], color: [u8; 3]) {
    if corners.len() < 3 || img.width() == 0 || img.height() == 0 {
        return;
    }
    let (min, max) = corners
        .iter()
        .fold((corners[0], corners[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = (max.x.ceil() as i64).min(img.width() as i64 - 1);
    let y1 = (max.y.ceil() as i64).min(img.height() as i64 - 1);
    if x1 < 0 || y1 < 0 {
        return;
    }

    let n = corners.len();
    for y in y0..=y1 as u32 {
        for x in x0..=x1 as u32 {
            let p = Vec2::new(x as f32, y as f32);
            let mut pos = false;
            let mut neg = false;
            for i in 0..n {
                let a = corners[i];
                let b = corners[(i + 1) % n];
                let c = (b - a).perp_dot(p - a);
                pos |= c > 1e-4;
                neg |= c < -1e-4;
            }
            if !(pos && neg) {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
}

/// Renders the plane model as a flat-colored quadrilateral seen through
/// `camera` at `pose`. Lens distortion bends only the corners; edges stay
/// straight. `None` when a corner is behind the camera.
pub fn render_marker_frame(
    width: u32,
    height: u32,
    background: [u8; 3],
    marker_color: [u8; 3],
    camera: &CameraIntrinsics,
    plane: &PlaneModel,
    pose: &RvecTvec,
) -> Option<(RgbImage, [Vec2; 4])> {
    let projected = camera.project(&plane.corners_f64(), pose);
    let mut corners = [Vec2::ZERO; 4];
    for (c, p) in corners.iter_mut().zip(projected) {
        let p = p?;
        *c = Vec2::new(p.x as f32, p.y as f32);
    }
    let mut img = solid_frame(width, height, background);
    fill_convex_polygon(&mut img, &corners, marker_color);
    Some((img, corners))
}

/// Draws tag `id` of `dictionary` on the plane model seen through `camera` at
/// `pose`, inside a one cell white quiet zone. The tag's top-left corner sits
/// on plane corner `(-w, h)` and its top edge runs towards `(w, h)`.
///
/// Returns the projected outer corners of the black frame as top-left,
/// top-right, bottom-right, bottom-left. `None` for an id outside the
/// dictionary or when a corner is behind the camera.
pub fn draw_tag(
    img: &mut RgbImage,
    dictionary: MarkerDictionary,
    id: usize,
    camera: &CameraIntrinsics,
    plane: &PlaneModel,
    pose: &RvecTvec,
) -> Option<[Vec2; 4]> {
    dictionary.codes().get(id)?;
    let side = dictionary.side_cells();
    let border = dictionary.border_bits() as u32;
    let top_left = plane.corners[0];
    let bottom_right = plane.corners[2];

    // cell grid: u to the right, v down the printed tag
    let to_plane = |u: f32, v: f32| {
        let s = side as f32;
        na::Vector3::new(
            (top_left.x + (bottom_right.x - top_left.x) * u / s) as f64,
            (top_left.y + (bottom_right.y - top_left.y) * v / s) as f64,
            0.0,
        )
    };
    let project_cell = |u0: f32, v0: f32, u1: f32, v1: f32| -> Option<[Vec2; 4]> {
        let pts = [
            to_plane(u0, v0),
            to_plane(u1, v0),
            to_plane(u1, v1),
            to_plane(u0, v1),
        ];
        let mut out = [Vec2::ZERO; 4];
        for (o, p) in out.iter_mut().zip(camera.project(&pts, pose)) {
            let p = p?;
            *o = Vec2::new(p.x as f32, p.y as f32);
        }
        Some(out)
    };

    let outer = side as f32 + 1.0;
    fill_convex_polygon(img, &project_cell(-1.0, -1.0, outer, outer)?, TAG_WHITE);
    for y in 0..side {
        for x in 0..side {
            let payload = x >= border && y >= border && x < side - border && y < side - border;
            let white = payload && dictionary.cell_is_white(id, x - border, y - border)?;
            let cell = project_cell(x as f32, y as f32, x as f32 + 1.0, y as f32 + 1.0)?;
            fill_convex_polygon(img, &cell, if white { TAG_WHITE } else { TAG_BLACK });
        }
    }
    project_cell(0.0, 0.0, side as f32, side as f32)
}
