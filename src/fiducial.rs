//! Printed-tag marker detection, kept as an alternative to the threshold path.
//!
//! Dark regions of the Otsu-binarised frame whose hull simplifies to four
//! corners are candidate tags. Each candidate is sampled on the tag's cell
//! grid and decoded with `aprilgrid`'s bit reader against a
//! [`MarkerDictionary`]. Unlike `aprilgrid::detector::TagDetector`, which only
//! reads tags that sit in a full AprilGrid board, this reads lone markers.

use std::collections::BTreeMap;

use aprilgrid::detector::{best_tag, bit_code};
use glam::{IVec2, Vec2};
use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::geometric_transformations::Projection;
use log::trace;

use crate::board::PlaneModel;
use crate::camera::CameraIntrinsics;
use crate::contour::find_component_contours;
use crate::detector::{MarkerDetection, MarkerDetector};
use crate::dictionary::MarkerDictionary;
use crate::geometry::{approx_poly_dp, convex_hull};
use crate::pose::solve_plane_pose;

/// Smallest candidate perimeter relative to the larger image side.
const MIN_PERIMETER_RATE: f32 = 0.03;
/// Polygon tolerance relative to the hull perimeter.
const POLYGON_ACCURACY_RATE: f64 = 0.03;
const MIN_CONTRAST: u8 = 50;
const VALID_BRIGHTNESS_THRESHOLD: u8 = 10;
const MAX_INVALID_BITS: u32 = 3;

fn perimeter(polygon: &[IVec2]) -> f32 {
    (0..polygon.len())
        .map(|i| {
            let a = polygon[i].as_vec2();
            let b = polygon[(i + 1) % polygon.len()].as_vec2();
            a.distance(b)
        })
        .sum()
}

/// Four-corner outlines of the dark regions, each winding clockwise on screen
/// from its leftmost corner.
pub fn tag_candidates(gray: &GrayImage) -> Vec<[IVec2; 4]> {
    let level = otsu_level(gray);
    let dark = threshold(gray, level, ThresholdType::BinaryInverted);
    let min_perimeter = MIN_PERIMETER_RATE * gray.width().max(gray.height()) as f32;

    find_component_contours(&dark)
        .iter()
        .filter_map(|contour| {
            let hull = convex_hull(&contour.points);
            let hull_perimeter = perimeter(&hull);
            if hull_perimeter < min_perimeter {
                return None;
            }
            let polygon = approx_poly_dp(&hull, POLYGON_ACCURACY_RATE * hull_perimeter as f64);
            polygon.try_into().ok()
        })
        .collect()
}

fn sample(gray: &GrayImage, p: (f32, f32)) -> Option<u8> {
    let (x, y) = (p.0.round(), p.1.round());
    if x < 0.0 || y < 0.0 || x >= gray.width() as f32 || y >= gray.height() as f32 {
        return None;
    }
    Some(gray.get_pixel(x as u32, y as u32).0[0])
}

/// Reads the quad as a tag whose top-left corner is `quad[0]`.
///
/// The border cells must all be darker than the midpoint of the sampled
/// range; the payload goes through `aprilgrid`'s bit reader and must match a
/// code in its unrotated orientation.
fn decode_oriented(gray: &GrayImage, quad: &[Vec2; 4], dictionary: MarkerDictionary) -> Option<usize> {
    let side = dictionary.side_cells() as f32;
    let border = dictionary.border_bits() as u32;
    let edge = dictionary.edge_bits() as u32;
    let projection = Projection::from_control_points(
        [(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)],
        quad.map(|c| (c.x, c.y)),
    )?;
    let cell_center = |x: u32, y: u32| &projection * &(x as f32 + 0.5, y as f32 + 0.5);

    let side = dictionary.side_cells();
    let mut border_values = Vec::new();
    let mut all_values = Vec::new();
    for y in 0..side {
        for x in 0..side {
            let value = sample(gray, cell_center(x, y))?;
            let on_border = x < border || y < border || x >= side - border || y >= side - border;
            if on_border {
                border_values.push(value);
            }
            all_values.push(value);
        }
    }
    let min = all_values.iter().copied().min()?;
    let max = all_values.iter().copied().max()?;
    if max - min < MIN_CONTRAST {
        return None;
    }
    let mid = ((min as u16 + max as u16) / 2) as u8;
    if border_values.iter().any(|v| *v > mid) {
        return None;
    }

    let mut payload: Vec<(f32, f32)> = (0..edge)
        .flat_map(|y| (0..edge).map(move |x| (x + border, y + border)))
        .map(|(x, y)| cell_center(x, y))
        .collect();
    if !dictionary.msb_first() {
        payload.reverse();
    }
    let bits = bit_code(gray, &payload, VALID_BRIGHTNESS_THRESHOLD, MAX_INVALID_BITS)?;
    match best_tag(
        bits,
        dictionary.hamming_threshold(),
        dictionary.codes(),
        dictionary.edge_bits(),
    ) {
        Some((id, 0)) => Some(id),
        _ => None,
    }
}

/// Tries the four orientations of the candidate. On success the corners are
/// returned starting at the tag's own top-left corner, clockwise on screen.
pub fn decode_candidate(
    gray: &GrayImage,
    candidate: &[IVec2; 4],
    dictionary: MarkerDictionary,
) -> Option<(u32, [Vec2; 4])> {
    (0..4).find_map(|shift| {
        let mut quad = candidate.map(|c| c.as_vec2());
        quad.rotate_left(shift);
        let id = decode_oriented(gray, &quad, dictionary)?;
        Some((id as u32, quad))
    })
}

/// All decoded tags of the frame keyed by id. When a code shows up twice the
/// first candidate in raster order is kept.
pub fn detect_tags(gray: &GrayImage, dictionary: MarkerDictionary) -> BTreeMap<u32, [Vec2; 4]> {
    let mut tags = BTreeMap::new();
    for candidate in tag_candidates(gray) {
        if let Some((id, corners)) = decode_candidate(gray, &candidate, dictionary) {
            tags.entry(id).or_insert(corners);
        }
    }
    tags
}

/// Solves the pose of the detected tag with the lowest id against the plane
/// model.
///
/// The tag's top-left corner goes to plane corner `(-w, h)` and its top edge
/// runs towards `(w, h)`, so the returned corners are top-left, bottom-left,
/// bottom-right, top-right.
pub fn detect_fiducial(
    frame: &RgbImage,
    dictionary: MarkerDictionary,
    camera: &CameraIntrinsics,
    plane: &PlaneModel,
) -> Option<MarkerDetection> {
    let gray = image::imageops::grayscale(frame);
    let detected_tags = detect_tags(&gray, dictionary);
    trace!("{} tags detected", detected_tags.len());

    let (tag_id, [tl, tr, br, bl]) = detected_tags.first_key_value()?;
    trace!("using tag {}", tag_id);
    let corners = [*tl, *bl, *br, *tr];

    let pose = solve_plane_pose(plane, &corners, camera)?;
    Some(MarkerDetection { pose, corners })
}

pub struct FiducialDetector {
    dictionary: MarkerDictionary,
    pub plane: PlaneModel,
}

impl FiducialDetector {
    /// The dictionary is fixed for the detector's lifetime.
    pub fn new(dictionary: MarkerDictionary, plane: PlaneModel) -> FiducialDetector {
        FiducialDetector { dictionary, plane }
    }

    pub fn dictionary(&self) -> MarkerDictionary {
        self.dictionary
    }
}

impl MarkerDetector for FiducialDetector {
    fn detect(&mut self, frame: &RgbImage, camera: &CameraIntrinsics) -> Option<MarkerDetection> {
        detect_fiducial(frame, self.dictionary, camera, &self.plane)
    }

    fn name(&self) -> &'static str {
        "fiducial"
    }
}
