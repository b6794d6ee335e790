//! Colored-quadrilateral marker detection by hue thresholding.

use glam::IVec2;
use image::RgbImage;
use log::{debug, trace};

use crate::board::PlaneModel;
use crate::camera::CameraIntrinsics;
use crate::contour::{find_external_contours, largest_by_bounding_box};
use crate::detector::{MarkerDetection, MarkerDetector};
use crate::geometry::{approx_poly_dp, convex_hull, order_quad_corners};
use crate::pose::solve_plane_pose;
use crate::stats::HitRateStats;
use crate::threshold::{ThresholdParams, hsv_mask};

/// Thresholds the frame, keeps the contour with the largest bounding box and
/// returns its simplified convex hull.
///
/// `None` when the mask has no foreground at all.
pub fn simplified_polygon(frame: &RgbImage, params: &ThresholdParams) -> Option<Vec<IVec2>> {
    let mask = hsv_mask(frame, params);
    let contours = find_external_contours(&mask);
    let contour = largest_by_bounding_box(&contours)?;
    let hull = convex_hull(&contour.points);
    let polygon = approx_poly_dp(&hull, params.epsilon);
    trace!(
        "contour {} pts, hull {} pts, polygon {} pts",
        contour.points.len(),
        hull.len(),
        polygon.len()
    );
    Some(polygon)
}

/// Full threshold pipeline for one frame.
///
/// Every call counts towards `stats`; a call counts as a hit when the
/// simplified polygon has exactly four vertices. Polygons with more vertices
/// still go on to corner selection.
pub fn detect_quad(
    frame: &RgbImage,
    params: &ThresholdParams,
    camera: &CameraIntrinsics,
    plane: &PlaneModel,
    stats: &mut HitRateStats,
) -> Option<MarkerDetection> {
    stats.record_call();
    let polygon = simplified_polygon(frame, params);
    if let Some(polygon) = &polygon {
        stats.record_polygon(polygon.len());
    }
    debug!("{}", stats);

    let corners = order_quad_corners(&polygon?)?.map(|p| p.as_vec2());
    let pose = solve_plane_pose(plane, &corners, camera)?;
    Some(MarkerDetection { pose, corners })
}

#[derive(Debug, Clone, Default)]
pub struct QuadDetector {
    pub params: ThresholdParams,
    pub plane: PlaneModel,
    stats: HitRateStats,
}

impl QuadDetector {
    pub fn new(params: ThresholdParams, plane: PlaneModel) -> QuadDetector {
        QuadDetector {
            params,
            plane,
            stats: HitRateStats::new(),
        }
    }

    /// Live retuning between frames.
    pub fn set_params(&mut self, params: ThresholdParams) {
        self.params = params;
    }

    pub fn stats(&self) -> &HitRateStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}

impl MarkerDetector for QuadDetector {
    fn detect(&mut self, frame: &RgbImage, camera: &CameraIntrinsics) -> Option<MarkerDetection> {
        detect_quad(frame, &self.params, camera, &self.plane, &mut self.stats)
    }

    fn name(&self) -> &'static str {
        "quad"
    }

    fn hit_rate(&self) -> Option<HitRateStats> {
        Some(self.stats)
    }
}
