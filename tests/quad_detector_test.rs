use glam::{IVec2, Vec2};
use image::{Rgb, RgbImage};
use marker_pose::board::PlaneModel;
use marker_pose::camera::CameraIntrinsics;
use marker_pose::geometry::order_quad_corners;
use marker_pose::quad::{QuadDetector, detect_quad, simplified_polygon};
use marker_pose::stats::HitRateStats;
use marker_pose::synthetic::{hsv_to_rgb, render_marker_frame, solid_frame};
use marker_pose::threshold::ThresholdParams;
use marker_pose::types::RvecTvec;
use marker_pose::MarkerDetector;
use nalgebra as na;

fn background() -> [u8; 3] {
    hsv_to_rgb(20.0, 0.8, 0.8)
}

/// 640x480 frame with a 100x100 square of hue 145 whose top-left pixel is
/// (270, 190).
fn square_frame() -> RgbImage {
    let marker = hsv_to_rgb(145.0, 1.0, 1.0);
    let mut img = solid_frame(640, 480, background());
    for y in 190..290 {
        for x in 270..370 {
            img.put_pixel(x, y, Rgb(marker));
        }
    }
    img
}

#[test]
fn test_frame_without_marker_color() {
    let frame = solid_frame(640, 480, background());
    let mut stats = HitRateStats::new();
    let detection = detect_quad(
        &frame,
        &ThresholdParams::default(),
        &CameraIntrinsics::default(),
        &PlaneModel::default(),
        &mut stats,
    );
    assert!(detection.is_none());
    assert_eq!(stats.total_calls, 1);
    assert_eq!(stats.four_point_hits, 0);
}

#[test]
fn test_square_polygon_and_corner_order() {
    let frame = square_frame();
    let polygon = simplified_polygon(&frame, &ThresholdParams::default()).unwrap();
    assert_eq!(polygon.len(), 4);

    let corners = order_quad_corners(&polygon).unwrap();
    assert_eq!(
        corners,
        [
            IVec2::new(270, 190),
            IVec2::new(369, 190),
            IVec2::new(369, 289),
            IVec2::new(270, 289)
        ]
    );
}

#[test]
fn test_square_detection() {
    let frame = square_frame();
    let mut stats = HitRateStats::new();
    let detection = detect_quad(
        &frame,
        &ThresholdParams::default(),
        &CameraIntrinsics::default(),
        &PlaneModel::default(),
        &mut stats,
    )
    .unwrap();
    assert_eq!(detection.corners[0], Vec2::new(270.0, 190.0));
    assert_eq!(detection.corners[2], Vec2::new(369.0, 289.0));
    assert!(detection.pose.is_finite());
    assert_eq!(stats.four_point_hits, 1);
    assert_eq!(stats.total_calls, 1);
}

#[test]
fn test_inverted_hue_range() {
    let mut stats = HitRateStats::new();
    let detection = detect_quad(
        &square_frame(),
        &ThresholdParams::with_hue(160, 130, 40.0),
        &CameraIntrinsics::default(),
        &PlaneModel::default(),
        &mut stats,
    );
    assert!(detection.is_none());
    assert_eq!(stats.total_calls, 1);
    assert_eq!(stats.four_point_hits, 0);
}

#[test]
fn test_repeated_calls_are_identical() {
    let frame = square_frame();
    let camera = CameraIntrinsics::default();
    let mut detector = QuadDetector::default();
    let first = detector.detect(&frame, &camera);
    let second = detector.detect(&frame, &camera);
    let third = detector.detect(&frame, &camera);
    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(detector.stats().total_calls, 3);
    assert_eq!(detector.stats().four_point_hits, 3);
    assert_eq!(detector.hit_rate(), Some(*detector.stats()));
    assert_eq!(detector.name(), "quad");
}

#[test]
fn test_stats_grow_on_misses() {
    let camera = CameraIntrinsics::default();
    let mut detector = QuadDetector::default();
    let blank = solid_frame(64, 48, background());
    let mut last = 0;
    for frame in [square_frame(), blank.clone(), square_frame(), blank] {
        detector.detect(&frame, &camera);
        assert_eq!(detector.stats().total_calls, last + 1);
        last = detector.stats().total_calls;
    }
    assert_eq!(detector.stats().four_point_hits, 2);
    assert!((detector.stats().ratio() - 0.5).abs() < 1e-12);

    detector.reset_stats();
    assert_eq!(*detector.stats(), HitRateStats::default());
}

#[test]
fn test_retuned_params_apply_next_frame() {
    let camera = CameraIntrinsics::default();
    let mut detector = QuadDetector::default();
    assert!(detector.detect(&square_frame(), &camera).is_some());
    detector.set_params(ThresholdParams::with_hue(0, 60, 40.0));
    assert!(detector.detect(&square_frame(), &camera).is_none());
}

#[test]
fn test_rendered_marker_translation() {
    let camera = CameraIntrinsics::pinhole(600.0, 600.0, 320.0, 240.0);
    let plane = PlaneModel::init_rectangle(1.0, 1.0);
    let truth = RvecTvec::new(
        &na::Vector3::new(0.2, -0.1, 0.05),
        &na::Vector3::new(0.1, -0.2, 8.0),
    );
    let (frame, truth_corners) = render_marker_frame(
        640,
        480,
        background(),
        hsv_to_rgb(145.0, 1.0, 1.0),
        &camera,
        &plane,
        &truth,
    )
    .unwrap();

    let mut stats = HitRateStats::new();
    let detection =
        detect_quad(&frame, &ThresholdParams::default(), &camera, &plane, &mut stats).unwrap();
    assert_eq!(stats.four_point_hits, 1);

    for c in truth_corners {
        let nearest = detection
            .corners
            .iter()
            .map(|d| d.distance(c))
            .fold(f32::MAX, f32::min);
        assert!(nearest < 2.5, "corner {:?} off by {}", c, nearest);
    }

    // the square is symmetric, so only the translation is unambiguous
    let t = detection.pose.tvec;
    assert!((t[0] - 0.1).abs() < 0.05);
    assert!((t[1] + 0.2).abs() < 0.05);
    assert!((t[2] - 8.0).abs() < 0.2);
}

#[test]
fn test_zero_epsilon_is_repeatable() {
    let camera = CameraIntrinsics::pinhole(600.0, 600.0, 320.0, 240.0);
    let plane = PlaneModel::init_rectangle(1.0, 1.0);
    let pose = RvecTvec::new(
        &na::Vector3::new(0.2, -0.1, 0.3),
        &na::Vector3::new(0.1, -0.2, 8.0),
    );
    let (frame, _) = render_marker_frame(
        640,
        480,
        background(),
        hsv_to_rgb(145.0, 1.0, 1.0),
        &camera,
        &plane,
        &pose,
    )
    .unwrap();
    let params = ThresholdParams::with_hue(130, 160, 0.0);

    // the hull of a tilted raster edge keeps its stair steps
    let polygon = simplified_polygon(&frame, &params).unwrap();
    assert!(polygon.len() > 4);

    let mut stats = HitRateStats::new();
    let first = detect_quad(&frame, &params, &camera, &plane, &mut stats);
    let second = detect_quad(&frame, &params, &camera, &plane, &mut stats);
    // compared through Debug so a degenerate pose with NaN still matches itself
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
    assert_eq!(stats.total_calls, 2);
    assert_eq!(stats.four_point_hits, 0);
}

#[test]
fn test_single_hue_range() {
    let mut stats = HitRateStats::new();
    let detection = detect_quad(
        &square_frame(),
        &ThresholdParams::with_hue(145, 145, 40.0),
        &CameraIntrinsics::default(),
        &PlaneModel::default(),
        &mut stats,
    )
    .unwrap();
    assert_eq!(detection.corners[0], Vec2::new(270.0, 190.0));
    assert_eq!(detection.corners[2], Vec2::new(369.0, 289.0));
    assert_eq!(stats.four_point_hits, 1);

    // one degree off excludes every pixel of the square
    let mut stats = HitRateStats::new();
    let missed = detect_quad(
        &square_frame(),
        &ThresholdParams::with_hue(146, 146, 40.0),
        &CameraIntrinsics::default(),
        &PlaneModel::default(),
        &mut stats,
    );
    assert!(missed.is_none());
    assert_eq!(stats.four_point_hits, 0);
}
