use glam::{IVec2, Vec2};
use marker_pose::geometry::{
    Rect, approx_poly_dp, bounding_rect, centroid, convex_hull, order_by_angle, order_quad_corners,
    quad_area, select_farthest_four,
};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

fn iv(x: i32, y: i32) -> IVec2 {
    IVec2::new(x, y)
}

#[test]
fn test_convex_hull_drops_interior_and_collinear() {
    let mut pts = Vec::new();
    for x in 0..=4 {
        for y in 0..=4 {
            pts.push(iv(x, y));
        }
    }
    let hull = convex_hull(&pts);
    assert_eq!(hull, vec![iv(0, 0), iv(4, 0), iv(4, 4), iv(0, 4)]);
}

#[test]
fn test_convex_hull_small_inputs() {
    assert!(convex_hull(&[]).is_empty());
    assert_eq!(convex_hull(&[iv(3, 3), iv(3, 3)]), vec![iv(3, 3)]);
    assert_eq!(convex_hull(&[iv(5, 1), iv(2, 2)]), vec![iv(2, 2), iv(5, 1)]);
}

#[test]
fn test_approx_poly_dp_zero_epsilon_removes_collinear() {
    let square = [iv(0, 0), iv(5, 0), iv(10, 0), iv(10, 10), iv(0, 10)];
    let simplified = approx_poly_dp(&square, 0.0);
    assert_eq!(simplified, vec![iv(0, 0), iv(10, 0), iv(10, 10), iv(0, 10)]);

    // negative tolerance behaves like zero
    assert_eq!(approx_poly_dp(&square, -3.0), simplified);
}

#[test]
fn test_approx_poly_dp_large_epsilon_collapses() {
    let square = [iv(0, 0), iv(10, 0), iv(10, 10), iv(0, 10)];
    assert_eq!(approx_poly_dp(&square, 40.0), vec![iv(0, 0), iv(10, 10)]);
    // a wide quad survives a moderate tolerance
    let big = [iv(0, 0), iv(100, 0), iv(100, 100), iv(0, 100)];
    assert_eq!(approx_poly_dp(&big, 40.0).len(), 4);
}

#[test]
fn test_approx_poly_dp_keeps_short_curves() {
    assert!(approx_poly_dp(&[], 1.0).is_empty());
    assert_eq!(approx_poly_dp(&[iv(1, 1), iv(2, 2)], 1.0).len(), 2);
}

#[test]
fn test_centroid_truncates() {
    assert_eq!(centroid(&[]), None);
    assert_eq!(centroid(&[iv(0, 0), iv(1, 0), iv(1, 1)]), Some(iv(0, 0)));
    assert_eq!(centroid(&[iv(-1, 0), iv(-2, 0)]), Some(iv(-1, 0)));
}

#[test]
fn test_bounding_rect_inclusive() {
    let r = bounding_rect(&[iv(2, 3), iv(5, 7), iv(4, 4)]);
    assert_eq!(
        r,
        Rect {
            x: 2,
            y: 3,
            width: 4,
            height: 5
        }
    );
    assert_eq!(r.area(), 20);
    assert_eq!(bounding_rect(&[]).area(), 0);
}

#[test]
fn test_order_quad_corners_needs_four_points() {
    assert_eq!(order_quad_corners(&[iv(0, 0), iv(1, 0), iv(1, 1)]), None);
}

#[test]
fn test_order_quad_corners_picks_farthest_by_angle() {
    let expected = [iv(0, 0), iv(100, 0), iv(100, 60), iv(0, 60)];
    let mut pts = vec![
        iv(0, 0),
        iv(100, 0),
        iv(100, 60),
        iv(0, 60),
        iv(50, 10),
        iv(50, 50),
        iv(20, 30),
        iv(80, 30),
    ];
    assert_eq!(order_quad_corners(&pts), Some(expected));

    // the result does not depend on input order
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..10 {
        pts.shuffle(&mut rng);
        assert_eq!(order_quad_corners(&pts), Some(expected));
    }
}

#[test]
fn test_select_farthest_four_ties_keep_input_order() {
    let center = iv(0, 0);
    let pts = [iv(1, 0), iv(0, 5), iv(5, 0), iv(0, -5), iv(-5, 0), iv(2, 2)];
    assert_eq!(
        select_farthest_four(&pts, center),
        Some([iv(0, 5), iv(5, 0), iv(0, -5), iv(-5, 0)])
    );
    assert_eq!(select_farthest_four(&pts[..3], center), None);
}

#[test]
fn test_order_by_angle() {
    let mut pts = [iv(0, 5), iv(5, 0), iv(0, -5), iv(-5, 0)];
    order_by_angle(&mut pts, iv(0, 0));
    // atan2 runs from -pi (exclusive) to pi
    assert_eq!(pts, [iv(0, -5), iv(5, 0), iv(0, 5), iv(-5, 0)]);
}

#[test]
fn test_order_quad_corners_angles_ascending() {
    let pts = [iv(369, 289), iv(270, 190), iv(270, 289), iv(369, 190)];
    let corners = order_quad_corners(&pts).unwrap();
    let center = centroid(&pts).unwrap();
    let angles: Vec<f64> = corners
        .iter()
        .map(|p| ((p.y - center.y) as f64).atan2((p.x - center.x) as f64))
        .collect();
    assert!(angles.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(corners[0], iv(270, 190));
}

#[test]
fn test_quad_area() {
    let unit = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];
    assert!((quad_area(&unit) - 1.0).abs() < 1e-6);
    let line = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(3.0, 0.0),
    ];
    assert_eq!(quad_area(&line), 0.0);
}
