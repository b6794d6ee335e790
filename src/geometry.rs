//! Plane geometry on integer image points.
//!
//! Everything here is a pure value-in/value-out function over a snapshot of
//! points; nothing keeps state between frames.

use glam::{IVec2, Vec2};

/// Axis-aligned bounding rectangle in pixel units, inclusive of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

pub fn distance(a: IVec2, b: IVec2) -> f64 {
    let d = (a - b).as_dvec2();
    d.length()
}

/// Arithmetic mean of the points, truncated toward zero.
///
/// Returns `None` for an empty slice.
pub fn centroid(points: &[IVec2]) -> Option<IVec2> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0i64, 0i64), |(sx, sy), p| (sx + p.x as i64, sy + p.y as i64));
    let n = points.len() as i64;
    Some(IVec2::new((sx / n) as i32, (sy / n) as i32))
}

/// Angle of `p` around `center`, `atan2(dy, dx)` in image coordinates.
pub fn polar_angle(p: IVec2, center: IVec2) -> f64 {
    let d = p - center;
    (d.y as f64).atan2(d.x as f64)
}

pub fn bounding_rect(points: &[IVec2]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (min, max) = points
        .iter()
        .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    Rect {
        x: min.x,
        y: min.y,
        width: max.x - min.x + 1,
        height: max.y - min.y + 1,
    }
}

fn cross(o: IVec2, a: IVec2, b: IVec2) -> i64 {
    let oa = (a - o).as_i64vec2();
    let ob = (b - o).as_i64vec2();
    oa.x * ob.y - oa.y * ob.x
}

/// Convex hull by Andrew's monotone chain.
///
/// Collinear points on the hull boundary are dropped. The result starts at the
/// smallest (x, y) point and winds with positive cross product.
pub fn convex_hull(points: &[IVec2]) -> Vec<IVec2> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.cmp(&b.x).then(a.y.cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<IVec2> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    // last point repeats the first one
    hull.pop();
    hull
}

fn line_distance(p: IVec2, a: IVec2, b: IVec2) -> f64 {
    let ab = (b - a).as_dvec2();
    let ap = (p - a).as_dvec2();
    let len = ab.length();
    if len == 0.0 {
        return ap.length();
    }
    (ab.x * ap.y - ab.y * ap.x).abs() / len
}

/// Douglas-Peucker simplification of a closed polygon.
///
/// The ring is split at the vertex farthest from the first one and both chains
/// are simplified independently. A vertex survives only if it lies strictly
/// farther than `epsilon` from the chord of its chain, so `epsilon = 0` still
/// removes exactly collinear vertices. Negative tolerances behave like zero.
pub fn approx_poly_dp(curve: &[IVec2], epsilon: f64) -> Vec<IVec2> {
    let n = curve.len();
    if n <= 2 {
        return curve.to_vec();
    }
    let epsilon = epsilon.max(0.0);

    let mut far = 1;
    let mut far_dist = distance(curve[0], curve[1]);
    for (i, p) in curve.iter().enumerate().skip(2) {
        let d = distance(curve[0], *p);
        if d > far_dist {
            far = i;
            far_dist = d;
        }
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;

    // chains are half-open index ranges, `n` stands for vertex 0
    let mut stack = vec![(0usize, far), (far, n)];
    while let Some((start, end)) = stack.pop() {
        if end - start < 2 {
            continue;
        }
        let a = curve[start];
        let b = curve[end % n];
        let mut split = start;
        let mut max_dist = epsilon;
        for (k, p) in curve.iter().enumerate().take(end).skip(start + 1) {
            let d = line_distance(*p, a, b);
            if d > max_dist {
                max_dist = d;
                split = k;
            }
        }
        if split != start {
            keep[split] = true;
            stack.push((start, split));
            stack.push((split, end));
        }
    }

    curve
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| if k { Some(*p) } else { None })
        .collect()
}

/// The four points farthest from `center`, farthest first. Distance ties keep
/// input order.
pub fn select_farthest_four(points: &[IVec2], center: IVec2) -> Option<[IVec2; 4]> {
    if points.len() < 4 {
        return None;
    }
    let mut ranked: Vec<(IVec2, f64)> = points.iter().map(|p| (*p, distance(*p, center))).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Some([ranked[0].0, ranked[1].0, ranked[2].0, ranked[3].0])
}

/// Sorts by ascending polar angle around `center`.
pub fn order_by_angle(points: &mut [IVec2], center: IVec2) {
    points.sort_by(|a, b| polar_angle(*a, center).total_cmp(&polar_angle(*b, center)));
}

/// Keeps the four points farthest from the centroid, then orders them by
/// ascending polar angle around that centroid.
///
/// The centroid is taken over all input points. Returns `None` when fewer
/// than four points are given.
pub fn order_quad_corners(points: &[IVec2]) -> Option<[IVec2; 4]> {
    let center = centroid(points)?;
    let mut corners = select_farthest_four(points, center)?;
    order_by_angle(&mut corners, center);
    Some(corners)
}

/// Unsigned shoelace area of a quadrilateral.
pub fn quad_area(corners: &[Vec2; 4]) -> f32 {
    let mut twice = 0.0f32;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        twice += a.x * b.y - b.x * a.y;
    }
    twice.abs() * 0.5
}
