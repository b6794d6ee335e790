use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::types::RvecTvec;

const UNDISTORT_ITERATIONS: usize = 20;
const UNDISTORT_TOLERANCE: f64 = 1e-12;

/// Pinhole intrinsics with the five-coefficient radial/tangential lens model
/// `[k1, k2, p1, p2, k3]`.
///
/// Loaded once at startup and shared read-only by every pose solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl Default for CameraIntrinsics {
    /// Factory calibration of the 640x480 webcam the demo was tuned on.
    fn default() -> Self {
        Self {
            fx: 6.6843589070435712e+02,
            fy: 6.6644989049880701e+02,
            cx: 3.1930978114340189e+02,
            cy: 2.3191340221795991e+02,
            k1: 2.6757419447697561e-02,
            k2: -3.7005079720994571e-01,
            p1: -9.6922955423738855e-03,
            p2: 4.0017843969807613e-04,
            k3: 5.9342104527500028e-01,
        }
    }
}

impl CameraIntrinsics {
    /// Builds intrinsics from a 3x3 camera matrix and up to five distortion
    /// coefficients. Missing coefficients are zero, extra ones are ignored.
    pub fn new(camera_matrix: &na::Matrix3<f64>, distortion: &[f64]) -> CameraIntrinsics {
        let d = |i: usize| distortion.get(i).copied().unwrap_or(0.0);
        CameraIntrinsics {
            fx: camera_matrix[(0, 0)],
            fy: camera_matrix[(1, 1)],
            cx: camera_matrix[(0, 2)],
            cy: camera_matrix[(1, 2)],
            k1: d(0),
            k2: d(1),
            p1: d(2),
            p2: d(3),
            k3: d(4),
        }
    }

    /// Same focal/principal point, no lens distortion.
    pub fn pinhole(fx: f64, fy: f64, cx: f64, cy: f64) -> CameraIntrinsics {
        CameraIntrinsics {
            fx,
            fy,
            cx,
            cy,
            k1: 0.0,
            k2: 0.0,
            p1: 0.0,
            p2: 0.0,
            k3: 0.0,
        }
    }

    pub fn camera_matrix(&self) -> na::Matrix3<f64> {
        na::Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    pub fn distortion(&self) -> [f64; 5] {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
    }

    fn distort(&self, xn: f64, yn: f64) -> (f64, f64) {
        let r2 = xn * xn + yn * yn;
        let radial = 1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3));
        let xd = xn * radial + 2.0 * self.p1 * xn * yn + self.p2 * (r2 + 2.0 * xn * xn);
        let yd = yn * radial + self.p1 * (r2 + 2.0 * yn * yn) + 2.0 * self.p2 * xn * yn;
        (xd, yd)
    }

    /// Projects a point given in camera coordinates. Points on or behind the
    /// image plane have no projection.
    pub fn project_one(&self, pt: &na::Vector3<f64>) -> Option<na::Vector2<f64>> {
        if pt.z <= 0.0 {
            return None;
        }
        let (xd, yd) = self.distort(pt.x / pt.z, pt.y / pt.z);
        Some(na::Vector2::new(
            self.fx * xd + self.cx,
            self.fy * yd + self.cy,
        ))
    }

    /// Projects object-frame points through `pose`.
    pub fn project(
        &self,
        p3ds: &[na::Vector3<f64>],
        pose: &RvecTvec,
    ) -> Vec<Option<na::Vector2<f64>>> {
        let iso = pose.to_na_isometry3();
        p3ds.iter()
            .map(|p| self.project_one(&(iso * na::Point3::from(*p)).coords))
            .collect()
    }

    /// Maps a distorted pixel to ideal normalised image coordinates (z = 1).
    ///
    /// Fixed-point inversion of the lens model; exact when there is no
    /// distortion.
    pub fn undistort_one(&self, pixel: &na::Vector2<f64>) -> na::Vector2<f64> {
        let x0 = (pixel.x - self.cx) / self.fx;
        let y0 = (pixel.y - self.cy) / self.fy;
        let (mut x, mut y) = (x0, y0);
        for _ in 0..UNDISTORT_ITERATIONS {
            let r2 = x * x + y * y;
            let icdist = 1.0 / (1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3)));
            if !icdist.is_finite() {
                break;
            }
            let dx = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
            let dy = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
            let nx = (x0 - dx) * icdist;
            let ny = (y0 - dy) * icdist;
            let step = (nx - x).abs().max((ny - y).abs());
            x = nx;
            y = ny;
            if step < UNDISTORT_TOLERANCE {
                break;
            }
        }
        na::Vector2::new(x, y)
    }
}
