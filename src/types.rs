use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Marker pose in camera coordinates: axis-angle rotation vector plus
/// translation, so that `p_cam = R(rvec) * p_marker + tvec`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RvecTvec {
    pub rvec: [f64; 3],
    pub tvec: [f64; 3],
}

impl RvecTvec {
    pub fn new(rvec: &na::Vector3<f64>, tvec: &na::Vector3<f64>) -> RvecTvec {
        RvecTvec {
            rvec: [rvec.x, rvec.y, rvec.z],
            tvec: [tvec.x, tvec.y, tvec.z],
        }
    }

    pub fn na_rvec(&self) -> na::Vector3<f64> {
        na::Vector3::from(self.rvec)
    }

    pub fn na_tvec(&self) -> na::Vector3<f64> {
        na::Vector3::from(self.tvec)
    }

    /// Rodrigues conversion of the rotation vector.
    pub fn rotation_matrix(&self) -> na::Matrix3<f64> {
        na::Rotation3::new(self.na_rvec()).into_inner()
    }

    pub fn to_na_isometry3(&self) -> na::Isometry3<f64> {
        na::Isometry3::new(self.na_tvec(), self.na_rvec())
    }

    pub fn is_finite(&self) -> bool {
        self.rvec.iter().chain(self.tvec.iter()).all(|v| v.is_finite())
    }
}

pub trait ToRvecTvec {
    fn to_rvec_tvec(&self) -> RvecTvec;
}

impl ToRvecTvec for na::Isometry3<f64> {
    fn to_rvec_tvec(&self) -> RvecTvec {
        RvecTvec::new(&self.rotation.scaled_axis(), &self.translation.vector)
    }
}
