use log::debug;
use sqpnp_simple::sqpnp_solve_glam;

use crate::board::PlaneModel;
use crate::camera::CameraIntrinsics;
use crate::geometry::quad_area;
use crate::types::RvecTvec;

/// Image quadrilaterals smaller than this (px^2) are treated as collapsed.
pub const MIN_QUAD_AREA: f32 = 1.0;

/// Direct perspective-n-point solve over exactly four correspondences.
///
/// Image points are undistorted into normalised coordinates and handed to
/// SQPnP; there is no refinement or outlier rejection afterwards. `None` means
/// the input was degenerate or the solver produced no finite pose.
pub fn solve_pnp(
    p3ds: &[glam::Vec3; 4],
    p2ds: &[glam::Vec2; 4],
    camera: &CameraIntrinsics,
) -> Option<RvecTvec> {
    if quad_area(p2ds) < MIN_QUAD_AREA {
        debug!("image quad collapsed, skip pose");
        return None;
    }
    let p3ds = p3ds.to_vec();
    let p2ds_z: Vec<glam::Vec2> = p2ds
        .iter()
        .map(|p| {
            let xy = camera.undistort_one(&nalgebra::Vector2::new(p.x as f64, p.y as f64));
            glam::Vec2::new(xy.x as f32, xy.y as f32)
        })
        .collect();

    let (r, t) = sqpnp_solve_glam(&p3ds, &p2ds_z)?;
    let pose = RvecTvec {
        rvec: [r.0, r.1, r.2],
        tvec: [t.0, t.1, t.2],
    };
    if pose.is_finite() {
        Some(pose)
    } else {
        debug!("pnp returned a non-finite pose");
        None
    }
}

/// Solves the marker pose from its four ordered image corners.
pub fn solve_plane_pose(
    plane: &PlaneModel,
    image_corners: &[glam::Vec2; 4],
    camera: &CameraIntrinsics,
) -> Option<RvecTvec> {
    solve_pnp(&plane.corners, image_corners, camera)
}
