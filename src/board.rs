use serde::{Deserialize, Serialize};

/// Physical extent of the planar marker, in the same units as the resulting
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    pub half_width: f32,
    pub half_height: f32,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            half_width: 1.0,
            half_height: 1.603774,
        }
    }
}

/// The four marker corners on the z = 0 plane of the marker frame.
///
/// Corner order is fixed and must match the order of the image corners fed
/// to the pose solver: `(-w, h)`, `(-w, -h)`, `(w, -h)`, `(w, h)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneModel {
    pub corners: [glam::Vec3; 4],
}

impl Default for PlaneModel {
    fn default() -> Self {
        Self::from_config(&PlaneConfig::default())
    }
}

impl PlaneModel {
    pub fn from_config(config: &PlaneConfig) -> PlaneModel {
        Self::init_rectangle(config.half_width, config.half_height)
    }

    pub fn init_rectangle(half_width: f32, half_height: f32) -> PlaneModel {
        let (w, h) = (half_width, half_height);
        PlaneModel {
            corners: [
                glam::Vec3::new(-w, h, 0.0),
                glam::Vec3::new(-w, -h, 0.0),
                glam::Vec3::new(w, -h, 0.0),
                glam::Vec3::new(w, h, 0.0),
            ],
        }
    }

    pub fn corners_f64(&self) -> [nalgebra::Vector3<f64>; 4] {
        self.corners
            .map(|c| nalgebra::Vector3::new(c.x as f64, c.y as f64, c.z as f64))
    }
}

/// Overlay cube standing on the marker: base square on z = 0, top face at
/// z = -1 (towards the camera for a marker facing it).
pub struct WireframeBox {
    pub points: [nalgebra::Vector3<f64>; 8],
}

impl WireframeBox {
    /// Vertex index pairs: base ring, top ring, then the four pillars.
    pub const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 0),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 4),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];

    pub fn unit() -> WireframeBox {
        let base = [(-1.0, -1.0), (-1.0, 1.0), (1.0, 1.0), (1.0, -1.0)];
        let mut points = [nalgebra::Vector3::zeros(); 8];
        for (i, (x, y)) in base.iter().enumerate() {
            points[i] = nalgebra::Vector3::new(*x, *y, 0.0);
            points[i + 4] = nalgebra::Vector3::new(*x, *y, -1.0);
        }
        WireframeBox { points }
    }
}
