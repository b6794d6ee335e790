//! Planar marker detection and pose estimation for augmented-reality overlays.
//!
//! A frame goes through one of two interchangeable detectors, both behind
//! [`detector::MarkerDetector`]:
//!
//! * [`quad`]: hue threshold, largest outer contour, convex hull, polygon
//!   simplification, four-corner selection;
//! * [`fiducial`]: a printed tag from a fixed [`dictionary`].
//!
//! Either way the four ordered corners are matched against the fixed
//! [`board::PlaneModel`] and [`pose::solve_plane_pose`] returns the marker
//! pose in camera coordinates. A frame without a marker yields `None`.

pub mod board;
pub mod camera;
pub mod contour;
pub mod data_loader;
pub mod detector;
pub mod dictionary;
pub mod error;
pub mod exchange;
pub mod fiducial;
pub mod geometry;
pub mod io;
pub mod overlay;
pub mod pose;
pub mod quad;
pub mod stats;
pub mod synthetic;
pub mod threshold;
pub mod types;
pub mod visualization;

pub use detector::{DetectorKind, MarkerDetection, MarkerDetector};
pub use error::MarkerError;
