//! Viewport scale policy and per-frame camera framing

use crate::constants::{
    AZIMUTH_STEP_DEG, CLOSE_ELEVATION_DEG, CLOSE_HALF_EXTENT_AU, CLOSE_HALF_HEIGHT_AU,
    WIDE_ELEVATION_DEG, WIDE_HALF_EXTENT_AU, WIDE_HALF_HEIGHT_AU,
};
use crate::planetlib::Position;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of the system a frame shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewportScale {
    /// Fixed frame around the Sun covering the full Sun-Earth distance
    Wide,
    /// Frame following Earth, sized for the Earth-Moon distance
    Close,
}

impl ViewportScale {
    /// Half-extents of the view volume in AU
    pub fn half_extents(&self) -> Vector3<f64> {
        match self {
            ViewportScale::Wide => {
                Vector3::new(WIDE_HALF_EXTENT_AU, WIDE_HALF_EXTENT_AU, WIDE_HALF_HEIGHT_AU)
            }
            ViewportScale::Close => Vector3::new(
                CLOSE_HALF_EXTENT_AU,
                CLOSE_HALF_EXTENT_AU,
                CLOSE_HALF_HEIGHT_AU,
            ),
        }
    }

    /// Camera elevation in degrees
    pub fn elevation_deg(&self) -> f64 {
        match self {
            ViewportScale::Wide => WIDE_ELEVATION_DEG,
            ViewportScale::Close => CLOSE_ELEVATION_DEG,
        }
    }
}

impl fmt::Display for ViewportScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportScale::Wide => f.write_str("wide"),
            ViewportScale::Close => f.write_str("close"),
        }
    }
}

/// Axis limits and view angles for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Center of the view volume
    pub center: Point3<f64>,
    /// Half-extents of the view volume along each axis
    pub half_extents: Vector3<f64>,
    /// Elevation above the ecliptic, degrees
    pub elevation_deg: f64,
    /// Azimuth, degrees in [0, 360)
    pub azimuth_deg: f64,
}

impl Camera {
    /// Frame the given scale for the `frame_index`-th frame of a run
    ///
    /// Wide views are fixed on the Sun. Close views center on `focus`
    /// (Earth), falling back to the origin when no focus is available.
    pub fn frame(scale: ViewportScale, focus: Option<Position>, frame_index: usize) -> Self {
        let center = match scale {
            ViewportScale::Wide => Point3::origin(),
            ViewportScale::Close => focus.unwrap_or_else(Point3::origin),
        };
        Self {
            center,
            half_extents: scale.half_extents(),
            elevation_deg: scale.elevation_deg(),
            azimuth_deg: (frame_index as f64 * AZIMUTH_STEP_DEG).rem_euclid(360.0),
        }
    }

    /// Lower and upper limits along x, y and z
    pub fn limits(&self) -> [(f64, f64); 3] {
        [0usize, 1, 2].map(|i| {
            (
                self.center[i] - self.half_extents[i],
                self.center[i] + self.half_extents[i],
            )
        })
    }

    /// Whether a position lies inside the view volume
    pub fn contains(&self, position: &Position) -> bool {
        let offset = position - self.center;
        (0..3usize).all(|i| offset[i].abs() <= self.half_extents[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_close_scale_is_much_smaller() {
        let wide = ViewportScale::Wide.half_extents();
        let close = ViewportScale::Close.half_extents();
        for i in 0..3usize {
            assert!(close[i] * 10.0 < wide[i]);
        }
    }

    #[test]
    fn test_wide_camera_limits() {
        let cam = Camera::frame(ViewportScale::Wide, Some(Point3::new(1.0, 0.0, 0.0)), 0);
        assert_eq!(cam.limits(), [(-2.0, 2.0), (-2.0, 2.0), (-0.5, 0.5)]);
        assert_eq!(cam.elevation_deg, 20.0);
        assert!(cam.contains(&Point3::new(1.0, 0.0, 0.0)));
        assert!(!cam.contains(&Point3::new(2.5, 0.0, 0.0)));
    }

    #[test]
    fn test_close_camera_follows_focus() {
        let earth = Point3::new(-0.2, 0.97, 0.0);
        let cam = Camera::frame(ViewportScale::Close, Some(earth), 0);
        assert_eq!(cam.center, earth);
        assert_eq!(cam.elevation_deg, 15.0);
        let [(x0, x1), _, (z0, z1)] = cam.limits();
        assert_relative_eq!(x1 - x0, 0.006, epsilon = 1e-12);
        assert_relative_eq!(z1 - z0, 0.0012, epsilon = 1e-12);
        assert!(cam.contains(&(earth + Vector3::new(0.0025, 0.0, 0.0))));
        assert!(!cam.contains(&Point3::origin()));
    }

    #[test]
    fn test_azimuth_wraps() {
        assert_eq!(Camera::frame(ViewportScale::Wide, None, 0).azimuth_deg, 0.0);
        assert_eq!(Camera::frame(ViewportScale::Wide, None, 1).azimuth_deg, 0.5);
        assert_eq!(Camera::frame(ViewportScale::Wide, None, 720).azimuth_deg, 0.0);
        assert_eq!(Camera::frame(ViewportScale::Wide, None, 719).azimuth_deg, 359.5);
    }
}
