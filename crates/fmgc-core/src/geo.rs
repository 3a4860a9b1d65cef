//! Geodesic helpers for manufacturing synthetic fixes.
//!
//! The engine only needs enough geometry to place turning points and extended
//! centerline fixes; path prediction is out of scope and handled by external
//! guidance consumers.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_NM: f64 = 3440.065;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// Normalizes an angle into the [0, 360) range.
pub fn clamp_angle(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Converts a true course to a magnetic course given the local variation.
pub fn true_to_magnetic(true_course: f64, magnetic_variation: f64) -> f64 {
    clamp_angle(true_course - magnetic_variation)
}

/// Projects a point along a true bearing for a given distance in nautical
/// miles, using a spherical earth model.
pub fn place_bearing_distance(origin: Coordinates, bearing: f64, distance_nm: f64) -> Coordinates {
    let lat_rad = origin.lat.to_radians();
    let lon_rad = origin.long.to_radians();
    let bearing_rad = bearing.to_radians();

    let angular_distance = distance_nm / EARTH_RADIUS_NM;

    let dest_lat_rad = (lat_rad.sin() * angular_distance.cos()
        + lat_rad.cos() * angular_distance.sin() * bearing_rad.cos())
    .asin();

    let dest_lon_rad = lon_rad
        + (bearing_rad.sin() * angular_distance.sin() * lat_rad.cos())
            .atan2(angular_distance.cos() - lat_rad.sin() * dest_lat_rad.sin());

    Coordinates {
        lat: dest_lat_rad.to_degrees(),
        long: dest_lon_rad.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_angle() {
        assert_eq!(clamp_angle(370.0), 10.0);
        assert_eq!(clamp_angle(-10.0), 350.0);
        assert_eq!(clamp_angle(0.0), 0.0);
    }

    #[test]
    fn test_true_to_magnetic() {
        // 2 degrees east variation at EDDF
        assert!((true_to_magnetic(90.0, 2.0) - 88.0).abs() < f64::EPSILON);
        assert!((true_to_magnetic(1.0, 3.0) - 358.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_place_bearing_distance_north() {
        let origin = Coordinates::new(50.0, 8.5);
        let dest = place_bearing_distance(origin, 0.0, 60.0);

        // 60 NM due north is about one degree of latitude
        assert!((dest.lat - 51.0).abs() < 0.05);
        assert!((dest.long - 8.5).abs() < 0.01);
    }
}
