//! Great-circle distance for nearby-quest lookups.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two latitude/longitude pairs.
#[must_use]
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        assert!(distance_meters(59.33, 18.07, 59.33, 18.07).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_of_latitude_is_about_111_km() {
        let distance = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 111_195.0).abs() < 50.0, "got {distance}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let there = distance_meters(59.33, 18.07, 40.71, -74.0);
        let back = distance_meters(40.71, -74.0, 59.33, 18.07);
        assert!((there - back).abs() < 1e-6);
    }
}
