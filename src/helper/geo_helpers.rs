/// Mean Earth radius used for all distance figures.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two (latitude, longitude)
/// points given in degrees. Display only; never used to filter or sort.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Parses a `lat`/`lng` query pair. Both must be finite and in range.
pub fn parse_coordinates(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    let lat = lat?.trim().parse::<f64>().ok()?;
    let lng = lng?.trim().parse::<f64>().ok()?;
    let valid = lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0;
    valid.then_some((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUAIRA: (f64, f64) = (-24.0803, -54.2565);
    const TOLEDO: (f64, f64) = (-24.7246, -53.7412);

    #[test]
    fn identical_points_are_zero_apart() {
        assert_eq!(haversine_km(GUAIRA.0, GUAIRA.1, GUAIRA.0, GUAIRA.1), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(GUAIRA.0, GUAIRA.1, TOLEDO.0, TOLEDO.1);
        let back = haversine_km(TOLEDO.0, TOLEDO.1, GUAIRA.0, GUAIRA.1);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn known_distance_is_close() {
        let km = haversine_km(GUAIRA.0, GUAIRA.1, TOLEDO.0, TOLEDO.1);
        assert!((85.0..95.0).contains(&km), "got {}", km);
    }

    #[test]
    fn one_degree_of_latitude() {
        let km = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((km - 111.19).abs() < 0.01, "got {}", km);
    }

    #[test]
    fn coordinates_must_parse_and_be_in_range() {
        assert_eq!(parse_coordinates(Some("-24.08"), Some("-54.25")), Some((-24.08, -54.25)));
        assert_eq!(parse_coordinates(Some("abc"), Some("1")), None);
        assert_eq!(parse_coordinates(Some("91"), Some("0")), None);
        assert_eq!(parse_coordinates(Some("1"), None), None);
    }
}
