/// Great-circle distance between two coordinates via the Haversine formula.
/// Returns meters.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_distance_m(47.3769, 8.5417, 47.3769, 8.5417), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let d1 = haversine_distance_m(47.3769, 8.5417, 46.9480, 7.4474);
        let d2 = haversine_distance_m(46.9480, 7.4474, 47.3769, 8.5417);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn zurich_hb_to_lindenhof_is_within_walking_range() {
        // Two points in central Zurich, roughly 170 m apart
        let d = haversine_distance_m(47.3769, 8.5417, 47.3779, 8.5400);
        assert!(d > 100.0 && d < 300.0, "got {d}");
        assert!(d <= 5000.0);
    }

    #[test]
    fn zurich_to_bern_is_about_95_km() {
        let d = haversine_distance_m(47.3769, 8.5417, 46.9480, 7.4474);
        assert!(d > 90_000.0 && d < 100_000.0, "got {d}");
    }

    #[test]
    fn nan_input_propagates() {
        assert!(haversine_distance_m(f64::NAN, 8.5417, 47.3769, 8.5417).is_nan());
    }
}
