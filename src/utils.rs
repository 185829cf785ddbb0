const EARTH_RADIUS_KM: f64 = 6371.0;

/// Round `x` to `n` decimal places, half away from zero.
pub fn round_to(x: f64, n: i32) -> f64 {
    let factor = 10f64.powi(n);
    (x * factor).round() / factor
}

/// Great-circle distance between two coordinates in whole meters.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + (d_lon / 2.0).sin() * (d_lon / 2.0).sin() * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c * 1000.0).round()
}

/// Sort key that orders `location2` before `location10`.
pub fn natural_key(name: &str) -> (String, u64) {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    let (prefix, digits) = name.split_at(digits_start);
    (prefix.to_string(), digits.parse().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn haversine_is_rounded_meters() {
        // One degree of latitude along a meridian.
        let d = haversine(59.0, 17.0, 60.0, 17.0);
        assert_eq!(d, (EARTH_RADIUS_KM * 1000.0 * 1f64.to_radians()).round());
        assert_eq!(d.fract(), 0.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = haversine(59.8586, 17.6389, 59.8612, 17.6450);
        let b = haversine(59.8612, 17.6450, 59.8586, 17.6389);
        assert_eq!(a, b);
        assert_eq!(haversine(59.8586, 17.6389, 59.8586, 17.6389), 0.0);
    }

    #[test]
    fn natural_key_orders_numeric_suffixes() {
        let mut names = vec!["location10", "location2", "location1"];
        names.sort_by_key(|n| natural_key(n));
        assert_eq!(names, vec!["location1", "location2", "location10"]);
        assert_eq!(natural_key("kiosk"), ("kiosk".to_string(), 0));
    }
}
