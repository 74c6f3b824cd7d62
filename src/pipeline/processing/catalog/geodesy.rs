/// Great-circle distance and azimuth between two points on a spherical
/// earth. Accurate to a few hundredths of a degree against the ellipsoid,
/// which is within typical arrival precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceAzimuth {
    /// Degrees of arc
    pub distance_deg: f64,
    /// Degrees clockwise from north at the first point
    pub azimuth_deg: f64,
}

pub fn distance_azimuth(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> DistanceAzimuth {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let delta_lambda = (lon2 - lon1).to_radians();
    let delta_phi = phi2 - phi1;

    // haversine
    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let central_angle = 2.0 * a.sqrt().min(1.0).asin();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    let azimuth = y.atan2(x).to_degrees().rem_euclid(360.0);

    DistanceAzimuth {
        distance_deg: central_angle.to_degrees(),
        azimuth_deg: azimuth,
    }
}
