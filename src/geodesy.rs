//! Geodesic distance strategies.
//!
//! All latitudes and longitudes are in radians. The default strategy is a
//! haversine on a latitude-dependent sphere radius, additionally lifted by
//! the mean elevation of the two points; the ellipsoidal strategies
//! (Thomas, Vincenty, Karney) compute the WGS-84 surface distance and fold
//! the elevation difference in afterwards.

use geo::{Distance, Geodesic, Point};

use crate::constants::{EARTH_FLATTENING, EARTH_RADIUS_EQUATOR_M, EARTH_RADIUS_POLE_M};

/// Planar (surface) and full (elevation-aware) distance between two points,
/// both in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoDistance {
    pub planar: f64,
    pub full: f64,
}

/// Distance strategy selector. Stored per track; index 0..3 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceFunc {
    #[default]
    Haversine,
    Thomas,
    Vincenty,
    Karney,
}

impl DistanceFunc {
    /// Maps an integer selector to a strategy. Out-of-range values fall
    /// back to the haversine.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => DistanceFunc::Thomas,
            2 => DistanceFunc::Vincenty,
            3 => DistanceFunc::Karney,
            _ => DistanceFunc::Haversine,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            DistanceFunc::Haversine => 0,
            DistanceFunc::Thomas => 1,
            DistanceFunc::Vincenty => 2,
            DistanceFunc::Karney => 3,
        }
    }

    /// Distance between `(lat1, lon1, elev1)` and `(lat2, lon2, elev2)`,
    /// angles in radians, elevations in meters.
    pub fn distance(
        self,
        lat1: f64,
        lat2: f64,
        lon1: f64,
        lon2: f64,
        elev1: f64,
        elev2: f64,
    ) -> GeoDistance {
        match self {
            DistanceFunc::Haversine => haversine(lat1, lat2, lon1, lon2, elev1, elev2),
            DistanceFunc::Thomas => with_elevation(thomas(lat1, lat2, lon1, lon2), elev1, elev2),
            DistanceFunc::Vincenty => {
                with_elevation(vincenty(lat1, lat2, lon1, lon2), elev1, elev2)
            }
            DistanceFunc::Karney => with_elevation(karney(lat1, lat2, lon1, lon2), elev1, elev2),
        }
    }
}

/// Earth radius (m) at the given latitude (radians) on the WGS-84 ellipsoid.
pub fn earth_radius(lat: f64) -> f64 {
    let a = EARTH_RADIUS_EQUATOR_M;
    let b = EARTH_RADIUS_POLE_M;
    let (sin_lat, cos_lat) = lat.sin_cos();

    let num = (a * a * cos_lat).powi(2) + (b * b * sin_lat).powi(2);
    let den = (a * cos_lat).powi(2) + (b * sin_lat).powi(2);
    (num / den).sqrt()
}

fn hav(x: f64) -> f64 {
    (x / 2.0).sin().powi(2)
}

fn with_elevation(planar: f64, elev1: f64, elev2: f64) -> GeoDistance {
    GeoDistance {
        planar,
        full: (planar * planar + (elev2 - elev1).powi(2)).sqrt(),
    }
}

/// Haversine on a sphere whose radius is the mean-latitude earth radius
/// lifted by the mean elevation.
pub fn haversine(lat1: f64, lat2: f64, lon1: f64, lon2: f64, elev1: f64, elev2: f64) -> GeoDistance {
    let h = hav(lat2 - lat1) + lat1.cos() * lat2.cos() * hav(lon2 - lon1);
    let radius = earth_radius((lat1 + lat2) / 2.0) + (elev1 + elev2) / 2.0;
    let planar = radius * 2.0 * h.sqrt().asin();
    with_elevation(planar, elev1, elev2)
}

/// Thomas' ellipsoidal approximation: spherical distance between the
/// reduced latitudes plus a first-order flattening correction.
fn thomas(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> f64 {
    let f = EARTH_FLATTENING;
    let beta1 = ((1.0 - f) * lat1.tan()).atan();
    let beta2 = ((1.0 - f) * lat2.tan()).atan();

    let h = hav(beta2 - beta1) + beta1.cos() * beta2.cos() * hav(lon2 - lon1);
    let sigma = 2.0 * h.sqrt().asin();
    if sigma == 0.0 {
        return 0.0;
    }

    let p = (beta1 + beta2) / 2.0;
    let q = (beta2 - beta1) / 2.0;
    let x = (sigma - sigma.sin()) * (p.sin() * q.cos() / (sigma / 2.0).cos()).powi(2);
    let y = (sigma + sigma.sin()) * (p.cos() * q.sin() / (sigma / 2.0).sin()).powi(2);

    EARTH_RADIUS_EQUATOR_M * (sigma - f / 2.0 * (x + y))
}

/// Vincenty's iterative inverse solution on the WGS-84 ellipsoid. Falls
/// back to the last iterate if the antipodal case fails to converge.
fn vincenty(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> f64 {
    let a = EARTH_RADIUS_EQUATOR_M;
    let b = EARTH_RADIUS_POLE_M;
    let f = EARTH_FLATTENING;

    let l = lon2 - lon1;
    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut sin_sigma = 0.0;
    let mut cos_sigma = 0.0;
    let mut sigma = 0.0;
    let mut cos2_alpha = 0.0;
    let mut cos_2sigma_m = 0.0;

    for _ in 0..100 {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points.
            return 0.0;
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        cos_2sigma_m = if cos2_alpha == 0.0 {
            // Equatorial line.
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        };

        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let lambda_next = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));
        if (lambda_next - lambda).abs() < 1e-12 {
            break;
        }
        lambda = lambda_next;
    }

    let u_sq = cos2_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

    b * big_a * (sigma - delta_sigma)
}

/// Karney's geodesic via the `geo` crate (GeographicLib).
fn karney(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> f64 {
    let p1 = Point::new(lon1.to_degrees(), lat1.to_degrees());
    let p2 = Point::new(lon2.to_degrees(), lat2.to_degrees());
    Geodesic.distance(p1, p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEG: f64 = std::f64::consts::PI / 180.0;

    #[test]
    fn earth_radius_range() {
        assert!((earth_radius(0.0) - EARTH_RADIUS_EQUATOR_M).abs() < 1.0);
        assert!((earth_radius(90.0 * DEG) - EARTH_RADIUS_POLE_M).abs() < 1.0);
        let mid = earth_radius(45.0 * DEG);
        assert!(mid < EARTH_RADIUS_EQUATOR_M && mid > EARTH_RADIUS_POLE_M);
    }

    #[test]
    fn haversine_one_degree_at_equator() {
        let d = haversine(0.0, 0.0, 0.0, 1.0 * DEG, 0.0, 0.0);
        // One degree of longitude at the equatorial radius.
        let expected = EARTH_RADIUS_EQUATOR_M * DEG;
        assert!((d.planar - expected).abs() < 1e-6, "planar={}", d.planar);
        assert_eq!(d.planar, d.full);
    }

    #[test]
    fn haversine_symmetry() {
        let a = (48.85 * DEG, 2.35 * DEG);
        let b = (51.51 * DEG, -0.13 * DEG);
        let d1 = haversine(a.0, b.0, a.1, b.1, 0.0, 0.0);
        let d2 = haversine(b.0, a.0, b.1, a.1, 0.0, 0.0);
        assert!((d1.planar - d2.planar).abs() < 1e-9);
    }

    #[test]
    fn elevation_only_move() {
        let d = haversine(0.5, 0.5, 0.5, 0.5, 0.0, 30.0);
        assert_eq!(d.planar, 0.0);
        assert!((d.full - 30.0).abs() < 1e-12);
    }

    #[test]
    fn ellipsoidal_strategies_agree() {
        // Paris -> London, all ellipsoidal strategies within a few meters
        // of each other and within ~0.5% of the haversine.
        let (lat1, lon1) = (48.8566 * DEG, 2.3522 * DEG);
        let (lat2, lon2) = (51.5074 * DEG, -0.1278 * DEG);

        let h = haversine(lat1, lat2, lon1, lon2, 0.0, 0.0).planar;
        let t = thomas(lat1, lat2, lon1, lon2);
        let v = vincenty(lat1, lat2, lon1, lon2);
        let k = karney(lat1, lat2, lon1, lon2);

        assert!((v - k).abs() < 10.0, "vincenty={v} karney={k}");
        assert!((t - k).abs() < 50.0, "thomas={t} karney={k}");
        assert!((h - k).abs() / k < 0.005, "haversine={h} karney={k}");
    }

    #[test]
    fn coincident_points_are_zero() {
        for func in [
            DistanceFunc::Haversine,
            DistanceFunc::Thomas,
            DistanceFunc::Vincenty,
            DistanceFunc::Karney,
        ] {
            let d = func.distance(0.8, 0.8, 0.2, 0.2, 100.0, 100.0);
            assert!(d.planar.abs() < 1e-6, "{func:?}: {}", d.planar);
        }
    }

    #[test]
    fn selector_round_trip() {
        for i in 0..4u8 {
            assert_eq!(DistanceFunc::from_index(i).index(), i);
        }
        assert_eq!(DistanceFunc::from_index(42), DistanceFunc::Haversine);
    }
}
