//! NZTM2000 → WGS84 conversion
//!
//! Closed-form inverse of the ellipsoidal transverse Mercator projection
//! (meridian-distance inverse, footpoint latitude, then the latitude and
//! longitude correction series in powers of the distance from the central
//! meridian). No iteration; every call is independent.
//!
//! The projection parameters are exposed as named constants so results can
//! be validated against published reference points.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// GRS80 semi-major axis (metres).
pub const GRS80_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// GRS80 flattening.
pub const GRS80_FLATTENING: f64 = 1.0 / 298.257222101;
/// NZTM2000 central meridian (degrees east).
pub const NZTM_CENTRAL_MERIDIAN: f64 = 173.0;
/// NZTM2000 false northing (metres).
pub const NZTM_FALSE_NORTHING: f64 = 10_000_000.0;
/// NZTM2000 false easting (metres).
pub const NZTM_FALSE_EASTING: f64 = 1_600_000.0;
/// NZTM2000 central scale factor.
pub const NZTM_SCALE_FACTOR: f64 = 0.9996;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Axis-aligned lat/lon window, used to sanity-check converted points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicExtent {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl GeographicExtent {
    /// Published mainland + near-shore extent of NZTM2000.
    pub const NZTM2000: Self = Self {
        min_latitude: -47.0,
        max_latitude: -34.0,
        min_longitude: 166.0,
        max_longitude: 178.0,
    };

    pub fn contains(&self, p: LatLon) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&p.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&p.longitude)
    }
}

/// Transverse Mercator projection parameters on a reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    pub semi_major_axis: f64,
    pub flattening: f64,
    /// Degrees.
    pub central_meridian: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub scale_factor: f64,
}

impl TransverseMercator {
    pub const NZTM2000: Self = Self {
        semi_major_axis: GRS80_SEMI_MAJOR_AXIS,
        flattening: GRS80_FLATTENING,
        central_meridian: NZTM_CENTRAL_MERIDIAN,
        false_easting: NZTM_FALSE_EASTING,
        false_northing: NZTM_FALSE_NORTHING,
        scale_factor: NZTM_SCALE_FACTOR,
    };

    /// Projected (easting, northing) → geographic degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> LatLon {
        let a = self.semi_major_axis;
        let f = self.flattening;
        let k0 = self.scale_factor;

        let b = a * (1.0 - f);
        let e2 = 2.0 * f - f * f;

        // Footpoint latitude from the rectifying meridian distance.
        let meridian_distance = (northing - self.false_northing) / k0;
        let n = (a - b) / (a + b);
        let (n2, n3, n4) = (n * n, n * n * n, n * n * n * n);
        let g = a * (1.0 - n) * (1.0 - n2) * (1.0 + 9.0 * n2 / 4.0 + 225.0 * n4 / 64.0) * PI
            / 180.0;
        let sigma = meridian_distance * PI / (180.0 * g);
        let phi = sigma
            + (3.0 * n / 2.0 - 27.0 * n3 / 32.0) * (2.0 * sigma).sin()
            + (21.0 * n2 / 16.0 - 55.0 * n4 / 32.0) * (4.0 * sigma).sin()
            + (151.0 * n3 / 96.0) * (6.0 * sigma).sin()
            + (1097.0 * n4 / 512.0) * (8.0 * sigma).sin();

        // Radii of curvature at the footpoint.
        let sin_phi = phi.sin();
        let w = 1.0 - e2 * sin_phi * sin_phi;
        let rho = a * (1.0 - e2) / w.powf(1.5);
        let nu = a / w.sqrt();

        let psi = nu / rho;
        let (psi2, psi3, psi4) = (psi * psi, psi * psi * psi, psi * psi * psi * psi);
        let t = phi.tan();
        let (t2, t4, t6) = (t * t, t.powi(4), t.powi(6));
        let sec = 1.0 / phi.cos();

        let e = easting - self.false_easting;
        let x = e / (k0 * nu);

        let lat1 = t * e * x / (k0 * rho * 2.0);
        let lat2 = lat1 * x.powi(2) / 12.0 * (-4.0 * psi2 + 9.0 * psi * (1.0 - t2) + 12.0 * t2);
        let lat3 = t * e * x.powi(5) / (k0 * rho * 720.0)
            * (8.0 * psi4 * (11.0 - 24.0 * t2) - 12.0 * psi3 * (21.0 - 71.0 * t2)
                + 15.0 * psi2 * (15.0 - 98.0 * t2 + 15.0 * t4)
                + 180.0 * psi * (5.0 * t2 - 3.0 * t4)
                + 360.0 * t4);
        let lat4 = t * e * x.powi(7) / (k0 * rho * 40320.0)
            * (1385.0 + 3633.0 * t2 + 4095.0 * t4 + 1575.0 * t6);

        let lon1 = x * sec;
        let lon2 = x.powi(3) * sec / 6.0 * (psi + 2.0 * t2);
        let lon3 = x.powi(5) * sec / 120.0
            * (-4.0 * psi3 * (1.0 - 6.0 * t2) + psi2 * (9.0 - 68.0 * t2) + 72.0 * psi * t2
                + 24.0 * t4);
        let lon4 = x.powi(7) * sec / 5040.0 * (61.0 + 662.0 * t2 + 1320.0 * t4 + 720.0 * t6);

        LatLon {
            latitude: (phi - lat1 + lat2 - lat3 + lat4) * 180.0 / PI,
            longitude: self.central_meridian + 180.0 / PI * (lon1 - lon2 + lon3 - lon4),
        }
    }

    /// Like [`inverse`](Self::inverse) but for textual coordinates.
    ///
    /// Returns `None` when either value is not a number or the result is not
    /// finite; callers emit that as an absent coordinate pair.
    pub fn inverse_text(&self, easting: &str, northing: &str) -> Option<LatLon> {
        let e = easting.trim().parse::<f64>().ok()?;
        let n = northing.trim().parse::<f64>().ok()?;
        if !e.is_finite() || !n.is_finite() {
            return None;
        }
        Some(self.inverse(e, n)).filter(LatLon::is_finite)
    }
}

/// NZTM2000 easting/northing → WGS84 latitude/longitude.
pub fn nztm_to_wgs84(easting: f64, northing: f64) -> LatLon {
    TransverseMercator::NZTM2000.inverse(easting, northing)
}

/// Textual variant of [`nztm_to_wgs84`]; `None` for unparseable input.
pub fn convert_text(easting: &str, northing: &str) -> Option<LatLon> {
    TransverseMercator::NZTM2000.inverse_text(easting, northing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_maps_to_equator_on_central_meridian() {
        let p = nztm_to_wgs84(NZTM_FALSE_EASTING, NZTM_FALSE_NORTHING);
        assert_abs_diff_eq!(p.latitude, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.longitude, NZTM_CENTRAL_MERIDIAN, epsilon = 1e-9);
    }

    #[test]
    fn christchurch_reference_point() {
        let p = nztm_to_wgs84(1_570_000.0, 5_180_000.0);
        assert_abs_diff_eq!(p.latitude, -43.532340, epsilon = 5e-7);
        assert_abs_diff_eq!(p.longitude, 172.628718, epsilon = 5e-7);
        assert!(GeographicExtent::NZTM2000.contains(p));
    }

    #[test]
    fn text_input_is_trimmed() {
        let p = convert_text(" 1570000 ", "5180000.0").expect("parses");
        assert_abs_diff_eq!(p.latitude, -43.532340, epsilon = 5e-7);
    }

    #[test]
    fn malformed_text_yields_none() {
        assert_eq!(convert_text("abc", "5180000"), None);
        assert_eq!(convert_text("1570000", ""), None);
        assert_eq!(convert_text("NaN", "5180000"), None);
    }
}
