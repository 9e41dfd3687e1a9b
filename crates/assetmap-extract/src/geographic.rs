//! Geographic extent column for designated layers.

use assetmap_nztm::{LatLon, TransverseMercator};

use crate::geometry::Bounds;

/// Header of the extra column.
pub const GEOGRAPHIC_COLUMN: &str = "geometry";

fn corner(easting: f64, northing: f64) -> Option<LatLon> {
    let p = TransverseMercator::NZTM2000.inverse(easting, northing);
    p.is_finite().then_some(p)
}

/// `"{lon_lo},{lat_lo},0 {lon_hi},{lat_hi},0"` from NZTM bounds; empty when
/// either corner has no value.
pub fn geographic_summary(bounds: Option<Bounds>) -> String {
    let Some(b) = bounds else {
        return String::new();
    };
    match (corner(b.x_lo, b.y_lo), corner(b.x_hi, b.y_hi)) {
        (Some(lo), Some(hi)) => format!(
            "{},{},0 {},{},0",
            lo.longitude, lo.latitude, hi.longitude, hi.latitude
        ),
        _ => String::new(),
    }
}
