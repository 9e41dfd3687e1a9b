//! Geometry classification and bounds.
//!
//! Only points and multi-line strings get bounds; every other kind is
//! classified but left without coordinates.

use geo::{BoundingRect, Coord, Geometry, LineString, MultiLineString, MultiPoint, Point, Polygon};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::GeometryError;

/// Geometry kinds with their WKB type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    pub fn of(geometry: &Geometry<f64>) -> Self {
        match geometry {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Line(_) | Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => {
                GeometryKind::Polygon
            }
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    pub fn wkb_code(self) -> i64 {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::LineString => 2,
            GeometryKind::Polygon => 3,
            GeometryKind::MultiPoint => 4,
            GeometryKind::MultiLineString => 5,
            GeometryKind::MultiPolygon => 6,
            GeometryKind::GeometryCollection => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }
}

/// Low and high corners in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_lo: f64,
    pub y_lo: f64,
    pub x_hi: f64,
    pub y_hi: f64,
}

impl Bounds {
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            x_lo: x,
            y_lo: y,
            x_hi: x,
            y_hi: y,
        }
    }
}

/// Bounds of a point (its own coordinate twice) or a multi-line string (the
/// extent of its boundary). Everything else has none.
pub fn bounds(geometry: &Geometry<f64>) -> Option<Bounds> {
    match geometry {
        Geometry::Point(p) => Some(Bounds::point(p.x(), p.y())),
        Geometry::MultiLineString(lines) => {
            let rect = boundary(lines).bounding_rect()?;
            Some(Bounds {
                x_lo: rect.min().x,
                y_lo: rect.min().y,
                x_hi: rect.max().x,
                y_hi: rect.max().y,
            })
        }
        _ => None,
    }
}

/// Boundary of a multi-line string under the mod-2 rule: endpoints shared by
/// an even number of parts (including both ends of a closed ring) cancel.
pub fn boundary(lines: &MultiLineString<f64>) -> MultiPoint<f64> {
    let mut order: Vec<Coord<f64>> = Vec::new();
    let mut counts: HashMap<(u64, u64), usize> = HashMap::new();
    for line in lines.iter() {
        let (Some(&first), Some(&last)) = (line.0.first(), line.0.last()) else {
            continue;
        };
        for c in [first, last] {
            let n = counts.entry((c.x.to_bits(), c.y.to_bits())).or_insert(0);
            if *n == 0 {
                order.push(c);
            }
            *n += 1;
        }
    }
    order
        .into_iter()
        .filter(|c| counts[&(c.x.to_bits(), c.y.to_bits())] % 2 == 1)
        .map(Point::from)
        .collect()
}

// ============================================================================
// GeoJSON geometry objects
// ============================================================================

/// Parse a GeoJSON geometry object.
pub fn from_geojson(value: &Value) -> Result<Geometry<f64>, GeometryError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(GeometryError::MissingType)?;
    if kind == "GeometryCollection" {
        let members = value
            .get("geometries")
            .and_then(Value::as_array)
            .ok_or(GeometryError::BadCoordinates("GeometryCollection"))?;
        let geometries = members
            .iter()
            .map(from_geojson)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Geometry::GeometryCollection(geo::GeometryCollection(geometries)));
    }

    let coords = value.get("coordinates").unwrap_or(&Value::Null);
    let geometry = match kind {
        "Point" => Geometry::Point(Point::from(
            coord(coords).ok_or(GeometryError::BadCoordinates("Point"))?,
        )),
        "LineString" => Geometry::LineString(
            line(coords).ok_or(GeometryError::BadCoordinates("LineString"))?,
        ),
        "Polygon" => {
            Geometry::Polygon(polygon(coords).ok_or(GeometryError::BadCoordinates("Polygon"))?)
        }
        "MultiPoint" => Geometry::MultiPoint(
            list(coords, coord)
                .map(|cs| cs.into_iter().map(Point::from).collect::<MultiPoint<f64>>())
                .ok_or(GeometryError::BadCoordinates("MultiPoint"))?,
        ),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString::new(
            list(coords, line).ok_or(GeometryError::BadCoordinates("MultiLineString"))?,
        )),
        "MultiPolygon" => Geometry::MultiPolygon(geo::MultiPolygon::new(
            list(coords, polygon).ok_or(GeometryError::BadCoordinates("MultiPolygon"))?,
        )),
        other => return Err(GeometryError::UnknownType(other.to_string())),
    };
    Ok(geometry)
}

fn list<T>(value: &Value, item: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
    value.as_array()?.iter().map(item).collect()
}

fn coord(value: &Value) -> Option<Coord<f64>> {
    let position = value.as_array()?;
    // Extra ordinates (elevation, measure) are ignored.
    let x = position.first()?.as_f64()?;
    let y = position.get(1)?.as_f64()?;
    Some(Coord { x, y })
}

fn line(value: &Value) -> Option<LineString<f64>> {
    list(value, coord).map(LineString::new)
}

fn polygon(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = list(value, line)?.into_iter();
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Some(Polygon::new(exterior, rings.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn point_bounds_repeat_the_coordinate() {
        let g = from_geojson(&json!({"type": "Point", "coordinates": [1234.5, 6789.0]})).unwrap();
        assert_eq!(GeometryKind::of(&g), GeometryKind::Point);
        assert_eq!(bounds(&g), Some(Bounds::point(1234.5, 6789.0)));
    }

    #[test]
    fn multilinestring_bounds_use_boundary_points() {
        let g = from_geojson(&json!({
            "type": "MultiLineString",
            "coordinates": [
                [[10.0, 20.0], [50.0, 90.0], [30.0, 40.0]],
                [[30.0, 40.0], [5.0, 45.0]]
            ]
        }))
        .unwrap();
        // (30, 40) is shared by both parts and cancels; (50, 90) is interior.
        assert_eq!(
            bounds(&g),
            Some(Bounds {
                x_lo: 5.0,
                y_lo: 20.0,
                x_hi: 10.0,
                y_hi: 45.0
            })
        );
    }

    #[test]
    fn north_west_to_south_east_line_bounds_are_ordered_corners() {
        let g = from_geojson(&json!({
            "type": "MultiLineString",
            "coordinates": [[[1_570_100.0, 5_180_900.0], [1_570_400.0, 5_180_200.0]]]
        }))
        .unwrap();
        // The endpoints taken in order would give y_lo > y_hi.
        assert_eq!(
            bounds(&g),
            Some(Bounds {
                x_lo: 1_570_100.0,
                y_lo: 5_180_200.0,
                x_hi: 1_570_400.0,
                y_hi: 5_180_900.0
            })
        );

        // Two parts: the extent spans the boundary points of both.
        let g = from_geojson(&json!({
            "type": "MultiLineString",
            "coordinates": [
                [[10.0, 90.0], [40.0, 60.0]],
                [[70.0, 50.0], [20.0, 80.0]]
            ]
        }))
        .unwrap();
        let b = bounds(&g).unwrap();
        assert!(b.x_lo <= b.x_hi && b.y_lo <= b.y_hi);
        assert_eq!((b.x_lo, b.y_lo, b.x_hi, b.y_hi), (10.0, 50.0, 70.0, 90.0));
    }

    #[test]
    fn closed_rings_have_no_boundary() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let lines = MultiLineString::new(vec![ring]);
        assert!(boundary(&lines).0.is_empty());
        assert_eq!(bounds(&Geometry::MultiLineString(lines)), None);
    }

    #[test]
    fn other_kinds_are_classified_without_bounds() {
        let g = from_geojson(&json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        }))
        .unwrap();
        let kind = GeometryKind::of(&g);
        assert_eq!((kind.wkb_code(), kind.name()), (3, "POLYGON"));
        assert_eq!(bounds(&g), None);

        let g = from_geojson(&json!({"type": "LineString", "coordinates": [[0, 0], [2, 3]]}))
            .unwrap();
        assert_eq!(GeometryKind::of(&g).wkb_code(), 2);
        assert_eq!(bounds(&g), None);
    }

    #[test]
    fn malformed_geometry_is_an_error() {
        assert_eq!(
            from_geojson(&json!({"coordinates": [1, 2]})),
            Err(GeometryError::MissingType)
        );
        assert_eq!(
            from_geojson(&json!({"type": "Point", "coordinates": ["a", 2]})),
            Err(GeometryError::BadCoordinates("Point"))
        );
        assert_eq!(
            from_geojson(&json!({"type": "Curve", "coordinates": []})),
            Err(GeometryError::UnknownType("Curve".into()))
        );
    }
}
