//! Structured nested form conversion (§4.4): a `serde_json::Value` that
//! mirrors the SHP wire layout (explicit part/point counts, coordinate
//! triples/quads) rather than GeoJSON's convention, so it serializes
//! directly without re-deriving counts on the way back in.

use serde_json::{json, Value};

use crate::coord::{Coord, Measure};
use crate::error::{Error, Result};
use crate::geometry::{Geometry, Shape};

fn basetype_name(shape: &Shape) -> &'static str {
    match shape {
        Shape::Point(_) => "Point",
        Shape::MultiPoint(_) => "MultiPoint",
        Shape::Linestring(_) => "Linestring",
        Shape::MultiLinestring(_) => "MultiLinestring",
        Shape::Polygon(_) => "Polygon",
        Shape::MultiPolygon(_) => "MultiPolygon",
    }
}

fn coord_to_array(c: &Coord, has_z: bool, has_m: bool) -> Value {
    let mut arr = vec![json!(c.x), json!(c.y)];
    if has_z {
        arr.push(json!(c.z));
    }
    if has_m {
        arr.push(json!(c.m.to_raw()));
    }
    Value::Array(arr)
}

fn coord_from_array(value: &Value, has_z: bool, has_m: bool) -> Result<Coord> {
    let arr = value
        .as_array()
        .ok_or_else(|| Error::ArrayNotValid("coordinate entry is not an array".into()))?;
    let nums: Vec<f64> = arr
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| Error::InvalidCoordinate(v.to_string()))
        })
        .collect::<Result<Vec<f64>>>()?;
    let expected = 2 + has_z as usize + has_m as usize;
    if nums.len() != expected {
        return Err(Error::ArrayNotValid(format!(
            "expected {expected} coordinate components, found {}",
            nums.len()
        )));
    }
    let z = if has_z { nums[2] } else { 0.0 };
    let m = if has_z && has_m {
        Measure::from_raw(nums[3])
    } else if has_m {
        Measure::from_raw(nums[2])
    } else {
        Measure::NoData
    };
    Ok(Coord { x: nums[0], y: nums[1], z, m })
}

fn points_to_array(points: &[Coord], has_z: bool, has_m: bool) -> Value {
    json!({
        "numPoints": points.len(),
        "points": points.iter().map(|p| coord_to_array(p, has_z, has_m)).collect::<Vec<_>>(),
    })
}

fn points_from_array(value: &Value, has_z: bool, has_m: bool) -> Result<Vec<Coord>> {
    let points = value
        .get("points")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::ArrayNotValid("missing \"points\" array".into()))?;
    points.iter().map(|p| coord_from_array(p, has_z, has_m)).collect()
}

fn parts_to_array(parts: &[Vec<Coord>], has_z: bool, has_m: bool) -> Value {
    let total_points: usize = parts.iter().map(Vec::len).sum();
    json!({
        "numParts": parts.len(),
        "numPoints": total_points,
        "parts": parts.iter().map(|p| points_to_array(p, has_z, has_m)).collect::<Vec<_>>(),
    })
}

fn parts_from_array(value: &Value, has_z: bool, has_m: bool) -> Result<Vec<Vec<Coord>>> {
    let parts = value
        .get("parts")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::ArrayNotValid("missing \"parts\" array".into()))?;
    parts.iter().map(|p| points_from_array(p, has_z, has_m)).collect()
}

/// Renders `geom` as the structured nested form: a JSON object carrying
/// its base type, Z/M flags, explicit part/point counts, and the
/// coordinate data itself, ready for direct serialization.
pub fn to_array(geom: &Geometry) -> Value {
    let has_z = geom.is_z();
    let has_m = geom.is_m();
    let mut obj = serde_json::Map::new();
    obj.insert("type".to_string(), json!(basetype_name(&geom.shape)));
    obj.insert("hasZ".to_string(), json!(has_z));
    obj.insert("hasM".to_string(), json!(has_m));
    obj.insert("isEmpty".to_string(), json!(geom.is_empty()));

    let body = match &geom.shape {
        Shape::Point(c) => {
            json!({ "point": coord_to_array(c, has_z, has_m) })
        }
        Shape::MultiPoint(pts) => points_to_array(pts, has_z, has_m),
        Shape::Linestring(pts) => points_to_array(pts, has_z, has_m),
        Shape::MultiLinestring(parts) => parts_to_array(parts, has_z, has_m),
        Shape::Polygon(rings) => parts_to_array(rings, has_z, has_m),
        Shape::MultiPolygon(polys) => {
            let total_parts: usize = polys.iter().map(Vec::len).sum();
            json!({
                "numPolygons": polys.len(),
                "numParts": total_parts,
                "polygons": polys.iter().map(|p| parts_to_array(p, has_z, has_m)).collect::<Vec<_>>(),
            })
        }
    };
    if let Value::Object(body_obj) = body {
        obj.extend(body_obj);
    }
    Value::Object(obj)
}

/// Parses the structured nested form produced by [`to_array`] back into
/// a [`Geometry`].
pub fn from_array(value: &Value) -> Result<Geometry> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::ArrayNotValid("expected a JSON object".into()))?;
    let type_name = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::ArrayNotValid("missing \"type\"".into()))?;
    let has_z = obj.get("hasZ").and_then(Value::as_bool).unwrap_or(false);
    let has_m = obj.get("hasM").and_then(Value::as_bool).unwrap_or(false);
    let is_empty = obj.get("isEmpty").and_then(Value::as_bool).unwrap_or(false);

    if is_empty {
        let shape = match type_name {
            "Point" => Shape::Point(Coord::xy(0.0, 0.0)),
            "MultiPoint" => Shape::MultiPoint(Vec::new()),
            "Linestring" => Shape::Linestring(Vec::new()),
            "MultiLinestring" => Shape::MultiLinestring(Vec::new()),
            "Polygon" => Shape::Polygon(Vec::new()),
            "MultiPolygon" => Shape::MultiPolygon(Vec::new()),
            other => return Err(Error::GeometryTypeNotValid(other.to_string())),
        };
        return Ok(Geometry::new(shape, true, has_z, has_m));
    }

    let shape = match type_name {
        "Point" => {
            let point = value
                .get("point")
                .ok_or_else(|| Error::ArrayNotValid("missing \"point\"".into()))?;
            Shape::Point(coord_from_array(point, has_z, has_m)?)
        }
        "MultiPoint" => Shape::MultiPoint(points_from_array(value, has_z, has_m)?),
        "Linestring" => Shape::Linestring(points_from_array(value, has_z, has_m)?),
        "MultiLinestring" => Shape::MultiLinestring(parts_from_array(value, has_z, has_m)?),
        "Polygon" => Shape::Polygon(parts_from_array(value, has_z, has_m)?),
        "MultiPolygon" => {
            let polygons = obj
                .get("polygons")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::ArrayNotValid("missing \"polygons\" array".into()))?;
            let polys = polygons
                .iter()
                .map(|p| parts_from_array(p, has_z, has_m))
                .collect::<Result<Vec<_>>>()?;
            Shape::MultiPolygon(polys)
        }
        other => return Err(Error::GeometryTypeNotValid(other.to_string())),
    };
    Ok(Geometry::new(shape, false, has_z, has_m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_round_trips() {
        let geom = Geometry::new(Shape::Point(Coord::xy(1.0, 2.0)), false, false, false);
        let arr = to_array(&geom);
        assert_eq!(arr["type"], "Point");
        let back = from_array(&arr).unwrap();
        assert_eq!(back.shape, geom.shape);
    }

    #[test]
    fn polygon_with_hole_round_trips() {
        let outer = vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(0.0, 10.0),
            Coord::xy(10.0, 10.0),
            Coord::xy(10.0, 0.0),
            Coord::xy(0.0, 0.0),
        ];
        let hole = vec![
            Coord::xy(2.0, 2.0),
            Coord::xy(4.0, 2.0),
            Coord::xy(4.0, 4.0),
            Coord::xy(2.0, 4.0),
            Coord::xy(2.0, 2.0),
        ];
        let geom = Geometry::new(Shape::Polygon(vec![outer, hole]), false, false, false);
        let arr = to_array(&geom);
        assert_eq!(arr["numParts"], 2);
        let back = from_array(&arr).unwrap();
        assert_eq!(back.shape, geom.shape);
    }

    #[test]
    fn empty_multipoint_round_trips() {
        let geom = Geometry::new(Shape::MultiPoint(Vec::new()), true, false, false);
        let arr = to_array(&geom);
        let back = from_array(&arr).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn z_and_m_components_round_trip() {
        let geom = Geometry::new(
            Shape::Point(Coord::xyzm(1.0, 2.0, 3.0, Measure::Value(4.0))),
            false,
            true,
            true,
        );
        let arr = to_array(&geom);
        let back = from_array(&arr).unwrap();
        assert_eq!(back.shape, geom.shape);
    }
}
