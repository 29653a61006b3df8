//! GeoJSON conversion (§4.4), backed by `serde_json`'s generic `Value`
//! rather than strongly-typed per-variant structs — the geometry model
//! already owns the variant tagging, so there is no need to duplicate it
//! in a second set of serde-derived types.

use serde_json::{json, Map, Value};

use crate::attributes::AttributeValue;
use crate::bounds::Bounds;
use crate::coord::{Coord, Measure};
use crate::error::{Error, Result};
use crate::geometry::{Geometry, Shape};

/// Controls the two independently toggleable output knobs §4.4
/// describes: whether to include a computed `bbox`, and whether to wrap
/// the geometry in a `Feature` envelope carrying `properties`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonOptions {
    pub include_bbox: bool,
    pub as_feature: bool,
}

fn geojson_base_name(shape: &Shape) -> &'static str {
    match shape {
        Shape::Point(_) => "Point",
        Shape::MultiPoint(_) => "MultiPoint",
        Shape::Linestring(_) => "LineString",
        Shape::MultiLinestring(_) => "MultiLineString",
        Shape::Polygon(_) => "Polygon",
        Shape::MultiPolygon(_) => "MultiPolygon",
    }
}

fn coord_to_json(c: &Coord, has_z: bool, has_m: bool) -> Value {
    let mut arr = vec![json!(c.x), json!(c.y)];
    if has_z {
        arr.push(json!(c.z));
    }
    if has_m {
        arr.push(json!(c.m.to_raw()));
    }
    Value::Array(arr)
}

fn attribute_value_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Character(s) | AttributeValue::Memo(s) => json!(s),
        AttributeValue::Numeric(n) => json!(n),
        AttributeValue::Logical(b) => json!(b),
        AttributeValue::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
    }
}

fn json_to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::String(s) => AttributeValue::Character(s.clone()),
        Value::Number(n) => AttributeValue::Numeric(n.as_f64().unwrap_or(0.0)),
        Value::Bool(b) => AttributeValue::Logical(*b),
        other => AttributeValue::Character(other.to_string()),
    }
}

/// Shapefile specifies clockwise-outer/counterclockwise-inner; RFC 7946
/// specifies the opposite. Reversing every ring's point order flips the
/// winding of each ring without needing to know which role (outer/hole)
/// it plays, so this one helper handles both directions of the
/// conversion.
fn invert_ring_orientation(rings: &[Vec<Coord>]) -> Vec<Vec<Coord>> {
    rings
        .iter()
        .map(|ring| ring.iter().rev().copied().collect())
        .collect()
}

fn bbox_to_json(bounds: &Bounds, has_z: bool, has_m: bool) -> Value {
    let mut arr = vec![
        json!(bounds.xy.min_x),
        json!(bounds.xy.min_y),
    ];
    if has_z {
        if let Some((zmin, _)) = bounds.z {
            arr.push(json!(zmin));
        }
    }
    arr.push(json!(bounds.xy.max_x));
    arr.push(json!(bounds.xy.max_y));
    if has_z {
        if let Some((_, zmax)) = bounds.z {
            arr.push(json!(zmax));
        }
    }
    let _ = has_m; // the M axis has no place in the GeoJSON bbox convention
    Value::Array(arr)
}

/// Renders `geom` as a GeoJSON `Value`, either a bare geometry object or
/// a `Feature` wrapper, per `options`.
pub fn to_geojson(geom: &Geometry, options: &GeoJsonOptions) -> Value {
    let has_z = geom.is_z();
    let has_m = geom.is_m();
    let type_name = format!(
        "{}{}",
        geojson_base_name(&geom.shape),
        if has_m { "M" } else { "" }
    );

    let coordinates = if geom.is_empty() {
        Value::Array(Vec::new())
    } else {
        match &geom.shape {
            Shape::Point(c) => coord_to_json(c, has_z, has_m),
            Shape::MultiPoint(pts) => {
                Value::Array(pts.iter().map(|p| coord_to_json(p, has_z, has_m)).collect())
            }
            Shape::Linestring(pts) => {
                Value::Array(pts.iter().map(|p| coord_to_json(p, has_z, has_m)).collect())
            }
            Shape::MultiLinestring(parts) => Value::Array(
                parts
                    .iter()
                    .map(|part| {
                        Value::Array(part.iter().map(|p| coord_to_json(p, has_z, has_m)).collect())
                    })
                    .collect(),
            ),
            Shape::Polygon(rings) => Value::Array(
                invert_ring_orientation(rings)
                    .iter()
                    .map(|ring| {
                        Value::Array(ring.iter().map(|p| coord_to_json(p, has_z, has_m)).collect())
                    })
                    .collect(),
            ),
            Shape::MultiPolygon(polys) => Value::Array(
                polys
                    .iter()
                    .map(|poly| {
                        Value::Array(
                            invert_ring_orientation(poly)
                                .iter()
                                .map(|ring| {
                                    Value::Array(
                                        ring.iter()
                                            .map(|p| coord_to_json(p, has_z, has_m))
                                            .collect(),
                                    )
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    };

    let mut geometry_obj = Map::new();
    geometry_obj.insert("type".to_string(), json!(type_name));
    geometry_obj.insert("coordinates".to_string(), coordinates);
    if options.include_bbox && !geom.is_empty() {
        geometry_obj.insert(
            "bbox".to_string(),
            bbox_to_json(&geom.get_bounding_box(), has_z, has_m),
        );
    }
    let geometry_value = Value::Object(geometry_obj);

    if options.as_feature {
        let mut props = Map::new();
        for (name, value) in geom.attributes.iter() {
            props.insert(name.to_string(), attribute_value_to_json(value));
        }
        let mut feature = Map::new();
        feature.insert("type".to_string(), json!("Feature"));
        feature.insert("geometry".to_string(), geometry_value);
        feature.insert("properties".to_string(), Value::Object(props));
        Value::Object(feature)
    } else {
        geometry_value
    }
}

fn split_type_suffix(type_name: &str) -> (&str, bool) {
    if let Some(stripped) = type_name.strip_suffix('M') {
        if matches!(
            stripped,
            "Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon" | "MultiPolygon"
        ) {
            return (stripped, true);
        }
    }
    (type_name, false)
}

fn first_tuple_len(value: &Value) -> Option<usize> {
    let arr = value.as_array()?;
    if arr.is_empty() {
        return None;
    }
    if arr[0].is_number() {
        Some(arr.len())
    } else {
        first_tuple_len(&arr[0])
    }
}

fn as_array<'a>(value: &'a Value) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::InvalidGeoJson("expected a JSON array".into()))
}

/// Decodes one coordinate tuple. A 3-element tuple is ambiguous between
/// "z, no m" and "no z, m"; per §4.4 that is resolved by the `M` type
/// tag the caller has already parsed out of `"type"`.
fn coord_from_json(value: &Value, has_z: bool, has_m: bool) -> Result<Coord> {
    let arr = as_array(value)?;
    let nums: Vec<f64> = arr
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| Error::InvalidCoordinate(v.to_string()))
        })
        .collect::<Result<Vec<f64>>>()?;
    if nums.len() < 2 {
        return Err(Error::InvalidGeoJson(
            "coordinate tuple needs at least x, y".into(),
        ));
    }
    let (z, m) = match nums.len() {
        2 => (0.0, Measure::NoData),
        3 => {
            if has_m && !has_z {
                (0.0, Measure::from_raw(nums[2]))
            } else {
                (nums[2], Measure::NoData)
            }
        }
        4 => (nums[2], Measure::from_raw(nums[3])),
        n => return Err(Error::InvalidGeoJson(format!("unexpected coordinate length {n}"))),
    };
    Ok(Coord {
        x: nums[0],
        y: nums[1],
        z,
        m,
    })
}

fn parse_coord_list(value: &Value, has_z: bool, has_m: bool) -> Result<Vec<Coord>> {
    as_array(value)?
        .iter()
        .map(|c| coord_from_json(c, has_z, has_m))
        .collect()
}

fn parse_coord_groups(value: &Value, has_z: bool, has_m: bool) -> Result<Vec<Vec<Coord>>> {
    as_array(value)?
        .iter()
        .map(|group| parse_coord_list(group, has_z, has_m))
        .collect()
}

fn empty_shape_for(base: &str) -> Result<Shape> {
    Ok(match base {
        "Point" => Shape::Point(Coord::xy(0.0, 0.0)),
        "MultiPoint" => Shape::MultiPoint(Vec::new()),
        "LineString" => Shape::Linestring(Vec::new()),
        "MultiLineString" => Shape::MultiLinestring(Vec::new()),
        "Polygon" => Shape::Polygon(Vec::new()),
        "MultiPolygon" => Shape::MultiPolygon(Vec::new()),
        other => return Err(Error::GeometryTypeNotValid(other.to_string())),
    })
}

/// Parses a GeoJSON geometry object or `Feature` wrapper into a
/// [`Geometry`]. When given a `Feature`, `properties` are merged into
/// the geometry's attribute dictionary (§4.4).
pub fn from_geojson(value: &Value) -> Result<Geometry> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::InvalidGeoJson("expected a JSON object".into()))?;
    let type_str = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidGeoJson("missing \"type\"".into()))?;

    if type_str == "Feature" {
        let geometry_val = obj
            .get("geometry")
            .ok_or_else(|| Error::InvalidGeoJson("Feature missing \"geometry\"".into()))?;
        let mut geom = from_geojson(geometry_val)?;
        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            for (name, v) in props {
                geom.set_data(name, json_to_attribute_value(v));
            }
        }
        return Ok(geom);
    }

    let (base, type_has_m) = split_type_suffix(type_str);
    let coordinates = obj
        .get("coordinates")
        .ok_or_else(|| Error::InvalidGeoJson("missing \"coordinates\"".into()))?;
    let is_empty = coordinates.as_array().map(|a| a.is_empty()).unwrap_or(true);

    if is_empty {
        let shape = empty_shape_for(base)?;
        return Ok(Geometry::new(shape, true, false, type_has_m));
    }

    let tuple_len = first_tuple_len(coordinates)
        .ok_or_else(|| Error::InvalidGeoJson("could not determine coordinate dimension".into()))?;
    let (has_z, has_m) = match tuple_len {
        4 => (true, true),
        3 if type_has_m => (false, true),
        3 => (true, false),
        _ => (false, false),
    };

    let shape = match base {
        "Point" => Shape::Point(coord_from_json(coordinates, has_z, has_m)?),
        "MultiPoint" => Shape::MultiPoint(parse_coord_list(coordinates, has_z, has_m)?),
        "LineString" => Shape::Linestring(parse_coord_list(coordinates, has_z, has_m)?),
        "MultiLineString" => Shape::MultiLinestring(parse_coord_groups(coordinates, has_z, has_m)?),
        "Polygon" => {
            let rings = parse_coord_groups(coordinates, has_z, has_m)?;
            Shape::Polygon(invert_ring_orientation(&rings))
        }
        "MultiPolygon" => {
            let polys = as_array(coordinates)?
                .iter()
                .map(|poly| {
                    parse_coord_groups(poly, has_z, has_m)
                        .map(|rings| invert_ring_orientation(&rings))
                })
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
        let json = to_geojson(&geom, &GeoJsonOptions::default());
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"], json!([1.0, 2.0]));
        let back = from_geojson(&json).unwrap();
        assert_eq!(back.shape, geom.shape);
    }

    #[test]
    fn m_type_round_trips_three_element_coords() {
        let geom = Geometry::new(
            Shape::Point(Coord::xym(1.0, 2.0, Measure::Value(9.0))),
            false,
            false,
            true,
        );
        let json = to_geojson(&geom, &GeoJsonOptions::default());
        assert_eq!(json["type"], "PointM");
        assert_eq!(json["coordinates"].as_array().unwrap().len(), 3);
        let back = from_geojson(&json).unwrap();
        assert_eq!(back.shape, geom.shape);
        assert!(!back.is_z());
        assert!(back.is_m());
    }

    #[test]
    fn plain_type_with_three_element_coords_decodes_as_z_not_m() {
        let geom = Geometry::new(
            Shape::Point(Coord::xyzm(1.0, 2.0, 3.0, Measure::NoData)),
            false,
            true,
            false,
        );
        let json = to_geojson(&geom, &GeoJsonOptions::default());
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"].as_array().unwrap().len(), 3);
        let back = from_geojson(&json).unwrap();
        assert_eq!(back.shape, geom.shape);
        assert!(back.is_z());
        assert!(!back.is_m());
    }

    #[test]
    fn feature_wrapper_merges_properties() {
        let geom = Geometry::new(Shape::Point(Coord::xy(0.0, 0.0)), false, false, false);
        let json = to_geojson(
            &geom,
            &GeoJsonOptions {
                include_bbox: false,
                as_feature: true,
            },
        );
        let mut obj = json.as_object().unwrap().clone();
        obj.get_mut("properties")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .insert("NAME".to_string(), json!("abc"));
        let wrapped = Value::Object(obj);
        let back = from_geojson(&wrapped).unwrap();
        assert_eq!(
            back.get_data("NAME"),
            Some(&AttributeValue::Character("abc".to_string()))
        );
    }

    #[test]
    fn polygon_includes_bbox_when_requested() {
        let rings = vec![vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(0.0, 1.0),
            Coord::xy(1.0, 1.0),
            Coord::xy(1.0, 0.0),
            Coord::xy(0.0, 0.0),
        ]];
        let geom = Geometry::new(Shape::Polygon(rings), false, false, false);
        let json = to_geojson(
            &geom,
            &GeoJsonOptions {
                include_bbox: true,
                as_feature: false,
            },
        );
        assert!(json.get("bbox").is_some());
    }

    #[test]
    fn polygon_output_reverses_shapefile_orientation() {
        // Clockwise outer ring, the Shapefile convention.
        let outer = vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(0.0, 1.0),
            Coord::xy(1.0, 1.0),
            Coord::xy(1.0, 0.0),
            Coord::xy(0.0, 0.0),
        ];
        let geom = Geometry::new(Shape::Polygon(vec![outer.clone()]), false, false, false);
        let json = to_geojson(&geom, &GeoJsonOptions::default());
        let expected: Vec<Value> = outer
            .iter()
            .rev()
            .map(|p| json!([p.x, p.y]))
            .collect();
        assert_eq!(json["coordinates"][0], Value::Array(expected));

        let back = from_geojson(&json).unwrap();
        assert_eq!(back.shape, geom.shape);
    }
}
