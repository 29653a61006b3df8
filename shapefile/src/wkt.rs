//! Well-Known Text conversion (§4.4). Hand-rolled: there is no WKT crate
//! in the teacher's dependency tree, and the token-level parsing
//! ergonomics are explicitly out of spec.md's scope, so this is the
//! minimum tokenizer/writer needed to round-trip a [`Geometry`].

use crate::coord::{Coord, Measure};
use crate::error::{Error, Result};
use crate::geometry::{Geometry, Shape};

fn fmt_num(v: f64) -> String {
    format!("{}", v)
}

fn wkt_tag(has_z: bool, has_m: bool) -> &'static str {
    if has_z {
        " Z"
    } else if has_m {
        " M"
    } else {
        ""
    }
}

fn wkt_basetype(shape: &Shape) -> &'static str {
    match shape {
        Shape::Point(_) => "POINT",
        Shape::MultiPoint(_) => "MULTIPOINT",
        Shape::Linestring(_) => "LINESTRING",
        Shape::MultiLinestring(_) => "MULTILINESTRING",
        Shape::Polygon(_) => "POLYGON",
        Shape::MultiPolygon(_) => "MULTIPOLYGON",
    }
}

fn format_coord(c: &Coord, has_z: bool, has_m: bool) -> String {
    let mut parts = vec![fmt_num(c.x), fmt_num(c.y)];
    if has_z {
        parts.push(fmt_num(c.z));
        parts.push(fmt_num(c.m.to_raw()));
    } else if has_m {
        parts.push(fmt_num(c.m.to_raw()));
    }
    parts.join(" ")
}

fn format_coord_list(points: &[Coord], has_z: bool, has_m: bool) -> String {
    format!(
        "({})",
        points
            .iter()
            .map(|p| format_coord(p, has_z, has_m))
            .collect::<Vec<_>>()
            .join(",")
    )
}

fn format_coord_groups(groups: &[Vec<Coord>], has_z: bool, has_m: bool) -> String {
    format!(
        "({})",
        groups
            .iter()
            .map(|g| format_coord_list(g, has_z, has_m))
            .collect::<Vec<_>>()
            .join(",")
    )
}

/// Renders `geom` as WKT, normalizing whitespace (single space between
/// tokens, no space around commas) per §4.4.
pub fn to_wkt(geom: &Geometry) -> String {
    let has_z = geom.is_z();
    let has_m = geom.is_m();
    let basetype = wkt_basetype(&geom.shape);
    let tag = wkt_tag(has_z, has_m);
    if geom.is_empty() {
        return format!("{}{} EMPTY", basetype, tag);
    }
    let body = match &geom.shape {
        Shape::Point(c) => format!("({})", format_coord(c, has_z, has_m)),
        Shape::MultiPoint(pts) => format!(
            "({})",
            pts.iter()
                .map(|p| format!("({})", format_coord(p, has_z, has_m)))
                .collect::<Vec<_>>()
                .join(",")
        ),
        Shape::Linestring(pts) => format_coord_list(pts, has_z, has_m),
        Shape::MultiLinestring(parts) => format_coord_groups(parts, has_z, has_m),
        Shape::Polygon(rings) => format_coord_groups(rings, has_z, has_m),
        Shape::MultiPolygon(polys) => format!(
            "({})",
            polys
                .iter()
                .map(|rings| format_coord_groups(rings, has_z, has_m))
                .collect::<Vec<_>>()
                .join(",")
        ),
    };
    format!("{}{} {}", basetype, tag, body)
}

fn peek_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    &s[..end]
}

fn take_word(s: &str) -> Result<(&str, &str)> {
    let w = peek_word(s);
    if w.is_empty() {
        return Err(Error::InvalidWkt("expected a geometry keyword".into()));
    }
    Ok((w, s[w.len()..].trim_start()))
}

fn maybe_take_tag(s: &str) -> (&str, &str) {
    let w = peek_word(s);
    match w {
        "Z" | "M" | "ZM" => (w, s[w.len()..].trim_start()),
        _ => ("", s),
    }
}

fn starts_with_word(s: &str, w: &str) -> bool {
    peek_word(s) == w
}

fn extract_group(s: &str) -> Result<(&str, &str)> {
    if !s.starts_with('(') {
        return Err(Error::InvalidWkt(format!(
            "expected '(' at {:?}",
            &s[..s.len().min(20)]
        )));
    }
    let mut depth = 0i32;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&s[1..i], s[i + 1..].trim_start()));
                }
            }
            _ => {}
        }
    }
    Err(Error::InvalidWkt("unbalanced parentheses".into()))
}

fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    let tail = s[start..].trim();
    if !tail.is_empty() || !parts.is_empty() {
        parts.push(tail);
    }
    parts
}

fn parse_coord_tuple(s: &str, has_z: bool, has_m: bool) -> Result<Coord> {
    let values: Vec<f64> = s
        .split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| Error::InvalidCoordinate(tok.to_string()))
        })
        .collect::<Result<Vec<f64>>>()?;
    let expected = if has_z { 4 } else if has_m { 3 } else { 2 };
    if values.len() != expected {
        return Err(Error::InvalidWkt(format!(
            "expected {expected} coordinate values, found {}",
            values.len()
        )));
    }
    Ok(Coord {
        x: values[0],
        y: values[1],
        z: if has_z { values[2] } else { 0.0 },
        m: if has_z {
            Measure::from_raw(values[3])
        } else if has_m {
            Measure::from_raw(values[2])
        } else {
            Measure::NoData
        },
    })
}

fn parse_coord_list(s: &str, has_z: bool, has_m: bool) -> Result<Vec<Coord>> {
    let (inner, _) = extract_group(s)?;
    split_top_level(inner)
        .iter()
        .map(|c| parse_coord_tuple(c, has_z, has_m))
        .collect()
}

/// Parses a group of coordinate-groups, e.g. a polygon's rings or a
/// multi-linestring's parts: `((x y,x y),(x y,x y))`.
fn parse_coord_groups(s: &str, has_z: bool, has_m: bool) -> Result<Vec<Vec<Coord>>> {
    let (inner, _) = extract_group(s)?;
    split_top_level(inner)
        .iter()
        .map(|group| parse_coord_list(group, has_z, has_m))
        .collect()
}

fn empty_shape_for(basetype: &str) -> Result<Shape> {
    Ok(match basetype {
        "POINT" => Shape::Point(Coord::xy(0.0, 0.0)),
        "MULTIPOINT" => Shape::MultiPoint(Vec::new()),
        "LINESTRING" => Shape::Linestring(Vec::new()),
        "MULTILINESTRING" => Shape::MultiLinestring(Vec::new()),
        "POLYGON" => Shape::Polygon(Vec::new()),
        "MULTIPOLYGON" => Shape::MultiPolygon(Vec::new()),
        other => return Err(Error::GeometryTypeNotValid(other.to_string())),
    })
}

/// Parses WKT text into a [`Geometry`], computing the Z/M flags from the
/// tag immediately following the base type and validating that every
/// coordinate group carries the expected dimension count.
pub fn from_wkt(text: &str) -> Result<Geometry> {
    let upper = text.trim().to_ascii_uppercase();
    let (basetype, rest) = take_word(&upper)?;
    let basetype = basetype.to_string();
    let (tag, rest) = maybe_take_tag(rest);
    let (has_z, has_m) = match tag {
        "Z" | "ZM" => (true, true),
        "M" => (false, true),
        _ => (false, false),
    };

    if starts_with_word(rest, "EMPTY") {
        let shape = empty_shape_for(&basetype)?;
        return Ok(Geometry::new(shape, true, has_z, has_m));
    }

    let shape = match basetype.as_str() {
        "POINT" => {
            let (inner, _) = extract_group(rest)?;
            Shape::Point(parse_coord_tuple(inner, has_z, has_m)?)
        }
        "MULTIPOINT" => {
            let (inner, _) = extract_group(rest)?;
            let pts = split_top_level(inner)
                .iter()
                .map(|it| {
                    let stripped = it
                        .strip_prefix('(')
                        .and_then(|x| x.strip_suffix(')'))
                        .unwrap_or(it);
                    parse_coord_tuple(stripped, has_z, has_m)
                })
                .collect::<Result<Vec<_>>>()?;
            Shape::MultiPoint(pts)
        }
        "LINESTRING" => Shape::Linestring(parse_coord_list(rest, has_z, has_m)?),
        "MULTILINESTRING" => Shape::MultiLinestring(parse_coord_groups(rest, has_z, has_m)?),
        "POLYGON" => Shape::Polygon(parse_coord_groups(rest, has_z, has_m)?),
        "MULTIPOLYGON" => {
            let (inner, _) = extract_group(rest)?;
            let polys = split_top_level(inner)
                .iter()
                .map(|p| parse_coord_groups(p, has_z, has_m))
                .collect::<Result<Vec<_>>>()?;
            Shape::MultiPolygon(polys)
        }
        other => return Err(Error::InvalidWkt(format!("unknown base type {other:?}"))),
    };
    Ok(Geometry::new(shape, false, has_z, has_m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_round_trips() {
        let geom = Geometry::new(Shape::Point(Coord::xy(1.5, 2.5)), false, false, false);
        let wkt = to_wkt(&geom);
        assert_eq!(wkt, "POINT (1.5 2.5)");
        let back = from_wkt(&wkt).unwrap();
        assert_eq!(back.shape, geom.shape);
    }

    #[test]
    fn point_z_round_trips() {
        let geom = Geometry::new(
            Shape::Point(Coord {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                m: Measure::Value(4.0),
            }),
            false,
            true,
            true,
        );
        let wkt = to_wkt(&geom);
        assert_eq!(wkt, "POINT Z (1 2 3 4)");
        let back = from_wkt(&wkt).unwrap();
        assert_eq!(back.shape, geom.shape);
        assert!(back.is_z());
        assert!(back.is_m());
    }

    #[test]
    fn empty_linestring_round_trips() {
        let geom = Geometry::new(Shape::Linestring(Vec::new()), true, false, false);
        let wkt = to_wkt(&geom);
        assert_eq!(wkt, "LINESTRING EMPTY");
        let back = from_wkt(&wkt).unwrap();
        assert!(back.is_empty());
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
        let wkt = to_wkt(&geom);
        let back = from_wkt(&wkt).unwrap();
        assert_eq!(back.shape, geom.shape);
    }

    #[test]
    fn wrong_coordinate_count_is_rejected() {
        assert!(matches!(from_wkt("POINT (1 2 3)"), Err(Error::InvalidWkt(_))));
    }

    #[test]
    fn missing_parens_is_rejected() {
        assert!(from_wkt("POINT 1 2").is_err());
    }
}
