//! The tagged-union geometry model (§3, §4.3) that every codec and
//! converter in this crate produces or consumes.

use crate::attributes::AttributeDict;
use crate::bounds::Bounds;
use crate::coord::Coord;
use crate::error::{Error, Result};
use crate::ring;
use crate::shape_type::BaseShapeType;

/// The geometric payload of a record, as a tagged union over the six
/// variants the format supports. A ring is simply `Vec<Coord>`; a
/// polygon's ring 0 is its outer boundary, rings 1..N are holes.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    Linestring(Vec<Coord>),
    MultiLinestring(Vec<Vec<Coord>>),
    Polygon(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Shape {
    pub fn base_shape_type(&self) -> BaseShapeType {
        match self {
            Shape::Point(_) => BaseShapeType::Point,
            Shape::MultiPoint(_) => BaseShapeType::MultiPoint,
            Shape::Linestring(_) | Shape::MultiLinestring(_) => BaseShapeType::PolyLine,
            Shape::Polygon(_) | Shape::MultiPolygon(_) => BaseShapeType::Polygon,
        }
    }

    fn all_coords(&self) -> Vec<&Coord> {
        match self {
            Shape::Point(c) => vec![c],
            Shape::MultiPoint(pts) => pts.iter().collect(),
            Shape::Linestring(pts) => pts.iter().collect(),
            Shape::MultiLinestring(parts) => parts.iter().flatten().collect(),
            Shape::Polygon(rings) => rings.iter().flatten().collect(),
            Shape::MultiPolygon(polys) => polys.iter().flatten().flatten().collect(),
        }
    }
}

/// Every geometry variant carries the same record-level metadata: an
/// independent empty flag, Z/M presence, a DBF-level deleted flag, the
/// attribute dictionary, and an optional bounding box override.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub shape: Shape,
    empty: bool,
    has_z: bool,
    has_m: bool,
    deleted: bool,
    pub attributes: AttributeDict,
    custom_bbox: Option<Bounds>,
}

impl Geometry {
    pub fn new(shape: Shape, empty: bool, has_z: bool, has_m: bool) -> Geometry {
        Geometry {
            shape,
            empty,
            has_z,
            has_m,
            deleted: false,
            attributes: AttributeDict::new(),
            custom_bbox: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_z(&self) -> bool {
        self.has_z
    }

    pub fn is_m(&self) -> bool {
        self.has_m
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn set_flag_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    pub fn set_custom_bounding_box(&mut self, bbox: Bounds) -> Result<()> {
        if bbox.z.is_some() != self.has_z || bbox.m.is_some() != self.has_m {
            return Err(Error::MismatchedBbox);
        }
        self.custom_bbox = Some(bbox);
        Ok(())
    }

    pub fn reset_custom_bounding_box(&mut self) {
        self.custom_bbox = None;
    }

    pub fn get_bounding_box(&self) -> Bounds {
        if let Some(bbox) = self.custom_bbox {
            return bbox;
        }
        let coords: Vec<Coord> = self.shape.all_coords().into_iter().copied().collect();
        Bounds::from_coords(&coords, self.has_z, self.has_m)
    }

    pub fn get_data(&self, field: &str) -> Option<&crate::attributes::AttributeValue> {
        self.attributes.get(field)
    }

    pub fn set_data(&mut self, field: &str, value: crate::attributes::AttributeValue) {
        self.attributes.set(field, value);
    }

    /// The whole attribute row as `(field name, value)` pairs, in catalog
    /// order, for callers that want to move a record's fields in bulk
    /// rather than one at a time.
    pub fn get_data_array(&self) -> Vec<(String, crate::attributes::AttributeValue)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Bulk counterpart to [`Geometry::set_data`]; replaces each named
    /// field's value, leaving fields not mentioned untouched.
    pub fn set_data_array(&mut self, values: &[(String, crate::attributes::AttributeValue)]) {
        for (name, value) in values {
            self.attributes.set(name, value.clone());
        }
    }

    pub fn get_shape_base_type(&self) -> BaseShapeType {
        self.shape.base_shape_type()
    }
}

/// Verifies that every element of a would-be collection shares the
/// collection's own Z/M flags, per the homogeneity invariant in §4.3.
/// An empty collection adopts the first non-empty element's flags, so
/// callers should determine `has_z`/`has_m` from the first element
/// before calling this for the rest.
pub fn check_homogeneous_dims(has_z: bool, has_m: bool, elements: &[(bool, bool)]) -> Result<()> {
    for &(ez, em) in elements {
        if ez != has_z || em != has_m {
            return Err(Error::MismatchedDimensions);
        }
    }
    Ok(())
}

/// Whether every ring in a polygon already satisfies clockwise-outer,
/// counterclockwise-inner. `None` for an empty polygon (the "undefined"
/// sentinel from §4.3).
pub fn is_clockwise_polygon(rings: &[Vec<Coord>]) -> Result<Option<bool>> {
    polygon_orientation_matches(rings, true)
}

pub fn is_counter_clockwise_polygon(rings: &[Vec<Coord>]) -> Result<Option<bool>> {
    polygon_orientation_matches(rings, false)
}

fn polygon_orientation_matches(rings: &[Vec<Coord>], outer_clockwise: bool) -> Result<Option<bool>> {
    if rings.is_empty() {
        return Ok(None);
    }
    for (i, r) in rings.iter().enumerate() {
        let cw = ring::is_clockwise(r)?;
        let expect_cw = if i == 0 { outer_clockwise } else { !outer_clockwise };
        if cw != expect_cw {
            return Ok(Some(false));
        }
    }
    Ok(Some(true))
}

/// Rewrites every ring in place so the outer ring is clockwise and every
/// inner ring is counterclockwise, the ESRI on-disk convention.
pub fn force_clockwise(rings: &mut [Vec<Coord>]) -> Result<()> {
    force_orientation(rings, true)
}

/// The reverse of [`force_clockwise`]: outer ring counterclockwise, inner
/// rings clockwise (the GeoJSON convention).
pub fn force_counter_clockwise(rings: &mut [Vec<Coord>]) -> Result<()> {
    force_orientation(rings, false)
}

fn force_orientation(rings: &mut [Vec<Coord>], outer_clockwise: bool) -> Result<()> {
    for (i, r) in rings.iter_mut().enumerate() {
        let want_cw = if i == 0 { outer_clockwise } else { !outer_clockwise };
        if ring::is_clockwise(r)? != want_cw {
            ring::reverse_ring(r);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coord;

    fn cw_square() -> Vec<Coord> {
        vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(0.0, 1.0),
            Coord::xy(1.0, 1.0),
            Coord::xy(1.0, 0.0),
            Coord::xy(0.0, 0.0),
        ]
    }

    #[test]
    fn force_clockwise_then_is_clockwise() {
        let mut rings = vec![cw_square()];
        ring::reverse_ring(&mut rings[0]);
        force_clockwise(&mut rings).unwrap();
        assert_eq!(is_clockwise_polygon(&rings).unwrap(), Some(true));
    }

    #[test]
    fn force_counter_clockwise_then_is_counter_clockwise() {
        let mut rings = vec![cw_square()];
        force_counter_clockwise(&mut rings).unwrap();
        assert_eq!(is_counter_clockwise_polygon(&rings).unwrap(), Some(true));
    }

    #[test]
    fn empty_polygon_orientation_is_undefined() {
        let rings: Vec<Vec<Coord>> = vec![];
        assert_eq!(is_clockwise_polygon(&rings).unwrap(), None);
    }
}
