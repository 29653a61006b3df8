use crate::error::{Error, Result};
use std::fmt;

/// Which of Point/PolyLine/Polygon/MultiPoint a shape type belongs to,
/// independent of its Z/M flavor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BaseShapeType {
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
}

/// The Z/M dimensionality carried by a shape type's wire encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dimension {
    /// Neither Z nor M present.
    Xy,
    /// M present, Z absent.
    Measure,
    /// Both Z and M present.
    Z,
}

/// The closed, 13-variant shape type enumeration (§3). Integer codes match
/// the on-disk representation exactly.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i32)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
}

impl ShapeType {
    pub fn from_code(code: i32) -> Result<ShapeType> {
        Ok(match code {
            0 => ShapeType::Null,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            other => return Err(Error::ShapeTypeNotSupported(other)),
        })
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_null(self) -> bool {
        matches!(self, ShapeType::Null)
    }

    pub fn base_shape_type(self) -> Option<BaseShapeType> {
        use BaseShapeType::*;
        use ShapeType::*;
        match self {
            Null => None,
            Point | PointZ | PointM => Some(Point),
            PolyLine | PolyLineZ | PolyLineM => Some(PolyLine),
            Polygon | PolygonZ | PolygonM => Some(Polygon),
            MultiPoint | MultiPointZ | MultiPointM => Some(MultiPoint),
        }
    }

    pub fn dimension(self) -> Dimension {
        use ShapeType::*;
        match self {
            PointZ | PolyLineZ | PolygonZ | MultiPointZ => Dimension::Z,
            PointM | PolyLineM | PolygonM | MultiPointM => Dimension::Measure,
            _ => Dimension::Xy,
        }
    }

    pub fn has_z(self) -> bool {
        self.dimension() == Dimension::Z
    }

    pub fn has_m(self) -> bool {
        matches!(self.dimension(), Dimension::Z | Dimension::Measure)
    }

    /// Builds the shape type for a given base type and dimensionality, the
    /// inverse of [`ShapeType::base_shape_type`] + [`ShapeType::dimension`].
    pub fn from_base_and_dimension(base: BaseShapeType, dim: Dimension) -> ShapeType {
        use BaseShapeType::*;
        use Dimension::*;
        match (base, dim) {
            (Point, Xy) => ShapeType::Point,
            (Point, Measure) => ShapeType::PointM,
            (Point, Z) => ShapeType::PointZ,
            (PolyLine, Xy) => ShapeType::PolyLine,
            (PolyLine, Measure) => ShapeType::PolyLineM,
            (PolyLine, Z) => ShapeType::PolyLineZ,
            (Polygon, Xy) => ShapeType::Polygon,
            (Polygon, Measure) => ShapeType::PolygonM,
            (Polygon, Z) => ShapeType::PolygonZ,
            (MultiPoint, Xy) => ShapeType::MultiPoint,
            (MultiPoint, Measure) => ShapeType::MultiPointM,
            (MultiPoint, Z) => ShapeType::MultiPointZ,
        }
    }

    pub fn name(self) -> &'static str {
        use ShapeType::*;
        match self {
            Null => "Null",
            Point => "Point",
            PolyLine => "PolyLine",
            Polygon => "Polygon",
            MultiPoint => "MultiPoint",
            PointZ => "PointZ",
            PolyLineZ => "PolyLineZ",
            PolygonZ => "PolygonZ",
            MultiPointZ => "MultiPointZ",
            PointM => "PointM",
            PolyLineM => "PolyLineM",
            PolygonM => "PolygonM",
            MultiPointM => "MultiPointM",
        }
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_code() {
        for code in [0, 1, 3, 5, 8, 11, 13, 15, 18, 21, 23, 25, 28] {
            let st = ShapeType::from_code(code).unwrap();
            assert_eq!(st.code(), code);
        }
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(ShapeType::from_code(31).is_err());
    }

    #[test]
    fn z_flavor_carries_both_z_and_m() {
        assert!(ShapeType::PolygonZ.has_z());
        assert!(ShapeType::PolygonZ.has_m());
        assert!(!ShapeType::PolygonM.has_z());
        assert!(ShapeType::PolygonM.has_m());
        assert!(!ShapeType::Polygon.has_z());
        assert!(!ShapeType::Polygon.has_m());
    }
}
