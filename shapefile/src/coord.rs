/// Any float at or below this threshold, read off disk, decodes as "no
/// data" rather than as a numeric measure.
pub const NODATA_READ_THRESHOLD: f64 = -1.0e38;

/// The exact sentinel a "no data" measure is encoded as on write.
pub const NODATA_WRITE_SENTINEL: f64 = -1.0e40;

/// A measure (M) value: either a real number or the distinguished "no
/// data" variant. Deliberately not represented as `f64::NAN`, so that
/// round-tripping does not depend on NaN bit-pattern preservation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Measure {
    Value(f64),
    NoData,
}

impl Measure {
    pub fn from_raw(raw: f64) -> Measure {
        if raw <= NODATA_READ_THRESHOLD {
            Measure::NoData
        } else {
            Measure::Value(raw)
        }
    }

    pub fn to_raw(self) -> f64 {
        match self {
            Measure::Value(v) => v,
            Measure::NoData => NODATA_WRITE_SENTINEL,
        }
    }

    pub fn is_no_data(self) -> bool {
        matches!(self, Measure::NoData)
    }
}

/// A single vertex. `z` and `m` are only meaningful when the enclosing
/// geometry's dimension flags say so; a non-Z, non-M geometry simply
/// never reads them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub m: Measure,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Coord {
        Coord {
            x,
            y,
            z: 0.0,
            m: Measure::NoData,
        }
    }

    pub fn xym(x: f64, y: f64, m: Measure) -> Coord {
        Coord {
            x,
            y,
            z: 0.0,
            m,
        }
    }

    pub fn xyzm(x: f64, y: f64, z: f64, m: Measure) -> Coord {
        Coord { x, y, z, m }
    }

    pub fn xy_eq(&self, other: &Coord) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn eq_in_dims(&self, other: &Coord, has_z: bool, has_m: bool) -> bool {
        if !self.xy_eq(other) {
            return false;
        }
        if has_z && self.z != other.z {
            return false;
        }
        if has_m && self.m != other.m {
            return false;
        }
        true
    }
}
