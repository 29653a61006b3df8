use shapefile_common::BoundingBox;

use crate::coord::{Coord, Measure};

/// An associative bounding box over x/y, and optionally z and/or m,
/// matching whichever axes a geometry's dimension flags declare.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub xy: BoundingBox,
    pub z: Option<(f64, f64)>,
    pub m: Option<(f64, f64)>,
}

impl Bounds {
    pub fn empty(has_z: bool, has_m: bool) -> Bounds {
        Bounds {
            xy: BoundingBox::empty(),
            z: if has_z { Some((f64::INFINITY, f64::NEG_INFINITY)) } else { None },
            m: if has_m { Some((f64::INFINITY, f64::NEG_INFINITY)) } else { None },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.xy.is_empty()
    }

    /// Extends this box to cover `coord`. M components equal to the
    /// "no data" sentinel are ignored, per §3's aggregation rule.
    pub fn expand_to_coord(&mut self, coord: &Coord) {
        self.xy.expand_to_point(coord.x, coord.y);
        if let Some((zmin, zmax)) = &mut self.z {
            *zmin = zmin.min(coord.z);
            *zmax = zmax.max(coord.z);
        }
        if let Measure::Value(m) = coord.m {
            if let Some((mmin, mmax)) = &mut self.m {
                *mmin = mmin.min(m);
                *mmax = mmax.max(m);
            }
        }
    }

    pub fn expand_to(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.xy.expand_to(&other.xy);
        if let (Some((zmin, zmax)), Some((ozmin, ozmax))) = (&mut self.z, other.z) {
            *zmin = zmin.min(ozmin);
            *zmax = zmax.max(ozmax);
        }
        if let (Some((mmin, mmax)), Some((ommin, ommax))) = (&mut self.m, other.m) {
            *mmin = mmin.min(ommin);
            *mmax = mmax.max(ommax);
        }
    }

    pub fn from_coords(coords: &[Coord], has_z: bool, has_m: bool) -> Bounds {
        let mut b = Bounds::empty(has_z, has_m);
        for c in coords {
            b.expand_to_coord(c);
        }
        b
    }
}
