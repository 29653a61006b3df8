//! Ring-level geometry algorithms, extracted as free functions over "ring =
//! ordered list of points" rather than methods on a polygon class.

use crate::coord::Coord;
use crate::error::{Error, Result};

/// Number of vertices to sum over, treating a ring whose last point repeats
/// its first as the same ring without the duplicate.
fn effective_len(points: &[Coord]) -> usize {
    if points.len() >= 2 && points[0].xy_eq(&points[points.len() - 1]) {
        points.len() - 1
    } else {
        points.len()
    }
}

fn shoelace(points: &[Coord], scale: f64) -> f64 {
    let n = effective_len(points);
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let (xi, yi) = (points[i].x * scale, points[i].y * scale);
        let (xj, yj) = (points[j].x * scale, points[j].y * scale);
        area += xi * yj - xj * yi;
    }
    area / 2.0
}

/// Signed area via the Gauss shoelace sum. Negative means clockwise,
/// positive counterclockwise. Retries with increasing coordinate scale
/// (10^3, 10^6, 10^9) when the raw area underflows to exactly zero, per
/// the "tiny ring" allowance; gives up past a 10^9 scale factor.
pub fn signed_area(points: &[Coord]) -> Result<f64> {
    if effective_len(points) < 3 {
        return Err(Error::RingNotEnoughVertices);
    }
    let mut area = shoelace(points, 1.0);
    let mut k = 0;
    while area == 0.0 && k < 3 {
        k += 1;
        area = shoelace(points, 10f64.powi(3 * k));
    }
    if area == 0.0 {
        return Err(Error::RingAreaTooSmall);
    }
    Ok(area)
}

/// `true` if the ring is wound clockwise (negative signed area).
pub fn is_clockwise(points: &[Coord]) -> Result<bool> {
    Ok(signed_area(points)? < 0.0)
}

/// A ring is closed iff it has at least 4 vertices and its first and last
/// compare equal in x/y and, when the geometry carries those dimensions,
/// in z and m.
pub fn is_closed_ring(points: &[Coord], has_z: bool, has_m: bool) -> bool {
    if points.len() < 4 {
        return false;
    }
    let first = points[0];
    let last = points[points.len() - 1];
    first.eq_in_dims(&last, has_z, has_m)
}

/// Appends a copy of the first vertex if the ring is not already closed.
pub fn force_closed_ring(points: &mut Vec<Coord>, has_z: bool, has_m: bool) {
    if !points.is_empty() && !is_closed_ring(points, has_z, has_m) {
        let first = points[0];
        points.push(first);
    }
}

/// Reverses vertex order in place, flipping a ring's orientation.
pub fn reverse_ring(points: &mut [Coord]) {
    points.reverse();
}

/// Point-in-polygon test via ray casting on x/y alone, ignoring a ring's
/// closing vertex duplication. Used to classify which outer ring a hole
/// belongs to, and to let callers test arbitrary points against a ring.
pub fn is_point_within_ring(point: &Coord, ring: &[Coord]) -> bool {
    let n = effective_len(ring);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if (yi > point.y) != (yj > point.y)
            && point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether `candidate` is a hole of `outer`: every vertex of `candidate`
/// (besides the closing duplicate) falls within `outer`'s boundary.
pub fn is_hole_of(candidate: &[Coord], outer: &[Coord]) -> bool {
    let n = effective_len(candidate);
    (0..n).all(|i| is_point_within_ring(&candidate[i], outer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(reversed: bool) -> Vec<Coord> {
        let mut pts = vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(1.0, 0.0),
            Coord::xy(1.0, 1.0),
            Coord::xy(0.0, 1.0),
            Coord::xy(0.0, 0.0),
        ];
        if reversed {
            pts.reverse();
        }
        pts
    }

    #[test]
    fn detects_orientation() {
        assert_eq!(is_clockwise(&square(false)).unwrap(), false);
        assert_eq!(is_clockwise(&square(true)).unwrap(), true);
    }

    #[test]
    fn tiny_ring_retries_before_failing() {
        let pts = vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(1e-20, 0.0),
            Coord::xy(1e-20, 1e-20),
            Coord::xy(0.0, 0.0),
        ];
        // Underflows at scale 1 and 10^3, resolves at 10^6.
        assert!(is_clockwise(&pts).is_ok());
    }

    #[test]
    fn degenerate_ring_is_too_small() {
        let pts = vec![Coord::xy(0.0, 0.0), Coord::xy(0.0, 0.0), Coord::xy(0.0, 0.0)];
        assert!(matches!(signed_area(&pts), Err(Error::RingAreaTooSmall)));
    }

    #[test]
    fn short_ring_is_rejected() {
        let pts = vec![Coord::xy(0.0, 0.0), Coord::xy(1.0, 0.0)];
        assert!(matches!(signed_area(&pts), Err(Error::RingNotEnoughVertices)));
    }

    #[test]
    fn detects_point_within_ring() {
        let square = square(false);
        assert!(is_point_within_ring(&Coord::xy(0.5, 0.5), &square));
        assert!(!is_point_within_ring(&Coord::xy(2.0, 2.0), &square));
    }

    #[test]
    fn detects_hole_relationship() {
        let outer = square(false);
        let hole = vec![
            Coord::xy(0.25, 0.25),
            Coord::xy(0.75, 0.25),
            Coord::xy(0.75, 0.75),
            Coord::xy(0.25, 0.75),
            Coord::xy(0.25, 0.25),
        ];
        assert!(is_hole_of(&hole, &outer));
        assert!(!is_hole_of(&outer, &hole));
    }

    #[test]
    fn force_closed_ring_is_idempotent() {
        let mut pts = square(false);
        pts.pop();
        assert!(!is_closed_ring(&pts, false, false));
        force_closed_ring(&mut pts, false, false);
        assert!(is_closed_ring(&pts, false, false));
        let len_after_first = pts.len();
        force_closed_ring(&mut pts, false, false);
        assert_eq!(pts.len(), len_after_first);
    }
}
