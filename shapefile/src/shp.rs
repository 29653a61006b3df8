//! SHP/SHX record framing, shape-body pack/unpack, and the polygon
//! ring-regrouping algorithm (§4.6). This module knows nothing about DBF;
//! it only turns [`Geometry`] values into the SHP wire format and back.

use shapefile_common::{ByteOrderReader, ByteOrderWriter, Endianness};
use std::io::{Read, Seek, Write};

use crate::bounds::Bounds;
use crate::coord::{Coord, Measure};
use crate::error::{Error, Result};
use crate::geometry::{self, Geometry, Shape};
use crate::ring;
use crate::shape_type::{BaseShapeType, ShapeType};

pub const FILE_HEADER_SIZE: usize = 100;
pub const FILE_CODE: i32 = 9994;
pub const VERSION: i32 = 1000;
pub const RECORD_HEADER_SIZE: usize = 8;

/// The 100-byte header shared, byte-for-byte, by SHP and SHX (§4.6); only
/// the file-length field differs in meaning (each file reports its own
/// size).
#[derive(Debug, Clone, Copy)]
pub struct ShapeFileHeader {
    pub file_length_words: i32,
    pub shape_type: ShapeType,
    pub bounds: Bounds,
}

impl std::fmt::Display for ShapeFileHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} bytes), bounds {:?}",
            self.shape_type,
            self.file_length_words * 2,
            self.bounds.xy
        )
    }
}

pub fn write_header<W: Write>(
    writer: &mut ByteOrderWriter<W>,
    header: &ShapeFileHeader,
) -> Result<()> {
    writer.set_byte_order(Endianness::BigEndian);
    writer.write_i32(FILE_CODE)?;
    writer.write_bytes(&[0u8; 20])?;
    writer.write_i32(header.file_length_words)?;

    writer.set_byte_order(Endianness::LittleEndian);
    writer.write_i32(VERSION)?;
    writer.write_i32(header.shape_type.code())?;

    let b = header.bounds;
    writer.write_f64(b.xy.min_x)?;
    writer.write_f64(b.xy.min_y)?;
    writer.write_f64(b.xy.max_x)?;
    writer.write_f64(b.xy.max_y)?;
    let (zmin, zmax) = b.z.unwrap_or((0.0, 0.0));
    writer.write_f64(zmin)?;
    writer.write_f64(zmax)?;
    let (mmin, mmax) = b.m.unwrap_or((0.0, 0.0));
    writer.write_f64(mmin)?;
    writer.write_f64(mmax)?;
    Ok(())
}

pub fn read_header<R: Read + Seek>(reader: &mut ByteOrderReader<R>) -> Result<ShapeFileHeader> {
    reader.set_byte_order(Endianness::BigEndian);
    let file_code = reader.read_i32()?;
    if file_code != FILE_CODE {
        return Err(Error::InvalidStreamResource(format!(
            "bad SHP/SHX file code {file_code}, expected {FILE_CODE}"
        )));
    }
    reader.inc_pos(20)?;
    let file_length_words = reader.read_i32()?;

    reader.set_byte_order(Endianness::LittleEndian);
    let _version = reader.read_i32()?;
    let shape_type = ShapeType::from_code(reader.read_i32()?)?;

    let min_x = reader.read_f64()?;
    let min_y = reader.read_f64()?;
    let max_x = reader.read_f64()?;
    let max_y = reader.read_f64()?;
    let zmin = reader.read_f64()?;
    let zmax = reader.read_f64()?;
    let mmin = reader.read_f64()?;
    let mmax = reader.read_f64()?;

    let has_z = shape_type.has_z();
    let has_m = shape_type.has_m();
    let bounds = Bounds {
        xy: shapefile_common::BoundingBox::new(min_x, max_x, min_y, max_y),
        z: if has_z { Some((zmin, zmax)) } else { None },
        m: if has_m { Some((mmin, mmax)) } else { None },
    };

    Ok(ShapeFileHeader {
        file_length_words,
        shape_type,
        bounds,
    })
}

/// Reads an 8-byte SHP record header: 1-based record number (BE) and
/// content length in 16-bit words (BE).
pub fn read_record_header<R: Read + Seek>(
    reader: &mut ByteOrderReader<R>,
) -> Result<(i32, i32)> {
    reader.set_byte_order(Endianness::BigEndian);
    let record_number = reader.read_i32()?;
    let content_length_words = reader.read_i32()?;
    Ok((record_number, content_length_words))
}

pub fn write_record_header<W: Write>(
    writer: &mut ByteOrderWriter<W>,
    record_number: i32,
    content_length_words: i32,
) -> Result<()> {
    writer.set_byte_order(Endianness::BigEndian);
    writer.write_i32(record_number)?;
    writer.write_i32(content_length_words)?;
    Ok(())
}

/// One SHX entry: offset and content length, both in 16-bit words.
pub fn read_shx_record<R: Read + Seek>(reader: &mut ByteOrderReader<R>) -> Result<(i32, i32)> {
    reader.set_byte_order(Endianness::BigEndian);
    let offset_words = reader.read_i32()?;
    let content_length_words = reader.read_i32()?;
    Ok((offset_words, content_length_words))
}

pub fn write_shx_record<W: Write>(
    writer: &mut ByteOrderWriter<W>,
    offset_words: i32,
    content_length_words: i32,
) -> Result<()> {
    writer.set_byte_order(Endianness::BigEndian);
    writer.write_i32(offset_words)?;
    writer.write_i32(content_length_words)?;
    Ok(())
}

/// Policy for a ring read off disk that is not closed (§4.8).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClosedRingAction {
    Ignore,
    CheckAndFail,
    ForceClose,
}

/// How the reader re-winds a polygon's rings before handing it to the
/// caller (§4.8's "polygon output orientation" option). The on-disk
/// convention is always clockwise-outer; this only affects what the
/// reader emits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PolygonOutputOrientation {
    /// Emit rings exactly as reconstructed (clockwise outer, ESRI
    /// convention).
    AsStored,
    ForceClockwise,
    ForceCounterClockwise,
}

impl Default for PolygonOutputOrientation {
    fn default() -> PolygonOutputOrientation {
        PolygonOutputOrientation::AsStored
    }
}

/// Rewinds every polygon (or each polygon of a multipolygon) in `shape`
/// per `orientation`. A no-op for non-polygon shapes and for
/// [`PolygonOutputOrientation::AsStored`].
pub fn apply_polygon_output_orientation(
    shape: &mut Shape,
    orientation: PolygonOutputOrientation,
) -> Result<()> {
    let force: fn(&mut [Vec<Coord>]) -> Result<()> = match orientation {
        PolygonOutputOrientation::AsStored => return Ok(()),
        PolygonOutputOrientation::ForceClockwise => geometry::force_clockwise,
        PolygonOutputOrientation::ForceCounterClockwise => geometry::force_counter_clockwise,
    };
    match shape {
        Shape::Polygon(rings) => force(rings),
        Shape::MultiPolygon(polys) => {
            for rings in polys.iter_mut() {
                force(rings)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn apply_closed_ring_policy(
    ring: &mut Vec<Coord>,
    has_z: bool,
    has_m: bool,
    action: ClosedRingAction,
) -> Result<()> {
    if ring::is_closed_ring(ring, has_z, has_m) {
        return Ok(());
    }
    match action {
        ClosedRingAction::Ignore => Ok(()),
        ClosedRingAction::CheckAndFail => Err(Error::PolygonOpenRing),
        ClosedRingAction::ForceClose => {
            ring::force_closed_ring(ring, has_z, has_m);
            Ok(())
        }
    }
}

/// Splits a flat SHP part array into rings (§4.6), then classifies each
/// ring's orientation to decide where one polygon ends and the next
/// begins.
///
/// Non-autosense mode hard-codes the ESRI convention (outer ring
/// clockwise); a file whose first ring isn't clockwise is rejected. In
/// autosense mode, the orientation of the *first* ring in the shape
/// establishes what "outer" means for the rest of the shape, so a file
/// that consistently uses the opposite convention is still read
/// correctly (§9 Design Notes: the regrouping only ever looks at signed
/// area, so self-touching rings can still be misclassified).
pub fn regroup_rings_into_polygons(
    rings: Vec<Vec<Coord>>,
    autosense: bool,
) -> Result<Vec<Vec<Vec<Coord>>>> {
    if rings.is_empty() {
        return Ok(Vec::new());
    }
    let first_is_cw = ring::is_clockwise(&rings[0])?;
    let outer_is_cw = if autosense {
        first_is_cw
    } else {
        if !first_is_cw {
            return Err(Error::PolygonWrongOrientation);
        }
        true
    };

    let mut polygons: Vec<Vec<Vec<Coord>>> = Vec::new();
    for r in rings {
        let is_cw = ring::is_clockwise(&r)?;
        if polygons.is_empty() || is_cw == outer_is_cw {
            polygons.push(vec![r]);
        } else {
            polygons.last_mut().unwrap().push(r);
        }
    }
    Ok(polygons)
}

fn split_into_parts(points: Vec<Coord>, part_offsets: &[i32]) -> Vec<Vec<Coord>> {
    let mut parts = Vec::with_capacity(part_offsets.len());
    for (i, &start) in part_offsets.iter().enumerate() {
        let end = part_offsets
            .get(i + 1)
            .map(|&e| e as usize)
            .unwrap_or(points.len());
        parts.push(points[start as usize..end].to_vec());
    }
    parts
}

/// Reader-side options that affect shape decoding but live outside this
/// module (ignored here to keep `shp` free of the full `ReaderOptions`
/// dependency graph).
#[derive(Debug, Clone, Copy)]
pub struct ShapeReadOptions {
    pub suppress_z: bool,
    pub suppress_m: bool,
    pub closed_ring_action: ClosedRingAction,
    pub orientation_autosense: bool,
    pub force_multipart: bool,
}

impl Default for ShapeReadOptions {
    fn default() -> ShapeReadOptions {
        ShapeReadOptions {
            suppress_z: false,
            suppress_m: false,
            closed_ring_action: ClosedRingAction::Ignore,
            orientation_autosense: false,
            force_multipart: false,
        }
    }
}

/// Decodes one record body (the bytes after the 8-byte record header,
/// including the leading LE shape-type word) into a [`Geometry`].
pub fn read_shape<R: Read + Seek>(
    reader: &mut ByteOrderReader<R>,
    dataset_shape_type: ShapeType,
    options: &ShapeReadOptions,
) -> Result<Geometry> {
    reader.set_byte_order(Endianness::LittleEndian);
    let record_shape_code = reader.read_i32()?;
    let record_shape_type = ShapeType::from_code(record_shape_code)?;

    if record_shape_type.is_null() {
        let has_z = dataset_shape_type.has_z() && !options.suppress_z;
        let has_m = dataset_shape_type.has_m() && !options.suppress_m;
        let shape = empty_shape_for(dataset_shape_type.base_shape_type());
        return Ok(Geometry::new(shape, true, has_z, has_m));
    }

    if record_shape_type.base_shape_type() != dataset_shape_type.base_shape_type() {
        return Err(Error::WrongRecordShapeType {
            record: 0,
            found: record_shape_code,
            expected: dataset_shape_type.code(),
        });
    }

    let has_z = dataset_shape_type.has_z();
    let has_m = dataset_shape_type.has_m();
    let eff_has_z = has_z && !options.suppress_z;
    let eff_has_m = has_m && !options.suppress_m;

    let base = dataset_shape_type.base_shape_type().unwrap();
    let (shape, disk_bounds) = match base {
        BaseShapeType::Point => {
            let x = reader.read_f64()?;
            let y = reader.read_f64()?;
            let mut z = 0.0;
            let mut m = Measure::NoData;
            if has_z {
                z = reader.read_f64()?;
                m = Measure::from_raw(reader.read_f64()?);
            } else if has_m {
                m = Measure::from_raw(reader.read_f64()?);
            }
            let coord = Coord {
                x,
                y,
                z: if eff_has_z { z } else { 0.0 },
                m: if eff_has_m { m } else { Measure::NoData },
            };
            (Shape::Point(coord), None)
        }
        BaseShapeType::MultiPoint => {
            let xy = read_xy_bbox(reader)?;
            let num_points = reader.read_i32()? as usize;
            let mut xs_ys = Vec::with_capacity(num_points);
            for _ in 0..num_points {
                xs_ys.push((reader.read_f64()?, reader.read_f64()?));
            }
            let mut zs = vec![0.0; num_points];
            let mut z_range = None;
            if has_z {
                z_range = Some((reader.read_f64()?, reader.read_f64()?));
                for z in zs.iter_mut() {
                    *z = reader.read_f64()?;
                }
            }
            let mut ms = vec![Measure::NoData; num_points];
            let mut m_range = None;
            if has_m {
                m_range = Some((reader.read_f64()?, reader.read_f64()?));
                for m in ms.iter_mut() {
                    *m = Measure::from_raw(reader.read_f64()?);
                }
            }
            let coords: Vec<Coord> = (0..num_points)
                .map(|i| Coord {
                    x: xs_ys[i].0,
                    y: xs_ys[i].1,
                    z: if eff_has_z { zs[i] } else { 0.0 },
                    m: if eff_has_m { ms[i] } else { Measure::NoData },
                })
                .collect();
            let bounds = Bounds {
                xy,
                z: if has_z { z_range } else { None },
                m: if has_m { m_range } else { None },
            };
            (Shape::MultiPoint(coords), Some(bounds))
        }
        BaseShapeType::PolyLine | BaseShapeType::Polygon => {
            let xy = read_xy_bbox(reader)?;
            let num_parts = reader.read_i32()? as usize;
            let num_points = reader.read_i32()? as usize;
            let mut part_offsets = Vec::with_capacity(num_parts);
            for _ in 0..num_parts {
                part_offsets.push(reader.read_i32()?);
            }
            let mut xs_ys = Vec::with_capacity(num_points);
            for _ in 0..num_points {
                xs_ys.push((reader.read_f64()?, reader.read_f64()?));
            }
            let mut zs = vec![0.0; num_points];
            let mut z_range = None;
            if has_z {
                z_range = Some((reader.read_f64()?, reader.read_f64()?));
                for z in zs.iter_mut() {
                    *z = reader.read_f64()?;
                }
            }
            let mut ms = vec![Measure::NoData; num_points];
            let mut m_range = None;
            if has_m {
                m_range = Some((reader.read_f64()?, reader.read_f64()?));
                for m in ms.iter_mut() {
                    *m = Measure::from_raw(reader.read_f64()?);
                }
            }
            let coords: Vec<Coord> = (0..num_points)
                .map(|i| Coord {
                    x: xs_ys[i].0,
                    y: xs_ys[i].1,
                    z: if eff_has_z { zs[i] } else { 0.0 },
                    m: if eff_has_m { ms[i] } else { Measure::NoData },
                })
                .collect();
            let mut parts = split_into_parts(coords, &part_offsets);
            let bounds = Bounds {
                xy,
                z: if has_z { z_range } else { None },
                m: if has_m { m_range } else { None },
            };

            if base == BaseShapeType::PolyLine {
                let shape = if parts.len() == 1 && !options.force_multipart {
                    Shape::Linestring(parts.pop().unwrap())
                } else {
                    Shape::MultiLinestring(parts)
                };
                (shape, Some(bounds))
            } else {
                for r in parts.iter_mut() {
                    apply_closed_ring_policy(r, eff_has_z, eff_has_m, options.closed_ring_action)?;
                }
                let polygons =
                    regroup_rings_into_polygons(parts, options.orientation_autosense)?;
                let shape = if polygons.len() == 1 && !options.force_multipart {
                    Shape::Polygon(polygons.into_iter().next().unwrap())
                } else {
                    Shape::MultiPolygon(polygons)
                };
                (shape, Some(bounds))
            }
        }
    };

    let mut geometry = Geometry::new(shape, false, eff_has_z, eff_has_m);
    if let Some(bounds) = disk_bounds {
        let _ = geometry.set_custom_bounding_box(Bounds {
            xy: bounds.xy,
            z: if eff_has_z { bounds.z } else { None },
            m: if eff_has_m { bounds.m } else { None },
        });
    }
    Ok(geometry)
}

fn read_xy_bbox<R: Read + Seek>(
    reader: &mut ByteOrderReader<R>,
) -> Result<shapefile_common::BoundingBox> {
    let min_x = reader.read_f64()?;
    let min_y = reader.read_f64()?;
    let max_x = reader.read_f64()?;
    let max_y = reader.read_f64()?;
    Ok(shapefile_common::BoundingBox::new(min_x, max_x, min_y, max_y))
}

/// An empty geometry of `shape_type`'s base type and full Z/M flavor,
/// used by the writer's close sequence when no record was ever written
/// (§4.9).
pub fn empty_geometry(shape_type: ShapeType) -> Geometry {
    let shape = empty_shape_for(shape_type.base_shape_type());
    Geometry::new(shape, true, shape_type.has_z(), shape_type.has_m())
}

fn empty_shape_for(base: Option<BaseShapeType>) -> Shape {
    match base {
        None | Some(BaseShapeType::Point) => Shape::Point(Coord::xy(0.0, 0.0)),
        Some(BaseShapeType::MultiPoint) => Shape::MultiPoint(Vec::new()),
        Some(BaseShapeType::PolyLine) => Shape::Linestring(Vec::new()),
        Some(BaseShapeType::Polygon) => Shape::Polygon(Vec::new()),
    }
}

/// Encodes one record body, including the leading LE shape-type word.
/// Polygons are first force-closed and force-clockwise (§4.6 write
/// policy); empty geometries always encode as a Null shape (type 0),
/// regardless of the dataset's declared shape type.
pub fn write_shape(geometry: &Geometry, dataset_shape_type: ShapeType) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut w = ByteOrderWriter::new(&mut buf, Endianness::LittleEndian);
        if geometry.is_empty() {
            w.write_i32(ShapeType::Null.code())?;
            return Ok(buf);
        }
        w.write_i32(dataset_shape_type.code())?;

        let has_z = dataset_shape_type.has_z();
        let has_m = dataset_shape_type.has_m();

        match &geometry.shape {
            Shape::Point(c) => {
                w.write_f64(c.x)?;
                w.write_f64(c.y)?;
                if has_z {
                    w.write_f64(c.z)?;
                    w.write_f64(c.m.to_raw())?;
                } else if has_m {
                    w.write_f64(c.m.to_raw())?;
                }
            }
            Shape::MultiPoint(points) => {
                write_multipoint_body(&mut w, points, has_z, has_m)?;
            }
            Shape::Linestring(points) => {
                write_polyline_body(&mut w, std::slice::from_ref(points), has_z, has_m)?;
            }
            Shape::MultiLinestring(parts) => {
                write_polyline_body(&mut w, parts, has_z, has_m)?;
            }
            Shape::Polygon(rings) => {
                let mut rings = rings.clone();
                enforce_write_orientation(&mut rings, has_z, has_m)?;
                write_polyline_body(&mut w, &rings, has_z, has_m)?;
            }
            Shape::MultiPolygon(polys) => {
                let mut flat: Vec<Vec<Coord>> = Vec::new();
                for poly in polys {
                    let mut rings = poly.clone();
                    enforce_write_orientation(&mut rings, has_z, has_m)?;
                    flat.extend(rings);
                }
                write_polyline_body(&mut w, &flat, has_z, has_m)?;
            }
        }
    }
    Ok(buf)
}

fn enforce_write_orientation(rings: &mut Vec<Vec<Coord>>, has_z: bool, has_m: bool) -> Result<()> {
    for r in rings.iter_mut() {
        ring::force_closed_ring(r, has_z, has_m);
    }
    geometry::force_clockwise(rings)
}

fn write_multipoint_body<W: Write>(
    w: &mut ByteOrderWriter<W>,
    points: &[Coord],
    has_z: bool,
    has_m: bool,
) -> Result<()> {
    let bbox = Bounds::from_coords(points, has_z, has_m);
    w.write_f64(bbox.xy.min_x)?;
    w.write_f64(bbox.xy.min_y)?;
    w.write_f64(bbox.xy.max_x)?;
    w.write_f64(bbox.xy.max_y)?;
    w.write_i32(points.len() as i32)?;
    for p in points {
        w.write_f64(p.x)?;
        w.write_f64(p.y)?;
    }
    if has_z {
        let (zmin, zmax) = bbox.z.unwrap_or((0.0, 0.0));
        w.write_f64(zmin)?;
        w.write_f64(zmax)?;
        for p in points {
            w.write_f64(p.z)?;
        }
    }
    if has_m {
        let (mmin, mmax) = bbox.m.unwrap_or((0.0, 0.0));
        w.write_f64(mmin)?;
        w.write_f64(mmax)?;
        for p in points {
            w.write_f64(p.m.to_raw())?;
        }
    }
    Ok(())
}

fn write_polyline_body<W: Write>(
    w: &mut ByteOrderWriter<W>,
    parts: &[Vec<Coord>],
    has_z: bool,
    has_m: bool,
) -> Result<()> {
    let all_points: Vec<Coord> = parts.iter().flatten().copied().collect();
    let bbox = Bounds::from_coords(&all_points, has_z, has_m);
    w.write_f64(bbox.xy.min_x)?;
    w.write_f64(bbox.xy.min_y)?;
    w.write_f64(bbox.xy.max_x)?;
    w.write_f64(bbox.xy.max_y)?;
    w.write_i32(parts.len() as i32)?;
    w.write_i32(all_points.len() as i32)?;
    let mut offset = 0i32;
    for part in parts {
        w.write_i32(offset)?;
        offset += part.len() as i32;
    }
    for p in &all_points {
        w.write_f64(p.x)?;
        w.write_f64(p.y)?;
    }
    if has_z {
        let (zmin, zmax) = bbox.z.unwrap_or((0.0, 0.0));
        w.write_f64(zmin)?;
        w.write_f64(zmax)?;
        for p in &all_points {
            w.write_f64(p.z)?;
        }
    }
    if has_m {
        let (mmin, mmax) = bbox.m.unwrap_or((0.0, 0.0));
        w.write_f64(mmin)?;
        w.write_f64(mmax)?;
        for p in &all_points {
            w.write_f64(p.m.to_raw())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cw_square() -> Vec<Coord> {
        vec![
            Coord::xy(0.0, 0.0),
            Coord::xy(0.0, 1.0),
            Coord::xy(1.0, 1.0),
            Coord::xy(1.0, 0.0),
            Coord::xy(0.0, 0.0),
        ]
    }

    fn ccw_hole() -> Vec<Coord> {
        let mut r = cw_square();
        ring::reverse_ring(&mut r);
        for p in r.iter_mut() {
            p.x = p.x * 0.5 + 0.25;
            p.y = p.y * 0.5 + 0.25;
        }
        r
    }

    #[test]
    fn point_round_trips() {
        let geom = Geometry::new(Shape::Point(Coord::xy(10.0, 20.0)), false, false, false);
        let bytes = write_shape(&geom, ShapeType::Point).unwrap();
        let mut cursor = Cursor::new(bytes);
        let mut reader = ByteOrderReader::new(&mut cursor, Endianness::LittleEndian).unwrap();
        let decoded = read_shape(&mut reader, ShapeType::Point, &ShapeReadOptions::default()).unwrap();
        match decoded.shape {
            Shape::Point(c) => {
                assert_eq!(c.x, 10.0);
                assert_eq!(c.y, 20.0);
            }
            _ => panic!("expected point"),
        }
    }

    #[test]
    fn empty_geometry_writes_as_null_record() {
        let geom = Geometry::new(Shape::Linestring(Vec::new()), true, false, false);
        let bytes = write_shape(&geom, ShapeType::PolyLine).unwrap();
        assert_eq!(bytes.len(), 4);
        let mut cursor = Cursor::new(bytes);
        let mut reader = ByteOrderReader::new(&mut cursor, Endianness::LittleEndian).unwrap();
        let decoded =
            read_shape(&mut reader, ShapeType::PolyLine, &ShapeReadOptions::default()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn polygon_regroups_rings_by_orientation() {
        let rings = vec![cw_square(), ccw_hole(), {
            let mut r = cw_square();
            for p in r.iter_mut() {
                p.x += 5.0;
                p.y += 5.0;
            }
            r
        }];
        let polygons = regroup_rings_into_polygons(rings, false).unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].len(), 2);
        assert_eq!(polygons[1].len(), 1);
    }

    #[test]
    fn non_autosense_requires_clockwise_outer_ring() {
        let rings = vec![ccw_hole()];
        assert!(matches!(
            regroup_rings_into_polygons(rings, false),
            Err(Error::PolygonWrongOrientation)
        ));
    }

    #[test]
    fn autosense_tolerates_reversed_convention() {
        let mut outer = ccw_hole();
        ring::reverse_ring(&mut outer); // make this the "outer" orientation: ccw
        let rings = vec![ccw_hole()];
        assert!(regroup_rings_into_polygons(rings, true).is_ok());
    }
}
