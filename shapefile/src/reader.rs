//! The reader driver (§4.8): parses the SHP/SHX/DBF/DBT file set plus
//! PRJ/CPG sidecars, then exposes an iterator-style cursor over records.
//!
//! The whole dataset is loaded into memory up front (mirroring how the
//! teacher's own `Shapefile::read` works), so random access via
//! [`ShapefileReader::set_current_record`] and the serial `Iterator`
//! implementation both just reposition an in-memory cursor.

use std::io::Cursor;
use std::path::Path;

use shapefile_common::ByteOrderReader;
use shapefile_common::Endianness;

use crate::attributes::AttributeValue;
use crate::bounds::Bounds;
use crate::charset::Charset;
use crate::dbf::codec::{self as dbf_codec, DbfHeader, RecordCodecOptions};
use crate::dbf::{Catalog, Field};
use crate::dbt::DbtReader;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::options::ReaderOptions;
use crate::shape_type::ShapeType;
use crate::shp::{self, ShapeReadOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeStart,
    At(usize),
    Exhausted,
}

/// An open shapefile dataset, positioned over its records.
pub struct ShapefileReader {
    shape_type: ShapeType,
    catalog: Catalog,
    charset: Charset,
    prj_text: Option<String>,
    options: ReaderOptions,
    shp_reader: ByteOrderReader<Cursor<Vec<u8>>>,
    locations: Vec<usize>,
    dbf_reader: ByteOrderReader<Cursor<Vec<u8>>>,
    dbf_header: DbfHeader,
    dbt: Option<DbtReader<Cursor<Vec<u8>>>>,
    header_bounds: Bounds,
    position: Position,
    current: Option<Geometry>,
}

fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileMissing(path.display().to_string())
        } else {
            Error::OpenFailed {
                path: path.display().to_string(),
                detail: e.to_string(),
            }
        }
    })
}

fn scan_shp_locations(reader: &mut ByteOrderReader<Cursor<Vec<u8>>>) -> Result<Vec<usize>> {
    let mut locations = Vec::new();
    reader.seek(shp::FILE_HEADER_SIZE)?;
    while reader.pos() < reader.len() {
        let start = reader.pos();
        let (_, content_length_words) = shp::read_record_header(reader)?;
        locations.push(start);
        reader.inc_pos(content_length_words as usize * 2)?;
    }
    Ok(locations)
}

fn retag_record_number(err: Error, record_number: i32) -> Error {
    match err {
        Error::WrongRecordShapeType { found, expected, .. } => Error::WrongRecordShapeType {
            record: record_number,
            found,
            expected,
        },
        other => other,
    }
}

impl ShapefileReader {
    /// Opens the dataset rooted at `base_path` (e.g. `"data/roads"` for
    /// `data/roads.shp` + `.shx` + `.dbf`).
    pub fn open(base_path: impl AsRef<Path>, options: ReaderOptions) -> Result<ShapefileReader> {
        let base_path = base_path.as_ref();

        let shp_bytes = read_file_bytes(&base_path.with_extension("shp"))?;
        let mut shp_reader = ByteOrderReader::new(Cursor::new(shp_bytes), Endianness::BigEndian)?;
        let shp_header = shp::read_header(&mut shp_reader)?;
        let shape_type = shp_header.shape_type;

        let locations = if options.ignore_shx {
            scan_shp_locations(&mut shp_reader)?
        } else {
            let shx_bytes = read_file_bytes(&base_path.with_extension("shx"))?;
            let mut shx_reader =
                ByteOrderReader::new(Cursor::new(shx_bytes), Endianness::BigEndian)?;
            let _ = shp::read_header(&mut shx_reader)?;
            let mut locs = Vec::new();
            while shx_reader.pos() < shx_reader.len() {
                let (offset_words, _) = shp::read_shx_record(&mut shx_reader)?;
                locs.push(offset_words as usize * 2);
            }
            locs
        };
        let num_records = locations.len();

        let dbf_bytes = read_file_bytes(&base_path.with_extension("dbf"))?;
        let mut dbf_reader = ByteOrderReader::new(Cursor::new(dbf_bytes), Endianness::LittleEndian)?;
        let (dbf_header, catalog) =
            dbf_codec::read_header(&mut dbf_reader, options.allow_field_size_255)?;

        if !options.ignore_dbf && dbf_header.num_records as usize != num_records {
            return Err(Error::MismatchedFile {
                shp: num_records,
                dbf: dbf_header.num_records as usize,
            });
        }

        let charset = match &options.charset_override {
            Some(cs) => cs.clone(),
            None => match std::fs::read_to_string(base_path.with_extension("cpg")) {
                Ok(name) => Charset::from_cpg_name(name.trim()).unwrap_or_default(),
                Err(_) => Charset::default(),
            },
        };

        let prj_text = std::fs::read_to_string(base_path.with_extension("prj")).ok();

        let dbt = if catalog.has_memo_field() {
            let dbt_bytes = read_file_bytes(&base_path.with_extension("dbt"))?;
            Some(DbtReader::open(Cursor::new(dbt_bytes))?)
        } else {
            None
        };

        Ok(ShapefileReader {
            shape_type,
            catalog,
            charset,
            prj_text,
            options,
            shp_reader,
            locations,
            dbf_reader,
            dbf_header,
            dbt,
            header_bounds: shp_header.bounds,
            position: Position::BeforeStart,
            current: None,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn num_records(&self) -> usize {
        self.locations.len()
    }

    pub fn fields(&self) -> &[Field] {
        self.catalog.fields()
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn prj(&self) -> Option<&str> {
        self.prj_text.as_deref()
    }

    pub fn header_bounding_box(&self) -> Option<Bounds> {
        if self.options.ignore_shapefile_bbox {
            None
        } else {
            Some(self.header_bounds)
        }
    }

    pub fn dbt_next_available_block(&mut self) -> Result<Option<u32>> {
        match &mut self.dbt {
            Some(d) => Ok(Some(d.next_available_block()?)),
            None => Ok(None),
        }
    }

    /// Resets the cursor so the next call to [`Iterator::next`] yields the
    /// first record.
    pub fn rewind(&mut self) {
        self.position = Position::BeforeStart;
        self.current = None;
    }

    /// The last geometry produced by `next()` or `set_current_record`, if
    /// the cursor is on a valid record.
    pub fn current(&self) -> Option<&Geometry> {
        self.current.as_ref()
    }

    /// The 1-based record number of the current record, or `None` before
    /// the first `next()` call or after exhaustion.
    pub fn key(&self) -> Option<i32> {
        match self.position {
            Position::At(i) => Some(i as i32 + 1),
            _ => None,
        }
    }

    pub fn valid(&self) -> bool {
        matches!(self.position, Position::At(_))
    }

    /// The 1-based current record number, or `-1` (the EOF sentinel) if
    /// the cursor is not on a valid record.
    pub fn get_current_record(&self) -> i32 {
        self.key().unwrap_or(-1)
    }

    /// Repositions the cursor at 1-based record `record_number`. Requires
    /// the SHX index; fails `RandomAccessUnavailable` if it was ignored.
    pub fn set_current_record(&mut self, record_number: i32) -> Result<()> {
        if self.options.ignore_shx {
            return Err(Error::RandomAccessUnavailable);
        }
        if record_number < 1 || record_number as usize > self.locations.len() {
            return Err(Error::RecordNotFound(record_number));
        }
        let index = (record_number - 1) as usize;
        let geometry = self.read_geometry_at(index)?;
        self.position = Position::At(index);
        self.current = Some(geometry);
        Ok(())
    }

    fn read_geometry_at(&mut self, index: usize) -> Result<Geometry> {
        let offset = self.locations[index];
        self.shp_reader.seek(offset)?;
        let (record_number, _) = shp::read_record_header(&mut self.shp_reader)?;
        let read_opts = ShapeReadOptions {
            suppress_z: self.options.suppress_z,
            suppress_m: self.options.suppress_m,
            closed_ring_action: self.options.closed_ring_action,
            orientation_autosense: self.options.orientation_autosense,
            force_multipart: self.options.force_multipart,
        };
        let mut geometry = shp::read_shape(&mut self.shp_reader, self.shape_type, &read_opts)
            .map_err(|e| retag_record_number(e, record_number))?;
        shp::apply_polygon_output_orientation(
            &mut geometry.shape,
            self.options.polygon_output_orientation,
        )
        .map_err(|e| retag_record_number(e, record_number))?;
        if self.options.ignore_geometry_bboxes {
            geometry.reset_custom_bounding_box();
        }
        if !self.options.ignore_dbf {
            self.populate_attributes(index, &mut geometry)?;
        }
        Ok(geometry)
    }

    fn populate_attributes(&mut self, index: usize, geometry: &mut Geometry) -> Result<()> {
        let offset =
            self.dbf_header.header_size as usize + index * self.dbf_header.record_size as usize;
        self.dbf_reader.seek(offset)?;
        let record_options = RecordCodecOptions {
            null_pad: self.options.dbf_null_pad,
            nullify_invalid_dates: self.options.nullify_invalid_dates,
        };
        let (deleted, values) = dbf_codec::read_record(
            &mut self.dbf_reader,
            self.catalog.fields(),
            &self.charset,
            &record_options,
            &mut self.dbt,
        )?;
        geometry.set_flag_deleted(deleted);
        for (field, value) in self.catalog.fields().iter().zip(values) {
            if self
                .options
                .dbf_ignored_fields
                .iter()
                .any(|f| f.eq_ignore_ascii_case(&field.name))
            {
                continue;
            }
            let value = if self.options.dates_as_objects {
                value
            } else {
                match value {
                    AttributeValue::Date(d) => {
                        AttributeValue::Character(d.format("%Y-%m-%d").to_string())
                    }
                    other => other,
                }
            };
            geometry.set_data(&field.name, value);
        }
        Ok(())
    }
}

impl Iterator for ShapefileReader {
    type Item = Result<Geometry>;

    fn next(&mut self) -> Option<Result<Geometry>> {
        let next_index = match self.position {
            Position::BeforeStart => 0,
            Position::At(i) => i + 1,
            Position::Exhausted => return None,
        };
        if next_index >= self.locations.len() {
            self.position = Position::Exhausted;
            self.current = None;
            return None;
        }
        match self.read_geometry_at(next_index) {
            Ok(geometry) => {
                self.position = Position::At(next_index);
                self.current = Some(geometry.clone());
                Some(Ok(geometry))
            }
            Err(e) => {
                self.position = Position::At(next_index);
                self.current = None;
                Some(Err(e))
            }
        }
    }
}
