//! The writer driver (§4.9): builds a SHP/SHX/DBF/DBT file set plus PRJ/CPG
//! sidecars record by record.
//!
//! Writes go directly against real file handles rather than a manual
//! in-memory buffer; [`ByteOrderWriter`] and the OS page cache already give
//! us the "buffered, periodically flushed" behavior the format calls for,
//! so `flush_every` just governs how often [`ShapefileWriter::flush_buffer`]
//! runs automatically.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::Local;
use shapefile_common::{ByteOrderWriter, Endianness};

use crate::attributes::AttributeValue;
use crate::bounds::Bounds;
use crate::charset::Charset;
use crate::dbf::codec as dbf_codec;
use crate::dbf::{Catalog, Field, FieldType};
use crate::dbt::DbtWriter;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::options::{ExistingFilePolicy, ReaderOptions, WriterOptions};
use crate::reader::ShapefileReader;
use crate::shape_type::ShapeType;
use crate::shp;

fn open_file(path: &Path, append: bool) -> Result<File> {
    let result = if append {
        OpenOptions::new().read(true).write(true).open(path)
    } else {
        File::create(path)
    };
    result.map_err(|e| Error::OpenFailed {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| Error::OpenFailed {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

/// A dataset being written out, one record at a time.
pub struct ShapefileWriter {
    base_path: PathBuf,
    shape_type: Option<ShapeType>,
    catalog: Catalog,
    charset: Charset,
    prj_text: Option<String>,
    custom_dataset_bbox: Option<Bounds>,
    options: WriterOptions,
    shp_writer: ByteOrderWriter<File>,
    shx_writer: ByteOrderWriter<File>,
    dbf_writer: ByteOrderWriter<File>,
    dbt_writer: Option<DbtWriter<File>>,
    dataset_bounds: Option<Bounds>,
    num_records: u32,
    shp_offset_words: i32,
    dbf_body_started: bool,
    records_since_flush: usize,
    closed: bool,
}

impl ShapefileWriter {
    /// Opens the dataset rooted at `base_path`, applying `options`'s
    /// [`ExistingFilePolicy`] to whatever already exists there.
    pub fn create(base_path: impl AsRef<Path>, options: WriterOptions) -> Result<ShapefileWriter> {
        let base_path = base_path.as_ref().to_path_buf();
        let shp_path = base_path.with_extension("shp");
        let shx_path = base_path.with_extension("shx");
        let dbf_path = base_path.with_extension("dbf");

        let any_exists = shp_path.exists() || shx_path.exists() || dbf_path.exists();
        if options.existing_file_policy == ExistingFilePolicy::Preserve && any_exists {
            return Err(Error::OpenFailed {
                path: shp_path.display().to_string(),
                detail: "a dataset already exists at this path".to_string(),
            });
        }

        let shp_nonempty = std::fs::metadata(&shp_path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        let append = options.existing_file_policy == ExistingFilePolicy::Append
            && any_exists
            && shp_nonempty;

        let mut shape_type = None;
        let mut catalog = Catalog::new(options.all_caps_field_names);
        let mut charset = options.charset.clone();
        let mut prj_text = None;
        let mut dataset_bounds = None;
        let mut num_records = 0u32;
        let mut dbt_next_block = None;

        if append {
            let mut reader = ShapefileReader::open(&base_path, ReaderOptions::default())?;
            shape_type = Some(reader.shape_type());
            catalog = reader.catalog().clone();
            catalog.mark_initialized();
            charset = reader.charset().clone();
            prj_text = reader.prj().map(str::to_string);
            dataset_bounds = reader.header_bounding_box();
            num_records = reader.num_records() as u32;
            dbt_next_block = reader.dbt_next_available_block()?;
        }

        let mut shp_writer =
            ByteOrderWriter::new(open_file(&shp_path, append)?, Endianness::BigEndian);
        let mut shx_writer =
            ByteOrderWriter::new(open_file(&shx_path, append)?, Endianness::BigEndian);
        let mut dbf_writer =
            ByteOrderWriter::new(open_file(&dbf_path, append)?, Endianness::LittleEndian);

        let shp_offset_words;
        let dbf_body_started;
        if append {
            let shp_len = shp_writer.get_mut().seek(SeekFrom::End(0))?;
            shx_writer.get_mut().seek(SeekFrom::End(0))?;
            let dbf_len = dbf_writer.get_mut().seek(SeekFrom::End(0))?;
            if dbf_len > 0 {
                dbf_writer.get_mut().seek(SeekFrom::Start(dbf_len - 1))?;
            }
            shp_offset_words = (shp_len / 2) as i32;
            dbf_body_started = true;
        } else {
            shp_writer.write_bytes(&[0u8; shp::FILE_HEADER_SIZE])?;
            shx_writer.write_bytes(&[0u8; shp::FILE_HEADER_SIZE])?;
            shp_offset_words = (shp::FILE_HEADER_SIZE / 2) as i32;
            dbf_body_started = false;
        }

        let dbt_writer = if append && catalog.has_memo_field() {
            let dbt_path = base_path.with_extension("dbt");
            let mut dbt_file = open_file(&dbt_path, true)?;
            dbt_file.seek(SeekFrom::End(0))?;
            Some(DbtWriter::new(dbt_file, dbt_next_block.unwrap_or(1)))
        } else {
            None
        };

        Ok(ShapefileWriter {
            base_path,
            shape_type,
            catalog,
            charset,
            prj_text,
            custom_dataset_bbox: None,
            options,
            shp_writer,
            shx_writer,
            dbf_writer,
            dbt_writer,
            dataset_bounds,
            num_records,
            shp_offset_words,
            dbf_body_started,
            records_since_flush: 0,
            closed: false,
        })
    }

    pub fn shape_type(&self) -> Option<ShapeType> {
        self.shape_type
    }

    pub fn num_records(&self) -> u32 {
        self.num_records
    }

    pub fn fields(&self) -> &[Field] {
        self.catalog.fields()
    }

    /// May only be called once, before the field catalog is locked by the
    /// first [`ShapefileWriter::write_record`] call (or recovered already
    /// locked, in append mode).
    pub fn set_shape_type(&mut self, shape_type: ShapeType) -> Result<()> {
        if self.shape_type.is_some() {
            return Err(Error::ShapeTypeAlreadySet);
        }
        if shape_type.is_null() {
            return Err(Error::ShapeTypeNotSupported(0));
        }
        self.shape_type = Some(shape_type);
        Ok(())
    }

    pub fn set_prj(&mut self, wkt_text: impl Into<String>) {
        self.prj_text = Some(wkt_text.into());
    }

    pub fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }

    pub fn set_custom_bounding_box(&mut self, bbox: Bounds) {
        self.custom_dataset_bbox = Some(bbox);
    }

    pub fn reset_custom_bounding_box(&mut self) {
        self.custom_dataset_bbox = None;
    }

    pub fn add_field(
        &mut self,
        name: &str,
        field_type: FieldType,
        size: u8,
        decimals: u8,
    ) -> Result<()> {
        self.catalog.add_field(name, field_type, size, decimals)?;
        Ok(())
    }

    pub fn add_char_field(&mut self, name: &str, size: u8) -> Result<()> {
        self.add_field(name, FieldType::Character, size, 0)
    }

    pub fn add_date_field(&mut self, name: &str) -> Result<()> {
        self.add_field(name, FieldType::Date, 8, 0)
    }

    pub fn add_logical_field(&mut self, name: &str) -> Result<()> {
        self.add_field(name, FieldType::Logical, 1, 0)
    }

    pub fn add_memo_field(&mut self, name: &str) -> Result<()> {
        self.add_field(name, FieldType::Memo, 10, 0)
    }

    pub fn add_numeric_field(&mut self, name: &str, size: u8, decimals: u8) -> Result<()> {
        self.add_field(name, FieldType::Numeric, size, decimals)
    }

    pub fn add_float_field(&mut self, name: &str, size: u8, decimals: u8) -> Result<()> {
        self.add_field(name, FieldType::Float, size, decimals)
    }

    fn lookup_value(&self, geometry: &Geometry, field: &Field) -> Result<AttributeValue> {
        match geometry.get_data(&field.name) {
            Some(value) => Ok(value.clone()),
            None if self.options.relax_required_fields => Ok(AttributeValue::Null),
            None => Err(Error::MissingField(field.name.clone())),
        }
    }

    fn validate_value(&self, field: &Field, value: &AttributeValue) -> Result<()> {
        match (field.field_type, value) {
            (_, AttributeValue::Null) => Ok(()),
            (FieldType::Character, AttributeValue::Character(s)) => {
                self.charset.encode(s)?;
                Ok(())
            }
            (FieldType::Logical, AttributeValue::Logical(_)) => Ok(()),
            (FieldType::Date, AttributeValue::Date(_)) => Ok(()),
            (FieldType::Numeric, AttributeValue::Numeric(n))
            | (FieldType::Float, AttributeValue::Numeric(n)) => {
                let text = format!("{:.*}", field.decimals as usize, n);
                if text.len() > field.size as usize {
                    return Err(Error::NumericValueOverflow);
                }
                Ok(())
            }
            (FieldType::Memo, AttributeValue::Memo(_))
            | (FieldType::Memo, AttributeValue::Character(_)) => Ok(()),
            _ => Err(Error::GeometryTypeNotCompatible),
        }
    }

    /// Validates `geometry` (shape type, Z/M flags, every field value)
    /// before touching any file, then commits it. The only failure mode
    /// left once validation passes is I/O, so a successful call here never
    /// leaves a partially written record behind.
    pub fn write_record(&mut self, geometry: &Geometry) -> Result<()> {
        let shape_type = self.shape_type.ok_or(Error::ShapeTypeNotSet)?;
        let base = shape_type.base_shape_type().ok_or(Error::ShapeTypeNotSet)?;
        if geometry.get_shape_base_type() != base
            || geometry.is_z() != shape_type.has_z()
            || geometry.is_m() != shape_type.has_m()
        {
            return Err(Error::GeometryTypeNotCompatible);
        }

        self.catalog.mark_initialized();

        let mut values = Vec::with_capacity(self.catalog.fields().len());
        for field in self.catalog.fields() {
            let value = self.lookup_value(geometry, field)?;
            self.validate_value(field, &value)?;
            values.push(value);
        }

        self.commit_record(shape_type, geometry, values)
    }

    fn commit_record(
        &mut self,
        shape_type: ShapeType,
        geometry: &Geometry,
        values: Vec<AttributeValue>,
    ) -> Result<()> {
        if !self.dbf_body_started {
            self.dbf_body_started = true;
            let header_size = dbf_codec::header_size_for(self.catalog.fields());
            self.dbf_writer
                .get_mut()
                .seek(SeekFrom::Start(header_size as u64))?;
            if self.catalog.has_memo_field() && self.dbt_writer.is_none() {
                let dbt_file = create_file(&self.base_path.with_extension("dbt"))?;
                self.dbt_writer = Some(DbtWriter::new(dbt_file, 1));
            }
        }

        let bytes = shp::write_shape(geometry, shape_type)?;
        let content_length_words = (bytes.len() / 2) as i32;
        let record_number = self.num_records as i32 + 1;

        shp::write_record_header(&mut self.shp_writer, record_number, content_length_words)?;
        self.shp_writer.write_bytes(&bytes)?;
        shp::write_shx_record(&mut self.shx_writer, self.shp_offset_words, content_length_words)?;

        dbf_codec::write_record(
            &mut self.dbf_writer,
            self.catalog.fields(),
            &self.charset,
            geometry.is_deleted(),
            &values,
            &mut self.dbt_writer,
        )?;

        let record_bounds = geometry.get_bounding_box();
        match &mut self.dataset_bounds {
            Some(b) => b.expand_to(&record_bounds),
            None => self.dataset_bounds = Some(record_bounds),
        }

        self.shp_offset_words += 4 + content_length_words;
        self.num_records += 1;
        self.records_since_flush += 1;
        if self.records_since_flush >= self.options.flush_every {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Flushes all four open file handles. Called automatically every
    /// `options.flush_every` records, and once more from [`Self::close`].
    pub fn flush_buffer(&mut self) -> Result<()> {
        self.shp_writer.flush()?;
        self.shx_writer.flush()?;
        self.dbf_writer.flush()?;
        if let Some(dbt) = &mut self.dbt_writer {
            dbt.flush()?;
        }
        self.records_since_flush = 0;
        Ok(())
    }

    /// Finalizes the dataset: if no record was ever written, commits a
    /// placeholder Null-shape record; backfills the SHP/SHX/DBF headers now
    /// that the final record count and bounding box are known; finishes
    /// the DBT allocator, if one was opened; writes the DBF EOF marker; and
    /// (over)writes the PRJ/CPG sidecars.
    pub fn close(mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let shape_type = self.shape_type.ok_or(Error::ShapeTypeNotSet)?;

        if self.num_records == 0 {
            self.catalog.mark_initialized();
            let geometry = shp::empty_geometry(shape_type);
            let values = vec![AttributeValue::Null; self.catalog.fields().len()];
            self.commit_record(shape_type, &geometry, values)?;
        }

        self.flush_buffer()?;

        let dataset_bounds = self
            .custom_dataset_bbox
            .or(self.dataset_bounds)
            .unwrap_or_else(|| Bounds::empty(shape_type.has_z(), shape_type.has_m()));

        self.shp_writer.get_mut().seek(SeekFrom::Start(0))?;
        shp::write_header(
            &mut self.shp_writer,
            &shp::ShapeFileHeader {
                file_length_words: self.shp_offset_words,
                shape_type,
                bounds: dataset_bounds,
            },
        )?;

        self.shx_writer.get_mut().seek(SeekFrom::Start(0))?;
        shp::write_header(
            &mut self.shx_writer,
            &shp::ShapeFileHeader {
                file_length_words: (shp::FILE_HEADER_SIZE / 2) as i32 + self.num_records as i32 * 4,
                shape_type,
                bounds: dataset_bounds,
            },
        )?;

        self.dbf_writer.get_mut().seek(SeekFrom::Start(0))?;
        dbf_codec::write_header(
            &mut self.dbf_writer,
            self.catalog.fields(),
            self.num_records,
            self.catalog.has_memo_field(),
            Local::now().date_naive(),
        )?;

        if let Some(dbt) = self.dbt_writer.take() {
            dbt.finish()?;
        }

        self.dbf_writer.get_mut().seek(SeekFrom::End(0))?;
        dbf_codec::write_eof_marker(&mut self.dbf_writer)?;

        self.flush_buffer()?;

        if let Some(prj) = &self.prj_text {
            std::fs::write(self.base_path.with_extension("prj"), prj)?;
        }
        let is_default_charset = self.charset.cpg_name() == Charset::default().cpg_name();
        if !is_default_charset || self.options.write_cpg_for_default_charset {
            std::fs::write(self.base_path.with_extension("cpg"), self.charset.cpg_name())?;
        }

        if self.options.delete_empty_files_on_close {
            for ext in ["shp", "shx", "dbf", "dbt", "prj", "cpg"] {
                let path = self.base_path.with_extension(ext);
                if std::fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(false) {
                    let _ = std::fs::remove_file(&path);
                }
            }
        }

        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coord;
    use crate::geometry::Shape;

    fn point_at(x: f64, y: f64) -> Geometry {
        Geometry::new(Shape::Point(Coord::xy(x, y)), false, false, false)
    }

    #[test]
    fn writes_then_reads_back_a_point_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("towns");

        let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
        writer.set_shape_type(ShapeType::Point).unwrap();
        writer.add_char_field("NAME", 20).unwrap();
        writer.add_numeric_field("POP", 9, 0).unwrap();

        let mut a = point_at(1.0, 2.0);
        a.set_data("NAME", AttributeValue::Character("Alpha".to_string()));
        a.set_data("POP", AttributeValue::Numeric(120.0));
        writer.write_record(&a).unwrap();

        let mut b = point_at(3.0, 4.0);
        b.set_data("NAME", AttributeValue::Character("Beta".to_string()));
        b.set_data("POP", AttributeValue::Numeric(88.0));
        writer.write_record(&b).unwrap();

        writer.close().unwrap();

        let mut reader = ShapefileReader::open(&base, ReaderOptions::default()).unwrap();
        assert_eq!(reader.num_records(), 2);
        assert_eq!(reader.shape_type(), ShapeType::Point);

        let first = reader.next().unwrap().unwrap();
        assert_eq!(
            first.get_data("NAME"),
            Some(&AttributeValue::Character("Alpha".to_string()))
        );
        let second = reader.next().unwrap().unwrap();
        assert_eq!(
            second.get_data("POP"),
            Some(&AttributeValue::Numeric(88.0))
        );
        assert!(reader.next().is_none());
    }

    #[test]
    fn closing_with_zero_records_writes_a_null_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("empty");

        let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
        writer.set_shape_type(ShapeType::Polygon).unwrap();
        writer.close().unwrap();

        let mut reader = ShapefileReader::open(&base, ReaderOptions::default()).unwrap();
        assert_eq!(reader.num_records(), 1);
        let geometry = reader.next().unwrap().unwrap();
        assert!(geometry.is_empty());
    }

    #[test]
    fn missing_required_field_is_rejected_unless_relaxed() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("strict");

        let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
        writer.set_shape_type(ShapeType::Point).unwrap();
        writer.add_char_field("NAME", 10).unwrap();

        let geometry = point_at(0.0, 0.0);
        assert!(matches!(
            writer.write_record(&geometry),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn append_mode_continues_an_existing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("roads");

        let mut writer = ShapefileWriter::create(&base, WriterOptions::default()).unwrap();
        writer.set_shape_type(ShapeType::Point).unwrap();
        writer.add_numeric_field("ID", 5, 0).unwrap();
        for i in 0..2 {
            let mut g = point_at(i as f64, i as f64);
            g.set_data("ID", AttributeValue::Numeric(i as f64));
            writer.write_record(&g).unwrap();
        }
        writer.close().unwrap();

        let append_options = WriterOptions {
            existing_file_policy: ExistingFilePolicy::Append,
            ..WriterOptions::default()
        };
        let mut writer = ShapefileWriter::create(&base, append_options).unwrap();
        assert_eq!(writer.num_records(), 2);
        let mut g = point_at(9.0, 9.0);
        g.set_data("ID", AttributeValue::Numeric(9.0));
        writer.write_record(&g).unwrap();
        writer.close().unwrap();

        let mut reader = ShapefileReader::open(&base, ReaderOptions::default()).unwrap();
        assert_eq!(reader.num_records(), 3);
        let geoms: Vec<_> = (&mut reader).map(|r| r.unwrap()).collect();
        assert_eq!(geoms.len(), 3);
        assert_eq!(geoms[2].get_data("ID"), Some(&AttributeValue::Numeric(9.0)));
    }
}
