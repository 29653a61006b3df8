//! Reader/writer configuration (§4.8, §4.9): plain structs with a
//! `Default` impl, the way the teacher's tool parameters are grouped
//! into a single options bag rather than threaded as loose arguments.

use crate::charset::Charset;
use crate::shp::{ClosedRingAction, PolygonOutputOrientation};

/// Options shared by [`crate::reader::ShapefileReader`] plus the knobs
/// `§4.8` adds on top.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub ignore_shx: bool,
    pub ignore_dbf: bool,
    pub suppress_z: bool,
    pub suppress_m: bool,
    pub ignore_shapefile_bbox: bool,
    pub ignore_geometry_bboxes: bool,
    pub force_multipart: bool,
    pub closed_ring_action: ClosedRingAction,
    pub orientation_autosense: bool,
    pub polygon_output_orientation: PolygonOutputOrientation,
    pub dbf_ignored_fields: Vec<String>,
    pub dbf_null_pad: u8,
    pub nullify_invalid_dates: bool,
    pub dates_as_objects: bool,
    pub all_caps_field_names: bool,
    pub charset_override: Option<Charset>,
    /// Tolerate a DBF field descriptor that declares size 255 — outside
    /// §4.5's normal 1..254 range but produced by some dBase dialects —
    /// instead of rejecting the file with `FieldSizeNotValid`.
    pub allow_field_size_255: bool,
}

impl Default for ReaderOptions {
    fn default() -> ReaderOptions {
        ReaderOptions {
            ignore_shx: false,
            ignore_dbf: false,
            suppress_z: false,
            suppress_m: false,
            ignore_shapefile_bbox: false,
            ignore_geometry_bboxes: false,
            force_multipart: false,
            closed_ring_action: ClosedRingAction::Ignore,
            orientation_autosense: false,
            polygon_output_orientation: PolygonOutputOrientation::AsStored,
            dbf_ignored_fields: Vec::new(),
            dbf_null_pad: b' ',
            nullify_invalid_dates: false,
            dates_as_objects: true,
            all_caps_field_names: false,
            charset_override: None,
            allow_field_size_255: false,
        }
    }
}

/// What to do when the writer's output paths already exist on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingFilePolicy {
    /// Fail with [`crate::error::Error::OpenFailed`] if any output file exists.
    Preserve,
    /// Truncate and start fresh.
    Overwrite,
    /// Recover state from the existing files and continue writing.
    Append,
}

#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub all_caps_field_names: bool,
    pub charset: Charset,
    pub existing_file_policy: ExistingFilePolicy,
    pub flush_every: usize,
    pub delete_empty_files_on_close: bool,
    pub relax_required_fields: bool,
    pub write_cpg_for_default_charset: bool,
}

impl Default for WriterOptions {
    fn default() -> WriterOptions {
        WriterOptions {
            all_caps_field_names: false,
            charset: Charset::default(),
            existing_file_policy: ExistingFilePolicy::Preserve,
            flush_every: 10,
            delete_empty_files_on_close: false,
            relax_required_fields: false,
            write_cpg_for_default_charset: false,
        }
    }
}
