/// Every failure surface of the shapefile codec: a flat tagged enumeration
/// with an optional detail string, as the format's own error model calls
/// for. Propagates to the caller unchanged; nothing here is ever swallowed.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // -- file access --
    #[error("file not found: {0}")]
    FileMissing(String),
    #[error("file exists but is not accessible: {0}")]
    FileProtected(String),
    #[error("invalid stream resource: {0}")]
    InvalidStreamResource(String),
    #[error("failed to open {path}: {detail}")]
    OpenFailed { path: String, detail: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),

    // -- SHP / shape type --
    #[error("shape type {0} is not supported")]
    ShapeTypeNotSupported(i32),
    #[error("shape type has not been set on this writer")]
    ShapeTypeNotSet,
    #[error("shape type has already been set on this writer")]
    ShapeTypeAlreadySet,
    #[error("geometry's base type/dimension flags do not match the dataset's shape type")]
    GeometryTypeNotCompatible,
    #[error("geometry bounding box does not agree with its shape type's dimensionality")]
    BboxMismatched,
    #[error("dataset has already been initialized; can no longer modify the field catalog")]
    AlreadyInitialized,
    #[error("record {record} has shape type {found}, expected {expected}")]
    WrongRecordShapeType {
        record: i32,
        found: i32,
        expected: i32,
    },

    // -- DBF --
    #[error("not a valid dBase file: {0}")]
    FileNotValidDbase(String),
    #[error("SHP and DBF record counts disagree: {shp} vs {dbf}")]
    MismatchedFile { shp: usize, dbf: usize },
    #[error("unexpected end of DBF/DBT file")]
    DbfEofReached,
    #[error("a dataset may declare at most 255 fields")]
    MaxFieldCountReached,
    #[error("could not produce a unique field name for {0:?}")]
    FieldNameNotValid(String),
    #[error("field type {0:?} is not one of C/D/L/M/N/F")]
    FieldTypeNotValid(char),
    #[error("field size {size} is not valid for type {field_type:?}")]
    FieldSizeNotValid { field_type: char, size: u8 },
    #[error("decimal count {decimals} is not valid for field size {size}")]
    FieldDecimalsNotValid { size: u8, decimals: u8 },
    #[error("could not transcode DBF text using the configured charset: {0}")]
    DbfCharsetConversion(String),

    // -- DBT --
    #[error("unexpected end of DBT memo file")]
    DbtEofReached,

    // -- geometry --
    #[error("cannot re-initialize a geometry that is already non-empty")]
    GeometryNotEmpty,
    #[error("coordinate value is not a valid finite number")]
    CoordValueNotValid,
    #[error("geometry's Z/M dimension flags do not match the collection's")]
    MismatchedDimensions,
    #[error("custom bounding box does not match the geometry's computed bounding box axes")]
    MismatchedBbox,
    #[error("field {0:?} has no value set on this geometry")]
    MissingField(String),
    #[error("point has fewer than 2 axes")]
    PointNotValid,
    #[error("polygon ring is not closed")]
    PolygonOpenRing,
    #[error("polygon ring orientation does not match the Shapefile convention")]
    PolygonWrongOrientation,
    #[error("ring signed area is too small to determine orientation")]
    RingAreaTooSmall,
    #[error("ring has fewer than 3 vertices")]
    RingNotEnoughVertices,

    // -- input validation --
    #[error("record {0} not found")]
    RecordNotFound(i32),
    #[error("field {0:?} not found")]
    FieldNotFound(String),
    #[error("{0:?} is not a valid geometry type name")]
    GeometryTypeNotValid(String),
    #[error("geometry index {0} is out of range")]
    GeometryIndexNotValid(usize),
    #[error("structured array does not have the expected shape: {0}")]
    ArrayNotValid(String),
    #[error("invalid WKT: {0}")]
    InvalidWkt(String),
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("numeric value overflows its field width")]
    NumericValueOverflow,
    #[error("random access requires the SHX index, which this reader is ignoring")]
    RandomAccessUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;
