//! Read and write ESRI Shapefiles (SHP/SHX/DBF/DBT, plus the PRJ/CPG
//! sidecars), with WKT and GeoJSON conversions.
//!
//! [`ShapefileReader`] and [`ShapefileWriter`] are the two entry points for
//! most callers; [`wkt`] and [`geojson`] convert individual [`Geometry`]
//! values to and from those text formats independent of any file on disk.

pub mod array;
pub mod attributes;
pub mod bounds;
pub mod charset;
pub mod coord;
pub mod dbf;
pub mod dbt;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod options;
pub mod reader;
pub mod ring;
pub mod shape_type;
pub mod shp;
pub mod wkt;
pub mod writer;

pub use array::{from_array, to_array};
pub use attributes::{AttributeDict, AttributeValue};
pub use bounds::Bounds;
pub use charset::Charset;
pub use coord::{Coord, Measure};
pub use dbf::{Field, FieldType};
pub use error::{Error, Result};
pub use geojson::{from_geojson, to_geojson, GeoJsonOptions};
pub use geometry::{Geometry, Shape};
pub use options::{ExistingFilePolicy, ReaderOptions, WriterOptions};
pub use reader::ShapefileReader;
pub use shape_type::{BaseShapeType, Dimension, ShapeType};
pub use shp::{ClosedRingAction, PolygonOutputOrientation};
pub use wkt::{from_wkt, to_wkt};
pub use writer::ShapefileWriter;
