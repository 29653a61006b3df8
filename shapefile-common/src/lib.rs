//! Generic byte-level utilities and geometric primitives shared across the
//! shapefile codec. Nothing in this crate knows about SHP/DBF framing.

mod bounding_box;
mod byte_order;

pub use self::bounding_box::BoundingBox;
pub use self::byte_order::{ByteOrderReader, ByteOrderWriter, Endianness};
