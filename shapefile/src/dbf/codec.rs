//! Row and header framing for the DBF wire format (§4.7).

use std::io::{Read, Seek, Write};

use chrono::{Datelike, NaiveDate};
use shapefile_common::{ByteOrderReader, ByteOrderWriter, Endianness};

use crate::attributes::AttributeValue;
use crate::charset::Charset;
use crate::dbf::{Catalog, Field, FieldType};
use crate::dbt::{DbtReader, DbtWriter};
use crate::error::{Error, Result};

const FIELD_DESCRIPTOR_SIZE: usize = 32;
const HEADER_FIXED_SIZE: usize = 32;
const TERMINATOR: u8 = 0x0D;
const EOF_MARKER: u8 = 0x1A;
const RECORD_LIVE: u8 = 0x20;
const RECORD_DELETED: u8 = 0x2A;

#[derive(Debug, Clone, Copy)]
pub struct DbfHeader {
    pub version: u8,
    pub last_modified: NaiveDate,
    pub num_records: u32,
    pub header_size: u16,
    pub record_size: u16,
}

fn record_size_for(fields: &[Field]) -> u16 {
    1 + fields.iter().map(|f| f.size as u16).sum::<u16>()
}

/// The byte size of the fixed header plus field descriptor array plus
/// terminator, for a catalog of `fields.len()` fields.
pub fn header_size_for(fields: &[Field]) -> u16 {
    (HEADER_FIXED_SIZE + fields.len() * FIELD_DESCRIPTOR_SIZE + 1) as u16
}

pub fn write_header<W: Write>(
    writer: &mut ByteOrderWriter<W>,
    fields: &[Field],
    num_records: u32,
    has_memo: bool,
    last_modified: NaiveDate,
) -> Result<()> {
    writer.write_u8(if has_memo { 0x83 } else { 0x03 })?;
    writer.write_u8((last_modified.year() - 1900) as u8)?;
    writer.write_u8(last_modified.month() as u8)?;
    writer.write_u8(last_modified.day() as u8)?;
    writer.write_u32(num_records)?;
    let header_size = header_size_for(fields);
    writer.write_u16(header_size)?;
    writer.write_u16(record_size_for(fields))?;
    writer.write_bytes(&[0u8; 20])?;

    for field in fields {
        writer.write_fixed_ascii(&field.name, 11)?;
        writer.write_u8(field.field_type.to_char() as u8)?;
        writer.write_bytes(&[0u8; 4])?;
        writer.write_u8(field.size)?;
        writer.write_u8(field.decimals)?;
        writer.write_bytes(&[0u8; 14])?;
    }
    writer.write_u8(TERMINATOR)?;
    Ok(())
}

pub fn read_header<R: Read + Seek>(
    reader: &mut ByteOrderReader<R>,
    allow_field_size_255: bool,
) -> Result<(DbfHeader, Catalog)> {
    reader.set_byte_order(Endianness::LittleEndian);
    let version = reader.read_u8()?;
    if version & 0x03 != 0x03 {
        return Err(Error::FileNotValidDbase(format!(
            "unsupported dBase version byte {version:#04x}"
        )));
    }
    let yy = reader.read_u8()? as i32;
    let mm = reader.read_u8()? as u32;
    let dd = reader.read_u8()? as u32;
    let last_modified = NaiveDate::from_ymd_opt(1900 + yy, mm.max(1), dd.max(1))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
    let num_records = reader.read_u32()?;
    let header_size = reader.read_u16()?;
    let record_size = reader.read_u16()?;
    reader.inc_pos(20)?;

    let num_fields = (header_size as usize - HEADER_FIXED_SIZE - 1) / FIELD_DESCRIPTOR_SIZE;
    let mut catalog = Catalog::new(false).allow_field_size_255(allow_field_size_255);
    for _ in 0..num_fields {
        let name = reader.read_fixed_ascii(11)?;
        let field_type = FieldType::from_char(reader.read_u8()? as char)?;
        reader.inc_pos(4)?;
        let size = reader.read_u8()?;
        let decimals = reader.read_u8()?;
        reader.inc_pos(14)?;
        catalog.add_field(&name, field_type, size, decimals)?;
    }
    catalog.mark_initialized();
    // Skip any trailing reserved bytes up to the terminator, tolerating
    // dialects that pad the descriptor array.
    reader.seek(header_size as usize)?;

    Ok((
        DbfHeader {
            version,
            last_modified,
            num_records,
            header_size,
            record_size,
        },
        catalog,
    ))
}

pub struct RecordCodecOptions {
    pub null_pad: u8,
    pub nullify_invalid_dates: bool,
}

impl Default for RecordCodecOptions {
    fn default() -> RecordCodecOptions {
        RecordCodecOptions {
            null_pad: b' ',
            nullify_invalid_dates: false,
        }
    }
}

pub fn write_record<W: Write, T: Write + Seek>(
    writer: &mut ByteOrderWriter<W>,
    fields: &[Field],
    charset: &Charset,
    deleted: bool,
    values: &[AttributeValue],
    dbt: &mut Option<DbtWriter<T>>,
) -> Result<()> {
    writer.write_u8(if deleted { RECORD_DELETED } else { RECORD_LIVE })?;
    for (field, value) in fields.iter().zip(values) {
        write_field_value(writer, field, charset, value, dbt)?;
    }
    Ok(())
}

fn pad_left(s: &str, width: usize, pad: char) -> String {
    if s.len() >= width {
        s[s.len() - width..].to_string()
    } else {
        let mut out: String = std::iter::repeat(pad).take(width - s.len()).collect();
        out.push_str(s);
        out
    }
}

/// Right-pads (or truncates) an already-encoded byte string to exactly
/// `width` bytes. Operates on bytes rather than `str` so a multibyte
/// charset's output truncates on a byte boundary instead of panicking on
/// a split codepoint.
fn pad_right_bytes(bytes: Vec<u8>, width: usize, pad: u8) -> Vec<u8> {
    let mut out = bytes;
    out.resize(width, pad);
    out
}

fn write_field_value<W: Write, T: Write + Seek>(
    writer: &mut ByteOrderWriter<W>,
    field: &Field,
    charset: &Charset,
    value: &AttributeValue,
    dbt: &mut Option<DbtWriter<T>>,
) -> Result<()> {
    let width = field.size as usize;
    match (field.field_type, value) {
        (_, AttributeValue::Null) => {
            writer.write_bytes(&vec![b' '; width])?;
        }
        (FieldType::Character, AttributeValue::Character(s)) => {
            let encoded = charset.encode(s)?;
            writer.write_bytes(&pad_right_bytes(encoded, width, b' '))?;
        }
        (FieldType::Logical, AttributeValue::Logical(b)) => {
            writer.write_u8(if *b { b'T' } else { b'F' })?;
        }
        (FieldType::Date, AttributeValue::Date(d)) => {
            writer.write_bytes(format!("{:04}{:02}{:02}", d.year(), d.month(), d.day()).as_bytes())?;
        }
        (FieldType::Numeric, AttributeValue::Numeric(n)) | (FieldType::Float, AttributeValue::Numeric(n)) => {
            let text = format!("{:.*}", field.decimals as usize, n);
            if text.len() > width {
                return Err(Error::NumericValueOverflow);
            }
            writer.write_bytes(pad_left(&text, width, ' ').as_bytes())?;
        }
        (FieldType::Memo, AttributeValue::Memo(text)) | (FieldType::Memo, AttributeValue::Character(text)) => {
            let dbt = dbt
                .as_mut()
                .expect("memo field present without an open DBT writer");
            let block = dbt.write_memo(text)?;
            writer.write_bytes(pad_left(&block.to_string(), width, ' ').as_bytes())?;
        }
        _ => {
            return Err(Error::GeometryTypeNotCompatible);
        }
    }
    Ok(())
}

pub fn read_record<R: Read + Seek>(
    reader: &mut ByteOrderReader<R>,
    fields: &[Field],
    charset: &Charset,
    options: &RecordCodecOptions,
    dbt: &mut Option<DbtReader<R>>,
) -> Result<(bool, Vec<AttributeValue>)>
where
    R: Read + Seek,
{
    let marker = reader.read_u8()?;
    let deleted = marker == RECORD_DELETED as u8;
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        values.push(read_field_value(reader, field, charset, options, dbt)?);
    }
    Ok((deleted, values))
}

fn read_field_value<R: Read + Seek>(
    reader: &mut ByteOrderReader<R>,
    field: &Field,
    charset: &Charset,
    options: &RecordCodecOptions,
    dbt: &mut Option<DbtReader<R>>,
) -> Result<AttributeValue> {
    let width = field.size as usize;
    let raw = reader.read_fixed_bytes(width)?;
    if raw.iter().all(|&b| b == options.null_pad || b == b' ') {
        return Ok(AttributeValue::Null);
    }
    let text = charset.decode(&raw);
    let trimmed = text.trim();
    Ok(match field.field_type {
        FieldType::Character => AttributeValue::Character(text.trim_end().to_string()),
        FieldType::Numeric | FieldType::Float => match trimmed.parse::<f64>() {
            Ok(v) => AttributeValue::Numeric(v),
            Err(_) => AttributeValue::Null,
        },
        FieldType::Logical => match trimmed {
            "T" | "t" | "Y" | "y" => AttributeValue::Logical(true),
            "F" | "f" | "N" | "n" => AttributeValue::Logical(false),
            _ => AttributeValue::Null,
        },
        FieldType::Date => {
            if trimmed.len() == 8 {
                let year = trimmed[0..4].parse::<i32>().ok();
                let month = trimmed[4..6].parse::<u32>().ok();
                let day = trimmed[6..8].parse::<u32>().ok();
                match (year, month, day) {
                    (Some(y), Some(m), Some(d)) => match NaiveDate::from_ymd_opt(y, m, d) {
                        Some(date) => AttributeValue::Date(date),
                        None if options.nullify_invalid_dates => AttributeValue::Null,
                        None => AttributeValue::Character(trimmed.to_string()),
                    },
                    _ => AttributeValue::Null,
                }
            } else {
                AttributeValue::Null
            }
        }
        FieldType::Memo => {
            let block: i64 = trimmed.parse().unwrap_or(0);
            if block == 0 {
                AttributeValue::Null
            } else {
                let dbt = dbt
                    .as_mut()
                    .ok_or_else(|| Error::FileNotValidDbase("memo field without a DBT file".into()))?;
                AttributeValue::Memo(dbt.read_memo(block as u32)?)
            }
        }
    })
}

pub fn write_eof_marker<W: Write>(writer: &mut ByteOrderWriter<W>) -> Result<()> {
    writer.write_u8(EOF_MARKER)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn char_field(size: u8) -> Field {
        Field {
            name: "NAME".to_string(),
            field_type: FieldType::Character,
            size,
            decimals: 0,
        }
    }

    fn write_char(field: &Field, value: &str) -> Vec<u8> {
        let mut writer = ByteOrderWriter::new(Cursor::new(Vec::new()), Endianness::LittleEndian);
        let charset = Charset::default();
        let mut dbt: Option<DbtWriter<Cursor<Vec<u8>>>> = None;
        write_field_value(
            &mut writer,
            field,
            &charset,
            &AttributeValue::Character(value.to_string()),
            &mut dbt,
        )
        .unwrap();
        writer.into_inner().into_inner()
    }

    #[test]
    fn multibyte_value_narrower_than_field_does_not_panic() {
        // "é" is 2 UTF-8 bytes but a single Windows-1252 byte (0xE9); the old
        // `&str`-slicing pad panicked here because `s.len() == 2 >= width == 1`
        // sliced mid-codepoint.
        let field = char_field(1);
        let bytes = write_char(&field, "é");
        assert_eq!(bytes, vec![0xE9]);
    }

    #[test]
    fn multibyte_value_is_padded_after_encoding_to_exact_width() {
        let field = char_field(4);
        let bytes = write_char(&field, "ée");
        // Encoded is 2 bytes (0xE9, b'e'); padding happens on the encoded
        // bytes, not the 3-byte UTF-8 source string.
        assert_eq!(bytes, vec![0xE9, b'e', b' ', b' ']);
    }

    #[test]
    fn encoded_value_wider_than_field_truncates_on_a_byte_boundary() {
        let field = char_field(3);
        let bytes = write_char(&field, "abcdef");
        assert_eq!(bytes, b"abc".to_vec());
    }

    #[test]
    fn multibyte_value_round_trips_through_read_field_value() {
        let field = char_field(4);
        let bytes = write_char(&field, "ée");

        let mut reader = ByteOrderReader::new(Cursor::new(bytes), Endianness::LittleEndian).unwrap();
        let charset = Charset::default();
        let options = RecordCodecOptions::default();
        let mut dbt: Option<DbtReader<Cursor<Vec<u8>>>> = None;
        let value = read_field_value(&mut reader, &field, &charset, &options, &mut dbt).unwrap();
        assert_eq!(value, AttributeValue::Character("ée".to_string()));
    }
}
