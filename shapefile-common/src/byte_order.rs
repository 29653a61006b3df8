//! Fixed-width primitive pack/unpack over a seekable byte stream, in an
//! explicitly chosen endianness. This is the one place in the workspace that
//! knows about byte order; everything above it reads and writes typed values.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::prelude::*;
use std::io::{Result, SeekFrom};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

impl Default for Endianness {
    fn default() -> Endianness {
        Endianness::LittleEndian
    }
}

/// A cursor over a `Read + Seek` stream that decodes primitives in a fixed
/// endianness, tracking its own byte position.
pub struct ByteOrderReader<R: Read + Seek> {
    is_le: bool,
    reader: R,
    pos: usize,
    len: usize,
}

impl<R: Read + Seek> ByteOrderReader<R> {
    pub fn new(mut reader: R, byte_order: Endianness) -> Result<ByteOrderReader<R>> {
        let is_le = byte_order == Endianness::LittleEndian;
        let len = reader.seek(SeekFrom::End(0))? as usize;
        reader.seek(SeekFrom::Start(0))?;
        Ok(ByteOrderReader {
            reader,
            is_le,
            pos: 0,
            len,
        })
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn byte_order(&self) -> Endianness {
        if self.is_le {
            Endianness::LittleEndian
        } else {
            Endianness::BigEndian
        }
    }

    pub fn seek(&mut self, position: usize) -> Result<()> {
        self.pos = position;
        self.reader.seek(SeekFrom::Start(self.pos as u64))?;
        Ok(())
    }

    pub fn inc_pos(&mut self, skip: usize) -> Result<()> {
        self.pos += skip;
        self.reader.seek(SeekFrom::Start(self.pos as u64))?;
        Ok(())
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn read_fixed_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; length];
        self.reader.read_exact(&mut bytes)?;
        self.pos += length;
        Ok(bytes)
    }

    /// Reads a fixed-length NUL-padded ASCII field, trimming trailing NULs.
    pub fn read_fixed_ascii(&mut self, length: usize) -> Result<String> {
        let bytes = self.read_fixed_bytes(length)?;
        let trimmed = bytes
            .into_iter()
            .take_while(|&b| b != 0)
            .collect::<Vec<u8>>();
        Ok(String::from_utf8_lossy(&trimmed).into_owned())
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.pos += buf.len();
        self.reader.read_exact(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.pos += 1;
        self.reader.read_u8()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.pos += 1;
        self.reader.read_i8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.pos += 2;
        if self.is_le {
            self.reader.read_u16::<LittleEndian>()
        } else {
            self.reader.read_u16::<BigEndian>()
        }
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.pos += 2;
        if self.is_le {
            self.reader.read_i16::<LittleEndian>()
        } else {
            self.reader.read_i16::<BigEndian>()
        }
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.pos += 4;
        if self.is_le {
            self.reader.read_i32::<LittleEndian>()
        } else {
            self.reader.read_i32::<BigEndian>()
        }
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.pos += 4;
        if self.is_le {
            self.reader.read_u32::<LittleEndian>()
        } else {
            self.reader.read_u32::<BigEndian>()
        }
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.pos += 8;
        if self.is_le {
            self.reader.read_f64::<LittleEndian>()
        } else {
            self.reader.read_f64::<BigEndian>()
        }
    }
}

/// The writer-side counterpart of [`ByteOrderReader`]; accumulates into any
/// `Write` in a fixed endianness.
pub struct ByteOrderWriter<W: Write> {
    is_le: bool,
    writer: W,
    num_bytes_written: usize,
}

impl<W: Write> ByteOrderWriter<W> {
    pub fn new(writer: W, byte_order: Endianness) -> ByteOrderWriter<W> {
        ByteOrderWriter {
            writer,
            is_le: byte_order == Endianness::LittleEndian,
            num_bytes_written: 0,
        }
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn num_bytes_written(&self) -> usize {
        self.num_bytes_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.num_bytes_written += bytes.len();
        Ok(())
    }

    /// Writes `text` left-to-right, NUL-padded (or truncated) to exactly
    /// `length` bytes.
    pub fn write_fixed_ascii(&mut self, text: &str, length: usize) -> Result<()> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.truncate(length);
        bytes.resize(length, 0u8);
        self.write_bytes(&bytes)
    }

    pub fn write_u8(&mut self, val: u8) -> Result<()> {
        self.writer.write_u8(val)?;
        self.num_bytes_written += 1;
        Ok(())
    }

    pub fn write_i8(&mut self, val: i8) -> Result<()> {
        self.writer.write_i8(val)?;
        self.num_bytes_written += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, val: u16) -> Result<()> {
        if self.is_le {
            self.writer.write_u16::<LittleEndian>(val)?;
        } else {
            self.writer.write_u16::<BigEndian>(val)?;
        }
        self.num_bytes_written += 2;
        Ok(())
    }

    pub fn write_i16(&mut self, val: i16) -> Result<()> {
        if self.is_le {
            self.writer.write_i16::<LittleEndian>(val)?;
        } else {
            self.writer.write_i16::<BigEndian>(val)?;
        }
        self.num_bytes_written += 2;
        Ok(())
    }

    pub fn write_i32(&mut self, val: i32) -> Result<()> {
        if self.is_le {
            self.writer.write_i32::<LittleEndian>(val)?;
        } else {
            self.writer.write_i32::<BigEndian>(val)?;
        }
        self.num_bytes_written += 4;
        Ok(())
    }

    pub fn write_u32(&mut self, val: u32) -> Result<()> {
        if self.is_le {
            self.writer.write_u32::<LittleEndian>(val)?;
        } else {
            self.writer.write_u32::<BigEndian>(val)?;
        }
        self.num_bytes_written += 4;
        Ok(())
    }

    pub fn write_f64(&mut self, val: f64) -> Result<()> {
        if self.is_le {
            self.writer.write_f64::<LittleEndian>(val)?;
        } else {
            self.writer.write_f64::<BigEndian>(val)?;
        }
        self.num_bytes_written += 8;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}
