//! Block-structured memo (DBT) allocator and reader (§4.7).

use std::io::{Read, Seek, SeekFrom, Write};

use shapefile_common::{ByteOrderReader, ByteOrderWriter, Endianness};

use crate::error::{Error, Result};

pub const BLOCK_SIZE: usize = 512;

/// A DBT writer: a monotonically increasing "next available block"
/// allocator over a block-structured file. The header block (block 0) is
/// written lazily on [`DbtWriter::finish`], once the final block count is
/// known.
pub struct DbtWriter<W: Write + Seek> {
    writer: ByteOrderWriter<W>,
    next_block: u32,
}

impl<W: Write + Seek> DbtWriter<W> {
    pub fn new(stream: W, start_block: u32) -> DbtWriter<W> {
        let next_block = start_block.max(1);
        DbtWriter {
            writer: ByteOrderWriter::new(stream, Endianness::LittleEndian),
            next_block,
        }
    }

    /// Appends `text` as a new memo, terminated by two `0x1A` bytes and
    /// padded with NULs to a block boundary. Returns the block number the
    /// value is stored at.
    pub fn write_memo(&mut self, text: &str) -> Result<u32> {
        let start_block = self.next_block;
        self.writer
            .get_mut()
            .seek(SeekFrom::Start(start_block as u64 * BLOCK_SIZE as u64))?;

        let mut payload = text.as_bytes().to_vec();
        // If only one byte remains before the block boundary, the two
        // terminator bytes can't both land in it; pad with a space first
        // so they start together at the next block.
        if (BLOCK_SIZE - payload.len() % BLOCK_SIZE) == 1 {
            payload.push(b' ');
        }
        payload.push(0x1A);
        payload.push(0x1A);
        let used_in_last_block = payload.len() % BLOCK_SIZE;
        if used_in_last_block != 0 {
            payload.resize(payload.len() + (BLOCK_SIZE - used_in_last_block), 0u8);
        }
        self.writer.write_bytes(&payload)?;

        let blocks_used = (payload.len() / BLOCK_SIZE) as u32;
        self.next_block = start_block + blocks_used;
        Ok(start_block)
    }

    pub fn next_available_block(&self) -> u32 {
        self.next_block
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Error::from)
    }

    /// Writes the block-0 header (next available block + version byte)
    /// and flushes.
    pub fn finish(mut self) -> Result<W> {
        self.writer.get_mut().seek(SeekFrom::Start(0))?;
        self.writer.write_u32(self.next_block)?;
        self.writer.write_bytes(&[0u8; 12])?;
        self.writer.write_u8(0x03)?;
        self.writer.write_bytes(&[0u8; BLOCK_SIZE - 17])?;
        self.writer.flush()?;
        Ok(self.writer.into_inner())
    }
}

/// Reads memo text back out given a starting block number.
pub struct DbtReader<R: Read + Seek> {
    reader: ByteOrderReader<R>,
}

impl<R: Read + Seek> DbtReader<R> {
    pub fn open(stream: R) -> Result<DbtReader<R>> {
        Ok(DbtReader {
            reader: ByteOrderReader::new(stream, Endianness::LittleEndian)?,
        })
    }

    pub fn next_available_block(&mut self) -> Result<u32> {
        self.reader.seek(0)?;
        self.reader.read_u32().map_err(Error::from)
    }

    /// Follows the block pointer, accumulating blocks until two
    /// consecutive `0x1A` terminators are found (tolerating a single
    /// terminator byte at end of file).
    pub fn read_memo(&mut self, start_block: u32) -> Result<String> {
        self.reader.seek(start_block as usize * BLOCK_SIZE)?;
        let mut bytes = Vec::new();
        loop {
            if self.reader.pos() >= self.reader.len() {
                if bytes.is_empty() {
                    return Err(Error::DbtEofReached);
                }
                // Ran off the end of the file without a double terminator;
                // tolerate a single trailing 0x1A, per §4.7's reader note.
                if bytes.last() == Some(&0x1A) {
                    bytes.pop();
                }
                break;
            }
            let chunk = self.reader.read_fixed_bytes(
                BLOCK_SIZE.min(self.reader.len() - self.reader.pos()),
            )?;
            bytes.extend_from_slice(&chunk);
            if let Some(pos) = find_terminator(&bytes) {
                bytes.truncate(pos);
                break;
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn find_terminator(bytes: &[u8]) -> Option<usize> {
    bytes.windows(2).position(|w| w == [0x1A, 0x1A])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn writes_and_reads_memo_round_trip() {
        let buf = Cursor::new(vec![0u8; BLOCK_SIZE]);
        let mut writer = DbtWriter::new(buf, 1);
        let block = writer.write_memo("hello memo field").unwrap();
        assert_eq!(block, 1);
        let stream = writer.finish().unwrap();

        let mut reader = DbtReader::open(stream).unwrap();
        assert_eq!(reader.read_memo(block).unwrap(), "hello memo field");
    }

    #[test]
    fn pads_when_one_byte_remains_before_boundary() {
        // Leaves exactly one byte before the block boundary for the
        // terminator to land in; must be padded with a space rather than
        // splitting the 0x1A pair across the boundary.
        let text = "a".repeat(BLOCK_SIZE - 1);
        let buf = Cursor::new(vec![0u8; BLOCK_SIZE]);
        let mut writer = DbtWriter::new(buf, 1);
        let block = writer.write_memo(&text).unwrap();
        let stream = writer.finish().unwrap();

        let mut reader = DbtReader::open(stream).unwrap();
        assert_eq!(reader.read_memo(block).unwrap(), text);
    }
}
