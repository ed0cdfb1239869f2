//! Low-level primitives for the chunk-framed wire format.
//!
//! All multi-byte integers and floats are big-endian. Strings are encoded
//! as an `i32` byte length followed by that many ASCII bytes. Chunks are
//! framed as `chunk id (i32), byte length (i32), payload` and located by
//! scanning forward from just past the file identifier.

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{BinaryError, BinaryResult};
use crate::image::FILE_IDENTIFIER;

/// Sequential big-endian reader with chunk seeking.
pub(crate) struct ChunkReader<R> {
    inner: R,
}

impl<R: Read + Seek> ChunkReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Verifies the fixed file identifier at the start of the stream.
    ///
    /// A short or mismatching header is an [`BinaryError::InvalidFileIdentifier`];
    /// truncation is not distinguished from corruption.
    pub(crate) fn check_file_identifier(&mut self) -> BinaryResult<()> {
        let mut found = Vec::with_capacity(FILE_IDENTIFIER.len());
        self.inner
            .by_ref()
            .take(FILE_IDENTIFIER.len() as u64)
            .read_to_end(&mut found)?;
        if found != FILE_IDENTIFIER {
            return Err(BinaryError::InvalidFileIdentifier { found });
        }
        Ok(())
    }

    pub(crate) fn read_i32(&mut self) -> BinaryResult<i32> {
        Ok(self.inner.read_i32::<BigEndian>()?)
    }

    pub(crate) fn read_f32(&mut self) -> BinaryResult<f32> {
        Ok(self.inner.read_f32::<BigEndian>()?)
    }

    /// Reads an `i32` flag; any non-zero value is true.
    pub(crate) fn read_bool(&mut self) -> BinaryResult<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Reads a length-prefixed ASCII string.
    pub(crate) fn read_string(&mut self) -> BinaryResult<String> {
        let len = self.read_i32()?;
        if len < 0 {
            return Err(BinaryError::MalformedCount {
                entity: "string field".to_string(),
                field: "length",
                value: len as i64,
                expected: "a non-negative length",
            });
        }
        let mut bytes = vec![0u8; len as usize];
        self.inner.read_exact(&mut bytes)?;
        if let Some(&byte) = bytes.iter().find(|b| !b.is_ascii()) {
            return Err(BinaryError::NonAsciiString { byte });
        }
        // Safe: all bytes are ASCII.
        Ok(String::from_utf8(bytes).expect("ASCII bytes are valid UTF-8"))
    }

    /// Seeks to the payload of the chunk with the given id and returns its
    /// declared byte length.
    ///
    /// Scans the chunk table from just past the file identifier; reaching
    /// end of stream without a match is [`BinaryError::ChunkNotFound`].
    pub(crate) fn seek_to_chunk(&mut self, chunk_id: i32) -> BinaryResult<i32> {
        self.inner
            .seek(SeekFrom::Start(FILE_IDENTIFIER.len() as u64))?;
        loop {
            let id = match self.inner.read_i32::<BigEndian>() {
                Ok(id) => id,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(BinaryError::ChunkNotFound { chunk_id });
                }
                Err(e) => return Err(e.into()),
            };
            let size = self.read_i32()?;
            if size < 0 {
                return Err(BinaryError::MalformedCount {
                    entity: format!("chunk 0x{:08X}", id),
                    field: "chunk size",
                    value: size as i64,
                    expected: "a non-negative byte length",
                });
            }
            if id == chunk_id {
                return Ok(size);
            }
            self.inner.seek(SeekFrom::Current(size as i64))?;
        }
    }
}

/// Writes an `i32` flag (1 or 0).
pub(crate) fn write_bool<W: Write>(writer: &mut W, value: bool) -> BinaryResult<()> {
    writer.write_i32::<BigEndian>(value as i32)?;
    Ok(())
}

/// Writes a length-prefixed ASCII string.
pub(crate) fn write_string<W: Write>(writer: &mut W, value: &str) -> BinaryResult<()> {
    if let Some(byte) = value.bytes().find(|b| !b.is_ascii()) {
        return Err(BinaryError::NonAsciiString { byte });
    }
    writer.write_i32::<BigEndian>(value.len() as i32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Frames a serialized payload as `chunk id, byte length, payload`.
pub(crate) fn write_chunk<W: Write>(
    writer: &mut W,
    chunk_id: i32,
    payload: &[u8],
) -> BinaryResult<()> {
    writer.write_i32::<BigEndian>(chunk_id)?;
    writer.write_i32::<BigEndian>(payload.len() as i32)?;
    writer.write_all(payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn string_round_trips() {
        let mut buf = Vec::new();
        write_string(&mut buf, "music/ambience/wind").unwrap();
        let mut reader = ChunkReader::new(Cursor::new(buf));
        assert_eq!(reader.read_string().unwrap(), "music/ambience/wind");
    }

    #[test]
    fn non_ascii_string_is_rejected_on_write() {
        let mut buf = Vec::new();
        let err = write_string(&mut buf, "göteborg").unwrap_err();
        assert!(matches!(err, BinaryError::NonAsciiString { .. }));
    }

    #[test]
    fn seek_skips_unrelated_chunks() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&FILE_IDENTIFIER);
        write_chunk(&mut buf, 0x1111, &[0xAA; 10]).unwrap();
        write_chunk(&mut buf, 0x2222, &[1, 2, 3]).unwrap();

        let mut reader = ChunkReader::new(Cursor::new(buf));
        let size = reader.seek_to_chunk(0x2222).unwrap();
        assert_eq!(size, 3);
        let mut payload = [0u8; 3];
        reader.inner.read_exact(&mut payload).unwrap();
        assert_eq!(payload, [1, 2, 3]);
    }

    #[test]
    fn missing_chunk_is_reported() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&FILE_IDENTIFIER);
        write_chunk(&mut buf, 0x1111, &[]).unwrap();

        let mut reader = ChunkReader::new(Cursor::new(buf));
        let err = reader.seek_to_chunk(0x3333).unwrap_err();
        assert!(matches!(
            err,
            BinaryError::ChunkNotFound { chunk_id: 0x3333 }
        ));
    }
}
