//! Bounds-checked big-endian cursors over in-memory byte buffers.
//!
//! The whole wire format is big-endian; records nest, so readers track an
//! explicit position that envelope code can compare against a record's
//! declared end.

use crate::error::{CodecError, CodecResult};

/// Read cursor over a byte slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current position from the start of the buffer.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .ok_or_else(|| short_read(count, self.remaining()))?;
        if end > self.buf.len() {
            return Err(short_read(count, self.remaining()));
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64(&mut self) -> CodecResult<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    pub fn read_f32(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> CodecResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_bytes(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        self.take(count)
    }

    /// Consumes and returns everything between the cursor and `end`.
    ///
    /// # Errors
    /// `end` behind the cursor means an inner payload overran its declared
    /// length; `end` past the buffer means the record itself was truncated.
    pub fn take_until(&mut self, end: usize) -> CodecResult<&'a [u8]> {
        if end < self.pos {
            return Err(CodecError::Corruption(format!(
                "payload overran its declared end by {} bytes",
                self.pos - end
            )));
        }
        if end > self.buf.len() {
            return Err(short_read(end - self.pos, self.remaining()));
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// Append-only big-endian writer.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_f32(&mut self, value: f32) {
        self.put_u32(value.to_bits());
    }

    pub fn put_f64(&mut self, value: f64) {
        self.put_u64(value.to_bits());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cold]
#[inline(never)]
fn short_read(wanted: usize, available: usize) -> CodecError {
    CodecError::Corruption(format!(
        "short read: wanted {wanted} bytes, {available} available"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_big_endian_scalars() {
        let mut writer = ByteWriter::new();
        writer.put_u8(0xAB);
        writer.put_u16(0x1234);
        writer.put_u32(0xDEAD_BEEF);
        writer.put_f32(1.5);
        let bytes = writer.into_inner();
        assert_eq!(&bytes[1..3], &[0x12, 0x34]);

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn short_reads_fail_without_advancing_past_the_end() {
        let mut reader = ByteReader::new(&[0x01, 0x02]);
        let err = reader.read_u32().expect_err("short read must fail");
        assert!(matches!(err, CodecError::Corruption(_)));
        assert_eq!(reader.pos(), 0);
    }

    #[test]
    fn take_until_rejects_an_overrun_cursor() {
        let mut reader = ByteReader::new(&[0u8; 8]);
        reader.read_u32().unwrap();
        let err = reader.take_until(2).expect_err("cursor past end must fail");
        assert!(matches!(err, CodecError::Corruption(_)));
    }
}
