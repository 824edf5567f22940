//! Random-access byte reader over an immutable buffer.
//!
//! Crate files are little-endian on disk regardless of host. All fixed-width
//! reads convert explicitly rather than relying on host memory layout.

use crate::error::{Error, Result};

/// Bounded, seekable reader over an in-memory byte buffer.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: u64,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn tell(&self) -> u64 {
        self.pos
    }

    pub fn seek_set(&mut self, offset: u64) -> Result<()> {
        if offset > self.size() {
            return Err(Error::InvalidOffset {
                offset: offset as i64,
                size: self.size(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    pub fn seek_from_current(&mut self, delta: i64) -> Result<()> {
        let target = self.pos as i64 + delta;
        if target < 0 || target as u64 > self.size() {
            return Err(Error::InvalidOffset {
                offset: target,
                size: self.size(),
            });
        }
        self.pos = target as u64;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.data.len() as u64 - self.pos;
        if (n as u64) > available {
            return Err(Error::EndOfStream {
                offset: self.pos,
                requested: n as u64,
                available,
            });
        }
        let start = self.pos as usize;
        let slice = &self.data[start..start + n];
        self.pos += n as u64;
        Ok(slice)
    }

    /// Read up to `n_max` bytes into `dst`, returning the number actually read.
    /// Mirrors the C1 contract: a short read is not an error, only a request
    /// past the end of the buffer with nothing available is.
    pub fn read(&mut self, n_requested: usize, n_max: usize, dst: &mut Vec<u8>) -> Result<usize> {
        let n = n_requested.min(n_max);
        let slice = self.take(n)?;
        dst.extend_from_slice(slice);
        Ok(slice.len())
    }

    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<()> {
        let slice = self.take(dst.len())?;
        dst.copy_from_slice(slice);
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Peek a u64 at the current position without advancing the cursor.
    /// Used by the Crate Decoder when a ValueRep needs to look ahead into a
    /// nested payload before committing to unpacking it.
    pub fn peek_u64(&mut self) -> Result<u64> {
        let saved = self.pos;
        let v = self.read_u64();
        self.pos = saved;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_fixed_width() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u32().unwrap(), 1);
        assert_eq!(r.read_u32().unwrap(), 2);
    }

    #[test]
    fn seek_out_of_bounds_fails() {
        let data = [0u8; 4];
        let mut r = ByteReader::new(&data);
        assert!(r.seek_set(5).is_err());
        assert!(r.seek_set(4).is_ok());
    }

    #[test]
    fn end_of_stream_on_short_read() {
        let data = [0u8; 2];
        let mut r = ByteReader::new(&data);
        assert!(r.read_u32().is_err());
    }

    #[test]
    fn peek_does_not_advance() {
        let data = 7u64.to_le_bytes();
        let mut r = ByteReader::new(&data);
        assert_eq!(r.peek_u64().unwrap(), 7);
        assert_eq!(r.tell(), 0);
        assert_eq!(r.read_u64().unwrap(), 7);
        assert_eq!(r.tell(), 8);
    }

    #[test]
    fn seek_from_current_bounds() {
        let data = [0u8; 10];
        let mut r = ByteReader::new(&data);
        r.seek_set(5).unwrap();
        r.seek_from_current(-5).unwrap();
        assert_eq!(r.tell(), 0);
        assert!(r.seek_from_current(-1).is_err());
    }
}
