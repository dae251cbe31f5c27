//! Bounds-checked sequential reader used by the `.SKIN` record decoders.

use winnow::Parser;
use winnow::binary::{le_f32, le_u8, le_u16, le_u32};
use winnow::error::{ContextError, ErrMode};
use winnow::token::take;

use crate::error::{DecodeError, DecodeResult};

/// Sequential little-endian reader over an in-memory byte buffer.
///
/// Every read either fully succeeds and advances the position, or fails with
/// [`DecodeError::TruncatedInput`]. After a failure the position is not
/// meaningful; callers abort the whole decode on the first error.
pub struct ByteCursor<'a> {
    rest: &'a [u8],
    len: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor {
            rest: data,
            len: data.len(),
        }
    }

    /// Current byte offset from the start of the buffer.
    pub fn pos(&self) -> usize {
        self.len - self.rest.len()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    fn prim<T>(
        &mut self,
        need: usize,
        mut parser: impl Parser<&'a [u8], T, ErrMode<ContextError>>,
    ) -> DecodeResult<T> {
        let offset = self.pos();
        let have = self.rest.len();
        parser
            .parse_next(&mut self.rest)
            .map_err(|_| DecodeError::TruncatedInput { offset, need, have })
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        self.prim(1, le_u8)
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.prim(2, le_u16)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.prim(4, le_u32)
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        self.prim(4, le_f32)
    }

    pub fn read_vec2(&mut self) -> DecodeResult<[f32; 2]> {
        Ok([self.read_f32()?, self.read_f32()?])
    }

    pub fn read_vec3(&mut self) -> DecodeResult<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Take `n` raw bytes.
    pub fn take_bytes(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        self.prim(n, take(n))
    }

    /// Read a u32 length-prefixed string, decoding the bytes as permissive
    /// UTF-8. The declared length is validated against the remaining buffer
    /// by `take_bytes` before anything is materialized, so a corrupt length
    /// degrades to a clean truncation error instead of a huge allocation.
    pub fn read_string(&mut self) -> DecodeResult<String> {
        let n = self.read_u32()? as usize;
        let bytes = self.take_bytes(n)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Check that an array of `count` elements of `width` bytes each fits in
    /// the remaining buffer. Called before allocating storage sized by an
    /// untrusted count.
    pub fn ensure_array(&self, count: usize, width: usize) -> DecodeResult<()> {
        let need = count.checked_mul(width).unwrap_or(usize::MAX);
        if need > self.rest.len() {
            return Err(DecodeError::TruncatedInput {
                offset: self.pos(),
                need,
                have: self.rest.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_advance() {
        let data = [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x00, 0x00, 0x80, 0x3F];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u32().unwrap(), 0x05040302);
        assert_eq!(cursor.read_f32().unwrap(), 1.0);
        assert_eq!(cursor.pos(), 9);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_read_u16_little_endian() {
        let mut cursor = ByteCursor::new(&[0x34, 0x12]);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_truncated_primitive() {
        let mut cursor = ByteCursor::new(&[0xAA, 0xBB]);
        cursor.read_u8().unwrap();
        assert_eq!(
            cursor.read_u32(),
            Err(DecodeError::TruncatedInput {
                offset: 1,
                need: 4,
                have: 1,
            })
        );
    }

    #[test]
    fn test_string_round_trip() {
        let mut data = vec![3, 0, 0, 0];
        data.extend_from_slice(b"Tri");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "Tri");
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_empty_string_is_valid() {
        let mut cursor = ByteCursor::new(&[0, 0, 0, 0]);
        assert_eq!(cursor.read_string().unwrap(), "");
    }

    #[test]
    fn test_string_length_past_end() {
        // Declared length 5, only 2 bytes of payload follow.
        let mut data = vec![5, 0, 0, 0];
        data.extend_from_slice(b"ab");
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(
            cursor.read_string(),
            Err(DecodeError::TruncatedInput {
                offset: 4,
                need: 5,
                have: 2,
            })
        );
    }

    #[test]
    fn test_string_invalid_utf8_is_lossy() {
        let mut data = vec![2, 0, 0, 0];
        data.extend_from_slice(&[0xFF, 0xFE]);
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_string().unwrap(), "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_ensure_array_overflow() {
        let cursor = ByteCursor::new(&[0u8; 16]);
        assert!(cursor.ensure_array(4, 4).is_ok());
        assert!(cursor.ensure_array(5, 4).is_err());
        // count * width overflowing usize must fail, not wrap around.
        assert!(cursor.ensure_array(usize::MAX, 12).is_err());
    }

    #[test]
    fn test_read_vec3() {
        let mut data = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_vec3().unwrap(), [1.0, 2.0, 3.0]);
    }
}
