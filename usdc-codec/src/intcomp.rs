//! Delta + variable-byte integer (de)compression, 32- and 64-bit variants.
//!
//! Layout: a 2-bit-per-element code table (values 0..=3 selecting width class
//! 0, 1, 2, or full-width bytes), followed by the packed variable-width
//! deltas themselves. The first decoded element is the delta applied to a
//! zero accumulator (i.e. it is absolute); every later element adds its
//! delta to the running accumulator from the previous element.

use crate::error::{Error, Result};

const CODE_BITS: u32 = 2;
const CODES_PER_BYTE: usize = 8 / CODE_BITS as usize;

fn code_table_len(n: usize) -> usize {
    (n * CODE_BITS as usize).div_ceil(8)
}

fn code_at(codes: &[u8], i: usize) -> Result<u8> {
    let byte_idx = i / CODES_PER_BYTE;
    let shift = (i % CODES_PER_BYTE) * CODE_BITS as usize;
    let byte = *codes
        .get(byte_idx)
        .ok_or_else(|| Error::Corrupt("integer code table truncated".into()))?;
    Ok((byte >> shift) & 0b11)
}

/// Upper bound on scratch space an implementation needs to decode `n`
/// elements, proportional to `n` as required by the contract.
pub fn decompression_working_space_size(n: usize) -> usize {
    n * std::mem::size_of::<u64>()
}

macro_rules! impl_int_codec {
    ($name:ident, $ty:ty, $signed:ty, $full_width:expr) => {
        pub fn $name(data: &[u8], n: usize) -> Result<Vec<$ty>> {
            if n == 0 {
                return Ok(Vec::new());
            }

            let code_len = code_table_len(n);
            let codes = data
                .get(..code_len)
                .ok_or_else(|| Error::Corrupt("integer codes overrun input".into()))?;
            let mut cursor = code_len;

            let mut out = Vec::with_capacity(n);
            let mut acc: $ty = 0;

            for i in 0..n {
                let code = code_at(codes, i)?;
                let width = match code {
                    0 => 0,
                    1 => 1,
                    2 => 2,
                    _ => $full_width,
                };

                let end = cursor
                    .checked_add(width)
                    .ok_or_else(|| Error::Corrupt("integer delta offset overflow".into()))?;
                let bytes = data
                    .get(cursor..end)
                    .ok_or_else(|| Error::Corrupt("integer deltas overrun input".into()))?;
                cursor = end;

                let delta: $signed = match width {
                    0 => 0,
                    1 => bytes[0] as i8 as $signed,
                    2 => i16::from_le_bytes([bytes[0], bytes[1]]) as $signed,
                    _ => {
                        let mut buf = [0u8; $full_width];
                        buf.copy_from_slice(bytes);
                        <$signed>::from_le_bytes(buf)
                    }
                };

                acc = acc.wrapping_add(delta as $ty);
                out.push(acc);
            }

            Ok(out)
        }
    };
}

impl_int_codec!(decompress_u32, u32, i32, 4);
impl_int_codec!(decompress_u64, u64, i64, 8);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn compress_u32(values: &[u32]) -> Vec<u8> {
        let mut codes = vec![0u8; code_table_len(values.len())];
        let mut payload = Vec::new();
        let mut acc: u32 = 0;
        for (i, &v) in values.iter().enumerate() {
            let delta = v.wrapping_sub(acc) as i32;
            acc = v;
            let code: u8 = if delta == 0 {
                0
            } else if (i8::MIN as i32..=i8::MAX as i32).contains(&delta) {
                1
            } else if (i16::MIN as i32..=i16::MAX as i32).contains(&delta) {
                2
            } else {
                3
            };
            let byte_idx = i / CODES_PER_BYTE;
            let shift = (i % CODES_PER_BYTE) * CODE_BITS as usize;
            codes[byte_idx] |= code << shift;
            match code {
                0 => {}
                1 => payload.push(delta as i8 as u8),
                2 => payload.extend_from_slice(&(delta as i16).to_le_bytes()),
                _ => payload.extend_from_slice(&delta.to_le_bytes()),
            }
        }
        codes.extend(payload);
        codes
    }

    #[test]
    fn round_trips_simple_sequence() {
        let values = vec![3u32, 3, 3, 3, 10, 10, u32::MAX, 0];
        let packed = compress_u32(&values);
        let decoded = decompress_u32(&packed, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(decompress_u32(&[], 0).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn truncated_input_is_corrupt() {
        let packed = compress_u32(&[1, 1000000]);
        assert!(decompress_u32(&packed[..packed.len() - 1], 2).is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip(values in proptest::collection::vec(any::<u32>(), 0..64)) {
            let packed = compress_u32(&values);
            let decoded = decompress_u32(&packed, values.len()).unwrap();
            prop_assert_eq!(decoded, values);
        }
    }
}
