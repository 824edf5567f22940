//! FIELDS section: `u64 numFields`, then two compressed streams of length
//! `numFields`: integer-compressed token indices, and an LZ4-compressed
//! `u64[numFields]` of raw `ValueRep` bit patterns.

use crate::error::{Error, Result};
use crate::valuerep::ValueRepBits;
use usdc_codec::ByteReader;
use usdc_value::Index;

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub token_index: Index,
    pub rep: ValueRepBits,
}

pub fn read_fields(reader: &mut ByteReader<'_>, start: i64) -> Result<Vec<Field>> {
    reader.seek_set(start as u64).map_err(Error::from)?;
    let num_fields = reader.read_u64().map_err(Error::from)? as usize;

    let indices_len = reader.read_u64().map_err(Error::from)? as usize;
    let indices_bytes = reader.read_bytes(indices_len).map_err(Error::from)?;
    let token_indices =
        usdc_codec::intcomp::decompress_u32(&indices_bytes, num_fields).map_err(Error::from)?;

    let reps_len = reader.read_u64().map_err(Error::from)? as usize;
    let reps_bytes = reader.read_bytes(reps_len).map_err(Error::from)?;
    let reps_raw = usdc_codec::lz4::decompress_block(&reps_bytes, num_fields * 8)
        .map_err(Error::from)?;

    let mut fields = Vec::with_capacity(num_fields);
    for i in 0..num_fields {
        let mut bits = [0u8; 8];
        bits.copy_from_slice(&reps_raw[i * 8..i * 8 + 8]);
        fields.push(Field {
            token_index: Index(token_indices[i]),
            rep: ValueRepBits(u64::from_le_bytes(bits)),
        });
    }

    Ok(fields)
}
