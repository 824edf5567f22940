//! FIELDSETS section: one integer-compressed stream of `numFieldsets` u32
//! field indices, partitioned into individual FieldSets by the sentinel
//! `!0u32` index.

use crate::error::{Error, Result};
use usdc_codec::ByteReader;

/// The flat, sentinel-partitioned field-index array, plus the starting
/// offset of each partition (a FieldSet index is an offset into this
/// array).
#[derive(Debug, Clone, Default)]
pub struct FieldSets {
    pub indices: Vec<u32>,
}

impl FieldSets {
    /// Field indices belonging to the FieldSet starting at `start`, up to
    /// (not including) the terminating sentinel.
    pub fn partition_at(&self, start: usize) -> &[u32] {
        let rest = &self.indices[start..];
        let end = rest.iter().position(|&v| v == u32::MAX).unwrap_or(rest.len());
        &rest[..end]
    }
}

pub fn read_fieldsets(reader: &mut ByteReader<'_>, start: i64) -> Result<FieldSets> {
    reader.seek_set(start as u64).map_err(Error::from)?;
    let num_fieldsets = reader.read_u64().map_err(Error::from)? as usize;

    let len = reader.read_u64().map_err(Error::from)? as usize;
    let bytes = reader.read_bytes(len).map_err(Error::from)?;
    let indices = usdc_codec::intcomp::decompress_u32(&bytes, num_fieldsets).map_err(Error::from)?;

    Ok(FieldSets { indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_on_sentinel() {
        let fs = FieldSets {
            indices: vec![0, 1, u32::MAX, 2, u32::MAX],
        };
        assert_eq!(fs.partition_at(0), &[0, 1]);
        assert_eq!(fs.partition_at(3), &[2]);
    }
}
