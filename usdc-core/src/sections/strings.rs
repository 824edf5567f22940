//! STRINGS section: a raw (uncompressed) vector of token indices; each
//! string value is the token at that index.

use crate::error::{Error, Result};
use usdc_codec::ByteReader;
use usdc_value::Index;

pub fn read_strings(reader: &mut ByteReader<'_>, start: i64) -> Result<Vec<Index>> {
    reader.seek_set(start as u64).map_err(Error::from)?;
    let n = reader.read_u64().map_err(Error::from)? as usize;

    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(Index(reader.read_u32().map_err(Error::from)?));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_raw_index_array() {
        let mut bytes = (3u64).to_le_bytes().to_vec();
        bytes.extend_from_slice(&5u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        let mut r = ByteReader::new(&bytes);
        let indices = read_strings(&mut r, 0).unwrap();
        assert_eq!(indices, vec![Index(5), Index(0), Index(2)]);
    }
}
