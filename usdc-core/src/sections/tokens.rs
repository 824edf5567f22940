//! TOKENS section: `u64 count; u64 uncompressedSize; u64 compressedSize;
//! lz4(bytes)` -> concatenation of `count` NUL-terminated strings.

use crate::error::{Error, Result};
use usdc_codec::ByteReader;
use usdc_value::TokenTable;

pub fn read_tokens(reader: &mut ByteReader<'_>, start: i64) -> Result<TokenTable> {
    reader.seek_set(start as u64).map_err(Error::from)?;

    let count = reader.read_u64().map_err(Error::from)?;
    let uncompressed_size = reader.read_u64().map_err(Error::from)?;
    let compressed_size = reader.read_u64().map_err(Error::from)?;

    let compressed = reader
        .read_bytes(compressed_size as usize)
        .map_err(Error::from)?;
    let raw = usdc_codec::lz4::decompress_block(&compressed, uncompressed_size as usize)
        .map_err(Error::from)?;

    let mut table = TokenTable::new();
    let mut rest = raw.as_slice();
    for _ in 0..count {
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::corrupt("tokens", start as u64, "unterminated token string"))?;
        let s = std::str::from_utf8(&rest[..end])
            .map_err(|e| Error::corrupt("tokens", start as u64, format!("non-utf8 token: {e}")))?;
        table.push(s);
        rest = &rest[end + 1..];
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(strings: &[&str]) -> Vec<u8> {
        let mut raw = Vec::new();
        for s in strings {
            raw.extend_from_slice(s.as_bytes());
            raw.push(0);
        }
        let compressed = lz4_flex::block::compress(&raw);
        let mut out = Vec::new();
        out.extend_from_slice(&(strings.len() as u64).to_le_bytes());
        out.extend_from_slice(&(raw.len() as u64).to_le_bytes());
        out.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        out.extend_from_slice(&compressed);
        out
    }

    #[test]
    fn reads_empty_string_table() {
        let bytes = encode(&[""]);
        let mut r = ByteReader::new(&bytes);
        let table = read_tokens(&mut r, 0).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(usdc_value::Index(0)).unwrap().as_str(), "");
    }

    #[test]
    fn reads_multiple_tokens_in_order() {
        let bytes = encode(&["foo", "bar", "baz"]);
        let mut r = ByteReader::new(&bytes);
        let table = read_tokens(&mut r, 0).unwrap();
        assert_eq!(table.get(usdc_value::Index(1)).unwrap().as_str(), "bar");
    }
}
