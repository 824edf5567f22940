//! LZ4 block decompression with an externally known uncompressed size.

use crate::error::{Error, Result};

/// Decompress a raw LZ4 block, failing if the decompressed length does not
/// match `uncompressed_size` exactly.
pub fn decompress_block(data: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    let out = lz4_flex::block::decompress(data, uncompressed_size)
        .map_err(|e| Error::Corrupt(format!("lz4 block decompression failed: {e}")))?;

    if out.len() != uncompressed_size {
        return Err(Error::Corrupt(format!(
            "lz4 decompressed length {} != expected {}",
            out.len(),
            uncompressed_size
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_compress() {
        let original = b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly";
        let compressed = lz4_flex::block::compress(original);
        let decompressed = decompress_block(&compressed, original.len()).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn wrong_expected_size_is_corrupt() {
        let original = b"some data to compress";
        let compressed = lz4_flex::block::compress(original);
        assert!(decompress_block(&compressed, original.len() + 5).is_err());
    }

    #[test]
    fn garbage_input_is_corrupt() {
        let garbage = [0xffu8; 16];
        assert!(decompress_block(&garbage, 1024).is_err());
    }
}
