//! Fixed 88-byte file header: magic, version, and the TOC offset.
//!
//! Laid out like the teacher's lightweight header probe
//! (`probe_block_cbor`/`block_era`): a handful of bytes are inspected before
//! committing to a full section parse, so callers get `UnsupportedVersion`
//! or `Corrupt` immediately rather than partway through the TOC.

use crate::error::{Error, Result};
use usdc_codec::ByteReader;

pub const MAGIC: &[u8; 8] = b"PXR-USDC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl Version {
    pub fn is_supported(self) -> bool {
        self.major == 0 && self.minor >= 4
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Bootstrap {
    pub version: Version,
    pub toc_offset: i64,
}

pub fn read_bootstrap(reader: &mut ByteReader<'_>) -> Result<Bootstrap> {
    reader.seek_set(0).map_err(Error::from)?;

    let mut magic = [0u8; 8];
    reader.read_into(&mut magic).map_err(Error::from)?;
    if &magic != MAGIC {
        return Err(Error::corrupt("bootstrap", 0, "magic mismatch"));
    }

    let mut version_bytes = [0u8; 8];
    reader.read_into(&mut version_bytes).map_err(Error::from)?;
    let version = Version {
        major: version_bytes[0],
        minor: version_bytes[1],
        patch: version_bytes[2],
    };
    if !version.is_supported() {
        return Err(Error::UnsupportedVersion {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
        });
    }

    let toc_offset = reader.read_i64().map_err(Error::from)?;
    let size = reader.size() as i64;
    if toc_offset <= 88 || toc_offset >= size {
        return Err(Error::corrupt(
            "bootstrap",
            16,
            format!("TOC offset {toc_offset} out of range (0, {size})"),
        ));
    }

    Ok(Bootstrap { version, toc_offset })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(major: u8, minor: u8, patch: u8, toc_offset: i64, size: usize) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[major, minor, patch, 0, 0, 0, 0, 0]);
        out.extend_from_slice(&toc_offset.to_le_bytes());
        out.resize(size, 0);
        out
    }

    #[test]
    fn accepts_supported_version() {
        let bytes = encode(0, 4, 0, 100, 200);
        let mut r = ByteReader::new(&bytes);
        let b = read_bootstrap(&mut r).unwrap();
        assert_eq!(b.toc_offset, 100);
    }

    #[test]
    fn rejects_old_version() {
        let bytes = encode(0, 3, 9, 100, 200);
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(
            read_bootstrap(&mut r),
            Err(Error::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode(0, 4, 0, 100, 200);
        bytes[0] = b'X';
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(read_bootstrap(&mut r), Err(Error::Corrupt { .. })));
    }

    #[test]
    fn rejects_toc_offset_out_of_range() {
        let bytes = encode(0, 4, 0, 88, 200);
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(read_bootstrap(&mut r), Err(Error::Corrupt { .. })));

        let bytes = encode(0, 4, 0, 200, 200);
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(read_bootstrap(&mut r), Err(Error::Corrupt { .. })));
    }
}
