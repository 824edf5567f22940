//! Table of Contents: a flat list of named byte ranges, six of which are
//! required. Unknown section names are kept, not discarded, so
//! [`crate::decoder::Decoder::warnings`] can name them (per the "unknown TOC
//! section names" warning) rather than silently dropping the bytes.

use crate::error::{Error, Result};
use usdc_codec::ByteReader;

pub const REQUIRED_SECTIONS: &[&str] = &["TOKENS", "STRINGS", "FIELDS", "FIELDSETS", "SPECS", "PATHS"];

#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub start: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TableOfContents {
    pub sections: Vec<Section>,
    pub unknown_sections: Vec<String>,
}

impl TableOfContents {
    pub fn find(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

fn section_name(raw: &[u8; 16]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(16);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

pub fn read_toc(reader: &mut ByteReader<'_>, toc_offset: i64) -> Result<TableOfContents> {
    reader.seek_set(toc_offset as u64).map_err(Error::from)?;
    let num_sections = reader.read_u64().map_err(Error::from)?;

    let mut toc = TableOfContents::default();
    for _ in 0..num_sections {
        let mut name_bytes = [0u8; 16];
        reader.read_into(&mut name_bytes).map_err(Error::from)?;
        let start = reader.read_i64().map_err(Error::from)?;
        let size = reader.read_i64().map_err(Error::from)?;
        let name = section_name(&name_bytes);

        if !REQUIRED_SECTIONS.contains(&name.as_str()) {
            toc.unknown_sections.push(name.clone());
        }
        toc.sections.push(Section { name, start, size });
    }

    for required in REQUIRED_SECTIONS {
        if toc.find(required).is_none() {
            return Err(Error::corrupt(
                "toc",
                toc_offset as u64,
                format!("missing required section {required}"),
            ));
        }
    }

    Ok(toc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name16(s: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        buf
    }

    fn encode_toc(sections: &[(&str, i64, i64)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(sections.len() as u64).to_le_bytes());
        for (name, start, size) in sections {
            out.extend_from_slice(&name16(name));
            out.extend_from_slice(&start.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
        }
        out
    }

    #[test]
    fn reads_required_sections() {
        let bytes = encode_toc(&[
            ("TOKENS", 0, 0),
            ("STRINGS", 0, 0),
            ("FIELDS", 0, 0),
            ("FIELDSETS", 0, 0),
            ("SPECS", 0, 0),
            ("PATHS", 0, 0),
        ]);
        let mut r = ByteReader::new(&bytes);
        let toc = read_toc(&mut r, 0).unwrap();
        assert!(toc.find("TOKENS").is_some());
        assert!(toc.unknown_sections.is_empty());
    }

    #[test]
    fn missing_required_section_is_corrupt() {
        let bytes = encode_toc(&[("TOKENS", 0, 0)]);
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(read_toc(&mut r, 0), Err(Error::Corrupt { .. })));
    }

    #[test]
    fn unknown_sections_are_recorded_not_dropped() {
        let bytes = encode_toc(&[
            ("TOKENS", 0, 0),
            ("STRINGS", 0, 0),
            ("FIELDS", 0, 0),
            ("FIELDSETS", 0, 0),
            ("SPECS", 0, 0),
            ("PATHS", 0, 0),
            ("LAYERSTACK", 0, 0),
        ]);
        let mut r = ByteReader::new(&bytes);
        let toc = read_toc(&mut r, 0).unwrap();
        assert_eq!(toc.unknown_sections, vec!["LAYERSTACK".to_string()]);
    }
}
