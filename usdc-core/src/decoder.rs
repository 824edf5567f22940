//! The Crate decoder: bootstrap -> TOC -> six sections -> live fieldsets.
//! Mirrors tinyusdz's `CrateReader` (`crate-reader.cc`), down to the
//! `_path_index_to_spec_index_map` optimization carried here as
//! [`Decoder::path_to_spec`].

use std::collections::HashMap;

use crate::bootstrap::{self, Bootstrap};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sections::fields::Field;
use crate::sections::fieldsets::FieldSets;
use crate::sections::paths::PathTree;
use crate::sections::specs::Spec;
use crate::sections::{fields, fieldsets, paths, specs, strings, tokens};
use crate::toc::{self, TableOfContents};
use crate::valuerep::{self, UnpackContext};
use usdc_codec::ByteReader;
use usdc_value::{Index, Token, TokenTable, Value};

/// One `(name, Value)` pair attached to a Spec, in on-disk order.
pub type LiveFieldSet = Vec<(Token, Value)>;

pub struct Decoder<'a> {
    bytes: &'a [u8],
    config: Config,
    pub bootstrap: Bootstrap,
    pub toc: TableOfContents,
    pub tokens: TokenTable,
    pub string_indices: Vec<Index>,
    pub fields: Vec<Field>,
    pub fieldsets: FieldSets,
    pub specs: Vec<Spec>,
    pub paths: PathTree,
    /// `pathIndex -> specs[]` offset, built in one pass over `specs`
    /// (tinyusdz's `_path_index_to_spec_index_map`) so the builder walk
    /// never re-scans the Spec table per node.
    pub path_to_spec: HashMap<Index, usize>,
    /// Keyed by the FieldSet's starting offset into `fieldsets.indices`
    /// (`Spec::fieldset_index` is that same offset, not a partition
    /// ordinal), since fieldsets are variable-length and not every offset
    /// begins one.
    live_fieldsets: HashMap<u32, LiveFieldSet>,
    warnings: Vec<String>,
}

impl<'a> Decoder<'a> {
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn open(bytes: &'a [u8], config: Config) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let bootstrap = bootstrap::read_bootstrap(&mut reader)?;
        tracing::debug!(?bootstrap.version, toc_offset = bootstrap.toc_offset, "bootstrap read");
        let toc = toc::read_toc(&mut reader, bootstrap.toc_offset)?;

        let warnings: Vec<String> = toc
            .unknown_sections
            .iter()
            .map(|name| {
                tracing::warn!(section = %name, "unknown TOC section");
                format!("unknown TOC section: {name}")
            })
            .collect();

        let section_start = |name: &str| -> Result<i64> {
            Ok(toc
                .find(name)
                .ok_or_else(|| Error::corrupt("toc", 0, format!("missing required section {name}")))?
                .start)
        };

        let tokens = tokens::read_tokens(&mut reader, section_start("TOKENS")?)?;
        let string_indices = strings::read_strings(&mut reader, section_start("STRINGS")?)?;
        let fields = fields::read_fields(&mut reader, section_start("FIELDS")?)?;
        let fieldsets = fieldsets::read_fieldsets(&mut reader, section_start("FIELDSETS")?)?;
        let specs = specs::read_specs(&mut reader, section_start("SPECS")?)?;
        let paths = paths::read_paths(&mut reader, section_start("PATHS")?, &tokens)?;

        let mut path_to_spec = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            path_to_spec.insert(spec.path_index, i);
        }

        let ctx = UnpackContext {
            tokens: &tokens,
            string_indices: &string_indices,
            paths: Some(&paths),
            config: &config,
        };

        let mut live_fieldsets = HashMap::new();
        let mut start = 0usize;
        while start < fieldsets.indices.len() {
            let partition = fieldsets.partition_at(start);
            if partition.len() as u64 > config.max_field_value_pairs_per_spec {
                return Err(Error::LimitExceeded(format!(
                    "fieldset has {} fields, exceeding limit {}",
                    partition.len(),
                    config.max_field_value_pairs_per_spec
                )));
            }
            let mut live = Vec::with_capacity(partition.len());
            for &field_index in partition {
                let field = fields.get(field_index as usize).ok_or_else(|| {
                    Error::corrupt("fieldsets", field_index as u64, "field index out of range")
                })?;
                let name = tokens
                    .get(field.token_index)
                    .ok_or_else(|| Error::corrupt("fields", field_index as u64, "field token index out of range"))?;
                let value = valuerep::unpack(field.rep, &mut reader, &ctx)?;
                live.push((name, value));
            }
            live_fieldsets.insert(start as u32, live);
            start += partition.len() + 1;
        }

        Ok(Decoder {
            bytes,
            config,
            bootstrap,
            toc,
            tokens,
            string_indices,
            fields,
            fieldsets,
            specs,
            paths,
            path_to_spec,
            live_fieldsets,
            warnings,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn push_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "decoder warning");
        self.warnings.push(message);
    }

    pub fn live_fieldset(&self, fieldset_index: u32) -> Option<&LiveFieldSet> {
        self.live_fieldsets.get(&fieldset_index)
    }

    pub fn spec_for_path(&self, path_index: Index) -> Option<&Spec> {
        self.path_to_spec.get(&path_index).map(|&i| &self.specs[i])
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal hand-rolled encoders mirroring the write side tinyusdz never
    //! needed to expose (this format is read-only here): just enough to
    //! build byte-exact fixtures for decoder/builder tests.

    const CODE_BITS: u32 = 2;
    const CODES_PER_BYTE: usize = 8 / CODE_BITS as usize;

    pub fn compress_u32(values: &[u32]) -> Vec<u8> {
        let code_len = (values.len() * CODE_BITS as usize).div_ceil(8);
        let mut codes = vec![0u8; code_len];
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

    pub fn compressed_stream(values: &[u32]) -> Vec<u8> {
        let bytes = compress_u32(values);
        let mut out = (bytes.len() as u64).to_le_bytes().to_vec();
        out.extend_from_slice(&bytes);
        out
    }

    pub fn lz4_block(raw: &[u8]) -> Vec<u8> {
        lz4_flex::block::compress(raw)
    }

    pub fn token_table_section(strings: &[&str]) -> Vec<u8> {
        let mut raw = Vec::new();
        for s in strings {
            raw.extend_from_slice(s.as_bytes());
            raw.push(0);
        }
        let compressed = lz4_block(&raw);
        let mut out = Vec::new();
        out.extend_from_slice(&(strings.len() as u64).to_le_bytes());
        out.extend_from_slice(&(raw.len() as u64).to_le_bytes());
        out.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        out.extend_from_slice(&compressed);
        out
    }

    pub fn fields_section(token_indices: &[u32], reps: &[u64]) -> Vec<u8> {
        let mut out = (token_indices.len() as u64).to_le_bytes().to_vec();
        out.extend_from_slice(&compressed_stream(token_indices));
        let mut raw_reps = Vec::new();
        for r in reps {
            raw_reps.extend_from_slice(&r.to_le_bytes());
        }
        let compressed = lz4_block(&raw_reps);
        out.extend_from_slice(&(compressed.len() as u64).to_le_bytes());
        out.extend_from_slice(&compressed);
        out
    }

    pub fn fieldsets_section(indices: &[u32]) -> Vec<u8> {
        let mut out = (indices.len() as u64).to_le_bytes().to_vec();
        out.extend_from_slice(&compressed_stream(indices));
        out
    }

    pub fn specs_section(path_indices: &[u32], fieldset_indices: &[u32], spec_types: &[u32]) -> Vec<u8> {
        let mut out = (path_indices.len() as u64).to_le_bytes().to_vec();
        out.extend_from_slice(&compressed_stream(path_indices));
        out.extend_from_slice(&compressed_stream(fieldset_indices));
        out.extend_from_slice(&compressed_stream(spec_types));
        out
    }

    pub fn paths_section(path_indexes: &[u32], element_token_indexes: &[i32], jumps: &[i32]) -> Vec<u8> {
        let mut out = (path_indexes.len() as u64).to_le_bytes().to_vec();
        out.extend_from_slice(&compressed_stream(path_indexes));
        out.extend_from_slice(&compressed_stream(
            &element_token_indexes.iter().map(|&v| v as u32).collect::<Vec<_>>(),
        ));
        out.extend_from_slice(&compressed_stream(&jumps.iter().map(|&v| v as u32).collect::<Vec<_>>()));
        out
    }

    pub fn inline_value_rep(type_code: u8, payload: u32) -> u64 {
        const IS_INLINED_BIT: u64 = 1 << 62;
        (IS_INLINED_BIT) | ((type_code as u64) << 48) | (payload as u64)
    }

    fn name16(s: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[..s.len()].copy_from_slice(s.as_bytes());
        buf
    }

    /// Assembles a full bootstrap+TOC+sections file from pre-encoded
    /// section bodies, laying sections out one after another starting at
    /// byte 96 (first 8-byte-aligned offset past the fixed header).
    pub struct FileBuilder {
        sections: Vec<(&'static str, Vec<u8>)>,
    }

    impl FileBuilder {
        pub fn new() -> Self {
            Self { sections: Vec::new() }
        }

        pub fn section(mut self, name: &'static str, body: Vec<u8>) -> Self {
            self.sections.push((name, body));
            self
        }

        pub fn build(self) -> Vec<u8> {
            let mut body = Vec::new();
            let mut toc_entries = Vec::new();
            let header_len = 88u64;
            let mut offset = header_len;
            for (name, bytes) in &self.sections {
                toc_entries.push((*name, offset as i64, bytes.len() as i64));
                body.extend_from_slice(bytes);
                offset += bytes.len() as u64;
            }
            let toc_offset = offset;

            let mut out = Vec::new();
            out.extend_from_slice(super::bootstrap::MAGIC);
            out.extend_from_slice(&[0, 4, 0, 0, 0, 0, 0, 0]);
            out.extend_from_slice(&(toc_offset as i64).to_le_bytes());
            out.resize(header_len as usize, 0);
            out.extend_from_slice(&body);

            out.extend_from_slice(&(toc_entries.len() as u64).to_le_bytes());
            for (name, start, size) in &toc_entries {
                out.extend_from_slice(&name16(name));
                out.extend_from_slice(&start.to_le_bytes());
                out.extend_from_slice(&size.to_le_bytes());
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn opens_minimal_file_with_empty_root() {
        let bytes = FileBuilder::new()
            .section("TOKENS", token_table_section(&[]))
            .section("STRINGS", 0u64.to_le_bytes().to_vec())
            .section("FIELDS", fields_section(&[], &[]))
            .section("FIELDSETS", fieldsets_section(&[]))
            .section("SPECS", specs_section(&[], &[], &[]))
            .section("PATHS", paths_section(&[0], &[0], &[-2]))
            .build();

        let decoder = Decoder::open(&bytes, Config::default()).unwrap();
        assert_eq!(decoder.specs.len(), 0);
        assert!(decoder.paths.get(Index(0)).unwrap().is_root());
        assert!(decoder.warnings().is_empty());
    }

    #[test]
    fn materializes_live_fieldset_for_a_prim_spec() {
        let type_name_field_name = 0u32;
        let specifier_field_name = 1u32;

        let reps = [
            inline_value_rep(crate_type_code::TOKEN, 2), // typeName -> token "Xform"
            inline_value_rep(crate_type_code::SPECIFIER, 0), // specifier -> Def
        ];

        let bytes = FileBuilder::new()
            .section("TOKENS", token_table_section(&["typeName", "specifier", "Xform"]))
            .section("STRINGS", 0u64.to_le_bytes().to_vec())
            .section("FIELDS", fields_section(&[type_name_field_name, specifier_field_name], &reps))
            .section("FIELDSETS", fieldsets_section(&[0, 1, u32::MAX]))
            .section("SPECS", specs_section(&[1], &[0], &[6])) // Prim spec type = 6
            .section(
                "PATHS",
                paths_section(&[0, 1], &[0, 0], &[-1, -2]),
            )
            .build();

        let decoder = Decoder::open(&bytes, Config::default()).unwrap();
        assert_eq!(decoder.specs.len(), 1);
        let spec = decoder.spec_for_path(Index(1)).unwrap();
        let live = decoder.live_fieldset(spec.fieldset_index).unwrap();
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].0.as_str(), "typeName");
    }

    mod crate_type_code {
        pub const TOKEN: u8 = 11;
        pub const SPECIFIER: u8 = 42;
    }
}
