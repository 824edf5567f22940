//! SPECS section: three parallel integer-compressed `u32[numSpecs]`
//! streams (pathIndex, fieldSetIndex, specType).

use crate::error::{Error, Result};
use usdc_codec::ByteReader;
use usdc_value::Index;

/// On-disk spec-type ordinals, matching the real Crate format's
/// `SdfSpecType` enum (stable across USD releases).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecType {
    Unknown,
    Attribute,
    Connection,
    Expression,
    Mapper,
    MapperArg,
    Prim,
    PseudoRoot,
    Relationship,
    RelationshipTarget,
    Variant,
    VariantSet,
}

impl SpecType {
    pub fn from_u32(v: u32) -> Option<Self> {
        use SpecType::*;
        const TABLE: &[SpecType] = &[
            Unknown,
            Attribute,
            Connection,
            Expression,
            Mapper,
            MapperArg,
            Prim,
            PseudoRoot,
            Relationship,
            RelationshipTarget,
            Variant,
            VariantSet,
        ];
        TABLE.get(v as usize).copied()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Spec {
    pub path_index: Index,
    pub fieldset_index: u32,
    pub spec_type: SpecType,
}

fn read_compressed_u32_stream(reader: &mut ByteReader<'_>, n: usize) -> Result<Vec<u32>> {
    let len = reader.read_u64().map_err(Error::from)? as usize;
    let bytes = reader.read_bytes(len).map_err(Error::from)?;
    usdc_codec::intcomp::decompress_u32(&bytes, n).map_err(Error::from)
}

pub fn read_specs(reader: &mut ByteReader<'_>, start: i64) -> Result<Vec<Spec>> {
    reader.seek_set(start as u64).map_err(Error::from)?;
    let num_specs = reader.read_u64().map_err(Error::from)? as usize;

    let path_indices = read_compressed_u32_stream(reader, num_specs)?;
    let fieldset_indices = read_compressed_u32_stream(reader, num_specs)?;
    let spec_types = read_compressed_u32_stream(reader, num_specs)?;

    let mut specs = Vec::with_capacity(num_specs);
    for i in 0..num_specs {
        let spec_type = SpecType::from_u32(spec_types[i])
            .ok_or_else(|| Error::corrupt("specs", start as u64, format!("unknown spec type {}", spec_types[i])))?;
        specs.push(Spec {
            path_index: Index(path_indices[i]),
            fieldset_index: fieldset_indices[i],
            spec_type,
        });
    }

    Ok(specs)
}
