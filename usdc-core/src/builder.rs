//! The Prim Tree Builder (§4.5): walks the decoded `PathTree`/`Spec` table
//! depth-first from node 0 and assembles a [`Stage`]. Mirrors tinyusdz's
//! `usdc-reader.cc`, which turns the crate reader's flat tables into a live
//! scene graph the same way.

use indexmap::IndexMap;

use crate::decoder::{Decoder, LiveFieldSet};
use crate::error::{Error, Result};
use crate::prim::{AttributeValue, Prim, PrimMeta, Property, Specifier, Stage, StageMetas, UpAxis};
use crate::rolecast;
use crate::typename;
use crate::sections::specs::SpecType;
use usdc_value::{Dictionary, Index, ListOp, Path, Token, TimeSamples, Value};

const API_SCHEMAS: &[&str] = &[
    "MaterialBindingAPI",
    "SkelBindingAPI",
    "Preliminary_AnchoringAPI",
    "Preliminary_PhysicsColliderAPI",
    "Preliminary_PhysicsMaterialAPI",
    "Preliminary_PhysicsRigidBodyAPI",
];

const KINDS: &[&str] = &["component", "group", "assembly", "subcomponent", "model"];

fn field<'a>(live: &'a LiveFieldSet, name: &str) -> Option<&'a Value> {
    live.iter().find(|(t, _)| t.as_str() == name).map(|(_, v)| v)
}

fn get_bool(live: &LiveFieldSet, name: &str) -> Option<bool> {
    field(live, name).and_then(Value::try_get::<bool>)
}

fn get_string(live: &LiveFieldSet, name: &str) -> Option<String> {
    field(live, name).and_then(Value::try_get::<String>)
}

fn get_token(live: &LiveFieldSet, name: &str) -> Option<Token> {
    field(live, name).and_then(Value::try_get::<Token>)
}

fn get_f64(live: &LiveFieldSet, name: &str) -> Option<f64> {
    field(live, name).and_then(Value::try_get::<f64>)
}

fn get_i32(live: &LiveFieldSet, name: &str) -> Option<i32> {
    field(live, name).and_then(Value::try_get::<i32>)
}

fn get_dict(live: &LiveFieldSet, name: &str) -> Option<Dictionary> {
    match field(live, name) {
        Some(Value::Dict(d)) => Some(d.clone()),
        _ => None,
    }
}

fn get_token_vec(live: &LiveFieldSet, name: &str) -> Vec<Token> {
    match field(live, name) {
        Some(Value::TokenVector(v)) => v.clone(),
        _ => Vec::new(),
    }
}

fn get_list_op_token(live: &LiveFieldSet, name: &str) -> ListOp<Token> {
    match field(live, name) {
        Some(Value::ListOpToken(l)) => l.clone(),
        _ => ListOp::new(),
    }
}

fn get_list_op_string(live: &LiveFieldSet, name: &str) -> ListOp<String> {
    match field(live, name) {
        Some(Value::ListOpString(l)) => l.clone(),
        _ => ListOp::new(),
    }
}

fn get_list_op_path(live: &LiveFieldSet, name: &str) -> ListOp<Path> {
    match field(live, name) {
        Some(Value::ListOpPath(l)) => l.clone(),
        _ => ListOp::new(),
    }
}

fn get_variant_selection(live: &LiveFieldSet, name: &str) -> IndexMap<String, String> {
    match field(live, name) {
        Some(Value::VariantSelectionMap(m)) => m.clone(),
        _ => IndexMap::new(),
    }
}

fn get_path_vec(live: &LiveFieldSet, name: &str) -> Vec<Path> {
    match field(live, name) {
        Some(Value::PathVector(v)) => v.clone(),
        _ => Vec::new(),
    }
}

fn populated_buckets<T>(op: &ListOp<T>) -> usize {
    [
        !op.added.is_empty(),
        !op.prepended.is_empty(),
        !op.appended.is_empty(),
        !op.deleted.is_empty(),
        !op.ordered.is_empty(),
    ]
    .into_iter()
    .filter(|&b| b)
    .count()
}

/// Validates `apiSchemas` against the closed set, tolerating (and warning
/// on) more than one populated bucket rather than rejecting — the source
/// accepts all qualifiers uniformly (open question decision, see DESIGN.md).
fn validate_api_schemas(decoder: &mut Decoder<'_>, op: &ListOp<Token>, prim_path: &Path) -> Result<()> {
    if populated_buckets(op) > 1 {
        decoder.push_warning(format!(
            "{prim_path}: apiSchemas has more than one populated list-op bucket"
        ));
    }
    let all = op
        .explicit
        .iter()
        .chain(op.added.iter())
        .chain(op.prepended.iter())
        .chain(op.appended.iter())
        .chain(op.deleted.iter())
        .chain(op.ordered.iter());
    for tok in all {
        if !API_SCHEMAS.contains(&tok.as_str()) {
            return Err(Error::InvalidApiSchema(tok.as_str().to_string()));
        }
    }
    Ok(())
}

fn validate_kind(kind: &str) -> Result<()> {
    if KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(Error::InvalidKind(kind.to_string()))
    }
}

fn parse_up_axis(s: &str) -> Result<UpAxis> {
    match s {
        "X" => Ok(UpAxis::X),
        "Y" => Ok(UpAxis::Y),
        "Z" => Ok(UpAxis::Z),
        other => Err(Error::InvalidUpAxis(other.to_string())),
    }
}

fn parse_specifier(live: &LiveFieldSet) -> Result<Specifier> {
    match field(live, "specifier") {
        Some(Value::Specifier(s)) => Ok((*s).into()),
        Some(_) => Err(Error::InvalidSpecifier("specifier field has the wrong value type".into())),
        None => Err(Error::InvalidSpecifier("missing required specifier field".into())),
    }
}

fn build_prim_meta(decoder: &mut Decoder<'_>, live: &LiveFieldSet, prim_path: &Path) -> Result<PrimMeta> {
    let kind = get_string(live, "kind");
    if let Some(kind) = &kind {
        validate_kind(kind)?;
    }
    let api_schemas = get_list_op_token(live, "apiSchemas");
    validate_api_schemas(decoder, &api_schemas, prim_path)?;

    let mut inherits = get_list_op_path(live, "inherits");
    let inherit_paths = get_list_op_path(live, "inheritPaths");
    if inherits.is_empty() {
        inherits = inherit_paths;
    }

    Ok(PrimMeta {
        active: get_bool(live, "active"),
        hidden: get_bool(live, "hidden"),
        kind,
        documentation: get_string(live, "documentation"),
        comment: get_string(live, "comment"),
        custom_data: get_dict(live, "customData"),
        asset_info: get_dict(live, "assetInfo"),
        api_schemas,
        variants: get_variant_selection(live, "variantSelection"),
        variant_sets: get_list_op_string(live, "variantSetNames"),
        inherits,
        specializes: get_list_op_path(live, "specializes"),
        prim_children: get_token_vec(live, "primChildren"),
        variant_children: get_token_vec(live, "variantChildren"),
        variant_set_children: get_token_vec(live, "variantSetChildren"),
        scene_name: get_string(live, "sceneName"),
    })
}

fn build_attribute_value(
    default: Option<&Value>,
    time_samples: Option<&Value>,
    type_id: Option<(usdc_value::CrateDataTypeId, bool)>,
) -> Result<Option<AttributeValue>> {
    if let Some(Value::TimeSamples(ts)) = time_samples {
        let widened = if let Some((id, is_array)) = type_id {
            if is_array {
                ts.clone()
            } else {
                let times = ts.times().to_vec();
                let mut values = Vec::with_capacity(times.len());
                for i in 0..ts.len() {
                    let v = ts.value_at_index(i).cloned().unwrap_or(Value::Block);
                    values.push(if v.is_block() { v } else { rolecast::upcast(v, id)? });
                }
                TimeSamples::from_parts(times, values)
            }
        } else {
            ts.clone()
        };
        return Ok(Some(AttributeValue::TimeSamples(widened)));
    }
    if let Some(v) = default {
        let widened = match type_id {
            Some((id, false)) if !v.is_array() => rolecast::upcast(v.clone(), id)?,
            _ => v.clone(),
        };
        return Ok(Some(AttributeValue::Default(widened)));
    }
    Ok(None)
}

fn build_property(live: &LiveFieldSet) -> Result<Property> {
    let custom = get_bool(live, "custom").unwrap_or(false);
    let hidden = get_bool(live, "hidden").unwrap_or(false);
    let comment = get_string(live, "comment");

    let targets_relationship = field(live, "targetPaths").map(|v| matches!(v, Value::ListOpPath(_)));
    if targets_relationship.is_some() && field(live, "typeName").is_none() {
        return Ok(Property::Relationship {
            targets: get_list_op_path(live, "targetPaths"),
            custom,
            hidden,
            comment,
        });
    }

    let type_name = get_token(live, "typeName")
        .map(|t| t.as_str().to_string())
        .ok_or_else(|| Error::corrupt("builder", 0, "attribute spec missing required typeName"))?;
    let variability = match field(live, "variability") {
        Some(Value::Variability(v)) => *v,
        _ => usdc_value::Variability::Varying,
    };
    let type_id = typename::parse_type_name(&type_name);

    let connection_targets = get_path_vec(live, "connectionPaths");
    if !connection_targets.is_empty() {
        return Ok(Property::Connection {
            type_name,
            targets: connection_targets,
            variability,
            custom,
        });
    }

    let default = field(live, "default");
    let time_samples = field(live, "timeSamples");
    match build_attribute_value(default, time_samples, type_id)? {
        Some(value) => Ok(Property::Attribute {
            type_name,
            value,
            variability,
            custom,
            interpolation: get_string(live, "interpolation"),
            element_size: get_i32(live, "elementSize"),
            hidden,
            custom_data: get_dict(live, "customData").unwrap_or_default(),
            comment,
        }),
        None => Ok(Property::EmptyAttribute {
            type_name,
            variability,
            custom,
        }),
    }
}

fn build_relationship(live: &LiveFieldSet) -> Result<Property> {
    Ok(Property::Relationship {
        targets: get_list_op_path(live, "targetPaths"),
        custom: get_bool(live, "custom").unwrap_or(false),
        hidden: get_bool(live, "hidden").unwrap_or(false),
        comment: get_string(live, "comment"),
    })
}

fn live_fieldset_for<'a>(decoder: &'a Decoder<'_>, index: Index) -> Option<&'a LiveFieldSet> {
    let spec = decoder.spec_for_path(index)?;
    decoder.live_fieldset(spec.fieldset_index)
}

#[tracing::instrument(skip(decoder), fields(path = %element_path))]
fn build_prim(decoder: &mut Decoder<'_>, index: Index, element_path: Path) -> Result<Prim> {
    decoder
        .spec_for_path(index)
        .ok_or_else(|| Error::corrupt("builder", index.0 as u64, "node has no Spec"))?;
    let empty = Vec::new();
    let live = live_fieldset_for(decoder, index).unwrap_or(&empty).clone();

    let type_name = get_token(&live, "typeName")
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "Model".to_string());
    let specifier = parse_specifier(&live)?;

    let mut prim = Prim::new(element_path.clone(), type_name, specifier);
    prim.meta = build_prim_meta(decoder, &live, &element_path)?;

    let node = decoder
        .paths
        .node(index)
        .cloned()
        .ok_or_else(|| Error::corrupt("builder", index.0 as u64, "path index has no Node"))?;

    for (elem_name, child_index) in &node.children {
        let child_spec = decoder.spec_for_path(*child_index).copied();
        match child_spec.map(|s| s.spec_type) {
            Some(SpecType::Prim) => {
                let child_path = element_path.append_child(elem_name);
                let child_prim = build_prim(decoder, *child_index, child_path)?;
                prim.children.push(child_prim);
            }
            Some(SpecType::VariantSet) => {
                let variants = build_variant_set(decoder, *child_index, elem_name, &element_path)?;
                prim.variants.insert(elem_name.clone(), variants);
            }
            Some(SpecType::Attribute) => {
                let child_live = live_fieldset_for(decoder, *child_index).cloned().unwrap_or_default();
                let property = build_property(&child_live)?;
                prim.properties.insert(elem_name.clone(), property);
            }
            Some(SpecType::Relationship) => {
                let child_live = live_fieldset_for(decoder, *child_index).cloned().unwrap_or_default();
                let property = build_relationship(&child_live)?;
                prim.properties.insert(elem_name.clone(), property);
            }
            _ => {}
        }
    }

    Ok(prim)
}

fn build_variant_set(
    decoder: &mut Decoder<'_>,
    index: Index,
    set_name: &str,
    owner_path: &Path,
) -> Result<IndexMap<String, Prim>> {
    let node = decoder
        .paths
        .node(index)
        .cloned()
        .ok_or_else(|| Error::corrupt("builder", index.0 as u64, "variant set node missing"))?;

    let mut variants = IndexMap::new();
    for (variant_name, child_index) in &node.children {
        let child_spec = decoder.spec_for_path(*child_index).copied();
        if child_spec.map(|s| s.spec_type) == Some(SpecType::Variant) {
            let variant_path = owner_path.append_variant_selection(set_name, variant_name);
            let variant_prim = build_prim(decoder, *child_index, variant_path)?;
            variants.insert(variant_name.clone(), variant_prim);
        }
    }
    Ok(variants)
}

fn build_stage_metas(live: &LiveFieldSet) -> Result<StageMetas> {
    let up_axis = match get_string(live, "upAxis") {
        Some(s) => Some(parse_up_axis(&s)?),
        None => None,
    };
    Ok(StageMetas {
        up_axis,
        meters_per_unit: get_f64(live, "metersPerUnit"),
        time_codes_per_second: get_f64(live, "timeCodesPerSecond"),
        start_time_code: get_f64(live, "startTimeCode"),
        end_time_code: get_f64(live, "endTimeCode"),
        default_prim: get_token(live, "defaultPrim"),
        custom_layer_data: get_dict(live, "customLayerData"),
        documentation: get_string(live, "documentation"),
        comment: get_string(live, "comment"),
        prim_children: get_token_vec(live, "primChildren"),
    })
}

/// Runs the full prim-tree build (§4.5) over an already-open [`Decoder`].
#[tracing::instrument(skip(decoder))]
pub fn read_stage(decoder: &mut Decoder<'_>) -> Result<Stage> {
    let root = Index(0);
    let empty = Vec::new();
    let root_live = live_fieldset_for(decoder, root).unwrap_or(&empty).clone();
    let metas = build_stage_metas(&root_live)?;

    let root_node = decoder
        .paths
        .node(root)
        .cloned()
        .ok_or_else(|| Error::corrupt("builder", 0, "missing root path node"))?;

    let mut root_prims = Vec::new();
    for (elem_name, child_index) in &root_node.children {
        let child_spec = decoder.spec_for_path(*child_index).copied();
        if child_spec.map(|s| s.spec_type) == Some(SpecType::Prim) {
            let child_path = Path::root().append_child(elem_name);
            root_prims.push(build_prim(decoder, *child_index, child_path)?);
        }
    }

    tracing::debug!(root_prim_count = root_prims.len(), "stage built");
    Ok(Stage { metas, root_prims })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::decoder::test_support::*;
    use crate::decoder::Decoder;

    mod crate_type_code {
        pub const TOKEN: u8 = 11;
        pub const SPECIFIER: u8 = 42;
        pub const BOOL: u8 = 1;
    }

    #[test]
    fn builds_empty_root_stage() {
        let bytes = FileBuilder::new()
            .section("TOKENS", token_table_section(&[]))
            .section("STRINGS", 0u64.to_le_bytes().to_vec())
            .section("FIELDS", fields_section(&[], &[]))
            .section("FIELDSETS", fieldsets_section(&[]))
            .section("SPECS", specs_section(&[], &[], &[]))
            .section("PATHS", paths_section(&[0], &[0], &[-2]))
            .build();

        let mut decoder = Decoder::open(&bytes, Config::default()).unwrap();
        let stage = read_stage(&mut decoder).unwrap();
        assert!(stage.root_prims.is_empty());
        assert!(stage.metas.up_axis.is_none());
    }

    #[test]
    fn builds_single_xform_prim() {
        let reps = [
            inline_value_rep(crate_type_code::TOKEN, 2), // typeName -> "Xform"
            inline_value_rep(crate_type_code::SPECIFIER, 0), // specifier -> Def
        ];

        let bytes = FileBuilder::new()
            .section("TOKENS", token_table_section(&["typeName", "specifier", "Xform"]))
            .section("STRINGS", 0u64.to_le_bytes().to_vec())
            .section("FIELDS", fields_section(&[0, 1], &reps))
            .section("FIELDSETS", fieldsets_section(&[0, 1, u32::MAX]))
            .section("SPECS", specs_section(&[1], &[0], &[6]))
            .section("PATHS", paths_section(&[0, 1], &[0, 2], &[-1, -2]))
            .build();

        let mut decoder = Decoder::open(&bytes, Config::default()).unwrap();
        let stage = read_stage(&mut decoder).unwrap();
        assert_eq!(stage.root_prims.len(), 1);
        let prim = &stage.root_prims[0];
        assert_eq!(prim.type_name, "Xform");
        assert_eq!(prim.specifier, Specifier::Def);
        assert_eq!(prim.element_path.to_string(), "/Xform");
    }

    #[test]
    fn two_specs_with_different_fieldset_offsets_decode_independently() {
        // Root has two children, A (1 field) and B (2 fields), whose
        // fieldsets start at different offsets -- regression coverage for
        // `Decoder::live_fieldset` keying by offset rather than ordinal.
        let reps = [
            inline_value_rep(crate_type_code::SPECIFIER, 0), // A.specifier -> Def
            inline_value_rep(crate_type_code::SPECIFIER, 1), // B.specifier -> Over
            inline_value_rep(crate_type_code::BOOL, 1),       // B.active -> true
        ];

        let bytes = FileBuilder::new()
            .section("TOKENS", token_table_section(&["specifier", "active", "A", "B"]))
            .section("STRINGS", 0u64.to_le_bytes().to_vec())
            .section("FIELDS", fields_section(&[0, 0, 1], &reps))
            .section("FIELDSETS", fieldsets_section(&[0, u32::MAX, 1, 2, u32::MAX]))
            .section("SPECS", specs_section(&[1, 2], &[0, 2], &[6, 6]))
            .section(
                "PATHS",
                paths_section(&[0, 1, 2], &[0, 2, 3], &[-1, 0, -2]),
            )
            .build();

        let mut decoder = Decoder::open(&bytes, Config::default()).unwrap();
        let stage = read_stage(&mut decoder).unwrap();
        assert_eq!(stage.root_prims.len(), 2);
        assert_eq!(stage.root_prims[0].specifier, Specifier::Def);
        assert_eq!(stage.root_prims[1].specifier, Specifier::Over);
        assert_eq!(stage.root_prims[1].meta.active, Some(true));
    }
}
