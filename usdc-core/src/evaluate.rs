//! `evaluateAttribute` (§6.3): resolves connection chains to a concrete
//! value, following tinyusdz's `usdc-reader.cc` connection-target
//! resolution and the spec's cycle/hop-limit contract.

use std::collections::HashSet;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::prim::{AttributeValue, Prim, Property, Stage};
use crate::typename;
use usdc_value::{Interpolation, Path, PropElement, Value};

fn property_name(path: &Path) -> Option<&str> {
    match path.prop_elements().last()? {
        PropElement::Property(name) => Some(name),
        _ => None,
    }
}

/// Resolves `name` on `prim` to a concrete value at `time`, following
/// connection chains up to `config.max_connection_hops` hops.
pub fn evaluate_attribute(
    stage: &Stage,
    prim: &Prim,
    name: &str,
    time: f64,
    interpolation: Interpolation,
    config: &Config,
) -> Result<Value> {
    let mut current_prim = prim;
    let mut current_name = name.to_string();
    let mut visited: HashSet<Path> = HashSet::new();
    visited.insert(current_prim.element_path.append_property(&current_name));

    for hop in 0.. {
        if hop > config.max_connection_hops {
            return Err(Error::LimitExceeded(format!(
                "connection chain exceeded {} hops",
                config.max_connection_hops
            )));
        }

        let property = current_prim
            .properties
            .get(&current_name)
            .ok_or_else(|| Error::NotFound(format!("{}.{}", current_prim.element_path, current_name)))?;

        match property {
            Property::EmptyAttribute { .. } => return Ok(Value::Block),
            Property::Attribute { value, .. } => {
                return match value {
                    AttributeValue::Default(v) => Ok(v.clone()),
                    AttributeValue::TimeSamples(ts) => Ok(ts.evaluate(time, interpolation).unwrap_or(Value::Block)),
                };
            }
            Property::Relationship { .. } => {
                return Err(Error::TypeMismatch {
                    requested: "attribute",
                    stored: "relationship".to_string(),
                })
            }
            Property::Connection { type_name, targets, .. } => {
                let target = targets
                    .first()
                    .ok_or_else(|| Error::InvalidConnection(current_prim.element_path.append_property(&current_name)))?;

                if !visited.insert(target.clone()) {
                    return Err(Error::CircularConnection(target.clone()));
                }

                let target_prim_path = target.prim_part();
                let target_name = property_name(target)
                    .ok_or_else(|| Error::InvalidConnection(target.clone()))?
                    .to_string();
                let target_prim = stage
                    .get_prim_at_path(&target_prim_path)
                    .ok_or_else(|| Error::InvalidConnection(target.clone()))?;

                if let Some((declared, _)) = typename::parse_type_name(type_name) {
                    if let Some(target_property) = target_prim.properties.get(&target_name) {
                        if let Some(stored) = property_type_id(target_property) {
                            if stored.underlying() != declared.underlying() {
                                return Err(Error::TypeMismatch {
                                    requested: "connection target type",
                                    stored: format!("{stored} (connection declared {declared})"),
                                });
                            }
                        }
                    }
                }

                current_prim = target_prim;
                current_name = target_name;
            }
        }
    }

    unreachable!("loop only exits via return")
}

fn property_type_id(property: &Property) -> Option<usdc_value::CrateDataTypeId> {
    match property {
        Property::Attribute { value, .. } => match value {
            AttributeValue::Default(v) => v.type_id(),
            AttributeValue::TimeSamples(ts) => ts.value_at_index(0).and_then(Value::type_id),
        },
        Property::Connection { type_name, .. } => typename::parse_type_name(type_name).map(|(id, _)| id),
        _ => None,
    }
}
