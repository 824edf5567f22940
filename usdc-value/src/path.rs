//! Scene-graph paths: a prim part (a sequence of child/variant-selection
//! elements rooted at `/`) plus an optional trailing property or
//! relationship-target part.

use std::fmt;
use std::sync::Arc;

/// One element of the prim part of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimElement {
    /// A plain child name, e.g. `World` in `/World/Mesh`.
    Child(Arc<str>),
    /// A variant selection, e.g. `{lod=high}` in `/World{lod=high}Mesh`.
    VariantSelection { set: Arc<str>, variant: Arc<str> },
}

/// The optional property part trailing a prim path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropElement {
    /// A plain property name, e.g. `.points`.
    Property(Arc<str>),
    /// A relationship-target path, e.g. `.points[/Other/Prim]`.
    Target(Box<Path>),
    /// A mapper argument name, e.g. `.points.mapper[/Other].weight`.
    MapperArg(Arc<str>),
}

/// A full scene path: `/prim/part{variant=sel}.propertyPart`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    prim: Vec<PrimElement>,
    prop: Vec<PropElement>,
}

impl Path {
    pub fn root() -> Self {
        Path::default()
    }

    pub fn is_root(&self) -> bool {
        self.prim.is_empty() && self.prop.is_empty()
    }

    pub fn is_prim_path(&self) -> bool {
        self.prop.is_empty()
    }

    pub fn prim_elements(&self) -> &[PrimElement] {
        &self.prim
    }

    pub fn prop_elements(&self) -> &[PropElement] {
        &self.prop
    }

    /// Returns a new path with one more child element appended.
    pub fn append_child(&self, name: &str) -> Path {
        let mut prim = self.prim.clone();
        prim.push(PrimElement::Child(Arc::from(name)));
        Path {
            prim,
            prop: Vec::new(),
        }
    }

    pub fn append_variant_selection(&self, set: &str, variant: &str) -> Path {
        let mut prim = self.prim.clone();
        prim.push(PrimElement::VariantSelection {
            set: Arc::from(set),
            variant: Arc::from(variant),
        });
        Path {
            prim,
            prop: Vec::new(),
        }
    }

    pub fn append_property(&self, name: &str) -> Path {
        let mut prop = self.prop.clone();
        prop.push(PropElement::Property(Arc::from(name)));
        Path {
            prim: self.prim.clone(),
            prop,
        }
    }

    pub fn append_target(&self, target: Path) -> Path {
        let mut prop = self.prop.clone();
        prop.push(PropElement::Target(Box::new(target)));
        Path {
            prim: self.prim.clone(),
            prop,
        }
    }

    /// The prim-only prefix of this path (strips any property part).
    pub fn prim_part(&self) -> Path {
        Path {
            prim: self.prim.clone(),
            prop: Vec::new(),
        }
    }

    /// The parent path, or `None` if this path is already the root.
    pub fn parent(&self) -> Option<Path> {
        if !self.prop.is_empty() {
            return Some(self.prim_part());
        }
        if self.prim.is_empty() {
            return None;
        }
        let mut prim = self.prim.clone();
        prim.pop();
        Some(Path {
            prim,
            prop: Vec::new(),
        })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for el in &self.prim {
            match el {
                PrimElement::Child(name) => write!(f, "/{name}")?,
                PrimElement::VariantSelection { set, variant } => {
                    write!(f, "{{{set}={variant}}}")?
                }
            }
        }
        if self.prim.is_empty() && self.prop.is_empty() {
            write!(f, "/")?;
        }
        for el in &self.prop {
            match el {
                PropElement::Property(name) => write!(f, ".{name}")?,
                PropElement::Target(target) => write!(f, "[{target}]")?,
                PropElement::MapperArg(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        assert_eq!(Path::root().to_string(), "/");
    }

    #[test]
    fn builds_nested_prim_path() {
        let p = Path::root().append_child("World").append_child("Mesh");
        assert_eq!(p.to_string(), "/World/Mesh");
        assert!(p.is_prim_path());
    }

    #[test]
    fn builds_property_path() {
        let p = Path::root().append_child("Mesh").append_property("points");
        assert_eq!(p.to_string(), "/Mesh.points");
        assert!(!p.is_prim_path());
    }

    #[test]
    fn parent_strips_property_then_elements() {
        let prop = Path::root().append_child("Mesh").append_property("points");
        let prim = prop.parent().unwrap();
        assert_eq!(prim.to_string(), "/Mesh");
        let root = prim.parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }
}
