//! The reconstructed scene-graph data model (§3): `Stage`, `Prim`,
//! `Property`, and the metadata bags attached to each.

use indexmap::IndexMap;
use usdc_value::{Dictionary, ListOp, Path, TimeSamples, Token, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier {
    Def,
    Over,
    Class,
}

impl From<usdc_value::Specifier> for Specifier {
    fn from(s: usdc_value::Specifier) -> Self {
        match s {
            usdc_value::Specifier::Def => Specifier::Def,
            usdc_value::Specifier::Over => Specifier::Over,
            usdc_value::Specifier::Class => Specifier::Class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpAxis {
    X,
    Y,
    Z,
}

/// Optional per-prim metadata extracted from its fieldset (§3 `PrimMeta`).
#[derive(Debug, Clone)]
pub struct PrimMeta {
    pub active: Option<bool>,
    pub hidden: Option<bool>,
    pub kind: Option<String>,
    pub documentation: Option<String>,
    pub comment: Option<String>,
    pub custom_data: Option<Dictionary>,
    pub asset_info: Option<Dictionary>,
    pub api_schemas: ListOp<Token>,
    /// `variantSelection`: which variant is active per variant set on this prim.
    pub variants: IndexMap<String, String>,
    /// `variantSetNames`: the variant sets this prim declares.
    pub variant_sets: ListOp<String>,
    pub inherits: ListOp<Path>,
    pub specializes: ListOp<Path>,
    pub prim_children: Vec<Token>,
    pub variant_children: Vec<Token>,
    pub variant_set_children: Vec<Token>,
    pub scene_name: Option<String>,
}

impl Default for PrimMeta {
    fn default() -> Self {
        PrimMeta {
            active: None,
            hidden: None,
            kind: None,
            documentation: None,
            comment: None,
            custom_data: None,
            asset_info: None,
            api_schemas: ListOp::new(),
            variants: IndexMap::new(),
            variant_sets: ListOp::new(),
            inherits: ListOp::new(),
            specializes: ListOp::new(),
            prim_children: Vec::new(),
            variant_children: Vec::new(),
            variant_set_children: Vec::new(),
            scene_name: None,
        }
    }
}

/// One attribute value: either a fixed scalar/array default, or a
/// time-varying sample set (§3 Property shape 2).
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Default(Value),
    TimeSamples(TimeSamples),
}

/// One of the four property shapes (§3).
#[derive(Debug, Clone)]
pub enum Property {
    /// Declared type only, no opinion about a value yet.
    EmptyAttribute { type_name: String, variability: usdc_value::Variability, custom: bool },
    /// A typed attribute carrying a concrete value.
    Attribute {
        type_name: String,
        value: AttributeValue,
        variability: usdc_value::Variability,
        custom: bool,
        interpolation: Option<String>,
        element_size: Option<i32>,
        hidden: bool,
        custom_data: Dictionary,
        comment: Option<String>,
    },
    /// A typed attribute whose value comes from following other attributes.
    Connection { type_name: String, targets: Vec<Path>, variability: usdc_value::Variability, custom: bool },
    /// Untyped target-path list-edit.
    Relationship { targets: ListOp<Path>, custom: bool, hidden: bool, comment: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Prim {
    pub element_path: Path,
    pub type_name: String,
    pub specifier: Specifier,
    pub meta: PrimMeta,
    pub properties: IndexMap<String, Property>,
    pub children: Vec<Prim>,
    pub variants: IndexMap<String, IndexMap<String, Prim>>,
}

impl Prim {
    pub fn new(element_path: Path, type_name: String, specifier: Specifier) -> Self {
        Prim {
            element_path,
            type_name,
            specifier,
            meta: PrimMeta::default(),
            properties: IndexMap::new(),
            children: Vec::new(),
            variants: IndexMap::new(),
        }
    }

    pub fn find(&self, path: &Path) -> Option<&Prim> {
        if &self.element_path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StageMetas {
    pub up_axis: Option<UpAxis>,
    pub meters_per_unit: Option<f64>,
    pub time_codes_per_second: Option<f64>,
    pub start_time_code: Option<f64>,
    pub end_time_code: Option<f64>,
    pub default_prim: Option<Token>,
    pub custom_layer_data: Option<Dictionary>,
    pub documentation: Option<String>,
    pub comment: Option<String>,
    pub prim_children: Vec<Token>,
}

#[derive(Debug, Clone, Default)]
pub struct Stage {
    pub metas: StageMetas,
    pub root_prims: Vec<Prim>,
}

impl Stage {
    pub fn get_prim_at_path(&self, path: &Path) -> Option<&Prim> {
        self.root_prims.iter().find_map(|p| p.find(path))
    }
}
