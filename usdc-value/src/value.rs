//! The type-erased value carried by attributes, metadata fields, and
//! dictionary entries: one `Value` per `ValueRep`.

use crate::dict::Dictionary;
use crate::geom::*;
use crate::listop::ListOp;
use crate::path::Path;
use crate::time_samples::TimeSamples;
use crate::token::Token;
use crate::types::CrateDataTypeId;
use half::f16;
use indexmap::IndexMap;

macro_rules! define_scalars {
    ($( $variant:ident($rust_ty:ty) => $type_id:ident ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Scalar {
            $( $variant($rust_ty), )*
        }

        impl Scalar {
            pub fn type_id(&self) -> CrateDataTypeId {
                match self {
                    $( Scalar::$variant(_) => CrateDataTypeId::$type_id, )*
                }
            }
        }

        #[derive(Debug, Clone, PartialEq)]
        pub enum ArrayValue {
            $( $variant(Vec<$rust_ty>), )*
        }

        impl ArrayValue {
            pub fn type_id(&self) -> CrateDataTypeId {
                match self {
                    $( ArrayValue::$variant(_) => CrateDataTypeId::$type_id, )*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $( ArrayValue::$variant(v) => v.len(), )*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }
    };
}

define_scalars! {
    Bool(bool) => Bool,
    UChar(u8) => UChar,
    Int(i32) => Int,
    UInt(u32) => UInt,
    Int64(i64) => Int64,
    UInt64(u64) => UInt64,
    Half(f16) => Half,
    Float(f32) => Float,
    Double(f64) => Double,
    Str(String) => String,
    Tok(Token) => Token,
    AssetPath(String) => AssetPath,
    Matrix2d(Matrix2d) => Matrix2d,
    Matrix3d(Matrix3d) => Matrix3d,
    Matrix4d(Matrix4d) => Matrix4d,
    QuatD(Quatd) => Quatd,
    QuatF(Quatf) => Quatf,
    QuatH(Quath) => Quath,
    Vec2D(Vec2d) => Vec2d,
    Vec2F(Vec2f) => Vec2f,
    Vec2H(Vec2h) => Vec2h,
    Vec2I(Vec2i) => Vec2i,
    Vec3D(Vec3d) => Vec3d,
    Vec3F(Vec3f) => Vec3f,
    Vec3H(Vec3h) => Vec3h,
    Vec3I(Vec3i) => Vec3i,
    Vec4D(Vec4d) => Vec4d,
    Vec4F(Vec4f) => Vec4f,
    Vec4H(Vec4h) => Vec4h,
    Vec4I(Vec4i) => Vec4i,
    TimeCode(f64) => TimeCode,
    Point3H(Vec3h) => Point3h,
    Point3F(Vec3f) => Point3f,
    Point3D(Vec3d) => Point3d,
    Normal3H(Vec3h) => Normal3h,
    Normal3F(Vec3f) => Normal3f,
    Normal3D(Vec3d) => Normal3d,
    Vector3H(Vec3h) => Vector3h,
    Vector3F(Vec3f) => Vector3f,
    Vector3D(Vec3d) => Vector3d,
    Color3H(Vec3h) => Color3h,
    Color3F(Vec3f) => Color3f,
    Color3D(Vec3d) => Color3d,
    Color4H(Vec4h) => Color4h,
    Color4F(Vec4f) => Color4f,
    Color4D(Vec4d) => Color4d,
    Frame4D(Matrix4d) => Frame4d,
    TexCoord2H(Vec2h) => TexCoord2h,
    TexCoord2F(Vec2f) => TexCoord2f,
    TexCoord2D(Vec2d) => TexCoord2d,
    TexCoord3H(Vec3h) => TexCoord3h,
    TexCoord3F(Vec3f) => TexCoord3f,
    TexCoord3D(Vec3d) => TexCoord3d,
    Unregistered(String) => UnregisteredValue,
}

/// Simple scalar enums that are always inlined, never array-wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier {
    Def,
    Over,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variability {
    Varying,
    Uniform,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Array(ArrayValue),
    Dict(Dictionary),
    ListOpToken(ListOp<Token>),
    ListOpString(ListOp<String>),
    ListOpPath(ListOp<Path>),
    PathVector(Vec<Path>),
    TokenVector(Vec<Token>),
    StringVector(Vec<String>),
    Specifier(Specifier),
    Permission(Permission),
    Variability(Variability),
    VariantSelectionMap(IndexMap<String, String>),
    TimeSamples(TimeSamples),
    /// The "no opinion here" sentinel a time sample (or an otherwise
    /// missing attribute default) can carry.
    Block,
}

impl Value {
    /// The 8-bit `CrateDataTypeId` this value round-trips to, independent
    /// of the `isArray` bit.
    pub fn type_id(&self) -> Option<CrateDataTypeId> {
        match self {
            Value::Scalar(s) => Some(s.type_id()),
            Value::Array(a) => Some(a.type_id()),
            Value::Dict(_) => Some(CrateDataTypeId::Dictionary),
            Value::ListOpToken(_) => Some(CrateDataTypeId::TokenListOp),
            Value::ListOpString(_) => Some(CrateDataTypeId::StringListOp),
            Value::ListOpPath(_) => Some(CrateDataTypeId::PathListOp),
            Value::PathVector(_) => Some(CrateDataTypeId::PathVector),
            Value::TokenVector(_) => Some(CrateDataTypeId::TokenVector),
            Value::StringVector(_) => Some(CrateDataTypeId::StringVector),
            Value::Specifier(_) => Some(CrateDataTypeId::Specifier),
            Value::Permission(_) => Some(CrateDataTypeId::Permission),
            Value::Variability(_) => Some(CrateDataTypeId::Variability),
            Value::VariantSelectionMap(_) => Some(CrateDataTypeId::VariantSelectionMap),
            Value::TimeSamples(_) => Some(CrateDataTypeId::TimeSamples),
            Value::Block => None,
        }
    }

    pub fn underlying_type_id(&self) -> Option<CrateDataTypeId> {
        self.type_id().map(CrateDataTypeId::underlying)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Value::Block)
    }

    /// Componentwise linear blend with `other`, weighted `alpha` toward
    /// `other`. `None` for any type that Held/Linear time-sample
    /// evaluation never needs to blend (dictionaries, list-ops, non-numeric
    /// scalars, integer vectors, ...); callers fall back to the held value
    /// for those (§4.3).
    pub fn lerp(&self, other: &Value, alpha: f64) -> Option<Value> {
        let (Value::Scalar(a), Value::Scalar(b)) = (self, other) else {
            return None;
        };
        lerp_scalar(a, b, alpha).map(Value::Scalar)
    }
}

fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_f32(a: f32, b: f32, t: f64) -> f32 {
    (a as f64 + (b as f64 - a as f64) * t) as f32
}

fn lerp_f16(a: f16, b: f16, t: f64) -> f16 {
    f16::from_f64(a.to_f64() + (b.to_f64() - a.to_f64()) * t)
}

fn lerp_vec2h(a: Vec2h, b: Vec2h, t: f64) -> Vec2h {
    Vec2(lerp_f16(a.0, b.0, t), lerp_f16(a.1, b.1, t))
}

fn lerp_vec2f(a: Vec2f, b: Vec2f, t: f64) -> Vec2f {
    Vec2(lerp_f32(a.0, b.0, t), lerp_f32(a.1, b.1, t))
}

fn lerp_vec2d(a: Vec2d, b: Vec2d, t: f64) -> Vec2d {
    Vec2(lerp_f64(a.0, b.0, t), lerp_f64(a.1, b.1, t))
}

fn lerp_vec3h(a: Vec3h, b: Vec3h, t: f64) -> Vec3h {
    Vec3(lerp_f16(a.0, b.0, t), lerp_f16(a.1, b.1, t), lerp_f16(a.2, b.2, t))
}

fn lerp_vec3f(a: Vec3f, b: Vec3f, t: f64) -> Vec3f {
    Vec3(lerp_f32(a.0, b.0, t), lerp_f32(a.1, b.1, t), lerp_f32(a.2, b.2, t))
}

fn lerp_vec3d(a: Vec3d, b: Vec3d, t: f64) -> Vec3d {
    Vec3(lerp_f64(a.0, b.0, t), lerp_f64(a.1, b.1, t), lerp_f64(a.2, b.2, t))
}

fn lerp_vec4h(a: Vec4h, b: Vec4h, t: f64) -> Vec4h {
    Vec4(lerp_f16(a.0, b.0, t), lerp_f16(a.1, b.1, t), lerp_f16(a.2, b.2, t), lerp_f16(a.3, b.3, t))
}

fn lerp_vec4f(a: Vec4f, b: Vec4f, t: f64) -> Vec4f {
    Vec4(lerp_f32(a.0, b.0, t), lerp_f32(a.1, b.1, t), lerp_f32(a.2, b.2, t), lerp_f32(a.3, b.3, t))
}

fn lerp_vec4d(a: Vec4d, b: Vec4d, t: f64) -> Vec4d {
    Vec4(lerp_f64(a.0, b.0, t), lerp_f64(a.1, b.1, t), lerp_f64(a.2, b.2, t), lerp_f64(a.3, b.3, t))
}

fn lerp_quath(a: Quath, b: Quath, t: f64) -> Quath {
    Quat { real: lerp_f16(a.real, b.real, t), imaginary: lerp_vec3h(a.imaginary, b.imaginary, t) }
}

fn lerp_quatf(a: Quatf, b: Quatf, t: f64) -> Quatf {
    Quat { real: lerp_f32(a.real, b.real, t), imaginary: lerp_vec3f(a.imaginary, b.imaginary, t) }
}

fn lerp_quatd(a: Quatd, b: Quatd, t: f64) -> Quatd {
    Quat { real: lerp_f64(a.real, b.real, t), imaginary: lerp_vec3d(a.imaginary, b.imaginary, t) }
}

fn lerp_matrix2d(a: Matrix2d, b: Matrix2d, t: f64) -> Matrix2d {
    let mut out = [0.0; 4];
    for (o, (x, y)) in out.iter_mut().zip(a.0.iter().zip(b.0.iter())) {
        *o = lerp_f64(*x, *y, t);
    }
    Matrix2d(out)
}

fn lerp_matrix3d(a: Matrix3d, b: Matrix3d, t: f64) -> Matrix3d {
    let mut out = [0.0; 9];
    for (o, (x, y)) in out.iter_mut().zip(a.0.iter().zip(b.0.iter())) {
        *o = lerp_f64(*x, *y, t);
    }
    Matrix3d(out)
}

fn lerp_matrix4d(a: Matrix4d, b: Matrix4d, t: f64) -> Matrix4d {
    let mut out = [0.0; 16];
    for (o, (x, y)) in out.iter_mut().zip(a.0.iter().zip(b.0.iter())) {
        *o = lerp_f64(*x, *y, t);
    }
    Matrix4d(out)
}

/// Blends two scalars of the same variant when that variant names a
/// mixable numeric type (§4.3); every role alias over a mixable POD type
/// blends the same way its POD variant does.
macro_rules! lerp_scalar_table {
    ($a:expr, $b:expr, $alpha:expr, { $($variant:ident => $blend:expr),+ $(,)? }) => {
        match ($a, $b) {
            $( (Scalar::$variant(x), Scalar::$variant(y)) => Some(Scalar::$variant($blend(*x, *y, $alpha))), )+
            _ => None,
        }
    };
}

fn lerp_scalar(a: &Scalar, b: &Scalar, alpha: f64) -> Option<Scalar> {
    lerp_scalar_table!(a, b, alpha, {
        Double => lerp_f64,
        Float => lerp_f32,
        Half => lerp_f16,
        Vec2H => lerp_vec2h,
        TexCoord2H => lerp_vec2h,
        Vec2F => lerp_vec2f,
        TexCoord2F => lerp_vec2f,
        Vec2D => lerp_vec2d,
        TexCoord2D => lerp_vec2d,
        Vec3H => lerp_vec3h,
        Point3H => lerp_vec3h,
        Normal3H => lerp_vec3h,
        Vector3H => lerp_vec3h,
        Color3H => lerp_vec3h,
        TexCoord3H => lerp_vec3h,
        Vec3F => lerp_vec3f,
        Point3F => lerp_vec3f,
        Normal3F => lerp_vec3f,
        Vector3F => lerp_vec3f,
        Color3F => lerp_vec3f,
        TexCoord3F => lerp_vec3f,
        Vec3D => lerp_vec3d,
        Point3D => lerp_vec3d,
        Normal3D => lerp_vec3d,
        Vector3D => lerp_vec3d,
        Color3D => lerp_vec3d,
        TexCoord3D => lerp_vec3d,
        Vec4H => lerp_vec4h,
        Color4H => lerp_vec4h,
        Vec4F => lerp_vec4f,
        Color4F => lerp_vec4f,
        Vec4D => lerp_vec4d,
        Color4D => lerp_vec4d,
        Matrix2d => lerp_matrix2d,
        Matrix3d => lerp_matrix3d,
        Matrix4d => lerp_matrix4d,
        Frame4D => lerp_matrix4d,
        QuatH => lerp_quath,
        QuatF => lerp_quatf,
        QuatD => lerp_quatd,
    })
}

/// Reinterprets a scalar's stored Rust representation as `T`, regardless
/// of which role variant it was wrapped in -- the safe-reinterpret rule
/// for role/POD pairs falls out for free because role variants store the
/// identical Rust type as their underlying POD variant.
pub trait FromScalar: Sized {
    fn from_scalar(s: &Scalar) -> Option<Self>;
}

/// Reinterprets an array's stored Rust representation as `Vec<T>`,
/// regardless of which role variant it was wrapped in -- the array
/// counterpart of [`FromScalar`], needed for `tryGet::<Vec<T>>()`-style
/// array round-tripping (§8).
pub trait FromArrayValue: Sized {
    fn from_array_value(a: &ArrayValue) -> Option<Vec<Self>>;
}

macro_rules! impl_value_access {
    ($rust_ty:ty, [$($variant:ident),+ $(,)?]) => {
        impl FromScalar for $rust_ty {
            fn from_scalar(s: &Scalar) -> Option<Self> {
                match s {
                    $( Scalar::$variant(v) => Some(v.clone()), )+
                    _ => None,
                }
            }
        }

        impl FromArrayValue for $rust_ty {
            fn from_array_value(a: &ArrayValue) -> Option<Vec<Self>> {
                match a {
                    $( ArrayValue::$variant(v) => Some(v.clone()), )+
                    _ => None,
                }
            }
        }
    };
}

impl_value_access!(bool, [Bool]);
impl_value_access!(u8, [UChar]);
impl_value_access!(i32, [Int]);
impl_value_access!(u32, [UInt]);
impl_value_access!(i64, [Int64]);
impl_value_access!(u64, [UInt64]);
impl_value_access!(f16, [Half]);
impl_value_access!(f32, [Float]);
impl_value_access!(f64, [Double, TimeCode]);
impl_value_access!(String, [Str, AssetPath, Unregistered]);
impl_value_access!(Token, [Tok]);
impl_value_access!(Matrix2d, [Matrix2d]);
impl_value_access!(Matrix3d, [Matrix3d]);
impl_value_access!(Matrix4d, [Matrix4d, Frame4D]);
impl_value_access!(Quath, [QuatH]);
impl_value_access!(Quatf, [QuatF]);
impl_value_access!(Quatd, [QuatD]);
impl_value_access!(Vec2h, [Vec2H, TexCoord2H]);
impl_value_access!(Vec2f, [Vec2F, TexCoord2F]);
impl_value_access!(Vec2d, [Vec2D, TexCoord2D]);
impl_value_access!(Vec2i, [Vec2I]);
impl_value_access!(
    Vec3h,
    [Vec3H, Point3H, Normal3H, Vector3H, Color3H, TexCoord3H]
);
impl_value_access!(
    Vec3f,
    [Vec3F, Point3F, Normal3F, Vector3F, Color3F, TexCoord3F]
);
impl_value_access!(
    Vec3d,
    [Vec3D, Point3D, Normal3D, Vector3D, Color3D, TexCoord3D]
);
impl_value_access!(Vec3i, [Vec3I]);
impl_value_access!(Vec4h, [Vec4H, Color4H]);
impl_value_access!(Vec4f, [Vec4F, Color4F]);
impl_value_access!(Vec4d, [Vec4D, Color4D]);
impl_value_access!(Vec4i, [Vec4I]);

impl Value {
    /// Typed extraction, reinterpreting role types through their
    /// underlying POD representation as needed (§4.4.6).
    pub fn try_get<T: FromScalar>(&self) -> Option<T> {
        match self {
            Value::Scalar(s) => T::from_scalar(s),
            _ => None,
        }
    }

    /// Typed array extraction, the `Vec<T>` counterpart of [`Value::try_get`].
    /// Preserves on-disk ordering, since the underlying `ArrayValue` variants
    /// store a plain `Vec<T>` (§8: `tryGet::<Vec<T>>()` matches input order).
    pub fn try_get_array<T: FromArrayValue>(&self) -> Option<Vec<T>> {
        match self {
            Value::Array(a) => T::from_array_value(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_type_reinterprets_as_pod() {
        let v = Value::Scalar(Scalar::Point3F(Vec3(1.0, 2.0, 3.0)));
        assert_eq!(v.try_get::<Vec3f>(), Some(Vec3(1.0, 2.0, 3.0)));
        assert_eq!(v.type_id(), Some(CrateDataTypeId::Point3f));
        assert_eq!(v.underlying_type_id(), Some(CrateDataTypeId::Vec3f));
    }

    #[test]
    fn wrong_type_request_returns_none() {
        let v = Value::Scalar(Scalar::Int(7));
        assert_eq!(v.try_get::<f64>(), None);
    }

    #[test]
    fn array_type_id_matches_scalar_family() {
        let a = Value::Array(ArrayValue::Float(vec![1.0, 2.0, 3.0]));
        assert!(a.is_array());
        assert_eq!(a.type_id(), Some(CrateDataTypeId::Float));
    }

    #[test]
    fn block_has_no_type_id() {
        assert_eq!(Value::Block.type_id(), None);
        assert!(Value::Block.is_block());
    }

    #[test]
    fn try_get_array_preserves_order() {
        let a = Value::Array(ArrayValue::Float(vec![3.0, 1.0, 2.0]));
        assert_eq!(a.try_get_array::<f32>(), Some(vec![3.0, 1.0, 2.0]));
    }

    #[test]
    fn try_get_array_on_scalar_is_none() {
        let v = Value::Scalar(Scalar::Float(1.0));
        assert_eq!(v.try_get_array::<f32>(), None);
    }

    #[test]
    fn lerp_blends_vec2_and_vec4_and_matrix_and_quat() {
        let a = Value::Scalar(Scalar::Vec2F(Vec2(0.0, 10.0)));
        let b = Value::Scalar(Scalar::Vec2F(Vec2(10.0, 0.0)));
        assert_eq!(a.lerp(&b, 0.5), Some(Value::Scalar(Scalar::Vec2F(Vec2(5.0, 5.0)))));

        let a = Value::Scalar(Scalar::Color4D(Vec4(0.0, 0.0, 0.0, 0.0)));
        let b = Value::Scalar(Scalar::Color4D(Vec4(2.0, 4.0, 6.0, 8.0)));
        assert_eq!(
            a.lerp(&b, 0.5),
            Some(Value::Scalar(Scalar::Color4D(Vec4(1.0, 2.0, 3.0, 4.0))))
        );

        let a = Value::Scalar(Scalar::Matrix2d(Matrix2d([0.0, 0.0, 0.0, 0.0])));
        let b = Value::Scalar(Scalar::Matrix2d(Matrix2d([2.0, 4.0, 6.0, 8.0])));
        assert_eq!(
            a.lerp(&b, 0.5),
            Some(Value::Scalar(Scalar::Matrix2d(Matrix2d([1.0, 2.0, 3.0, 4.0]))))
        );

        let a = Value::Scalar(Scalar::QuatF(Quat { real: 0.0, imaginary: Vec3(0.0, 0.0, 0.0) }));
        let b = Value::Scalar(Scalar::QuatF(Quat { real: 2.0, imaginary: Vec3(2.0, 2.0, 2.0) }));
        assert_eq!(
            a.lerp(&b, 0.5),
            Some(Value::Scalar(Scalar::QuatF(Quat { real: 1.0, imaginary: Vec3(1.0, 1.0, 1.0) })))
        );
    }

    #[test]
    fn lerp_non_mixable_type_returns_none() {
        let a = Value::Scalar(Scalar::Tok(Token::from("a")));
        let b = Value::Scalar(Scalar::Tok(Token::from("b")));
        assert_eq!(a.lerp(&b, 0.5), None);
    }
}
