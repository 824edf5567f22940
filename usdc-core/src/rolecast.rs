//! Role type up-casting on load (§4.4.6): when a field's declared
//! `typeName` names a more precise type than the value's actual inline
//! storage (e.g. requested `float3` but the encoder inlined a `half3` to
//! save bits), widen component-wise through an `f64` intermediate. Lossless
//! in the direction the format actually needs it (half/float -> double),
//! and exact-round-trippable the other way since inline storage only ever
//! loses precision, never gains it.

use crate::error::{Error, Result};
use half::f16;
use usdc_value::{CrateDataTypeId as T, Quat, Scalar, Value, Vec2, Vec3, Vec4};

trait Widen64 {
    fn widen(self) -> f64;
}
impl Widen64 for f16 {
    fn widen(self) -> f64 {
        self.to_f64()
    }
}
impl Widen64 for f32 {
    fn widen(self) -> f64 {
        self as f64
    }
}
impl Widen64 for f64 {
    fn widen(self) -> f64 {
        self
    }
}

trait NarrowFrom64 {
    fn narrow(v: f64) -> Self;
}
impl NarrowFrom64 for f16 {
    fn narrow(v: f64) -> Self {
        f16::from_f64(v)
    }
}
impl NarrowFrom64 for f32 {
    fn narrow(v: f64) -> Self {
        v as f32
    }
}
impl NarrowFrom64 for f64 {
    fn narrow(v: f64) -> Self {
        v
    }
}

fn vec2_w<T: Widen64 + Copy>(v: Vec2<T>) -> Vec2<f64> {
    Vec2(v.0.widen(), v.1.widen())
}
fn vec3_w<T: Widen64 + Copy>(v: Vec3<T>) -> Vec3<f64> {
    Vec3(v.0.widen(), v.1.widen(), v.2.widen())
}
fn vec4_w<T: Widen64 + Copy>(v: Vec4<T>) -> Vec4<f64> {
    Vec4(v.0.widen(), v.1.widen(), v.2.widen(), v.3.widen())
}
fn quat_w<T: Widen64 + Copy>(q: Quat<T>) -> Quat<f64> {
    Quat {
        real: q.real.widen(),
        imaginary: vec3_w(q.imaginary),
    }
}

fn vec2_n<T: NarrowFrom64>(v: Vec2<f64>) -> Vec2<T> {
    Vec2(T::narrow(v.0), T::narrow(v.1))
}
fn vec3_n<T: NarrowFrom64>(v: Vec3<f64>) -> Vec3<T> {
    Vec3(T::narrow(v.0), T::narrow(v.1), T::narrow(v.2))
}
fn vec4_n<T: NarrowFrom64>(v: Vec4<f64>) -> Vec4<T> {
    Vec4(T::narrow(v.0), T::narrow(v.1), T::narrow(v.2), T::narrow(v.3))
}
fn quat_n<T: NarrowFrom64>(q: Quat<f64>) -> Quat<T> {
    Quat {
        real: T::narrow(q.real),
        imaginary: vec3_n(q.imaginary),
    }
}

enum Components {
    Scalar(f64),
    Vec2(Vec2<f64>),
    Vec3(Vec3<f64>),
    Vec4(Vec4<f64>),
    Quat(Quat<f64>),
}

fn extract(s: &Scalar) -> Option<Components> {
    use Scalar::*;
    Some(match s {
        Half(v) => Components::Scalar(v.widen()),
        Float(v) => Components::Scalar(v.widen()),
        Double(v) | TimeCode(v) => Components::Scalar(*v),

        Vec2H(v) | TexCoord2H(v) => Components::Vec2(vec2_w(*v)),
        Vec2F(v) | TexCoord2F(v) => Components::Vec2(vec2_w(*v)),
        Vec2D(v) | TexCoord2D(v) => Components::Vec2(vec2_w(*v)),

        Vec3H(v) | Point3H(v) | Normal3H(v) | Vector3H(v) | Color3H(v) | TexCoord3H(v) => {
            Components::Vec3(vec3_w(*v))
        }
        Vec3F(v) | Point3F(v) | Normal3F(v) | Vector3F(v) | Color3F(v) | TexCoord3F(v) => {
            Components::Vec3(vec3_w(*v))
        }
        Vec3D(v) | Point3D(v) | Normal3D(v) | Vector3D(v) | Color3D(v) | TexCoord3D(v) => {
            Components::Vec3(vec3_w(*v))
        }

        Vec4H(v) | Color4H(v) => Components::Vec4(vec4_w(*v)),
        Vec4F(v) | Color4F(v) => Components::Vec4(vec4_w(*v)),
        Vec4D(v) | Color4D(v) => Components::Vec4(vec4_w(*v)),

        QuatH(q) => Components::Quat(quat_w(*q)),
        QuatF(q) => Components::Quat(quat_w(*q)),
        QuatD(q) => Components::Quat(*q),

        _ => return None,
    })
}

fn build(target: T, comps: Components) -> Option<Scalar> {
    use Scalar::*;
    Some(match (target, comps) {
        (T::Half, Components::Scalar(v)) => Half(f16::narrow(v)),
        (T::Float, Components::Scalar(v)) => Float(f32::narrow(v)),
        (T::Double, Components::Scalar(v)) => Double(v),
        (T::TimeCode, Components::Scalar(v)) => TimeCode(v),

        (T::Vec2h, Components::Vec2(v)) => Vec2H(vec2_n(v)),
        (T::Vec2f, Components::Vec2(v)) => Vec2F(vec2_n(v)),
        (T::Vec2d, Components::Vec2(v)) => Vec2D(vec2_n(v)),
        (T::TexCoord2h, Components::Vec2(v)) => TexCoord2H(vec2_n(v)),
        (T::TexCoord2f, Components::Vec2(v)) => TexCoord2F(vec2_n(v)),
        (T::TexCoord2d, Components::Vec2(v)) => TexCoord2D(vec2_n(v)),

        (T::Vec3h, Components::Vec3(v)) => Vec3H(vec3_n(v)),
        (T::Vec3f, Components::Vec3(v)) => Vec3F(vec3_n(v)),
        (T::Vec3d, Components::Vec3(v)) => Vec3D(vec3_n(v)),
        (T::Point3h, Components::Vec3(v)) => Point3H(vec3_n(v)),
        (T::Point3f, Components::Vec3(v)) => Point3F(vec3_n(v)),
        (T::Point3d, Components::Vec3(v)) => Point3D(vec3_n(v)),
        (T::Normal3h, Components::Vec3(v)) => Normal3H(vec3_n(v)),
        (T::Normal3f, Components::Vec3(v)) => Normal3F(vec3_n(v)),
        (T::Normal3d, Components::Vec3(v)) => Normal3D(vec3_n(v)),
        (T::Vector3h, Components::Vec3(v)) => Vector3H(vec3_n(v)),
        (T::Vector3f, Components::Vec3(v)) => Vector3F(vec3_n(v)),
        (T::Vector3d, Components::Vec3(v)) => Vector3D(vec3_n(v)),
        (T::Color3h, Components::Vec3(v)) => Color3H(vec3_n(v)),
        (T::Color3f, Components::Vec3(v)) => Color3F(vec3_n(v)),
        (T::Color3d, Components::Vec3(v)) => Color3D(vec3_n(v)),
        (T::TexCoord3h, Components::Vec3(v)) => TexCoord3H(vec3_n(v)),
        (T::TexCoord3f, Components::Vec3(v)) => TexCoord3F(vec3_n(v)),
        (T::TexCoord3d, Components::Vec3(v)) => TexCoord3D(vec3_n(v)),

        (T::Vec4h, Components::Vec4(v)) => Vec4H(vec4_n(v)),
        (T::Vec4f, Components::Vec4(v)) => Vec4F(vec4_n(v)),
        (T::Vec4d, Components::Vec4(v)) => Vec4D(vec4_n(v)),
        (T::Color4h, Components::Vec4(v)) => Color4H(vec4_n(v)),
        (T::Color4f, Components::Vec4(v)) => Color4F(vec4_n(v)),
        (T::Color4d, Components::Vec4(v)) => Color4D(vec4_n(v)),

        (T::Quath, Components::Quat(q)) => QuatH(quat_n(q)),
        (T::Quatf, Components::Quat(q)) => QuatF(quat_n(q)),
        (T::Quatd, Components::Quat(q)) => QuatD(quat_n(q)),

        _ => return None,
    })
}

/// Widen `value`'s scalar payload to `target`'s precision/role, if the two
/// share a component family (same vector arity or both plain scalars).
/// Arrays and non-geometric values pass through unchanged: array up-casting
/// is not observed in practice and the spec scopes this to scalar fields.
pub fn upcast(value: Value, target: T) -> Result<Value> {
    let current = match value.type_id() {
        Some(id) => id,
        None => return Ok(value),
    };
    if current == target {
        return Ok(value);
    }
    let Value::Scalar(s) = &value else {
        return Ok(value);
    };
    let Some(comps) = extract(s) else {
        return Ok(value);
    };
    match build(target, comps) {
        Some(widened) => Ok(Value::Scalar(widened)),
        None => Err(Error::TypeMismatch {
            requested: "role up-cast target",
            stored: format!("{current} -> {target}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usdc_value::Vec3;

    #[test]
    fn widens_half3_point_to_float3_point() {
        let v = Value::Scalar(Scalar::Point3H(Vec3(f16::from_f32(1.0), f16::from_f32(2.0), f16::from_f32(3.0))));
        let widened = upcast(v, T::Point3f).unwrap();
        assert_eq!(widened, Value::Scalar(Scalar::Point3F(Vec3(1.0, 2.0, 3.0))));
    }

    #[test]
    fn widens_plain_float_to_double() {
        let v = Value::Scalar(Scalar::Float(1.5));
        assert_eq!(upcast(v, T::Double).unwrap(), Value::Scalar(Scalar::Double(1.5)));
    }

    #[test]
    fn same_type_is_noop() {
        let v = Value::Scalar(Scalar::Int(7));
        assert_eq!(upcast(v.clone(), T::Int).unwrap(), v);
    }

    #[test]
    fn mismatched_family_is_type_mismatch() {
        let v = Value::Scalar(Scalar::Vec3F(Vec3(1.0, 2.0, 3.0)));
        assert!(upcast(v, T::Vec2f).is_err());
    }
}
