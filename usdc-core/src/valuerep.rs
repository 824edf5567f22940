//! `ValueRep` unpacking: the dispatch from an 8-byte bit-packed word into a
//! concrete [`usdc_value::Value`].

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sections::paths::PathTree;
use half::f16;
use usdc_codec::ByteReader;
use usdc_value::{
    ArrayValue, Dictionary, Index, ListEditQual, ListOp, Matrix2d, Matrix3d, Matrix4d,
    Permission, Path, Quat, Scalar, Specifier, TimeSamples, Token, TokenTable, Value, Variability,
    Vec2, Vec3, Vec4,
};

const MIN_COMPRESSED_ARRAY_SIZE: u64 = 16;

const IS_ARRAY_BIT: u64 = 1 << 63;
const IS_INLINED_BIT: u64 = 1 << 62;
const IS_COMPRESSED_BIT: u64 = 1 << 61;
const PAYLOAD_MASK: u64 = (1 << 48) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRepBits(pub u64);

impl ValueRepBits {
    pub fn is_array(self) -> bool {
        self.0 & IS_ARRAY_BIT != 0
    }

    pub fn is_inlined(self) -> bool {
        self.0 & IS_INLINED_BIT != 0
    }

    pub fn is_compressed(self) -> bool {
        self.0 & IS_COMPRESSED_BIT != 0
    }

    pub fn type_code(self) -> u8 {
        ((self.0 >> 48) & 0xFF) as u8
    }

    pub fn payload(self) -> u64 {
        self.0 & PAYLOAD_MASK
    }

    pub fn payload_u32(self) -> u32 {
        (self.payload() & 0xFFFF_FFFF) as u32
    }
}

/// Resolution context an unpack needs beyond the raw bytes: the token pool,
/// the STRINGS section's double-indirection table, the decoded path tree
/// (only needed for `PathVector`/path list-ops, so optional), and the
/// resource ceilings from [`Config`].
pub struct UnpackContext<'a> {
    pub tokens: &'a TokenTable,
    pub string_indices: &'a [Index],
    pub paths: Option<&'a PathTree>,
    pub config: &'a Config,
}

impl<'a> UnpackContext<'a> {
    fn token(&self, idx: Index) -> Result<Token> {
        self.tokens
            .get(idx)
            .ok_or_else(|| Error::corrupt("value", idx.0 as u64, "token index out of range"))
    }

    fn string(&self, idx: Index) -> Result<Token> {
        let token_index = *self
            .string_indices
            .get(idx.0 as usize)
            .ok_or_else(|| Error::corrupt("value", idx.0 as u64, "string index out of range"))?;
        self.token(token_index)
    }

    fn path(&self, idx: Index) -> Result<Path> {
        self.paths
            .and_then(|tree| tree.get(idx))
            .cloned()
            .ok_or_else(|| Error::corrupt("value", idx.0 as u64, "path index out of range"))
    }

    fn check_count(&self, count: u64) -> Result<()> {
        if count > self.config.max_elements {
            return Err(Error::LimitExceeded(format!(
                "array element count {count} exceeds limit {}",
                self.config.max_elements
            )));
        }
        Ok(())
    }
}

use usdc_value::CrateDataTypeId as T;

pub fn unpack(rep: ValueRepBits, reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Value> {
    let type_id = T::from_u8(rep.type_code()).ok_or_else(|| Error::UnsupportedType(rep.type_code()))?;

    if rep.is_array() {
        if rep.is_inlined() {
            return Err(Error::corrupt("value", 0, "array value cannot be inlined"));
        }
        let saved = reader.tell();
        reader.seek_set(rep.payload()).map_err(Error::from)?;
        let v = unpack_array(type_id, reader, ctx, rep.is_compressed());
        reader.seek_set(saved).map_err(Error::from)?;
        return v;
    }

    if rep.is_inlined() {
        return unpack_inlined(type_id, rep, ctx);
    }

    let saved = reader.tell();
    reader.seek_set(rep.payload()).map_err(Error::from)?;
    let v = unpack_offset(type_id, reader, ctx);
    reader.seek_set(saved).map_err(Error::from)?;
    v
}

fn unpack_inlined(type_id: T, rep: ValueRepBits, ctx: &UnpackContext<'_>) -> Result<Value> {
    let d = rep.payload_u32();
    Ok(match type_id {
        T::Bool => Value::Scalar(Scalar::Bool(d != 0)),
        T::UChar => Value::Scalar(Scalar::UChar(d as u8)),
        T::Int => Value::Scalar(Scalar::Int(d as i32)),
        T::UInt => Value::Scalar(Scalar::UInt(d)),
        T::Int64 => Value::Scalar(Scalar::Int64(d as i32 as i64)),
        T::UInt64 => Value::Scalar(Scalar::UInt64(d as u64)),
        T::Half => Value::Scalar(Scalar::Half(f16::from_bits(d as u16))),
        T::Float => Value::Scalar(Scalar::Float(f32::from_bits(d))),
        T::Double => Value::Scalar(Scalar::Double(f32::from_bits(d) as f64)),
        T::Token => Value::Scalar(Scalar::Tok(ctx.token(Index(d))?)),
        T::AssetPath => Value::Scalar(Scalar::AssetPath(ctx.token(Index(d))?.as_str().to_string())),
        T::String => Value::Scalar(Scalar::Str(ctx.string(Index(d))?.as_str().to_string())),

        T::Specifier => Value::Specifier(match d {
            0 => Specifier::Def,
            1 => Specifier::Over,
            2 => Specifier::Class,
            other => return Err(Error::InvalidSpecifier(other.to_string())),
        }),
        T::Permission => Value::Permission(match d {
            0 => Permission::Public,
            1 => Permission::Private,
            other => return Err(Error::corrupt("value", 0, format!("invalid permission ordinal {other}"))),
        }),
        T::Variability => Value::Variability(match d {
            0 => Variability::Varying,
            1 => Variability::Uniform,
            other => return Err(Error::corrupt("value", 0, format!("invalid variability ordinal {other}"))),
        }),

        T::Dictionary => Value::Dict(Dictionary::new()),
        T::ValueBlock => Value::Block,

        T::Matrix2d => diag_matrix2(&rep.payload().to_le_bytes()),
        T::Matrix3d => diag_matrix3(&rep.payload().to_le_bytes()),
        T::Matrix4d => diag_matrix4(&rep.payload().to_le_bytes()),

        T::Vec2i => Value::Scalar(Scalar::Vec2I(inline_vec2_i8(&rep))),
        T::Vec2h => Value::Scalar(Scalar::Vec2H(inline_vec2_h(&rep))),
        T::Vec2f => Value::Scalar(Scalar::Vec2F(inline_vec2_f(&rep))),
        T::Vec2d => Value::Scalar(Scalar::Vec2D(inline_vec2_d(&rep))),
        T::Vec3i => Value::Scalar(Scalar::Vec3I(inline_vec3_i8(&rep))),
        T::Vec3h => Value::Scalar(Scalar::Vec3H(inline_vec3_h(&rep))),
        T::Vec3f => Value::Scalar(Scalar::Vec3F(inline_vec3_f(&rep))),
        T::Vec3d => Value::Scalar(Scalar::Vec3D(inline_vec3_d(&rep))),
        T::Vec4i => Value::Scalar(Scalar::Vec4I(inline_vec4_i8(&rep))),
        T::Vec4h => Value::Scalar(Scalar::Vec4H(inline_vec4_h(&rep))),
        T::Vec4f => Value::Scalar(Scalar::Vec4F(inline_vec4_f(&rep))),
        T::Vec4d => Value::Scalar(Scalar::Vec4D(inline_vec4_d(&rep))),

        T::Point3h => Value::Scalar(Scalar::Point3H(inline_vec3_h(&rep))),
        T::Point3f => Value::Scalar(Scalar::Point3F(inline_vec3_f(&rep))),
        T::Point3d => Value::Scalar(Scalar::Point3D(inline_vec3_d(&rep))),
        T::Normal3h => Value::Scalar(Scalar::Normal3H(inline_vec3_h(&rep))),
        T::Normal3f => Value::Scalar(Scalar::Normal3F(inline_vec3_f(&rep))),
        T::Normal3d => Value::Scalar(Scalar::Normal3D(inline_vec3_d(&rep))),
        T::Vector3h => Value::Scalar(Scalar::Vector3H(inline_vec3_h(&rep))),
        T::Vector3f => Value::Scalar(Scalar::Vector3F(inline_vec3_f(&rep))),
        T::Vector3d => Value::Scalar(Scalar::Vector3D(inline_vec3_d(&rep))),
        T::Color3h => Value::Scalar(Scalar::Color3H(inline_vec3_h(&rep))),
        T::Color3f => Value::Scalar(Scalar::Color3F(inline_vec3_f(&rep))),
        T::Color3d => Value::Scalar(Scalar::Color3D(inline_vec3_d(&rep))),
        T::Color4h => Value::Scalar(Scalar::Color4H(inline_vec4_h(&rep))),
        T::Color4f => Value::Scalar(Scalar::Color4F(inline_vec4_f(&rep))),
        T::Color4d => Value::Scalar(Scalar::Color4D(inline_vec4_d(&rep))),
        T::TexCoord2h => Value::Scalar(Scalar::TexCoord2H(inline_vec2_h(&rep))),
        T::TexCoord2f => Value::Scalar(Scalar::TexCoord2F(inline_vec2_f(&rep))),
        T::TexCoord2d => Value::Scalar(Scalar::TexCoord2D(inline_vec2_d(&rep))),
        T::TexCoord3h => Value::Scalar(Scalar::TexCoord3H(inline_vec3_h(&rep))),
        T::TexCoord3f => Value::Scalar(Scalar::TexCoord3F(inline_vec3_f(&rep))),
        T::TexCoord3d => Value::Scalar(Scalar::TexCoord3D(inline_vec3_d(&rep))),
        T::Frame4d => diag_matrix4_frame(&rep.payload().to_le_bytes()),
        T::TimeCode => Value::Scalar(Scalar::TimeCode(f32::from_bits(d) as f64)),

        T::Quatd | T::Quatf | T::Quath => {
            return Err(Error::corrupt("value", 0, "quaternion types may not appear inlined"))
        }
        T::TokenListOp
        | T::StringListOp
        | T::PathListOp
        | T::ReferenceListOp
        | T::IntListOp
        | T::Int64ListOp
        | T::UIntListOp
        | T::UInt64ListOp
        | T::PayloadListOp
        | T::UnregisteredValueListOp
        | T::TimeSamples
        | T::UnregisteredValue => {
            return Err(Error::corrupt(
                "value",
                0,
                "list-op / time-samples / unregistered-value types may not appear inlined",
            ))
        }
        other => return Err(Error::UnsupportedType(other as u8)),
    })
}

fn i8_at(rep: &ValueRepBits, i: usize) -> i8 {
    rep.payload().to_le_bytes()[i] as i8
}

fn inline_vec2_i8(rep: &ValueRepBits) -> Vec2<i32> {
    Vec2(i8_at(rep, 0) as i32, i8_at(rep, 1) as i32)
}
fn inline_vec3_i8(rep: &ValueRepBits) -> Vec3<i32> {
    Vec3(i8_at(rep, 0) as i32, i8_at(rep, 1) as i32, i8_at(rep, 2) as i32)
}
fn inline_vec4_i8(rep: &ValueRepBits) -> Vec4<i32> {
    Vec4(
        i8_at(rep, 0) as i32,
        i8_at(rep, 1) as i32,
        i8_at(rep, 2) as i32,
        i8_at(rep, 3) as i32,
    )
}
fn inline_vec2_h(rep: &ValueRepBits) -> Vec2<f16> {
    Vec2(f16::from_f32(i8_at(rep, 0) as f32), f16::from_f32(i8_at(rep, 1) as f32))
}
fn inline_vec3_h(rep: &ValueRepBits) -> Vec3<f16> {
    Vec3(
        f16::from_f32(i8_at(rep, 0) as f32),
        f16::from_f32(i8_at(rep, 1) as f32),
        f16::from_f32(i8_at(rep, 2) as f32),
    )
}
fn inline_vec4_h(rep: &ValueRepBits) -> Vec4<f16> {
    Vec4(
        f16::from_f32(i8_at(rep, 0) as f32),
        f16::from_f32(i8_at(rep, 1) as f32),
        f16::from_f32(i8_at(rep, 2) as f32),
        f16::from_f32(i8_at(rep, 3) as f32),
    )
}
fn inline_vec2_f(rep: &ValueRepBits) -> Vec2<f32> {
    Vec2(i8_at(rep, 0) as f32, i8_at(rep, 1) as f32)
}
fn inline_vec3_f(rep: &ValueRepBits) -> Vec3<f32> {
    Vec3(i8_at(rep, 0) as f32, i8_at(rep, 1) as f32, i8_at(rep, 2) as f32)
}
fn inline_vec4_f(rep: &ValueRepBits) -> Vec4<f32> {
    Vec4(
        i8_at(rep, 0) as f32,
        i8_at(rep, 1) as f32,
        i8_at(rep, 2) as f32,
        i8_at(rep, 3) as f32,
    )
}
fn inline_vec2_d(rep: &ValueRepBits) -> Vec2<f64> {
    Vec2(i8_at(rep, 0) as f64, i8_at(rep, 1) as f64)
}
fn inline_vec3_d(rep: &ValueRepBits) -> Vec3<f64> {
    Vec3(i8_at(rep, 0) as f64, i8_at(rep, 1) as f64, i8_at(rep, 2) as f64)
}
fn inline_vec4_d(rep: &ValueRepBits) -> Vec4<f64> {
    Vec4(
        i8_at(rep, 0) as f64,
        i8_at(rep, 1) as f64,
        i8_at(rep, 2) as f64,
        i8_at(rep, 3) as f64,
    )
}

fn diag_matrix2(bytes: &[u8; 8]) -> Value {
    let mut m = [0.0f64; 4];
    m[0] = bytes[0] as i8 as f64;
    m[3] = bytes[1] as i8 as f64;
    Value::Scalar(Scalar::Matrix2d(Matrix2d(m)))
}
fn diag_matrix3(bytes: &[u8; 8]) -> Value {
    let mut m = [0.0f64; 9];
    m[0] = bytes[0] as i8 as f64;
    m[4] = bytes[1] as i8 as f64;
    m[8] = bytes[2] as i8 as f64;
    Value::Scalar(Scalar::Matrix3d(Matrix3d(m)))
}
fn diag_matrix4(bytes: &[u8; 8]) -> Value {
    let mut m = [0.0f64; 16];
    m[0] = bytes[0] as i8 as f64;
    m[5] = bytes[1] as i8 as f64;
    m[10] = bytes[2] as i8 as f64;
    m[15] = bytes[3] as i8 as f64;
    Value::Scalar(Scalar::Matrix4d(Matrix4d(m)))
}
fn diag_matrix4_frame(bytes: &[u8; 8]) -> Value {
    let mut m = [0.0f64; 16];
    m[0] = bytes[0] as i8 as f64;
    m[5] = bytes[1] as i8 as f64;
    m[10] = bytes[2] as i8 as f64;
    m[15] = bytes[3] as i8 as f64;
    Value::Scalar(Scalar::Frame4D(Matrix4d(m)))
}

fn read_count(reader: &mut ByteReader<'_>) -> Result<u64> {
    reader.read_u64().map_err(Error::from)
}

fn read_compressed_u32(reader: &mut ByteReader<'_>, n: usize) -> Result<Vec<u32>> {
    let len = reader.read_u64().map_err(Error::from)? as usize;
    let bytes = reader.read_bytes(len).map_err(Error::from)?;
    usdc_codec::intcomp::decompress_u32(&bytes, n).map_err(Error::from)
}

fn read_compressed_u64(reader: &mut ByteReader<'_>, n: usize) -> Result<Vec<u64>> {
    let len = reader.read_u64().map_err(Error::from)? as usize;
    let bytes = reader.read_bytes(len).map_err(Error::from)?;
    usdc_codec::intcomp::decompress_u64(&bytes, n).map_err(Error::from)
}

fn unpack_array(
    type_id: T,
    reader: &mut ByteReader<'_>,
    ctx: &UnpackContext<'_>,
    is_compressed: bool,
) -> Result<Value> {
    match type_id {
        T::Token | T::AssetPath | T::String => {
            let count = read_count(reader)?;
            ctx.check_count(count)?;
            let mut toks = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let idx = Index(reader.read_u32().map_err(Error::from)?);
                toks.push(match type_id {
                    T::String => ctx.string(idx)?,
                    _ => ctx.token(idx)?,
                });
            }
            Ok(match type_id {
                T::Token => Value::TokenVector(toks),
                T::String => Value::StringVector(toks.into_iter().map(|t| t.as_str().to_string()).collect()),
                T::AssetPath => {
                    Value::Array(ArrayValue::AssetPath(toks.into_iter().map(|t| t.as_str().to_string()).collect()))
                }
                _ => unreachable!(),
            })
        }

        T::Bool | T::UChar | T::Int | T::UInt | T::Int64 | T::UInt64 => {
            unpack_int_array(type_id, reader, ctx, is_compressed)
        }

        T::Half | T::Float | T::Double => unpack_real_array(type_id, reader, ctx, is_compressed),

        T::Vec2i | T::Vec2h | T::Vec2f | T::Vec2d | T::Vec3i | T::Vec3h | T::Vec3f | T::Vec3d
        | T::Vec4i | T::Vec4h | T::Vec4f | T::Vec4d | T::Matrix2d | T::Matrix3d | T::Matrix4d
        | T::Quatd | T::Quatf | T::Quath | T::Point3h | T::Point3f | T::Point3d | T::Normal3h
        | T::Normal3f | T::Normal3d | T::Vector3h | T::Vector3f | T::Vector3d | T::Color3h
        | T::Color3f | T::Color3d | T::Color4h | T::Color4f | T::Color4d | T::Frame4d
        | T::TexCoord2h | T::TexCoord2f | T::TexCoord2d | T::TexCoord3h | T::TexCoord3f
        | T::TexCoord3d => {
            if is_compressed {
                return Err(Error::corrupt(
                    "value",
                    reader.tell(),
                    "POD vector/matrix/quat arrays are never compressed",
                ));
            }
            unpack_pod_array(type_id, reader)
        }

        other => Err(Error::UnsupportedType(other as u8)),
    }
}

fn unpack_int_array(
    type_id: T,
    reader: &mut ByteReader<'_>,
    ctx: &UnpackContext<'_>,
    is_compressed: bool,
) -> Result<Value> {
    let count = read_count(reader)?;
    ctx.check_count(count)?;
    let n = count as usize;

    Ok(match type_id {
        T::Bool => {
            let bits: Vec<u32> = if is_compressed {
                read_compressed_u32(reader, n)?
            } else {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_u8().map_err(Error::from)? as u32);
                }
                out
            };
            Value::Array(ArrayValue::Bool(bits.into_iter().map(|v| v != 0).collect()))
        }
        T::UChar => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(reader.read_u8().map_err(Error::from)?);
            }
            Value::Array(ArrayValue::UChar(out))
        }
        T::Int => {
            let vals: Vec<u32> = if is_compressed {
                read_compressed_u32(reader, n)?
            } else {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_u32().map_err(Error::from)?);
                }
                out
            };
            Value::Array(ArrayValue::Int(vals.into_iter().map(|v| v as i32).collect()))
        }
        T::UInt => {
            let vals: Vec<u32> = if is_compressed {
                read_compressed_u32(reader, n)?
            } else {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_u32().map_err(Error::from)?);
                }
                out
            };
            Value::Array(ArrayValue::UInt(vals))
        }
        T::Int64 => {
            let vals: Vec<u64> = if is_compressed {
                read_compressed_u64(reader, n)?
            } else {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_u64().map_err(Error::from)?);
                }
                out
            };
            Value::Array(ArrayValue::Int64(vals.into_iter().map(|v| v as i64).collect()))
        }
        T::UInt64 => {
            let vals: Vec<u64> = if is_compressed {
                read_compressed_u64(reader, n)?
            } else {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_u64().map_err(Error::from)?);
                }
                out
            };
            Value::Array(ArrayValue::UInt64(vals))
        }
        _ => unreachable!(),
    })
}

fn unpack_real_array(
    type_id: T,
    reader: &mut ByteReader<'_>,
    ctx: &UnpackContext<'_>,
    is_compressed: bool,
) -> Result<Value> {
    let count = read_count(reader)?;
    ctx.check_count(count)?;
    let n = count as usize;

    if !is_compressed || count < MIN_COMPRESSED_ARRAY_SIZE {
        return Ok(match type_id {
            T::Half => {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(f16::from_bits(reader.read_u16().map_err(Error::from)?));
                }
                Value::Array(ArrayValue::Half(out))
            }
            T::Float => {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_f32().map_err(Error::from)?);
                }
                Value::Array(ArrayValue::Float(out))
            }
            T::Double => {
                let mut out = Vec::with_capacity(n);
                for _ in 0..n {
                    out.push(reader.read_f64().map_err(Error::from)?);
                }
                Value::Array(ArrayValue::Double(out))
            }
            _ => unreachable!(),
        });
    }

    let code = reader.read_u8().map_err(Error::from)?;
    match code {
        b'i' => {
            let ints = read_compressed_u32(reader, n)?;
            Ok(match type_id {
                T::Half => Value::Array(ArrayValue::Half(
                    ints.into_iter().map(|v| f16::from_f32(v as i32 as f32)).collect(),
                )),
                T::Float => {
                    Value::Array(ArrayValue::Float(ints.into_iter().map(|v| v as i32 as f32).collect()))
                }
                T::Double => {
                    Value::Array(ArrayValue::Double(ints.into_iter().map(|v| v as i32 as f64).collect()))
                }
                _ => unreachable!(),
            })
        }
        b't' => {
            let lut_size = reader.read_u32().map_err(Error::from)?;
            let lut: Vec<f64> = match type_id {
                T::Half => (0..lut_size)
                    .map(|_| reader.read_u16().map(|b| f16::from_bits(b).to_f64()))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(Error::from)?,
                T::Float => (0..lut_size)
                    .map(|_| reader.read_f32().map(|v| v as f64))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(Error::from)?,
                T::Double => (0..lut_size)
                    .map(|_| reader.read_f64())
                    .collect::<std::result::Result<_, _>>()
                    .map_err(Error::from)?,
                _ => unreachable!(),
            };
            let indexes = read_compressed_u32(reader, n)?;
            let gathered: Vec<f64> = indexes
                .iter()
                .map(|&i| {
                    lut.get(i as usize).copied().ok_or_else(|| {
                        Error::corrupt("value", reader.tell(), "lut index out of range")
                    })
                })
                .collect::<Result<_>>()?;
            Ok(match type_id {
                T::Half => Value::Array(ArrayValue::Half(
                    gathered.into_iter().map(f16::from_f64).collect(),
                )),
                T::Float => Value::Array(ArrayValue::Float(gathered.into_iter().map(|v| v as f32).collect())),
                T::Double => Value::Array(ArrayValue::Double(gathered)),
                _ => unreachable!(),
            })
        }
        _ => Err(Error::corrupt("value", reader.tell(), "invalid compressed real-array code")),
    }
}

fn half_from_reader(reader: &mut ByteReader<'_>) -> Result<f16> {
    Ok(f16::from_bits(reader.read_u16().map_err(Error::from)?))
}

fn read_quat<V: Copy>(
    reader: &mut ByteReader<'_>,
    read: fn(&mut ByteReader<'_>) -> usdc_codec::Result<V>,
) -> Result<Quat<V>> {
    let real = read(reader).map_err(Error::from)?;
    let x = read(reader).map_err(Error::from)?;
    let y = read(reader).map_err(Error::from)?;
    let z = read(reader).map_err(Error::from)?;
    Ok(Quat {
        real,
        imaginary: Vec3(x, y, z),
    })
}

fn read_f64_field(r: &mut ByteReader<'_>) -> usdc_codec::Result<f64> {
    r.read_f64()
}
fn read_f32_field(r: &mut ByteReader<'_>) -> usdc_codec::Result<f32> {
    r.read_f32()
}

fn read_quat_half(reader: &mut ByteReader<'_>) -> Result<Quat<f16>> {
    Ok(Quat {
        real: half_from_reader(reader)?,
        imaginary: Vec3(half_from_reader(reader)?, half_from_reader(reader)?, half_from_reader(reader)?),
    })
}

fn unpack_pod_array(type_id: T, reader: &mut ByteReader<'_>) -> Result<Value> {
    let count = read_count(reader)?;
    let n = count as usize;

    macro_rules! vec2 {
        ($read:expr) => {{
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(Vec2($read(reader)?, $read(reader)?));
            }
            out
        }};
    }
    macro_rules! vec3 {
        ($read:expr) => {{
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(Vec3($read(reader)?, $read(reader)?, $read(reader)?));
            }
            out
        }};
    }
    macro_rules! vec4 {
        ($read:expr) => {{
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(Vec4($read(reader)?, $read(reader)?, $read(reader)?, $read(reader)?));
            }
            out
        }};
    }

    fn rf32(r: &mut ByteReader<'_>) -> Result<f32> {
        r.read_f32().map_err(Error::from)
    }
    fn rf64(r: &mut ByteReader<'_>) -> Result<f64> {
        r.read_f64().map_err(Error::from)
    }
    fn ri32(r: &mut ByteReader<'_>) -> Result<i32> {
        r.read_i32().map_err(Error::from)
    }

    Ok(match type_id {
        T::Vec2i => Value::Array(ArrayValue::Vec2I(vec2!(ri32))),
        T::Vec2f => Value::Array(ArrayValue::Vec2F(vec2!(rf32))),
        T::Vec2d => Value::Array(ArrayValue::Vec2D(vec2!(rf64))),
        T::Vec2h => Value::Array(ArrayValue::Vec2H(vec2!(half_from_reader))),
        T::Vec3i => Value::Array(ArrayValue::Vec3I(vec3!(ri32))),
        T::Vec3f => Value::Array(ArrayValue::Vec3F(vec3!(rf32))),
        T::Vec3d => Value::Array(ArrayValue::Vec3D(vec3!(rf64))),
        T::Vec3h => Value::Array(ArrayValue::Vec3H(vec3!(half_from_reader))),
        T::Vec4i => Value::Array(ArrayValue::Vec4I(vec4!(ri32))),
        T::Vec4f => Value::Array(ArrayValue::Vec4F(vec4!(rf32))),
        T::Vec4d => Value::Array(ArrayValue::Vec4D(vec4!(rf64))),
        T::Vec4h => Value::Array(ArrayValue::Vec4H(vec4!(half_from_reader))),
        T::Point3f => Value::Array(ArrayValue::Point3F(vec3!(rf32))),
        T::Point3d => Value::Array(ArrayValue::Point3D(vec3!(rf64))),
        T::Point3h => Value::Array(ArrayValue::Point3H(vec3!(half_from_reader))),
        T::Normal3f => Value::Array(ArrayValue::Normal3F(vec3!(rf32))),
        T::Normal3d => Value::Array(ArrayValue::Normal3D(vec3!(rf64))),
        T::Normal3h => Value::Array(ArrayValue::Normal3H(vec3!(half_from_reader))),
        T::Vector3f => Value::Array(ArrayValue::Vector3F(vec3!(rf32))),
        T::Vector3d => Value::Array(ArrayValue::Vector3D(vec3!(rf64))),
        T::Vector3h => Value::Array(ArrayValue::Vector3H(vec3!(half_from_reader))),
        T::Color3f => Value::Array(ArrayValue::Color3F(vec3!(rf32))),
        T::Color3d => Value::Array(ArrayValue::Color3D(vec3!(rf64))),
        T::Color3h => Value::Array(ArrayValue::Color3H(vec3!(half_from_reader))),
        T::Color4f => Value::Array(ArrayValue::Color4F(vec4!(rf32))),
        T::Color4d => Value::Array(ArrayValue::Color4D(vec4!(rf64))),
        T::Color4h => Value::Array(ArrayValue::Color4H(vec4!(half_from_reader))),
        T::TexCoord2f => Value::Array(ArrayValue::TexCoord2F(vec2!(rf32))),
        T::TexCoord2d => Value::Array(ArrayValue::TexCoord2D(vec2!(rf64))),
        T::TexCoord2h => Value::Array(ArrayValue::TexCoord2H(vec2!(half_from_reader))),
        T::TexCoord3f => Value::Array(ArrayValue::TexCoord3F(vec3!(rf32))),
        T::TexCoord3d => Value::Array(ArrayValue::TexCoord3D(vec3!(rf64))),
        T::TexCoord3h => Value::Array(ArrayValue::TexCoord3H(vec3!(half_from_reader))),
        T::Matrix2d => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                let mut m = [0.0f64; 4];
                for slot in m.iter_mut() {
                    *slot = rf64(reader)?;
                }
                out.push(Matrix2d(m));
            }
            Value::Array(ArrayValue::Matrix2d(out))
        }
        T::Matrix3d => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                let mut m = [0.0f64; 9];
                for slot in m.iter_mut() {
                    *slot = rf64(reader)?;
                }
                out.push(Matrix3d(m));
            }
            Value::Array(ArrayValue::Matrix3d(out))
        }
        T::Matrix4d | T::Frame4d => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                let mut m = [0.0f64; 16];
                for slot in m.iter_mut() {
                    *slot = rf64(reader)?;
                }
                out.push(Matrix4d(m));
            }
            if type_id == T::Frame4d {
                Value::Array(ArrayValue::Frame4D(out))
            } else {
                Value::Array(ArrayValue::Matrix4d(out))
            }
        }
        T::Quatd => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(read_quat(reader, read_f64_field)?);
            }
            Value::Array(ArrayValue::QuatD(out))
        }
        T::Quatf => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(read_quat(reader, read_f32_field)?);
            }
            Value::Array(ArrayValue::QuatF(out))
        }
        T::Quath => {
            let mut out = Vec::with_capacity(n);
            for _ in 0..n {
                out.push(read_quat_half(reader)?);
            }
            Value::Array(ArrayValue::QuatH(out))
        }
        other => return Err(Error::UnsupportedType(other as u8)),
    })
}

fn unpack_offset(type_id: T, reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Value> {
    match type_id {
        T::Dictionary => unpack_dictionary(reader, ctx),
        T::VariantSelectionMap => unpack_variant_selection_map(reader, ctx),
        T::TimeSamples => unpack_time_samples(reader, ctx),
        T::TokenListOp => unpack_list_op_tokens(reader, ctx).map(Value::ListOpToken),
        T::StringListOp => unpack_list_op_strings(reader, ctx).map(Value::ListOpString),
        T::PathListOp => unpack_list_op_paths(reader, ctx).map(Value::ListOpPath),
        T::PathVector => unpack_path_index_vector(reader, ctx).map(Value::PathVector),
        T::TokenVector => unpack_index_vector(reader, ctx).map(Value::TokenVector),
        T::StringVector => unpack_index_vector(reader, ctx)
            .map(|toks| Value::StringVector(toks.into_iter().map(|t| t.as_str().to_string()).collect())),
        T::Quatd => Ok(Value::Scalar(Scalar::QuatD(read_quat(reader, read_f64_field)?))),
        T::Quatf => Ok(Value::Scalar(Scalar::QuatF(read_quat(reader, read_f32_field)?))),
        T::Quath => Ok(Value::Scalar(Scalar::QuatH(read_quat_half(reader)?))),
        _ => Err(Error::UnsupportedType(type_id as u8)),
    }
}

fn unpack_index_vector(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Vec<Token>> {
    let count = read_count(reader)?;
    ctx.check_count(count)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let idx = Index(reader.read_u32().map_err(Error::from)?);
        out.push(ctx.token(idx)?);
    }
    Ok(out)
}

fn unpack_path_index_vector(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Vec<Path>> {
    let count = read_count(reader)?;
    ctx.check_count(count)?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let idx = Index(reader.read_u32().map_err(Error::from)?);
        out.push(ctx.path(idx)?);
    }
    Ok(out)
}

fn unpack_dictionary(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Value> {
    let count = read_count(reader)?;
    if count > ctx.config.max_dict_elements {
        return Err(Error::LimitExceeded(format!(
            "dictionary element count {count} exceeds limit {}",
            ctx.config.max_dict_elements
        )));
    }

    let mut dict = Dictionary::new();
    for _ in 0..count {
        let key_index = Index(reader.read_u32().map_err(Error::from)?);
        let key = ctx.string(key_index)?.as_str().to_string();

        let rel_offset_pos = reader.tell();
        let rel_offset = reader.read_i64().map_err(Error::from)?;

        let rep_bits = reader.read_u64().map_err(Error::from)?;
        let rep = ValueRepBits(rep_bits);

        let value = unpack(rep, reader, ctx)?;
        dict.insert(key, value);

        reader
            .seek_set((rel_offset_pos as i64 + rel_offset) as u64)
            .map_err(Error::from)?;
    }

    Ok(Value::Dict(dict))
}

fn unpack_variant_selection_map(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Value> {
    let count = read_count(reader)?;
    ctx.check_count(count)?;

    let mut map = indexmap::IndexMap::new();
    for _ in 0..count {
        let key_index = Index(reader.read_u32().map_err(Error::from)?);
        let key = ctx.string(key_index)?.as_str().to_string();
        let value_index = Index(reader.read_u32().map_err(Error::from)?);
        let value = ctx.string(value_index)?.as_str().to_string();
        map.insert(key, value);
    }

    Ok(Value::VariantSelectionMap(map))
}

fn unpack_time_samples(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<Value> {
    let header_pos = reader.tell();
    let rel_offset_to_times = reader.read_i64().map_err(Error::from)?;
    reader
        .seek_set((header_pos as i64 + rel_offset_to_times) as u64)
        .map_err(Error::from)?;

    let times_rep = ValueRepBits(reader.read_u64().map_err(Error::from)?);
    let times_value = unpack(times_rep, reader, ctx)?;
    let times: Vec<f64> = match times_value {
        Value::Array(ArrayValue::Double(v)) => v,
        Value::Array(ArrayValue::Float(v)) => v.into_iter().map(|f| f as f64).collect(),
        other => {
            return Err(Error::corrupt(
                "timesamples",
                reader.tell(),
                format!("times must decode to double[], got {other:?}"),
            ))
        }
    };

    reader.seek_set(header_pos + 8).map_err(Error::from)?;
    let values_header_pos = reader.tell();
    let rel_offset_to_values = reader.read_i64().map_err(Error::from)?;
    reader
        .seek_set((values_header_pos as i64 + rel_offset_to_values) as u64)
        .map_err(Error::from)?;

    let num_values = reader.read_u64().map_err(Error::from)?;
    if num_values as usize != times.len() {
        return Err(Error::corrupt(
            "timesamples",
            reader.tell(),
            "numValues does not match times.len()",
        ));
    }

    let mut values = Vec::with_capacity(num_values as usize);
    let reps_table_start = reader.tell();
    for i in 0..num_values {
        let slot = reps_table_start + i * 8;
        reader.seek_set(slot).map_err(Error::from)?;
        let rep = ValueRepBits(reader.read_u64().map_err(Error::from)?);
        let v = unpack(rep, reader, ctx)?;
        values.push(v);
    }
    reader
        .seek_set(reps_table_start + num_values * 8)
        .map_err(Error::from)?;

    Ok(Value::TimeSamples(TimeSamples::from_parts(times, values)))
}

const HAS_EXPLICIT: u8 = 1 << 0;
const IS_EXPLICIT: u8 = 1 << 1;
const HAS_ADDED: u8 = 1 << 2;
const HAS_PREPENDED: u8 = 1 << 3;
const HAS_APPENDED: u8 = 1 << 4;
const HAS_DELETED: u8 = 1 << 5;
const HAS_ORDERED: u8 = 1 << 6;

fn unpack_list_op_tokens(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<ListOp<Token>> {
    let header = reader.read_u8().map_err(Error::from)?;
    let mut op = ListOp::new();
    if header & IS_EXPLICIT != 0 {
        op.is_explicit = true;
    }

    for (flag, qual) in [
        (HAS_EXPLICIT, ListEditQual::Explicit),
        (HAS_ADDED, ListEditQual::Added),
        (HAS_PREPENDED, ListEditQual::Prepended),
        (HAS_APPENDED, ListEditQual::Appended),
        (HAS_DELETED, ListEditQual::Deleted),
        (HAS_ORDERED, ListEditQual::Ordered),
    ] {
        if header & flag != 0 {
            let items = unpack_index_vector(reader, ctx)?;
            *op.bucket_mut(qual) = items;
        }
    }
    Ok(op)
}

fn unpack_list_op_strings(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<ListOp<String>> {
    let toks = unpack_list_op_tokens(reader, ctx)?;
    Ok(ListOp {
        is_explicit: toks.is_explicit,
        explicit: toks.explicit.into_iter().map(|t| t.as_str().to_string()).collect(),
        added: toks.added.into_iter().map(|t| t.as_str().to_string()).collect(),
        prepended: toks.prepended.into_iter().map(|t| t.as_str().to_string()).collect(),
        appended: toks.appended.into_iter().map(|t| t.as_str().to_string()).collect(),
        deleted: toks.deleted.into_iter().map(|t| t.as_str().to_string()).collect(),
        ordered: toks.ordered.into_iter().map(|t| t.as_str().to_string()).collect(),
    })
}

fn unpack_list_op_paths(reader: &mut ByteReader<'_>, ctx: &UnpackContext<'_>) -> Result<ListOp<Path>> {
    let header = reader.read_u8().map_err(Error::from)?;
    let mut op = ListOp::new();
    if header & IS_EXPLICIT != 0 {
        op.is_explicit = true;
    }

    for (flag, qual) in [
        (HAS_EXPLICIT, ListEditQual::Explicit),
        (HAS_ADDED, ListEditQual::Added),
        (HAS_PREPENDED, ListEditQual::Prepended),
        (HAS_APPENDED, ListEditQual::Appended),
        (HAS_DELETED, ListEditQual::Deleted),
        (HAS_ORDERED, ListEditQual::Ordered),
    ] {
        if header & flag != 0 {
            let items = unpack_path_index_vector(reader, ctx)?;
            *op.bucket_mut(qual) = items;
        }
    }
    Ok(op)
}
