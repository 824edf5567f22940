//! `typeName` string parsing: maps an `SdfValueTypeName`-style string
//! (`"float3"`, `"point3f[]"`, `"token"`, ...) to the `CrateDataTypeId` it
//! names, plus whether it is an array form. Used for role up-casting
//! (§4.4.6) and for validating an attribute's declared type against its
//! stored value.

use usdc_value::CrateDataTypeId as T;

pub fn parse_type_name(name: &str) -> Option<(T, bool)> {
    let (base, is_array) = match name.strip_suffix("[]") {
        Some(base) => (base, true),
        None => (name, false),
    };

    let id = match base {
        "bool" => T::Bool,
        "uchar" | "uint8" => T::UChar,
        "int" => T::Int,
        "uint" => T::UInt,
        "int64" => T::Int64,
        "uint64" => T::UInt64,
        "half" => T::Half,
        "float" => T::Float,
        "double" => T::Double,
        "timecode" => T::TimeCode,
        "string" => T::String,
        "token" => T::Token,
        "asset" => T::AssetPath,

        "matrix2d" => T::Matrix2d,
        "matrix3d" => T::Matrix3d,
        "matrix4d" => T::Matrix4d,
        "frame4d" => T::Frame4d,

        "quath" => T::Quath,
        "quatf" => T::Quatf,
        "quatd" => T::Quatd,

        "half2" => T::Vec2h,
        "half3" => T::Vec3h,
        "half4" => T::Vec4h,
        "float2" => T::Vec2f,
        "float3" => T::Vec3f,
        "float4" => T::Vec4f,
        "double2" => T::Vec2d,
        "double3" => T::Vec3d,
        "double4" => T::Vec4d,
        "int2" => T::Vec2i,
        "int3" => T::Vec3i,
        "int4" => T::Vec4i,

        "point3h" => T::Point3h,
        "point3f" => T::Point3f,
        "point3d" => T::Point3d,
        "normal3h" => T::Normal3h,
        "normal3f" => T::Normal3f,
        "normal3d" => T::Normal3d,
        "vector3h" => T::Vector3h,
        "vector3f" => T::Vector3f,
        "vector3d" => T::Vector3d,
        "color3h" => T::Color3h,
        "color3f" => T::Color3f,
        "color3d" => T::Color3d,
        "color4h" => T::Color4h,
        "color4f" => T::Color4f,
        "color4d" => T::Color4d,
        "texCoord2h" => T::TexCoord2h,
        "texCoord2f" => T::TexCoord2f,
        "texCoord2d" => T::TexCoord2d,
        "texCoord3h" => T::TexCoord3h,
        "texCoord3f" => T::TexCoord3f,
        "texCoord3d" => T::TexCoord3d,

        _ => return None,
    };

    Some((id, is_array))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_and_array_forms() {
        assert_eq!(parse_type_name("float"), Some((T::Float, false)));
        assert_eq!(parse_type_name("float3[]"), Some((T::Vec3f, true)));
        assert_eq!(parse_type_name("point3f"), Some((T::Point3f, false)));
        assert_eq!(parse_type_name("token"), Some((T::Token, false)));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(parse_type_name("nonsense"), None);
    }
}
