//! The closed set of `CrateDataTypeId` codes stored in bits 48-55 of a
//! `ValueRep`. Reproduced verbatim against the reference implementation's
//! type table rather than the illustrative subset, so role up-casting and
//! `tryGet` stay total over every value the wire format can carry.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CrateDataTypeId {
    Invalid = 0,
    Bool = 1,
    UChar = 2,
    Int = 3,
    UInt = 4,
    Int64 = 5,
    UInt64 = 6,
    Half = 7,
    Float = 8,
    Double = 9,
    String = 10,
    Token = 11,
    AssetPath = 12,
    Matrix2d = 13,
    Matrix3d = 14,
    Matrix4d = 15,
    Quatd = 16,
    Quatf = 17,
    Quath = 18,
    Vec2d = 19,
    Vec2f = 20,
    Vec2h = 21,
    Vec2i = 22,
    Vec3d = 23,
    Vec3f = 24,
    Vec3h = 25,
    Vec3i = 26,
    Vec4d = 27,
    Vec4f = 28,
    Vec4h = 29,
    Vec4i = 30,
    Dictionary = 31,
    TokenListOp = 32,
    StringListOp = 33,
    PathListOp = 34,
    ReferenceListOp = 35,
    IntListOp = 36,
    Int64ListOp = 37,
    UIntListOp = 38,
    UInt64ListOp = 39,
    PathVector = 40,
    TokenVector = 41,
    Specifier = 42,
    Permission = 43,
    Variability = 44,
    VariantSelectionMap = 45,
    TimeSamples = 46,
    Payload = 47,
    DoubleVector = 48,
    LayerOffsetVector = 49,
    StringVector = 50,
    ValueBlock = 51,
    UnregisteredValue = 52,
    UnregisteredValueListOp = 53,
    PayloadListOp = 54,
    TimeCode = 55,
    Point3h = 56,
    Point3f = 57,
    Point3d = 58,
    Normal3h = 59,
    Normal3f = 60,
    Normal3d = 61,
    Vector3h = 62,
    Vector3f = 63,
    Vector3d = 64,
    Color3h = 65,
    Color3f = 66,
    Color3d = 67,
    Color4h = 68,
    Color4f = 69,
    Color4d = 70,
    Frame4d = 71,
    TexCoord2h = 72,
    TexCoord2f = 73,
    TexCoord2d = 74,
    TexCoord3h = 75,
    TexCoord3f = 76,
    TexCoord3d = 77,
}

impl CrateDataTypeId {
    pub fn from_u8(code: u8) -> Option<Self> {
        use CrateDataTypeId::*;
        const TABLE: &[CrateDataTypeId] = &[
            Invalid,
            Bool,
            UChar,
            Int,
            UInt,
            Int64,
            UInt64,
            Half,
            Float,
            Double,
            String,
            Token,
            AssetPath,
            Matrix2d,
            Matrix3d,
            Matrix4d,
            Quatd,
            Quatf,
            Quath,
            Vec2d,
            Vec2f,
            Vec2h,
            Vec2i,
            Vec3d,
            Vec3f,
            Vec3h,
            Vec3i,
            Vec4d,
            Vec4f,
            Vec4h,
            Vec4i,
            Dictionary,
            TokenListOp,
            StringListOp,
            PathListOp,
            ReferenceListOp,
            IntListOp,
            Int64ListOp,
            UIntListOp,
            UInt64ListOp,
            PathVector,
            TokenVector,
            Specifier,
            Permission,
            Variability,
            VariantSelectionMap,
            TimeSamples,
            Payload,
            DoubleVector,
            LayerOffsetVector,
            StringVector,
            ValueBlock,
            UnregisteredValue,
            UnregisteredValueListOp,
            PayloadListOp,
            TimeCode,
            Point3h,
            Point3f,
            Point3d,
            Normal3h,
            Normal3f,
            Normal3d,
            Vector3h,
            Vector3f,
            Vector3d,
            Color3h,
            Color3f,
            Color3d,
            Color4h,
            Color4f,
            Color4d,
            Frame4d,
            TexCoord2h,
            TexCoord2f,
            TexCoord2d,
            TexCoord3h,
            TexCoord3f,
            TexCoord3d,
        ];
        TABLE.get(code as usize).copied()
    }

    /// The POD type this role type reinterprets as, or itself if it is
    /// already a POD/container type. Role up-casting (§4.4.6) relies on
    /// this mapping matching the reference table exactly.
    pub fn underlying(self) -> CrateDataTypeId {
        use CrateDataTypeId::*;
        match self {
            Point3h | Normal3h | Vector3h => Vec3h,
            Point3f | Normal3f | Vector3f => Vec3f,
            Point3d | Normal3d | Vector3d => Vec3d,
            Color3h => Vec3h,
            Color3f => Vec3f,
            Color3d => Vec3d,
            Color4h => Vec4h,
            Color4f => Vec4f,
            Color4d => Vec4d,
            Frame4d => Matrix4d,
            TexCoord2h => Vec2h,
            TexCoord2f => Vec2f,
            TexCoord2d => Vec2d,
            TexCoord3h => Vec3h,
            TexCoord3f => Vec3f,
            TexCoord3d => Vec3d,
            TimeCode => Double,
            AssetPath => String,
            other => other,
        }
    }

    pub fn is_role(self) -> bool {
        self.underlying() != self
    }
}

impl fmt::Display for CrateDataTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_code() {
        for code in 0u8..=77 {
            let id = CrateDataTypeId::from_u8(code).expect("known code");
            assert_eq!(id as u8, code);
        }
    }

    #[test]
    fn unknown_code_is_none() {
        assert!(CrateDataTypeId::from_u8(200).is_none());
    }

    #[test]
    fn role_types_reinterpret_to_pod() {
        assert_eq!(CrateDataTypeId::Point3f.underlying(), CrateDataTypeId::Vec3f);
        assert_eq!(CrateDataTypeId::Frame4d.underlying(), CrateDataTypeId::Matrix4d);
        assert!(!CrateDataTypeId::Vec3f.is_role());
        assert!(CrateDataTypeId::Point3f.is_role());
    }
}
