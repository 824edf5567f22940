//! Plain-old-data vector, matrix and quaternion component types shared by
//! the scalar, role, and array value forms.

use half::f16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2<T>(pub T, pub T);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3<T>(pub T, pub T, pub T);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec4<T>(pub T, pub T, pub T, pub T);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat<T> {
    pub real: T,
    pub imaginary: Vec3<T>,
}

/// Row-major storage, matching how the format lays out matrix payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2d(pub [f64; 4]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3d(pub [f64; 9]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4d(pub [f64; 16]);

pub type Vec2h = Vec2<f16>;
pub type Vec2f = Vec2<f32>;
pub type Vec2d = Vec2<f64>;
pub type Vec2i = Vec2<i32>;

pub type Vec3h = Vec3<f16>;
pub type Vec3f = Vec3<f32>;
pub type Vec3d = Vec3<f64>;
pub type Vec3i = Vec3<i32>;

pub type Vec4h = Vec4<f16>;
pub type Vec4f = Vec4<f32>;
pub type Vec4d = Vec4<f64>;
pub type Vec4i = Vec4<i32>;

pub type Quath = Quat<f16>;
pub type Quatf = Quat<f32>;
pub type Quatd = Quat<f64>;
