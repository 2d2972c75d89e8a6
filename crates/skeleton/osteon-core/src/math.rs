//! 2D affine math for bone transforms.
//!
//! Angles are in degrees throughout, matching the skeleton document.

use serde::{Deserialize, Serialize};

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Wrap an angle in degrees into `[-180, 180)`.
#[inline]
pub fn wrap_degrees(degrees: f32) -> f32 {
    degrees - 360.0 * ((degrees + 180.0) / 360.0).floor()
}

/// Interpolate two angles along the shortest arc.
#[inline]
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    a + wrap_degrees(b - a) * t
}

/// A bone's transform relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub x: f32,
    pub y: f32,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LocalTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn from_translation(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::IDENTITY
        }
    }

    /// Expand into a 2x3 affine: rotation and scale in the linear part, translation last.
    pub fn to_affine(&self) -> Affine2 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Affine2 {
            a: cos * self.scale_x,
            b: -sin * self.scale_y,
            c: sin * self.scale_x,
            d: cos * self.scale_y,
            x: self.x,
            y: self.y,
        }
    }

    /// Component-wise blend; rotation takes the shortest arc.
    pub fn lerp(&self, other: &LocalTransform, t: f32) -> LocalTransform {
        LocalTransform {
            x: lerp(self.x, other.x, t),
            y: lerp(self.y, other.y, t),
            rotation: lerp_angle(self.rotation, other.rotation, t),
            scale_x: lerp(self.scale_x, other.scale_x, t),
            scale_y: lerp(self.scale_y, other.scale_y, t),
        }
    }
}

/// Row-major 2x3 affine transform `[a b x; c d y]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2 {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn from_translation(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::IDENTITY
        }
    }

    /// `self ∘ rhs`: apply `rhs` first, then `self`.
    pub fn mul(&self, rhs: &Affine2) -> Affine2 {
        Affine2 {
            a: self.a * rhs.a + self.b * rhs.c,
            b: self.a * rhs.b + self.b * rhs.d,
            c: self.c * rhs.a + self.d * rhs.c,
            d: self.c * rhs.b + self.d * rhs.d,
            x: self.a * rhs.x + self.b * rhs.y + self.x,
            y: self.c * rhs.x + self.d * rhs.y + self.y,
        }
    }

    #[inline]
    pub fn transform_point(&self, px: f32, py: f32) -> (f32, f32) {
        (
            self.a * px + self.b * py + self.x,
            self.c * px + self.d * py + self.y,
        )
    }

    /// Rotation of the x axis in degrees.
    pub fn rotation(&self) -> f32 {
        self.c.atan2(self.a).to_degrees()
    }

    pub fn scale_x(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }

    pub fn scale_y(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }

    pub fn approx_eq(&self, other: &Affine2, eps: f32) -> bool {
        (self.a - other.a).abs() <= eps
            && (self.b - other.b).abs() <= eps
            && (self.c - other.c).abs() <= eps
            && (self.d - other.d).abs() <= eps
            && (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
    }
}
