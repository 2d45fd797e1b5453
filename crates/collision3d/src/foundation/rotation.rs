//! Rotation about the vertical axis
//!
//! World geometry in this library never tilts, so a rotation is a single
//! angle about +Y stored as an integer number of 1.5° steps. A full turn is
//! [`Rotation::STEPS`] steps. All arithmetic wraps back into `[0, 240)`.
//!
//! Vector rotation reads `(cos, sin)` from a table of 241 entries built on
//! first use; entry 240 repeats entry 0.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::math::{Vec2, Vec3};

/// Error returned when a raw value lies outside `[0, 240)`
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rotation value {0} is outside [0, 240)")]
pub struct RotationOutOfRange(pub u8);

/// Angle about the vertical axis in 1.5° steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation {
    value: u8,
}

static TRIG_TABLE: OnceLock<[(f32, f32); Rotation::STEPS as usize + 1]> = OnceLock::new();

fn trig_table() -> &'static [(f32, f32); Rotation::STEPS as usize + 1] {
    TRIG_TABLE.get_or_init(|| {
        let mut table = [(1.0, 0.0); Rotation::STEPS as usize + 1];
        for (step, entry) in table.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let radians = (step as f64 * f64::from(Rotation::DEGREES_PER_STEP)).to_radians();
            // Quarter turns must produce exact zeros so axis-aligned rays stay axis-aligned.
            let snap = |v: f64| if v.abs() < 1e-12 { 0.0 } else { v };
            #[allow(clippy::cast_possible_truncation)]
            let cos_sin = (snap(radians.cos()) as f32, snap(radians.sin()) as f32);
            *entry = cos_sin;
        }
        table
    })
}

impl Rotation {
    /// Number of steps in a full turn
    pub const STEPS: u16 = 240;

    /// Angle covered by one step
    pub const DEGREES_PER_STEP: f32 = 1.5;

    /// No rotation
    pub const IDENTITY: Self = Self { value: 0 };

    /// Create a rotation from any integer step count, wrapping into range
    #[must_use]
    pub fn from_steps(steps: i32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = steps.rem_euclid(i32::from(Self::STEPS)) as u8;
        Self { value }
    }

    /// Create a rotation from degrees, rounding to the nearest step
    ///
    /// Halves round up; non-finite input yields the identity.
    #[must_use]
    pub fn from_degrees(degrees: f32) -> Self {
        let steps = (degrees / Self::DEGREES_PER_STEP + 0.5).floor();
        if !steps.is_finite() {
            return Self::IDENTITY;
        }
        // Wrap in floating point first so huge angles cannot saturate the cast.
        #[allow(clippy::cast_possible_truncation)]
        let wrapped = steps.rem_euclid(f32::from(Self::STEPS)) as i32;
        Self::from_steps(wrapped)
    }

    /// Create a rotation from radians, rounding to the nearest step
    #[must_use]
    pub fn from_radians(radians: f32) -> Self {
        Self::from_degrees(radians.to_degrees())
    }

    /// Raw step count in `[0, 240)`
    #[must_use]
    pub const fn value(self) -> u8 {
        self.value
    }

    /// Angle in degrees
    #[must_use]
    pub fn to_degrees(self) -> f32 {
        f32::from(self.value) * Self::DEGREES_PER_STEP
    }

    /// Angle in radians
    #[must_use]
    pub fn to_radians(self) -> f32 {
        self.to_degrees().to_radians()
    }

    /// Rotation that undoes this one
    #[must_use]
    pub fn inverse(self) -> Self {
        Self::from_steps(i32::from(Self::STEPS) - i32::from(self.value))
    }

    /// `(cos, sin)` of the angle
    #[must_use]
    pub fn cos_sin(self) -> (f32, f32) {
        trig_table()[usize::from(self.value)]
    }

    /// Rotate a 3D vector about +Y
    #[must_use]
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let (c, s) = self.cos_sin();
        Vec3::new(c * v.x + s * v.z, v.y, -s * v.x + c * v.z)
    }

    /// Rotate a horizontal `(x, z)` vector, same convention as [`Rotation::rotate`]
    #[must_use]
    pub fn rotate_2d(self, v: Vec2) -> Vec2 {
        let (c, s) = self.cos_sin();
        Vec2::new(c * v.x + s * v.y, -s * v.x + c * v.y)
    }

    /// Apply the inverse rotation to a 3D vector
    #[must_use]
    pub fn to_local(self, v: Vec3) -> Vec3 {
        self.inverse().rotate(v)
    }

    /// Apply the inverse rotation to a horizontal `(x, z)` vector
    #[must_use]
    pub fn to_local_2d(self, v: Vec2) -> Vec2 {
        self.inverse().rotate_2d(v)
    }
}

impl TryFrom<u8> for Rotation {
    type Error = RotationOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if u16::from(value) < Self::STEPS {
            Ok(Self { value })
        } else {
            Err(RotationOutOfRange(value))
        }
    }
}

impl From<Rotation> for u8 {
    fn from(rot: Rotation) -> Self {
        rot.value
    }
}

impl Add for Rotation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_steps(i32::from(self.value) + i32::from(rhs.value))
    }
}

impl Sub for Rotation {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_steps(i32::from(self.value) - i32::from(rhs.value))
    }
}

impl Neg for Rotation {
    type Output = Self;

    fn neg(self) -> Self {
        self.inverse()
    }
}

impl Mul<i16> for Rotation {
    type Output = Self;

    fn mul(self, rhs: i16) -> Self {
        Self::from_steps(i32::from(self.value) * i32::from(rhs))
    }
}

impl AddAssign for Rotation {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Rotation {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
