//! Three-component vector used for positions and velocities.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A point or direction in 3D space.
///
/// Serialized as `{"x": .., "y": .., "z": ..}`. Unknown fields are rejected
/// so that an arbitrary mapping with extra keys is never mistaken for a
/// vector when decoding a dynamic [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "bindings/")]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component by its serialized field name (`x`, `y` or `z`).
    pub fn component(self, name: &str) -> Option<f64> {
        match name {
            "x" => Some(self.x),
            "y" => Some(self.y),
            "z" => Some(self.z),
            _ => None,
        }
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.x.mul_add(self.x, self.y.mul_add(self.y, self.z * self.z)).sqrt()
    }

    /// Multiply every component by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}
