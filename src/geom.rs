use std::ops::{Add, Mul, Sub};

use ndarray::{array, Array2};

/// 2d rotation matrix for angle phi (in radians)
pub fn rot_mat(phi: f64) -> Array2<f64> {
    array![[phi.cos(), (-phi).sin()], [phi.sin(), phi.cos()],]
}

/// Marker kinds placed on an airfoil contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Leading edge
    Le,
    /// Trailing edge
    Te,
    /// Upper trailing edge corner
    TeUpper,
    /// Suction side thickness maximum near the trailing edge
    TeSuctionSideMax,
    /// Suction side reference near the trailing edge
    TeSuctionSide,
    /// Surface split point
    Split,
}

/// A named tag referencing a coordinate of the owning contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub index: usize,
}

impl Marker {
    pub fn new(kind: MarkerKind, index: usize) -> Self {
        Marker { kind, index }
    }
}

/// A single airfoil coordinate in airfoil-local space (chord-normalized,
/// before any scaling is applied).
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Position within the owning contour, kept contiguous by the normalizer
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub is_upper: bool,
    pub is_trailing_edge: bool,
    pub is_te_upper: bool,
    pub is_te_lower: bool,
}

impl Point {
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Point {
            index,
            x,
            y,
            // unit span station, scaled to the blade radius on placement
            z: 1.0,
            is_upper: false,
            is_trailing_edge: false,
            is_te_upper: false,
            is_te_lower: false,
        }
    }

    /// rotate the point in the xy plane around a pivot, angle in radians
    pub fn rotate_around(&mut self, pivot_x: f64, pivot_y: f64, phi: f64) {
        let rot = rot_mat(phi);
        let local = array![self.x - pivot_x, self.y - pivot_y];
        let rotated = rot.dot(&local);
        self.x = rotated[0] + pivot_x;
        self.y = rotated[1] + pivot_y;
    }
}

/// A velocity or position vector in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn zero() -> Self {
        Vec3::default()
    }

    pub fn magnitude(&self) -> f64 {
        (self.x.powi(2) + self.y.powi(2) + self.z.powi(2)).sqrt()
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
