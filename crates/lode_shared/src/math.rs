//! Mathematical types shared between systems.
//!
//! `BlockPos` addresses a cell of the block grid, `Vec3` a point in world
//! space (used for effect and item placement).

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Integer position of a block in the world grid.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct BlockPos {
    /// X coordinate
    pub x: i32,
    /// Y coordinate (up)
    pub y: i32,
    /// Z coordinate
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The world origin
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Returns this position moved by the given offset.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Largest per-axis distance to `other` (Chebyshev distance).
    #[inline]
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        let dz = self.z.abs_diff(other.z);
        dx.max(dy).max(dz)
    }

    /// Center of the block in world space.
    #[must_use]
    pub fn center(self) -> Vec3 {
        Vec3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }
}

impl From<[i32; 3]> for BlockPos {
    fn from(arr: [i32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// 3D Vector - effect positions, item spawn points
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Linear interpolation towards `other` (`t = 0` is `self`, `t = 1` is `other`).
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let d = self - other;
        (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let a = BlockPos::new(0, 0, 0);
        assert_eq!(a.chebyshev_distance(BlockPos::new(3, -7, 2)), 7);
        assert_eq!(a.chebyshev_distance(a), 0);
        assert_eq!(
            BlockPos::new(i32::MIN, 0, 0).chebyshev_distance(BlockPos::new(i32::MAX, 0, 0)),
            u32::MAX
        );
    }

    #[test]
    fn test_center_and_lerp() {
        let start = BlockPos::new(0, 0, 0).center();
        let end = BlockPos::new(2, 0, 0).center();
        assert_eq!(start, Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(start.lerp(end, 0.5), Vec3::new(1.5, 0.5, 0.5));
        assert_eq!(start.distance(end), 2.0);
    }

    #[test]
    fn test_block_pos_bytemuck() {
        let p = BlockPos::new(1, 2, 3);
        let bytes: &[u8] = bytemuck::bytes_of(&p);
        assert_eq!(bytes.len(), 12); // 3 * 4 bytes
    }
}
