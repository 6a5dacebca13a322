use glam::Vec3A;

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3d {
    /// The minimum point of the box
    pub min: Vec3A,
    /// The maximum point of the box
    pub max: Vec3A,
}

impl Aabb3d {
    /// Constructs an AABB from its center and half-size.
    #[inline]
    pub fn new(center: impl Into<Vec3A>, half_size: impl Into<Vec3A>) -> Self {
        let center = center.into();
        let half_size = half_size.into();
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Constructs an AABB from its minimum and maximum corners.
    #[inline]
    pub fn from_corners(min: impl Into<Vec3A>, max: impl Into<Vec3A>) -> Self {
        let a = min.into();
        let b = max.into();
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

/// The x offset of the neighbor cell in `direction`, counting 0..4 as -x, +z, +x, -z.
pub(crate) fn dir_offset_x(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [-1, 0, 1, 0];
    OFFSET[direction as usize & 0x03]
}

/// The z offset of the neighbor cell in `direction`. See [`dir_offset_x`].
pub(crate) fn dir_offset_z(direction: u8) -> i8 {
    const OFFSET: [i8; 4] = [0, 1, 0, -1];
    OFFSET[direction as usize & 0x03]
}
