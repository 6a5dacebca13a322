//! The heightfield module contains the types and functions for working with [`Heightfield`]s.
//!
//! A heightfield is a 3D grid of [`Span`]s, where each column contains 0, 1, or more spans.

use glam::Vec3A;
use thiserror::Error;

use crate::{
    Aabb3d,
    column::{Column, ColumnError},
    span::{AreaType, Span, SpanHandle},
};

/// Corresponds to <https://github.com/recastnavigation/recastnavigation/blob/bd98d84c274ee06842bf51a4088ca82ac71f8c2d/Recast/Include/Recast.h#L312>
/// Build with [`HeightfieldBuilder`] or [`Heightfield::new`], then fill the columns with [`Heightfield::set_column`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "SerializedHeightfield"))]
pub struct Heightfield {
    /// The width of the heightfield along the x-axis in cell units
    pub(crate) width: u16,
    /// The height of the heightfield along the z-axis in cell units
    pub(crate) height: u16,
    /// The AABB of the heightfield
    pub aabb: Aabb3d,
    /// The size of each cell on the xz-plane
    pub cell_size: f32,
    /// The size of each cell along the y-axis
    pub cell_height: f32,
    /// The columns of the heightfield in width*height order
    pub(crate) columns: Vec<Column>,
}

impl Heightfield {
    /// The ceiling of the topmost span in every column.
    pub const MAX_HEIGHT: u16 = u16::MAX;

    /// Creates an empty heightfield with unit-sized cells whose AABB starts at the origin.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            aabb: Aabb3d::from_corners(Vec3A::ZERO, [width as f32, 0.0, height as f32]),
            cell_size: 1.0,
            cell_height: 1.0,
            columns: vec![Column::default(); width as usize * height as usize],
        }
    }

    /// The width of the heightfield along the x-axis in cell units.
    ///
    /// Fixed at construction, since the columns are laid out by it.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// The height of the heightfield along the z-axis in cell units.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub(crate) fn column_index(&self, x: u16, z: u16) -> usize {
        x as usize + z as usize * self.width as usize
    }

    /// Whether the cell at the given coordinates lies inside the grid.
    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= 0 && x < self.width as i32 && z >= 0 && z < self.height as i32
    }

    /// Returns the column at the given coordinates.
    /// `None` if the coordinates are out of bounds.
    #[inline]
    pub fn column(&self, x: u16, z: u16) -> Option<&Column> {
        if !self.contains(x as i32, z as i32) {
            return None;
        }
        self.columns.get(self.column_index(x, z))
    }

    /// All columns in width*height order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Replaces the spans of the column at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are out of bounds or the spans are not
    /// sorted bottom to top without overlapping.
    pub fn set_column(
        &mut self,
        x: u16,
        z: u16,
        spans: impl Into<Vec<Span>>,
    ) -> Result<(), HeightfieldError> {
        if !self.contains(x as i32, z as i32) {
            return Err(HeightfieldError::ColumnOutOfBounds { x, z });
        }
        let column = Column::from_spans(spans)
            .map_err(|source| HeightfieldError::InvalidColumn { x, z, source })?;
        let column_index = self.column_index(x, z);
        self.columns[column_index] = column;
        Ok(())
    }

    /// Returns a reference to the span with the given handle.
    /// # Panics
    /// Panics if the handle does not point to a span.
    #[inline]
    pub fn span(&self, handle: SpanHandle) -> &Span {
        &self.columns[handle.column].spans()[handle.index]
    }

    /// Returns a mutable reference to the span with the given handle.
    /// # Panics
    /// Panics if the handle does not point to a span.
    #[inline]
    pub fn span_mut(&mut self, handle: SpanHandle) -> &mut Span {
        &mut self.columns[handle.column].spans_mut()[handle.index]
    }

    /// The number of spans that are not [`AreaType::NOT_WALKABLE`].
    pub fn walkable_span_count(&self) -> usize {
        self.columns
            .iter()
            .flat_map(Column::spans)
            .filter(|span| span.area().is_walkable())
            .count()
    }

    /// The area types of all spans, column by column in width*height order, each column from bottom to top.
    pub fn areas(&self) -> Vec<AreaType> {
        self.columns
            .iter()
            .flat_map(Column::spans)
            .map(Span::area)
            .collect()
    }

    /// Builds a heightfield with a single span per column, reaching from 0 up to the given floor.
    #[cfg(test)]
    pub(crate) fn from_floors(width: u16, height: u16, floors: &[u16], area: AreaType) -> Self {
        use crate::span::SpanBuilder;

        assert_eq!(floors.len(), width as usize * height as usize);
        let mut heightfield = Self::new(width, height);
        for z in 0..height {
            for x in 0..width {
                let floor = floors[heightfield.column_index(x, z)];
                let span = SpanBuilder {
                    min: 0,
                    max: floor,
                    area,
                }
                .build();
                heightfield.set_column(x, z, vec![span]).unwrap();
            }
        }
        heightfield
    }

    #[cfg(test)]
    pub(crate) fn area_at(&self, x: u16, z: u16, index: usize) -> AreaType {
        self.column(x, z).unwrap().spans()[index].area()
    }
}

/// A builder for [`Heightfield`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightfieldBuilder {
    /// The AABB of the heightfield
    pub aabb: Aabb3d,
    /// The size of each cell on the xz-plane
    pub cell_size: f32,
    /// The size of each cell along the y-axis
    pub cell_height: f32,
}

impl HeightfieldBuilder {
    /// Builds an empty heightfield covering the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell sizes are not positive or the grid does not fit into `u16` cells per axis.
    pub fn build(self) -> Result<Heightfield, HeightfieldBuilderError> {
        if !(self.cell_size > 0.0 && self.cell_height > 0.0) {
            return Err(HeightfieldBuilderError::InvalidCellSize {
                cell_size: self.cell_size,
                cell_height: self.cell_height,
            });
        }
        let width = (self.aabb.max.x - self.aabb.min.x) / self.cell_size + 0.5;
        let height = (self.aabb.max.z - self.aabb.min.z) / self.cell_size + 0.5;
        if width > u16::MAX as f32 || height > u16::MAX as f32 {
            return Err(HeightfieldBuilderError::DimensionsTooLarge { width, height });
        }
        let width = width as u16;
        let height = height as u16;
        Ok(Heightfield {
            width,
            height,
            aabb: self.aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            columns: vec![Column::default(); width as usize * height as usize],
        })
    }
}

/// Errors that can occur when building a [`Heightfield`] with [`HeightfieldBuilder::build`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightfieldBuilderError {
    /// Happens when a cell size is zero, negative or NaN.
    #[error("Cell sizes must be positive, got cell_size={cell_size} and cell_height={cell_height}")]
    InvalidCellSize {
        /// The size of each cell on the xz-plane
        cell_size: f32,
        /// The size of each cell along the y-axis
        cell_height: f32,
    },
    /// Happens when the grid has more cells along an axis than fit into a `u16`.
    #[error("Grid dimensions are too large, got {width}x{height} but max is {max}x{max}", max = u16::MAX)]
    DimensionsTooLarge {
        /// The width of the heightfield along the x-axis in cell units
        width: f32,
        /// The height of the heightfield along the z-axis in cell units
        height: f32,
    },
}

/// Errors that can occur when modifying the columns of a [`Heightfield`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeightfieldError {
    /// Happens when the column coordinates are out of bounds.
    #[error("column out of bounds: x={x}, z={z}")]
    ColumnOutOfBounds {
        /// The x-coordinate of the column
        x: u16,
        /// The z-coordinate of the column
        z: u16,
    },
    /// Happens when the spans of a column are malformed.
    #[error("invalid spans in column x={x}, z={z}")]
    InvalidColumn {
        /// The x-coordinate of the column
        x: u16,
        /// The z-coordinate of the column
        z: u16,
        /// Why the spans were rejected
        #[source]
        source: ColumnError,
    },
    /// Happens when the number of columns does not match `width * height`.
    #[error("expected {expected} columns for the grid, got {actual}")]
    ColumnCountMismatch {
        /// `width * height`
        expected: usize,
        /// The number of columns provided
        actual: usize,
    },
}

#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
struct SerializedHeightfield {
    width: u16,
    height: u16,
    aabb: Aabb3d,
    cell_size: f32,
    cell_height: f32,
    columns: Vec<Column>,
}

#[cfg(feature = "serialize")]
impl TryFrom<SerializedHeightfield> for Heightfield {
    type Error = HeightfieldError;

    fn try_from(value: SerializedHeightfield) -> Result<Self, Self::Error> {
        let expected = value.width as usize * value.height as usize;
        if value.columns.len() != expected {
            return Err(HeightfieldError::ColumnCountMismatch {
                expected,
                actual: value.columns.len(),
            });
        }
        Ok(Self {
            width: value.width,
            height: value.height,
            aabb: value.aabb,
            cell_size: value.cell_size,
            cell_height: value.cell_height,
            columns: value.columns,
        })
    }
}
