use std::ops::{Deref, DerefMut};

/// A builder for [`Span`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanBuilder {
    /// Height of the bottom of the span
    pub min: u16,
    /// Height of the top of the span, i.e. the floor an agent stands on
    pub max: u16,
    /// Area type ID
    pub area: AreaType,
}

impl SpanBuilder {
    /// Builds the span.
    pub fn build(self) -> Span {
        Span {
            min: self.min,
            max: self.max,
            area: self.area,
        }
    }
}

impl From<SpanBuilder> for Span {
    fn from(builder: SpanBuilder) -> Self {
        builder.build()
    }
}

/// Corresponds to <https://github.com/recastnavigation/recastnavigation/blob/bd98d84c274ee06842bf51a4088ca82ac71f8c2d/Recast/Include/Recast.h#L294>
///
/// The span does not link to the next-higher span of its column. Instead, it is stored at `index + 1`
/// in the owning [`Column`](crate::Column).
/// Build with [`SpanBuilder`]
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Height of the bottom of the span. Recast packs this into 13 bits.
    min: u16,
    /// Height of the top of the span. Recast packs this into 13 bits.
    max: u16,
    area: AreaType,
}

impl Span {
    /// Height of the bottom of the span.
    #[inline]
    pub fn min(&self) -> u16 {
        self.min
    }

    /// Height of the top of the span.
    #[inline]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// The area type of the span.
    #[inline]
    pub fn area(&self) -> AreaType {
        self.area
    }

    /// Overwrites the area type of the span. This is the only mutation the filters perform.
    #[inline]
    pub fn set_area(&mut self, area: impl Into<AreaType>) {
        self.area = area.into();
    }
}

/// Identifies a span by the index of its column and its position inside that column, counted from the bottom.
///
/// Handles stay valid as long as the columns of the [`Heightfield`](crate::Heightfield) are not replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanHandle {
    /// The column index, i.e. `x + z * width`
    pub column: usize,
    /// The index of the span inside its column
    pub index: usize,
}

impl SpanHandle {
    /// Creates a new handle.
    #[inline]
    pub fn new(column: usize, index: usize) -> Self {
        Self { column, index }
    }
}

/// The area classification of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
#[repr(transparent)]
pub struct AreaType(pub u8);

impl Deref for AreaType {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AreaType {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Default for AreaType {
    fn default() -> Self {
        Self::NOT_WALKABLE
    }
}

impl From<u8> for AreaType {
    fn from(value: u8) -> Self {
        AreaType(value)
    }
}

impl AreaType {
    /// The area type 0. Spans with this area type are not walkable.
    pub const NOT_WALKABLE: Self = Self(0);
    /// Default area type for walkable spans. The highest possible area type.
    pub const WALKABLE: Self = Self(u8::MAX);

    /// Whether the area type is walkable, i.e. anything but [`AreaType::NOT_WALKABLE`].
    #[inline]
    pub fn is_walkable(self) -> bool {
        self != Self::NOT_WALKABLE
    }
}
