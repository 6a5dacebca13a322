use thiserror::Error;

use crate::{heightfield::Heightfield, span::Span};

/// A single cell of a [`Heightfield`], holding its spans.
///
/// The spans are sorted from bottom to top and never overlap or touch,
/// so the span above `spans[i]` is always `spans[i + 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serialize",
    serde(try_from = "Vec<Span>", into = "Vec<Span>")
)]
pub struct Column {
    /// The spans of the column, from bottom to top
    spans: Vec<Span>,
}

impl Column {
    /// Creates a column from spans sorted bottom to top.
    ///
    /// # Errors
    ///
    /// Returns an error if a span has its `min` above its `max`,
    /// or if a span does not start strictly above the previous one.
    pub fn from_spans(spans: impl Into<Vec<Span>>) -> Result<Self, ColumnError> {
        let spans = spans.into();
        let mut previous_max = None;
        for (index, span) in spans.iter().enumerate() {
            if span.min() > span.max() {
                return Err(ColumnError::InvertedSpan {
                    index,
                    min: span.min(),
                    max: span.max(),
                });
            }
            if let Some(previous_max) = previous_max {
                if span.min() <= previous_max {
                    return Err(ColumnError::UnorderedSpans {
                        index,
                        min: span.min(),
                        previous_max,
                    });
                }
            }
            previous_max = Some(span.max());
        }
        Ok(Self { spans })
    }

    /// The spans of the column, from bottom to top.
    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Mutable access to the spans. Only the area of a span can be changed,
    /// so the ordering of the column cannot be broken through this.
    #[inline]
    pub fn spans_mut(&mut self) -> &mut [Span] {
        &mut self.spans
    }

    /// The number of spans in the column.
    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the column contains no spans.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The floor of the span at `index`, which is the top of the span.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn floor(&self, index: usize) -> u16 {
        self.spans[index].max()
    }

    /// The ceiling of the span at `index`, which is the bottom of the next-higher span,
    /// or [`Heightfield::MAX_HEIGHT`] for the topmost span.
    #[inline]
    pub fn ceiling(&self, index: usize) -> u16 {
        self.spans
            .get(index + 1)
            .map(Span::min)
            .unwrap_or(Heightfield::MAX_HEIGHT)
    }

    /// The ceiling of the open space below the lowest span,
    /// or [`Heightfield::MAX_HEIGHT`] if the column is empty.
    #[inline]
    pub fn ceiling_below(&self) -> u16 {
        self.spans
            .first()
            .map(Span::min)
            .unwrap_or(Heightfield::MAX_HEIGHT)
    }

    /// Iterates over the `(floor, ceiling)` pairs of the spans, from bottom to top.
    pub fn clearances(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        (0..self.spans.len()).map(|index| (self.floor(index), self.ceiling(index)))
    }
}

impl TryFrom<Vec<Span>> for Column {
    type Error = ColumnError;

    fn try_from(spans: Vec<Span>) -> Result<Self, Self::Error> {
        Self::from_spans(spans)
    }
}

impl From<Column> for Vec<Span> {
    fn from(column: Column) -> Self {
        column.spans
    }
}

/// Errors that can occur when building a [`Column`] with [`Column::from_spans`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    /// Happens when the bottom of a span lies above its top.
    #[error("span {index} is inverted: min={min} is above max={max}")]
    InvertedSpan {
        /// The position of the span in the column
        index: usize,
        /// The bottom of the span
        min: u16,
        /// The top of the span
        max: u16,
    },
    /// Happens when a span does not start above the previous span.
    #[error("span {index} starts at {min}, which is not above the previous span's top at {previous_max}")]
    UnorderedSpans {
        /// The position of the span in the column
        index: usize,
        /// The bottom of the span
        min: u16,
        /// The top of the span below
        previous_max: u16,
    },
}

#[cfg(test)]
mod tests {
    use crate::span::{AreaType, SpanBuilder};

    use super::*;

    fn span(min: u16, max: u16) -> Span {
        SpanBuilder {
            min,
            max,
            area: AreaType::WALKABLE,
        }
        .build()
    }

    #[test]
    fn can_create_empty_column() {
        let column = Column::from_spans(vec![]).unwrap();
        assert!(column.is_empty());
        assert_eq!(column.ceiling_below(), Heightfield::MAX_HEIGHT);
    }

    #[test]
    fn clearance_uses_next_span_as_ceiling() {
        let column = Column::from_spans(vec![span(0, 2), span(6, 8)]).unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column.floor(0), 2);
        assert_eq!(column.ceiling(0), 6);
        assert_eq!(column.floor(1), 8);
        assert_eq!(column.ceiling(1), Heightfield::MAX_HEIGHT);
        assert_eq!(column.ceiling_below(), 0);
        assert_eq!(
            column.clearances().collect::<Vec<_>>(),
            vec![(2, 6), (8, Heightfield::MAX_HEIGHT)]
        );
    }

    #[test]
    fn rejects_inverted_span() {
        let error = Column::from_spans(vec![span(0, 2), span(5, 4)]).unwrap_err();
        assert_eq!(
            error,
            ColumnError::InvertedSpan {
                index: 1,
                min: 5,
                max: 4
            }
        );
    }

    #[test]
    fn rejects_touching_spans() {
        let error = Column::from_spans(vec![span(0, 2), span(2, 4)]).unwrap_err();
        assert_eq!(
            error,
            ColumnError::UnorderedSpans {
                index: 1,
                min: 2,
                previous_max: 2
            }
        );
    }

    #[test]
    fn rejects_spans_out_of_order() {
        let error = Column::from_spans(vec![span(6, 8), span(0, 2)]).unwrap_err();
        assert!(matches!(error, ColumnError::UnorderedSpans { index: 1, .. }));
    }

    #[test]
    fn area_can_be_changed_through_spans_mut() {
        let mut column = Column::from_spans(vec![span(0, 2)]).unwrap();
        column.spans_mut()[0].set_area(AreaType::NOT_WALKABLE);
        assert_eq!(column.spans()[0].area(), AreaType::NOT_WALKABLE);
    }
}
