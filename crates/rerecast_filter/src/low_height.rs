use crate::{heightfield::Heightfield, span::AreaType};

impl Heightfield {
    /// Marks walkable spans as not walkable if the clearance above the span is less than the specified `walkable_height`.
    ///
    /// For this filter, the clearance above the span is the distance from the span's
    /// maximum to the minimum of the next higher span in the same column.
    /// If there is no higher span in the column, the clearance is computed as the
    /// distance from the top of the span to [`Heightfield::MAX_HEIGHT`].
    ///
    /// Corresponds to <https://github.com/recastnavigation/recastnavigation/blob/bd98d84c274ee06842bf51a4088ca82ac71f8c2d/Recast/Source/RecastFilter.cpp#L172>
    ///
    /// # Arguments
    ///
    /// - `walkable_height` - Minimum floor to 'ceiling' height that will still allow the floor area to be considered walkable. `[Limit: >= 3] [Units: vx]`
    pub fn filter_walkable_low_height_spans(&mut self, walkable_height: u16) {
        let _span = tracing::debug_span!("filter_walkable_low_height_spans").entered();
        let mut demoted = 0_usize;

        // Remove walkable flag from spans which do not have enough
        // space above them for the agent to stand there.
        for column in &mut self.columns {
            for span_index in 0..column.len() {
                let floor = column.floor(span_index) as i32;
                let ceiling = column.ceiling(span_index) as i32;
                if ceiling - floor >= walkable_height as i32 {
                    continue;
                }
                let span = &mut column.spans_mut()[span_index];
                if span.area().is_walkable() {
                    demoted += 1;
                }
                span.set_area(AreaType::NOT_WALKABLE);
            }
        }
        tracing::debug!(demoted, "marked low height spans as not walkable");
    }
}

#[cfg(test)]
mod tests {
    use crate::span::{Span, SpanBuilder};

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
    fn topmost_spans_always_have_enough_clearance() {
        let mut heightfield = Heightfield::from_floors(3, 3, &[0; 9], AreaType(1));
        heightfield.filter_walkable_low_height_spans(2);
        assert_eq!(heightfield.areas(), vec![AreaType(1); 9]);
    }

    #[test]
    fn span_under_low_ceiling_is_filtered() {
        let mut heightfield = Heightfield::new(1, 1);
        heightfield
            .set_column(0, 0, vec![span(0, 2), span(3, 5), span(9, 10)])
            .unwrap();
        heightfield.filter_walkable_low_height_spans(4);
        assert_eq!(
            heightfield.areas(),
            vec![AreaType::NOT_WALKABLE, AreaType::WALKABLE, AreaType::WALKABLE]
        );
    }

    #[test]
    fn clearance_equal_to_walkable_height_is_enough() {
        let mut heightfield = Heightfield::new(1, 1);
        heightfield
            .set_column(0, 0, vec![span(0, 2), span(5, 6)])
            .unwrap();
        heightfield.filter_walkable_low_height_spans(3);
        assert_eq!(heightfield.area_at(0, 0, 0), AreaType::WALKABLE);
        heightfield.filter_walkable_low_height_spans(4);
        assert_eq!(heightfield.area_at(0, 0, 0), AreaType::NOT_WALKABLE);
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let mut heightfield = Heightfield::new(2, 1);
        heightfield
            .set_column(0, 0, vec![span(0, 2), span(3, 5)])
            .unwrap();
        heightfield
            .set_column(1, 0, vec![span(0, 1), span(8, 9)])
            .unwrap();
        heightfield.filter_walkable_low_height_spans(3);
        let once = heightfield.areas();
        heightfield.filter_walkable_low_height_spans(3);
        assert_eq!(heightfield.areas(), once);
        assert_eq!(
            once,
            vec![
                AreaType::NOT_WALKABLE,
                AreaType::WALKABLE,
                AreaType::WALKABLE,
                AreaType::WALKABLE,
            ]
        );
    }
}
