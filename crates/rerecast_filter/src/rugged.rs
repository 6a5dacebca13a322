use crate::{
    heightfield::Heightfield,
    span::{AreaType, SpanHandle},
};

/// How many cells a chain is extended from its origin column at most.
const MAX_SLOPE_SAMPLE_STEP: usize = 9;

/// A sequence of spans connected cell by cell along one axis, starting in the origin column.
type SpanChain = Vec<SpanHandle>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleAxis {
    X,
    Z,
}

impl SampleAxis {
    #[inline]
    fn offset(self) -> (i32, i32) {
        match self {
            SampleAxis::X => (1, 0),
            SampleAxis::Z => (0, 1),
        }
    }
}

impl Heightfield {
    /// Marks walkable spans on bumpy terrain with `rugged_area`.
    ///
    /// Starting from every walkable span, chains of spans are traced cell by cell along the positive x-axis and then the positive z-axis
    /// for up to 9 cells. A chain only continues to a walkable neighbor whose floor is within `walkable_climb` of the current floor,
    /// so every single step of a chain is climbable. If the average absolute step height along a chain is at least `slope_threshold`,
    /// every span in the chain is marked with `rugged_area`.
    ///
    /// Only chains starting on a span with [`AreaType::WALKABLE`] are evaluated. Marks are applied immediately,
    /// so spans marked by an earlier chain are no longer considered as the start of a later chain.
    ///
    /// # Arguments
    ///
    /// - `walkable_height` - Minimum floor to 'ceiling' height that will still allow the floor area to be considered walkable. Not used by this filter. `[Units: vx]`
    /// - `walkable_climb` - Maximum ledge height that is considered to still be traversable. `[Limit: >=0] [Units: vx]`
    /// - `slope_threshold` - Minimum average step height along a chain for it to be considered rugged. `[Limit: >=0] [Units: vx per cell]`
    /// - `rugged_area` - The area type used to mark rugged spans. Must not be [`AreaType::NOT_WALKABLE`].
    ///
    /// # Panics
    ///
    /// Panics if `rugged_area` is [`AreaType::NOT_WALKABLE`] or `slope_threshold` is negative or NaN.
    pub fn filter_rugged_area_spans(
        &mut self,
        walkable_height: u16,
        walkable_climb: u16,
        slope_threshold: f32,
        rugged_area: impl Into<AreaType>,
    ) {
        let rugged_area = rugged_area.into();
        assert!(
            rugged_area.is_walkable(),
            "rugged area must be distinguishable from non-walkable spans"
        );
        assert!(
            slope_threshold >= 0.0,
            "slope threshold must not be negative, got {slope_threshold}"
        );
        let _span = tracing::debug_span!("filter_rugged_area_spans", walkable_height).entered();
        let walkable_climb = walkable_climb as i32;
        let mut marked = 0_usize;

        for z in 0..self.height {
            for x in 0..self.width {
                let column_index = self.column_index(x, z);
                for span_index in 0..self.columns[column_index].len() {
                    let origin = SpanHandle::new(column_index, span_index);
                    // Skip non-walkable spans.
                    if !self.span(origin).area().is_walkable() {
                        continue;
                    }

                    let chains =
                        self.trace_span_chains(x, z, span_index, SampleAxis::X, walkable_climb);
                    marked += self.mark_rugged_chains(&chains, slope_threshold, rugged_area);

                    // No need to look along the other axis if the origin is already rugged.
                    if self.span(origin).area() == rugged_area {
                        continue;
                    }
                    let chains =
                        self.trace_span_chains(x, z, span_index, SampleAxis::Z, walkable_climb);
                    marked += self.mark_rugged_chains(&chains, slope_threshold, rugged_area);
                }
            }
        }
        tracing::debug!(marked, "marked rugged spans");
    }

    /// Seeds one chain for the origin span and one for every span above it in the origin column,
    /// then extends the chains one cell at a time along `axis`.
    ///
    /// A neighbor span is appended to the first chain whose last span is the current span it was reached from.
    fn trace_span_chains(
        &self,
        x: u16,
        z: u16,
        origin_index: usize,
        axis: SampleAxis,
        walkable_climb: i32,
    ) -> Vec<SpanChain> {
        let origin_column = self.column_index(x, z);
        let mut chains: Vec<SpanChain> = (origin_index..self.columns[origin_column].len())
            .map(|index| vec![SpanHandle::new(origin_column, index)])
            .collect();

        let (step_x, step_z) = axis.offset();
        let mut current_x = x as i32;
        let mut current_z = z as i32;
        for _ in 0..MAX_SLOPE_SAMPLE_STEP {
            let neighbor_x = current_x + step_x;
            let neighbor_z = current_z + step_z;
            if !self.contains(current_x, current_z) || !self.contains(neighbor_x, neighbor_z) {
                // Reached the border of the grid.
                break;
            }
            let current_column = self.column_index(current_x as u16, current_z as u16);
            let neighbor_column = self.column_index(neighbor_x as u16, neighbor_z as u16);

            for (current_index, current_span) in
                self.columns[current_column].spans().iter().enumerate()
            {
                // A non-walkable span ends every path through this column.
                if !current_span.area().is_walkable() {
                    break;
                }
                let current = SpanHandle::new(current_column, current_index);
                let current_floor = current_span.max() as i32;

                for (neighbor_index, neighbor_span) in
                    self.columns[neighbor_column].spans().iter().enumerate()
                {
                    if !neighbor_span.area().is_walkable() {
                        continue;
                    }
                    let difference = (current_floor - neighbor_span.max() as i32).abs();
                    if difference > walkable_climb {
                        continue;
                    }
                    // Several chains may have converged on the current span. Only the first one continues.
                    if let Some(chain) = chains
                        .iter_mut()
                        .find(|chain| chain.last() == Some(&current))
                    {
                        chain.push(SpanHandle::new(neighbor_column, neighbor_index));
                    }
                }
            }

            current_x = neighbor_x;
            current_z = neighbor_z;
        }
        chains
    }

    /// Marks every chain whose average step height reaches `slope_threshold`. Returns how many spans changed their area.
    fn mark_rugged_chains(
        &mut self,
        chains: &[SpanChain],
        slope_threshold: f32,
        rugged_area: AreaType,
    ) -> usize {
        let mut marked = 0;
        for chain in chains {
            let Some(&start) = chain.first() else {
                continue;
            };
            if self.span(start).area() != AreaType::WALKABLE {
                continue;
            }
            let step_count = chain.len() - 1;
            if step_count == 0 {
                continue;
            }
            let total_difference: i32 = chain
                .windows(2)
                .map(|pair| {
                    (self.span(pair[0]).max() as i32 - self.span(pair[1]).max() as i32).abs()
                })
                .sum();
            let average_slope = total_difference as f32 / step_count as f32;
            if average_slope < slope_threshold {
                continue;
            }
            for &handle in chain {
                let span = self.span_mut(handle);
                if span.area() != rugged_area {
                    marked += 1;
                }
                span.set_area(rugged_area);
            }
        }
        marked
    }
}

#[cfg(test)]
mod tests {
    use crate::span::{Span, SpanBuilder};

    use super::*;

    const RUGGED: AreaType = AreaType(42);
    const WALKABLE_HEIGHT: u16 = 2;

    fn span(min: u16, max: u16, area: AreaType) -> Span {
        SpanBuilder { min, max, area }.build()
    }

    fn line(floors: &[u16]) -> Heightfield {
        Heightfield::from_floors(floors.len() as u16, 1, floors, AreaType::WALKABLE)
    }

    #[test]
    fn steady_climb_along_x_is_rugged() {
        let floors: Vec<u16> = (0..10).map(|x| x * 2).collect();
        let mut heightfield = line(&floors);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, RUGGED);
        assert_eq!(heightfield.areas(), vec![RUGGED; 10]);
    }

    #[test]
    fn steady_climb_along_z_is_rugged() {
        let floors: Vec<u16> = (0..10).map(|z| z * 2).collect();
        let mut heightfield = Heightfield::from_floors(1, 10, &floors, AreaType::WALKABLE);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, RUGGED);
        assert_eq!(heightfield.areas(), vec![RUGGED; 10]);
    }

    #[test]
    fn small_step_stays_walkable() {
        let mut heightfield = line(&[0, 1]);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, RUGGED);
        assert_eq!(heightfield.areas(), vec![AreaType::WALKABLE; 2]);
    }

    #[test]
    fn average_equal_to_threshold_is_rugged() {
        let mut heightfield = line(&[0, 3, 3]);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, RUGGED);
        assert_eq!(heightfield.areas(), vec![RUGGED; 3]);
    }

    #[test]
    fn chain_does_not_cross_steps_above_climb() {
        // The chain from x=0 stops at the wall, so it only sees the step of 2.
        let mut heightfield = line(&[0, 2, 10, 12]);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 2.5, RUGGED);
        assert_eq!(heightfield.areas(), vec![AreaType::WALKABLE; 4]);

        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 2.0, RUGGED);
        assert_eq!(heightfield.areas(), vec![RUGGED; 4]);
    }

    #[test]
    fn chain_is_limited_to_nine_steps() {
        // Flat for nine steps, then a bump the chain from x=0 never reaches.
        let mut floors = vec![0; 10];
        floors.push(3);
        let mut heightfield = line(&floors);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 0.3, RUGGED);
        // The chain from x=0 ends at x=9 and averages 0 over nine steps.
        assert_eq!(heightfield.area_at(0, 0, 0), AreaType::WALKABLE);
        // The chain from x=1 reaches the bump: 3 / 9 >= 0.3.
        for x in 1..=10 {
            assert_eq!(heightfield.area_at(x, 0, 0), RUGGED, "x={x}");
        }
    }

    #[test]
    fn marks_are_visible_to_later_origins_in_the_same_pass() {
        // The chain from x=0 covers x=0..=9 and marks it.
        // The chain from x=1 would also cover x=10 with an average of 16 / 9, but x=1 is already rugged
        // and therefore never evaluated.
        let mut floors: Vec<u16> = (0..10).map(|x| x * 2).collect();
        floors.extend([18, 18]);
        let mut heightfield = line(&floors);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, RUGGED);
        for x in 0..10 {
            assert_eq!(heightfield.area_at(x, 0, 0), RUGGED, "x={x}");
        }
        assert_eq!(heightfield.area_at(10, 0, 0), AreaType::WALKABLE);
        assert_eq!(heightfield.area_at(11, 0, 0), AreaType::WALKABLE);
    }

    #[test]
    fn only_chains_starting_on_the_default_walkable_area_are_evaluated() {
        let mut heightfield = Heightfield::from_floors(3, 1, &[0, 4, 8], AreaType(7));
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 4, 1.0, RUGGED);
        assert_eq!(heightfield.areas(), vec![AreaType(7); 3]);
    }

    #[test]
    fn non_walkable_current_span_ends_the_paths_above_it() {
        let mut heightfield = Heightfield::new(2, 1);
        heightfield
            .set_column(
                0,
                0,
                vec![
                    span(0, 0, AreaType::NOT_WALKABLE),
                    span(4, 6, AreaType::WALKABLE),
                ],
            )
            .unwrap();
        heightfield
            .set_column(1, 0, vec![span(0, 8, AreaType::WALKABLE)])
            .unwrap();
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.0, RUGGED);
        // The upper span at x=0 is never reached because the scan stops at the lower, non-walkable one.
        assert_eq!(
            heightfield.areas(),
            vec![AreaType::NOT_WALKABLE, AreaType::WALKABLE, AreaType::WALKABLE]
        );
    }

    #[test]
    fn upper_layer_chains_are_traced_separately() {
        let mut heightfield = Heightfield::new(3, 1);
        for (x, upper_floor) in [(0, 20), (1, 23), (2, 26)] {
            heightfield
                .set_column(
                    x,
                    0,
                    vec![
                        span(0, 0, AreaType::WALKABLE),
                        span(upper_floor - 2, upper_floor, AreaType::WALKABLE),
                    ],
                )
                .unwrap();
        }
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 2.0, RUGGED);
        // The ground layer is flat, the upper layer climbs 3 per cell.
        assert_eq!(
            heightfield.areas(),
            vec![
                AreaType::WALKABLE,
                RUGGED,
                AreaType::WALKABLE,
                RUGGED,
                AreaType::WALKABLE,
                RUGGED,
            ]
        );
    }

    #[test]
    fn chains_of_an_upper_origin_ignore_the_spans_below_it() {
        // The ground span at x=0 and the ledge above it both connect to the span at x=1.
        // Tracing from the ledge must not hand the continuation to x=2 to the ground chain.
        let mut heightfield = Heightfield::new(3, 1);
        heightfield
            .set_column(
                0,
                0,
                vec![
                    span(0, 0, AreaType::WALKABLE),
                    span(1, 3, AreaType::WALKABLE),
                ],
            )
            .unwrap();
        heightfield
            .set_column(1, 0, vec![span(0, 3, AreaType::WALKABLE)])
            .unwrap();
        heightfield
            .set_column(2, 0, vec![span(0, 6, AreaType::WALKABLE)])
            .unwrap();
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, RUGGED);
        // Ground chain 0, 3, 6 averages 3. The ledge chain 3, 3, 6 averages 1.5.
        assert_eq!(heightfield.areas(), vec![RUGGED; 4]);
    }

    #[test]
    fn non_walkable_spans_are_never_marked() {
        let floors = [0, 9, 0, 9, 0, 9, 0, 9, 0];
        let mut heightfield = Heightfield::from_floors(3, 3, &floors, AreaType::NOT_WALKABLE);
        let before = heightfield.clone();
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 10, 0.0, RUGGED);
        assert_eq!(heightfield, before);
    }

    #[test]
    #[should_panic(expected = "rugged area")]
    fn rugged_area_must_be_walkable() {
        let mut heightfield = line(&[0, 1]);
        heightfield.filter_rugged_area_spans(WALKABLE_HEIGHT, 3, 1.5, AreaType::NOT_WALKABLE);
    }
}
