use crate::{heightfield::Heightfield, span::AreaType};

impl Heightfield {
    /// Marks non-walkable spans as walkable if their maximum is within `walkable_climb` of the span below them.
    ///
    /// This removes small obstacles and rasterization artifacts that the agent would be able to walk over,
    /// such as curbs. It also allows agents to move up terraced structures like stairs.
    ///
    /// Obstacle spans are marked walkable if: `obstacle_span.max - walkable_span.max < walkable_climb`
    ///
    /// Corresponds to <https://github.com/recastnavigation/recastnavigation/blob/bd98d84c274ee06842bf51a4088ca82ac71f8c2d/Recast/Source/RecastFilter.cpp#L30>
    ///
    /// # Arguments
    ///
    /// - `walkable_climb` - Maximum ledge height that is considered to still be traversable. `[Limit: >=0] [Units: vx]`
    pub fn filter_low_hanging_walkable_obstacles(&mut self, walkable_climb: u16) {
        let _span = tracing::debug_span!("filter_low_hanging_walkable_obstacles").entered();
        let mut promoted = 0_usize;

        for column in &mut self.columns {
            let mut previous_span_max: Option<u16> = None;
            let mut previous_was_walkable = false;
            let mut previous_area_id = AreaType::NOT_WALKABLE;

            // For each span in the column...
            for span in column.spans_mut() {
                let walkable = span.area().is_walkable();

                // If current span is not walkable, but there is walkable span just below it and the height difference
                // is small enough for the agent to walk over, mark the current span as walkable too.
                if let Some(previous_span_max) = previous_span_max {
                    if !walkable
                        && previous_was_walkable
                        && (span.max() as i32 - previous_span_max as i32) <= walkable_climb as i32
                    {
                        span.set_area(previous_area_id);
                        promoted += 1;
                    }
                }

                // Copy the original walkable value regardless of whether we changed it.
                // This prevents multiple consecutive non-walkable spans from being erroneously marked as walkable.
                previous_span_max = Some(span.max());
                previous_was_walkable = walkable;
                previous_area_id = span.area();
            }
        }
        tracing::debug!(promoted, "promoted low hanging obstacles to walkable");
    }
}
