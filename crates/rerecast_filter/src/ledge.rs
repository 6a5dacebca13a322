use crate::{
    heightfield::Heightfield,
    math::{dir_offset_x, dir_offset_z},
    span::AreaType,
};

impl Heightfield {
    /// Marks spans that are ledges as not-walkable.
    ///
    /// A ledge is a span with one or more neighbors whose maximum is further away than `walkable_climb`
    /// from the current span's maximum.
    /// This method removes the impact of the overestimation of conservative voxelization
    /// so the resulting mesh will not have regions hanging in the air over ledges.
    ///
    /// A span is a ledge if: `abs(current_span.max - neighbor_span.max) > walkable_climb`
    ///
    /// Spans next to the border of the grid are always ledges, since nothing is known about what lies beyond.
    ///
    /// Corresponds to <https://github.com/recastnavigation/recastnavigation/blob/bd98d84c274ee06842bf51a4088ca82ac71f8c2d/Recast/Source/RecastFilter.cpp#L68>
    ///
    /// # Arguments
    ///
    /// - `walkable_height` - Minimum floor to 'ceiling' height that will still allow the floor area to be considered walkable. `[Limit: >= 3] [Units: vx]`
    /// - `walkable_climb` - Maximum ledge height that is considered to still be traversable. `[Limit: >=0] [Units: vx]`
    pub fn filter_ledge_spans(&mut self, walkable_height: u16, walkable_climb: u16) {
        let _span = tracing::debug_span!("filter_ledge_spans").entered();
        let walkable_height = walkable_height as i32;
        let walkable_climb = walkable_climb as i32;
        let max_height = Self::MAX_HEIGHT as i32;
        let mut demoted = 0_usize;

        // Mark spans that are adjacent to a ledge as unwalkable.
        for z in 0..self.height {
            for x in 0..self.width {
                let column_index = self.column_index(x, z);
                for span_index in 0..self.columns[column_index].len() {
                    let column = &self.columns[column_index];
                    // Skip non-walkable spans.
                    if !column.spans()[span_index].area().is_walkable() {
                        continue;
                    }

                    let floor = column.floor(span_index) as i32;
                    let ceiling = column.ceiling(span_index) as i32;

                    // The difference between this walkable area and the lowest neighbor walkable area.
                    // This is the difference between the current span and all neighbor spans that have
                    // enough space for an agent to move between, but not accounting at all for surface slope.
                    let mut lowest_neighbor_floor_difference = max_height;

                    // Min and max height of accessible neighbours.
                    let mut lowest_traversable_neighbor_floor = floor;
                    let mut highest_traversable_neighbor_floor = floor;

                    for direction in 0..4 {
                        let neighbor_x = x as i32 + dir_offset_x(direction) as i32;
                        let neighbor_z = z as i32 + dir_offset_z(direction) as i32;

                        // Neighbors out of bounds mean we are at the border of the grid.
                        if !self.contains(neighbor_x, neighbor_z) {
                            lowest_neighbor_floor_difference = -walkable_climb - 1;
                            break;
                        }

                        let neighbor_column =
                            &self.columns[self.column_index(neighbor_x as u16, neighbor_z as u16)];

                        // The most we can step down to the neighbor is the walkable_climb distance.
                        // Start with the area under the neighbor span.
                        let neighbor_ceiling = neighbor_column.ceiling_below() as i32;

                        // The agent fits into the open space below the neighbor, so the drop is unbounded.
                        if ceiling.min(neighbor_ceiling) - floor >= walkable_height {
                            lowest_neighbor_floor_difference = -walkable_climb - 1;
                            break;
                        }

                        // For each span in the neighboring column...
                        for (neighbor_floor, neighbor_ceiling) in neighbor_column.clearances() {
                            let neighbor_floor = neighbor_floor as i32;
                            let neighbor_ceiling = neighbor_ceiling as i32;

                            // Only consider neighboring areas that have enough overlap to be potentially traversable.
                            if ceiling.min(neighbor_ceiling) - floor.max(neighbor_floor)
                                < walkable_height
                            {
                                // No space to traverse between them.
                                continue;
                            }

                            let neighbor_floor_difference = neighbor_floor - floor;
                            lowest_neighbor_floor_difference =
                                lowest_neighbor_floor_difference.min(neighbor_floor_difference);

                            // Find min/max accessible neighbor height.
                            // Only consider neighbors that are at most walkable_climb away.
                            if neighbor_floor_difference.abs() <= walkable_climb {
                                // There is space to move to the neighbor cell and the slope isn't too much.
                                lowest_traversable_neighbor_floor =
                                    lowest_traversable_neighbor_floor.min(neighbor_floor);
                                highest_traversable_neighbor_floor =
                                    highest_traversable_neighbor_floor.max(neighbor_floor);
                            } else if neighbor_floor_difference < -walkable_climb {
                                // We already know this will be considered a ledge span so we can early-out
                                break;
                            }
                        }
                    }

                    // The current span is close to a ledge if the magnitude of the drop to any neighbour span is greater than the walkable_climb distance.
                    // That is, there is a gap that is large enough to let an agent move between them, but the drop (surface slope) is too large to allow it.
                    let is_ledge = lowest_neighbor_floor_difference < -walkable_climb;
                    // If the difference between all neighbor floors is too large, this is a steep slope.
                    let is_steep = highest_traversable_neighbor_floor
                        - lowest_traversable_neighbor_floor
                        > walkable_climb;

                    if is_ledge || is_steep {
                        self.columns[column_index].spans_mut()[span_index]
                            .set_area(AreaType::NOT_WALKABLE);
                        demoted += 1;
                    }
                }
            }
        }
        tracing::debug!(demoted, "marked ledge spans as not walkable");
    }
}
