use crate::{
    config::{FilterConfig, FilterConfigError, HeightfieldFilters},
    heightfield::Heightfield,
};

impl Heightfield {
    /// Runs the filters enabled in [`FilterConfig::filters`] in their fixed order:
    /// low hanging obstacles, ledges, low height spans, rugged areas.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the heightfield if the config does not pass [`FilterConfig::validate`].
    pub fn filter(&mut self, config: &FilterConfig) -> Result<(), FilterConfigError> {
        config.validate()?;
        let _span = tracing::debug_span!("filter_heightfield", filters = ?config.filters).entered();
        let filters = config.filters;

        // Once all geometry is rasterized, we do initial pass of filtering to
        // remove unwanted overhangs caused by the conservative rasterization
        // as well as filter spans where the character cannot possibly stand.
        if filters.contains(HeightfieldFilters::LOW_HANGING_OBSTACLES) {
            self.filter_low_hanging_walkable_obstacles(config.walkable_climb);
        }
        if filters.contains(HeightfieldFilters::LEDGE_SPANS) {
            self.filter_ledge_spans(config.walkable_height, config.walkable_climb);
        }
        if filters.contains(HeightfieldFilters::LOW_HEIGHT_SPANS) {
            self.filter_walkable_low_height_spans(config.walkable_height);
        }
        if filters.contains(HeightfieldFilters::RUGGED_AREAS) {
            self.filter_rugged_area_spans(
                config.walkable_height,
                config.walkable_climb,
                config.rugged_slope_threshold,
                config.rugged_area,
            );
        }
        Ok(())
    }
}
