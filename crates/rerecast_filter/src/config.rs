use thiserror::Error;

use crate::span::AreaType;

bitflags::bitflags! {
    /// The filter passes run by [`Heightfield::filter`](crate::Heightfield::filter).
    /// Enabled passes always run in the order of the flags below.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    #[repr(transparent)]
    pub struct HeightfieldFilters: u8 {
        /// [`Heightfield::filter_low_hanging_walkable_obstacles`](crate::Heightfield::filter_low_hanging_walkable_obstacles)
        const LOW_HANGING_OBSTACLES = 1;
        /// [`Heightfield::filter_ledge_spans`](crate::Heightfield::filter_ledge_spans)
        const LEDGE_SPANS = 1 << 1;
        /// [`Heightfield::filter_walkable_low_height_spans`](crate::Heightfield::filter_walkable_low_height_spans)
        const LOW_HEIGHT_SPANS = 1 << 2;
        /// [`Heightfield::filter_rugged_area_spans`](crate::Heightfield::filter_rugged_area_spans)
        const RUGGED_AREAS = 1 << 3;

        /// The filters every navmesh build runs after rasterization.
        const DEFAULT = Self::LOW_HANGING_OBSTACLES.bits() | Self::LEDGE_SPANS.bits() | Self::LOW_HEIGHT_SPANS.bits();
        /// All filters, including rugged area detection.
        const ALL = Self::DEFAULT.bits() | Self::RUGGED_AREAS.bits();
    }
}

impl Default for HeightfieldFilters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The parameters of the heightfield filters, in voxel units. Usually built using [`FilterConfigBuilder`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Minimum floor to 'ceiling' height that will still allow the floor area to
    /// be considered walkable. `[Limit: >= 3] [Units: vx]`
    ///
    /// Permits detection of overhangs in the source geometry that make the geometry below un-walkable.
    /// The value is usually set to the maximum agent height
    pub walkable_height: u16,

    /// Maximum ledge height that is considered to still be traversable. `[Limit: >=0] [Units: vx]`
    ///
    /// Allows the mesh to flow over low lying obstructions such as curbs and up/down stairways.
    /// The value is usually set to how far up/down an agent can step.
    pub walkable_climb: u16,

    /// Minimum average step height over a run of up to 9 cells for the run to be marked as rugged. `[Limit: >=0] [Units: vx]`
    ///
    /// Only used by [`HeightfieldFilters::RUGGED_AREAS`].
    pub rugged_slope_threshold: f32,

    /// The area type rugged spans are marked with.
    ///
    /// Must be neither [`AreaType::NOT_WALKABLE`] nor [`AreaType::WALKABLE`] when [`HeightfieldFilters::RUGGED_AREAS`] is enabled.
    pub rugged_area: AreaType,

    /// Which filters to run.
    pub filters: HeightfieldFilters,
}

impl FilterConfig {
    /// Checks that the config can be passed to [`Heightfield::filter`](crate::Heightfield::filter).
    ///
    /// # Errors
    ///
    /// Returns an error if rugged area detection is enabled with a reserved area type or a negative slope threshold.
    pub fn validate(&self) -> Result<(), FilterConfigError> {
        if !self.filters.contains(HeightfieldFilters::RUGGED_AREAS) {
            return Ok(());
        }
        if self.rugged_area == AreaType::NOT_WALKABLE || self.rugged_area == AreaType::WALKABLE {
            return Err(FilterConfigError::ReservedRuggedArea(self.rugged_area));
        }
        if !(self.rugged_slope_threshold >= 0.0) {
            return Err(FilterConfigError::NegativeSlopeThreshold(
                self.rugged_slope_threshold,
            ));
        }
        Ok(())
    }
}

/// A builder for [`FilterConfig`] that converts agent dimensions in world units into voxel units.
/// The default values are chosen to be reasonable for an agent resembling and adult human.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfigBuilder {
    /// The y-axis cell size of the heightfield. `[Limit: > 0] [Units: wu]`
    pub cell_height: f32,
    /// The height of the agent. `[Limit: > 0] [Units: wu]`
    ///
    /// It's often a good idea to add a little bit of padding to the height. For example,
    /// an agent that is 1.8 world units tall might want to set this value to 2.0 units.
    pub agent_height: f32,
    /// How far up or down the agent can step. `[Limit: >= 0] [Units: wu]`
    pub agent_max_climb: f32,
    /// The average step height per cell at which terrain counts as rugged. `[Limit: >= 0] [Units: wu]`
    pub rugged_max_average_step: f32,
    /// The area type rugged spans are marked with.
    pub rugged_area: AreaType,
    /// Which filters to run.
    pub filters: HeightfieldFilters,
}

impl Default for FilterConfigBuilder {
    fn default() -> Self {
        Self {
            cell_height: 0.2,
            agent_height: 2.0,
            agent_max_climb: 0.9,
            rugged_max_average_step: 0.3,
            rugged_area: AreaType(1),
            filters: HeightfieldFilters::DEFAULT,
        }
    }
}

impl FilterConfigBuilder {
    /// Builds a [`FilterConfig`] from the current configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell height is not positive or the resulting config does not pass [`FilterConfig::validate`].
    pub fn build(self) -> Result<FilterConfig, FilterConfigError> {
        if !(self.cell_height > 0.0) {
            return Err(FilterConfigError::InvalidCellHeight(self.cell_height));
        }
        let config = FilterConfig {
            walkable_height: (self.agent_height / self.cell_height).ceil() as u16,
            walkable_climb: (self.agent_max_climb / self.cell_height).floor() as u16,
            rugged_slope_threshold: self.rugged_max_average_step / self.cell_height,
            rugged_area: self.rugged_area,
            filters: self.filters,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur when building or validating a [`FilterConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterConfigError {
    /// Happens when the rugged area type collides with an area type the filters assign a meaning to.
    #[error("rugged area type {0:?} is reserved")]
    ReservedRuggedArea(AreaType),
    /// Happens when the rugged slope threshold is negative or NaN.
    #[error("rugged slope threshold must not be negative, got {0}")]
    NegativeSlopeThreshold(f32),
    /// Happens when the cell height is zero, negative or NaN.
    #[error("cell height must be positive, got {0}")]
    InvalidCellHeight(f32),
}
