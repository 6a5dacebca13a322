#![doc = include_str!("../../../readme.md")]

mod column;
mod config;
mod heightfield;
mod ledge;
mod low_height;
mod main_api;
pub(crate) mod math;
mod pre_filter;
mod rugged;
mod span;

pub use column::{Column, ColumnError};
pub use config::{FilterConfig, FilterConfigBuilder, FilterConfigError, HeightfieldFilters};
pub use heightfield::{Heightfield, HeightfieldBuilder, HeightfieldBuilderError, HeightfieldError};
pub use math::Aabb3d;
pub use span::{AreaType, Span, SpanBuilder, SpanHandle};
