//! Project normalization and view ordering.
//!
//! This module is the pure core of the application: it converts the raw
//! fetched feed into canonical [`Project`] values and derives the display
//! orderings for the timeline and vault views. Nothing in here touches the
//! network, the cache, or the terminal.

mod raw;
mod types;
mod view;

pub use raw::{normalize, DataFormatError};
pub use types::{extract_youtube_id, Link, MediaItem, MediaKind, Project, PRESENT_MOMENT_ID};
pub use view::{
  format_date, format_clock, grid_order, present_moment, timeline_order, timeline_rows,
  unique_types, TimelineRow, YearLabel,
};
