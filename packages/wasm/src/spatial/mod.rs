//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree over laid-out card rectangles so the
//! drag controller can resolve the card under a pointer without scanning
//! every position.

mod rtree;

pub use rtree::{CardIndex, CardRect};
