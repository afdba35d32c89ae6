//! Layout algorithms for the org chart.
//!
//! This module computes logical card coordinates for a forest of reporting
//! trees and routes the connectors drawn between them. Coordinates live in
//! unscaled space; the viewport transform is applied at presentation time.

pub mod connectors;
pub mod org_tree;

pub use connectors::{Connector, connectors};
pub use org_tree::{Bounds, LayoutConfig, OrgTreeLayout, Position, assign_positions, count_leaves};
