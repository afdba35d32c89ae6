//! Leaf-slot org tree layout.
//!
//! Lays out a forest of reporting trees top-down on a fixed grid. Every
//! leaf reserves one horizontal slot of `card_width + sibling_gap`; a
//! parent sits at the midpoint of its first and last child.
//!
//! # Algorithm Overview
//!
//! 1. **Count leaves (post-order):** each node caches the number of leaves
//!    in its subtree. A leaf counts as 1.
//! 2. **Assign positions (pre-order cursor walk):** `y = depth * level_height`.
//!    Leaves take the current cursor as x and advance it by one slot.
//!    Internal nodes lay out their children left-to-right, then center on
//!    the unweighted midpoint of the extreme children.
//! 3. **Forest offset:** roots are laid out left-to-right, each starting
//!    where the previous root's reserved width ends.
//!
//! The midpoint rule can place a parent off-center relative to the mass of
//! an unbalanced subtree. That is the intended trade-off for a simple,
//! predictable grid. Coordinates are logical and never depend on the
//! viewport.

use serde::{Deserialize, Serialize};

use crate::graph::{EmployeeId, TreeNode};

/// Configuration for the org tree layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Card width in logical units.
    pub card_width: f32,
    /// Card height in logical units (used for hit rectangles and fitting).
    pub card_height: f32,
    /// Horizontal gap between adjacent leaf slots.
    pub sibling_gap: f32,
    /// Vertical distance between tree levels.
    pub level_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 220.0,
            card_height: 120.0,
            sibling_gap: 140.0,
            level_height: 220.0,
        }
    }
}

impl LayoutConfig {
    /// Width of one leaf slot.
    #[inline]
    pub fn slot_width(&self) -> f32 {
        self.card_width + self.sibling_gap
    }
}

/// Layout output for one node, flat and pre-ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: EmployeeId,
    pub x: f32,
    pub y: f32,
    pub parent_id: Option<EmployeeId>,
    pub parent_x: Option<f32>,
    pub parent_y: Option<f32>,
    pub depth: u32,
}

/// Axis-aligned bounds of card origins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounds of all positions, or None if there are none.
    pub fn of(positions: &[Position]) -> Option<Self> {
        let first = positions.first()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &positions[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Width including one card.
    #[inline]
    pub fn chart_width(&self, config: &LayoutConfig) -> f32 {
        self.max_x - self.min_x + config.card_width
    }

    /// Height including one card.
    #[inline]
    pub fn chart_height(&self, config: &LayoutConfig) -> f32 {
        self.max_y - self.min_y + config.card_height
    }
}

/// Post-order leaf count. Caches the result on every node.
///
/// Recurses once per reporting level.
pub fn count_leaves(node: &mut TreeNode) -> usize {
    if node.children.is_empty() {
        node.leaf_count = 1;
        return 1;
    }
    let sum = node.children.iter_mut().map(count_leaves).sum();
    node.leaf_count = sum;
    sum
}

/// Assign logical coordinates to a subtree.
///
/// Returns the next free cursor after the subtree. Recurses once per
/// reporting level.
pub fn assign_positions(node: &mut TreeNode, depth: u32, x_cursor: f32, config: &LayoutConfig) -> f32 {
    node.y = depth as f32 * config.level_height;

    if node.children.is_empty() {
        node.x = x_cursor;
        return x_cursor + config.slot_width();
    }

    let mut cursor = x_cursor;
    for child in node.children.iter_mut() {
        cursor = assign_positions(child, depth + 1, cursor, config);
    }

    // Safety: children is non-empty (checked above)
    let first_x = node.children[0].x;
    let last_x = node.children[node.children.len() - 1].x;
    node.x = (first_x + last_x) / 2.0;

    cursor
}

/// The org tree layout engine.
pub struct OrgTreeLayout {
    config: LayoutConfig,
}

impl OrgTreeLayout {
    /// Create a new layout with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out every root in registration order and flatten the result.
    ///
    /// Mutates the forest's layout fields in place and returns one
    /// `Position` per node in pre-order.
    pub fn compute(&self, forest: &mut [TreeNode]) -> Vec<Position> {
        let mut x_cursor = 0.0_f32;
        for root in forest.iter_mut() {
            let leaves = count_leaves(root);
            assign_positions(root, 0, x_cursor, &self.config);
            x_cursor += leaves as f32 * self.config.slot_width();
        }

        let mut positions = Vec::new();
        for root in forest.iter() {
            collect_positions(root, &mut positions);
        }

        tracing::debug!(
            roots = forest.len(),
            nodes = positions.len(),
            width = x_cursor,
            "org tree laid out"
        );
        positions
    }
}

impl Default for OrgTreeLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn collect_positions(root: &TreeNode, out: &mut Vec<Position>) {
    let mut stack: Vec<(&TreeNode, Option<&TreeNode>, u32)> = vec![(root, None, 0)];
    while let Some((node, parent, depth)) = stack.pop() {
        out.push(Position {
            id: node.id().clone(),
            x: node.x,
            y: node.y,
            parent_id: parent.map(|p| p.id().clone()),
            parent_x: parent.map(|p| p.x),
            parent_y: parent.map(|p| p.y),
            depth,
        });
        stack.extend(node.children.iter().rev().map(|child| (child, Some(node), depth + 1)));
    }
}
