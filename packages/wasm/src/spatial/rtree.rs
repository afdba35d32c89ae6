//! R-tree of card rectangles using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Nearest-center hit testing under a pointer
//! - Rectangle intersection (visible cards)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::EmployeeId;
use crate::layout::{LayoutConfig, Position};

/// A card's logical rectangle with its employee id.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRect {
    /// The employee drawn on this card.
    pub id: EmployeeId,
    /// Top-left corner.
    pub min: [f32; 2],
    /// Bottom-right corner.
    pub max: [f32; 2],
}

impl CardRect {
    /// Create a card rectangle from its top-left origin and size.
    pub fn new(id: EmployeeId, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            min: [x, y],
            max: [x + width, y + height],
        }
    }

    /// Center of the rectangle.
    #[inline]
    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    /// Squared distance from the rectangle's center to a point.
    #[inline]
    pub fn center_distance_2(&self, point: &[f32; 2]) -> f32 {
        let c = self.center();
        let dx = c[0] - point[0];
        let dy = c[1] - point[1];
        dx * dx + dy * dy
    }
}

impl RTreeObject for CardRect {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PointDistance for CardRect {
    /// Squared distance to the nearest point of the rectangle (0 inside).
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = (self.min[0] - point[0]).max(0.0).max(point[0] - self.max[0]);
        let dy = (self.min[1] - point[1]).max(0.0).max(point[1] - self.max[1]);
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }
}

/// Spatial index over the cards of the current layout.
///
/// Rebuilt in bulk after every layout pass.
pub struct CardIndex {
    tree: RTree<CardRect>,
}

impl CardIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index from a layout result.
    pub fn from_positions(positions: &[Position], config: &LayoutConfig) -> Self {
        let mut index = Self::new();
        index.rebuild(positions, config);
        index
    }

    /// Replace all cards with those of a new layout.
    pub fn rebuild(&mut self, positions: &[Position], config: &LayoutConfig) {
        let cards: Vec<_> = positions
            .iter()
            .map(|p| CardRect::new(p.id.clone(), p.x, p.y, config.card_width, config.card_height))
            .collect();

        self.tree = RTree::bulk_load(cards);
    }

    /// Hit test a logical point.
    ///
    /// Among the cards whose rectangle lies within `slop` of the point,
    /// returns the one whose center is nearest. Ties keep whichever the
    /// tree yields first.
    pub fn hit_test(&self, x: f32, y: f32, slop: f32) -> Option<&EmployeeId> {
        let point = [x, y];
        self.tree
            .locate_within_distance(point, slop * slop)
            .min_by(|a, b| {
                a.center_distance_2(&point)
                    .total_cmp(&b.center_distance_2(&point))
            })
            .map(|card| &card.id)
    }

    /// Cards intersecting a logical rectangle.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<EmployeeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|card| card.id.clone())
            .collect()
    }

    /// Get the number of cards in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for CardIndex {
    fn default() -> Self {
        Self::new()
    }
}
