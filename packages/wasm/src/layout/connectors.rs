//! Elbow connectors between manager and report cards.

use serde::{Deserialize, Serialize};

use super::org_tree::{LayoutConfig, Position};
use crate::graph::EmployeeId;

/// A polyline from a manager's bottom-center to a report's top-center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub from: EmployeeId,
    pub to: EmployeeId,
    /// Four logical points: start, first bend, second bend, end.
    pub points: [[f32; 2]; 4],
}

impl Connector {
    /// Flatten to `[x0, y0, x1, y1, ...]`.
    pub fn flat(&self) -> [f32; 8] {
        let [a, b, c, d] = self.points;
        [a[0], a[1], b[0], b[1], c[0], c[1], d[0], d[1]]
    }
}

/// Route one connector per non-root position.
///
/// The vertical leg out of the parent meets the horizontal run at half the
/// gap between the parent's bottom edge and the child's top edge.
pub fn connectors(positions: &[Position], config: &LayoutConfig) -> Vec<Connector> {
    let half = config.card_width / 2.0;
    positions
        .iter()
        .filter_map(|p| {
            let from = p.parent_id.clone()?;
            let px = p.parent_x?;
            let py = p.parent_y?;

            let start = [px + half, py + config.card_height];
            let end = [p.x + half, p.y];
            let mid_y = (start[1] + end[1]) / 2.0;

            Some(Connector {
                from,
                to: p.id.clone(),
                points: [start, [start[0], mid_y], [end[0], mid_y], end],
            })
        })
        .collect()
}
