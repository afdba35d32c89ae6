//! Property-based invariant tests for forest construction, layout, the
//! viewport and drop validation.
//!
//! Verifies:
//! 1. The forest holds every employee exactly once, even with reporting loops.
//! 2. Each laid-out card's parent is its manager when the manager is present.
//! 3. Leaf counts: leaves count 1, managers count the sum of their reports.
//! 4. Cards on the same level never overlap.
//! 5. A manager sits exactly over the midpoint of its first and last report.
//! 6. `y == depth * level_height`.
//! 7. Zoom stays inside `[min_zoom, max_zoom]` under any request sequence.
//! 8. Wheel zoom keeps the logical point under the cursor fixed.
//! 9. Dropping onto a descendant is always rejected as a cycle.

use std::collections::{HashMap, HashSet};

use orgchart_wasm::error::ValidationError;
use orgchart_wasm::graph::{Employee, EmployeeId, OrgDirectory, TreeNode, build_forest, forest_len};
use orgchart_wasm::interaction::validate_drop;
use orgchart_wasm::layout::{LayoutConfig, OrgTreeLayout};
use orgchart_wasm::viewport::{Point, ViewportController, WheelDeltaMode};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

/// Acyclic org: employee `i` reports to some earlier employee or is a root.
fn arb_org() -> impl Strategy<Value = Vec<Employee>> {
    prop::collection::vec((any::<bool>(), any::<prop::sample::Index>()), 1..60).prop_map(|picks| {
        picks
            .iter()
            .enumerate()
            .map(|(i, (root, manager))| {
                let manager_id = (i > 0 && !root).then(|| EmployeeId::from(manager.index(i).to_string()));
                Employee::new(i.to_string(), format!("E{i}"), manager_id)
            })
            .collect()
    })
}

/// Arbitrary manager links, including self-reports, loops and dangling ids.
fn arb_tangled() -> impl Strategy<Value = Vec<Employee>> {
    prop::collection::vec(prop::option::of(0usize..80), 1..50).prop_map(|managers| {
        managers
            .iter()
            .enumerate()
            .map(|(i, m)| Employee::new(i.to_string(), format!("E{i}"), m.map(|m| m.to_string().into())))
            .collect()
    })
}

fn laid_out(employees: &[Employee]) -> (Vec<TreeNode>, Vec<orgchart_wasm::layout::Position>) {
    let mut forest = build_forest(employees);
    let positions = OrgTreeLayout::with_defaults().compute(&mut forest);
    (forest, positions)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Every employee appears exactly once
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn forest_contains_everyone_once(employees in arb_tangled()) {
        let (forest, positions) = laid_out(&employees);
        prop_assert_eq!(forest_len(&forest), employees.len());
        prop_assert_eq!(positions.len(), employees.len());

        let ids: HashSet<_> = positions.iter().map(|p| p.id.clone()).collect();
        prop_assert_eq!(ids.len(), employees.len(), "duplicate card in layout");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Parent matches managerId
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parent_matches_manager(employees in arb_org()) {
        let (_, positions) = laid_out(&employees);
        let managers: HashMap<_, _> = employees.iter().map(|e| (e.id.clone(), e.manager_id.clone())).collect();
        for p in &positions {
            prop_assert_eq!(&p.parent_id, &managers[&p.id], "parent of {}", p.id);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Leaf counts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn leaf_counts_sum(employees in arb_org()) {
        let (forest, _) = laid_out(&employees);
        let mut ok = true;
        for root in &forest {
            root.walk(&mut |node, _| {
                let expected = if node.is_leaf() {
                    1
                } else {
                    node.children.iter().map(|c| c.leaf_count).sum()
                };
                ok &= node.leaf_count == expected;
            });
        }
        prop_assert!(ok, "leaf count mismatch");
        let total: usize = forest.iter().map(|r| r.leaf_count).sum();
        let leaves = employees.iter().filter(|e| !employees.iter().any(|o| o.manager_id.as_ref() == Some(&e.id))).count();
        prop_assert_eq!(total, leaves);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Same-level separation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn same_level_cards_never_overlap(employees in arb_tangled()) {
        let config = LayoutConfig::default();
        let (_, positions) = laid_out(&employees);
        let mut by_depth: HashMap<u32, Vec<f32>> = HashMap::new();
        for p in &positions {
            by_depth.entry(p.depth).or_default().push(p.x);
        }
        for xs in by_depth.values_mut() {
            xs.sort_by(f32::total_cmp);
            for pair in xs.windows(2) {
                prop_assert!(
                    pair[1] - pair[0] >= config.slot_width() - 1e-2,
                    "cards at {} and {} overlap", pair[0], pair[1]
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5 & 6. Midpoint placement and level spacing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn managers_centered_over_reports(employees in arb_org()) {
        let config = LayoutConfig::default();
        let (forest, positions) = laid_out(&employees);
        let mut ok = true;
        for root in &forest {
            root.walk(&mut |node, _| {
                if let (Some(first), Some(last)) = (node.children.first(), node.children.last()) {
                    ok &= node.x == (first.x + last.x) / 2.0;
                }
            });
        }
        prop_assert!(ok, "manager not centered");
        for p in &positions {
            prop_assert_eq!(p.y, p.depth as f32 * config.level_height);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Zoom clamp
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zoom_stays_in_range(deltas in prop::collection::vec(-3.0f32..3.0, 1..40)) {
        let mut viewport = ViewportController::default();
        let (min, max) = (viewport.config().min_zoom, viewport.config().max_zoom);
        for (i, delta) in deltas.iter().enumerate() {
            // Space requests past the coalescing window so each applies.
            viewport.zoom_by(*delta, i as f64 * 1000.0);
            prop_assert!((min..=max).contains(&viewport.zoom()), "zoom {} out of range", viewport.zoom());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Wheel zoom about the cursor
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wheel_keeps_cursor_anchor(
        delta_y in -400.0f32..400.0,
        x in 0.0f32..1280.0,
        y in 0.0f32..800.0,
    ) {
        let mut viewport = ViewportController::default();
        let cursor = Point::new(x, y);
        let before = viewport.screen_to_logical(cursor);
        viewport.wheel(delta_y, WheelDeltaMode::Pixel, cursor, 0.0);
        let after = viewport.screen_to_logical(cursor);
        prop_assert!((before.x - after.x).abs() < 0.05 && (before.y - after.y).abs() < 0.05);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Descendant drops are rejected
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn descendant_drop_rejected(employees in arb_org(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let directory = OrgDirectory::from_employees(&employees);
        let dragged = &employees[a.index(employees.len())].id;
        let target = &employees[b.index(employees.len())].id;
        let result = validate_drop(&directory, dragged, target);
        if dragged != target && directory.is_above(dragged, target) {
            let is_cycle = matches!(result, Err(ValidationError::WouldCreateCycle { .. }));
            prop_assert!(is_cycle);
        }
        if result.is_ok() {
            prop_assert_ne!(directory.manager_of(dragged), Some(target));
            prop_assert!(!directory.is_above(dragged, target));
        }
    }
}
