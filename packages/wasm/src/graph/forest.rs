//! Forest construction from a flat, parent-referencing employee list.
//!
//! Builds an id→slot index once, attaches every employee to its manager
//! when the manager resolves inside the same list, and treats everything
//! else (null, dangling or self references) as a root. Children keep the
//! encounter order of the source list.

use std::collections::HashMap;

use super::employee::{Employee, EmployeeId};

/// A drawable tree node.
///
/// Owned by the layout pass that consumes it; the forest is rebuilt from
/// scratch whenever the employee list or the active filter changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// The wrapped employee record.
    pub employee: Employee,
    /// Resolved parent id (None for roots).
    pub parent: Option<EmployeeId>,
    /// Children in source encounter order.
    pub children: Vec<TreeNode>,
    /// Logical x (set by the layout pass).
    pub x: f32,
    /// Logical y (set by the layout pass).
    pub y: f32,
    /// Leaves under this node, 1 for a leaf (set by the layout pass).
    pub leaf_count: usize,
}

impl TreeNode {
    fn new(employee: Employee, parent: Option<EmployeeId>) -> Self {
        Self {
            employee,
            parent,
            children: Vec::new(),
            x: 0.0,
            y: 0.0,
            leaf_count: 0,
        }
    }

    /// The node's id.
    #[inline]
    pub fn id(&self) -> &EmployeeId {
        &self.employee.id
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including this node.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    /// Depth-first pre-order walk.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode, usize)) {
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            visit(node, depth);
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
    }
}

/// Build the forest of reporting trees.
///
/// Every input employee appears exactly once. Ids must be unique; a
/// repeated id keeps its first record. Employees caught in a reporting
/// loop are unreachable from any natural root, so the first of them in
/// source order is promoted to a root and the loop is cut there.
pub fn build_forest(employees: &[Employee]) -> Vec<TreeNode> {
    // Slot per unique id, in source order.
    let mut slot_of: HashMap<&EmployeeId, usize> = HashMap::with_capacity(employees.len());
    let mut records: Vec<&Employee> = Vec::with_capacity(employees.len());
    for employee in employees {
        if !slot_of.contains_key(&employee.id) {
            slot_of.insert(&employee.id, records.len());
            records.push(employee);
        }
    }

    let n = records.len();
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots: Vec<usize> = Vec::new();

    for (slot, employee) in records.iter().enumerate() {
        let manager = employee
            .manager_id
            .as_ref()
            .and_then(|m| slot_of.get(m).copied())
            .filter(|&m| m != slot);
        match manager {
            Some(m) => {
                parent[slot] = Some(m);
                children[m].push(slot);
            }
            None => roots.push(slot),
        }
    }

    // Anything not reachable from a root sits on a loop.
    let mut reached = vec![false; n];
    for &root in &roots {
        mark(root, &mut reached, &children);
    }
    let mut root_order = roots;
    for slot in 0..n {
        if reached[slot] {
            continue;
        }
        if let Some(p) = parent[slot].take() {
            children[p].retain(|&c| c != slot);
        }
        tracing::warn!(id = %records[slot].id, "reporting loop detected, promoting to root");
        mark(slot, &mut reached, &children);
        root_order.push(slot);
    }
    // Promoted roots take the position of their source order among roots.
    root_order.sort_unstable();

    let mut built: Vec<Option<TreeNode>> = vec![None; n];
    root_order
        .into_iter()
        .filter_map(|root| materialize(root, &records, &parent, &children, &mut built))
        .collect()
}

fn mark(start: usize, reached: &mut [bool], children: &[Vec<usize>]) {
    let mut stack = vec![start];
    while let Some(s) = stack.pop() {
        if !reached[s] {
            reached[s] = true;
            stack.extend(children[s].iter().copied());
        }
    }
}

/// Build the owned subtree under `root` bottom-up with an explicit stack,
/// so chain depth never touches the call stack.
fn materialize(
    root: usize,
    records: &[&Employee],
    parent: &[Option<usize>],
    children: &[Vec<usize>],
    built: &mut [Option<TreeNode>],
) -> Option<TreeNode> {
    let mut stack = vec![(root, false)];
    while let Some((slot, expanded)) = stack.pop() {
        if !expanded {
            stack.push((slot, true));
            stack.extend(children[slot].iter().map(|&child| (child, false)));
            continue;
        }
        let mut node = TreeNode::new(
            records[slot].clone(),
            parent[slot].map(|p| records[p].id.clone()),
        );
        node.children = children[slot]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[slot] = Some(node);
    }
    built[root].take()
}

/// Total number of nodes across a forest.
pub fn forest_len(forest: &[TreeNode]) -> usize {
    forest.iter().map(TreeNode::subtree_len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp(id: &str, manager: Option<&str>) -> Employee {
        Employee::new(id, id.to_uppercase(), manager.map(EmployeeId::from))
    }

    #[test]
    fn test_empty_input() {
        assert!(build_forest(&[]).is_empty());
    }

    #[test]
    fn test_single_tree() {
        let employees = vec![
            emp("1", None),
            emp("2", Some("1")),
            emp("3", Some("1")),
            emp("4", Some("2")),
        ];
        let forest = build_forest(&employees);
        assert_eq!(forest.len(), 1);

        let root = &forest[0];
        assert_eq!(root.id().as_str(), "1");
        assert_eq!(root.parent, None);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].id().as_str(), "2");
        assert_eq!(root.children[1].id().as_str(), "3");
        assert_eq!(root.children[0].children[0].parent, Some("2".into()));
        assert_eq!(forest_len(&forest), 4);
    }

    #[test]
    fn test_children_keep_encounter_order() {
        // Reports listed before their manager still attach in list order.
        let employees = vec![
            emp("c", Some("m")),
            emp("a", Some("m")),
            emp("m", None),
            emp("b", Some("m")),
        ];
        let forest = build_forest(&employees);
        let order: Vec<&str> = forest[0].children.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_dangling_manager_becomes_root() {
        let employees = vec![emp("1", None), emp("2", Some("missing")), emp("3", Some("2"))];
        let forest = build_forest(&employees);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].id().as_str(), "2");
        assert_eq!(forest[1].parent, None);
        assert_eq!(forest[1].children[0].id().as_str(), "3");
    }

    #[test]
    fn test_self_reference_becomes_root() {
        let forest = build_forest(&[emp("1", Some("1"))]);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].is_leaf());
    }

    #[test]
    fn test_loop_is_cut_and_everyone_appears_once() {
        let employees = vec![
            emp("root", None),
            emp("p", Some("q")),
            emp("q", Some("p")),
            emp("r", Some("q")),
        ];
        let forest = build_forest(&employees);
        assert_eq!(forest_len(&forest), 4);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].id().as_str(), "p");
        assert_eq!(forest[1].children[0].id().as_str(), "q");
        assert_eq!(forest[1].children[0].children[0].id().as_str(), "r");
    }

    #[test]
    fn test_duplicate_ids_keep_first_record() {
        let employees = vec![emp("1", None), Employee::new("1", "Shadow", None)];
        let forest = build_forest(&employees);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].employee.name, "1");
    }

    #[test]
    fn test_walk_is_pre_order() {
        let employees = vec![emp("1", None), emp("2", Some("1")), emp("3", Some("2")), emp("4", Some("1"))];
        let forest = build_forest(&employees);
        let mut seen = Vec::new();
        forest[0].walk(&mut |node, depth| seen.push((node.id().as_str().to_owned(), depth)));
        assert_eq!(
            seen,
            vec![
                ("1".to_owned(), 0),
                ("2".to_owned(), 1),
                ("3".to_owned(), 2),
                ("4".to_owned(), 1)
            ]
        );
    }

    #[test]
    fn test_deep_chain() {
        let ids: Vec<String> = (0..2000).map(|i| i.to_string()).collect();
        let employees: Vec<Employee> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| emp(id, i.checked_sub(1).map(|p| ids[p].as_str())))
            .collect();
        let forest = build_forest(&employees);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest_len(&forest), 2000);
        let mut deepest = 0;
        forest[0].walk(&mut |_, depth| deepest = deepest.max(depth));
        assert_eq!(deepest, 1999);
    }
}
