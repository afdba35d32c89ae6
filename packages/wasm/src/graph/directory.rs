//! OrgDirectory - reporting-line graph over the full employee list.
//!
//! The directory stores manager→report edges in petgraph's StableGraph and
//! keeps an id→index map for O(1) lookups. It answers the structural
//! questions the drag-drop validator needs (who manages whom, is a node
//! inside another node's subtree) without touching layout state.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use std::collections::{HashMap, HashSet};

use super::employee::{Employee, EmployeeId};

/// Directory entry stored on each graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: EmployeeId,
    pub name: String,
}

/// Reporting-line graph.
///
/// Edges point from manager to report. Dangling manager references and
/// self references produce no edge, matching the forest builder's policy
/// of treating those employees as roots.
pub struct OrgDirectory {
    /// Nodes store id and display name, edges carry no weight.
    graph: StableGraph<Member, (), Directed>,

    /// Map from EmployeeId to petgraph NodeIndex
    id_to_index: HashMap<EmployeeId, NodeIndex>,
}

impl OrgDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Build the directory from a full employee snapshot.
    pub fn from_employees(employees: &[Employee]) -> Self {
        let mut directory = Self {
            graph: StableGraph::with_capacity(employees.len(), employees.len()),
            id_to_index: HashMap::with_capacity(employees.len()),
        };
        directory.rebuild(employees);
        directory
    }

    /// Replace the contents with a new snapshot.
    pub fn rebuild(&mut self, employees: &[Employee]) {
        self.graph.clear();
        self.id_to_index.clear();

        // The first record for an id wins; later duplicates are skipped whole.
        let mut kept: Vec<&Employee> = Vec::with_capacity(employees.len());
        for employee in employees {
            if self.id_to_index.contains_key(&employee.id) {
                tracing::warn!(id = %employee.id, "duplicate employee id ignored");
                continue;
            }
            let index = self.graph.add_node(Member {
                id: employee.id.clone(),
                name: employee.name.clone(),
            });
            self.id_to_index.insert(employee.id.clone(), index);
            kept.push(employee);
        }

        for employee in kept {
            let Some(manager_id) = &employee.manager_id else {
                continue;
            };
            if *manager_id == employee.id {
                continue;
            }
            if let (Some(&manager), Some(&report)) = (
                self.id_to_index.get(manager_id),
                self.id_to_index.get(&employee.id),
            ) {
                self.graph.add_edge(manager, report, ());
            }
        }
    }

    /// Number of employees known to the directory.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether an employee with this id exists.
    pub fn contains(&self, id: &EmployeeId) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// The resolved manager of an employee (None for roots and unknown ids).
    pub fn manager_of(&self, id: &EmployeeId) -> Option<&EmployeeId> {
        let index = *self.id_to_index.get(id)?;
        self.graph
            .neighbors_directed(index, Direction::Incoming)
            .next()
            .and_then(|manager| self.graph.node_weight(manager))
            .map(|member| &member.id)
    }

    /// Display name of an employee.
    pub fn name_of(&self, id: &EmployeeId) -> Option<&str> {
        let index = *self.id_to_index.get(id)?;
        self.graph.node_weight(index).map(|member| member.name.as_str())
    }

    /// Whether `ancestor` appears on `id`'s reporting chain (strictly above it).
    ///
    /// Walks manager links upward from `id`. A visited set bounds the walk
    /// so corrupted input containing a loop still terminates.
    pub fn is_above(&self, ancestor: &EmployeeId, id: &EmployeeId) -> bool {
        let mut visited: HashSet<&EmployeeId> = HashSet::new();
        let mut current = self.manager_of(id);
        while let Some(manager) = current {
            if manager == ancestor {
                return true;
            }
            if !visited.insert(manager) {
                return false;
            }
            current = self.manager_of(manager);
        }
        false
    }

    /// Number of employees in the subtree rooted at `id`, including `id`.
    pub fn subtree_size(&self, id: &EmployeeId) -> usize {
        let Some(&root) = self.id_to_index.get(id) else {
            return 0;
        };
        let mut count = 0;
        let mut stack = vec![root];
        let mut visited = HashSet::new();
        visited.insert(root);
        while let Some(n) = stack.pop() {
            count += 1;
            for child in self.graph.neighbors_directed(n, Direction::Outgoing) {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }
        count
    }
}

impl Default for OrgDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Employee> {
        vec![
            Employee::new("a", "A", None),
            Employee::new("b", "B", Some("a".into())),
            Employee::new("c", "C", Some("b".into())),
            Employee::new("d", "D", Some("a".into())),
        ]
    }

    #[test]
    fn test_manager_of() {
        let directory = OrgDirectory::from_employees(&chain());
        assert_eq!(directory.len(), 4);
        assert_eq!(directory.manager_of(&"c".into()), Some(&"b".into()));
        assert_eq!(directory.manager_of(&"a".into()), None);
        assert_eq!(directory.manager_of(&"zzz".into()), None);
    }

    #[test]
    fn test_name_of() {
        let directory = OrgDirectory::from_employees(&chain());
        assert_eq!(directory.name_of(&"b".into()), Some("B"));
        assert_eq!(directory.name_of(&"nobody".into()), None);
    }

    #[test]
    fn test_duplicate_id_keeps_first_record_whole() {
        let employees = vec![
            Employee::new("a", "A", None),
            Employee::new("b", "B", None),
            Employee::new("b", "B again", Some("a".into())),
        ];
        let directory = OrgDirectory::from_employees(&employees);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.manager_of(&"b".into()), None);
        assert_eq!(directory.name_of(&"b".into()), Some("B"));

        // Agrees with the forest: both records' id is drawn once, as a root.
        let forest = crate::graph::build_forest(&employees);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_is_above() {
        let directory = OrgDirectory::from_employees(&chain());
        assert!(directory.is_above(&"a".into(), &"c".into()));
        assert!(directory.is_above(&"b".into(), &"c".into()));
        assert!(!directory.is_above(&"c".into(), &"a".into()));
        assert!(!directory.is_above(&"d".into(), &"c".into()));
        assert!(!directory.is_above(&"a".into(), &"a".into()));
    }

    #[test]
    fn test_dangling_manager_has_no_edge() {
        let employees = vec![
            Employee::new("x", "X", Some("ghost".into())),
            Employee::new("y", "Y", Some("y".into())),
        ];
        let directory = OrgDirectory::from_employees(&employees);
        assert_eq!(directory.manager_of(&"x".into()), None);
        assert_eq!(directory.manager_of(&"y".into()), None);
    }

    #[test]
    fn test_loop_in_input_terminates() {
        let employees = vec![
            Employee::new("p", "P", Some("q".into())),
            Employee::new("q", "Q", Some("p".into())),
        ];
        let directory = OrgDirectory::from_employees(&employees);
        assert!(directory.is_above(&"q".into(), &"p".into()));
        assert!(!directory.is_above(&"r".into(), &"p".into()));
    }

    #[test]
    fn test_subtree_size() {
        let directory = OrgDirectory::from_employees(&chain());
        assert_eq!(directory.subtree_size(&"a".into()), 4);
        assert_eq!(directory.subtree_size(&"b".into()), 2);
        assert_eq!(directory.subtree_size(&"c".into()), 1);
        assert_eq!(directory.subtree_size(&"missing".into()), 0);
    }

    #[test]
    fn test_rebuild_replaces_snapshot() {
        let mut directory = OrgDirectory::from_employees(&chain());
        directory.rebuild(&[Employee::new("solo", "Solo", None)]);
        assert_eq!(directory.len(), 1);
        assert!(!directory.contains(&"a".into()));
        assert!(directory.contains(&"solo".into()));
    }
}
