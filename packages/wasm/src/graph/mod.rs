//! Employee data structures and reporting-line operations.
//!
//! This module holds the employee record types, the forest builder that
//! turns a flat manager-referencing list into drawable trees, the
//! petgraph-backed reporting directory used for descendant checks, and
//! the chart filter.

mod directory;
mod employee;
mod filter;
mod forest;

pub use directory::{Member, OrgDirectory};
pub use employee::{Employee, EmployeeId, EmployeePatch, NewEmployee};
pub use filter::{EmployeeFilter, TeamFilter, teams};
pub use forest::{TreeNode, build_forest, forest_len};
