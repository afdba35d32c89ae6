//! Mutation requests and the persistence collaborator seam.
//!
//! The chart never talks to the network itself. Every change is described
//! as a [`MutationRequest`] carrying a ticket; the host performs the call
//! and reports back with the ticket and an [`Ack`] or a
//! [`CollaboratorError`]. Nothing is applied locally before that.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::graph::{Employee, EmployeeId, EmployeePatch, NewEmployee};

/// Correlates a request with its acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A change to the employee list, as sent to the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Mutation {
    /// Create a new employee; the collaborator assigns the id.
    Create { fields: NewEmployee },
    /// Partially update an existing employee.
    Update { id: EmployeeId, patch: EmployeePatch },
    Delete { id: EmployeeId },
    /// Re-create a deleted employee under its original id.
    Restore { employee: Employee },
}

impl Mutation {
    /// The existing employee this mutation touches, if any.
    pub fn target(&self) -> Option<&EmployeeId> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id } => Some(id),
            Self::Restore { employee } => Some(&employee.id),
        }
    }

    /// Short verb for logs and notices.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Restore { .. } => "restore",
        }
    }
}

/// A mutation handed to the host for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRequest {
    pub ticket: Ticket,
    pub mutation: Mutation,
}

/// Successful collaborator response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "employee")]
pub enum Ack {
    Created(Employee),
    Updated(Employee),
    Deleted,
    Restored(Employee),
}

/// The persistence collaborator.
///
/// Calls are synchronous. Hosts with an async transport answer through
/// the ticket path instead.
pub trait EmployeeRepository {
    fn list_employees(&self) -> Result<Vec<Employee>, CollaboratorError>;

    fn create_employee(&mut self, fields: NewEmployee) -> Result<Employee, CollaboratorError>;

    fn update_employee(
        &mut self,
        id: &EmployeeId,
        patch: &EmployeePatch,
    ) -> Result<Employee, CollaboratorError>;

    fn delete_employee(&mut self, id: &EmployeeId) -> Result<(), CollaboratorError>;

    fn restore_employee(&mut self, employee: Employee) -> Result<Employee, CollaboratorError>;

    /// Run one mutation.
    fn execute(&mut self, mutation: &Mutation) -> Result<Ack, CollaboratorError> {
        match mutation {
            Mutation::Create { fields } => self.create_employee(fields.clone()).map(Ack::Created),
            Mutation::Update { id, patch } => self.update_employee(id, patch).map(Ack::Updated),
            Mutation::Delete { id } => self.delete_employee(id).map(|()| Ack::Deleted),
            Mutation::Restore { employee } => {
                self.restore_employee(employee.clone()).map(Ack::Restored)
            }
        }
    }
}

pub const DEFAULT_AVATAR: &str =
    "https://images.pexels.com/photos/771742/pexels-photo-771742.jpeg?auto=compress&cs=tinysrgb&w=150&h=150&fit=crop";

/// In-process repository backed by a `Vec`.
///
/// New ids continue the numeric sequence of the existing ones. A failure
/// can be queued to make the next call fail once.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    employees: Vec<Employee>,
    fail_next: Option<CollaboratorError>,
}

impl InMemoryRepository {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            employees,
            fail_next: None,
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&mut self, error: CollaboratorError) {
        self.fail_next = Some(error);
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    fn check(&mut self) -> Result<(), CollaboratorError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> EmployeeId {
        let max = self
            .employees
            .iter()
            .filter_map(|e| e.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        EmployeeId::new((max + 1).to_string())
    }

    fn find_mut(&mut self, id: &EmployeeId) -> Result<&mut Employee, CollaboratorError> {
        self.employees
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| CollaboratorError::NotFound { id: id.clone() })
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl EmployeeRepository for InMemoryRepository {
    fn list_employees(&self) -> Result<Vec<Employee>, CollaboratorError> {
        Ok(self.employees.clone())
    }

    fn create_employee(&mut self, fields: NewEmployee) -> Result<Employee, CollaboratorError> {
        self.check()?;
        let employee = fields.into_employee(self.next_id(), DEFAULT_AVATAR);
        self.employees.push(employee.clone());
        Ok(employee)
    }

    fn update_employee(
        &mut self,
        id: &EmployeeId,
        patch: &EmployeePatch,
    ) -> Result<Employee, CollaboratorError> {
        self.check()?;
        let employee = self.find_mut(id)?;
        patch.apply(employee);
        Ok(employee.clone())
    }

    fn delete_employee(&mut self, id: &EmployeeId) -> Result<(), CollaboratorError> {
        self.check()?;
        let before = self.employees.len();
        self.employees.retain(|e| e.id != *id);
        if self.employees.len() == before {
            return Err(CollaboratorError::NotFound { id: id.clone() });
        }
        Ok(())
    }

    fn restore_employee(&mut self, employee: Employee) -> Result<Employee, CollaboratorError> {
        self.check()?;
        if self.employees.iter().any(|e| e.id == employee.id) {
            return Err(CollaboratorError::Rejected {
                message: format!("employee {} already exists", employee.id),
            });
        }
        self.employees.push(employee.clone());
        Ok(employee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new(vec![
            Employee::new("1", "Ada", None),
            Employee::new("9", "Bo", Some("1".into())),
            Employee::new("x-7", "Cy", Some("1".into())),
        ])
    }

    #[test]
    fn test_create_continues_numeric_ids() {
        let mut repo = repo();
        let created = repo
            .create_employee(NewEmployee {
                name: "Di".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(created.id.as_str(), "10");
        assert_eq!(created.avatar, DEFAULT_AVATAR);
        assert_eq!(repo.employees().len(), 4);
    }

    #[test]
    fn test_update_applies_patch() {
        let mut repo = repo();
        let updated = repo
            .update_employee(&"9".into(), &EmployeePatch::reparent(None))
            .unwrap();
        assert_eq!(updated.manager_id, None);
        assert_eq!(updated.name, "Bo");
    }

    #[test]
    fn test_missing_employee() {
        let mut repo = repo();
        assert_eq!(
            repo.delete_employee(&"404".into()),
            Err(CollaboratorError::NotFound { id: "404".into() })
        );
    }

    #[test]
    fn test_restore_keeps_id_and_rejects_duplicates() {
        let mut repo = repo();
        let bo = repo.employees()[1].clone();
        repo.delete_employee(&bo.id).unwrap();
        assert_eq!(repo.restore_employee(bo.clone()).unwrap().id, bo.id);
        assert!(matches!(
            repo.restore_employee(bo),
            Err(CollaboratorError::Rejected { .. })
        ));
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let mut repo = repo();
        repo.fail_next(CollaboratorError::Network {
            message: "offline".into(),
        });
        let mutation = Mutation::Delete { id: "9".into() };
        assert!(repo.execute(&mutation).is_err());
        assert_eq!(repo.execute(&mutation), Ok(Ack::Deleted));
    }

    #[test]
    fn test_mutation_wire_shape() {
        let request = MutationRequest {
            ticket: Ticket(3),
            mutation: Mutation::Update {
                id: "5".into(),
                patch: EmployeePatch::reparent(Some("2".into())),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["ticket"], 3);
        assert_eq!(json["mutation"]["kind"], "update");
        assert_eq!(json["mutation"]["patch"]["managerId"], "2");
        assert_eq!(request.mutation.target(), Some(&"5".into()));
    }
}
