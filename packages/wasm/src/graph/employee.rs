//! Employee record and related structures.
//!
//! Employees are the vertices of the org chart. Each employee has:
//! - A stable opaque identifier assigned by the persistence collaborator
//! - Display fields (name, designation, team, contact details, avatar)
//! - An optional manager reference (`None` means the employee is a root)

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable employee identifier.
///
/// Opaque to the core: it is only compared, hashed and echoed back to the
/// persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    /// Create a new EmployeeId.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EmployeeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<EmployeeId> for String {
    #[inline]
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

/// A single employee record as owned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub manager_id: Option<EmployeeId>,
}

impl Employee {
    /// Create an employee with only an id, a name and a manager.
    pub fn new(id: impl Into<EmployeeId>, name: impl Into<String>, manager_id: Option<EmployeeId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            designation: String::new(),
            team: String::new(),
            email: String::new(),
            phone: String::new(),
            avatar: String::new(),
            manager_id,
        }
    }

    /// Builder-style team assignment.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    /// Builder-style designation assignment.
    pub fn with_designation(mut self, designation: impl Into<String>) -> Self {
        self.designation = designation.into();
        self
    }
}

/// Fields for a new employee. The collaborator assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEmployee {
    pub name: String,
    pub designation: String,
    pub team: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub manager_id: Option<EmployeeId>,
}

impl NewEmployee {
    /// Materialize the record once the collaborator has picked an id.
    pub fn into_employee(self, id: EmployeeId, default_avatar: &str) -> Employee {
        Employee {
            id,
            name: self.name,
            designation: self.designation,
            team: self.team,
            email: self.email,
            phone: self.phone,
            avatar: self.avatar.unwrap_or_else(|| default_avatar.to_owned()),
            manager_id: self.manager_id,
        }
    }
}

/// Partial update. `None` leaves a field untouched.
///
/// `manager_id` is doubly optional: `Some(None)` clears the manager (the
/// employee becomes a root), `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub manager_id: Option<Option<EmployeeId>>,
}

/// Distinguishes an explicit `null` from a missing key.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl EmployeePatch {
    /// A patch that only moves the employee under `manager`.
    pub fn reparent(manager: Option<EmployeeId>) -> Self {
        Self {
            manager_id: Some(manager),
            ..Self::default()
        }
    }

    /// A patch that overwrites every mutable field with `snapshot`'s values.
    pub fn full(snapshot: &Employee) -> Self {
        Self {
            name: Some(snapshot.name.clone()),
            designation: Some(snapshot.designation.clone()),
            team: Some(snapshot.team.clone()),
            email: Some(snapshot.email.clone()),
            phone: Some(snapshot.phone.clone()),
            avatar: Some(snapshot.avatar.clone()),
            manager_id: Some(snapshot.manager_id.clone()),
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place.
    pub fn apply(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name.clone_from(name);
        }
        if let Some(designation) = &self.designation {
            employee.designation.clone_from(designation);
        }
        if let Some(team) = &self.team {
            employee.team.clone_from(team);
        }
        if let Some(email) = &self.email {
            employee.email.clone_from(email);
        }
        if let Some(phone) = &self.phone {
            employee.phone.clone_from(phone);
        }
        if let Some(avatar) = &self.avatar {
            employee.avatar.clone_from(avatar);
        }
        if let Some(manager_id) = &self.manager_id {
            employee.manager_id.clone_from(manager_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id() {
        let id = EmployeeId::new("42");
        assert_eq!(id.as_str(), "42");
        assert_eq!(format!("{}", id), "42");
    }

    #[test]
    fn test_employee_id_conversion() {
        let id: EmployeeId = "7".into();
        let raw: String = id.into();
        assert_eq!(raw, "7");
    }

    #[test]
    fn test_employee_json_shape() {
        let json = r#"{"id":"2","name":"Ada","designation":"CTO","team":"Technology",
            "email":"ada@example.com","phone":"+1","avatar":"","managerId":"1"}"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.manager_id, Some(EmployeeId::from("1")));

        let back = serde_json::to_value(&employee).unwrap();
        assert_eq!(back["managerId"], "1");
    }

    #[test]
    fn test_null_manager_is_top_level() {
        let employee: Employee =
            serde_json::from_str(r#"{"id":"1","name":"Root","managerId":null}"#).unwrap();
        assert_eq!(employee.manager_id, None);
        assert_eq!(employee.team, "");
    }

    #[test]
    fn test_patch_distinguishes_null_from_missing() {
        let clear: EmployeePatch = serde_json::from_str(r#"{"managerId":null}"#).unwrap();
        assert_eq!(clear.manager_id, Some(None));

        let untouched: EmployeePatch = serde_json::from_str(r#"{"name":"B"}"#).unwrap();
        assert_eq!(untouched.manager_id, None);
        assert_eq!(untouched.name.as_deref(), Some("B"));
    }

    #[test]
    fn test_patch_apply_partial() {
        let mut employee = Employee::new("3", "Lin", Some("1".into())).with_team("Ops");
        EmployeePatch::reparent(Some("2".into())).apply(&mut employee);
        assert_eq!(employee.manager_id, Some("2".into()));
        assert_eq!(employee.team, "Ops");
        assert_eq!(employee.name, "Lin");
    }

    #[test]
    fn test_full_patch_restores_every_field() {
        let before = Employee::new("3", "Lin", Some("1".into()))
            .with_team("Ops")
            .with_designation("Lead");
        let mut after = before.clone();
        after.name = "Lin R.".into();
        after.team = "Platform".into();
        after.manager_id = None;

        EmployeePatch::full(&before).apply(&mut after);
        assert_eq!(after, before);
    }

    #[test]
    fn test_new_employee_default_avatar() {
        let fields = NewEmployee {
            name: "Sam".into(),
            ..NewEmployee::default()
        };
        let employee = fields.into_employee("11".into(), "placeholder.png");
        assert_eq!(employee.avatar, "placeholder.png");
        assert_eq!(employee.manager_id, None);
    }
}
