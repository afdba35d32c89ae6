//! Search and team filtering of the employee list.

use serde::{Deserialize, Serialize};

use super::employee::Employee;

/// Team selector. `All` shows the whole forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    /// Parse the host's selector value (`"all"` selects everything).
    pub fn from_selector(selector: &str) -> Self {
        if selector.is_empty() || selector.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Team(selector.to_owned())
        }
    }
}

/// Active chart filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeFilter {
    /// Case-insensitive substring over name, designation, team and email.
    pub search: String,
    pub team: TeamFilter,
}

impl EmployeeFilter {
    /// Whether no filter is active.
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.team == TeamFilter::All
    }

    /// Whether a single team is selected (the fit bias depends on it).
    pub fn is_team_view(&self) -> bool {
        matches!(self.team, TeamFilter::Team(_))
    }

    /// Whether one employee passes the filter.
    pub fn matches(&self, employee: &Employee) -> bool {
        if let TeamFilter::Team(team) = &self.team {
            if employee.team != *team {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        [
            &employee.name,
            &employee.designation,
            &employee.team,
            &employee.email,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }

    /// Filtered copy of the list, preserving order.
    pub fn apply(&self, employees: &[Employee]) -> Vec<Employee> {
        if self.is_empty() {
            return employees.to_vec();
        }
        employees
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}

/// Sorted, de-duplicated team names.
pub fn teams(employees: &[Employee]) -> Vec<String> {
    let mut teams: Vec<String> = employees.iter().map(|e| e.team.clone()).collect();
    teams.sort();
    teams.dedup();
    teams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> Vec<Employee> {
        let mut cto = Employee::new("2", "Grace", Some("1".into()))
            .with_team("Technology")
            .with_designation("CTO");
        cto.email = "grace@example.com".into();
        vec![
            Employee::new("1", "Ada", None).with_team("Executive").with_designation("CEO"),
            cto,
            Employee::new("3", "Linus", Some("2".into())).with_team("Technology"),
            Employee::new("4", "Barbara", Some("1".into())).with_team("Human Resource"),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = EmployeeFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&staff()).len(), 4);
    }

    #[test]
    fn test_team_filter() {
        let filter = EmployeeFilter {
            team: TeamFilter::Team("Technology".into()),
            ..Default::default()
        };
        assert!(filter.is_team_view());
        let ids: Vec<_> = filter.apply(&staff()).into_iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let by_designation = EmployeeFilter {
            search: "cto".into(),
            ..Default::default()
        };
        assert_eq!(by_designation.apply(&staff()).len(), 1);

        let by_email = EmployeeFilter {
            search: "GRACE@".into(),
            ..Default::default()
        };
        assert_eq!(by_email.apply(&staff())[0].id.as_str(), "2");
    }

    #[test]
    fn test_search_and_team_combine() {
        let filter = EmployeeFilter {
            search: "linus".into(),
            team: TeamFilter::Team("Executive".into()),
        };
        assert!(filter.apply(&staff()).is_empty());
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(TeamFilter::from_selector("all"), TeamFilter::All);
        assert_eq!(TeamFilter::from_selector(""), TeamFilter::All);
        assert_eq!(
            TeamFilter::from_selector("Testing"),
            TeamFilter::Team("Testing".into())
        );
    }

    #[test]
    fn test_teams_sorted_unique() {
        assert_eq!(
            teams(&staff()),
            vec!["Executive", "Human Resource", "Technology"]
        );
    }
}
