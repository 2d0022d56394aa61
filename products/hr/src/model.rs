//! Employee, department and position records.
//!
//! Cross references between records are display names, not ids: an
//! employee's `department` is matched against `Department::name` and its
//! `position` against `Position::title`. Renaming one side silently breaks
//! the join. `employee_count` on departments and positions is sample data
//! unless [`crate::config::CountMode::Derived`] is selected.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::HrError;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Employee,
    Department,
    Position,
}

impl EntityKind {
    /// Collection name used in routes and CLI arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Employee => "employees",
            EntityKind::Department => "departments",
            EntityKind::Position => "positions",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Department => "department",
            EntityKind::Position => "position",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for EntityKind {
    type Err = HrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employee" | "employees" => Ok(EntityKind::Employee),
            "department" | "departments" => Ok(EntityKind::Department),
            "position" | "positions" => Ok(EntityKind::Position),
            other => Err(HrError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    OnLeave,
}

impl EmployeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
            EmployeeStatus::OnLeave => "on-leave",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DepartmentStatus {
    Active,
    Inactive,
}

impl DepartmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DepartmentStatus::Active => "active",
            DepartmentStatus::Inactive => "inactive",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    Active,
    Inactive,
    Draft,
}

impl PositionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionStatus::Active => "active",
            PositionStatus::Inactive => "inactive",
            PositionStatus::Draft => "draft",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub status: EmployeeStatus,
    pub join_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub manager_id: Option<String>,
    pub manager_name: Option<String>,
    pub employee_count: u32,
    pub status: DepartmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub title: String,
    pub department: String,
    pub employee_count: u32,
    pub min_salary: u32,
    pub max_salary: u32,
    pub status: PositionStatus,
    pub created_at: DateTime<Utc>,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub status: EmployeeStatus,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartment {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
    #[serde(default)]
    pub employee_count: u32,
    pub status: DepartmentStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPosition {
    pub title: String,
    pub department: String,
    #[serde(default)]
    pub employee_count: u32,
    pub min_salary: u32,
    pub max_salary: u32,
    pub status: PositionStatus,
    #[serde(default)]
    pub description: String,
}

/// Partial employee update. Nullable fields distinguish "absent" (keep)
/// from an explicit `null` (clear).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub join_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub manager_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub manager_name: Option<Option<String>>,
    pub employee_count: Option<u32>,
    pub status: Option<DepartmentStatus>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionPatch {
    pub title: Option<String>,
    pub department: Option<String>,
    pub employee_count: Option<u32>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub status: Option<PositionStatus>,
    pub description: Option<String>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Employee {
    pub(crate) fn apply(&mut self, patch: EmployeePatch) {
        assign(&mut self.name, patch.name);
        assign(&mut self.email, patch.email);
        assign(&mut self.position, patch.position);
        assign(&mut self.department, patch.department);
        assign(&mut self.status, patch.status);
        assign(&mut self.join_date, patch.join_date);
        assign(&mut self.image_url, patch.image_url);
        assign(&mut self.phone_number, patch.phone_number);
        assign(&mut self.notes, patch.notes);
    }
}

impl Department {
    pub(crate) fn apply(&mut self, patch: DepartmentPatch) {
        assign(&mut self.name, patch.name);
        assign(&mut self.code, patch.code);
        assign(&mut self.description, patch.description);
        assign(&mut self.manager_id, patch.manager_id);
        assign(&mut self.manager_name, patch.manager_name);
        assign(&mut self.employee_count, patch.employee_count);
        assign(&mut self.status, patch.status);
    }
}

impl Position {
    pub(crate) fn apply(&mut self, patch: PositionPatch) {
        assign(&mut self.title, patch.title);
        assign(&mut self.department, patch.department);
        assign(&mut self.employee_count, patch.employee_count);
        assign(&mut self.min_salary, patch.min_salary);
        assign(&mut self.max_salary, patch.max_salary);
        assign(&mut self.status, patch.status);
        assign(&mut self.description, patch.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employee_status_uses_kebab_case_on_the_wire() {
        let value = serde_json::to_value(EmployeeStatus::OnLeave).unwrap();
        assert_eq!(value, json!("on-leave"));
        assert_eq!(EmployeeStatus::OnLeave.as_str(), "on-leave");
    }

    #[test]
    fn entity_kind_parses_singular_and_plural() {
        assert_eq!("Employees".parse::<EntityKind>(), Ok(EntityKind::Employee));
        assert_eq!("position".parse::<EntityKind>(), Ok(EntityKind::Position));
        assert!(matches!(
            "payroll".parse::<EntityKind>(),
            Err(HrError::UnknownKind(_))
        ));
    }

    #[test]
    fn patch_distinguishes_missing_from_null() {
        let patch: DepartmentPatch =
            serde_json::from_value(json!({ "managerName": null, "name": "People Ops" })).unwrap();
        assert_eq!(patch.manager_name, Some(None));
        assert_eq!(patch.manager_id, None);
        assert_eq!(patch.name.as_deref(), Some("People Ops"));
    }
}
