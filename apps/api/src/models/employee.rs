use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single employee record as stored in the profiles dataset.
///
/// Only the fields the service reads are typed; everything else is kept in
/// the flattened `extra` maps. Absent `skills`, `competencies` and skill or
/// competency details default to empty, so this view is not a faithful echo of
/// the stored record; `DatasetStore::get_employee_record` serves that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub employee_id: String,
    pub personal_info: PersonalInfo,
    pub employment_info: EmploymentInfo,
    #[serde(default)]
    pub skills: Vec<EmployeeSkill>,
    #[serde(default)]
    pub competencies: Vec<Competency>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentInfo {
    pub job_title: String,
    pub department: String,
    /// ISO date string; only the leading year is interpreted.
    pub hire_date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSkill {
    pub skill_name: String,
    #[serde(default)]
    pub function_area: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competency {
    pub name: String,
    /// Free-form in the source data: a label like "Advanced" or a number.
    #[serde(default)]
    pub level: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Competency {
    /// `name (level)`, or just the name when no level is recorded.
    pub fn summary(&self) -> String {
        match &self.level {
            Value::Null => self.name.clone(),
            Value::String(level) => format!("{} ({})", self.name, level),
            other => format!("{} ({})", self.name, other),
        }
    }
}

/// Simplified row returned by `GET /api/employees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: String,
    pub name: String,
    pub title: String,
    pub department: String,
}

impl From<&EmployeeProfile> for EmployeeSummary {
    fn from(profile: &EmployeeProfile) -> Self {
        Self {
            id: profile.employee_id.clone(),
            name: profile.personal_info.name.clone(),
            title: profile.employment_info.job_title.clone(),
            department: profile.employment_info.department.clone(),
        }
    }
}
