use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::models::employee::{EmployeeProfile, EmployeeSummary};
use crate::models::taxonomy::TaxonomyEntry;

/// In-memory, read-only copy of the employee and taxonomy datasets.
///
/// Built once at startup and shared behind an `Arc`; there are no mutation
/// operations. Lookups are linear and the first matching `employee_id` wins.
///
/// Each employee is kept twice: the record exactly as it appeared in the file,
/// and a typed view used by the matcher and prompt builder.
#[derive(Debug, Default)]
pub struct DatasetStore {
    employees: Vec<EmployeeProfile>,
    records: Vec<Value>,
    taxonomy: Vec<TaxonomyEntry>,
}

impl DatasetStore {
    /// Builds a store from raw employee records. Fails if a record does not
    /// have the shape of an employee profile.
    pub fn from_records(records: Vec<Value>, taxonomy: Vec<TaxonomyEntry>) -> Result<Self> {
        let employees = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                EmployeeProfile::deserialize(record)
                    .with_context(|| format!("Employee record {index} is malformed"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            employees,
            records,
            taxonomy,
        })
    }

    /// Loads both datasets from disk. Any missing or malformed file is an error.
    pub fn load(employees_path: impl AsRef<Path>, taxonomy_path: impl AsRef<Path>) -> Result<Self> {
        let records: Vec<Value> = read_json(employees_path.as_ref())?;
        info!("Loaded {} employee profiles", records.len());

        let taxonomy: Vec<TaxonomyEntry> = read_json(taxonomy_path.as_ref())?;
        info!("Loaded {} taxonomy entries", taxonomy.len());

        Self::from_records(records, taxonomy)
            .with_context(|| format!("Invalid employee dataset '{}'", employees_path.as_ref().display()))
    }

    pub fn list_employees(&self) -> &[EmployeeProfile] {
        &self.employees
    }

    pub fn get_employee(&self, employee_id: &str) -> Option<&EmployeeProfile> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    /// The stored record for `employee_id`, byte-for-byte as loaded.
    pub fn get_employee_record(&self, employee_id: &str) -> Option<&Value> {
        self.employees
            .iter()
            .position(|e| e.employee_id == employee_id)
            .map(|index| &self.records[index])
    }

    pub fn list_taxonomy(&self) -> &[TaxonomyEntry] {
        &self.taxonomy
    }

    /// Simplified rows in dataset order.
    pub fn summaries(&self) -> Vec<EmployeeSummary> {
        self.employees.iter().map(EmployeeSummary::from).collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset file '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Dataset file '{}' is not valid JSON", path.display()))
}
