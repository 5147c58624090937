// Read-only views over the employee and taxonomy datasets.

pub mod handlers;
