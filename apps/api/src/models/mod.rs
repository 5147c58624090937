pub mod employee;
pub mod taxonomy;
