pub mod attendance;
pub mod audit;
pub mod catalog;
pub mod common;
pub mod contracts;
pub mod documents;
pub mod employee;
pub mod identity;
pub mod medical;
pub mod organization;
pub mod payroll;
