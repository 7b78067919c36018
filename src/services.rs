pub mod attendance_service;
pub use attendance_service::AttendanceService;
pub mod audit_service;
pub use audit_service::AuditService;
pub mod catalog_service;
pub use catalog_service::CatalogService;
pub mod contract_service;
pub use contract_service::ContractService;
pub mod document_service;
pub use document_service::DocumentService;
pub mod dynamic_field_service;
pub use dynamic_field_service::DynamicFieldService;
pub mod employee_service;
pub use employee_service::EmployeeService;
pub mod identity_service;
pub use identity_service::IdentityService;
pub mod medical_service;
pub use medical_service::MedicalService;
pub mod organization_service;
pub use organization_service::OrganizationService;
pub mod payroll_service;
pub use payroll_service::PayrollService;
