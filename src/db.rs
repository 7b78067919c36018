pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod document_repo;
pub use document_repo::DocumentRepository;
pub mod dynamic_field_repo;
pub use dynamic_field_repo::DynamicFieldRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod identity_repo;
pub use identity_repo::IdentityRepository;
pub mod medical_repo;
pub use medical_repo::MedicalRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod payroll_repo;
pub use payroll_repo::PayrollRepository;
