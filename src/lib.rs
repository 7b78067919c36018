//! Núcleo de persistência multi-tenant de RRHH: legajos, estrutura
//! organizacional, contratos, asistencia, liquidações, medicina laboral,
//! documentos e auditoria, isolados por tenant.

pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

/// Migrações embutidas no binário.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
