// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AttendanceRepository, AuditRepository, CatalogRepository, ContractRepository, DocumentRepository,
        DynamicFieldRepository, EmployeeRepository, IdentityRepository, MedicalRepository,
        OrganizationRepository, PayrollRepository,
    },
    services::{
        AttendanceService, AuditService, CatalogService, ContractService, DocumentService,
        DynamicFieldService, EmployeeService, IdentityService, MedicalService, OrganizationService,
        PayrollService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        Ok(Self {
            database_url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(parse_var("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            run_migrations: parse_var("RUN_MIGRATIONS", true)?,
        })
    }
}

// Variável ausente usa o padrão; presente e inválida é erro
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado: pool e o gráfico de serviços
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog_service: CatalogService,
    pub identity_service: IdentityService,
    pub employee_service: EmployeeService,
    pub dynamic_field_service: DynamicFieldService,
    pub organization_service: OrganizationService,
    pub contract_service: ContractService,
    pub attendance_service: AttendanceService,
    pub payroll_service: PayrollService,
    pub medical_service: MedicalService,
    pub document_service: DocumentService,
    pub audit_service: AuditService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool))
    }

    /// Monta o gráfico de dependências sobre uma pool já aberta.
    pub fn from_pool(db_pool: PgPool) -> Self {
        let audit_repo = AuditRepository::new();

        Self {
            catalog_service: CatalogService::new(CatalogRepository::new(), db_pool.clone()),
            identity_service: IdentityService::new(IdentityRepository::new(), audit_repo.clone(), db_pool.clone()),
            employee_service: EmployeeService::new(EmployeeRepository::new(), audit_repo.clone(), db_pool.clone()),
            dynamic_field_service: DynamicFieldService::new(
                DynamicFieldRepository::new(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            organization_service: OrganizationService::new(
                OrganizationRepository::new(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            contract_service: ContractService::new(ContractRepository::new(), audit_repo.clone(), db_pool.clone()),
            attendance_service: AttendanceService::new(
                AttendanceRepository::new(),
                audit_repo.clone(),
                db_pool.clone(),
            ),
            payroll_service: PayrollService::new(PayrollRepository::new(), audit_repo.clone(), db_pool.clone()),
            medical_service: MedicalService::new(MedicalRepository::new(), audit_repo.clone(), db_pool.clone()),
            document_service: DocumentService::new(DocumentRepository::new(), audit_repo.clone(), db_pool.clone()),
            audit_service: AuditService::new(audit_repo, db_pool.clone()),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_fall_back_to_defaults() {
        let value: u32 = parse_var("RRHH_TEST_UNSET_VARIABLE", 5).unwrap();
        assert_eq!(value, 5);
    }

    #[test]
    fn malformed_variables_are_rejected() {
        // SAFETY: nome exclusivo deste teste, ninguém mais lê
        unsafe { env::set_var("RRHH_TEST_BAD_FLAG", "talvez") };
        let result: anyhow::Result<bool> = parse_var("RRHH_TEST_BAD_FLAG", true);
        assert!(result.is_err());

        unsafe { env::set_var("RRHH_TEST_POOL_SIZE", " 12 ") };
        let size: u32 = parse_var("RRHH_TEST_POOL_SIZE", 5).unwrap();
        assert_eq!(size, 12);
    }
}
