// src/db/contract_repo.rs

use sqlx::{postgres::PgRow, Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::{AuditStamp, EntityState, TenantScoped},
        contracts::{LaborContract, NewCatalogEntry, NewLaborContract},
    },
};

#[derive(Clone, Default)]
pub struct ContractRepository;

impl ContractRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CONVENIOS E CATEGORIAS (mesma forma: código + nome)
    // =========================================================================

    pub async fn insert_entry<'e, T, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewCatalogEntry,
        stamp: &AuditStamp,
    ) -> Result<T, AppError>
    where
        T: TenantScoped + for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO {} (tenant_id, code, name, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $4, $5)
            RETURNING *
            "#,
            T::TABLE
        );

        sqlx::query_as::<_, T>(&sql)
            .bind(tenant_id)
            .bind(input.code.trim())
            .bind(input.name.trim())
            .bind(stamp.created_at)
            .bind(stamp.created_by)
            .fetch_one(executor)
            .await
            .map_err(Into::into)
    }

    pub async fn list_entries<'e, T, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<T>, AppError>
    where
        T: TenantScoped + for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE ($1::uuid IS NULL OR tenant_id = $1) ORDER BY code",
            T::TABLE
        );

        let entries = sqlx::query_as::<_, T>(&sql)
            .bind(scope)
            .fetch_all(executor)
            .await?;

        Ok(entries)
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn insert_contract<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewLaborContract,
        stamp: &AuditStamp,
    ) -> Result<LaborContract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LaborContract>(
            r#"
            INSERT INTO labor_contracts (
                tenant_id, employee_record_id, contract_type, start_date, end_date,
                working_schedule, agreement_id, category_id,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $9, $10)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.contract_type.trim())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.working_schedule.as_deref())
        .bind(input.agreement_id)
        .bind(input.category_id)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_contracts<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        employee_record_id: Option<Uuid>,
    ) -> Result<Vec<LaborContract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contracts = sqlx::query_as::<_, LaborContract>(
            r#"
            SELECT * FROM labor_contracts
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR employee_record_id = $2)
            ORDER BY start_date DESC
            "#,
        )
        .bind(scope)
        .bind(employee_record_id)
        .fetch_all(executor)
        .await?;

        Ok(contracts)
    }

    pub async fn update_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        state: EntityState,
        stamp: &AuditStamp,
    ) -> Result<LaborContract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LaborContract>(
            r#"
            UPDATE labor_contracts
            SET state = $2, updated_at = $3, updated_by = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(state)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }
}
