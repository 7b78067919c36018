// src/db/employee_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::AuditStamp,
        employee::{EmployeeRecord, EmploymentStatus, NewEmployeeRecord, NewPersonalData, PersonalData},
    },
};

#[derive(Clone, Default)]
pub struct EmployeeRepository;

impl EmployeeRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LEGAJO
    // =========================================================================

    pub async fn insert_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewEmployeeRecord,
        stamp: &AuditStamp,
    ) -> Result<EmployeeRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Número repetido no tenant cai em uq_employee_records_number
        sqlx::query_as::<_, EmployeeRecord>(
            r#"
            INSERT INTO employee_records (
                tenant_id, global_user_id, record_number, hire_date,
                termination_date, employment_status,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.global_user_id)
        .bind(input.record_number.trim())
        .bind(input.hire_date)
        .bind(input.termination_date)
        .bind(input.employment_status)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_records<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        status: Option<EmploymentStatus>,
    ) -> Result<Vec<EmployeeRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, EmployeeRecord>(
            r#"
            SELECT * FROM employee_records
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::employment_status IS NULL OR employment_status = $2)
            ORDER BY record_number
            "#,
        )
        .bind(scope)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: EmploymentStatus,
        termination_date: Option<NaiveDate>,
        stamp: &AuditStamp,
    ) -> Result<EmployeeRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, EmployeeRecord>(
            r#"
            UPDATE employee_records
            SET employment_status = $2,
                termination_date = $3,
                updated_at = $4,
                updated_by = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(termination_date)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Apaga o legajo; os dependentes vão junto (FKs em cascata).
    pub async fn delete_record<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employee_records WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  DADOS PESSOAIS (1:1, mesma chave do legajo)
    // =========================================================================

    pub async fn upsert_personal_data<'e, E>(
        &self,
        executor: E,
        record_id: Uuid,
        tenant_id: Uuid,
        input: &NewPersonalData,
        stamp: &AuditStamp,
    ) -> Result<PersonalData, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // No conflito a criação fica intacta; só o lado de atualização anda
        sqlx::query_as::<_, PersonalData>(
            r#"
            INSERT INTO personal_data (
                id, tenant_id, first_name, last_name, birth_date, marital_status,
                address, city, province, country_id,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                birth_date = EXCLUDED.birth_date,
                marital_status = EXCLUDED.marital_status,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                province = EXCLUDED.province,
                country_id = EXCLUDED.country_id,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            RETURNING *
            "#,
        )
        .bind(record_id)
        .bind(tenant_id)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(input.birth_date)
        .bind(input.marital_status.as_deref())
        .bind(input.address.as_deref())
        .bind(input.city.as_deref())
        .bind(input.province.as_deref())
        .bind(input.country_id)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }
}
