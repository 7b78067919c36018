// src/db/attendance_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        attendance::{Absence, AbsenceType, NewAbsence, NewAbsenceType, NewTimeRecord, RequestState, TimeRecord},
        common::AuditStamp,
    },
};

#[derive(Clone, Default)]
pub struct AttendanceRepository;

impl AttendanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  FICHADAS
    // =========================================================================

    pub async fn insert_time_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewTimeRecord,
        stamp: &AuditStamp,
    ) -> Result<TimeRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TimeRecord>(
            r#"
            INSERT INTO time_records (
                tenant_id, employee_record_id, work_date, check_in, check_out, source, notes,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.work_date)
        .bind(input.check_in)
        .bind(input.check_out)
        .bind(input.source)
        .bind(input.notes.as_deref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Fichadas de um legajo num intervalo fechado de datas.
    pub async fn list_time_records<'e, E>(
        &self,
        executor: E,
        employee_record_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, TimeRecord>(
            r#"
            SELECT * FROM time_records
            WHERE employee_record_id = $1
              AND work_date BETWEEN $2 AND $3
            ORDER BY work_date, check_in
            "#,
        )
        .bind(employee_record_id)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    // =========================================================================
    //  TIPOS DE AUSÊNCIA
    // =========================================================================

    pub async fn insert_absence_type<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewAbsenceType,
        stamp: &AuditStamp,
    ) -> Result<AbsenceType, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AbsenceType>(
            r#"
            INSERT INTO absence_types (
                tenant_id, country_id, name, deducts_salary, rule_code,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.country_id)
        .bind(input.name.trim())
        .bind(input.deducts_salary)
        .bind(input.rule_code.as_deref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_absence_types<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<AbsenceType>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let types = sqlx::query_as::<_, AbsenceType>(
            r#"
            SELECT * FROM absence_types
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY name
            "#,
        )
        .bind(scope)
        .fetch_all(executor)
        .await?;

        Ok(types)
    }

    // =========================================================================
    //  AUSÊNCIAS
    // =========================================================================

    pub async fn insert_absence<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewAbsence,
        stamp: &AuditStamp,
    ) -> Result<Absence, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Absence>(
            r#"
            INSERT INTO absences (
                tenant_id, employee_record_id, absence_type_id, date_from, date_to, reason,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.absence_type_id)
        .bind(input.date_from)
        .bind(input.date_to)
        .bind(input.reason.as_deref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn update_absence_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        state: RequestState,
        approved_by: Option<Uuid>,
        stamp: &AuditStamp,
    ) -> Result<Absence, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Absence>(
            r#"
            UPDATE absences
            SET state = $2,
                approved_by = COALESCE($3, approved_by),
                updated_at = $4,
                updated_by = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(state)
        .bind(approved_by)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_absences<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        state: Option<RequestState>,
    ) -> Result<Vec<Absence>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let absences = sqlx::query_as::<_, Absence>(
            r#"
            SELECT * FROM absences
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::request_state IS NULL OR state = $2)
            ORDER BY date_from DESC
            "#,
        )
        .bind(scope)
        .bind(state)
        .fetch_all(executor)
        .await?;

        Ok(absences)
    }
}
