// src/db/medical_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        attendance::RequestState,
        common::AuditStamp,
        medical::{MedicalExam, MedicalRequest, NewMedicalExam, NewMedicalRequest},
    },
};

#[derive(Clone, Default)]
pub struct MedicalRepository;

impl MedicalRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_request<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewMedicalRequest,
        stamp: &AuditStamp,
    ) -> Result<MedicalRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MedicalRequest>(
            r#"
            INSERT INTO medical_requests (
                tenant_id, employee_record_id, request_type, requested_at, detail,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $4, $6, $4, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.request_type.trim())
        .bind(stamp.created_at)
        .bind(input.detail.as_deref())
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn update_request_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        state: RequestState,
        stamp: &AuditStamp,
    ) -> Result<MedicalRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MedicalRequest>(
            r#"
            UPDATE medical_requests
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

    pub async fn list_requests<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        employee_record_id: Option<Uuid>,
    ) -> Result<Vec<MedicalRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requests = sqlx::query_as::<_, MedicalRequest>(
            r#"
            SELECT * FROM medical_requests
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR employee_record_id = $2)
            ORDER BY requested_at DESC
            "#,
        )
        .bind(scope)
        .bind(employee_record_id)
        .fetch_all(executor)
        .await?;

        Ok(requests)
    }

    pub async fn insert_exam<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewMedicalExam,
        stamp: &AuditStamp,
    ) -> Result<MedicalExam, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MedicalExam>(
            r#"
            INSERT INTO medical_exams (
                tenant_id, employee_record_id, exam_type, exam_date, result,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.exam_type.trim())
        .bind(input.exam_date)
        .bind(input.result.as_deref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_exams<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        employee_record_id: Option<Uuid>,
    ) -> Result<Vec<MedicalExam>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exams = sqlx::query_as::<_, MedicalExam>(
            r#"
            SELECT * FROM medical_exams
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR employee_record_id = $2)
            ORDER BY exam_date DESC
            "#,
        )
        .bind(scope)
        .bind(employee_record_id)
        .fetch_all(executor)
        .await?;

        Ok(exams)
    }
}
