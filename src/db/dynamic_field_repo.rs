// src/db/dynamic_field_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::AuditStamp,
        employee::{DynamicFieldDefinition, DynamicFieldEntry, DynamicFieldValue, NewDynamicFieldDefinition},
    },
};

#[derive(Clone, Default)]
pub struct DynamicFieldRepository;

impl DynamicFieldRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  DEFINIÇÕES (O Molde)
    // =========================================================================

    pub async fn insert_definition<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewDynamicFieldDefinition,
        stamp: &AuditStamp,
    ) -> Result<DynamicFieldDefinition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, DynamicFieldDefinition>(
            r#"
            INSERT INTO dynamic_field_definitions (
                tenant_id, name, description, field_type, is_required, config,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.name.trim())
        .bind(input.description.as_deref())
        .bind(input.field_type)
        .bind(input.is_required)
        .bind(input.config.as_ref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_definitions<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<DynamicFieldDefinition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let fields = sqlx::query_as::<_, DynamicFieldDefinition>(
            r#"
            SELECT * FROM dynamic_field_definitions
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(scope)
        .fetch_all(executor)
        .await?;

        Ok(fields)
    }

    // =========================================================================
    //  VALORES (O Dado)
    // =========================================================================

    /// Um valor por (definição, legajo): gravar de novo substitui o texto.
    pub async fn upsert_value<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        definition_id: Uuid,
        employee_record_id: Uuid,
        value: Option<&str>,
        stamp: &AuditStamp,
    ) -> Result<DynamicFieldValue, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, DynamicFieldValue>(
            r#"
            INSERT INTO dynamic_field_values (
                tenant_id, definition_id, employee_record_id, value,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $5, $6)
            ON CONFLICT ON CONSTRAINT uq_dynamic_field_values_entry DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at,
                updated_by = EXCLUDED.updated_by
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(definition_id)
        .bind(employee_record_id)
        .bind(value)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn entries_for_record<'e, E>(
        &self,
        executor: E,
        employee_record_id: Uuid,
    ) -> Result<Vec<DynamicFieldEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, DynamicFieldEntry>(
            r#"
            SELECT d.id AS definition_id, d.name, d.field_type, v.value, v.updated_at
            FROM dynamic_field_values v
            JOIN dynamic_field_definitions d ON d.id = v.definition_id
            WHERE v.employee_record_id = $1
            ORDER BY d.name
            "#,
        )
        .bind(employee_record_id)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }
}
