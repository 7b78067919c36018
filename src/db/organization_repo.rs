// src/db/organization_repo.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::AuditStamp,
        organization::{Department, NewDepartment, NewPosition, NewPositionAssignment, Position, PositionHistory},
    },
};

#[derive(Clone, Default)]
pub struct OrganizationRepository;

impl OrganizationRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ÁREAS (árvore)
    // =========================================================================

    /// Serializa as escritas na árvore do tenant até o fim da transação.
    pub async fn lock_hierarchy<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0))")
            .bind(format!("departments:{}", tenant_id))
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Mapa id -> pai de todas as áreas do tenant.
    pub async fn parent_map<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<HashMap<Uuid, Option<Uuid>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (Uuid, Option<Uuid>)>(
            "SELECT id, parent_id FROM departments WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn insert_department<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewDepartment,
        stamp: &AuditStamp,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (
                tenant_id, name, parent_id,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.name.trim())
        .bind(input.parent_id)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn update_parent<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        parent_id: Option<Uuid>,
        stamp: &AuditStamp,
    ) -> Result<Department, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Department>(
            r#"
            UPDATE departments
            SET parent_id = $2, updated_at = $3, updated_by = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(parent_id)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Com filhos, o banco rejeita (fk_departments_parent é RESTRICT).
    pub async fn delete_department<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_departments<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<Department>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT * FROM departments
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY name
            "#,
        )
        .bind(scope)
        .fetch_all(executor)
        .await?;

        Ok(departments)
    }

    // =========================================================================
    //  PUESTOS E HISTÓRICO
    // =========================================================================

    pub async fn insert_position<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewPosition,
        stamp: &AuditStamp,
    ) -> Result<Position, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Position>(
            r#"
            INSERT INTO positions (
                tenant_id, name, level, department_id,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.name.trim())
        .bind(input.level.as_deref())
        .bind(input.department_id)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_positions<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        department_id: Option<Uuid>,
    ) -> Result<Vec<Position>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let positions = sqlx::query_as::<_, Position>(
            r#"
            SELECT * FROM positions
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR department_id = $2)
            ORDER BY name
            "#,
        )
        .bind(scope)
        .bind(department_id)
        .fetch_all(executor)
        .await?;

        Ok(positions)
    }

    /// Fecha a entrada em aberto do legajo no dia anterior a `until`.
    pub async fn close_open_assignment<'e, E>(
        &self,
        executor: E,
        employee_record_id: Uuid,
        until: NaiveDate,
        stamp: &AuditStamp,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE position_history
            SET valid_to = $2::date - 1, updated_at = $3, updated_by = $4
            WHERE employee_record_id = $1 AND valid_to IS NULL
            "#,
        )
        .bind(employee_record_id)
        .bind(until)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert_history<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewPositionAssignment,
        stamp: &AuditStamp,
    ) -> Result<PositionHistory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Puesto de outro tenant falha em fk_position_history_position
        sqlx::query_as::<_, PositionHistory>(
            r#"
            INSERT INTO position_history (
                tenant_id, employee_record_id, position_id, valid_from, valid_to,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.position_id)
        .bind(input.valid_from)
        .bind(input.valid_to)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn history_for_record<'e, E>(
        &self,
        executor: E,
        employee_record_id: Uuid,
    ) -> Result<Vec<PositionHistory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let history = sqlx::query_as::<_, PositionHistory>(
            r#"
            SELECT * FROM position_history
            WHERE employee_record_id = $1
            ORDER BY valid_from DESC
            "#,
        )
        .bind(employee_record_id)
        .fetch_all(executor)
        .await?;

        Ok(history)
    }
}
