// src/db/payroll_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::AuditStamp,
        payroll::{
            Concept, NewConcept, NewPayrollRun, PayrollConceptLine, PayrollRun, PayrollRunItem,
            PayrollRunState,
        },
    },
};

#[derive(Clone, Default)]
pub struct PayrollRepository;

impl PayrollRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CONCEITOS
    // =========================================================================

    pub async fn insert_concept<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewConcept,
        stamp: &AuditStamp,
    ) -> Result<Concept, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Código repetido no tenant cai em uq_concepts_code
        sqlx::query_as::<_, Concept>(
            r#"
            INSERT INTO concepts (
                tenant_id, country_id, code, name, kind, formula,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.country_id)
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(input.kind)
        .bind(input.formula.as_deref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_concepts<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<Concept>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let concepts = sqlx::query_as::<_, Concept>(
            r#"
            SELECT * FROM concepts
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY code
            "#,
        )
        .bind(scope)
        .fetch_all(executor)
        .await?;

        Ok(concepts)
    }

    // =========================================================================
    //  LIQUIDAÇÕES
    // =========================================================================

    pub async fn insert_run<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewPayrollRun,
        stamp: &AuditStamp,
    ) -> Result<PayrollRun, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // (tenant, período, tipo) repetido cai em uq_payroll_runs_period_type
        sqlx::query_as::<_, PayrollRun>(
            r#"
            INSERT INTO payroll_runs (
                tenant_id, period, run_type,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&input.period)
        .bind(input.run_type)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_runs<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        period: Option<&str>,
    ) -> Result<Vec<PayrollRun>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let runs = sqlx::query_as::<_, PayrollRun>(
            r#"
            SELECT * FROM payroll_runs
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::varchar IS NULL OR period = $2)
            ORDER BY period DESC, run_type
            "#,
        )
        .bind(scope)
        .bind(period)
        .fetch_all(executor)
        .await?;

        Ok(runs)
    }

    pub async fn update_run_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        state: PayrollRunState,
        stamp: &AuditStamp,
    ) -> Result<PayrollRun, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PayrollRun>(
            r#"
            UPDATE payroll_runs
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

    // =========================================================================
    //  ITENS E LINHAS DE CONCEITO
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payroll_run_id: Uuid,
        employee_record_id: Uuid,
        gross: Decimal,
        net: Decimal,
        stamp: &AuditStamp,
    ) -> Result<PayrollRunItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PayrollRunItem>(
            r#"
            INSERT INTO payroll_run_items (
                tenant_id, payroll_run_id, employee_record_id, gross, net,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payroll_run_id)
        .bind(employee_record_id)
        .bind(gross)
        .bind(net)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payroll_run_item_id: Uuid,
        concept_id: Uuid,
        amount: Decimal,
        stamp: &AuditStamp,
    ) -> Result<PayrollConceptLine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PayrollConceptLine>(
            r#"
            INSERT INTO payroll_concept_lines (
                tenant_id, payroll_run_item_id, concept_id, amount,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(payroll_run_item_id)
        .bind(concept_id)
        .bind(amount)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn items_for_run<'e, E>(
        &self,
        executor: E,
        payroll_run_id: Uuid,
    ) -> Result<Vec<PayrollRunItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, PayrollRunItem>(
            "SELECT * FROM payroll_run_items WHERE payroll_run_id = $1 ORDER BY created_at",
        )
        .bind(payroll_run_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    pub async fn lines_for_item<'e, E>(
        &self,
        executor: E,
        payroll_run_item_id: Uuid,
    ) -> Result<Vec<PayrollConceptLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, PayrollConceptLine>(
            "SELECT * FROM payroll_concept_lines WHERE payroll_run_item_id = $1 ORDER BY created_at",
        )
        .bind(payroll_run_item_id)
        .fetch_all(executor)
        .await?;

        Ok(lines)
    }
}
