// src/services/payroll_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, ensure_same_tenant, fetch_scoped, RowLock},
        error::AppError,
        tenancy::{TenantContext, TenantProvider},
    },
    db::{AuditRepository, PayrollRepository},
    models::{
        audit::AuditAction,
        common::{round_money, AuditStamp, TenantScoped},
        employee::EmployeeRecord,
        payroll::{
            Concept, NewConcept, NewPayrollRun, NewPayrollRunItem, PayrollConceptLine, PayrollRun,
            PayrollRunItem, PayrollRunItemDetail, PayrollRunState,
        },
    },
};

#[derive(Clone)]
pub struct PayrollService {
    repo: PayrollRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl PayrollService {
    pub fn new(repo: PayrollRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    // =========================================================================
    //  1. CONCEITOS
    // =========================================================================

    pub async fn create_concept(&self, ctx: &TenantContext, input: NewConcept) -> Result<Concept, AppError> {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let concept = self
            .repo
            .insert_concept(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), Concept::ENTITY, AuditAction::Create, &concept)
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, code = %concept.code, kind = ?concept.kind, "conceito criado");
        Ok(concept)
    }

    pub async fn list_concepts(&self, ctx: &TenantContext) -> Result<Vec<Concept>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_concepts(&self.pool, scope).await
    }

    // =========================================================================
    //  2. LIQUIDAÇÕES
    // =========================================================================

    /// Nasce em `Draft`; (tenant, período, tipo) é único.
    pub async fn create_run(&self, ctx: &TenantContext, input: NewPayrollRun) -> Result<PayrollRun, AppError> {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let run = self
            .repo
            .insert_run(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), PayrollRun::ENTITY, AuditAction::Create, &run)
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, period = %run.period, run_type = ?run.run_type, "liquidação aberta");
        Ok(run)
    }

    pub async fn get_run(&self, ctx: &TenantContext, id: Uuid) -> Result<PayrollRun, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_scoped::<PayrollRun>(&mut *conn, ctx, id, RowLock::None).await
    }

    pub async fn list_runs(&self, ctx: &TenantContext, period: Option<&str>) -> Result<Vec<PayrollRun>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_runs(&self.pool, scope, period).await
    }

    pub async fn change_run_state(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        next: PayrollRunState,
    ) -> Result<PayrollRun, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut run = fetch_scoped::<PayrollRun>(&mut *tx, ctx, id, RowLock::Update).await?;
        if !run.state.can_transition_to(next) {
            return Err(AppError::invalid_transition(run.state, next));
        }

        run.stamp.touch(ctx.actor_id());
        let updated = self.repo.update_run_state(&mut *tx, id, next, &run.stamp).await?;
        self.audit
            .append(&mut *tx, updated.tenant_id, ctx.actor_id(), PayrollRun::ENTITY, AuditAction::Update, &updated)
            .await?;
        tx.commit().await?;

        tracing::info!(run_id = %id, from = ?run.state, to = ?next, "estado da liquidação alterado");
        Ok(updated)
    }

    // =========================================================================
    //  3. ITENS (bruto/neto já calculados pelo chamador)
    // =========================================================================

    /// Grava o item e suas linhas de conceito atomicamente, valores com 2 casas.
    pub async fn add_item(
        &self,
        ctx: &TenantContext,
        run_id: Uuid,
        input: NewPayrollRunItem,
    ) -> Result<PayrollRunItemDetail, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;

        // FOR SHARE: uma troca de estado concorrente espera este commit
        let run = fetch_scoped::<PayrollRun>(&mut *tx, ctx, run_id, RowLock::Share).await?;
        if !run.state.accepts_items() {
            return Err(AppError::invalid_transition(run.state, PayrollRunState::Draft));
        }
        let record_tenant =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        ensure_same_tenant(run.tenant_id, record_tenant)?;

        let stamp = AuditStamp::new(ctx.actor_id());
        let item = self
            .repo
            .insert_item(
                &mut *tx,
                run.tenant_id,
                run_id,
                input.employee_record_id,
                round_money(input.gross),
                round_money(input.net),
                &stamp,
            )
            .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let saved = self
                .repo
                .insert_line(&mut *tx, run.tenant_id, item.id, line.concept_id, round_money(line.amount), &stamp)
                .await?;
            lines.push(saved);
        }

        let detail = PayrollRunItemDetail { item, lines };
        self.audit
            .append(&mut *tx, run.tenant_id, ctx.actor_id(), PayrollRunItem::ENTITY, AuditAction::Create, &detail)
            .await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn items_for_run(&self, ctx: &TenantContext, run_id: Uuid) -> Result<Vec<PayrollRunItem>, AppError> {
        let mut conn = self.pool.acquire().await?;
        authorize_row::<PayrollRun>(&mut *conn, ctx, run_id, RowLock::None).await?;
        self.repo.items_for_run(&mut *conn, run_id).await
    }

    pub async fn lines_for_item(
        &self,
        ctx: &TenantContext,
        item_id: Uuid,
    ) -> Result<Vec<PayrollConceptLine>, AppError> {
        let mut conn = self.pool.acquire().await?;
        authorize_row::<PayrollRunItem>(&mut *conn, ctx, item_id, RowLock::None).await?;
        self.repo.lines_for_item(&mut *conn, item_id).await
    }
}
