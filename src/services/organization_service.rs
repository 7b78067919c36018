// src/services/organization_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, ensure_same_tenant, fetch_scoped, RowLock},
        error::AppError,
        tenancy::{TenantContext, TenantProvider},
    },
    db::{AuditRepository, OrganizationRepository},
    models::{
        audit::AuditAction,
        common::{AuditStamp, TenantScoped},
        employee::EmployeeRecord,
        organization::{
            validate_parent, Department, NewDepartment, NewPosition, NewPositionAssignment, Position,
            PositionHistory,
        },
    },
};

#[derive(Clone)]
pub struct OrganizationService {
    repo: OrganizationRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(repo: OrganizationRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    // =========================================================================
    //  1. ÁREAS
    // =========================================================================

    pub async fn create_department(
        &self,
        ctx: &TenantContext,
        input: NewDepartment,
    ) -> Result<Department, AppError> {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;

        if let Some(parent_id) = input.parent_id {
            authorize_row::<Department>(&mut *tx, ctx, parent_id, RowLock::Share).await?;
            self.repo.lock_hierarchy(&mut *tx, tenant_id).await?;
            let parents = self.repo.parent_map(&mut *tx, tenant_id).await?;
            validate_parent(None, parent_id, &parents)?;
        }

        let department = self
            .repo
            .insert_department(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, department_id = %department.id, parent_id = ?department.parent_id, "área criada");
        Ok(department)
    }

    /// Troca o pai da área; `None` a torna raiz.
    ///
    /// A trava consultiva por tenant impede que dois movimentos concorrentes
    /// fechem um ciclo que nenhum deles veria sozinho.
    pub async fn move_department(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        new_parent: Option<Uuid>,
    ) -> Result<Department, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut department = fetch_scoped::<Department>(&mut *tx, ctx, id, RowLock::Update).await?;
        self.repo.lock_hierarchy(&mut *tx, department.tenant_id).await?;

        if let Some(parent_id) = new_parent {
            authorize_row::<Department>(&mut *tx, ctx, parent_id, RowLock::Share).await?;
            let parents = self.repo.parent_map(&mut *tx, department.tenant_id).await?;
            validate_parent(Some(id), parent_id, &parents)?;
        }

        department.stamp.touch(ctx.actor_id());
        let moved = self
            .repo
            .update_parent(&mut *tx, id, new_parent, &department.stamp)
            .await?;
        self.audit
            .append(&mut *tx, moved.tenant_id, ctx.actor_id(), Department::ENTITY, AuditAction::Update, &moved)
            .await?;
        tx.commit().await?;

        tracing::info!(department_id = %id, parent_id = ?new_parent, "área movida");
        Ok(moved)
    }

    /// Área com filhos não pode ser apagada (restrict no banco).
    pub async fn delete_department(&self, ctx: &TenantContext, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let department = fetch_scoped::<Department>(&mut *tx, ctx, id, RowLock::Update).await?;
        self.repo.delete_department(&mut *tx, id).await?;
        self.audit
            .append(&mut *tx, department.tenant_id, ctx.actor_id(), Department::ENTITY, AuditAction::Delete, &department)
            .await?;
        tx.commit().await?;

        tracing::info!(department_id = %id, "área apagada");
        Ok(())
    }

    pub async fn list_departments(&self, ctx: &TenantContext) -> Result<Vec<Department>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_departments(&self.pool, scope).await
    }

    // =========================================================================
    //  2. PUESTOS
    // =========================================================================

    pub async fn create_position(&self, ctx: &TenantContext, input: NewPosition) -> Result<Position, AppError> {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        if let Some(department_id) = input.department_id {
            let owner = authorize_row::<Department>(&mut *tx, ctx, department_id, RowLock::Share).await?;
            ensure_same_tenant(tenant_id, owner)?;
        }
        let position = self
            .repo
            .insert_position(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        Ok(position)
    }

    pub async fn list_positions(
        &self,
        ctx: &TenantContext,
        department_id: Option<Uuid>,
    ) -> Result<Vec<Position>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_positions(&self.pool, scope, department_id).await
    }

    // =========================================================================
    //  3. HISTÓRICO DE PUESTOS
    // =========================================================================

    /// Fecha a entrada aberta (no dia anterior) e abre a nova.
    pub async fn assign_position(
        &self,
        ctx: &TenantContext,
        input: NewPositionAssignment,
    ) -> Result<PositionHistory, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Update).await?;
        let position_tenant = authorize_row::<Position>(&mut *tx, ctx, input.position_id, RowLock::Share).await?;
        ensure_same_tenant(tenant_id, position_tenant)?;

        let stamp = AuditStamp::new(ctx.actor_id());
        // Início anterior à entrada aberta cai em ck_position_history_range
        self.repo
            .close_open_assignment(&mut *tx, input.employee_record_id, input.valid_from, &stamp)
            .await?;
        let entry = self.repo.insert_history(&mut *tx, tenant_id, &input, &stamp).await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), PositionHistory::ENTITY, AuditAction::Create, &entry)
            .await?;
        tx.commit().await?;

        Ok(entry)
    }

    pub async fn position_history(
        &self,
        ctx: &TenantContext,
        employee_record_id: Uuid,
    ) -> Result<Vec<PositionHistory>, AppError> {
        let mut conn = self.pool.acquire().await?;
        authorize_row::<EmployeeRecord>(&mut *conn, ctx, employee_record_id, RowLock::None).await?;
        self.repo.history_for_record(&mut *conn, employee_record_id).await
    }
}
