// src/services/contract_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, fetch_scoped, RowLock},
        error::AppError,
        tenancy::{TenantContext, TenantProvider},
    },
    db::{AuditRepository, ContractRepository},
    models::{
        audit::AuditAction,
        common::{AuditStamp, EntityState, TenantScoped},
        contracts::{Agreement, Category, LaborContract, NewCatalogEntry, NewLaborContract},
        employee::EmployeeRecord,
    },
};

#[derive(Clone)]
pub struct ContractService {
    repo: ContractRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl ContractService {
    pub fn new(repo: ContractRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    // =========================================================================
    //  CONVENIOS E CATEGORIAS
    // =========================================================================

    pub async fn create_agreement(&self, ctx: &TenantContext, input: NewCatalogEntry) -> Result<Agreement, AppError> {
        self.create_entry::<Agreement>(ctx, input).await
    }

    pub async fn list_agreements(&self, ctx: &TenantContext) -> Result<Vec<Agreement>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_entries::<Agreement, _>(&self.pool, scope).await
    }

    pub async fn create_category(&self, ctx: &TenantContext, input: NewCatalogEntry) -> Result<Category, AppError> {
        self.create_entry::<Category>(ctx, input).await
    }

    pub async fn list_categories(&self, ctx: &TenantContext) -> Result<Vec<Category>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_entries::<Category, _>(&self.pool, scope).await
    }

    async fn create_entry<T>(&self, ctx: &TenantContext, input: NewCatalogEntry) -> Result<T, AppError>
    where
        T: TenantScoped + for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let entry = self
            .repo
            .insert_entry::<T, _>(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, entity = T::ENTITY, code = %input.code, "entrada de catálogo criada");
        Ok(entry)
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn create_contract(
        &self,
        ctx: &TenantContext,
        input: NewLaborContract,
    ) -> Result<LaborContract, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        // Convenio/categoria de outro tenant falham nas FKs compostas
        let contract = self
            .repo
            .insert_contract(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), LaborContract::ENTITY, AuditAction::Create, &contract)
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, contract_id = %contract.id, record_id = %contract.employee_record_id, "contrato criado");
        Ok(contract)
    }

    pub async fn list_contracts(
        &self,
        ctx: &TenantContext,
        employee_record_id: Option<Uuid>,
    ) -> Result<Vec<LaborContract>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_contracts(&self.pool, scope, employee_record_id).await
    }

    /// Contrato `Deleted` é final.
    pub async fn set_contract_state(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        state: EntityState,
    ) -> Result<LaborContract, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut contract = fetch_scoped::<LaborContract>(&mut *tx, ctx, id, RowLock::Update).await?;
        if contract.state == EntityState::Deleted || contract.state == state {
            return Err(AppError::invalid_transition(contract.state, state));
        }

        contract.stamp.touch(ctx.actor_id());
        let updated = self.repo.update_state(&mut *tx, id, state, &contract.stamp).await?;
        self.audit
            .append(&mut *tx, updated.tenant_id, ctx.actor_id(), LaborContract::ENTITY, AuditAction::Update, &updated)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }
}
