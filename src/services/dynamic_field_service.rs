// src/services/dynamic_field_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, ensure_same_tenant, fetch_scoped, RowLock},
        error::AppError,
        tenancy::{TenantContext, TenantProvider},
    },
    db::{AuditRepository, DynamicFieldRepository},
    models::{
        audit::AuditAction,
        common::{AuditStamp, TenantScoped},
        employee::{
            check_dynamic_value, DynamicFieldDefinition, DynamicFieldEntry, DynamicFieldValue,
            EmployeeRecord, NewDynamicFieldDefinition,
        },
    },
};

#[derive(Clone)]
pub struct DynamicFieldService {
    repo: DynamicFieldRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl DynamicFieldService {
    pub fn new(repo: DynamicFieldRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    // =========================================================================
    //  1. CONFIGURAÇÃO (DEFINIÇÕES DE CAMPO)
    // =========================================================================

    pub async fn create_definition(
        &self,
        ctx: &TenantContext,
        input: NewDynamicFieldDefinition,
    ) -> Result<DynamicFieldDefinition, AppError> {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let definition = self
            .repo
            .insert_definition(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, name = %definition.name, field_type = ?definition.field_type, "campo dinâmico definido");
        Ok(definition)
    }

    pub async fn list_definitions(&self, ctx: &TenantContext) -> Result<Vec<DynamicFieldDefinition>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_definitions(&self.pool, scope).await
    }

    // =========================================================================
    //  2. VALORES (COM VALIDAÇÃO PELO TIPO DECLARADO)
    // =========================================================================

    pub async fn set_value(
        &self,
        ctx: &TenantContext,
        definition_id: Uuid,
        employee_record_id: Uuid,
        value: Option<String>,
    ) -> Result<DynamicFieldValue, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let definition =
            fetch_scoped::<DynamicFieldDefinition>(&mut *tx, ctx, definition_id, RowLock::Share).await?;
        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, employee_record_id, RowLock::Share).await?;
        ensure_same_tenant(tenant_id, definition.tenant_id)?;

        check_dynamic_value(&definition, value.as_deref())?;

        let stored = self
            .repo
            .upsert_value(
                &mut *tx,
                tenant_id,
                definition_id,
                employee_record_id,
                value.as_deref(),
                &AuditStamp::new(ctx.actor_id()),
            )
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), DynamicFieldValue::ENTITY, AuditAction::Update, &stored)
            .await?;
        tx.commit().await?;

        Ok(stored)
    }

    /// Valores do legajo já etiquetados com o tipo declarado.
    pub async fn values_for_record(
        &self,
        ctx: &TenantContext,
        employee_record_id: Uuid,
    ) -> Result<Vec<DynamicFieldEntry>, AppError> {
        let mut conn = self.pool.acquire().await?;
        authorize_row::<EmployeeRecord>(&mut *conn, ctx, employee_record_id, RowLock::None).await?;
        self.repo.entries_for_record(&mut *conn, employee_record_id).await
    }
}
