// src/services/employee_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, fetch_scoped, RowLock},
        error::AppError,
        tenancy::{TenantContext, TenantProvider},
    },
    db::{AuditRepository, EmployeeRepository},
    models::{
        audit::AuditAction,
        common::{AuditStamp, DomainEvent, DomainEventKind, TenantScoped},
        employee::{EmployeeRecord, EmploymentStatus, NewEmployeeRecord, NewPersonalData, PersonalData},
    },
};

#[derive(Clone)]
pub struct EmployeeService {
    repo: EmployeeRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl EmployeeService {
    pub fn new(repo: EmployeeRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    /// LÓGICA DE NEGÓCIO: cria o legajo e, na mesma transação, os dados
    /// pessoais (se vierem) e o evento de auditoria.
    pub async fn create_employee_record(
        &self,
        ctx: &TenantContext,
        input: NewEmployeeRecord,
    ) -> Result<EmployeeRecord, AppError> {
        input.validate()?;
        if let Some(personal) = &input.personal_data {
            personal.validate()?;
        }
        let tenant_id = ctx.required_tenant_id()?;
        let stamp = AuditStamp::new(ctx.actor_id());

        // 1. Inicia a transação
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        // 2. Legajo
        let mut record = self.repo.insert_record(&mut *tx, tenant_id, &input, &stamp).await?;

        // 3. Extensão 1:1
        if let Some(personal) = &input.personal_data {
            self.repo
                .upsert_personal_data(&mut *tx, record.id, tenant_id, personal, &stamp)
                .await?;
        }

        // 4. Auditoria
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), EmployeeRecord::ENTITY, AuditAction::Create, &record)
            .await?;

        record.raise(DomainEvent::new(DomainEventKind::EmployeeRecordCreated {
            record_id: record.id,
            record_number: record.record_number.clone(),
        }));

        // 5. Commit
        tx.commit().await?;

        publish(record.take_events());
        Ok(record)
    }

    pub async fn get_employee_record(&self, ctx: &TenantContext, id: Uuid) -> Result<EmployeeRecord, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_scoped::<EmployeeRecord>(&mut *conn, ctx, id, RowLock::None).await
    }

    pub async fn list_employee_records(
        &self,
        ctx: &TenantContext,
        status: Option<EmploymentStatus>,
    ) -> Result<Vec<EmployeeRecord>, AppError> {
        let scope = ctx.scope()?;
        tracing::debug!(?scope, ?status, "listando legajos");
        self.repo.list_records(&self.pool, scope, status).await
    }

    pub async fn update_employment_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: EmploymentStatus,
        termination_date: Option<NaiveDate>,
    ) -> Result<EmployeeRecord, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut current = fetch_scoped::<EmployeeRecord>(&mut *tx, ctx, id, RowLock::Update).await?;
        current.stamp.touch(ctx.actor_id());

        // Data de baixa anterior ao ingresso cai em ck_employee_records_dates
        let mut record = self
            .repo
            .update_status(&mut *tx, id, status, termination_date, &current.stamp)
            .await?;
        self.audit
            .append(&mut *tx, record.tenant_id, ctx.actor_id(), EmployeeRecord::ENTITY, AuditAction::Update, &record)
            .await?;

        if current.employment_status != status {
            record.raise(DomainEvent::new(DomainEventKind::EmploymentStatusChanged { record_id: id }));
        }

        tx.commit().await?;

        publish(record.take_events());
        Ok(record)
    }

    /// Apaga o legajo e, em cascata, tudo o que pertence a ele.
    pub async fn delete_employee_record(&self, ctx: &TenantContext, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let record = fetch_scoped::<EmployeeRecord>(&mut *tx, ctx, id, RowLock::Update).await?;
        self.repo.delete_record(&mut *tx, id).await?;
        self.audit
            .append(&mut *tx, record.tenant_id, ctx.actor_id(), EmployeeRecord::ENTITY, AuditAction::Delete, &record)
            .await?;

        tx.commit().await?;

        tracing::info!(record_id = %id, tenant_id = %record.tenant_id, "legajo apagado");
        Ok(())
    }

    // =========================================================================
    //  DADOS PESSOAIS
    // =========================================================================

    pub async fn upsert_personal_data(
        &self,
        ctx: &TenantContext,
        record_id: Uuid,
        input: NewPersonalData,
    ) -> Result<PersonalData, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let tenant_id = authorize_row::<EmployeeRecord>(&mut *tx, ctx, record_id, RowLock::Update).await?;
        let personal = self
            .repo
            .upsert_personal_data(&mut *tx, record_id, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), PersonalData::ENTITY, AuditAction::Update, &personal)
            .await?;

        tx.commit().await?;
        Ok(personal)
    }

    pub async fn get_personal_data(&self, ctx: &TenantContext, record_id: Uuid) -> Result<PersonalData, AppError> {
        let mut conn = self.pool.acquire().await?;

        // O legajo decide o acesso; só depois olhamos a extensão
        authorize_row::<EmployeeRecord>(&mut *conn, ctx, record_id, RowLock::None).await?;
        fetch_scoped::<PersonalData>(&mut *conn, ctx, record_id, RowLock::None).await
    }
}

// Eventos de domínio só saem depois do commit
fn publish(events: Vec<DomainEvent>) {
    for event in events {
        match event.kind {
            DomainEventKind::EmployeeRecordCreated { record_id, record_number } => {
                tracing::info!(%record_id, %record_number, triggered_on = %event.triggered_on, "legajo criado");
            }
            DomainEventKind::EmploymentStatusChanged { record_id } => {
                tracing::info!(%record_id, triggered_on = %event.triggered_on, "situação do legajo alterada");
            }
        }
    }
}
