// src/services/medical_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, fetch_scoped, RowLock},
        error::AppError,
        tenancy::TenantContext,
    },
    db::{AuditRepository, MedicalRepository},
    models::{
        attendance::RequestState,
        audit::AuditAction,
        common::{AuditStamp, TenantScoped},
        employee::EmployeeRecord,
        medical::{MedicalExam, MedicalRequest, NewMedicalExam, NewMedicalRequest},
    },
};

#[derive(Clone)]
pub struct MedicalService {
    repo: MedicalRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl MedicalService {
    pub fn new(repo: MedicalRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    pub async fn create_request(
        &self,
        ctx: &TenantContext,
        input: NewMedicalRequest,
    ) -> Result<MedicalRequest, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        let request = self
            .repo
            .insert_request(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), MedicalRequest::ENTITY, AuditAction::Create, &request)
            .await?;
        tx.commit().await?;

        Ok(request)
    }

    pub async fn change_request_state(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        next: RequestState,
    ) -> Result<MedicalRequest, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut request = fetch_scoped::<MedicalRequest>(&mut *tx, ctx, id, RowLock::Update).await?;
        if !request.state.can_transition_to(next) {
            return Err(AppError::invalid_transition(request.state, next));
        }

        request.stamp.touch(ctx.actor_id());
        let updated = self
            .repo
            .update_request_state(&mut *tx, id, next, &request.stamp)
            .await?;
        self.audit
            .append(&mut *tx, updated.tenant_id, ctx.actor_id(), MedicalRequest::ENTITY, AuditAction::Update, &updated)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn list_requests(
        &self,
        ctx: &TenantContext,
        employee_record_id: Option<Uuid>,
    ) -> Result<Vec<MedicalRequest>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_requests(&self.pool, scope, employee_record_id).await
    }

    pub async fn record_exam(&self, ctx: &TenantContext, input: NewMedicalExam) -> Result<MedicalExam, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        let exam = self
            .repo
            .insert_exam(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), MedicalExam::ENTITY, AuditAction::Create, &exam)
            .await?;
        tx.commit().await?;

        Ok(exam)
    }

    pub async fn list_exams(
        &self,
        ctx: &TenantContext,
        employee_record_id: Option<Uuid>,
    ) -> Result<Vec<MedicalExam>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_exams(&self.pool, scope, employee_record_id).await
    }
}
