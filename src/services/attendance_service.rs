// src/services/attendance_service.rs

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
    db::{AttendanceRepository, AuditRepository},
    models::{
        attendance::{Absence, AbsenceType, NewAbsence, NewAbsenceType, NewTimeRecord, RequestState, TimeRecord},
        audit::AuditAction,
        common::{AuditStamp, TenantScoped},
        employee::EmployeeRecord,
    },
};

#[derive(Clone)]
pub struct AttendanceService {
    repo: AttendanceRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl AttendanceService {
    pub fn new(repo: AttendanceRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    // =========================================================================
    //  1. FICHADAS
    // =========================================================================

    pub async fn record_time(&self, ctx: &TenantContext, input: NewTimeRecord) -> Result<TimeRecord, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        let record = self
            .repo
            .insert_time_record(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        tracing::debug!(record_id = %record.employee_record_id, work_date = %record.work_date, "fichada registrada");
        Ok(record)
    }

    pub async fn list_time_records(
        &self,
        ctx: &TenantContext,
        employee_record_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeRecord>, AppError> {
        let mut conn = self.pool.acquire().await?;
        authorize_row::<EmployeeRecord>(&mut *conn, ctx, employee_record_id, RowLock::None).await?;
        self.repo.list_time_records(&mut *conn, employee_record_id, from, to).await
    }

    // =========================================================================
    //  2. TIPOS DE AUSÊNCIA
    // =========================================================================

    pub async fn create_absence_type(
        &self,
        ctx: &TenantContext,
        input: NewAbsenceType,
    ) -> Result<AbsenceType, AppError> {
        input.validate()?;
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let absence_type = self
            .repo
            .insert_absence_type(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        Ok(absence_type)
    }

    pub async fn list_absence_types(&self, ctx: &TenantContext) -> Result<Vec<AbsenceType>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_absence_types(&self.pool, scope).await
    }

    // =========================================================================
    //  3. AUSÊNCIAS (solicitação -> decisão)
    // =========================================================================

    pub async fn request_absence(&self, ctx: &TenantContext, input: NewAbsence) -> Result<Absence, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        // Tipo de outro tenant cai em fk_absences_type
        let absence = self
            .repo
            .insert_absence(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), Absence::ENTITY, AuditAction::Create, &absence)
            .await?;
        tx.commit().await?;

        Ok(absence)
    }

    /// Aprovar grava o ator como aprovador.
    pub async fn decide_absence(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        next: RequestState,
    ) -> Result<Absence, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut absence = fetch_scoped::<Absence>(&mut *tx, ctx, id, RowLock::Update).await?;
        if !absence.state.can_transition_to(next) {
            return Err(AppError::invalid_transition(absence.state, next));
        }

        let approved_by = match next {
            RequestState::Approved => ctx.actor_id(),
            _ => None,
        };
        absence.stamp.touch(ctx.actor_id());
        let decided = self
            .repo
            .update_absence_state(&mut *tx, id, next, approved_by, &absence.stamp)
            .await?;
        self.audit
            .append(&mut *tx, decided.tenant_id, ctx.actor_id(), Absence::ENTITY, AuditAction::Update, &decided)
            .await?;
        tx.commit().await?;

        tracing::info!(absence_id = %id, from = ?absence.state, to = ?next, "ausência decidida");
        Ok(decided)
    }

    pub async fn list_absences(
        &self,
        ctx: &TenantContext,
        state: Option<RequestState>,
    ) -> Result<Vec<Absence>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_absences(&self.pool, scope, state).await
    }
}
