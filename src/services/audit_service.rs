// src/services/audit_service.rs

use sqlx::PgPool;

use crate::{
    common::{error::AppError, tenancy::TenantContext},
    db::AuditRepository,
    models::audit::AuditEvent,
};

const MAX_EVENTS: i64 = 500;

#[derive(Clone)]
pub struct AuditService {
    repo: AuditRepository,
    pool: PgPool,
}

impl AuditService {
    pub fn new(repo: AuditRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Eventos mais recentes primeiro; `limit` fica entre 1 e 500.
    pub async fn list_events(
        &self,
        ctx: &TenantContext,
        entity: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AuditEvent>, AppError> {
        let scope = ctx.scope()?;
        self.repo
            .list(&self.pool, scope, entity, limit.clamp(1, MAX_EVENTS))
            .await
    }
}
