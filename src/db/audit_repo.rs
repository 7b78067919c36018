// src/db/audit_repo.rs

use serde::Serialize;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::{AuditAction, AuditEvent},
};

// Só acrescenta e lê; o banco rejeita UPDATE/DELETE em audit_events
#[derive(Clone, Default)]
pub struct AuditRepository;

impl AuditRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn append<'e, E, T>(
        &self,
        executor: E,
        tenant_id: Uuid,
        actor: Option<Uuid>,
        entity: &str,
        action: AuditAction,
        snapshot: &T,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_value(snapshot).map_err(anyhow::Error::from)?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO audit_events (tenant_id, global_user_id, entity, action, payload)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(tenant_id)
        .bind(actor)
        .bind(entity)
        .bind(action.as_str())
        .bind(payload)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        entity: Option<&str>,
        limit: i64,
    ) -> Result<Vec<AuditEvent>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let events = sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT * FROM audit_events
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::varchar IS NULL OR entity = $2)
            ORDER BY occurred_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(scope)
        .bind(entity)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        Ok(events)
    }
}
