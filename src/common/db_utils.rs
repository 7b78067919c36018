// src/common/db_utils.rs

use sqlx::{postgres::PgRow, FromRow, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::tenancy::{TenantContext, TenantProvider};
use crate::models::common::TenantScoped;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define as variáveis que a guarda de escrita (RLS) lê.
///
/// `set_config(..., true)` vale só até o fim da transação, então a conexão
/// volta limpa para a pool.
pub(crate) async fn begin_scoped(
    pool: &PgPool,
    ctx: &TenantContext,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        SELECT
            set_config('app.tenant_id', $1, true),
            set_config('app.is_superadmin', $2, true),
            set_config('app.actor_id', $3, true)
        "#,
    )
    .bind(ctx.tenant_id().map(|id| id.to_string()).unwrap_or_default())
    .bind(if ctx.is_superadmin() { "true" } else { "false" })
    .bind(ctx.actor_id().map(|id| id.to_string()).unwrap_or_default())
    .execute(&mut *tx)
    .await?;

    Ok(tx)
}

/// Trava aplicada na leitura de autorização.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowLock {
    None,
    Share,
    Update,
}

impl RowLock {
    fn clause(self) -> &'static str {
        match self {
            RowLock::None => "",
            RowLock::Share => " FOR SHARE",
            RowLock::Update => " FOR UPDATE",
        }
    }
}

/// Lê o tenant dono da linha `id` e autoriza o contexto contra ele.
///
/// Roda na transação do chamador; com `RowLock::Update` a linha fica travada
/// até o commit, então não há janela entre checagem e escrita.
pub(crate) async fn authorize_row<T: TenantScoped>(
    conn: &mut PgConnection,
    ctx: &TenantContext,
    id: Uuid,
    lock: RowLock,
) -> Result<Uuid, AppError> {
    let sql = format!("SELECT tenant_id FROM {} WHERE id = $1{}", T::TABLE, lock.clause());

    let row_tenant: Option<Uuid> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let row_tenant = row_tenant.ok_or(AppError::NotFound(T::ENTITY))?;
    authorize_logged(ctx, T::ENTITY, id, row_tenant)?;
    Ok(row_tenant)
}

/// Busca uma linha por id e só a devolve se o contexto puder vê-la.
pub(crate) async fn fetch_scoped<T>(
    conn: &mut PgConnection,
    ctx: &TenantContext,
    id: Uuid,
    lock: RowLock,
) -> Result<T, AppError>
where
    T: TenantScoped + for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {} WHERE id = $1{}", T::TABLE, lock.clause());

    let row = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound(T::ENTITY))?;

    authorize_logged(ctx, T::ENTITY, id, row.tenant_id())?;
    Ok(row)
}

pub(crate) fn authorize_logged(
    ctx: &TenantContext,
    entity: &'static str,
    id: Uuid,
    row_tenant: Uuid,
) -> Result<(), AppError> {
    ctx.authorize(row_tenant).inspect_err(|e| {
        tracing::warn!(
            entity,
            %id,
            caller_tenant = ?ctx.tenant_id(),
            "acesso negado: {}",
            e
        );
    })
}

/// Duas linhas ligadas numa escrita precisam ser do mesmo tenant.
///
/// Relevante para superadmin, que passa por `authorize` em qualquer tenant.
pub(crate) fn ensure_same_tenant(owner: Uuid, other: Uuid) -> Result<(), AppError> {
    if owner == other {
        Ok(())
    } else {
        Err(AppError::CrossTenantAccessDenied)
    }
}
