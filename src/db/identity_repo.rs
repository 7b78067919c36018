// src/db/identity_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::AuditStamp,
        identity::{GlobalUser, NewGlobalUser, NewTenant, Tenant, TenantRole, TenantUser},
    },
};

#[derive(Clone, Default)]
pub struct IdentityRepository;

impl IdentityRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  USUÁRIOS GLOBAIS
    // =========================================================================

    pub async fn create_global_user<'e, E>(
        &self,
        executor: E,
        input: &NewGlobalUser,
        stamp: &AuditStamp,
    ) -> Result<GlobalUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Duplicidade de (país, tipo, número) cai em uq_global_users_identity
        sqlx::query_as::<_, GlobalUser>(
            r#"
            INSERT INTO global_users (
                country_id, id_type, id_number, primary_email, phone,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.country_id)
        .bind(input.id_type.trim())
        .bind(input.id_number.trim())
        .bind(input.primary_email.as_deref())
        .bind(input.phone.as_deref())
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_global_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<GlobalUser>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, GlobalUser>("SELECT * FROM global_users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn find_global_user_by_identity<'e, E>(
        &self,
        executor: E,
        country_id: i16,
        id_type: &str,
        id_number: &str,
    ) -> Result<Option<GlobalUser>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, GlobalUser>(
            r#"
            SELECT * FROM global_users
            WHERE country_id = $1 AND id_type = $2 AND id_number = $3
            "#,
        )
        .bind(country_id)
        .bind(id_type.trim())
        .bind(id_number.trim())
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    // =========================================================================
    //  TENANTS
    // =========================================================================

    pub async fn create_tenant<'e, E>(
        &self,
        executor: E,
        input: &NewTenant,
        stamp: &AuditStamp,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (
                legal_name, fiscal_id, country_id, base_currency_id,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.legal_name)
        .bind(input.fiscal_id.trim())
        .bind(input.country_id)
        .bind(input.base_currency_id)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn find_tenant<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(tenant)
    }

    // =========================================================================
    //  MEMBROS (usuário global <-> tenant)
    // =========================================================================

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        global_user_id: Uuid,
        role: TenantRole,
        stamp: &AuditStamp,
    ) -> Result<TenantUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TenantUser>(
            r#"
            INSERT INTO tenant_users (
                tenant_id, global_user_id, role, joined_at,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $4, $5, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(global_user_id)
        .bind(role)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_members<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
    ) -> Result<Vec<TenantUser>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, TenantUser>(
            r#"
            SELECT * FROM tenant_users
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY joined_at
            "#,
        )
        .bind(scope)
        .fetch_all(executor)
        .await?;

        Ok(members)
    }

    pub async fn update_member_role<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        role: TenantRole,
        stamp: &AuditStamp,
    ) -> Result<TenantUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TenantUser>(
            r#"
            UPDATE tenant_users
            SET role = $2, updated_at = $3, updated_by = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Desligamento lógico: a linha fica para histórico.
    pub async fn mark_member_removed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stamp: &AuditStamp,
    ) -> Result<TenantUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TenantUser>(
            r#"
            UPDATE tenant_users
            SET left_at = $2, state = 'DELETED', updated_at = $2, updated_by = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }
}
