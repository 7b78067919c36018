// src/services/identity_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_logged, begin_scoped, fetch_scoped, RowLock},
        error::AppError,
        tenancy::{TenantContext, TenantProvider},
    },
    db::{AuditRepository, IdentityRepository},
    models::{
        audit::AuditAction,
        common::{AuditStamp, EntityState, TenantScoped},
        identity::{GlobalUser, NewGlobalUser, NewTenant, Tenant, TenantRole, TenantUser},
    },
};

#[derive(Clone)]
pub struct IdentityService {
    repo: IdentityRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl IdentityService {
    pub fn new(repo: IdentityRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    // =========================================================================
    //  1. USUÁRIOS GLOBAIS
    // =========================================================================

    /// Registra a pessoa uma única vez, independente de quantos tenants a empregam.
    pub async fn create_global_user(
        &self,
        ctx: &TenantContext,
        input: NewGlobalUser,
    ) -> Result<GlobalUser, AppError> {
        ctx.scope()?;
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let user = self
            .repo
            .create_global_user(&mut *tx, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        tx.commit().await?;

        tracing::info!(global_user_id = %user.id, "usuário global criado");
        Ok(user)
    }

    pub async fn find_global_user(&self, ctx: &TenantContext, id: Uuid) -> Result<GlobalUser, AppError> {
        ctx.scope()?;
        self.repo
            .find_global_user(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(GlobalUser::ENTITY))
    }

    pub async fn find_global_user_by_identity(
        &self,
        ctx: &TenantContext,
        country_id: i16,
        id_type: &str,
        id_number: &str,
    ) -> Result<Option<GlobalUser>, AppError> {
        ctx.scope()?;
        self.repo
            .find_global_user_by_identity(&self.pool, country_id, id_type, id_number)
            .await
    }

    // =========================================================================
    //  2. TENANTS
    // =========================================================================

    pub async fn create_tenant(&self, ctx: &TenantContext, input: NewTenant) -> Result<Tenant, AppError> {
        ctx.require_superadmin()?;
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let tenant = self
            .repo
            .create_tenant(&mut *tx, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant.id, ctx.actor_id(), Tenant::ENTITY, AuditAction::Create, &tenant)
            .await?;
        tx.commit().await?;

        tracing::info!(tenant_id = %tenant.id, legal_name = %tenant.legal_name, "tenant criado");
        Ok(tenant)
    }

    pub async fn get_tenant(&self, ctx: &TenantContext, id: Uuid) -> Result<Tenant, AppError> {
        let tenant = self
            .repo
            .find_tenant(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(Tenant::ENTITY))?;

        // O tenant é dono de si mesmo
        authorize_logged(ctx, Tenant::ENTITY, id, tenant.id)?;
        Ok(tenant)
    }

    // =========================================================================
    //  3. MEMBROS
    // =========================================================================

    pub async fn add_tenant_member(
        &self,
        ctx: &TenantContext,
        global_user_id: Uuid,
        role: TenantRole,
    ) -> Result<TenantUser, AppError> {
        let tenant_id = ctx.required_tenant_id()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        // Vínculo repetido cai em uq_tenant_users_member
        let member = self
            .repo
            .add_member(&mut *tx, tenant_id, global_user_id, role, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), TenantUser::ENTITY, AuditAction::Create, &member)
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, %global_user_id, ?role, "membro adicionado ao tenant");
        Ok(member)
    }

    pub async fn list_tenant_members(&self, ctx: &TenantContext) -> Result<Vec<TenantUser>, AppError> {
        let scope = ctx.scope()?;
        self.repo.list_members(&self.pool, scope).await
    }

    pub async fn change_member_role(
        &self,
        ctx: &TenantContext,
        member_id: Uuid,
        role: TenantRole,
    ) -> Result<TenantUser, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut member = fetch_scoped::<TenantUser>(&mut *tx, ctx, member_id, RowLock::Update).await?;
        if member.state == EntityState::Deleted {
            return Err(AppError::NotFound(TenantUser::ENTITY));
        }

        member.stamp.touch(ctx.actor_id());
        let updated = self
            .repo
            .update_member_role(&mut *tx, member_id, role, &member.stamp)
            .await?;
        self.audit
            .append(&mut *tx, updated.tenant_id, ctx.actor_id(), TenantUser::ENTITY, AuditAction::Update, &updated)
            .await?;
        tx.commit().await?;

        Ok(updated)
    }

    /// Desliga o membro: `left_at` preenchido e estado `Deleted`.
    pub async fn remove_tenant_member(
        &self,
        ctx: &TenantContext,
        member_id: Uuid,
    ) -> Result<TenantUser, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let mut member = fetch_scoped::<TenantUser>(&mut *tx, ctx, member_id, RowLock::Update).await?;
        if member.state == EntityState::Deleted {
            return Err(AppError::invalid_transition(member.state, EntityState::Deleted));
        }

        member.stamp.touch(ctx.actor_id());
        let removed = self.repo.mark_member_removed(&mut *tx, member_id, &member.stamp).await?;
        self.audit
            .append(&mut *tx, removed.tenant_id, ctx.actor_id(), TenantUser::ENTITY, AuditAction::Delete, &removed)
            .await?;
        tx.commit().await?;

        tracing::info!(member_id = %removed.id, tenant_id = %removed.tenant_id, "membro removido do tenant");
        Ok(removed)
    }
}
