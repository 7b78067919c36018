// src/common/tenancy.rs

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::common::error::AppError;

/// Quem resolve o tenant da chamada (tipicamente a camada de auth).
pub trait TenantProvider {
    fn tenant_id(&self) -> Option<Uuid>;

    fn is_superadmin(&self) -> bool;

    /// O tenant da chamada, ou `TenantNotResolved` quando não há um.
    fn required_tenant_id(&self) -> Result<Uuid, AppError> {
        self.tenant_id().ok_or(AppError::TenantNotResolved)
    }
}

// ---
// Contexto explícito da chamada
// ---
// Passado para todo acesso a dados; nunca fica em estado global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: Option<Uuid>,
    superadmin: bool,
    actor_id: Option<Uuid>,
}

impl TenantContext {
    pub fn for_tenant(tenant_id: Uuid, actor_id: Option<Uuid>) -> Self {
        Self { tenant_id: Some(tenant_id), superadmin: false, actor_id }
    }

    pub fn superadmin(actor_id: Option<Uuid>) -> Self {
        Self { tenant_id: None, superadmin: true, actor_id }
    }

    /// Nenhum tenant e nenhum privilégio: todo acesso operacional falha.
    pub fn unresolved() -> Self {
        Self { tenant_id: None, superadmin: false, actor_id: None }
    }

    /// Superadmin operando dentro de um tenant específico.
    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn from_claims(claims: &TenantClaims) -> Self {
        Self {
            tenant_id: claims.tenant_id,
            superadmin: claims.is_superadmin,
            actor_id: claims.sub,
        }
    }

    pub fn actor_id(&self) -> Option<Uuid> {
        self.actor_id
    }

    /// Valor do filtro de tenant para listagens.
    ///
    /// `Some(id)` restringe ao tenant; `None` só é devolvido para superadmin
    /// sem tenant e significa "sem filtro".
    pub fn scope(&self) -> Result<Option<Uuid>, AppError> {
        match (self.tenant_id, self.superadmin) {
            (Some(id), _) => Ok(Some(id)),
            (None, true) => Ok(None),
            (None, false) => Err(AppError::TenantNotResolved),
        }
    }

    pub fn require_superadmin(&self) -> Result<(), AppError> {
        if self.superadmin {
            Ok(())
        } else {
            Err(AppError::SuperadminRequired)
        }
    }

    /// Verifica se a linha (de `row_tenant`) pode ser lida ou alterada.
    pub fn authorize(&self, row_tenant: Uuid) -> Result<(), AppError> {
        if self.superadmin {
            return Ok(());
        }
        match self.tenant_id {
            None => Err(AppError::TenantNotResolved),
            Some(id) if id == row_tenant => Ok(()),
            Some(_) => Err(AppError::CrossTenantAccessDenied),
        }
    }
}

impl TenantProvider for TenantContext {
    fn tenant_id(&self) -> Option<Uuid> {
        self.tenant_id
    }

    fn is_superadmin(&self) -> bool {
        self.superadmin
    }
}

/// Claims relevantes do token, já validado pela camada de autenticação.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantClaims {
    pub sub: Option<Uuid>,
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    #[serde(default, deserialize_with = "bool_or_string")]
    pub is_superadmin: bool,
}

// Alguns emissores mandam "true" como string
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.eq_ignore_ascii_case("true"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_caller_cannot_scope_or_authorize() {
        let ctx = TenantContext::unresolved();
        assert!(matches!(ctx.scope(), Err(AppError::TenantNotResolved)));
        assert!(matches!(ctx.required_tenant_id(), Err(AppError::TenantNotResolved)));
        assert!(matches!(ctx.authorize(Uuid::new_v4()), Err(AppError::TenantNotResolved)));
    }

    #[test]
    fn mismatched_tenant_is_denied() {
        let mine = Uuid::new_v4();
        let ctx = TenantContext::for_tenant(mine, None);
        assert!(ctx.authorize(mine).is_ok());
        assert!(matches!(
            ctx.authorize(Uuid::new_v4()),
            Err(AppError::CrossTenantAccessDenied)
        ));
        assert_eq!(ctx.scope().unwrap(), Some(mine));
    }

    #[test]
    fn superadmin_reaches_every_tenant() {
        let ctx = TenantContext::superadmin(None);
        assert!(ctx.authorize(Uuid::new_v4()).is_ok());
        assert_eq!(ctx.scope().unwrap(), None);
        // Sem tenant explícito não há id para devolver
        assert!(ctx.required_tenant_id().is_err());

        let tenant = Uuid::new_v4();
        assert!(ctx.require_superadmin().is_ok());
        assert!(matches!(
            TenantContext::for_tenant(tenant, None).require_superadmin(),
            Err(AppError::SuperadminRequired)
        ));

        let scoped = ctx.with_tenant(tenant);
        assert_eq!(scoped.scope().unwrap(), Some(tenant));
        assert!(scoped.authorize(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn claims_accept_string_superadmin_flag() {
        let claims: TenantClaims = serde_json::from_str(
            r#"{"sub":"7f1c6f0e-1f5a-4c8e-9a55-6a1d2b3c4d5e","is_superadmin":"true"}"#,
        )
        .unwrap();
        let ctx = TenantContext::from_claims(&claims);
        assert!(ctx.is_superadmin());
        assert_eq!(ctx.tenant_id(), None);
        assert!(ctx.actor_id().is_some());

        let claims: TenantClaims = serde_json::from_str(
            r#"{"tenant_id":"0b8f3a52-8a3e-4d8c-b1d0-6d7c0a9e1f22","is_superadmin":false}"#,
        )
        .unwrap();
        let ctx = TenantContext::from_claims(&claims);
        assert!(!ctx.is_superadmin());
        assert!(ctx.tenant_id().is_some());
    }
}
