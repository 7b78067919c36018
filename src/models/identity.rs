// src/models/identity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::common::{AuditStamp, EntityState, RecordStatus, TenantScoped};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantRole {
    Admin,
    Hr,
    #[default]
    Employee,
    Supervisor,
    Auditor,
}

// ---
// 1. GlobalUser (pessoa identificável entre tenants)
// ---
// Identidade única por país + tipo + número de documento
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GlobalUser {
    pub id: Uuid,
    pub country_id: i16,
    pub id_type: String,   // CUIT, DNI, SSN...
    pub id_number: String,
    pub primary_email: Option<String>,
    pub phone: Option<String>,
    pub state: EntityState,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl GlobalUser {
    pub const ENTITY: &'static str = "Usuário global";
}

// ---
// 2. Tenant (a organização cliente)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub legal_name: String,
    pub fiscal_id: String, // CUIT ou equivalente
    pub country_id: i16,
    pub base_currency_id: i16,
    pub state: EntityState,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl Tenant {
    pub const ENTITY: &'static str = "Tenant";
}

// ---
// 3. TenantUser (a "ponte" usuário global - tenant, com papel)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TenantUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub global_user_id: Uuid,
    pub role: TenantRole,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub state: EntityState,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for TenantUser {
    const TABLE: &'static str = "tenant_users";
    const ENTITY: &'static str = "Membro do tenant";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewGlobalUser {
    pub country_id: i16,
    #[validate(length(min = 1, max = 30, message = "Tipo de identificação obrigatório (até 30)."))]
    pub id_type: String,
    #[validate(length(min = 1, max = 50, message = "Número de identificação obrigatório (até 50)."))]
    pub id_number: String,
    #[validate(email(message = "O e-mail fornecido é inválido."), length(max = 254))]
    pub primary_email: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    #[validate(length(min = 1, max = 200, message = "Razão social obrigatória (até 200)."))]
    pub legal_name: String,
    #[validate(length(min = 1, max = 50, message = "Identificação fiscal obrigatória (até 50)."))]
    pub fiscal_id: String,
    pub country_id: i16,
    pub base_currency_id: i16,
}
