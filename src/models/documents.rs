// src/models/documents.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::common::{AuditStamp, RecordStatus, TenantScoped};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "signature_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureMethod {
    SimpleAcceptance,
    Otp,
    DigitalSignature,
    ExternalProvider,
}

// Documento com soft delete: sai das leituras padrão quando `is_deleted`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub document_type: String,
    // Chave no blob storage externo
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for Document {
    const TABLE: &'static str = "documents";
    const ENTITY: &'static str = "Documento";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSignature {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub document_id: Uuid,
    pub global_user_id: Uuid,
    pub signed_at: DateTime<Utc>,
    pub method: SignatureMethod,
    // Hash, IP, payload do provedor etc.
    pub evidence: Option<Value>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for DocumentSignature {
    const TABLE: &'static str = "document_signatures";
    const ENTITY: &'static str = "Assinatura";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub employee_record_id: Uuid,
    #[validate(length(min = 1, max = 80))]
    pub document_type: String,
    #[validate(length(min = 1, max = 500))]
    pub storage_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignature {
    pub global_user_id: Uuid,
    pub method: SignatureMethod,
    pub evidence: Option<Value>,
}
