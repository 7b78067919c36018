// src/models/medical.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::attendance::RequestState;
use crate::models::common::{AuditStamp, RecordStatus, TenantScoped};

// Medicina laboral
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRequest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub request_type: String, // Visita, certificado, reintegro...
    pub requested_at: DateTime<Utc>,
    pub state: RequestState,
    pub detail: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for MedicalRequest {
    const TABLE: &'static str = "medical_requests";
    const ENTITY: &'static str = "Solicitação médica";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicalExam {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub exam_type: String, // Pre-ocupacional, periódico...
    pub exam_date: NaiveDate,
    pub result: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for MedicalExam {
    const TABLE: &'static str = "medical_exams";
    const ENTITY: &'static str = "Exame médico";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalRequest {
    pub employee_record_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub request_type: String,
    #[validate(length(max = 1000))]
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicalExam {
    pub employee_record_id: Uuid,
    #[validate(length(min = 1, max = 80))]
    pub exam_type: String,
    pub exam_date: NaiveDate,
    #[validate(length(max = 2000))]
    pub result: Option<String>,
}
