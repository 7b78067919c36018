// src/models/contracts.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::common::{AuditStamp, EntityState, RecordStatus, TenantScoped};
use crate::models::employee::date_range_error;

// Convenio colectivo (catálogo do tenant)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for Agreement {
    const TABLE: &'static str = "agreements";
    const ENTITY: &'static str = "Convenção coletiva";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantScoped for Category {
    const TABLE: &'static str = "categories";
    const ENTITY: &'static str = "Categoria";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LaborContract {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub contract_type: String, // Indeterminado, plazo fijo...
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub working_schedule: Option<String>,
    pub agreement_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub state: EntityState,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for LaborContract {
    const TABLE: &'static str = "labor_contracts";
    const ENTITY: &'static str = "Contrato";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCatalogEntry {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contract_dates"))]
pub struct NewLaborContract {
    pub employee_record_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub working_schedule: Option<String>,
    pub agreement_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

fn validate_contract_dates(input: &NewLaborContract) -> Result<(), ValidationError> {
    match input.end_date {
        Some(end) if end < input.start_date => Err(date_range_error()),
        _ => Ok(()),
    }
}
