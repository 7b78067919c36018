// src/models/payroll.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::common::{AuditStamp, RecordStatus, TenantScoped};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payroll_run_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollRunType {
    #[default]
    Monthly,
    Final,
    Sac, // Sueldo anual complementario (aguinaldo)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payroll_run_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollRunState {
    #[default]
    Draft,
    Closed,
    Exported,
    Voided,
}

impl PayrollRunState {
    pub fn can_transition_to(self, next: PayrollRunState) -> bool {
        use PayrollRunState::*;
        matches!(
            (self, next),
            (Draft, Closed) | (Draft, Voided) | (Closed, Exported) | (Closed, Voided)
        )
    }

    pub fn accepts_items(self) -> bool {
        self == PayrollRunState::Draft
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "concept_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConceptKind {
    Earning,              // Haberes
    Deduction,            // Descuentos
    EmployerContribution, // Aportes / contribuciones
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRun {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub period: String, // "AAAAMM"
    pub run_type: PayrollRunType,
    pub state: PayrollRunState,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for PayrollRun {
    const TABLE: &'static str = "payroll_runs";
    const ENTITY: &'static str = "Folha de pagamento";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRunItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub payroll_run_id: Uuid,
    pub employee_record_id: Uuid,
    pub gross: Decimal,
    pub net: Decimal,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for PayrollRunItem {
    const TABLE: &'static str = "payroll_run_items";
    const ENTITY: &'static str = "Item da folha de pagamento";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub country_id: Option<i16>,
    pub code: String,
    pub name: String,
    pub kind: ConceptKind,
    // Fórmula do motor de regras; só armazenada
    pub formula: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for Concept {
    const TABLE: &'static str = "concepts";
    const ENTITY: &'static str = "Conceito";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollConceptLine {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub payroll_run_item_id: Uuid,
    pub concept_id: Uuid,
    pub amount: Decimal,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

/// Item com as linhas de conceito gravadas junto com ele.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRunItemDetail {
    #[serde(flatten)]
    pub item: PayrollRunItem,
    pub lines: Vec<PayrollConceptLine>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewConcept {
    pub country_id: Option<i16>,
    #[validate(length(min = 1, max = 30))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub kind: ConceptKind,
    #[validate(length(max = 2000))]
    pub formula: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPayrollRun {
    #[validate(custom(function = "validate_period"))]
    pub period: String,
    #[serde(default)]
    pub run_type: PayrollRunType,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPayrollRunItem {
    pub employee_record_id: Uuid,
    pub gross: Decimal,
    pub net: Decimal,
    #[serde(default)]
    pub lines: Vec<NewConceptLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConceptLine {
    pub concept_id: Uuid,
    pub amount: Decimal,
}

/// Período no formato AAAAMM, mês 01..12.
pub fn validate_period(period: &str) -> Result<(), ValidationError> {
    let valid = period.len() == 6
        && period.bytes().all(|b| b.is_ascii_digit())
        && matches!(period[4..].parse::<u8>(), Ok(1..=12));

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("period");
        err.message = Some("O período deve ter o formato AAAAMM.".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_format() {
        assert!(validate_period("202401").is_ok());
        assert!(validate_period("202412").is_ok());
        assert!(validate_period("202413").is_err());
        assert!(validate_period("202400").is_err());
        assert!(validate_period("2024-1").is_err());
        assert!(validate_period("20241").is_err());
    }

    #[test]
    fn new_run_defaults_to_monthly() {
        let run: NewPayrollRun = serde_json::from_str(r#"{"period":"202405"}"#).unwrap();
        assert_eq!(run.run_type, PayrollRunType::Monthly);
        assert!(run.validate().is_ok());
        assert_eq!(PayrollRunState::default(), PayrollRunState::Draft);
    }

    #[test]
    fn run_state_machine() {
        use PayrollRunState::*;
        assert!(Draft.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Exported));
        assert!(Closed.can_transition_to(Voided));
        assert!(!Exported.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Exported));
        assert!(Draft.accepts_items());
        assert!(!Closed.accepts_items());
    }
}
