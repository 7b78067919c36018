// src/models/employee.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;
use crate::models::common::{AuditStamp, DomainEvent, RecordStatus, TenantScoped};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    #[default]
    Active,
    Suspended,
    OnLeave,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "dynamic_field_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DynamicFieldType {
    Text,
    Number,
    Date,
    Boolean,
    List,
    Json,
}

// ---
// Legajo (raiz do agregado)
// ---
// Uma relação de emprego num tenant. Dados pessoais, contratos, asistencia,
// ausências, liquidações e documentos pertencem a ele e morrem com ele.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub global_user_id: Uuid,
    pub record_number: String,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub employment_status: EmploymentStatus,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,

    // Transitório: nunca vai para o banco nem para o JSON
    #[sqlx(skip)]
    #[serde(skip)]
    pub pending_events: Vec<DomainEvent>,
}

impl EmployeeRecord {
    pub fn raise(&mut self, event: DomainEvent) {
        self.pending_events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

impl TenantScoped for EmployeeRecord {
    const TABLE: &'static str = "employee_records";
    const ENTITY: &'static str = "Ficha do funcionário";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

// Extensão 1:1 do legajo: `id` é o próprio id do legajo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country_id: Option<i16>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for PersonalData {
    const TABLE: &'static str = "personal_data";
    const ENTITY: &'static str = "Dados pessoais";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

// --- CAMPOS DINÂMICOS (o molde e o dado) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldDefinition {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub field_type: DynamicFieldType,
    pub is_required: bool,
    // Ex: { "options": ["A", "B"] } para listas
    pub config: Option<Value>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for DynamicFieldDefinition {
    const TABLE: &'static str = "dynamic_field_definitions";
    const ENTITY: &'static str = "Campo dinâmico";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldValue {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub definition_id: Uuid,
    pub employee_record_id: Uuid,
    // Sempre texto cru, qualquer que seja o tipo declarado
    pub value: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for DynamicFieldValue {
    const TABLE: &'static str = "dynamic_field_values";
    const ENTITY: &'static str = "Valor de campo dinâmico";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

/// Valor de um legajo já acompanhado do tipo declarado (valor "etiquetado").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldEntry {
    pub definition_id: Uuid,
    pub name: String,
    pub field_type: DynamicFieldType,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Confere o texto cru contra o tipo declarado. O texto é gravado como veio.
pub fn check_dynamic_value(
    definition: &DynamicFieldDefinition,
    raw: Option<&str>,
) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::InvalidDynamicValue {
        field: definition.name.clone(),
        reason: reason.to_string(),
    };

    let raw = match raw.map(str::trim) {
        None | Some("") => {
            return if definition.is_required {
                Err(invalid("campo obrigatório"))
            } else {
                Ok(())
            };
        }
        Some(r) => r,
    };

    match definition.field_type {
        DynamicFieldType::Text => Ok(()),
        DynamicFieldType::Number => Decimal::from_str(raw)
            .map(|_| ())
            .map_err(|_| invalid("não é um número")),
        DynamicFieldType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|_| ())
            .map_err(|_| invalid("data esperada no formato AAAA-MM-DD")),
        DynamicFieldType::Boolean => {
            if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
                Ok(())
            } else {
                Err(invalid("esperado true ou false"))
            }
        }
        DynamicFieldType::Json => serde_json::from_str::<Value>(raw)
            .map(|_| ())
            .map_err(|_| invalid("JSON inválido")),
        DynamicFieldType::List => match list_options(definition.config.as_ref()) {
            // Sem opções configuradas, qualquer texto serve
            None => Ok(()),
            Some(options) if options.iter().any(|o| o == raw) => Ok(()),
            Some(_) => Err(invalid("valor fora das opções da lista")),
        },
    }
}

// Opções aceitas: ["A", "B"] ou [{ "value": "A" }, ...]
fn list_options(config: Option<&Value>) -> Option<Vec<String>> {
    let options = config?.get("options")?.as_array()?;
    Some(
        options
            .iter()
            .filter_map(|o| match o {
                Value::String(s) => Some(s.clone()),
                other => other.get("value").and_then(Value::as_str).map(str::to_string),
            })
            .collect(),
    )
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_record_dates"))]
pub struct NewEmployeeRecord {
    pub global_user_id: Uuid,
    #[validate(length(min = 1, max = 30, message = "Número de legajo obrigatório (até 30)."))]
    pub record_number: String,
    pub hire_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    pub personal_data: Option<NewPersonalData>,
}

fn validate_record_dates(input: &NewEmployeeRecord) -> Result<(), ValidationError> {
    match input.termination_date {
        Some(end) if end < input.hire_date => Err(date_range_error()),
        _ => Ok(()),
    }
}

pub(crate) fn date_range_error() -> ValidationError {
    let mut err = ValidationError::new("date_range");
    err.message = Some("A data final não pode ser anterior à inicial.".into());
    err
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonalData {
    #[validate(length(min = 1, max = 120))]
    pub first_name: String,
    #[validate(length(min = 1, max = 120))]
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub marital_status: Option<String>,
    #[validate(length(max = 250))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(length(max = 120))]
    pub province: Option<String>,
    pub country_id: Option<i16>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDynamicFieldDefinition {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(max = 250))]
    pub description: Option<String>,
    pub field_type: DynamicFieldType,
    #[serde(default)]
    pub is_required: bool,
    pub config: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(field_type: DynamicFieldType, is_required: bool, config: Option<Value>) -> DynamicFieldDefinition {
        DynamicFieldDefinition {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "talle".into(),
            description: None,
            field_type,
            is_required,
            config,
            record_status: RecordStatus::Active,
            stamp: AuditStamp::new(None),
        }
    }

    #[test]
    fn required_field_rejects_blank_values() {
        let def = definition(DynamicFieldType::Text, true, None);
        assert!(matches!(
            check_dynamic_value(&def, Some("   ")),
            Err(AppError::InvalidDynamicValue { .. })
        ));
        assert!(check_dynamic_value(&def, None).is_err());

        let optional = definition(DynamicFieldType::Number, false, None);
        assert!(check_dynamic_value(&optional, None).is_ok());
    }

    #[test]
    fn values_are_checked_against_the_declared_type() {
        let number = definition(DynamicFieldType::Number, false, None);
        assert!(check_dynamic_value(&number, Some("1234.50")).is_ok());
        assert!(check_dynamic_value(&number, Some("mil")).is_err());

        let date = definition(DynamicFieldType::Date, false, None);
        assert!(check_dynamic_value(&date, Some("2024-02-29")).is_ok());
        assert!(check_dynamic_value(&date, Some("29/02/2024")).is_err());

        let flag = definition(DynamicFieldType::Boolean, false, None);
        assert!(check_dynamic_value(&flag, Some("TRUE")).is_ok());
        assert!(check_dynamic_value(&flag, Some("si")).is_err());

        let json = definition(DynamicFieldType::Json, false, None);
        assert!(check_dynamic_value(&json, Some(r#"{"a":1}"#)).is_ok());
        assert!(check_dynamic_value(&json, Some("{a:1")).is_err());
    }

    #[test]
    fn list_values_must_match_configured_options() {
        let def = definition(
            DynamicFieldType::List,
            false,
            Some(json!({ "options": ["S", "M", { "value": "L" }] })),
        );
        assert!(check_dynamic_value(&def, Some("M")).is_ok());
        assert!(check_dynamic_value(&def, Some("L")).is_ok());
        assert!(check_dynamic_value(&def, Some("XL")).is_err());

        let open = definition(DynamicFieldType::List, false, None);
        assert!(check_dynamic_value(&open, Some("XL")).is_ok());
    }

    #[test]
    fn termination_before_hire_fails_validation() {
        let input = NewEmployeeRecord {
            global_user_id: Uuid::new_v4(),
            record_number: "L-001".into(),
            hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            termination_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            employment_status: EmploymentStatus::Active,
            personal_data: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn domain_events_are_drained_once() {
        let mut record = EmployeeRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            global_user_id: Uuid::new_v4(),
            record_number: "L-7".into(),
            hire_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            termination_date: None,
            employment_status: EmploymentStatus::Active,
            record_status: RecordStatus::Active,
            stamp: AuditStamp::new(None),
            pending_events: Vec::new(),
        };
        record.raise(DomainEvent::new(
            crate::models::common::DomainEventKind::EmploymentStatusChanged { record_id: record.id },
        ));
        assert_eq!(record.take_events().len(), 1);
        assert!(record.take_events().is_empty());
        // Eventos não aparecem na serialização
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("pendingEvents").is_none());
    }
}
