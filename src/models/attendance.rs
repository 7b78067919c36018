// src/models/attendance.rs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::common::{AuditStamp, RecordStatus, TenantScoped};
use crate::models::employee::date_range_error;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "time_record_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeRecordSource {
    #[default]
    Web,
    App,
    Biometric,
}

/// Estado de solicitações (ausências e pedidos médicos).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    #[default]
    Pending,
    Approved,
    Rejected,
    Closed,
}

impl RequestState {
    pub fn can_transition_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Closed)
        )
    }
}

// Fichada de entrada/saída
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub source: TimeRecordSource,
    pub notes: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceType {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub country_id: Option<i16>,
    pub name: String,
    pub deducts_salary: bool,
    // Gancho para o motor de regras
    pub rule_code: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_record_id: Uuid,
    pub absence_type_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub approved_by: Option<Uuid>,
    pub state: RequestState,
    pub reason: Option<String>,
    pub record_status: RecordStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stamp: AuditStamp,
}

impl TenantScoped for Absence {
    const TABLE: &'static str = "absences";
    const ENTITY: &'static str = "Ausência";

    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeRecord {
    pub employee_record_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub source: TimeRecordSource,
    #[validate(length(max = 250))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewAbsenceType {
    pub country_id: Option<i16>,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    pub deducts_salary: bool,
    #[validate(length(max = 250))]
    pub rule_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_absence_dates"))]
pub struct NewAbsence {
    pub employee_record_id: Uuid,
    pub absence_type_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

fn validate_absence_dates(input: &NewAbsence) -> Result<(), ValidationError> {
    if input.date_to < input.date_from {
        return Err(date_range_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_only_move_forward() {
        use RequestState::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Closed));

        assert!(!Pending.can_transition_to(Closed));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Closed.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn absence_range_must_not_be_inverted() {
        let absence = NewAbsence {
            employee_record_id: Uuid::new_v4(),
            absence_type_id: Uuid::new_v4(),
            date_from: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
            reason: None,
        };
        assert!(absence.validate().is_err());
    }
}
