// src/models/common.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---
// Carimbo de auditoria (composição, embutido em toda entidade mutável)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl AuditStamp {
    /// Primeira persistência: criação e atualização com o mesmo instante UTC.
    pub fn new(actor: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            created_by: actor,
            updated_at: now,
            updated_by: actor,
        }
    }

    /// Escrita subsequente: só o lado de atualização avança.
    pub fn touch(&mut self, actor: Option<Uuid>) {
        self.updated_at = Utc::now().max(self.updated_at);
        self.updated_by = actor;
    }
}

// Flag lógica presente em toda entidade operacional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "record_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

// Estado de registro de negócio (usuário, tenant, membro, contrato)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "entity_state", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityState {
    #[default]
    Active,
    Blocked,
    Deleted,
}

/// Entidade particionada por tenant.
pub trait TenantScoped {
    /// Tabela física (constante, nunca vinda de entrada externa).
    const TABLE: &'static str;
    /// Nome usado em erros e logs.
    const ENTITY: &'static str;

    fn tenant_id(&self) -> Uuid;
}

// ---
// Filtro de soft delete
// ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletedFilter {
    #[default]
    ExcludeDeleted,
    /// Caminho administrativo / auditoria.
    IncludeDeleted,
}

impl DeletedFilter {
    pub fn predicate(self) -> &'static str {
        match self {
            DeletedFilter::ExcludeDeleted => "is_deleted = FALSE",
            DeletedFilter::IncludeDeleted => "TRUE",
        }
    }
}

// ---
// Eventos de domínio (transitórios, nunca persistidos)
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEvent {
    pub triggered_on: DateTime<Utc>,
    pub kind: DomainEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEventKind {
    EmployeeRecordCreated { record_id: Uuid, record_number: String },
    EmploymentStatusChanged { record_id: Uuid },
}

impl DomainEvent {
    pub fn new(kind: DomainEventKind) -> Self {
        Self { triggered_on: Utc::now(), kind }
    }
}

/// Valores monetários são gravados com 2 casas (NUMERIC(18,2)).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamp_has_equal_created_and_updated() {
        let actor = Some(Uuid::new_v4());
        let stamp = AuditStamp::new(actor);
        assert_eq!(stamp.created_at, stamp.updated_at);
        assert_eq!(stamp.created_by, actor);
        assert_eq!(stamp.updated_by, actor);
        assert!(Utc::now() >= stamp.created_at);
    }

    #[test]
    fn touch_only_advances_the_update_side() {
        let creator = Some(Uuid::new_v4());
        let editor = Some(Uuid::new_v4());
        let mut stamp = AuditStamp::new(creator);
        let created = stamp.created_at;

        std::thread::sleep(std::time::Duration::from_millis(2));
        stamp.touch(editor);

        assert_eq!(stamp.created_at, created);
        assert_eq!(stamp.created_by, creator);
        assert!(stamp.updated_at > created);
        assert_eq!(stamp.updated_by, editor);
    }

    #[test]
    fn default_filter_hides_deleted_rows() {
        assert_eq!(DeletedFilter::default(), DeletedFilter::ExcludeDeleted);
        assert_eq!(DeletedFilter::ExcludeDeleted.predicate(), "is_deleted = FALSE");
        assert_eq!(DeletedFilter::IncludeDeleted.predicate(), "TRUE");
    }

    #[test]
    fn money_is_rounded_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(10005, 3)), Decimal::new(1001, 2));
        assert_eq!(round_money(Decimal::new(-10005, 3)), Decimal::new(-1001, 2));
        assert_eq!(round_money(Decimal::new(1234, 1)), Decimal::new(12340, 2));
    }
}
