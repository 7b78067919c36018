// src/common/error.rs

use std::fmt;

use thiserror::Error;

/// Tipo de restrição violada, como reportado pelo Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Check => "check",
        };
        f.write_str(label)
    }
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Sem tenant no contexto e sem privilégio de superadmin
    #[error("Tenant não resolvido")]
    TenantNotResolved,

    #[error("Acesso a dados de outro tenant negado")]
    CrossTenantAccessDenied,

    // Catálogos globais e criação de tenants
    #[error("Operação restrita a superadmin")]
    SuperadminRequired,

    #[error("Violação de restrição ({kind}): {}", constraint.as_deref().unwrap_or("?"))]
    ConstraintViolation {
        kind: ConstraintKind,
        constraint: Option<String>,
    },

    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Valor inválido para o campo '{field}': {reason}")]
    InvalidDynamicValue { field: String, reason: String },

    #[error("Hierarquia inválida: {0}")]
    InvalidHierarchy(String),

    #[error("Transição de estado inválida: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    // Variante para erros de banco de dados que não são violações de restrição
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, AppError::ConstraintViolation { .. })
    }

    pub fn invalid_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        AppError::InvalidStateTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}

// Toda falha do sqlx passa por aqui: violações de restrição viram o erro
// genérico de restrição, o resto segue como DatabaseError.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let kind = match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                sqlx::error::ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                sqlx::error::ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                sqlx::error::ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                _ => None,
            };
            if let Some(kind) = kind {
                return AppError::ConstraintViolation {
                    kind,
                    constraint: db_err.constraint().map(str::to_string),
                };
            }
        }
        AppError::DatabaseError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_message_names_the_constraint() {
        let err = AppError::ConstraintViolation {
            kind: ConstraintKind::Unique,
            constraint: Some("uq_employee_records_number".into()),
        };
        assert!(err.is_constraint_violation());
        assert_eq!(
            err.to_string(),
            "Violação de restrição (unique): uq_employee_records_number"
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        use crate::models::{common::TenantScoped, organization::Department, payroll::PayrollRun};

        assert_eq!(
            AppError::NotFound(PayrollRun::ENTITY).to_string(),
            "Registro não encontrado: Folha de pagamento"
        );
        assert_eq!(AppError::NotFound(Department::ENTITY).to_string(), "Registro não encontrado: Área");
    }

    #[test]
    fn non_database_sqlx_errors_stay_database_errors() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
        assert!(!err.is_constraint_violation());
    }
}
