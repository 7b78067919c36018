// tests/common/mod.rs
#![allow(dead_code)]

use chrono::NaiveDate;
use rrhh_backend::{
    common::tenancy::TenantContext,
    config::AppState,
    models::{
        employee::{EmployeeRecord, EmploymentStatus, NewEmployeeRecord, NewPersonalData},
        identity::{GlobalUser, NewGlobalUser, NewTenant, Tenant},
    },
};
use sqlx::PgPool;

// Argentina / peso argentino (semeados pela migração)
pub const AR: i16 = 32;
pub const ARS: i16 = 32;

pub fn state(pool: PgPool) -> AppState {
    AppState::from_pool(pool)
}

pub fn root() -> TenantContext {
    TenantContext::superadmin(None)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn tenant(state: &AppState, fiscal_id: &str) -> Tenant {
    state
        .identity_service
        .create_tenant(
            &root(),
            NewTenant {
                legal_name: format!("Empresa {}", fiscal_id),
                fiscal_id: fiscal_id.to_string(),
                country_id: AR,
                base_currency_id: ARS,
            },
        )
        .await
        .unwrap()
}

pub async fn person(state: &AppState, ctx: &TenantContext, dni: &str) -> GlobalUser {
    state
        .identity_service
        .create_global_user(
            ctx,
            NewGlobalUser {
                country_id: AR,
                id_type: "DNI".into(),
                id_number: dni.to_string(),
                primary_email: None,
                phone: None,
            },
        )
        .await
        .unwrap()
}

pub fn personal_data(first: &str, last: &str) -> NewPersonalData {
    NewPersonalData {
        first_name: first.into(),
        last_name: last.into(),
        birth_date: Some(date(1990, 6, 15)),
        marital_status: None,
        address: None,
        city: Some("Rosario".into()),
        province: Some("Santa Fe".into()),
        country_id: Some(AR),
    }
}

pub fn new_record(global_user_id: uuid::Uuid, number: &str) -> NewEmployeeRecord {
    NewEmployeeRecord {
        global_user_id,
        record_number: number.to_string(),
        hire_date: date(2024, 1, 2),
        termination_date: None,
        employment_status: EmploymentStatus::Active,
        personal_data: None,
    }
}

/// Tenant + pessoa + legajo prontos; devolve o contexto do tenant.
pub async fn employee(
    state: &AppState,
    fiscal_id: &str,
    number: &str,
) -> (TenantContext, Tenant, EmployeeRecord) {
    let tenant = tenant(state, fiscal_id).await;
    let ctx = TenantContext::for_tenant(tenant.id, None);
    let user = person(state, &ctx, &format!("{}-{}", fiscal_id, number)).await;
    let record = state
        .employee_service
        .create_employee_record(&ctx, new_record(user.id, number))
        .await
        .unwrap();
    (ctx, tenant, record)
}
