// tests/tenant_isolation.rs

mod common;

use rrhh_backend::{
    common::{error::AppError, tenancy::TenantContext},
    models::{
        common::DeletedFilter,
        contracts::{NewCatalogEntry, NewLaborContract},
        documents::NewDocument,
        employee::{DynamicFieldType, EmploymentStatus, NewDynamicFieldDefinition},
        identity::TenantRole,
        organization::{NewDepartment, NewPosition, NewPositionAssignment},
    },
};
use sqlx::PgPool;

use common::*;

#[sqlx::test(migrations = "./migrations")]
async fn unresolved_context_cannot_read_or_write(pool: PgPool) {
    let app = state(pool);
    let (_ctx, _tenant, record) = employee(&app, "30-20", "L-1").await;
    let nobody = TenantContext::unresolved();

    assert!(matches!(
        app.employee_service.list_employee_records(&nobody, None).await,
        Err(AppError::TenantNotResolved)
    ));
    assert!(matches!(
        app.employee_service.get_employee_record(&nobody, record.id).await,
        Err(AppError::TenantNotResolved)
    ));
    assert!(matches!(
        app.organization_service
            .create_department(&nobody, NewDepartment { name: "X".into(), parent_id: None })
            .await,
        Err(AppError::TenantNotResolved)
    ));
    assert!(matches!(
        app.employee_service
            .update_employment_status(&nobody, record.id, EmploymentStatus::Suspended, None)
            .await,
        Err(AppError::TenantNotResolved)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn other_tenant_rows_are_denied_not_hidden(pool: PgPool) {
    let app = state(pool);
    let (ctx_a, _a, record_a) = employee(&app, "30-21", "L-1").await;
    let (ctx_b, _b, record_b) = employee(&app, "30-22", "L-1").await;

    assert!(matches!(
        app.employee_service.get_employee_record(&ctx_b, record_a.id).await,
        Err(AppError::CrossTenantAccessDenied)
    ));
    assert!(matches!(
        app.employee_service
            .update_employment_status(&ctx_b, record_a.id, EmploymentStatus::Terminated, None)
            .await,
        Err(AppError::CrossTenantAccessDenied)
    ));
    assert!(matches!(
        app.employee_service.delete_employee_record(&ctx_b, record_a.id).await,
        Err(AppError::CrossTenantAccessDenied)
    ));

    // Nada mudou no legajo de A
    let untouched = app.employee_service.get_employee_record(&ctx_a, record_a.id).await.unwrap();
    assert_eq!(untouched.employment_status, EmploymentStatus::Active);
    assert_eq!(untouched.stamp.updated_at, record_a.stamp.updated_at);

    // Listagens só trazem o próprio tenant
    let listed = app.employee_service.list_employee_records(&ctx_b, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record_b.id);

    // Id inexistente continua NotFound
    assert!(matches!(
        app.employee_service.get_employee_record(&ctx_b, uuid::Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn children_cannot_be_attached_to_another_tenants_record(pool: PgPool) {
    let app = state(pool);
    let (_ctx_a, _a, record_a) = employee(&app, "30-23", "L-1").await;
    let (ctx_b, _b, _record_b) = employee(&app, "30-24", "L-1").await;

    let upload = app
        .document_service
        .upload_document(
            &ctx_b,
            NewDocument {
                employee_record_id: record_a.id,
                document_type: "DNI".into(),
                storage_key: "x/dni.pdf".into(),
            },
        )
        .await;
    assert!(matches!(upload, Err(AppError::CrossTenantAccessDenied)));

    let contract = app
        .contract_service
        .create_contract(
            &ctx_b,
            NewLaborContract {
                employee_record_id: record_a.id,
                contract_type: "INDETERMINADO".into(),
                start_date: date(2024, 1, 2),
                end_date: None,
                working_schedule: None,
                agreement_id: None,
                category_id: None,
            },
        )
        .await;
    assert!(matches!(contract, Err(AppError::CrossTenantAccessDenied)));

    assert!(matches!(
        app.dynamic_field_service.values_for_record(&ctx_b, record_a.id).await,
        Err(AppError::CrossTenantAccessDenied)
    ));
    assert!(matches!(
        app.document_service
            .list_documents(&ctx_b, Some(record_a.id), DeletedFilter::IncludeDeleted)
            .await
            .map(|docs| docs.len()),
        Ok(0)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn superadmin_reaches_every_tenant_but_cannot_mix_them(pool: PgPool) {
    let app = state(pool);
    let (ctx_a, tenant_a, record_a) = employee(&app, "30-25", "L-1").await;
    let (ctx_b, _b, record_b) = employee(&app, "30-26", "L-2").await;
    let admin = root();

    let all = app.employee_service.list_employee_records(&admin, None).await.unwrap();
    assert!(all.iter().any(|r| r.id == record_a.id));
    assert!(all.iter().any(|r| r.id == record_b.id));

    let fetched = app.employee_service.get_employee_record(&admin, record_b.id).await.unwrap();
    assert_eq!(fetched.tenant_id, record_b.tenant_id);
    app.identity_service.get_tenant(&admin, tenant_a.id).await.unwrap();
    assert!(matches!(
        app.identity_service.get_tenant(&ctx_b, tenant_a.id).await,
        Err(AppError::CrossTenantAccessDenied)
    ));

    // Escrita de superadmin herda o tenant do legajo pai
    let document = app
        .document_service
        .upload_document(
            &admin,
            NewDocument {
                employee_record_id: record_a.id,
                document_type: "CONTRATO".into(),
                storage_key: "a/contrato.pdf".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(document.tenant_id, tenant_a.id);

    // Campo de A aplicado a legajo de B
    let field = app
        .dynamic_field_service
        .create_definition(
            &ctx_a,
            NewDynamicFieldDefinition {
                name: "Legajo anterior".into(),
                description: None,
                field_type: DynamicFieldType::Text,
                is_required: false,
                config: None,
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        app.dynamic_field_service
            .set_value(&admin, field.id, record_b.id, Some("123".into()))
            .await,
        Err(AppError::CrossTenantAccessDenied)
    ));

    // Sem tenant explícito, escrita de topo não tem onde cair
    assert!(matches!(
        app.organization_service
            .create_department(&admin, NewDepartment { name: "Global".into(), parent_id: None })
            .await,
        Err(AppError::TenantNotResolved)
    ));
    let scoped = admin.with_tenant(tenant_a.id);
    let dept = app
        .organization_service
        .create_department(&scoped, NewDepartment { name: "Planta".into(), parent_id: None })
        .await
        .unwrap();
    assert_eq!(dept.tenant_id, tenant_a.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn catalogs_and_tenants_are_superadmin_territory(pool: PgPool) {
    let app = state(pool);
    let (ctx, _tenant, _record) = employee(&app, "30-27", "L-1").await;

    let countries = app.catalog_service.list_countries().await.unwrap();
    assert!(countries.iter().any(|c| c.iso2 == "AR"));
    assert_eq!(app.catalog_service.find_country(AR).await.unwrap().iso2, "AR");

    assert!(matches!(
        app.identity_service
            .create_tenant(
                &ctx,
                rrhh_backend::models::identity::NewTenant {
                    legal_name: "Intrusa".into(),
                    fiscal_id: "30-99".into(),
                    country_id: AR,
                    base_currency_id: ARS,
                },
            )
            .await,
        Err(AppError::SuperadminRequired)
    ));

    // Razão fiscal repetida no mesmo país
    let dup = app
        .identity_service
        .create_tenant(
            &root(),
            rrhh_backend::models::identity::NewTenant {
                legal_name: "Outra".into(),
                fiscal_id: "30-27".into(),
                country_id: AR,
                base_currency_id: ARS,
            },
        )
        .await;
    assert!(matches!(dup, Err(ref e) if e.is_constraint_violation()));
}

#[sqlx::test(migrations = "./migrations")]
async fn membership_and_positions_stay_inside_the_tenant(pool: PgPool) {
    let app = state(pool);
    let (ctx_a, _a, record_a) = employee(&app, "30-28", "L-1").await;
    let (ctx_b, _b, _record_b) = employee(&app, "30-29", "L-1").await;
    let user = person(&app, &ctx_a, "800").await;

    let member = app
        .identity_service
        .add_tenant_member(&ctx_a, user.id, TenantRole::Hr)
        .await
        .unwrap();
    assert!(app
        .identity_service
        .add_tenant_member(&ctx_a, user.id, TenantRole::Admin)
        .await
        .unwrap_err()
        .is_constraint_violation());
    assert!(matches!(
        app.identity_service.change_member_role(&ctx_b, member.id, TenantRole::Admin).await,
        Err(AppError::CrossTenantAccessDenied)
    ));
    let removed = app.identity_service.remove_tenant_member(&ctx_a, member.id).await.unwrap();
    assert!(removed.left_at.is_some());
    assert!(app.identity_service.list_tenant_members(&ctx_b).await.unwrap().is_empty());

    let agreement = app
        .contract_service
        .create_agreement(&ctx_a, NewCatalogEntry { code: "130/75".into(), name: "Comercio".into() })
        .await
        .unwrap();
    assert_eq!(app.contract_service.list_agreements(&ctx_b).await.unwrap().len(), 0);
    assert_eq!(app.contract_service.list_agreements(&ctx_a).await.unwrap()[0].id, agreement.id);

    let position_b = app
        .organization_service
        .create_position(&ctx_b, NewPosition { name: "Cajero".into(), level: None, department_id: None })
        .await
        .unwrap();
    let position_a = app
        .organization_service
        .create_position(&ctx_a, NewPosition { name: "Vendedor".into(), level: Some("Jr".into()), department_id: None })
        .await
        .unwrap();

    // Puesto de B no legajo de A
    assert!(matches!(
        app.organization_service
            .assign_position(
                &ctx_a,
                NewPositionAssignment {
                    employee_record_id: record_a.id,
                    position_id: position_b.id,
                    valid_from: date(2024, 1, 2),
                    valid_to: None,
                },
            )
            .await,
        Err(AppError::CrossTenantAccessDenied)
    ));

    app.organization_service
        .assign_position(
            &ctx_a,
            NewPositionAssignment {
                employee_record_id: record_a.id,
                position_id: position_a.id,
                valid_from: date(2024, 1, 2),
                valid_to: None,
            },
        )
        .await
        .unwrap();
    let promoted = app
        .organization_service
        .create_position(&ctx_a, NewPosition { name: "Encargado".into(), level: Some("Sr".into()), department_id: None })
        .await
        .unwrap();
    app.organization_service
        .assign_position(
            &ctx_a,
            NewPositionAssignment {
                employee_record_id: record_a.id,
                position_id: promoted.id,
                valid_from: date(2024, 6, 1),
                valid_to: None,
            },
        )
        .await
        .unwrap();

    let history = app.organization_service.position_history(&ctx_a, record_a.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].position_id, promoted.id);
    assert_eq!(history[0].valid_to, None);
    assert_eq!(history[1].valid_to, Some(date(2024, 5, 31)));
}

// A guarda RLS só age quando o papel de conexão não é superusuário nem tem
// BYPASSRLS. Rode a suíte com um papel comum (dono das tabelas serve, as
// tabelas usam FORCE ROW LEVEL SECURITY) para que este teste valha algo.
#[sqlx::test(migrations = "./migrations")]
async fn database_write_guard_rejects_rows_of_another_tenant(pool: PgPool) {
    let app = state(pool.clone());
    let (ctx_a, tenant_a, record_a) = employee(&app, "30-30", "L-1").await;
    let (_ctx_b, tenant_b, _record_b) = employee(&app, "30-31", "L-1").await;

    let bypasses: bool = sqlx::query_scalar(
        "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    if bypasses {
        eprintln!("papel atual ignora RLS; guarda de escrita não verificada");
        return;
    }

    async fn scoped_to(pool: &PgPool, tenant: uuid::Uuid) -> sqlx::Transaction<'static, sqlx::Postgres> {
        let mut tx = pool.begin().await.unwrap();
        sqlx::query("SELECT set_config('app.tenant_id', $1, true), set_config('app.is_superadmin', 'false', true)")
            .bind(tenant.to_string())
            .execute(&mut *tx)
            .await
            .unwrap();
        tx
    }

    // UPDATE direto, sem passar pelos serviços
    let mut tx = scoped_to(&pool, tenant_b.id).await;
    let err = sqlx::query("UPDATE employee_records SET record_number = 'INTRUSO' WHERE id = $1")
        .bind(record_a.id)
        .execute(&mut *tx)
        .await
        .unwrap_err();
    let code = err.as_database_error().and_then(|e| e.code()).map(|c| c.into_owned());
    assert_eq!(code.as_deref(), Some("42501"), "{}", err);
    drop(tx);

    // INSERT com tenant alheio
    let mut tx = scoped_to(&pool, tenant_b.id).await;
    let insert = sqlx::query("INSERT INTO departments (tenant_id, name) VALUES ($1, 'Infiltrada')")
        .bind(tenant_a.id)
        .execute(&mut *tx)
        .await;
    assert!(insert.is_err());
    drop(tx);

    // DELETE alheio não enxerga a linha
    let mut tx = scoped_to(&pool, tenant_b.id).await;
    let deleted = sqlx::query("DELETE FROM employee_records WHERE id = $1")
        .bind(record_a.id)
        .execute(&mut *tx)
        .await
        .unwrap();
    assert_eq!(deleted.rows_affected(), 0);
    tx.commit().await.unwrap();

    // No próprio tenant a mesma escrita passa
    let mut tx = scoped_to(&pool, tenant_a.id).await;
    let own = sqlx::query("UPDATE employee_records SET record_number = 'L-1' WHERE id = $1")
        .bind(record_a.id)
        .execute(&mut *tx)
        .await
        .unwrap();
    assert_eq!(own.rows_affected(), 1);
    drop(tx);

    let untouched = app.employee_service.get_employee_record(&ctx_a, record_a.id).await.unwrap();
    assert_eq!(untouched.record_number, "L-1");
}
