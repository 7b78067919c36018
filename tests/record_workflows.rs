// tests/record_workflows.rs

mod common;

use chrono::NaiveTime;
use rrhh_backend::{
    common::error::{AppError, ConstraintKind},
    models::{
        attendance::{NewTimeRecord, RequestState, TimeRecordSource},
        common::{DeletedFilter, EntityState, TenantScoped},
        contracts::{NewCatalogEntry, NewLaborContract},
        documents::{Document, NewDocument, NewSignature, SignatureMethod},
        medical::{MedicalExam, NewMedicalExam, NewMedicalRequest},
    },
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use common::*;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn contract_for(record_id: Uuid, agreement_id: Option<Uuid>, category_id: Option<Uuid>) -> NewLaborContract {
    NewLaborContract {
        employee_record_id: record_id,
        contract_type: "INDETERMINADO".into(),
        start_date: date(2024, 1, 2),
        end_date: None,
        working_schedule: Some("FULL".into()),
        agreement_id,
        category_id,
    }
}

// =========================================================================
//  MEDICINA LABORAL
// =========================================================================

#[sqlx::test(migrations = "./migrations")]
async fn medical_requests_follow_the_request_lifecycle(pool: PgPool) {
    let app = state(pool);
    let (ctx, _tenant, record) = employee(&app, "30-40", "L-1").await;
    let (other_ctx, _other, _other_record) = employee(&app, "30-41", "L-1").await;
    let medical = &app.medical_service;

    let request = medical
        .create_request(
            &ctx,
            NewMedicalRequest {
                employee_record_id: record.id,
                request_type: "VISITA".into(),
                detail: Some("Reposo por gripe".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(request.state, RequestState::Pending);

    let approved = medical
        .change_request_state(&ctx, request.id, RequestState::Approved)
        .await
        .unwrap();
    assert_eq!(approved.state, RequestState::Approved);
    assert!(approved.stamp.updated_at >= request.stamp.updated_at);

    assert!(matches!(
        medical.change_request_state(&ctx, request.id, RequestState::Pending).await,
        Err(AppError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        medical.change_request_state(&other_ctx, request.id, RequestState::Closed).await,
        Err(AppError::CrossTenantAccessDenied)
    ));

    let listed = medical.list_requests(&ctx, Some(record.id)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].state, RequestState::Approved);
    assert!(medical.list_requests(&other_ctx, None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn medical_exams_are_recorded_and_audited(pool: PgPool) {
    let app = state(pool);
    let (ctx, _tenant, record) = employee(&app, "30-42", "L-1").await;
    let (other_ctx, _other, _other_record) = employee(&app, "30-43", "L-1").await;
    let medical = &app.medical_service;

    let exam = medical
        .record_exam(
            &ctx,
            NewMedicalExam {
                employee_record_id: record.id,
                exam_type: "PREOCUPACIONAL".into(),
                exam_date: date(2024, 1, 10),
                result: Some("APTO".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(exam.tenant_id, record.tenant_id);

    let exams = medical.list_exams(&ctx, Some(record.id)).await.unwrap();
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0].result.as_deref(), Some("APTO"));
    assert!(medical.list_exams(&other_ctx, None).await.unwrap().is_empty());

    let events = app.audit_service.list_events(&ctx, Some(MedicalExam::ENTITY), 10).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload.as_ref().unwrap()["examType"], json!("PREOCUPACIONAL"));

    let denied = medical
        .record_exam(
            &other_ctx,
            NewMedicalExam {
                employee_record_id: record.id,
                exam_type: "PERIODICO".into(),
                exam_date: date(2024, 6, 10),
                result: None,
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::CrossTenantAccessDenied)));
}

// =========================================================================
//  ASSINATURAS
// =========================================================================

#[sqlx::test(migrations = "./migrations")]
async fn documents_accept_signatures_until_deleted(pool: PgPool) {
    let app = state(pool);
    let (ctx, _tenant, record) = employee(&app, "30-44", "L-1").await;
    let signer = person(&app, &ctx, "900").await;
    let docs = &app.document_service;

    let document = docs
        .upload_document(
            &ctx,
            NewDocument {
                employee_record_id: record.id,
                document_type: "RECIBO".into(),
                storage_key: "recibos/2024-03.pdf".into(),
            },
        )
        .await
        .unwrap();

    let methods = [
        SignatureMethod::SimpleAcceptance,
        SignatureMethod::Otp,
        SignatureMethod::DigitalSignature,
        SignatureMethod::ExternalProvider,
    ];
    for method in methods {
        let signature = docs
            .sign_document(
                &ctx,
                document.id,
                NewSignature {
                    global_user_id: signer.id,
                    method,
                    evidence: Some(json!({ "ip": "10.0.0.7" })),
                },
            )
            .await
            .unwrap();
        assert_eq!(signature.method, method);
        assert_eq!(signature.tenant_id, document.tenant_id);
    }

    // Cada método volta do banco como foi gravado
    let signatures = docs.list_signatures(&ctx, document.id).await.unwrap();
    let stored: Vec<SignatureMethod> = signatures.iter().map(|s| s.method).collect();
    assert_eq!(stored, methods);
    assert_eq!(signatures[0].evidence, Some(json!({ "ip": "10.0.0.7" })));

    docs.soft_delete_document(&ctx, document.id).await.unwrap();
    let late = docs
        .sign_document(
            &ctx,
            document.id,
            NewSignature { global_user_id: signer.id, method: SignatureMethod::Otp, evidence: None },
        )
        .await;
    assert!(matches!(late, Err(AppError::NotFound(entity)) if entity == Document::ENTITY));

    let kept = docs.get_document(&ctx, document.id, DeletedFilter::IncludeDeleted).await.unwrap();
    assert!(kept.is_deleted);
    assert_eq!(docs.list_signatures(&ctx, document.id).await.unwrap().len(), methods.len());
}

// =========================================================================
//  FICHADAS
// =========================================================================

#[sqlx::test(migrations = "./migrations")]
async fn time_records_are_listed_by_closed_date_range(pool: PgPool) {
    let app = state(pool);
    let (ctx, _tenant, record) = employee(&app, "30-45", "L-1").await;
    let (other_ctx, _other, _other_record) = employee(&app, "30-46", "L-1").await;
    let attendance = &app.attendance_service;

    let entries = [
        (date(2024, 3, 1), TimeRecordSource::Web),
        (date(2024, 3, 2), TimeRecordSource::App),
        (date(2024, 3, 5), TimeRecordSource::Biometric),
    ];
    for (work_date, source) in entries {
        let saved = attendance
            .record_time(
                &ctx,
                NewTimeRecord {
                    employee_record_id: record.id,
                    work_date,
                    check_in: Some(time(8, 0)),
                    check_out: Some(time(17, 30)),
                    source,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.source, source);
    }

    let march_start = attendance
        .list_time_records(&ctx, record.id, date(2024, 3, 1), date(2024, 3, 2))
        .await
        .unwrap();
    assert_eq!(march_start.len(), 2);
    assert_eq!(march_start[0].source, TimeRecordSource::Web);
    assert_eq!(march_start[1].source, TimeRecordSource::App);
    assert_eq!(march_start[1].check_out, Some(time(17, 30)));

    let all = attendance
        .list_time_records(&ctx, record.id, date(2024, 3, 1), date(2024, 3, 31))
        .await
        .unwrap();
    assert_eq!(all.last().map(|r| r.source), Some(TimeRecordSource::Biometric));

    assert!(matches!(
        attendance
            .list_time_records(&other_ctx, record.id, date(2024, 3, 1), date(2024, 3, 31))
            .await,
        Err(AppError::CrossTenantAccessDenied)
    ));
    let foreign = attendance
        .record_time(
            &other_ctx,
            NewTimeRecord {
                employee_record_id: record.id,
                work_date: date(2024, 3, 6),
                check_in: None,
                check_out: None,
                source: TimeRecordSource::Web,
                notes: None,
            },
        )
        .await;
    assert!(matches!(foreign, Err(AppError::CrossTenantAccessDenied)));
}

// =========================================================================
//  CONTRATOS
// =========================================================================

#[sqlx::test(migrations = "./migrations")]
async fn contracts_reference_local_catalogs_and_end_deleted(pool: PgPool) {
    let app = state(pool);
    let (ctx, _tenant, record) = employee(&app, "30-47", "L-1").await;
    let (other_ctx, _other, _other_record) = employee(&app, "30-48", "L-1").await;
    let contracts = &app.contract_service;

    let agreement = contracts
        .create_agreement(&ctx, NewCatalogEntry { code: "130/75".into(), name: "Empleados de comercio".into() })
        .await
        .unwrap();
    let category = contracts
        .create_category(&ctx, NewCatalogEntry { code: "ADM-A".into(), name: "Administrativo A".into() })
        .await
        .unwrap();
    let foreign_category = contracts
        .create_category(&other_ctx, NewCatalogEntry { code: "ADM-A".into(), name: "Administrativo A".into() })
        .await
        .unwrap();

    let categories = contracts.list_categories(&ctx).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].id, category.id);

    // Categoria de outro tenant cai na FK composta
    let err = contracts
        .create_contract(&ctx, contract_for(record.id, Some(agreement.id), Some(foreign_category.id)))
        .await
        .unwrap_err();
    match err {
        AppError::ConstraintViolation { kind, constraint } => {
            assert_eq!(kind, ConstraintKind::ForeignKey);
            assert_eq!(constraint.as_deref(), Some("fk_labor_contracts_category"));
        }
        other => panic!("esperava violação de FK, veio {:?}", other),
    }

    let contract = contracts
        .create_contract(&ctx, contract_for(record.id, Some(agreement.id), Some(category.id)))
        .await
        .unwrap();
    assert_eq!(contract.state, EntityState::Active);

    let listed = contracts.list_contracts(&ctx, Some(record.id)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category_id, Some(category.id));
    assert!(contracts.list_contracts(&other_ctx, None).await.unwrap().is_empty());

    let blocked = contracts.set_contract_state(&ctx, contract.id, EntityState::Blocked).await.unwrap();
    assert_eq!(blocked.state, EntityState::Blocked);
    assert!(matches!(
        contracts.set_contract_state(&ctx, contract.id, EntityState::Blocked).await,
        Err(AppError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        contracts.set_contract_state(&other_ctx, contract.id, EntityState::Active).await,
        Err(AppError::CrossTenantAccessDenied)
    ));

    contracts.set_contract_state(&ctx, contract.id, EntityState::Deleted).await.unwrap();
    assert!(matches!(
        contracts.set_contract_state(&ctx, contract.id, EntityState::Active).await,
        Err(AppError::InvalidStateTransition { .. })
    ));
}
