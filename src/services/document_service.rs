// src/services/document_service.rs

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::{authorize_row, begin_scoped, fetch_scoped, RowLock},
        error::AppError,
        tenancy::TenantContext,
    },
    db::{AuditRepository, DocumentRepository},
    models::{
        audit::AuditAction,
        common::{AuditStamp, DeletedFilter, TenantScoped},
        documents::{Document, DocumentSignature, NewDocument, NewSignature},
        employee::EmployeeRecord,
    },
};

#[derive(Clone)]
pub struct DocumentService {
    repo: DocumentRepository,
    audit: AuditRepository,
    pool: PgPool,
}

impl DocumentService {
    pub fn new(repo: DocumentRepository, audit: AuditRepository, pool: PgPool) -> Self {
        Self { repo, audit, pool }
    }

    /// Registra o documento; o arquivo já está no storage sob `storage_key`.
    pub async fn upload_document(&self, ctx: &TenantContext, input: NewDocument) -> Result<Document, AppError> {
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let tenant_id =
            authorize_row::<EmployeeRecord>(&mut *tx, ctx, input.employee_record_id, RowLock::Share).await?;
        let document = self
            .repo
            .insert_document(&mut *tx, tenant_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), Document::ENTITY, AuditAction::Create, &document)
            .await?;
        tx.commit().await?;

        tracing::info!(%tenant_id, document_id = %document.id, document_type = %document.document_type, "documento registrado");
        Ok(document)
    }

    pub async fn get_document(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        filter: DeletedFilter,
    ) -> Result<Document, AppError> {
        let mut conn = self.pool.acquire().await?;
        let document = fetch_scoped::<Document>(&mut *conn, ctx, id, RowLock::None).await?;

        if document.is_deleted && filter == DeletedFilter::ExcludeDeleted {
            return Err(AppError::NotFound(Document::ENTITY));
        }
        Ok(document)
    }

    pub async fn list_documents(
        &self,
        ctx: &TenantContext,
        employee_record_id: Option<Uuid>,
        filter: DeletedFilter,
    ) -> Result<Vec<Document>, AppError> {
        let scope = ctx.scope()?;
        self.repo
            .list_documents(&self.pool, scope, employee_record_id, filter)
            .await
    }

    /// `deleted_at`/`deleted_by` são gravados uma única vez.
    pub async fn soft_delete_document(&self, ctx: &TenantContext, id: Uuid) -> Result<Document, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let tenant_id = authorize_row::<Document>(&mut *tx, ctx, id, RowLock::Update).await?;
        let deleted = self
            .repo
            .soft_delete(&mut *tx, id, &AuditStamp::new(ctx.actor_id()))
            .await?
            .ok_or(AppError::NotFound(Document::ENTITY))?;
        self.audit
            .append(&mut *tx, tenant_id, ctx.actor_id(), Document::ENTITY, AuditAction::Delete, &deleted)
            .await?;
        tx.commit().await?;

        tracing::info!(document_id = %id, deleted_by = ?deleted.deleted_by, "documento apagado (soft delete)");
        Ok(deleted)
    }

    pub async fn sign_document(
        &self,
        ctx: &TenantContext,
        document_id: Uuid,
        input: NewSignature,
    ) -> Result<DocumentSignature, AppError> {
        let mut tx = begin_scoped(&self.pool, ctx).await?;

        let document = fetch_scoped::<Document>(&mut *tx, ctx, document_id, RowLock::Share).await?;
        if document.is_deleted {
            return Err(AppError::NotFound(Document::ENTITY));
        }

        let signature = self
            .repo
            .insert_signature(&mut *tx, document.tenant_id, document_id, &input, &AuditStamp::new(ctx.actor_id()))
            .await?;
        self.audit
            .append(&mut *tx, document.tenant_id, ctx.actor_id(), DocumentSignature::ENTITY, AuditAction::Create, &signature)
            .await?;
        tx.commit().await?;

        tracing::info!(%document_id, signer = %signature.global_user_id, method = ?signature.method, "documento assinado");
        Ok(signature)
    }

    pub async fn list_signatures(
        &self,
        ctx: &TenantContext,
        document_id: Uuid,
    ) -> Result<Vec<DocumentSignature>, AppError> {
        let mut conn = self.pool.acquire().await?;
        authorize_row::<Document>(&mut *conn, ctx, document_id, RowLock::None).await?;
        self.repo.list_signatures(&mut *conn, document_id).await
    }
}
