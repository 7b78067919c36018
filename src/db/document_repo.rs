// src/db/document_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        common::{AuditStamp, DeletedFilter},
        documents::{Document, DocumentSignature, NewDocument, NewSignature},
    },
};

#[derive(Clone, Default)]
pub struct DocumentRepository;

impl DocumentRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_document<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &NewDocument,
        stamp: &AuditStamp,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                tenant_id, employee_record_id, document_type, storage_key, uploaded_at,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $5, $6, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.employee_record_id)
        .bind(input.document_type.trim())
        .bind(&input.storage_key)
        .bind(stamp.created_at)
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Leitura padrão esconde os apagados; `IncludeDeleted` é o caminho administrativo.
    pub async fn list_documents<'e, E>(
        &self,
        executor: E,
        scope: Option<Uuid>,
        employee_record_id: Option<Uuid>,
        filter: DeletedFilter,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O predicado é uma constante do enum, nunca entrada externa
        let sql = format!(
            r#"
            SELECT * FROM documents
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
              AND ($2::uuid IS NULL OR employee_record_id = $2)
              AND {}
            ORDER BY uploaded_at DESC
            "#,
            filter.predicate()
        );

        let documents = sqlx::query_as::<_, Document>(&sql)
            .bind(scope)
            .bind(employee_record_id)
            .fetch_all(executor)
            .await?;

        Ok(documents)
    }

    /// Marca como apagado uma única vez; `None` se já estava apagado.
    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        stamp: &AuditStamp,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET is_deleted = TRUE,
                deleted_at = $2,
                deleted_by = $3,
                updated_at = $2,
                updated_by = $3
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(stamp.updated_at)
        .bind(stamp.updated_by)
        .fetch_optional(executor)
        .await?;

        Ok(document)
    }

    pub async fn insert_signature<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
        input: &NewSignature,
        stamp: &AuditStamp,
    ) -> Result<DocumentSignature, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, DocumentSignature>(
            r#"
            INSERT INTO document_signatures (
                tenant_id, document_id, global_user_id, signed_at, method, evidence,
                created_at, created_by, updated_at, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $4, $7, $4, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(document_id)
        .bind(input.global_user_id)
        .bind(stamp.created_at)
        .bind(input.method)
        .bind(input.evidence.as_ref())
        .bind(stamp.created_by)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_signatures<'e, E>(
        &self,
        executor: E,
        document_id: Uuid,
    ) -> Result<Vec<DocumentSignature>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let signatures = sqlx::query_as::<_, DocumentSignature>(
            "SELECT * FROM document_signatures WHERE document_id = $1 ORDER BY signed_at",
        )
        .bind(document_id)
        .fetch_all(executor)
        .await?;

        Ok(signatures)
    }
}
