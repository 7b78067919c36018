// src/services/catalog_service.rs

use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::{db_utils::begin_scoped, error::AppError, tenancy::TenantContext},
    db::CatalogRepository,
    models::catalog::{Country, Currency, NewCountry, NewCurrency},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // Dados de referência: leitura aberta a qualquer chamador
    pub async fn list_countries(&self) -> Result<Vec<Country>, AppError> {
        self.repo.list_countries(&self.pool).await
    }

    pub async fn find_country(&self, id: i16) -> Result<Country, AppError> {
        self.repo
            .find_country(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(Country::ENTITY))
    }

    pub async fn list_currencies(&self) -> Result<Vec<Currency>, AppError> {
        self.repo.list_currencies(&self.pool).await
    }

    pub async fn create_country(
        &self,
        ctx: &TenantContext,
        input: NewCountry,
    ) -> Result<Country, AppError> {
        ctx.require_superadmin()?;
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let country = self.repo.create_country(&mut *tx, &input).await?;
        tx.commit().await?;

        tracing::info!(country_id = country.id, iso2 = %country.iso2, "país cadastrado");
        Ok(country)
    }

    pub async fn create_currency(
        &self,
        ctx: &TenantContext,
        input: NewCurrency,
    ) -> Result<Currency, AppError> {
        ctx.require_superadmin()?;
        input.validate()?;

        let mut tx = begin_scoped(&self.pool, ctx).await?;
        let currency = self.repo.create_currency(&mut *tx, &input).await?;
        tx.commit().await?;

        tracing::info!(currency_id = currency.id, iso3 = %currency.iso3, "moeda cadastrada");
        Ok(currency)
    }
}
