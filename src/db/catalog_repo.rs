// src/db/catalog_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{Country, Currency, NewCountry, NewCurrency},
};

// Catálogos globais: sem tenant_id e fora da guarda RLS
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_countries<'e, E>(&self, executor: E) -> Result<Vec<Country>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let countries = sqlx::query_as::<_, Country>(
            "SELECT id, iso2, name, record_status FROM countries ORDER BY name",
        )
        .fetch_all(executor)
        .await?;

        Ok(countries)
    }

    pub async fn find_country<'e, E>(
        &self,
        executor: E,
        id: i16,
    ) -> Result<Option<Country>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let country = sqlx::query_as::<_, Country>(
            "SELECT id, iso2, name, record_status FROM countries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(country)
    }

    pub async fn list_currencies<'e, E>(&self, executor: E) -> Result<Vec<Currency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let currencies = sqlx::query_as::<_, Currency>(
            "SELECT id, iso3, name, record_status FROM currencies ORDER BY iso3",
        )
        .fetch_all(executor)
        .await?;

        Ok(currencies)
    }

    pub async fn create_country<'e, E>(
        &self,
        executor: E,
        input: &NewCountry,
    ) -> Result<Country, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Country>(
            r#"
            INSERT INTO countries (id, iso2, name)
            VALUES ($1, UPPER($2), $3)
            RETURNING id, iso2, name, record_status
            "#,
        )
        .bind(input.id)
        .bind(&input.iso2)
        .bind(&input.name)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn create_currency<'e, E>(
        &self,
        executor: E,
        input: &NewCurrency,
    ) -> Result<Currency, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Currency>(
            r#"
            INSERT INTO currencies (id, iso3, name)
            VALUES ($1, UPPER($2), $3)
            RETURNING id, iso3, name, record_status
            "#,
        )
        .bind(input.id)
        .bind(&input.iso3)
        .bind(&input.name)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }
}
