// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::common::RecordStatus;

// ---
// Catálogos base multi-país (dados de referência, chaves numéricas curtas)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: i16,
    pub iso2: String,
    pub name: String,
    pub record_status: RecordStatus,
}

impl Country {
    pub const ENTITY: &'static str = "País";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: i16,
    pub iso3: String,
    pub name: String,
    pub record_status: RecordStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCountry {
    #[validate(range(min = 1, message = "O código numérico deve ser positivo."))]
    pub id: i16,
    #[validate(length(equal = 2, message = "ISO2 deve ter 2 letras."))]
    pub iso2: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrency {
    #[validate(range(min = 1, message = "O código numérico deve ser positivo."))]
    pub id: i16,
    #[validate(length(equal = 3, message = "ISO3 deve ter 3 letras."))]
    pub iso3: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}
