//! DTOs de ServicePrice

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::service_price::ServicePrice;

/// Request para crear un precio de servicio
///
/// Si no viene `key`, se deriva de la etiqueta.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePriceDto {
    #[validate(length(min = 2, max = 100))]
    pub label: String,

    pub price: Decimal,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub key: Option<String>,
}

/// Request para actualizar un precio de servicio
///
/// La clave es estable: cambiar la etiqueta no la regenera.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePriceDto {
    #[validate(length(min = 2, max = 100))]
    pub label: Option<String>,

    pub price: Option<Decimal>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Response de precio para la API
#[derive(Debug, Serialize)]
pub struct PriceResponse {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ServicePrice> for PriceResponse {
    fn from(price: ServicePrice) -> Self {
        Self {
            id: price.id,
            key: price.key,
            label: price.label,
            price: price.price,
            description: price.description,
            created_at: price.created_at,
        }
    }
}
