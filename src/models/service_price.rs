//! Modelo de ServicePrice
//!
//! Lista de precios por clave. Los extras del total (logística, grúa,
//! lavado) se resuelven contra esta lista al momento de calcular.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Claves consumidas por el cálculo de totales
pub const KEY_PICKUP_RETURN: &str = "pickup_return";
pub const KEY_TOWING_INTRACITY: &str = "towing_intracity";
pub const KEY_CAR_WASH_PREMIUM: &str = "car_wash_premium";

/// ServicePrice principal - mapea exactamente a la tabla service_prices
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServicePrice {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derivar la clave a partir de la etiqueta: minúsculas, se eliminan los
/// caracteres que no son alfanuméricos ni espacios, y las corridas de
/// espacios se reemplazan por guión bajo.
pub fn slug_from_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_label() {
        assert_eq!(slug_from_label("Towing (Intracity)"), "towing_intracity");
        assert_eq!(slug_from_label("Car Wash - Premium"), "car_wash_premium");
        assert_eq!(slug_from_label("  Pickup   &  Return "), "pickup_return");
    }

    #[test]
    fn test_slug_keeps_digits() {
        assert_eq!(slug_from_label("Storage 24h"), "storage_24h");
    }
}
