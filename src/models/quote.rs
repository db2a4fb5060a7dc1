//! Modelo de Quote
//!
//! Este módulo contiene el struct Quote y el desglose de línea de costos.
//! El monto de una cotización es la suma de su desglose; los extras fijos
//! (logística, grúa, lavado) se agregan al total al momento de cobrar.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la cotización - mapea al ENUM quote_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "quote_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Línea del desglose: etiqueta legible y costo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteLine {
    pub label: String,
    pub cost: Decimal,
}

/// Quote principal - mapea exactamente a la tabla quotes
///
/// El desglose se guarda como JSONB, en el orden en que el admin cargó
/// las líneas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: Uuid,
    pub request_id: Uuid,
    pub amount: Decimal,
    pub breakdown: Json<Vec<QuoteLine>>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Suma del desglose: es la base del monto de la cotización
pub fn breakdown_total(lines: &[QuoteLine]) -> Decimal {
    lines.iter().map(|line| line.cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_breakdown_total() {
        let lines = vec![
            QuoteLine { label: "Labor".to_string(), cost: dec!(45000) },
            QuoteLine { label: "Parts".to_string(), cost: dec!(80000) },
        ];
        assert_eq!(breakdown_total(&lines), dec!(125000));
    }

    #[test]
    fn test_breakdown_total_empty_is_zero() {
        assert_eq!(breakdown_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_breakdown_sum_is_idempotent() {
        // Recalcular la suma desde el desglose guardado reproduce el monto
        let lines = vec![
            QuoteLine { label: "Cambio de aceite".to_string(), cost: dec!(30000) },
            QuoteLine { label: "Filtro".to_string(), cost: dec!(12500) },
        ];
        let amount = breakdown_total(&lines);
        let roundtrip: Vec<QuoteLine> =
            serde_json::from_str(&serde_json::to_string(&lines).unwrap()).unwrap();
        assert_eq!(breakdown_total(&roundtrip), amount);
    }
}
