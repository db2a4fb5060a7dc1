//! DTOs de Quote

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::quote::{Quote, QuoteLine, QuoteStatus};

/// Línea del desglose tal como la carga el admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLineDto {
    pub label: String,
    pub cost: Decimal,
}

impl From<QuoteLineDto> for QuoteLine {
    fn from(dto: QuoteLineDto) -> Self {
        Self {
            label: dto.label,
            cost: dto.cost,
        }
    }
}

/// Request para crear una cotización
///
/// El monto no viaja en el payload: se calcula como la suma del desglose.
#[derive(Debug, Deserialize)]
pub struct CreateQuoteDto {
    pub request_id: Uuid,
    pub breakdown: Vec<QuoteLineDto>,
}

/// Patch tipado de cotización para correcciones de admin
#[derive(Debug, Deserialize)]
pub struct UpdateQuoteDto {
    pub status: Option<QuoteStatus>,
    pub amount: Option<Decimal>,
    pub breakdown: Option<Vec<QuoteLineDto>>,
    /// Reasignación a otra solicitud (camino raro de corrección)
    pub request_id: Option<Uuid>,
}

impl UpdateQuoteDto {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.amount.is_none()
            && self.breakdown.is_none()
            && self.request_id.is_none()
    }
}

/// Response de cotización para la API
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub amount: Decimal,
    pub breakdown: Vec<QuoteLine>,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            request_id: quote.request_id,
            amount: quote.amount,
            breakdown: quote.breakdown.0,
            status: quote.status,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }
}
