//! Modelo de ServiceRequest
//!
//! Este módulo contiene el struct ServiceRequest, los enums de estado del
//! ciclo de vida y las reglas puras sobre ellos (orden de estados, guarda
//! de cancelación, bitácora de notas). Mapea a la tabla service_requests.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::models::quote::QuoteStatus;

/// Estado del ciclo de vida - mapea al ENUM request_status
///
/// El orden de declaración es el orden del pipeline. `Cancelled` es el
/// estado terminal de cancelación y queda fuera del orden: la fila se
/// conserva para auditoría pero desaparece de las vistas activas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    EnRoute,
    Arrived,
    Diagnosing,
    QuoteReady,
    MaintenanceInProgress,
    VehicleEnrouteBack,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Posición dentro del pipeline. `Cancelled` no pertenece al orden.
    pub fn order_index(&self) -> Option<u8> {
        match self {
            RequestStatus::Pending => Some(0),
            RequestStatus::Accepted => Some(1),
            RequestStatus::EnRoute => Some(2),
            RequestStatus::Arrived => Some(3),
            RequestStatus::Diagnosing => Some(4),
            RequestStatus::QuoteReady => Some(5),
            RequestStatus::MaintenanceInProgress => Some(6),
            RequestStatus::VehicleEnrouteBack => Some(7),
            RequestStatus::Completed => Some(8),
            RequestStatus::Cancelled => None,
        }
    }

    /// Una solicitud activa sigue visible en los listados y el tracking
    pub fn is_active(&self) -> bool {
        !matches!(self, RequestStatus::Cancelled)
    }
}

/// Estado de pago - eje independiente del estado del pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Verifying,
    Paid,
}

/// ServiceRequest principal - mapea exactamente a la tabla service_requests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: Option<String>,
    pub pickup_location: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub issue_description: String,
    pub service_type: String,
    pub is_towing: bool,
    pub is_car_wash: bool,
    pub status: RequestStatus,
    pub payment_status: PaymentStatus,
    pub mechanic_driver_id: Option<Uuid>,
    pub pickup_notes: Option<String>,
    pub rating: Option<Decimal>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Guarda de cancelación del ciclo de vida.
///
/// Cancelable mientras el estado no pasó de quote_ready y la cotización
/// viva (si existe) no fue aceptada. Debe evaluarse sobre lecturas frescas
/// de ambas filas: un chequeo viejo puede cancelar un trabajo cuya
/// cotización acaba de aceptarse.
pub fn can_cancel(status: RequestStatus, live_quote_status: Option<QuoteStatus>) -> bool {
    let within_window = match (status.order_index(), RequestStatus::QuoteReady.order_index()) {
        (Some(idx), Some(limit)) => idx <= limit,
        _ => false,
    };
    within_window && live_quote_status != Some(QuoteStatus::Accepted)
}

/// Agregar una nota fechada a la bitácora del problema.
///
/// La bitácora es append-only: cada nota lleva prefijo de fecha y las
/// entradas se separan con línea en blanco.
pub fn append_dated_note(log: &str, note: &str, at: DateTime<Utc>) -> String {
    let entry = format!("[{}] {}", at.format("%Y-%m-%d %H:%M"), note.trim());
    if log.trim().is_empty() {
        entry
    } else {
        format!("{}\n\n{}", log, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_order_is_forward() {
        let pipeline = [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::EnRoute,
            RequestStatus::Arrived,
            RequestStatus::Diagnosing,
            RequestStatus::QuoteReady,
            RequestStatus::MaintenanceInProgress,
            RequestStatus::VehicleEnrouteBack,
            RequestStatus::Completed,
        ];
        for window in pipeline.windows(2) {
            assert!(window[0].order_index() < window[1].order_index());
        }
        assert_eq!(RequestStatus::Cancelled.order_index(), None);
        assert!(!RequestStatus::Cancelled.is_active());
        assert!(RequestStatus::Completed.is_active());
    }

    #[test]
    fn test_can_cancel_before_quote_ready() {
        assert!(can_cancel(RequestStatus::Pending, None));
        assert!(can_cancel(RequestStatus::Diagnosing, None));
        assert!(can_cancel(RequestStatus::QuoteReady, Some(QuoteStatus::Pending)));
        assert!(can_cancel(RequestStatus::QuoteReady, Some(QuoteStatus::Rejected)));
    }

    #[test]
    fn test_cannot_cancel_after_quote_accepted() {
        assert!(!can_cancel(RequestStatus::QuoteReady, Some(QuoteStatus::Accepted)));
        assert!(!can_cancel(RequestStatus::Diagnosing, Some(QuoteStatus::Accepted)));
    }

    #[test]
    fn test_cannot_cancel_committed_states() {
        assert!(!can_cancel(RequestStatus::MaintenanceInProgress, None));
        assert!(!can_cancel(RequestStatus::VehicleEnrouteBack, None));
        assert!(!can_cancel(RequestStatus::Completed, None));
        assert!(!can_cancel(RequestStatus::Cancelled, None));
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&RequestStatus::VehicleEnrouteBack).unwrap();
        assert_eq!(json, "\"vehicle_enroute_back\"");
        let parsed: RequestStatus = serde_json::from_str("\"maintenance_in_progress\"").unwrap();
        assert_eq!(parsed, RequestStatus::MaintenanceInProgress);
        // Estados fuera del conjunto cerrado no son representables
        assert!(serde_json::from_str::<RequestStatus>("\"on_fire\"").is_err());
    }

    #[test]
    fn test_append_dated_note() {
        let at = Utc.with_ymd_and_hms(2026, 8, 6, 14, 30, 0).unwrap();
        let log = append_dated_note("", "El cliente deja las llaves en portería", at);
        assert_eq!(log, "[2026-08-06 14:30] El cliente deja las llaves en portería");

        let log2 = append_dated_note(&log, "Portón azul", at);
        assert!(log2.contains("\n\n[2026-08-06 14:30] Portón azul"));
        assert!(log2.starts_with("[2026-08-06 14:30] El cliente"));
    }
}
