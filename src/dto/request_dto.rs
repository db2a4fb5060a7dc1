//! DTOs de ServiceRequest
//!
//! Contratos de entrada y salida del gateway de clientes y de los
//! comandos tipados del gateway de admin. El formulario de envío usa
//! camelCase porque así lo manda el cliente web.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::driver::Driver;
use crate::models::quote::Quote;
use crate::models::request::{PaymentStatus, RequestStatus, ServiceRequest};

use super::driver_dto::DriverResponse;
use super::quote_dto::QuoteResponse;

/// Payload del formulario de solicitud de servicio
///
/// Fechas y horas llegan como strings del formulario; se parsean y
/// validan en `utils::validation` con contrato de un error a la vez.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestDto {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: Option<String>,
    pub pickup_date: String,
    pub pickup_time: String,
    pub description: String,
    pub pickup_location: String,
    pub service_type: String,
    pub is_towing: Option<bool>,
    pub is_car_wash: Option<bool>,
    /// Teléfono de contacto; completa el perfil del cliente si le faltaba
    pub phone: Option<String>,
}

/// Comando de admin: asignar driver (fuerza el estado a accepted)
#[derive(Debug, Deserialize)]
pub struct AssignDriverDto {
    pub mechanic_driver_id: Uuid,
}

/// Comando de admin: fijar estado del pipeline
///
/// El enum cierra el conjunto de estados: un valor fuera de la lista
/// no deserializa.
#[derive(Debug, Deserialize)]
pub struct SetStatusDto {
    pub status: RequestStatus,
}

/// Comando de admin: fijar estado de pago
#[derive(Debug, Deserialize)]
pub struct SetPaymentStatusDto {
    pub payment_status: PaymentStatus,
}

/// Comando de admin: corrección de datos del vehículo y la cita
#[derive(Debug, Deserialize, Validate)]
pub struct EditRequestDetailsDto {
    #[validate(length(min = 1, max = 100))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,

    #[validate(length(max = 20))]
    pub license_plate: Option<String>,

    #[validate(length(min = 5, max = 200))]
    pub pickup_location: Option<String>,

    pub pickup_date: Option<String>,
    pub pickup_time: Option<String>,

    #[validate(length(min = 3, max = 100))]
    pub service_type: Option<String>,

    pub is_towing: Option<bool>,
    pub is_car_wash: Option<bool>,
}

/// Rechazo de cotización: el motivo es obligatorio
#[derive(Debug, Deserialize)]
pub struct DeclineQuoteDto {
    pub reason: String,
}

/// Aviso de pago del cliente
#[derive(Debug, Deserialize)]
pub struct MarkPaidDto {
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
}

/// Nota de recogida del cliente
#[derive(Debug, Deserialize)]
pub struct PickupNoteDto {
    pub note: String,
}

/// Calificación tras completar el servicio
#[derive(Debug, Deserialize, Validate)]
pub struct RateRequestDto {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    #[validate(length(max = 1000))]
    pub review: Option<String>,
}

/// Response de solicitud para la API
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: Option<String>,
    pub pickup_location: String,
    pub pickup_date: String,
    pub pickup_time: String,
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

impl From<ServiceRequest> for RequestResponse {
    fn from(request: ServiceRequest) -> Self {
        Self {
            id: request.id,
            brand: request.brand,
            model: request.model,
            year: request.year,
            license_plate: request.license_plate,
            pickup_location: request.pickup_location,
            pickup_date: request.pickup_date.format("%Y-%m-%d").to_string(),
            pickup_time: request.pickup_time.format("%H:%M").to_string(),
            issue_description: request.issue_description,
            service_type: request.service_type,
            is_towing: request.is_towing,
            is_car_wash: request.is_car_wash,
            status: request.status,
            payment_status: request.payment_status,
            mechanic_driver_id: request.mechanic_driver_id,
            pickup_notes: request.pickup_notes,
            rating: request.rating,
            review: request.review,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Vista de seguimiento del cliente: solicitud + cotización viva + driver
#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub request: RequestResponse,
    pub quote: Option<QuoteResponse>,
    pub driver: Option<DriverResponse>,
}

impl TrackingResponse {
    pub fn new(request: ServiceRequest, quote: Option<Quote>, driver: Option<Driver>) -> Self {
        Self {
            request: request.into(),
            quote: quote.map(QuoteResponse::from),
            driver: driver.map(DriverResponse::from),
        }
    }
}
