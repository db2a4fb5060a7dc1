//! Gateway de mutaciones de admin
//!
//! Entradas privilegiadas al ciclo de vida: comandos tipados sobre
//! solicitudes, CRUD de cotizaciones, drivers y precios. La capacidad de
//! admin ya fue verificada por el middleware (allow-list) antes de leer
//! el body. A diferencia de las rutas de cliente, acá los errores de
//! persistencia se devuelven con su detalle para diagnóstico.

use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::{CreateDriverDto, DriverResponse};
use crate::dto::price_dto::{CreatePriceDto, PriceResponse, UpdatePriceDto};
use crate::dto::quote_dto::{CreateQuoteDto, QuoteResponse, UpdateQuoteDto};
use crate::dto::request_dto::{
    AssignDriverDto, EditRequestDetailsDto, RequestResponse, SetPaymentStatusDto, SetStatusDto,
};
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::price_repository::PriceRepository;
use crate::repositories::quote_repository::QuoteRepository;
use crate::repositories::request_repository::RequestRepository;
use crate::services::lifecycle_service::LifecycleService;
use crate::services::quote_service::QuoteService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{parse_date, parse_time};
use crate::models::service_price::slug_from_label;

pub struct AdminController {
    requests: RequestRepository,
    quotes: QuoteRepository,
    drivers: DriverRepository,
    prices: PriceRepository,
    lifecycle: LifecycleService,
    quote_service: QuoteService,
}

impl AdminController {
    pub fn new(state: &AppState) -> Self {
        Self {
            requests: RequestRepository::new(state.pool.clone()),
            quotes: QuoteRepository::new(state.pool.clone()),
            drivers: DriverRepository::new(state.pool.clone()),
            prices: PriceRepository::new(state.pool.clone()),
            lifecycle: LifecycleService::new(
                state.pool.clone(),
                state.notifier.clone(),
                state.events.clone(),
            ),
            quote_service: QuoteService::new(
                state.pool.clone(),
                state.notifier.clone(),
                state.events.clone(),
            ),
        }
    }

    // --- Solicitudes ---

    pub async fn list_requests(&self) -> AppResult<Vec<RequestResponse>> {
        let requests = self.requests.list_active().await?;
        Ok(requests.into_iter().map(RequestResponse::from).collect())
    }

    pub async fn assign_driver(
        &self,
        request_id: Uuid,
        dto: AssignDriverDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let request = self
            .lifecycle
            .assign_driver(request_id, dto.mechanic_driver_id)
            .await?;

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Driver asignado y solicitud aceptada".to_string(),
        ))
    }

    pub async fn set_status(
        &self,
        request_id: Uuid,
        dto: SetStatusDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let request = self.lifecycle.set_status(request_id, dto.status).await?;

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Estado actualizado".to_string(),
        ))
    }

    pub async fn set_payment_status(
        &self,
        request_id: Uuid,
        dto: SetPaymentStatusDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let request = self
            .lifecycle
            .set_payment_status(request_id, dto.payment_status)
            .await?;

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Estado de pago actualizado".to_string(),
        ))
    }

    /// Corrección de datos del vehículo y la cita (override de admin)
    pub async fn edit_request(
        &self,
        request_id: Uuid,
        dto: EditRequestDetailsDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let pickup_date = match dto.pickup_date.as_deref() {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| {
                AppError::Validation("Fecha de recogida inválida (YYYY-MM-DD)".to_string())
            })?),
            None => None,
        };

        let pickup_time = match dto.pickup_time.as_deref() {
            Some(raw) => Some(parse_time(raw).ok_or_else(|| {
                AppError::Validation("Hora de recogida inválida (HH:MM)".to_string())
            })?),
            None => None,
        };

        let current = self
            .requests
            .find_active_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Solicitud no encontrada".to_string()))?;

        let request = self
            .requests
            .update_details(
                &current,
                dto.brand,
                dto.model,
                dto.year,
                dto.license_plate,
                dto.pickup_location,
                pickup_date,
                pickup_time,
                dto.service_type,
                dto.is_towing,
                dto.is_car_wash,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Solicitud actualizada".to_string(),
        ))
    }

    pub async fn cancel_request(&self, request_id: Uuid) -> AppResult<ApiResponse<()>> {
        self.lifecycle.cancel(request_id, None).await?;
        Ok(ApiResponse::message_only("Solicitud cancelada".to_string()))
    }

    // --- Cotizaciones ---

    pub async fn create_quote(
        &self,
        dto: CreateQuoteDto,
    ) -> AppResult<ApiResponse<QuoteResponse>> {
        let quote = self.quote_service.create(dto).await?;

        Ok(ApiResponse::success_with_message(
            quote.into(),
            "Cotización creada y enviada al cliente".to_string(),
        ))
    }

    pub async fn update_quote(
        &self,
        quote_id: Uuid,
        dto: UpdateQuoteDto,
    ) -> AppResult<ApiResponse<QuoteResponse>> {
        let quote = self.quote_service.update(quote_id, dto).await?;

        Ok(ApiResponse::success_with_message(
            quote.into(),
            "Cotización actualizada".to_string(),
        ))
    }

    pub async fn delete_quote(&self, quote_id: Uuid) -> AppResult<ApiResponse<()>> {
        self.quote_service.delete(quote_id).await?;
        Ok(ApiResponse::message_only(
            "Cotización eliminada; la solicitud volvió a diagnóstico".to_string(),
        ))
    }

    pub async fn list_quotes(&self) -> AppResult<Vec<QuoteResponse>> {
        let quotes = self.quotes.list_all().await?;
        Ok(quotes.into_iter().map(QuoteResponse::from).collect())
    }

    // --- Drivers ---

    pub async fn create_driver(
        &self,
        dto: CreateDriverDto,
    ) -> AppResult<ApiResponse<DriverResponse>> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let driver = self
            .drivers
            .create(
                dto.full_name,
                dto.phone_number,
                dto.location,
                dto.bio,
                dto.avatar_url,
                dto.is_verified.unwrap_or(true),
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            driver.into(),
            "Driver creado".to_string(),
        ))
    }

    pub async fn list_drivers(&self) -> AppResult<Vec<DriverResponse>> {
        let drivers = self.drivers.list().await?;
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    pub async fn delete_driver(&self, driver_id: Uuid) -> AppResult<ApiResponse<()>> {
        if self.drivers.has_active_assignment(driver_id).await? {
            return Err(AppError::Conflict(
                "El driver tiene una solicitud activa asignada".to_string(),
            ));
        }

        self.drivers.delete(driver_id).await?;
        Ok(ApiResponse::message_only("Driver eliminado".to_string()))
    }

    // --- Precios ---

    pub async fn create_price(
        &self,
        dto: CreatePriceDto,
    ) -> AppResult<ApiResponse<PriceResponse>> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if dto.price <= rust_decimal::Decimal::ZERO {
            return Err(AppError::Validation(
                "El precio debe ser mayor a cero".to_string(),
            ));
        }

        let key = dto
            .key
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| slug_from_label(&dto.label));

        let price = self
            .prices
            .create(key, dto.label, dto.price, dto.description)
            .await?;

        Ok(ApiResponse::success_with_message(
            price.into(),
            "Precio creado".to_string(),
        ))
    }

    pub async fn update_price(
        &self,
        price_id: Uuid,
        dto: UpdatePriceDto,
    ) -> AppResult<ApiResponse<PriceResponse>> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(price) = dto.price {
            if price <= rust_decimal::Decimal::ZERO {
                return Err(AppError::Validation(
                    "El precio debe ser mayor a cero".to_string(),
                ));
            }
        }

        let price = self
            .prices
            .update(price_id, dto.label, dto.price, dto.description)
            .await?;

        Ok(ApiResponse::success_with_message(
            price.into(),
            "Precio actualizado".to_string(),
        ))
    }

    pub async fn delete_price(&self, price_id: Uuid) -> AppResult<ApiResponse<()>> {
        self.prices.delete(price_id).await?;
        Ok(ApiResponse::message_only("Precio eliminado".to_string()))
    }

    pub async fn list_prices(&self) -> AppResult<Vec<PriceResponse>> {
        let prices = self.prices.list().await?;
        Ok(prices.into_iter().map(PriceResponse::from).collect())
    }
}
