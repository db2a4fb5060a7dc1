//! Gateway de acciones del cliente
//!
//! Todas las operaciones están acotadas al dueño de la solicitud. Los
//! errores de persistencia salen degradados a un mensaje genérico: el
//! detalle crudo es solo para rutas de admin.

use chrono::Utc;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::quote_dto::QuoteResponse;
use crate::dto::request_dto::{
    DeclineQuoteDto, MarkPaidDto, PickupNoteDto, RateRequestDto, RequestResponse,
    SubmitRequestDto, TrackingResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::profile_repository::ProfileRepository;
use crate::repositories::quote_repository::QuoteRepository;
use crate::repositories::request_repository::RequestRepository;
use crate::services::lifecycle_service::LifecycleService;
use crate::services::notification_service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_submission, validate_submission_fields, ValidatedSubmission};
use uuid::Uuid;

pub struct CustomerController {
    requests: RequestRepository,
    quotes: QuoteRepository,
    drivers: DriverRepository,
    profiles: ProfileRepository,
    lifecycle: LifecycleService,
    notifier: NotificationService,
}

impl CustomerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            requests: RequestRepository::new(state.pool.clone()),
            quotes: QuoteRepository::new(state.pool.clone()),
            drivers: DriverRepository::new(state.pool.clone()),
            profiles: ProfileRepository::new(state.pool.clone()),
            lifecycle: LifecycleService::new(
                state.pool.clone(),
                state.notifier.clone(),
                state.events.clone(),
            ),
            notifier: state.notifier.clone(),
        }
    }

    /// Enviar una solicitud de servicio.
    ///
    /// Primero se valida el formulario; si el visitante no está
    /// autenticado, la respuesta es el centinela de login con el payload
    /// ya validado para reenviarlo tal cual después de autenticarse.
    pub async fn submit(
        &self,
        user: Option<AuthenticatedUser>,
        dto: SubmitRequestDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let validated = validate_submission(&dto, Utc::now())?;

        let user = user.ok_or_else(|| {
            AppError::LoginRequired(serde_json::to_value(&dto).unwrap_or_default())
        })?;

        self.persist_submission(&user, &dto, validated).await
    }

    /// Reenvío post-login del payload guardado por el cliente.
    ///
    /// Se re-valida el esquema pero no la vigencia de la cita: el envío
    /// original ya pasó ese chequeo y puede llegar horas después.
    pub async fn submit_raw(
        &self,
        user: AuthenticatedUser,
        dto: SubmitRequestDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let validated = validate_submission_fields(&dto)?;
        self.persist_submission(&user, &dto, validated).await
    }

    async fn persist_submission(
        &self,
        user: &AuthenticatedUser,
        dto: &SubmitRequestDto,
        validated: ValidatedSubmission,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        self.profiles
            .ensure_profile(
                user.user_id,
                &user.email,
                user.full_name.as_deref(),
                dto.phone.as_deref(),
            )
            .await
            .map_err(AppError::customer_facing)?;

        let request = self
            .requests
            .create(user.user_id, &validated)
            .await
            .map_err(AppError::customer_facing)?;

        let vehicle = format!("{} {} {}", request.brand, request.model, request.year);
        self.notifier.notify_support_new_request(&user.email, &vehicle);

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Solicitud enviada. Te avisamos cuando un driver la tome.".to_string(),
        ))
    }

    pub async fn list_mine(
        &self,
        user: &AuthenticatedUser,
    ) -> AppResult<Vec<RequestResponse>> {
        let requests = self
            .requests
            .find_active_by_customer(user.user_id)
            .await
            .map_err(AppError::customer_facing)?;

        Ok(requests.into_iter().map(RequestResponse::from).collect())
    }

    /// Vista de seguimiento: solicitud + cotización viva + driver asignado
    pub async fn tracking(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
    ) -> AppResult<TrackingResponse> {
        let request = self
            .requests
            .find_active_by_id(request_id)
            .await
            .map_err(AppError::customer_facing)?
            .ok_or_else(|| AppError::NotFound("Solicitud no encontrada".to_string()))?;

        if request.customer_id != user.user_id {
            return Err(AppError::Forbidden(
                "No tienes permiso sobre esta solicitud".to_string(),
            ));
        }

        let quote = self
            .quotes
            .find_live_by_request(request_id)
            .await
            .map_err(AppError::customer_facing)?;

        let driver = match request.mechanic_driver_id {
            Some(driver_id) => self
                .drivers
                .find_by_id(driver_id)
                .await
                .map_err(AppError::customer_facing)?,
            None => None,
        };

        Ok(TrackingResponse::new(request, quote, driver))
    }

    pub async fn cancel(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
    ) -> AppResult<ApiResponse<()>> {
        self.lifecycle
            .cancel(request_id, Some(user.user_id))
            .await
            .map_err(AppError::customer_facing)?;

        Ok(ApiResponse::message_only("Solicitud cancelada".to_string()))
    }

    pub async fn accept_quote(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
    ) -> AppResult<ApiResponse<QuoteResponse>> {
        let quote = self
            .lifecycle
            .accept_quote(request_id, user.user_id)
            .await
            .map_err(AppError::customer_facing)?;

        Ok(ApiResponse::success_with_message(
            quote.into(),
            "Cotización aceptada".to_string(),
        ))
    }

    pub async fn decline_quote(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        dto: DeclineQuoteDto,
    ) -> AppResult<ApiResponse<QuoteResponse>> {
        let quote = self
            .lifecycle
            .decline_quote(request_id, user.user_id, &dto.reason)
            .await
            .map_err(AppError::customer_facing)?;

        Ok(ApiResponse::success_with_message(
            quote.into(),
            "Cotización rechazada. El taller va a revisar el diagnóstico.".to_string(),
        ))
    }

    pub async fn mark_paid(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        dto: MarkPaidDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let reference = dto
            .payment_reference
            .as_deref()
            .or(dto.payment_method.as_deref());

        let request = self
            .lifecycle
            .mark_paid(request_id, user.user_id, reference)
            .await
            .map_err(AppError::customer_facing)?;

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Pago registrado, queda en verificación".to_string(),
        ))
    }

    pub async fn add_pickup_note(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        dto: PickupNoteDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        let request = self
            .lifecycle
            .add_pickup_note(request_id, user.user_id, &dto.note)
            .await
            .map_err(AppError::customer_facing)?;

        Ok(ApiResponse::success(request.into()))
    }

    pub async fn rate(
        &self,
        user: &AuthenticatedUser,
        request_id: Uuid,
        dto: RateRequestDto,
    ) -> AppResult<ApiResponse<RequestResponse>> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let request = self
            .lifecycle
            .rate_request(request_id, user.user_id, dto.rating, dto.review.as_deref())
            .await
            .map_err(AppError::customer_facing)?;

        Ok(ApiResponse::success_with_message(
            request.into(),
            "Gracias por calificar el servicio".to_string(),
        ))
    }
}
