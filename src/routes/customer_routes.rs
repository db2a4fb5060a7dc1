//! Rutas del cliente
//!
//! Todo el router pasa por el middleware de autenticación opcional: el
//! envío de solicitud acepta visitantes (contrato de envío diferido) y el
//! resto de los handlers exige el actor con el extractor, que rechaza si
//! no hubo token válido. La suscripción de tracking es un stream SSE
//! sobre el canal de eventos de cambio.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::controllers::customer_controller::CustomerController;
use crate::dto::common::ApiResponse;
use crate::dto::quote_dto::QuoteResponse;
use crate::dto::request_dto::{
    DeclineQuoteDto, MarkPaidDto, PickupNoteDto, RateRequestDto, RequestResponse,
    SubmitRequestDto, TrackingResponse,
};
use crate::middleware::auth::{optional_auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_request_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(submit_request))
        .route("/", get(list_my_requests))
        .route("/raw", post(submit_raw))
        .route("/:id", get(tracking))
        .route("/:id/events", get(request_events))
        .route("/:id/cancel", post(cancel_request))
        .route("/:id/quote/accept", post(accept_quote))
        .route("/:id/quote/decline", post(decline_quote))
        .route("/:id/payment", post(mark_paid))
        .route("/:id/notes", post(add_pickup_note))
        .route("/:id/rating", post(rate_request))
        .layer(middleware::from_fn_with_state(state, optional_auth_middleware))
}

async fn submit_request(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    Json(dto): Json<SubmitRequestDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.submit(user, dto).await?;
    Ok(Json(response))
}

async fn submit_raw(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(dto): Json<SubmitRequestDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.submit_raw(user, dto).await?;
    Ok(Json(response))
}

async fn list_my_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.list_mine(&user).await?;
    Ok(Json(response))
}

async fn tracking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TrackingResponse>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.tracking(&user, id).await?;
    Ok(Json(response))
}

/// Stream SSE de cambios de la solicitud: ante cualquier evento el
/// cliente re-consulta la vista de tracking completa
async fn request_events(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    // La propiedad se verifica antes de abrir el stream
    let controller = CustomerController::new(&state);
    controller.tracking(&user, id).await?;

    let rx = state.events.subscribe();
    let stream = futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.concerns(id) => {
                    let data = serde_json::to_string(&event).unwrap_or_default();
                    return Some((Ok(Event::default().event("change").data(data)), rx));
                }
                // Eventos de otras solicitudes no interesan acá
                Ok(_) => continue,
                // Si el suscriptor se atrasó, con seguir alcanza: el
                // cliente re-consulta todo en el próximo evento
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn cancel_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.cancel(&user, id).await?;
    Ok(Json(response))
}

async fn accept_quote(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.accept_quote(&user, id).await?;
    Ok(Json(response))
}

async fn decline_quote(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<DeclineQuoteDto>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.decline_quote(&user, id, dto).await?;
    Ok(Json(response))
}

async fn mark_paid(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<MarkPaidDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.mark_paid(&user, id, dto).await?;
    Ok(Json(response))
}

async fn add_pickup_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<PickupNoteDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.add_pickup_note(&user, id, dto).await?;
    Ok(Json(response))
}

async fn rate_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<RateRequestDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = CustomerController::new(&state);
    let response = controller.rate(&user, id, dto).await?;
    Ok(Json(response))
}
