//! Rutas de admin
//!
//! Todas pasan por el middleware de admin: identidad válida y email en la
//! allow-list antes de tocar el body.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::admin_controller::AdminController;
use crate::dto::common::ApiResponse;
use crate::dto::driver_dto::{CreateDriverDto, DriverResponse};
use crate::dto::price_dto::{CreatePriceDto, PriceResponse, UpdatePriceDto};
use crate::dto::quote_dto::{CreateQuoteDto, QuoteResponse, UpdateQuoteDto};
use crate::dto::request_dto::{
    AssignDriverDto, EditRequestDetailsDto, RequestResponse, SetPaymentStatusDto, SetStatusDto,
};
use crate::middleware::auth::admin_middleware;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests/:id", put(edit_request))
        .route("/requests/:id", delete(cancel_request))
        .route("/requests/:id/driver", post(assign_driver))
        .route("/requests/:id/status", post(set_status))
        .route("/requests/:id/payment-status", post(set_payment_status))
        .route("/quotes", get(list_quotes))
        .route("/quotes", post(create_quote))
        .route("/quotes/:id", put(update_quote))
        .route("/quotes/:id", delete(delete_quote))
        .route("/drivers", get(list_drivers))
        .route("/drivers", post(create_driver))
        .route("/drivers/:id", delete(delete_driver))
        .route("/prices", get(list_prices))
        .route("/prices", post(create_price))
        .route("/prices/:id", put(update_price))
        .route("/prices/:id", delete(delete_price))
        .layer(middleware::from_fn_with_state(state, admin_middleware))
}

// --- Solicitudes ---

async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.list_requests().await?;
    Ok(Json(response))
}

async fn edit_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<EditRequestDetailsDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.edit_request(id, dto).await?;
    Ok(Json(response))
}

async fn cancel_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.cancel_request(id).await?;
    Ok(Json(response))
}

async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<AssignDriverDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.assign_driver(id, dto).await?;
    Ok(Json(response))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<SetStatusDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.set_status(id, dto).await?;
    Ok(Json(response))
}

async fn set_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<SetPaymentStatusDto>,
) -> Result<Json<ApiResponse<RequestResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.set_payment_status(id, dto).await?;
    Ok(Json(response))
}

// --- Cotizaciones ---

async fn list_quotes(
    State(state): State<AppState>,
) -> Result<Json<Vec<QuoteResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.list_quotes().await?;
    Ok(Json(response))
}

async fn create_quote(
    State(state): State<AppState>,
    Json(dto): Json<CreateQuoteDto>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.create_quote(dto).await?;
    Ok(Json(response))
}

async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateQuoteDto>,
) -> Result<Json<ApiResponse<QuoteResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.update_quote(id, dto).await?;
    Ok(Json(response))
}

async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.delete_quote(id).await?;
    Ok(Json(response))
}

// --- Drivers ---

async fn list_drivers(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.list_drivers().await?;
    Ok(Json(response))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(dto): Json<CreateDriverDto>,
) -> Result<Json<ApiResponse<DriverResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.create_driver(dto).await?;
    Ok(Json(response))
}

async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.delete_driver(id).await?;
    Ok(Json(response))
}

// --- Precios ---

async fn list_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<PriceResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.list_prices().await?;
    Ok(Json(response))
}

async fn create_price(
    State(state): State<AppState>,
    Json(dto): Json<CreatePriceDto>,
) -> Result<Json<ApiResponse<PriceResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.create_price(dto).await?;
    Ok(Json(response))
}

async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdatePriceDto>,
) -> Result<Json<ApiResponse<PriceResponse>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.update_price(id, dto).await?;
    Ok(Json(response))
}

async fn delete_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AdminController::new(&state);
    let response = controller.delete_price(id).await?;
    Ok(Json(response))
}
