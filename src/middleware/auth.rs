//! Middleware de autenticación JWT
//!
//! La identidad viene de un proveedor externo: acá solo se valida el
//! token, se proyecta el actor autenticado y se chequea la capacidad de
//! admin contra la allow-list configurada. Nunca se toca el body antes
//! de resolver la identidad.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EnvironmentConfig;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Claims del JWT emitido por el proveedor de identidad
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Actor autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
}

/// Extractor del actor autenticado.
///
/// Funciona detrás de cualquiera de los middlewares de este módulo: el
/// de admin inserta el actor directo; el opcional inserta
/// `Option<AuthenticatedUser>` y acá se exige que sea `Some`.
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        if let Some(Some(user)) = parts.extensions.get::<Option<AuthenticatedUser>>() {
            return Ok(user.clone());
        }

        Err(AppError::Unauthorized(
            "Token de autorización requerido".to_string(),
        ))
    }
}

/// Resolver el actor autenticado desde el header Authorization
pub fn authenticate(request: &Request, config: &EnvironmentConfig) -> Result<AuthenticatedUser, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))?;

    let claims = token_data.claims;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;

    Ok(AuthenticatedUser {
        user_id,
        email: claims.email,
        full_name: claims.name,
    })
}

/// Middleware opcional: la ruta acepta visitantes, pero si hay token
/// válido el actor queda disponible (contrato de envío diferido)
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = authenticate(&request, &state.config).ok();
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// Middleware de admin: actor válido cuyo email está en la allow-list.
///
/// El rechazo a un no-admin es genérico a propósito.
pub async fn admin_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&request, &state.config)?;

    if !state.config.is_admin(&user.email) {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
