//! Modelo de Profile
//!
//! Proyección de identidad del cliente, 1:1 con la cuenta autenticada.
//! El teléfono puede completarse desde un envío de solicitud si falta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile principal - mapea exactamente a la tabla profiles
///
/// El id coincide con el subject del proveedor de identidad.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}
