//! Modelo de Driver
//!
//! Perfil de mecánico-conductor. Solo el admin crea y elimina drivers;
//! una solicitud activa referencia como máximo un driver.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_verified: bool,
    pub jobs_completed: i32,
    pub ratings: Decimal,
    pub created_at: DateTime<Utc>,
}
