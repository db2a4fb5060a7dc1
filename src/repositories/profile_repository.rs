//! Repositorio de Profile
//!
//! La proyección de identidad se crea o completa a partir del primer envío
//! de solicitud: si el perfil no existe se inserta, y si existe sin
//! teléfono se completa con el del formulario.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::Profile;
use crate::utils::errors::AppError;

pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Asegurar el perfil del cliente, completando el teléfono si faltaba
    pub async fn ensure_profile(
        &self,
        id: Uuid,
        email: &str,
        full_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, full_name, email, phone, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET phone = COALESCE(profiles.phone, EXCLUDED.phone)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name.unwrap_or_default())
        .bind(email)
        .bind(phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
