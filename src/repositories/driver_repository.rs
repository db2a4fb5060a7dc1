//! Repositorio de Driver

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::utils::errors::AppError;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        full_name: String,
        phone_number: String,
        location: Option<String>,
        bio: Option<String>,
        avatar_url: Option<String>,
        is_verified: bool,
    ) -> Result<Driver, AppError> {
        let id = Uuid::new_v4();

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (
                id, full_name, phone_number, location, bio, avatar_url,
                is_verified, jobs_completed, ratings, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(phone_number)
        .bind(location)
        .bind(bio)
        .bind(avatar_url)
        .bind(is_verified)
        .bind(Decimal::new(50, 1)) // ratings por defecto: 5.0
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(driver)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    pub async fn list(&self) -> Result<Vec<Driver>, AppError> {
        let drivers = sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(drivers)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// El driver tiene una solicitud activa asignada.
    ///
    /// La intención es un trabajo a la vez por driver; el chequeo convierte
    /// la doble asignación en un Conflict visible en lugar de pisarla en
    /// silencio.
    pub async fn has_active_assignment(&self, driver_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM service_requests
                WHERE mechanic_driver_id = $1
                AND status NOT IN ('completed', 'cancelled')
            )
            "#,
        )
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }
}
