//! Repositorio de ServicePrice

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::service_price::ServicePrice;
use crate::utils::errors::AppError;

pub struct PriceRepository {
    pool: PgPool,
}

impl PriceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        key: String,
        label: String,
        price: Decimal,
        description: Option<String>,
    ) -> Result<ServicePrice, AppError> {
        if self.find_by_key(&key).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Ya existe un precio con la clave '{}'",
                key
            )));
        }

        let entry = sqlx::query_as::<_, ServicePrice>(
            r#"
            INSERT INTO service_prices (id, key, label, price, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(label)
        .bind(price)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ServicePrice>, AppError> {
        let entry = sqlx::query_as::<_, ServicePrice>("SELECT * FROM service_prices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(entry)
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<ServicePrice>, AppError> {
        let entry =
            sqlx::query_as::<_, ServicePrice>("SELECT * FROM service_prices WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(entry)
    }

    pub async fn list(&self) -> Result<Vec<ServicePrice>, AppError> {
        let entries =
            sqlx::query_as::<_, ServicePrice>("SELECT * FROM service_prices ORDER BY label")
                .fetch_all(&self.pool)
                .await?;

        Ok(entries)
    }

    pub async fn update(
        &self,
        id: Uuid,
        label: Option<String>,
        price: Option<Decimal>,
        description: Option<String>,
    ) -> Result<ServicePrice, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Precio no encontrado".to_string()))?;

        let entry = sqlx::query_as::<_, ServicePrice>(
            r#"
            UPDATE service_prices
            SET label = $2, price = $3, description = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(label.unwrap_or(current.label))
        .bind(price.unwrap_or(current.price))
        .bind(description.or(current.description))
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Precio no encontrado".to_string()))?;

        sqlx::query("DELETE FROM service_prices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
