//! Repositorio de Quote
//!
//! Lecturas simples sobre quotes. Crear, editar y borrar cotizaciones
//! toca también la solicitud padre, así que esas escrituras viven en
//! QuoteService dentro de una transacción.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::quote::Quote;
use crate::utils::errors::AppError;

pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// La cotización viva de una solicitud: la no-rechazada más reciente.
    ///
    /// Si por una carrera quedaron dos vivas, gana determinísticamente la
    /// de created_at más nuevo.
    pub async fn find_live_by_request(&self, request_id: Uuid) -> Result<Option<Quote>, AppError> {
        let quote = sqlx::query_as::<_, Quote>(
            r#"
            SELECT * FROM quotes
            WHERE request_id = $1 AND status <> 'rejected'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quote)
    }

    pub async fn list_all(&self) -> Result<Vec<Quote>, AppError> {
        let quotes = sqlx::query_as::<_, Quote>("SELECT * FROM quotes ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(quotes)
    }
}
