//! Servicio de cotizaciones
//!
//! Crea, corrige y elimina cotizaciones. Toda operación que toca además
//! la solicitud padre (crear, reasignar, borrar) corre en una transacción
//! para que cotización y solicitud se muevan juntas.

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::quote_dto::{CreateQuoteDto, UpdateQuoteDto};
use crate::events::{ChangeEvent, EventBus};
use crate::models::quote::{breakdown_total, Quote, QuoteLine};
use crate::services::lifecycle_service::lock_active_request;
use crate::services::notification_service::NotificationService;
use crate::services::pricing_service::PricingService;
use crate::utils::errors::{AppError, AppResult};

pub struct QuoteService {
    pool: PgPool,
    notifier: NotificationService,
    pricing: PricingService,
    events: EventBus,
}

impl QuoteService {
    pub fn new(pool: PgPool, notifier: NotificationService, events: EventBus) -> Self {
        Self {
            pricing: PricingService::new(pool.clone()),
            pool,
            notifier,
            events,
        }
    }

    /// Crear la cotización de una solicitud diagnosticada.
    ///
    /// El monto es la suma del desglose. La solicitud pasa a quote_ready y
    /// el cliente recibe "cotización lista" con el total calculado
    /// (desglose + extras activos).
    pub async fn create(&self, dto: CreateQuoteDto) -> AppResult<Quote> {
        let breakdown: Vec<QuoteLine> =
            dto.breakdown.into_iter().map(QuoteLine::from).collect();

        if breakdown.is_empty() {
            return Err(AppError::Validation(
                "El desglose no puede estar vacío".to_string(),
            ));
        }

        let amount = breakdown_total(&breakdown);
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "El monto de la cotización debe ser mayor a cero".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, dto.request_id).await?;

        // Una sola cotización viva por solicitud, garantizado acá y no
        // solo en el formulario de admin
        let existing: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM quotes WHERE request_id = $1 AND status <> 'rejected')",
        )
        .bind(dto.request_id)
        .fetch_one(&mut *tx)
        .await?;

        if existing.0 {
            return Err(AppError::Conflict(
                "La solicitud ya tiene una cotización viva".to_string(),
            ));
        }

        let quote = sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (id, request_id, amount, breakdown, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(dto.request_id)
        .bind(amount)
        .bind(Json(&breakdown))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE service_requests SET status = 'quote_ready', updated_at = now() WHERE id = $1",
        )
        .bind(dto.request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::quote(quote.id, dto.request_id));
        self.events.publish(ChangeEvent::request(dto.request_id));

        if let Some(email) = self.customer_email(request.customer_id).await {
            match self
                .pricing
                .invoice_for(&breakdown, amount, request.is_towing, request.is_car_wash)
                .await
            {
                Ok(invoice) => self.notifier.notify_quote_ready(&email, &invoice),
                Err(e) => log::warn!(
                    "No se pudo armar la factura de la cotización {}: {}",
                    quote.id,
                    e
                ),
            }
        }

        Ok(quote)
    }

    /// Patch tipado de corrección de admin.
    ///
    /// Si viene desglose sin monto, el monto se recalcula del desglose
    /// para mantener la invariante monto = suma del desglose. La
    /// reasignación a otra solicitud mueve los estados de ambas
    /// solicitudes en la misma transacción: la vieja vuelve a diagnosing
    /// y la nueva pasa a quote_ready.
    pub async fn update(&self, quote_id: Uuid, dto: UpdateQuoteDto) -> AppResult<Quote> {
        if dto.is_empty() {
            return Err(AppError::BadRequest("Nada para actualizar".to_string()));
        }

        if let Some(amount) = dto.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "El monto de la cotización debe ser mayor a cero".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1 FOR UPDATE")
            .bind(quote_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Cotización no encontrada".to_string()))?;

        let breakdown: Vec<QuoteLine> = match dto.breakdown {
            Some(lines) => lines.into_iter().map(QuoteLine::from).collect(),
            None => current.breakdown.0.clone(),
        };

        let amount = match (dto.amount, &breakdown) {
            (Some(amount), _) => amount,
            (None, lines) if !lines.is_empty() && lines != &current.breakdown.0 => {
                breakdown_total(lines)
            }
            _ => current.amount,
        };

        let status = dto.status.unwrap_or(current.status);
        let request_id = dto.request_id.unwrap_or(current.request_id);

        if request_id != current.request_id {
            // Reasignación: ambas solicitudes cambian de estado juntas
            lock_active_request(&mut tx, request_id).await?;

            sqlx::query(
                "UPDATE service_requests SET status = 'diagnosing', updated_at = now() WHERE id = $1",
            )
            .bind(current.request_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE service_requests SET status = 'quote_ready', updated_at = now() WHERE id = $1",
            )
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        }

        let updated = sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes
            SET amount = $2, breakdown = $3, status = $4, request_id = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(quote_id)
        .bind(amount)
        .bind(Json(&breakdown))
        .bind(status)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::quote(quote_id, current.request_id));
        if request_id != current.request_id {
            self.events.publish(ChangeEvent::request(current.request_id));
            self.events.publish(ChangeEvent::request(request_id));
        }

        Ok(updated)
    }

    /// Eliminar una cotización revierte a la solicitud padre a
    /// {diagnosing, pago pendiente}: deshacer la cotización siempre
    /// resetea el pago, porque sin cotización no hay pago posible.
    pub async fn delete(&self, quote_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let quote = sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1 FOR UPDATE")
            .bind(quote_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Cotización no encontrada".to_string()))?;

        sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE service_requests
            SET status = 'diagnosing', payment_status = 'pending', updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(quote.request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::quote(quote_id, quote.request_id));
        self.events.publish(ChangeEvent::request(quote.request_id));

        Ok(())
    }

    async fn customer_email(&self, customer_id: Uuid) -> Option<String> {
        match sqlx::query_scalar::<_, String>("SELECT email FROM profiles WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(Some(email)) => Some(email),
            Ok(None) => {
                log::warn!("Perfil sin email para el cliente {}", customer_id);
                None
            }
            Err(e) => {
                log::warn!("No se pudo resolver el email del cliente {}: {}", customer_id, e);
                None
            }
        }
    }
}
