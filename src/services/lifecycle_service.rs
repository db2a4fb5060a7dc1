//! Servicio del ciclo de vida de solicitudes
//!
//! Este es el núcleo del sistema: valida y aplica las transiciones de
//! estado de una solicitud (estado del pipeline, estado de pago,
//! asignación de driver, cancelación) y dispara las notificaciones que
//! corresponden a cada transición.
//!
//! Cada transición compuesta corre dentro de una transacción: las filas
//! involucradas se leen con FOR UPDATE para que la decisión se tome sobre
//! datos frescos aunque un admin y el cliente muten en paralelo. Las
//! notificaciones se despachan recién después del commit y nunca revierten
//! un cambio ya confirmado.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::events::{ChangeEvent, EventBus};
use crate::models::driver::Driver;
use crate::models::quote::{Quote, QuoteStatus};
use crate::models::request::{
    append_dated_note, can_cancel, PaymentStatus, RequestStatus, ServiceRequest,
};
use crate::services::notification_service::NotificationService;
use crate::services::pricing_service::{Invoice, PricingService};
use crate::utils::errors::{AppError, AppResult};

pub struct LifecycleService {
    pool: PgPool,
    notifier: NotificationService,
    pricing: PricingService,
    events: EventBus,
}

/// Leer y bloquear una solicitud activa dentro de la transacción
pub(crate) async fn lock_active_request(
    conn: &mut PgConnection,
    request_id: Uuid,
) -> AppResult<ServiceRequest> {
    sqlx::query_as::<_, ServiceRequest>(
        "SELECT * FROM service_requests WHERE id = $1 AND status <> 'cancelled' FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Solicitud no encontrada".to_string()))
}

/// Leer y bloquear la cotización viva de una solicitud, si existe
pub(crate) async fn lock_live_quote(
    conn: &mut PgConnection,
    request_id: Uuid,
) -> AppResult<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(
        r#"
        SELECT * FROM quotes
        WHERE request_id = $1 AND status <> 'rejected'
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await?;

    Ok(quote)
}

/// La solicitud pertenece al caller
pub(crate) fn ensure_owner(request: &ServiceRequest, customer_id: Uuid) -> AppResult<()> {
    if request.customer_id != customer_id {
        return Err(AppError::Forbidden(
            "No tienes permiso sobre esta solicitud".to_string(),
        ));
    }
    Ok(())
}

impl LifecycleService {
    pub fn new(pool: PgPool, notifier: NotificationService, events: EventBus) -> Self {
        Self {
            pricing: PricingService::new(pool.clone()),
            pool,
            notifier,
            events,
        }
    }

    /// Asignar un driver: fija mechanic_driver_id y fuerza el estado a
    /// accepted. Avisa al cliente con "Driver asignado".
    pub async fn assign_driver(
        &self,
        request_id: Uuid,
        driver_id: Uuid,
    ) -> AppResult<ServiceRequest> {
        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;

        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(driver_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        // Un trabajo a la vez por driver: la doble asignación se rechaza
        // en lugar de pisarse en silencio
        let busy: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM service_requests
                WHERE mechanic_driver_id = $1
                AND id <> $2
                AND status NOT IN ('completed', 'cancelled')
            )
            "#,
        )
        .bind(driver_id)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        if busy.0 {
            return Err(AppError::Conflict(
                "El driver ya tiene una solicitud activa asignada".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET mechanic_driver_id = $2, status = 'accepted', updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(driver_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        if let Some(email) = self.customer_email(request.customer_id).await {
            self.notifier.notify_driver_assigned(&email, &driver.full_name);
        }

        Ok(updated)
    }

    /// Fijar el estado del pipeline (escape hatch de admin: cualquier
    /// estado del conjunto cerrado, sin exigir avance de a un paso).
    ///
    /// La cancelación no pasa por acá: tiene su propia operación con guarda.
    pub async fn set_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> AppResult<ServiceRequest> {
        if status == RequestStatus::Cancelled {
            return Err(AppError::BadRequest(
                "La cancelación tiene su propia operación".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;

        let updated = sqlx::query_as::<_, ServiceRequest>(
            "UPDATE service_requests SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        // Al completar un trabajo asignado, el contador del driver avanza
        // en la misma transacción
        if status == RequestStatus::Completed && request.status != RequestStatus::Completed {
            if let Some(driver_id) = updated.mechanic_driver_id {
                sqlx::query("UPDATE drivers SET jobs_completed = jobs_completed + 1 WHERE id = $1")
                    .bind(driver_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        match status {
            RequestStatus::Arrived => {
                if let Some(email) = self.customer_email(updated.customer_id).await {
                    self.notifier.notify_vehicle_at_workshop(&email);
                }
            }
            RequestStatus::VehicleEnrouteBack => {
                if let Some(email) = self.customer_email(updated.customer_id).await {
                    self.notifier.notify_vehicle_returning(&email);
                }
            }
            _ => {}
        }

        Ok(updated)
    }

    /// Fijar el estado de pago (comando de admin).
    ///
    /// verifying y paid exigen una cotización viva aceptada: no hay pago
    /// sin cotización aprobada por el cliente.
    pub async fn set_payment_status(
        &self,
        request_id: Uuid,
        payment_status: PaymentStatus,
    ) -> AppResult<ServiceRequest> {
        let mut tx = self.pool.begin().await?;

        let _request = lock_active_request(&mut tx, request_id).await?;

        let quote = lock_live_quote(&mut tx, request_id).await?;
        if matches!(payment_status, PaymentStatus::Verifying | PaymentStatus::Paid) {
            match &quote {
                Some(q) if q.status == QuoteStatus::Accepted => {}
                _ => {
                    return Err(AppError::Conflict(
                        "El pago requiere una cotización aceptada".to_string(),
                    ))
                }
            }
        }

        let updated = sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET payment_status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(payment_status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        if payment_status == PaymentStatus::Paid {
            if let (Some(email), Some(quote)) =
                (self.customer_email(updated.customer_id).await, quote)
            {
                if let Some(invoice) = self.invoice_for(&updated, &quote).await {
                    self.notifier.notify_payment_confirmed(&email, &invoice);
                }
            }
        }

        Ok(updated)
    }

    /// Cancelar una solicitud (cliente dueño o admin con `owner = None`).
    ///
    /// La guarda corre sobre lecturas frescas y bloqueadas de la solicitud
    /// y su cotización viva. La cancelación es un estado terminal retenido:
    /// la fila queda para auditoría pero sale de las vistas activas.
    pub async fn cancel(&self, request_id: Uuid, owner: Option<Uuid>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;
        if let Some(owner_id) = owner {
            ensure_owner(&request, owner_id)?;
        }

        let quote = lock_live_quote(&mut tx, request_id).await?;

        if !can_cancel(request.status, quote.as_ref().map(|q| q.status)) {
            return Err(AppError::Conflict(
                "La solicitud ya no puede cancelarse".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE service_requests SET status = 'cancelled', updated_at = now() WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        Ok(())
    }

    /// El cliente acepta la cotización pendiente. El flujo de pago es aparte.
    pub async fn accept_quote(&self, request_id: Uuid, customer_id: Uuid) -> AppResult<Quote> {
        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;
        ensure_owner(&request, customer_id)?;

        let quote = lock_live_quote(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("La solicitud no tiene cotización".to_string()))?;

        if quote.status != QuoteStatus::Pending {
            return Err(AppError::Conflict(
                "La cotización ya no está pendiente".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Quote>(
            "UPDATE quotes SET status = 'accepted', updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(quote.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::quote(updated.id, request_id));

        Ok(updated)
    }

    /// El cliente rechaza la cotización con motivo. La cotización pasa a
    /// rejected y la solicitud vuelve a diagnosing, ambas en la misma
    /// transacción: o se ven los dos cambios o ninguno.
    pub async fn decline_quote(
        &self,
        request_id: Uuid,
        customer_id: Uuid,
        reason: &str,
    ) -> AppResult<Quote> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "Contanos el motivo del rechazo".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;
        ensure_owner(&request, customer_id)?;

        let quote = lock_live_quote(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("La solicitud no tiene cotización".to_string()))?;

        if quote.status != QuoteStatus::Pending {
            return Err(AppError::Conflict(
                "La cotización ya no está pendiente".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Quote>(
            "UPDATE quotes SET status = 'rejected', updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(quote.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE service_requests SET status = 'diagnosing', updated_at = now() WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::quote(updated.id, request_id));
        self.events.publish(ChangeEvent::request(request_id));

        let customer = self
            .customer_email(customer_id)
            .await
            .unwrap_or_else(|| customer_id.to_string());
        self.notifier.notify_support_quote_declined(&customer, reason);

        Ok(updated)
    }

    /// El cliente avisa que pagó: el estado de pago pasa a verifying y se
    /// notifica a soporte para verificar, más el comprobante al cliente.
    pub async fn mark_paid(
        &self,
        request_id: Uuid,
        customer_id: Uuid,
        payment_reference: Option<&str>,
    ) -> AppResult<ServiceRequest> {
        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;
        ensure_owner(&request, customer_id)?;

        let quote = lock_live_quote(&mut tx, request_id).await?;
        let quote = match quote {
            Some(q) if q.status == QuoteStatus::Accepted => q,
            _ => {
                return Err(AppError::Conflict(
                    "El pago requiere una cotización aceptada".to_string(),
                ))
            }
        };

        let updated = sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET payment_status = 'verifying', updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        if let Some(invoice) = self.invoice_for(&updated, &quote).await {
            let email = self.customer_email(customer_id).await;
            let identity = email.clone().unwrap_or_else(|| customer_id.to_string());
            self.notifier
                .notify_support_payment_submitted(&identity, &invoice, payment_reference);
            if let Some(email) = email {
                self.notifier.notify_payment_receipt(&email, &invoice);
            }
        }

        Ok(updated)
    }

    /// Agregar una nota de recogida: entrada fechada en la bitácora del
    /// problema, y la última nota queda además en pickup_notes.
    pub async fn add_pickup_note(
        &self,
        request_id: Uuid,
        customer_id: Uuid,
        note: &str,
    ) -> AppResult<ServiceRequest> {
        let note = note.trim();
        if note.is_empty() {
            return Err(AppError::Validation("La nota no puede estar vacía".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;
        ensure_owner(&request, customer_id)?;

        let log = append_dated_note(&request.issue_description, note, chrono::Utc::now());

        let updated = sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET issue_description = $2, pickup_notes = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(&log)
        .bind(note)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        Ok(updated)
    }

    /// Calificar un servicio completado y refrescar el promedio del driver
    pub async fn rate_request(
        &self,
        request_id: Uuid,
        customer_id: Uuid,
        rating: i32,
        review: Option<&str>,
    ) -> AppResult<ServiceRequest> {
        let mut tx = self.pool.begin().await?;

        let request = lock_active_request(&mut tx, request_id).await?;
        ensure_owner(&request, customer_id)?;

        if request.status != RequestStatus::Completed {
            return Err(AppError::Conflict(
                "Solo se califica un servicio completado".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET rating = $2, review = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(rust_decimal::Decimal::from(rating))
        .bind(review)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(driver_id) = updated.mechanic_driver_id {
            sqlx::query(
                r#"
                UPDATE drivers
                SET ratings = COALESCE(
                    (SELECT AVG(rating) FROM service_requests
                     WHERE mechanic_driver_id = $1 AND rating IS NOT NULL),
                    ratings
                )
                WHERE id = $1
                "#,
            )
            .bind(driver_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.events.publish(ChangeEvent::request(request_id));

        Ok(updated)
    }

    // --- Helpers de notificación (post-commit, best effort) ---

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

    async fn invoice_for(&self, request: &ServiceRequest, quote: &Quote) -> Option<Invoice> {
        match self
            .pricing
            .invoice_for(
                &quote.breakdown.0,
                quote.amount,
                request.is_towing,
                request.is_car_wash,
            )
            .await
        {
            Ok(invoice) => Some(invoice),
            Err(e) => {
                log::warn!(
                    "No se pudo armar la factura de la solicitud {}: {}",
                    request.id,
                    e
                );
                None
            }
        }
    }
}
