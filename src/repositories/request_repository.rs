//! Repositorio de ServiceRequest
//!
//! Lecturas y escrituras simples sobre service_requests. Las transiciones
//! compuestas del ciclo de vida (que tocan más de una fila) viven en los
//! services y corren dentro de una transacción.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::request::ServiceRequest;
use crate::utils::errors::AppError;
use crate::utils::validation::ValidatedSubmission;

pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        customer_id: Uuid,
        submission: &ValidatedSubmission,
    ) -> Result<ServiceRequest, AppError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let request = sqlx::query_as::<_, ServiceRequest>(
            r#"
            INSERT INTO service_requests (
                id, customer_id, brand, model, year, license_plate,
                pickup_location, pickup_date, pickup_time, issue_description,
                service_type, is_towing, is_car_wash, status, payment_status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 'pending', 'pending', $14, $14)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(customer_id)
        .bind(&submission.brand)
        .bind(&submission.model)
        .bind(submission.year)
        .bind(&submission.license_plate)
        .bind(&submission.pickup_location)
        .bind(submission.pickup_date)
        .bind(submission.pickup_time)
        .bind(&submission.description)
        .bind(&submission.service_type)
        .bind(submission.is_towing)
        .bind(submission.is_car_wash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Búsqueda por id excluyendo canceladas: es el camino normal de lectura.
    /// Una solicitud cancelada deja de ser alcanzable por aquí.
    pub async fn find_active_by_id(&self, id: Uuid) -> Result<Option<ServiceRequest>, AppError> {
        let request = sqlx::query_as::<_, ServiceRequest>(
            "SELECT * FROM service_requests WHERE id = $1 AND status <> 'cancelled'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_active_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<ServiceRequest>, AppError> {
        let requests = sqlx::query_as::<_, ServiceRequest>(
            r#"
            SELECT * FROM service_requests
            WHERE customer_id = $1 AND status <> 'cancelled'
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Listado de admin: todas las solicitudes activas, las más nuevas primero
    pub async fn list_active(&self) -> Result<Vec<ServiceRequest>, AppError> {
        let requests = sqlx::query_as::<_, ServiceRequest>(
            "SELECT * FROM service_requests WHERE status <> 'cancelled' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Corrección de admin sobre datos del vehículo y la cita
    #[allow(clippy::too_many_arguments)]
    pub async fn update_details(
        &self,
        current: &ServiceRequest,
        brand: Option<String>,
        model: Option<String>,
        year: Option<i32>,
        license_plate: Option<String>,
        pickup_location: Option<String>,
        pickup_date: Option<chrono::NaiveDate>,
        pickup_time: Option<chrono::NaiveTime>,
        service_type: Option<String>,
        is_towing: Option<bool>,
        is_car_wash: Option<bool>,
    ) -> Result<ServiceRequest, AppError> {
        let request = sqlx::query_as::<_, ServiceRequest>(
            r#"
            UPDATE service_requests
            SET brand = $2, model = $3, year = $4, license_plate = $5,
                pickup_location = $6, pickup_date = $7, pickup_time = $8,
                service_type = $9, is_towing = $10, is_car_wash = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(brand.unwrap_or_else(|| current.brand.clone()))
        .bind(model.unwrap_or_else(|| current.model.clone()))
        .bind(year.unwrap_or(current.year))
        .bind(license_plate.or_else(|| current.license_plate.clone()))
        .bind(pickup_location.unwrap_or_else(|| current.pickup_location.clone()))
        .bind(pickup_date.unwrap_or(current.pickup_date))
        .bind(pickup_time.unwrap_or(current.pickup_time))
        .bind(service_type.unwrap_or_else(|| current.service_type.clone()))
        .bind(is_towing.unwrap_or(current.is_towing))
        .bind(is_car_wash.unwrap_or(current.is_car_wash))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

}
