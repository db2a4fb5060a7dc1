//! Utilidades de validación
//!
//! Este módulo contiene la validación del formulario de solicitud y
//! funciones helper de conversión de tipos. El contrato del formulario es
//! un solo error a la vez: se devuelve el primer error encontrado, en el
//! orden en que los campos aparecen en el formulario.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::dto::request_dto::SubmitRequestDto;
use crate::utils::errors::{AppError, AppResult};

/// Campos del formulario ya parseados y validados
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: Option<String>,
    pub pickup_location: String,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub description: String,
    pub service_type: String,
    pub is_towing: bool,
    pub is_car_wash: bool,
}

/// Validar y convertir string a fecha (formato del input de fecha)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Validar y convertir string a hora (con o sin segundos)
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Validación de esquema del formulario, sin chequeos de frescura horaria.
///
/// La ruta de reenvío post-login usa esta variante: el payload ya fue
/// validado en el momento del envío original y no se re-valida su vigencia.
pub fn validate_submission_fields(dto: &SubmitRequestDto) -> AppResult<ValidatedSubmission> {
    let brand = dto.brand.trim();
    if brand.is_empty() {
        return Err(AppError::Validation("La marca del vehículo es requerida".to_string()));
    }

    let model = dto.model.trim();
    if model.is_empty() {
        return Err(AppError::Validation("El modelo del vehículo es requerido".to_string()));
    }

    let current_year = Utc::now().year();
    if dto.year < 1900 || dto.year > current_year + 1 {
        return Err(AppError::Validation(format!(
            "El año debe estar entre 1900 y {}",
            current_year + 1
        )));
    }

    let pickup_location = dto.pickup_location.trim();
    if pickup_location.chars().count() < 5 {
        return Err(AppError::Validation(
            "La dirección de recogida debe tener al menos 5 caracteres".to_string(),
        ));
    }

    let pickup_date = parse_date(dto.pickup_date.trim()).ok_or_else(|| {
        AppError::Validation("La fecha de recogida es requerida (formato YYYY-MM-DD)".to_string())
    })?;

    let pickup_time = parse_time(dto.pickup_time.trim()).ok_or_else(|| {
        AppError::Validation("La hora de recogida es requerida".to_string())
    })?;

    let description = dto.description.trim();
    if description.chars().count() < 10 {
        return Err(AppError::Validation(
            "Describe el problema con al menos 10 caracteres".to_string(),
        ));
    }

    let service_type = dto.service_type.trim();
    if service_type.chars().count() < 3 {
        return Err(AppError::Validation(
            "El tipo de servicio es requerido".to_string(),
        ));
    }

    Ok(ValidatedSubmission {
        brand: brand.to_string(),
        model: model.to_string(),
        year: dto.year,
        license_plate: dto
            .license_plate
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        pickup_location: pickup_location.to_string(),
        pickup_date,
        pickup_time,
        description: description.to_string(),
        service_type: service_type.to_string(),
        is_towing: dto.is_towing.unwrap_or(false),
        is_car_wash: dto.is_car_wash.unwrap_or(false),
    })
}

/// Validación completa del envío: esquema + vigencia de la cita.
///
/// La recogida debe quedar al menos 30 minutos en el futuro.
pub fn validate_submission(
    dto: &SubmitRequestDto,
    now: DateTime<Utc>,
) -> AppResult<ValidatedSubmission> {
    let validated = validate_submission_fields(dto)?;

    if validated.pickup_date < now.date_naive() {
        return Err(AppError::Validation(
            "La fecha de recogida no puede ser anterior a hoy".to_string(),
        ));
    }

    let pickup_at = validated.pickup_date.and_time(validated.pickup_time);
    if pickup_at < now.naive_utc() + Duration::minutes(30) {
        return Err(AppError::Validation(
            "La recogida debe programarse al menos 30 minutos en el futuro".to_string(),
        ));
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_dto() -> SubmitRequestDto {
        SubmitRequestDto {
            brand: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2020,
            license_plate: Some("ABC-123".to_string()),
            pickup_date: "2026-09-15".to_string(),
            pickup_time: "10:30".to_string(),
            description: "El motor hace un ruido extraño al acelerar".to_string(),
            pickup_location: "Av. Siempre Viva 742".to_string(),
            service_type: "Mecánica general".to_string(),
            is_towing: Some(false),
            is_car_wash: Some(false),
            phone: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_submission() {
        let validated = validate_submission(&base_dto(), now()).unwrap();
        assert_eq!(validated.brand, "Toyota");
        assert_eq!(validated.pickup_date, NaiveDate::from_ymd_opt(2026, 9, 15).unwrap());
        assert!(!validated.is_towing);
    }

    #[test]
    fn test_brand_required_first_error() {
        let mut dto = base_dto();
        dto.brand = "  ".to_string();
        dto.model = String::new();
        let err = validate_submission(&dto, now()).unwrap_err();
        // Un solo error a la vez: gana el primero del formulario
        match err {
            AppError::Validation(msg) => assert!(msg.contains("marca")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_year_bounds() {
        let mut dto = base_dto();
        dto.year = 1899;
        assert!(validate_submission(&dto, now()).is_err());

        dto.year = 1900;
        assert!(validate_submission(&dto, now()).is_ok());

        dto.year = 2028;
        assert!(validate_submission(&dto, now()).is_err());
    }

    #[test]
    fn test_description_boundary() {
        let mut dto = base_dto();
        dto.description = "123456789".to_string(); // 9 caracteres
        assert!(validate_submission(&dto, now()).is_err());

        dto.description = "1234567890".to_string(); // 10 caracteres
        assert!(validate_submission(&dto, now()).is_ok());
    }

    #[test]
    fn test_pickup_location_min_length() {
        let mut dto = base_dto();
        dto.pickup_location = "Av 1".to_string();
        assert!(validate_submission(&dto, now()).is_err());
    }

    #[test]
    fn test_pickup_date_in_past_rejected() {
        let mut dto = base_dto();
        dto.pickup_date = "2026-08-05".to_string();
        let err = validate_submission(&dto, now()).unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("anterior")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_pickup_must_be_30_minutes_ahead() {
        let mut dto = base_dto();
        dto.pickup_date = "2026-08-06".to_string();
        dto.pickup_time = "12:15".to_string();
        assert!(validate_submission(&dto, now()).is_err());

        dto.pickup_time = "12:30".to_string();
        assert!(validate_submission(&dto, now()).is_ok());
    }

    #[test]
    fn test_fields_variant_skips_freshness() {
        let mut dto = base_dto();
        dto.pickup_date = "2020-01-01".to_string();
        // El reenvío post-login no re-valida la vigencia
        assert!(validate_submission_fields(&dto).is_ok());
        assert!(validate_submission(&dto, now()).is_err());
    }

    #[test]
    fn test_service_type_min_length() {
        let mut dto = base_dto();
        dto.service_type = "ab".to_string();
        assert!(validate_submission(&dto, now()).is_err());
    }

    #[test]
    fn test_parse_time_formats() {
        assert!(parse_time("09:15").is_some());
        assert!(parse_time("09:15:30").is_some());
        assert!(parse_time("9h15").is_none());
    }
}
