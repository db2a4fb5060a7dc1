//! DTOs de Driver

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::driver::Driver;

/// Request para crear un nuevo driver
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverDto {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(length(min = 6, max = 20))]
    pub phone_number: String,

    #[validate(length(max = 100))]
    pub location: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,

    pub is_verified: Option<bool>,
}

/// Response de driver para la API
#[derive(Debug, Serialize)]
pub struct DriverResponse {
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

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            full_name: driver.full_name,
            phone_number: driver.phone_number,
            location: driver.location,
            bio: driver.bio,
            avatar_url: driver.avatar_url,
            is_verified: driver.is_verified,
            jobs_completed: driver.jobs_completed,
            ratings: driver.ratings,
            created_at: driver.created_at,
        }
    }
}
