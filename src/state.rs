//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::events::EventBus;
use crate::services::notification_service::NotificationService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub notifier: NotificationService,
    pub events: EventBus,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        let notifier = NotificationService::new(&config);
        Self {
            pool,
            config,
            notifier,
            events: EventBus::new(128),
        }
    }
}
