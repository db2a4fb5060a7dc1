//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    /// Lista fija de operadores con capacidad de admin, por email verificado
    pub admin_emails: Vec<String>,
    /// Buzón de soporte que recibe las notificaciones internas
    pub support_email: String,
    // Servicio externo de envío de correos
    pub notify_api_url: String,
    pub notify_api_key: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            port: env::var("PORT")
                .expect("PORT must be set")
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").expect("HOST must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            cors_origins: env::var("CORS_ORIGINS")
                .expect("CORS_ORIGINS must be set")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            admin_emails: env::var("ADMIN_EMAILS")
                .expect("ADMIN_EMAILS must be set")
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            support_email: env::var("SUPPORT_EMAIL").expect("SUPPORT_EMAIL must be set"),
            notify_api_url: env::var("NOTIFY_API_URL").expect("NOTIFY_API_URL must be set"),
            notify_api_key: env::var("NOTIFY_API_KEY").expect("NOTIFY_API_KEY must be set"),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Chequeo de capacidad: el principal pertenece a la allow-list de admins
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|a| a == &email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_admins(admins: Vec<&str>) -> EnvironmentConfig {
        EnvironmentConfig {
            environment: "test".to_string(),
            port: 3000,
            host: "localhost".to_string(),
            jwt_secret: "secret".to_string(),
            cors_origins: vec![],
            admin_emails: admins.into_iter().map(|s| s.to_lowercase()).collect(),
            support_email: "soporte@taller.test".to_string(),
            notify_api_url: "http://localhost:9999/send".to_string(),
            notify_api_key: "key".to_string(),
        }
    }

    #[test]
    fn test_is_admin_case_insensitive() {
        let config = config_with_admins(vec!["Admin@Taller.test"]);
        assert!(config.is_admin("admin@taller.test"));
        assert!(config.is_admin("ADMIN@TALLER.TEST"));
        assert!(!config.is_admin("cliente@taller.test"));
    }
}
