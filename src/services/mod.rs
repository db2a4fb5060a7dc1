//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los
//! servicios encapsulan operaciones que involucran múltiples modelos o
//! integraciones externas: las transiciones del ciclo de vida, el motor
//! de cotizaciones, la resolución de precios y el envío de correos.

pub mod lifecycle_service;
pub mod notification_service;
pub mod pricing_service;
pub mod quote_service;
