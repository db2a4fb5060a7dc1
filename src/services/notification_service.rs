//! Servicio de notificaciones por correo
//!
//! Cliente del servicio externo de envío: POST {to, subject, html} con la
//! API key. Los envíos son fire-and-forget: se despachan en una tarea
//! aparte después de confirmar la mutación, y una falla de entrega se
//! loguea pero nunca hace fallar la operación que la originó.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::EnvironmentConfig;
use crate::services::pricing_service::Invoice;

#[derive(Clone)]
pub struct NotificationService {
    client: Client,
    api_url: String,
    api_key: String,
    support_email: String,
}

impl NotificationService {
    pub fn new(config: &EnvironmentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: config.notify_api_url.clone(),
            api_key: config.notify_api_key.clone(),
            support_email: config.support_email.clone(),
        }
    }

    /// Despachar un correo sin bloquear al caller
    fn dispatch(&self, to: String, subject: String, html: String) {
        let client = self.client.clone();
        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            let result = client
                .post(&api_url)
                .bearer_auth(&api_key)
                .json(&json!({
                    "to": to,
                    "subject": subject,
                    "html": html,
                }))
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    log::info!("📧 Correo enviado a {}: {}", to, subject);
                }
                Ok(response) => {
                    log::warn!(
                        "📧 El servicio de correo respondió {} para '{}' a {}",
                        response.status(),
                        subject,
                        to
                    );
                }
                Err(e) => {
                    log::warn!("📧 No se pudo enviar '{}' a {}: {}", subject, to, e);
                }
            }
        });
    }

    // --- Avisos al buzón de soporte ---

    pub fn notify_support_new_request(&self, customer_email: &str, vehicle: &str) {
        self.dispatch(
            self.support_email.clone(),
            "Nueva solicitud de servicio".to_string(),
            format!(
                "<p>Entró una nueva solicitud de <strong>{}</strong> para el vehículo {}.</p>",
                customer_email, vehicle
            ),
        );
    }

    pub fn notify_support_quote_declined(&self, customer_email: &str, reason: &str) {
        self.dispatch(
            self.support_email.clone(),
            "Cotización rechazada".to_string(),
            format!(
                "<p>El cliente <strong>{}</strong> rechazó la cotización.</p>\
                 <p>Motivo: {}</p>",
                customer_email, reason
            ),
        );
    }

    pub fn notify_support_payment_submitted(
        &self,
        customer_email: &str,
        invoice: &Invoice,
        payment_reference: Option<&str>,
    ) {
        let reference = payment_reference
            .map(|r| format!("<p>Referencia de pago: {}</p>", r))
            .unwrap_or_default();

        self.dispatch(
            self.support_email.clone(),
            "Pago por verificar".to_string(),
            format!(
                "<p>El cliente <strong>{}</strong> reportó un pago por <strong>{}</strong>. \
                 Verificarlo y confirmar.</p>{}{}",
                customer_email,
                invoice.total,
                reference,
                render_invoice_table(invoice)
            ),
        );
    }

    // --- Avisos al cliente ---

    pub fn notify_driver_assigned(&self, customer_email: &str, driver_name: &str) {
        self.dispatch(
            customer_email.to_string(),
            "Driver asignado".to_string(),
            format!(
                "<p>Tu solicitud fue aceptada. <strong>{}</strong> pasará a recoger tu vehículo.</p>",
                driver_name
            ),
        );
    }

    pub fn notify_vehicle_at_workshop(&self, customer_email: &str) {
        self.dispatch(
            customer_email.to_string(),
            "Tu vehículo llegó al taller".to_string(),
            "<p>Tu vehículo ya está en el taller. Te avisamos cuando tengamos el diagnóstico.</p>"
                .to_string(),
        );
    }

    pub fn notify_vehicle_returning(&self, customer_email: &str) {
        self.dispatch(
            customer_email.to_string(),
            "Tu vehículo va en camino".to_string(),
            "<p>El servicio terminó y tu vehículo va en camino de vuelta.</p>".to_string(),
        );
    }

    pub fn notify_quote_ready(&self, customer_email: &str, invoice: &Invoice) {
        self.dispatch(
            customer_email.to_string(),
            "Tu cotización está lista".to_string(),
            format!(
                "<p>Ya tenemos el diagnóstico de tu vehículo. Total: <strong>{}</strong></p>{}\
                 <p>Entra a tu cuenta para aceptarla o rechazarla.</p>",
                invoice.total,
                render_invoice_table(invoice)
            ),
        );
    }

    pub fn notify_payment_receipt(&self, customer_email: &str, invoice: &Invoice) {
        self.dispatch(
            customer_email.to_string(),
            "Recibimos tu aviso de pago".to_string(),
            format!(
                "<p>Registramos tu pago por <strong>{}</strong> y está en verificación.</p>{}",
                invoice.total,
                render_invoice_table(invoice)
            ),
        );
    }

    pub fn notify_payment_confirmed(&self, customer_email: &str, invoice: &Invoice) {
        self.dispatch(
            customer_email.to_string(),
            "Pago confirmado — mantenimiento iniciado".to_string(),
            format!(
                "<p>Tu pago por <strong>{}</strong> quedó confirmado y el mantenimiento \
                 de tu vehículo ya comenzó.</p>{}",
                invoice.total,
                render_invoice_table(invoice)
            ),
        );
    }
}

/// Tabla mínima de líneas facturables para los correos
fn render_invoice_table(invoice: &Invoice) -> String {
    let rows: String = invoice
        .lines
        .iter()
        .map(|line| format!("<tr><td>{}</td><td>{}</td></tr>", line.label, line.amount))
        .collect();

    format!(
        "<table><tbody>{}<tr><td><strong>Total</strong></td><td><strong>{}</strong></td></tr></tbody></table>",
        rows, invoice.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pricing_service::InvoiceLine;
    use rust_decimal_macros::dec;

    #[test]
    fn test_render_invoice_table_contains_total() {
        let invoice = Invoice {
            lines: vec![
                InvoiceLine { label: "Labor".to_string(), amount: dec!(45000) },
                InvoiceLine { label: "Parts".to_string(), amount: dec!(80000) },
            ],
            total: dec!(125000),
        };
        let html = render_invoice_table(&invoice);
        assert!(html.contains("Labor"));
        assert!(html.contains("125000"));
    }
}
