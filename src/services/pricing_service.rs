//! Servicio de precios
//!
//! Resuelve claves de la lista de precios y arma el total facturable de
//! una cotización: monto del desglose más los extras fijos activos
//! (logística de recogida/entrega, grúa, lavado), en ese orden.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::quote::QuoteLine;
use crate::models::service_price::{
    ServicePrice, KEY_CAR_WASH_PREMIUM, KEY_PICKUP_RETURN, KEY_TOWING_INTRACITY,
};
use crate::repositories::price_repository::PriceRepository;
use crate::utils::errors::AppResult;

/// Línea facturable ya resuelta
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub label: String,
    pub amount: Decimal,
}

/// Desglose facturable completo de una cotización
#[derive(Debug, Clone)]
pub struct Invoice {
    pub lines: Vec<InvoiceLine>,
    pub total: Decimal,
}

pub struct PricingService {
    repository: PriceRepository,
}

impl PricingService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PriceRepository::new(pool),
        }
    }

    pub async fn price_for(&self, key: &str) -> AppResult<Option<ServicePrice>> {
        self.repository.find_by_key(key).await
    }

    /// Extras activos de una solicitud, en el orden fijo de facturación:
    /// recogida/entrega primero, luego grúa, luego lavado. Una clave sin
    /// precio cargado simplemente no suma.
    pub async fn addon_lines(
        &self,
        is_towing: bool,
        is_car_wash: bool,
    ) -> AppResult<Vec<InvoiceLine>> {
        let mut lines = Vec::new();

        if let Some(entry) = self.price_for(KEY_PICKUP_RETURN).await? {
            lines.push(InvoiceLine {
                label: entry.label,
                amount: entry.price,
            });
        }

        if is_towing {
            if let Some(entry) = self.price_for(KEY_TOWING_INTRACITY).await? {
                lines.push(InvoiceLine {
                    label: entry.label,
                    amount: entry.price,
                });
            }
        }

        if is_car_wash {
            if let Some(entry) = self.price_for(KEY_CAR_WASH_PREMIUM).await? {
                lines.push(InvoiceLine {
                    label: entry.label,
                    amount: entry.price,
                });
            }
        }

        Ok(lines)
    }

    /// Total facturable de una cotización para una solicitud
    pub async fn invoice_for(
        &self,
        breakdown: &[QuoteLine],
        quote_amount: Decimal,
        is_towing: bool,
        is_car_wash: bool,
    ) -> AppResult<Invoice> {
        let addons = self.addon_lines(is_towing, is_car_wash).await?;
        Ok(compose_invoice(breakdown, quote_amount, addons))
    }
}

/// Armar la factura: líneas del desglose primero, extras después.
///
/// El total parte del monto de la cotización (no de re-sumar el desglose)
/// para respetar correcciones manuales de admin sobre el monto.
pub fn compose_invoice(
    breakdown: &[QuoteLine],
    quote_amount: Decimal,
    addons: Vec<InvoiceLine>,
) -> Invoice {
    let mut lines: Vec<InvoiceLine> = breakdown
        .iter()
        .map(|line| InvoiceLine {
            label: line.label.clone(),
            amount: line.cost,
        })
        .collect();

    let mut total = quote_amount;
    for addon in addons {
        total += addon.amount;
        lines.push(addon);
    }

    Invoice { lines, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn breakdown() -> Vec<QuoteLine> {
        vec![
            QuoteLine { label: "Labor".to_string(), cost: dec!(45000) },
            QuoteLine { label: "Parts".to_string(), cost: dec!(80000) },
        ]
    }

    #[test]
    fn test_invoice_without_addons() {
        let invoice = compose_invoice(&breakdown(), dec!(125000), vec![]);
        assert_eq!(invoice.total, dec!(125000));
        assert_eq!(invoice.lines.len(), 2);
    }

    #[test]
    fn test_invoice_with_towing() {
        // Cliente con grúa: monto 100000 + grúa 50000 = 150000
        let lines = vec![QuoteLine { label: "Reparación".to_string(), cost: dec!(100000) }];
        let addons = vec![InvoiceLine {
            label: "Grúa intraurbana".to_string(),
            amount: dec!(50000),
        }];
        let invoice = compose_invoice(&lines, dec!(100000), addons);
        assert_eq!(invoice.total, dec!(150000));
        assert_eq!(invoice.lines.last().unwrap().label, "Grúa intraurbana");
    }

    #[test]
    fn test_invoice_line_order_is_breakdown_then_addons() {
        let addons = vec![
            InvoiceLine { label: "Recogida y entrega".to_string(), amount: dec!(20000) },
            InvoiceLine { label: "Grúa intraurbana".to_string(), amount: dec!(50000) },
            InvoiceLine { label: "Lavado premium".to_string(), amount: dec!(15000) },
        ];
        let invoice = compose_invoice(&breakdown(), dec!(125000), addons);
        let labels: Vec<&str> = invoice.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Labor",
                "Parts",
                "Recogida y entrega",
                "Grúa intraurbana",
                "Lavado premium"
            ]
        );
        assert_eq!(invoice.total, dec!(210000));
    }
}
