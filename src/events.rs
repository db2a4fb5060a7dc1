//! Eventos de cambio de filas
//!
//! Un único mecanismo de publicación/suscripción en proceso: cada mutación
//! confirmada publica un evento de cambio y la vista de seguimiento del
//! cliente (SSE) re-consulta al recibirlo. Entrega at-least-once,
//! coalescida a "volver a consultar todo"; no hay diffing incremental.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Entidad que cambió
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Request,
    Quote,
}

/// Cambio de fila ya confirmado en la base
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub entity: EntityKind,
    pub id: Uuid,
    /// Solicitud a la que pertenece el cambio, para filtrar por tracking
    pub request_id: Uuid,
}

impl ChangeEvent {
    pub fn request(id: Uuid) -> Self {
        Self {
            entity: EntityKind::Request,
            id,
            request_id: id,
        }
    }

    pub fn quote(id: Uuid, request_id: Uuid) -> Self {
        Self {
            entity: EntityKind::Quote,
            id,
            request_id,
        }
    }

    pub fn concerns(&self, request_id: Uuid) -> bool {
        self.request_id == request_id
    }
}

/// Canal broadcast compartido de la aplicación
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publicar un cambio. Sin suscriptores el envío falla y se ignora:
    /// los eventos son un aviso, no parte de la mutación.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let request_id = Uuid::new_v4();
        bus.publish(ChangeEvent::request(request_id));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity, EntityKind::Request);
        assert!(event.concerns(request_id));
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new(16);
        bus.publish(ChangeEvent::request(Uuid::new_v4()));
    }

    #[test]
    fn test_quote_event_filters_by_request() {
        let request_id = Uuid::new_v4();
        let event = ChangeEvent::quote(Uuid::new_v4(), request_id);
        assert!(event.concerns(request_id));
        assert!(!event.concerns(Uuid::new_v4()));
    }
}
