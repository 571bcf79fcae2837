// src/services/notification.rs

use uuid::Uuid;

// Colaborador externo de notificação: disparo "fire-and-forget" depois de
// um commit bem-sucedido. A entrega em si (e-mail, push) fica fora do
// núcleo; aqui apenas registramos a intenção.
#[derive(Clone, Default)]
pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        Self
    }

    pub fn notify(&self, event: &str, target_ids: &[Uuid]) {
        if target_ids.is_empty() {
            tracing::info!("🔔 Evento '{}' sem destinatários diretos.", event);
            return;
        }
        tracing::info!(
            "🔔 Evento '{}' despachado para {} destinatário(s).",
            event,
            target_ids.len()
        );
    }
}
