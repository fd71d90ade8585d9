//! Store invariants that must hold after any sequence of requests.

use std::collections::HashSet;

use anyhow::{ensure, Result};
use wabridge_core::{Client, Notification, MAX_CHAT_ID_LEN, MAX_CLIENT_NAME_LEN};

/// Checks over a snapshot of clients and notifications.
pub struct Invariants;

impl Invariants {
    /// Chat ids identify clients uniquely.
    pub fn unique_chat_ids(clients: &[Client]) -> Result<()> {
        let mut seen = HashSet::new();
        for client in clients {
            ensure!(
                seen.insert(client.chat_id.as_str()),
                "Chat id {} belongs to more than one client",
                client.chat_id
            );
        }
        Ok(())
    }

    /// Every notification belongs to an existing client.
    pub fn notifications_reference_clients(
        clients: &[Client],
        notifications: &[Notification],
    ) -> Result<()> {
        let ids: HashSet<_> = clients.iter().map(|c| c.id).collect();
        for notification in notifications {
            ensure!(
                ids.contains(&notification.client_id),
                "Notification {} references missing client {}",
                notification.id,
                notification.client_id
            );
        }
        Ok(())
    }

    /// Stored values fit their column widths.
    pub fn column_widths(clients: &[Client]) -> Result<()> {
        for client in clients {
            ensure!(
                client.chat_id.chars().count() <= MAX_CHAT_ID_LEN,
                "Chat id {} exceeds {} characters",
                client.chat_id,
                MAX_CHAT_ID_LEN
            );
            if let Some(name) = &client.name {
                ensure!(
                    name.chars().count() <= MAX_CLIENT_NAME_LEN,
                    "Client {} name exceeds {} characters",
                    client.id,
                    MAX_CLIENT_NAME_LEN
                );
            }
        }
        Ok(())
    }

    /// Runs every check.
    pub fn check_all(clients: &[Client], notifications: &[Notification]) -> Result<()> {
        Self::unique_chat_ids(clients)?;
        Self::notifications_reference_clients(clients, notifications)?;
        Self::column_widths(clients)
    }
}
