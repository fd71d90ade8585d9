//! HTTP API of the wabridge webhook bridge.
//!
//! Exposes `POST /send_message` for outbound messages, `POST /webhook` for
//! gateway notifications, and health checks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use wabridge_core::{storage::BridgeStorage, Clock};
use wabridge_gateway::GatewayClient;

pub mod config;
pub mod error;
pub mod handlers;
pub mod inbound;
pub mod relay;
pub mod replies;
pub mod server;

pub use config::Config;
pub use error::{ApiError, Result};
pub use relay::RelayService;
pub use server::{create_router, start_server};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Message relay used by the send and webhook handlers.
    pub relay: RelayService,
    /// Storage, for health checks.
    pub storage: Arc<dyn BridgeStorage>,
    /// Clock used for timestamps and health check timing.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires storage, gateway client, and clock into application state.
    pub fn new(
        storage: Arc<dyn BridgeStorage>,
        gateway: GatewayClient,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let relay = RelayService::new(storage.clone(), Arc::new(gateway), clock.clone());
        Self { relay, storage, clock }
    }
}
