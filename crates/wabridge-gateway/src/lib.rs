//! Client for the Green API messaging gateway.
//!
//! Only the `sendMessage` method is used. Each instance is addressed as
//! `{api_url}/waInstance{instance_id}/{method}/{api_token}`; the token in the
//! path is the sole authentication.
//!
//! # Example
//!
//! ```no_run
//! use wabridge_gateway::{GatewayClient, GatewayConfig, GatewayError};
//!
//! # async fn example() -> Result<(), GatewayError> {
//! let config = GatewayConfig::new("1101000001", "d75b3a66374942c5b3c019c698abc2067e151558acbd412345");
//! let client = GatewayClient::new(config)?;
//!
//! let response = client.send_message("79001234567@c.us", "Hello").await?;
//! println!("sent: {}", response.body);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;

pub use client::{GatewayClient, GatewayConfig, GatewayResponse, SendMessageRequest};
pub use error::{GatewayError, Result};

/// Public Green API host.
pub const DEFAULT_API_URL: &str = "https://api.green-api.com";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
