//! Binding of the gateway facade to the http-gateway REST API.

mod client;
mod options;
mod payloads;

pub use client::HttpGateway;
pub use options::{GatewayOptions, OperationStatus};
