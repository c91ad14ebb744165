//! Gateway facade used by the seeding engine.
//!
//! The engine only sees the [`Gateway`] trait. [`HttpGateway`] binds it to the
//! http-gateway REST API and [`InMemoryGateway`] fakes it for tests and dry
//! runs.

pub mod errors;
pub mod gateway;
pub mod http;
pub mod memory;

pub use errors::{GatewayError, TransportError};
pub use gateway::Gateway;
pub use http::{GatewayOptions, HttpGateway, OperationStatus};
pub use memory::{GatewayCall, GatewayMethod, InMemoryGateway};
