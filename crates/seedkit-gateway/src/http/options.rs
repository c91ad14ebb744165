use serde::{Deserialize, Serialize};

/// Status sent with every recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Completed,
    InProgress,
    Failed,
    Unspecified,
}

impl OperationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationStatus::Completed => "COMPLETED",
            OperationStatus::InProgress => "IN_PROGRESS",
            OperationStatus::Failed => "FAILED",
            OperationStatus::Unspecified => "UNSPECIFIED",
        }
    }
}

/// Options that control how the HTTP binding talks to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayOptions {
    /// Base URL of the http-gateway service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Status attached to recorded operations.
    pub operation_status: OperationStatus,
    /// Category sent with purchase operations.
    pub purchase_category: String,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8003".to_string(),
            timeout_secs: 100,
            operation_status: OperationStatus::Completed,
            purchase_category: "taxi".to_string(),
        }
    }
}
