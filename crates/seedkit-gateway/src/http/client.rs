use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use seedkit_core::{AccountKind, OperationKind, SeededAccount, SeededOperation, SeededUser};

use super::options::GatewayOptions;
use super::payloads::{
    CreateUserRequest, CreateUserResponse, MakeOperationRequest, MakeOperationResponse,
    OpenAccountRequest, OpenAccountResponse, USERS_PATH, make_operation_path, open_account_path,
};
use crate::errors::{GatewayError, TransportError};
use crate::gateway::Gateway;

/// Gateway backed by the http-gateway service.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    options: GatewayOptions,
}

impl HttpGateway {
    pub fn new(options: GatewayOptions) -> Result<Self, GatewayError> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayError::BaseUrl(options.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            options,
        })
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, TransportError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint = path, "gateway request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| TransportError::Request {
                endpoint: path.to_string(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::Request {
                endpoint: path.to_string(),
                message: err.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode {
            endpoint: path.to_string(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn create_user(&self) -> Result<SeededUser, TransportError> {
        let request = CreateUserRequest::generated();
        let response: CreateUserResponse = self.post(USERS_PATH, &request).await?;
        Ok(SeededUser {
            id: response.user.id,
            email: response.user.email,
            created_at: response.user.created_at.unwrap_or_else(Utc::now),
        })
    }

    async fn open_account(
        &self,
        user_id: &str,
        kind: AccountKind,
    ) -> Result<SeededAccount, TransportError> {
        let request = OpenAccountRequest { user_id };
        let response: OpenAccountResponse = self.post(open_account_path(kind), &request).await?;
        Ok(SeededAccount {
            id: response.account.id,
            kind,
            owner_user_id: user_id.to_string(),
            card_ids: response
                .account
                .cards
                .into_iter()
                .map(|card| card.id)
                .collect(),
        })
    }

    async fn record_operation(
        &self,
        account_id: &str,
        card_id: Option<&str>,
        kind: OperationKind,
        amount: f64,
    ) -> Result<SeededOperation, TransportError> {
        let status = self.options.operation_status.as_str();
        let category = match kind {
            OperationKind::Purchase => Some(self.options.purchase_category.as_str()),
            _ => None,
        };
        let request = MakeOperationRequest {
            status,
            amount,
            card_id,
            account_id,
            category,
        };
        let response: MakeOperationResponse =
            self.post(make_operation_path(kind), &request).await?;
        let operation = response.operation;
        Ok(SeededOperation {
            id: operation.id,
            kind,
            account_id: account_id.to_string(),
            card_id: operation.card_id.or_else(|| card_id.map(str::to_string)),
            amount: operation.amount.unwrap_or(amount),
            status: operation.status.unwrap_or_else(|| status.to_string()),
        })
    }
}
