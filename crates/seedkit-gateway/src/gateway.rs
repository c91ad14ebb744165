use std::sync::Arc;

use async_trait::async_trait;

use seedkit_core::{AccountKind, OperationKind, SeededAccount, SeededOperation, SeededUser};

use crate::errors::TransportError;

/// Operations the seeding engine needs from the banking backend.
///
/// Every call may be slow and may fail. Implementations own any retry or
/// timeout policy; the engine calls each method at most once per item.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Short identifier of the binding (e.g. `http`).
    fn name(&self) -> &'static str;

    /// Create a user with a generated profile.
    async fn create_user(&self) -> Result<SeededUser, TransportError>;

    /// Open an account for an existing user. Cards issued by the backend in
    /// the same response are returned in `card_ids`.
    async fn open_account(
        &self,
        user_id: &str,
        kind: AccountKind,
    ) -> Result<SeededAccount, TransportError>;

    /// Record an operation against an existing account.
    async fn record_operation(
        &self,
        account_id: &str,
        card_id: Option<&str>,
        kind: OperationKind,
        amount: f64,
    ) -> Result<SeededOperation, TransportError>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn create_user(&self) -> Result<SeededUser, TransportError> {
        (**self).create_user().await
    }

    async fn open_account(
        &self,
        user_id: &str,
        kind: AccountKind,
    ) -> Result<SeededAccount, TransportError> {
        (**self).open_account(user_id, kind).await
    }

    async fn record_operation(
        &self,
        account_id: &str,
        card_id: Option<&str>,
        kind: OperationKind,
        amount: f64,
    ) -> Result<SeededOperation, TransportError> {
        (**self)
            .record_operation(account_id, card_id, kind, amount)
            .await
    }
}
