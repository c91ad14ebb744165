use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use seedkit_core::{AccountKind, OperationKind, SeededAccount, SeededOperation, SeededUser};

use crate::errors::TransportError;
use crate::gateway::Gateway;

/// Gateway method, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayMethod {
    CreateUser,
    OpenAccount,
    RecordOperation,
}

impl GatewayMethod {
    fn endpoint(self) -> &'static str {
        match self {
            GatewayMethod::CreateUser => "memory://users",
            GatewayMethod::OpenAccount => "memory://accounts",
            GatewayMethod::RecordOperation => "memory://operations",
        }
    }
}

/// A call received by [`InMemoryGateway`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    CreateUser,
    OpenAccount {
        user_id: String,
        kind: AccountKind,
    },
    RecordOperation {
        account_id: String,
        card_id: Option<String>,
        kind: OperationKind,
        amount: f64,
    },
}

impl GatewayCall {
    pub fn method(&self) -> GatewayMethod {
        match self {
            GatewayCall::CreateUser => GatewayMethod::CreateUser,
            GatewayCall::OpenAccount { .. } => GatewayMethod::OpenAccount,
            GatewayCall::RecordOperation { .. } => GatewayMethod::RecordOperation,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FailureRule {
    /// Fail the n-th call (1-based) of a method.
    Nth(GatewayMethod, usize),
    All(GatewayMethod),
}

#[derive(Debug, Default)]
struct MemoryState {
    calls: Vec<GatewayCall>,
    counts: HashMap<GatewayMethod, usize>,
}

/// In-process gateway that fabricates identifiers.
///
/// Credit and debit card accounts come with one card unless configured
/// otherwise. Failures can be injected per method.
#[derive(Debug)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
    failures: Vec<FailureRule>,
    cards: HashMap<AccountKind, usize>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        let cards = AccountKind::ALL
            .into_iter()
            .map(|kind| (kind, usize::from(kind.issues_cards())))
            .collect();
        Self {
            state: Mutex::new(MemoryState::default()),
            failures: Vec::new(),
            cards,
            latency: None,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every call, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of cards issued when opening an account of `kind`.
    pub fn with_cards(mut self, kind: AccountKind, count: usize) -> Self {
        self.cards.insert(kind, count);
        self
    }

    /// Fail the n-th call (1-based) of `method`.
    pub fn fail_nth(mut self, method: GatewayMethod, n: usize) -> Self {
        self.failures.push(FailureRule::Nth(method, n));
        self
    }

    pub fn fail_all(mut self, method: GatewayMethod) -> Self {
        self.failures.push(FailureRule::All(method));
        self
    }

    /// Calls received so far, in arrival order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock_state().calls.clone()
    }

    pub fn call_count(&self, method: GatewayMethod) -> usize {
        self.lock_state().counts.get(&method).copied().unwrap_or(0)
    }

    /// Highest number of calls observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a call and decide whether it fails.
    fn admit(&self, call: GatewayCall) -> Result<(), TransportError> {
        let method = call.method();
        let mut state = self.lock_state();
        state.calls.push(call);
        let count = state.counts.entry(method).or_insert(0);
        *count += 1;
        let nth = *count;
        drop(state);

        let fails = self.failures.iter().any(|rule| match *rule {
            FailureRule::Nth(target, n) => target == method && n == nth,
            FailureRule::All(target) => target == method,
        });

        if fails {
            Err(TransportError::Status {
                endpoint: method.endpoint().to_string(),
                status: 500,
                body: format!("injected failure on call {nth}"),
            })
        } else {
            Ok(())
        }
    }

    async fn enter(&self) -> InFlight<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        InFlight {
            counter: &self.in_flight,
        }
    }
}

struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

#[async_trait]
impl Gateway for InMemoryGateway {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self) -> Result<SeededUser, TransportError> {
        let _guard = self.enter().await;
        self.admit(GatewayCall::CreateUser)?;
        let id = new_id("user");
        Ok(SeededUser {
            email: format!("{id}@example.com"),
            id,
            created_at: Utc::now(),
        })
    }

    async fn open_account(
        &self,
        user_id: &str,
        kind: AccountKind,
    ) -> Result<SeededAccount, TransportError> {
        let _guard = self.enter().await;
        self.admit(GatewayCall::OpenAccount {
            user_id: user_id.to_string(),
            kind,
        })?;
        let cards = self.cards.get(&kind).copied().unwrap_or(0);
        Ok(SeededAccount {
            id: new_id("account"),
            kind,
            owner_user_id: user_id.to_string(),
            card_ids: (0..cards).map(|_| new_id("card")).collect(),
        })
    }

    async fn record_operation(
        &self,
        account_id: &str,
        card_id: Option<&str>,
        kind: OperationKind,
        amount: f64,
    ) -> Result<SeededOperation, TransportError> {
        let _guard = self.enter().await;
        self.admit(GatewayCall::RecordOperation {
            account_id: account_id.to_string(),
            card_id: card_id.map(str::to_string),
            kind,
            amount,
        })?;
        Ok(SeededOperation {
            id: new_id("operation"),
            kind,
            account_id: account_id.to_string(),
            card_id: card_id.map(str::to_string),
            amount,
            status: "COMPLETED".to_string(),
        })
    }
}
