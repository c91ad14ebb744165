use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use seedkit_core::{AccountKind, OperationKind, SeededAccount, SeededOperation, SeededUser};
use seedkit_engine::{
    CancelToken, EngineError, EngineOptions, ItemKind, SeedCause, SeedError, SeedStage,
    SeedingEngine,
};
use seedkit_gateway::{Gateway, GatewayCall, GatewayMethod, InMemoryGateway, TransportError};
use seedkit_plan::{AccountPlan, Plan, UsersPlan};

fn two_users_one_credit_account() -> Plan {
    Plan::new(
        UsersPlan::new(2).with_account(
            AccountPlan::new(AccountKind::CreditCard, 1)
                .with_operations(OperationKind::Purchase, 2)
                .with_operations(OperationKind::TopUp, 1),
        ),
    )
}

fn engine(
    gateway: &Arc<InMemoryGateway>,
    options: EngineOptions,
) -> SeedingEngine<Arc<InMemoryGateway>> {
    SeedingEngine::new(Arc::clone(gateway), options)
}

#[tokio::test]
async fn clean_run_creates_every_planned_item() {
    let gateway = Arc::new(InMemoryGateway::new());
    let outcome = engine(&gateway, EngineOptions::default())
        .run(&two_users_one_credit_account(), &CancelToken::new())
        .await
        .expect("run");

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.tree.user_count(), 2);
    assert_eq!(outcome.tree.account_count(), 2);
    assert_eq!(outcome.tree.operation_count(), 6);
    assert_eq!(outcome.summary.operations.planned, 6);
    assert_eq!(outcome.summary.operations.created, 6);

    for node in &outcome.tree.users {
        let account = &node.accounts[0];
        assert_eq!(account.account.owner_user_id, node.user.id);
        assert!(
            account
                .operations
                .iter()
                .all(|operation| operation.account_id == account.account.id)
        );
        let kinds: Vec<_> = account.operations.iter().map(|op| op.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Purchase,
                OperationKind::Purchase,
                OperationKind::TopUp
            ]
        );
    }
}

#[tokio::test]
async fn failed_account_skips_only_its_operations() {
    let gateway = Arc::new(InMemoryGateway::new().fail_nth(GatewayMethod::OpenAccount, 2));
    let outcome = engine(&gateway, EngineOptions::default())
        .run(&two_users_one_credit_account(), &CancelToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.tree.user_count(), 2);
    assert_eq!(outcome.tree.account_count(), 1);
    assert_eq!(outcome.tree.operation_count(), 3);
    assert_eq!(outcome.errors.len(), 1);

    let second_user = &outcome.tree.users[1].user.id;
    let error = &outcome.errors[0];
    assert_eq!(error.stage, SeedStage::Account);
    assert_eq!(error.parent_id.as_ref(), Some(second_user));
    assert_eq!(error.kind, Some(ItemKind::Account(AccountKind::CreditCard)));
    assert!(matches!(
        error.cause,
        SeedCause::Transport(TransportError::Status { status: 500, .. })
    ));
    assert_eq!(gateway.call_count(GatewayMethod::RecordOperation), 3);
}

#[tokio::test]
async fn failed_user_skips_its_subtree() {
    let gateway = Arc::new(InMemoryGateway::new().fail_nth(GatewayMethod::CreateUser, 1));
    let outcome = engine(&gateway, EngineOptions::default())
        .run(&two_users_one_credit_account(), &CancelToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.tree.user_count(), 1);
    assert_eq!(outcome.tree.account_count(), 1);
    assert_eq!(outcome.tree.operation_count(), 3);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].stage, SeedStage::User);
    assert_eq!(gateway.call_count(GatewayMethod::OpenAccount), 1);
    assert_eq!(outcome.summary.users.failed, 1);
}

#[tokio::test]
async fn failed_operations_are_reported_against_their_account() {
    let gateway = Arc::new(InMemoryGateway::new().fail_all(GatewayMethod::RecordOperation));
    let outcome = engine(&gateway, EngineOptions::default())
        .run(&two_users_one_credit_account(), &CancelToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.tree.account_count(), 2);
    assert_eq!(outcome.tree.operation_count(), 0);
    assert_eq!(outcome.errors.len(), 6);
    let account_ids: HashSet<_> = outcome
        .tree
        .users
        .iter()
        .map(|node| node.accounts[0].account.id.clone())
        .collect();
    assert!(outcome.errors.iter().all(|error| {
        error.stage == SeedStage::Operation
            && error
                .parent_id
                .as_ref()
                .is_some_and(|id| account_ids.contains(id))
    }));
}

#[tokio::test]
async fn duplicate_account_kinds_are_rejected_before_any_call() {
    let gateway = Arc::new(InMemoryGateway::new());
    let plan = Plan::new(
        UsersPlan::new(1)
            .with_account(AccountPlan::new(AccountKind::Deposit, 1))
            .with_account(AccountPlan::new(AccountKind::Deposit, 2)),
    );

    let result = engine(&gateway, EngineOptions::default())
        .run(&plan, &CancelToken::new())
        .await;
    match result {
        Err(EngineError::InvalidPlan(report)) => {
            assert_eq!(report.errors[0].code, "duplicate_account_kind");
        }
        other => panic!("expected invalid plan, got {other:?}"),
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn zero_concurrency_is_rejected() {
    let gateway = Arc::new(InMemoryGateway::new());
    let options = EngineOptions {
        concurrency: 0,
        ..EngineOptions::default()
    };
    let result = engine(&gateway, options)
        .run(&two_users_one_credit_account(), &CancelToken::new())
        .await;
    assert!(matches!(result, Err(EngineError::InvalidOptions(_))));
    assert!(gateway.calls().is_empty());
}

/// Cancels the shared token once `after` calls of `method` have completed.
struct CancelAfter {
    inner: InMemoryGateway,
    token: CancelToken,
    method: GatewayMethod,
    after: usize,
    seen: AtomicUsize,
}

impl CancelAfter {
    fn new(token: CancelToken, method: GatewayMethod, after: usize) -> Self {
        Self {
            inner: InMemoryGateway::new(),
            token,
            method,
            after,
            seen: AtomicUsize::new(0),
        }
    }

    fn observe(&self, method: GatewayMethod) {
        if method == self.method && self.seen.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
            self.token.cancel();
        }
    }
}

#[async_trait]
impl Gateway for CancelAfter {
    fn name(&self) -> &'static str {
        "cancel-after"
    }

    async fn create_user(&self) -> Result<SeededUser, TransportError> {
        let user = self.inner.create_user().await;
        self.observe(GatewayMethod::CreateUser);
        user
    }

    async fn open_account(
        &self,
        user_id: &str,
        kind: AccountKind,
    ) -> Result<SeededAccount, TransportError> {
        let account = self.inner.open_account(user_id, kind).await;
        self.observe(GatewayMethod::OpenAccount);
        account
    }

    async fn record_operation(
        &self,
        account_id: &str,
        card_id: Option<&str>,
        kind: OperationKind,
        amount: f64,
    ) -> Result<SeededOperation, TransportError> {
        let operation = self
            .inner
            .record_operation(account_id, card_id, kind, amount)
            .await;
        self.observe(GatewayMethod::RecordOperation);
        operation
    }
}

#[tokio::test]
async fn cancel_during_operations_accounts_for_every_planned_item() {
    let token = CancelToken::new();
    let gateway = CancelAfter::new(token.clone(), GatewayMethod::RecordOperation, 2);
    let plan = two_users_one_credit_account();
    let planned = plan.totals().expect("totals").items();

    let outcome = SeedingEngine::new(gateway, EngineOptions::default())
        .run(&plan, &token)
        .await
        .expect("run");

    assert_eq!(outcome.tree.operation_count(), 2);
    assert_eq!(outcome.errors.len(), 4);
    assert!(outcome.errors.iter().all(SeedError::is_cancelled));
    assert_eq!(
        outcome.errors.len() as u64 + outcome.tree.item_count() as u64,
        planned
    );
}

#[tokio::test]
async fn cancel_during_users_marks_descendants() {
    let token = CancelToken::new();
    let gateway = CancelAfter::new(token.clone(), GatewayMethod::CreateUser, 1);
    let plan = two_users_one_credit_account();
    let planned = plan.totals().expect("totals").items();

    let outcome = SeedingEngine::new(gateway, EngineOptions::default())
        .run(&plan, &token)
        .await
        .expect("run");

    assert_eq!(outcome.tree.item_count(), 1);
    assert_eq!(outcome.errors.len() as u64 + 1, planned);
    assert_eq!(outcome.summary.users.cancelled, 1);
    assert_eq!(outcome.summary.accounts.cancelled, 2);
    assert_eq!(outcome.summary.operations.cancelled, 6);

    let user_id = &outcome.tree.users[0].user.id;
    assert!(outcome.errors.iter().any(|error| {
        error.stage == SeedStage::Account && error.parent_id.as_ref() == Some(user_id)
    }));
}

#[tokio::test(start_paused = true)]
async fn concurrency_limit_bounds_in_flight_calls() {
    let gateway = Arc::new(InMemoryGateway::new().with_latency(Duration::from_millis(20)));
    let plan = Plan::new(
        UsersPlan::new(10)
            .with_account(AccountPlan::new(AccountKind::CreditCard, 1))
            .with_account(AccountPlan::new(AccountKind::Deposit, 1)),
    );
    let options = EngineOptions {
        concurrency: 4,
        ..EngineOptions::default()
    };

    let outcome = engine(&gateway, options)
        .run(&plan, &CancelToken::new())
        .await
        .expect("run");

    assert!(outcome.errors.is_empty());
    assert!(gateway.peak_in_flight() <= 4);
    assert!(gateway.peak_in_flight() > 1);
    for node in &outcome.tree.users {
        let kinds: Vec<_> = node.accounts.iter().map(|a| a.account.kind).collect();
        assert_eq!(kinds, vec![AccountKind::CreditCard, AccountKind::Deposit]);
    }
}

#[tokio::test(start_paused = true)]
async fn run_budget_stops_issuing_calls() {
    let gateway = Arc::new(InMemoryGateway::new().with_latency(Duration::from_millis(50)));
    let plan = Plan::new(UsersPlan::new(5));
    let options = EngineOptions {
        run_budget: Some(Duration::from_millis(120)),
        ..EngineOptions::default()
    };

    let outcome = engine(&gateway, options)
        .run(&plan, &CancelToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.tree.user_count(), 3);
    assert_eq!(outcome.summary.users.cancelled, 2);
    assert_eq!(gateway.call_count(GatewayMethod::CreateUser), 3);
}

#[tokio::test]
async fn repeated_runs_create_fresh_entities() {
    let gateway = Arc::new(InMemoryGateway::new());
    let engine = engine(&gateway, EngineOptions::default());
    let plan = two_users_one_credit_account();

    let first = engine.run(&plan, &CancelToken::new()).await.expect("first run");
    let second = engine.run(&plan, &CancelToken::new()).await.expect("second run");

    assert_ne!(first.run_id, second.run_id);
    let first_ids: HashSet<_> = first.tree.users.iter().map(|n| n.user.id.clone()).collect();
    assert!(
        second
            .tree
            .users
            .iter()
            .all(|node| !first_ids.contains(&node.user.id))
    );
    assert_eq!(gateway.call_count(GatewayMethod::CreateUser), 4);
}

#[tokio::test]
async fn seeded_runs_issue_identical_amounts() {
    let options = EngineOptions {
        seed: Some(7),
        ..EngineOptions::default()
    };
    let plan = two_users_one_credit_account();

    let mut amounts = Vec::new();
    for _ in 0..2 {
        let gateway = Arc::new(InMemoryGateway::new());
        engine(&gateway, options.clone())
            .run(&plan, &CancelToken::new())
            .await
            .expect("run");
        let issued: Vec<f64> = gateway
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::RecordOperation { amount, .. } => Some(amount),
                _ => None,
            })
            .collect();
        assert_eq!(issued.len(), 6);
        assert!(issued.iter().all(|amount| (1.0..=1000.0).contains(amount)));
        amounts.push(issued);
    }
    assert_eq!(amounts[0], amounts[1]);
}
