use std::future::Future;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use seedkit_core::{AccountNode, OperationKind, ResultTree, UserNode};
use seedkit_gateway::{Gateway, TransportError};
use seedkit_plan::{AccountPlan, Plan, PlanTotals, ValidationReport, validate_plan_structure};

use crate::amounts::AmountSource;
use crate::cancel::CancelToken;
use crate::errors::EngineError;
use crate::model::{
    EngineOptions, ItemKind, SeedCause, SeedError, SeedOutcome, SeedStage, SeedSummary,
};

/// Turns a plan into gateway calls, one dependency level at a time.
#[derive(Debug)]
pub struct SeedingEngine<G> {
    gateway: G,
    options: EngineOptions,
}

enum Attempt<T> {
    Created(T),
    Failed(TransportError),
    Cancelled,
}

/// Stops new calls from being issued once cancelled or past the deadline.
struct Interrupt<'a> {
    cancel: &'a CancelToken,
    deadline: Option<Instant>,
}

impl Interrupt<'_> {
    fn triggered(&self) -> bool {
        self.cancel.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn reason(&self) -> &'static str {
        if self.cancel.is_cancelled() {
            "cancelled"
        } else {
            "budget_exceeded"
        }
    }
}

#[derive(Debug, Default)]
struct WaveTally {
    created: usize,
    failed: usize,
    cancelled: usize,
}

struct AccountUnit<'p> {
    user_pos: usize,
    user_index: u64,
    user_id: String,
    plan: &'p AccountPlan,
    ordinal: u64,
}

struct OperationUnit {
    user_pos: usize,
    account_pos: usize,
    account_id: String,
    card_id: Option<String>,
    kind: OperationKind,
    amount: f64,
}

impl<G: Gateway> SeedingEngine<G> {
    pub fn new(gateway: G, options: EngineOptions) -> Self {
        Self { gateway, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Seed every item of `plan`.
    ///
    /// Per-item failures never fail the run: they are returned in
    /// `SeedOutcome::errors` and only the failed item's subtree is skipped.
    /// The only errors are raised before the first gateway call.
    pub async fn run(
        &self,
        plan: &Plan,
        cancel: &CancelToken,
    ) -> Result<SeedOutcome, EngineError> {
        if self.options.concurrency == 0 {
            return Err(EngineError::InvalidOptions(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let report = validate_plan_structure(plan);
        if !report.is_ok() {
            return Err(EngineError::InvalidPlan(report));
        }
        let plan = plan.normalized();
        let totals = plan.totals().ok_or_else(|| {
            EngineError::InvalidPlan(ValidationReport::single_error(
                "totals_overflow",
                "/users",
                "planned item count does not fit in 64 bits",
            ))
        })?;

        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let interrupt = Interrupt {
            cancel,
            deadline: self.options.run_budget.map(|budget| start + budget),
        };
        let amounts = AmountSource::new(self.options.seed);

        info!(
            event = "seeding_started",
            run_id = %run_id,
            gateway = self.gateway.name(),
            users = totals.users,
            accounts = totals.accounts,
            operations = totals.operations,
            concurrency = self.options.concurrency,
            seed = self.options.seed,
        );

        let mut tree = ResultTree::new();
        let mut errors = Vec::new();

        // Users.
        let user_units: Vec<u64> = (0..plan.users.count).collect();
        wave_started(&run_id, SeedStage::User, user_units.len());
        let attempts = self
            .drain(&user_units, &interrupt, |_| self.gateway.create_user())
            .await;
        let mut tally = WaveTally::default();
        let mut created_users = Vec::new();
        for (user_index, attempt) in user_units.iter().zip(attempts) {
            match attempt {
                Attempt::Created(user) => {
                    tally.created += 1;
                    created_users.push((tree.users.len(), *user_index));
                    tree.users.push(UserNode {
                        user,
                        accounts: Vec::new(),
                    });
                }
                Attempt::Failed(error) => {
                    tally.failed += 1;
                    record_failure(
                        &run_id,
                        &mut errors,
                        SeedError {
                            stage: SeedStage::User,
                            parent_id: None,
                            kind: None,
                            cause: SeedCause::Transport(error),
                        },
                    );
                }
                Attempt::Cancelled => {
                    tally.cancelled += 1;
                    cancel_user(&plan, &mut errors);
                }
            }
        }
        wave_finished(&run_id, SeedStage::User, &tally);

        // Accounts, with the cards the backend issues alongside them.
        let mut account_units = Vec::new();
        for (user_pos, user_index) in &created_users {
            let user_id = &tree.users[*user_pos].user.id;
            for account_plan in &plan.users.accounts {
                for ordinal in 0..account_plan.count {
                    account_units.push(AccountUnit {
                        user_pos: *user_pos,
                        user_index: *user_index,
                        user_id: user_id.clone(),
                        plan: account_plan,
                        ordinal,
                    });
                }
            }
        }
        wave_started(&run_id, SeedStage::Account, account_units.len());
        let attempts = self
            .drain(&account_units, &interrupt, |unit| {
                self.gateway.open_account(&unit.user_id, unit.plan.kind)
            })
            .await;
        let mut tally = WaveTally::default();
        let mut created_accounts = Vec::new();
        for (unit, attempt) in account_units.iter().zip(attempts) {
            match attempt {
                Attempt::Created(account) => {
                    tally.created += 1;
                    let accounts = &mut tree.users[unit.user_pos].accounts;
                    created_accounts.push((unit, accounts.len()));
                    accounts.push(AccountNode {
                        account,
                        operations: Vec::new(),
                    });
                }
                Attempt::Failed(error) => {
                    tally.failed += 1;
                    record_failure(
                        &run_id,
                        &mut errors,
                        SeedError {
                            stage: SeedStage::Account,
                            parent_id: Some(unit.user_id.clone()),
                            kind: Some(ItemKind::Account(unit.plan.kind)),
                            cause: SeedCause::Transport(error),
                        },
                    );
                }
                Attempt::Cancelled => {
                    tally.cancelled += 1;
                    cancel_account(unit.plan, Some(&unit.user_id), &mut errors);
                }
            }
        }
        wave_finished(&run_id, SeedStage::Account, &tally);

        // Operations, cycling over the account's cards.
        let mut operation_units = Vec::new();
        for (unit, account_pos) in &created_accounts {
            let account = &tree.users[unit.user_pos].accounts[*account_pos].account;
            for (op_index, kind) in unit.plan.operation_sequence().into_iter().enumerate() {
                let card_id = if account.card_ids.is_empty() {
                    None
                } else {
                    Some(account.card_ids[op_index % account.card_ids.len()].clone())
                };
                let key = format!(
                    "{}/{}/{}/{}/{}",
                    unit.user_index, unit.plan.kind, unit.ordinal, kind, op_index
                );
                operation_units.push(OperationUnit {
                    user_pos: unit.user_pos,
                    account_pos: *account_pos,
                    account_id: account.id.clone(),
                    card_id,
                    kind,
                    amount: amounts.amount_for(&key),
                });
            }
        }
        wave_started(&run_id, SeedStage::Operation, operation_units.len());
        let attempts = self
            .drain(&operation_units, &interrupt, |unit| {
                self.gateway.record_operation(
                    &unit.account_id,
                    unit.card_id.as_deref(),
                    unit.kind,
                    unit.amount,
                )
            })
            .await;
        let mut tally = WaveTally::default();
        for (unit, attempt) in operation_units.iter().zip(attempts) {
            match attempt {
                Attempt::Created(operation) => {
                    tally.created += 1;
                    tree.users[unit.user_pos].accounts[unit.account_pos]
                        .operations
                        .push(operation);
                }
                Attempt::Failed(error) => {
                    tally.failed += 1;
                    record_failure(
                        &run_id,
                        &mut errors,
                        SeedError {
                            stage: SeedStage::Operation,
                            parent_id: Some(unit.account_id.clone()),
                            kind: Some(ItemKind::Operation(unit.kind)),
                            cause: SeedCause::Transport(error),
                        },
                    );
                }
                Attempt::Cancelled => {
                    tally.cancelled += 1;
                    errors.push(cancelled(
                        SeedStage::Operation,
                        Some(&unit.account_id),
                        Some(ItemKind::Operation(unit.kind)),
                    ));
                }
            }
        }
        wave_finished(&run_id, SeedStage::Operation, &tally);

        let summary = SeedSummary::new(totals, &tree, &errors);
        finish(&run_id, &interrupt, totals, &summary, start);

        Ok(SeedOutcome {
            run_id,
            tree,
            errors,
            summary,
        })
    }

    /// Run one wave with at most `concurrency` calls in flight and return the
    /// attempts in unit order. The interrupt is checked right before each call
    /// is issued; calls already issued always complete.
    async fn drain<'u, W, T, F, Fut>(
        &self,
        units: &'u [W],
        interrupt: &Interrupt<'_>,
        call: F,
    ) -> Vec<Attempt<T>>
    where
        F: Fn(&'u W) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut attempts: Vec<(usize, Attempt<T>)> = stream::iter(units.iter().enumerate())
            .map(|(index, unit)| {
                let pending = if interrupt.triggered() {
                    None
                } else {
                    Some(call(unit))
                };
                async move {
                    let attempt = match pending {
                        None => Attempt::Cancelled,
                        Some(pending) => match pending.await {
                            Ok(created) => Attempt::Created(created),
                            Err(error) => Attempt::Failed(error),
                        },
                    };
                    (index, attempt)
                }
            })
            .buffer_unordered(self.options.concurrency)
            .collect()
            .await;
        attempts.sort_by_key(|(index, _)| *index);
        attempts.into_iter().map(|(_, attempt)| attempt).collect()
    }
}

fn cancelled(stage: SeedStage, parent_id: Option<&str>, kind: Option<ItemKind>) -> SeedError {
    SeedError {
        stage,
        parent_id: parent_id.map(str::to_string),
        kind,
        cause: SeedCause::Cancelled,
    }
}

/// Marks a never-created user and everything planned beneath it.
fn cancel_user(plan: &Plan, errors: &mut Vec<SeedError>) {
    errors.push(cancelled(SeedStage::User, None, None));
    for account_plan in &plan.users.accounts {
        for _ in 0..account_plan.count {
            cancel_account(account_plan, None, errors);
        }
    }
}

fn cancel_account(plan: &AccountPlan, user_id: Option<&str>, errors: &mut Vec<SeedError>) {
    errors.push(cancelled(
        SeedStage::Account,
        user_id,
        Some(ItemKind::Account(plan.kind)),
    ));
    for kind in plan.operation_sequence() {
        errors.push(cancelled(
            SeedStage::Operation,
            None,
            Some(ItemKind::Operation(kind)),
        ));
    }
}

fn record_failure(run_id: &str, errors: &mut Vec<SeedError>, error: SeedError) {
    warn!(
        event = "item_failed",
        run_id = %run_id,
        stage = %error.stage,
        kind = error.kind.map(|kind| kind.to_string()).as_deref(),
        parent_id = error.parent_id.as_deref(),
        error = %error.cause,
    );
    errors.push(error);
}

fn wave_started(run_id: &str, stage: SeedStage, planned: usize) {
    info!(event = "wave_started", run_id = %run_id, stage = %stage, planned);
}

fn wave_finished(run_id: &str, stage: SeedStage, tally: &WaveTally) {
    info!(
        event = "wave_finished",
        run_id = %run_id,
        stage = %stage,
        created = tally.created,
        failed = tally.failed,
        cancelled = tally.cancelled,
    );
}

fn finish(
    run_id: &str,
    interrupt: &Interrupt<'_>,
    totals: PlanTotals,
    summary: &SeedSummary,
    start: Instant,
) {
    let cancelled =
        summary.users.cancelled + summary.accounts.cancelled + summary.operations.cancelled;
    if cancelled > 0 {
        warn!(
            event = "seeding_cancelled",
            run_id = %run_id,
            reason = interrupt.reason(),
            not_attempted = cancelled,
        );
    }
    let failed = summary.users.failed + summary.accounts.failed + summary.operations.failed;
    info!(
        event = "seeding_finished",
        run_id = %run_id,
        planned = totals.items(),
        users = summary.users.created,
        accounts = summary.accounts.created,
        operations = summary.operations.created,
        failed,
        cancelled,
        duration_ms = start.elapsed().as_millis() as u64,
    );
}
