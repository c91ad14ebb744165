use seedkit_core::{AccountKind, OperationKind};
use seedkit_plan::{AccountPlan, Plan, UsersPlan};

const USERS: u64 = 300;

/// A scenario shipped with the binary.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinScenario {
    pub name: &'static str,
    pub description: &'static str,
    plan: fn() -> Plan,
}

impl BuiltinScenario {
    pub fn plan(&self) -> Plan {
        (self.plan)()
    }
}

pub const BUILTIN_SCENARIOS: &[BuiltinScenario] = &[
    BuiltinScenario {
        name: "existing_user_get_operations",
        description: "credit card account with 5 purchases, 1 top-up and 1 cash withdrawal",
        plan: get_operations,
    },
    BuiltinScenario {
        name: "existing_user_get_accounts",
        description: "one deposit and one savings account",
        plan: get_accounts,
    },
    BuiltinScenario {
        name: "existing_user_issue_cards",
        description: "debit card account",
        plan: issue_cards,
    },
    BuiltinScenario {
        name: "existing_user_make_operations",
        description: "credit and debit card accounts with one operation of every kind",
        plan: make_operations,
    },
];

pub fn find_builtin(name: &str) -> Option<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS
        .iter()
        .find(|scenario| scenario.name == name)
}

fn get_operations() -> Plan {
    Plan::new(
        UsersPlan::new(USERS).with_account(
            AccountPlan::new(AccountKind::CreditCard, 1)
                .with_operations(OperationKind::Purchase, 5)
                .with_operations(OperationKind::TopUp, 1)
                .with_operations(OperationKind::CashWithdrawal, 1),
        ),
    )
}

fn get_accounts() -> Plan {
    Plan::new(
        UsersPlan::new(USERS)
            .with_account(AccountPlan::new(AccountKind::Deposit, 1))
            .with_account(AccountPlan::new(AccountKind::Savings, 1)),
    )
}

fn issue_cards() -> Plan {
    Plan::new(UsersPlan::new(USERS).with_account(AccountPlan::new(AccountKind::DebitCard, 1)))
}

fn make_operations() -> Plan {
    let every_operation = |kind| {
        OperationKind::ALL
            .into_iter()
            .fold(AccountPlan::new(kind, 1), |account, operation| {
                account.with_operations(operation, 1)
            })
    };
    Plan::new(
        UsersPlan::new(USERS)
            .with_account(every_operation(AccountKind::CreditCard))
            .with_account(every_operation(AccountKind::DebitCard)),
    )
}
