use serde::{Deserialize, Serialize};
use tracing::info;

use seedkit_core::ResultTree;
use seedkit_gateway::Gateway;
use seedkit_plan::Plan;
use seedkit_store::{FixtureStore, validate_scenario_name};

use crate::cancel::CancelToken;
use crate::engine::SeedingEngine;
use crate::errors::ScenarioError;
use crate::model::{SeedError, SeedSummary};

/// A named plan. The name is the fixture store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    name: String,
    plan: Plan,
}

/// Everything one build needs, passed explicitly so concurrent builds share
/// no state besides the store.
pub struct SeedContext<'a, G, S: ?Sized> {
    pub engine: &'a SeedingEngine<G>,
    pub store: &'a S,
    pub cancel: CancelToken,
}

impl<'a, G, S: ?Sized> SeedContext<'a, G, S> {
    pub fn new(engine: &'a SeedingEngine<G>, store: &'a S) -> Self {
        Self {
            engine,
            store,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Outcome of [`Scenario::build`]. Returned whatever the error list holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedReport {
    pub run_id: String,
    pub scenario_name: String,
    pub tree: ResultTree,
    pub errors: Vec<SeedError>,
    pub summary: SeedSummary,
}

impl SeedReport {
    /// True when every planned item was created.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Scenario {
    pub fn new(name: impl Into<String>, plan: Plan) -> Result<Self, ScenarioError> {
        let name = name.into();
        validate_scenario_name(&name)?;
        Ok(Self { name, plan })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Seed the plan and store the resulting tree under the scenario name.
    ///
    /// The tree is written even when some items failed, replacing any tree
    /// stored by an earlier build.
    pub async fn build<G, S>(
        &self,
        ctx: &SeedContext<'_, G, S>,
    ) -> Result<SeedReport, ScenarioError>
    where
        G: Gateway,
        S: FixtureStore + ?Sized,
    {
        let outcome = ctx.engine.run(&self.plan, &ctx.cancel).await?;
        ctx.store.write(&self.name, &outcome.tree)?;

        info!(
            event = "scenario_built",
            scenario = %self.name,
            run_id = %outcome.run_id,
            items = outcome.tree.item_count(),
            errors = outcome.errors.len(),
        );

        Ok(SeedReport {
            run_id: outcome.run_id,
            scenario_name: self.name.clone(),
            tree: outcome.tree,
            errors: outcome.errors,
            summary: outcome.summary,
        })
    }
}
