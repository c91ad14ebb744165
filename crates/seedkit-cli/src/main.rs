mod config;
mod logging;
mod output;
mod scenarios;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{info, warn};

use config::{ConfigError, SeedkitConfig, load_config};
use logging::{LoggingError, init_logging};
use scenarios::{BUILTIN_SCENARIOS, find_builtin};
use seedkit_engine::{
    CancelToken, EngineOptions, Scenario, ScenarioError, SeedContext, SeedReport, SeedingEngine,
};
use seedkit_gateway::{Gateway, GatewayError, HttpGateway, InMemoryGateway};
use seedkit_plan::{Plan, PlanError, load_plan_file, plan_json_schema};
use seedkit_store::{FileFixtureStore, FixtureStore, MemoryFixtureStore, StoreError};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown scenario '{0}'; pass --plan-file or pick one from `seedkit list`")]
    UnknownScenario(String),
}

#[derive(Parser, Debug)]
#[command(name = "seedkit", version, about = "Seed banking fixtures through the gateway")]
struct Cli {
    /// Configuration file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "seedkit.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed a scenario and store its result tree.
    Seed(SeedArgs),
    /// Print the stored fixture of a scenario.
    Show(ShowArgs),
    /// List built-in scenarios and stored fixtures.
    List(StoreArgs),
    /// Validate a JSON plan file.
    Validate(ValidateArgs),
    /// Print the JSON Schema of plan files.
    PlanSchema(PlanSchemaArgs),
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Scenario name, used as the fixture key.
    scenario: String,
    /// Plan to seed instead of the built-in one.
    #[arg(long)]
    plan_file: Option<PathBuf>,
    /// Maximum gateway calls in flight.
    #[arg(long)]
    concurrency: Option<usize>,
    /// Stop issuing calls after this many seconds.
    #[arg(long)]
    budget_secs: Option<u64>,
    /// Seed for operation amounts.
    #[arg(long)]
    seed: Option<u64>,
    /// Base URL of the http-gateway service.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    store_dir: Option<PathBuf>,
    /// Use the in-memory gateway and do not persist the tree.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Write the full seed report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    scenario: String,
    #[command(flatten)]
    store: StoreArgs,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Fixture directory (overrides `[store] dir`).
    #[arg(long)]
    store_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    plan_file: PathBuf,
}

#[derive(Args, Debug)]
struct PlanSchemaArgs {
    /// Output path. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = load_config(&cli.config)?;
    match cli.command {
        Command::Seed(args) => run_seed(args, config).await,
        Command::Show(args) => run_show(args, &config),
        Command::List(args) => run_list(args, &config),
        Command::Validate(args) => run_validate(args),
        Command::PlanSchema(args) => run_plan_schema(args),
    }
}

async fn run_seed(args: SeedArgs, mut config: SeedkitConfig) -> Result<ExitCode, CliError> {
    apply_seed_overrides(&mut config, &args);
    init_logging(&config.logging)?;

    let plan = resolve_plan(&args)?;
    let scenario = Scenario::new(args.scenario.clone(), plan)?;
    let options = config.engine.to_options();

    let cancel = CancelToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!(event = "interrupt_received");
                cancel.cancel();
            }
        })
    };

    let report = if args.dry_run {
        let store = MemoryFixtureStore::new();
        seed(InMemoryGateway::new(), options, &scenario, &store, cancel).await
    } else {
        let gateway = HttpGateway::new(config.gateway.clone())?;
        let store = FileFixtureStore::new(&config.store.dir);
        seed(gateway, options, &scenario, &store, cancel).await
    };
    watcher.abort();
    let report = report?;

    print!("{}", output::render_report(&report));
    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_vec_pretty(&report)?)?;
        info!(event = "report_written", path = %path.display());
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn apply_seed_overrides(config: &mut SeedkitConfig, args: &SeedArgs) {
    if let Some(concurrency) = args.concurrency {
        config.engine.concurrency = concurrency;
    }
    if let Some(budget) = args.budget_secs {
        config.engine.budget_secs = Some(budget);
    }
    if let Some(seed) = args.seed {
        config.engine.seed = Some(seed);
    }
    if let Some(base_url) = &args.base_url {
        config.gateway.base_url = base_url.clone();
    }
    if let Some(dir) = &args.store_dir {
        config.store.dir = dir.clone();
    }
}

fn resolve_plan(args: &SeedArgs) -> Result<Plan, CliError> {
    let Some(path) = &args.plan_file else {
        return find_builtin(&args.scenario)
            .map(|scenario| scenario.plan())
            .ok_or_else(|| CliError::UnknownScenario(args.scenario.clone()));
    };

    let validated = load_plan_file(path)?;
    for issue in &validated.warnings {
        warn!(
            event = "plan_warning",
            code = %issue.code,
            path = %issue.path,
            message = %issue.message,
        );
    }
    Ok(validated.plan)
}

async fn seed<G, S>(
    gateway: G,
    options: EngineOptions,
    scenario: &Scenario,
    store: &S,
    cancel: CancelToken,
) -> Result<SeedReport, CliError>
where
    G: Gateway,
    S: FixtureStore,
{
    let engine = SeedingEngine::new(gateway, options);
    let ctx = SeedContext::new(&engine, store).with_cancel(cancel);
    Ok(scenario.build(&ctx).await?)
}

fn store_for(args: &StoreArgs, config: &SeedkitConfig) -> FileFixtureStore {
    let dir = args.store_dir.as_ref().unwrap_or(&config.store.dir);
    FileFixtureStore::new(dir)
}

fn run_show(args: ShowArgs, config: &SeedkitConfig) -> Result<ExitCode, CliError> {
    let store = store_for(&args.store, config);
    let record = store.read_record(&args.scenario)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}

fn run_list(args: StoreArgs, config: &SeedkitConfig) -> Result<ExitCode, CliError> {
    println!("built-in scenarios:");
    for scenario in BUILTIN_SCENARIOS {
        let items = scenario
            .plan()
            .totals()
            .map(|totals| totals.items().to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {:<32} {:>6} items  {}",
            scenario.name, items, scenario.description
        );
    }

    let store = store_for(&args, config);
    let stored = store.list()?;
    println!("stored fixtures ({}):", store.root().display());
    if stored.is_empty() {
        println!("  (none)");
    }
    for name in stored {
        println!("  {name}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(args: ValidateArgs) -> Result<ExitCode, CliError> {
    match load_plan_file(&args.plan_file) {
        Ok(validated) => {
            println!(
                "plan is valid: {} users, {} accounts, {} operations",
                validated.totals.users, validated.totals.accounts, validated.totals.operations
            );
            for issue in &validated.warnings {
                println!("  {issue}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(PlanError::Invalid(report)) => {
            println!("plan is invalid:");
            for issue in report.errors.iter().chain(&report.warnings) {
                println!("  {issue}");
            }
            Ok(ExitCode::from(1))
        }
        Err(err) => Err(err.into()),
    }
}

fn run_plan_schema(args: PlanSchemaArgs) -> Result<ExitCode, CliError> {
    let schema = serde_json::to_string_pretty(&plan_json_schema())?;
    match args.out {
        Some(path) => std::fs::write(path, schema)?,
        None => println!("{schema}"),
    }
    Ok(ExitCode::SUCCESS)
}
