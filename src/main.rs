use clap::{Args, Parser, Subcommand};
use crosswiki_eligibility::config::{self, AppConfig};
use crosswiki_eligibility::eligibility::{
    EvaluationReport, Evaluator, EventRegistry, RuleStatus, SnapshotDatabase, StandardCatalog,
};
use crosswiki_eligibility::error::AppError;
use crosswiki_eligibility::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Crosswiki eligibility",
    about = "Check whether a user meets the requirements of a crosswiki election",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the events known to the built-in catalog
    Events,
    /// Evaluate one user against one event using a JSON snapshot
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Event id (see `events`)
    #[arg(long)]
    event: String,
    /// Global account name
    #[arg(long)]
    user: String,
    /// Snapshot file; defaults to ELIGIBILITY_SNAPSHOT
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Override the configured central wiki
    #[arg(long, value_parser = parse_central_wiki)]
    central_wiki: Option<String>,
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Events => list_events(&config),
        Command::Evaluate(args) => run_evaluation(config, args),
    }
}

fn parse_central_wiki(raw: &str) -> Result<String, String> {
    config::parse_wiki_id(raw)
        .map(|wiki| wiki.as_str().to_string())
        .map_err(|err| err.to_string())
}

fn list_events(config: &AppConfig) -> Result<(), AppError> {
    let catalog = StandardCatalog::new(config.eligibility.central_wiki.clone());
    for id in catalog.event_ids() {
        let event = catalog.build(id)?;
        let metadata = event.metadata();
        println!("{id}: {} ({}), {}", metadata.name, metadata.year, metadata.action);
    }
    Ok(())
}

fn run_evaluation(mut config: AppConfig, args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        event,
        user,
        snapshot,
        central_wiki,
        json,
    } = args;

    if let Some(central_wiki) = central_wiki {
        config.eligibility.central_wiki = config::parse_wiki_id(&central_wiki)?;
    }

    let path = snapshot
        .or_else(|| config.eligibility.snapshot.clone())
        .ok_or(AppError::MissingSnapshot)?;
    let mut db = SnapshotDatabase::from_path(&path)?;
    info!(?config.environment, snapshot = %path.display(), "snapshot loaded");

    let catalog = StandardCatalog::new(config.eligibility.central_wiki.clone());
    let event = catalog.build(&event)?;
    let report = Evaluator::new(&mut db).run(event, &user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report);
    }

    Ok(())
}

fn status_marker(status: RuleStatus) -> &'static str {
    match status {
        RuleStatus::Pass => "+",
        RuleStatus::Fail => "-",
        RuleStatus::SoftPass | RuleStatus::Accumulating => "~",
    }
}

fn render_report(report: &EvaluationReport) {
    println!("{} ({})", report.event.name, report.event.year);
    if let Some(url) = &report.event.url {
        println!("{url}");
    }
    println!("User: {}", report.user);
    if let Some(wiki) = &report.suggested_wiki {
        println!("Suggested home wiki: {wiki}");
    }

    if !report.global_results.is_empty() {
        println!("\nGlobal account");
        for result in &report.global_results {
            println!(
                "[{}] {}: {}",
                status_marker(result.info.status()),
                result.rule,
                result.info.message()
            );
        }
    }

    for wiki in &report.visited_wikis {
        println!("\nOn {wiki}");
        for result in report.results.iter().filter(|result| &result.wiki == wiki) {
            println!(
                "[{}] {}: {}",
                status_marker(result.info.status()),
                result.rule,
                result.info.message()
            );
        }
    }

    if !report.conclusions.is_empty() {
        println!("\nAfter every wiki");
        for conclusion in &report.conclusions {
            println!(
                "[{}] {}: {}",
                status_marker(conclusion.info.status()),
                conclusion.rule,
                conclusion.info.message()
            );
        }
    }

    println!("\nRequirements");
    for rule in &report.rules {
        println!("- {}: {}", rule.rule, rule.result.label());
    }

    let warnings = report.warnings();
    if !warnings.is_empty() {
        println!("\nWarnings");
        for warning in warnings {
            println!("- {warning}");
        }
    }

    if !report.event.extra_requirements.is_empty() {
        println!("\nAlso required (not checked)");
        for requirement in &report.event.extra_requirements {
            println!("- {requirement}");
        }
    }
    for exception in &report.event.exceptions {
        println!("Exception: {exception}");
    }

    println!("\n{}", report.summary());
}
