use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use workflow_forge::api::deployment_dto::DeploymentOutcome;
use workflow_forge::config::AppConfig;
use workflow_forge::domain::services::template_search_trait::TemplateSearch;
use workflow_forge::domain::validator::WorkflowValidator;
use workflow_forge::domain::workflow::workflow::WorkflowDocument;
use workflow_forge::loader::parser::{parse_json_file, to_pretty_json};
use workflow_forge::remote::catalog::template_index::{TemplateIndex, detect_domain};
use workflow_forge::remote::n8n::n8n_client::N8nClient;
use workflow_forge::{build_session, logger};

#[derive(Parser)]
#[command(name = "workflow-forge", about = "Generate, validate and deploy n8n workflows from plain-language descriptions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a workflow from a description.
    Generate {
        description: String,
        /// Skip model-assisted generation.
        #[arg(long)]
        offline: bool,
        /// Deploy the generated workflow to n8n.
        #[arg(long)]
        deploy: bool,
    },
    /// Validate a workflow JSON file.
    Validate { file: PathBuf },
    /// Deploy a workflow file, or the latest generated workflow.
    Deploy {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Search the template catalog.
    Search {
        query: String,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
    /// Show template catalog statistics.
    Stats,
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Command::Generate { description, offline, deploy } => {
            if deploy {
                config.validate_for_deployment()?;
            }

            let mut session = build_session(&config, offline)?;
            let report = session.generate(&description);

            println!("{}", report.document.summary());
            println!("Valid: {}", report.validation.valid);
            for error in &report.validation.errors {
                println!("  error: {}", error);
            }
            for warning in &report.validation.warnings {
                println!("  warning: {}", warning);
            }
            if let Some(paths) = &report.persisted {
                println!("Saved to {}", paths.archive.display());
            }

            if deploy {
                print_deployment(&config, session.deploy(), &report.document)?;
            }
        }
        Command::Validate { file } => {
            let document: Value = parse_json_file(&file).with_context(|| format!("could not read '{}'", file.display()))?;
            let report = WorkflowValidator::validate(&document);
            print!("{}", to_pretty_json(&report)?);

            if !report.valid {
                bail!("'{}' is not a valid workflow", file.display());
            }
        }
        Command::Deploy { file } => {
            config.validate_for_deployment()?;
            let mut session = build_session(&config, true)?;

            match file {
                Some(file) => {
                    let document: WorkflowDocument = parse_json_file(&file).with_context(|| format!("could not read '{}'", file.display()))?;
                    session.adopt(document);
                }
                None => {
                    if !session.restore_latest()? {
                        bail!("no generated workflow found in '{}'", session.store().directory().display());
                    }
                }
            }

            let outcome = session.deploy();
            match session.last_generated() {
                Some(document) => print_deployment(&config, outcome, document)?,
                None => bail!("nothing to deploy"),
            }
        }
        Command::Search { query, domain, limit } => {
            let index = TemplateIndex::load_catalog(&config.template_catalog_path)?;
            let domain = domain.or_else(|| detect_domain(&query, &config.domains).map(str::to_string));

            let matches = index.search(&query, domain.as_deref(), limit)?;
            if matches.is_empty() {
                println!("No similar workflows found.");
            }
            for (position, hit) in matches.iter().enumerate() {
                println!("{}. {} ({}) similarity {:.3}", position + 1, hit.metadata.title, hit.metadata.domain, hit.similarity_score);
                println!("   {}", hit.metadata.description);
                println!("   Tags: {}", hit.metadata.tags);
            }
        }
        Command::Stats => {
            let index = TemplateIndex::load_catalog(&config.template_catalog_path)?;
            let stats = index.stats()?;

            println!("Total workflows: {}", stats.total_count);
            for (domain, count) in &stats.per_domain_counts {
                println!("  {}: {}", domain, count);
            }
        }
    }

    Ok(())
}

fn print_deployment(config: &AppConfig, outcome: DeploymentOutcome, document: &WorkflowDocument) -> anyhow::Result<()> {
    match outcome {
        DeploymentOutcome::Success { id, message } => {
            println!("{}", message);
            println!("Workflow ID: {}", id.as_deref().unwrap_or("unknown"));
            if let Some(url) = N8nClient::from_config(config)?.webhook_url(document) {
                println!("Webhook URL: {}", url);
            }
            Ok(())
        }
        DeploymentOutcome::Error { message, .. } => bail!("deployment failed: {}", message),
    }
}
