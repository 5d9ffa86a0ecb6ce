//! Repoman CLI - Command-line interface for Repoman
//!
//! Counts issues and rolls out CODEOWNERS files across the repositories of a
//! GitHub organization or user.

mod args;
mod report;

use args::{read_content_file, Scope, TargetArgs};
use clap::{Parser, Subcommand};
use repoman_core::{
    log_operation_start, ErrorContext, Logger, LoggingConfig, RepomanConfig,
    RepomanError, RepomanResult,
};
use repoman_github::{ApiClientConfig, GitHubApiClient, RepositoryService, ServiceOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "repoman")]
#[command(about = "Manage the repositories of a GitHub organization or user")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count issues (pull requests excluded) per repository
    GetIssueCount {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Add or update the CODEOWNERS file in repositories
    Codeowners {
        #[command(flatten)]
        target: TargetArgs,

        /// Path to the CODEOWNERS file to add to repositories
        #[arg(long = "codeowner-file")]
        codeowner_file: PathBuf,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, source) = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    let logger = match init_logger(&logging_config) {
        Ok(logger) => logger,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let result = logger
        .scope(async {
            info!("Starting Repoman CLI v{}", env!("CARGO_PKG_VERSION"));
            match &source {
                Some(path) => info!("Loaded configuration from {:?}", path),
                None => info!("No configuration file found, using defaults"),
            }
            run(cli, config, &logger).await
        })
        .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, &logger);
            ExitCode::FAILURE
        }
    }
}

/// The one place a failed command is logged and printed
fn report_failure(err: &RepomanError, logger: &Logger) {
    err.log(logger);
    print_error(err);
}

fn init_logger(config: &LoggingConfig) -> RepomanResult<Logger> {
    Logger::from_config(config).map_err(|e| {
        Box::new(RepomanError::Config {
            message: format!("Failed to initialize logging: {}", e),
            source: Some(e),
            context: ErrorContext::new("cli")
                .with_operation("init_logging")
                .with_suggestion("Check the [logging] section of your configuration"),
        })
    })
}

fn print_error(err: &RepomanError) {
    for line in error_lines(err) {
        eprintln!("{}", line);
    }
}

fn error_lines(err: &RepomanError) -> Vec<String> {
    let mut lines = vec![format!("Error: {}", err)];
    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        lines.push(format!("  caused by: {}", inner));
        cause = inner.source();
    }
    lines.extend(err.suggestions().iter().map(|s| format!("  hint: {}", s)));
    lines
}

async fn run(cli: Cli, config: RepomanConfig, logger: &Logger) -> RepomanResult<()> {
    match cli.command {
        Commands::GetIssueCount { target } => handle_issue_count(target, &config, logger).await,
        Commands::Codeowners {
            target,
            codeowner_file,
        } => handle_codeowners(target, &codeowner_file, &config, logger).await,
        Commands::Config {
            show,
            init,
            validate,
        } => handle_config(show, init, validate, &config),
    }
}

/// Look for a configuration file in the default locations
fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|d| d.join("repoman").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".repoman").join("config.toml")),
        Some(PathBuf::from("repoman.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn load_config(config_path: Option<&Path>) -> RepomanResult<(RepomanConfig, Option<PathBuf>)> {
    if let Some(path) = config_path {
        return Ok((RepomanConfig::from_file(path)?, Some(path.to_path_buf())));
    }

    for path in default_config_paths() {
        if path.exists() {
            return Ok((RepomanConfig::from_file(&path)?, Some(path)));
        }
    }

    Ok((RepomanConfig::default(), None))
}

fn build_service(
    target: &TargetArgs,
    config: &RepomanConfig,
    logger: &Logger,
) -> RepomanResult<RepositoryService> {
    let token = target.token(&config.github.token_env)?;
    let api_config = ApiClientConfig::from_settings(&config.github, Some(token));
    let client = logger.in_scope(|| GitHubApiClient::new(api_config))?;
    let options = ServiceOptions::from_config(config, target.concurrency);

    Ok(RepositoryService::new(
        Arc::new(client),
        options,
        logger.clone(),
    ))
}

async fn handle_issue_count(
    target_args: TargetArgs,
    config: &RepomanConfig,
    logger: &Logger,
) -> RepomanResult<()> {
    let target = target_args.target()?;
    let service = build_service(&target_args, config, logger)?;
    let owner = &target.owner;

    match target.scope {
        Scope::Single(repo) => {
            log_operation_start!("get_issue_count", owner = %owner, repo = %repo);
            let stats = service.issue_stats(owner, &repo).await?;
            println!("{}", report::single_repo_issue_report(owner, &stats));
        }
        Scope::Discover(prefix) => {
            log_operation_start!(
                "get_issue_count",
                owner = %owner,
                prefix = prefix.as_deref().unwrap_or("")
            );
            let mut stats = service.issue_stats_batch(owner, prefix.as_deref()).await?;
            if stats.is_empty() {
                info!(owner = %owner, "No repositories found matching the specified criteria");
                return Ok(());
            }
            println!(
                "{}",
                report::issue_report(owner, prefix.as_deref(), &mut stats)
            );
        }
    }

    Ok(())
}

async fn handle_codeowners(
    target_args: TargetArgs,
    codeowner_file: &Path,
    config: &RepomanConfig,
    logger: &Logger,
) -> RepomanResult<()> {
    let target = target_args.target()?;
    let content = read_content_file(codeowner_file)?;
    let service = build_service(&target_args, config, logger)?;
    let owner = &target.owner;

    match target.scope {
        Scope::Single(repo) => {
            log_operation_start!("codeowners", owner = %owner, repo = %repo);
            let outcome = service.upsert_file(owner, &repo, &content).await?;
            println!("{}", report::single_repo_codeowners_report(owner, &outcome));
        }
        Scope::Discover(prefix) => {
            log_operation_start!(
                "codeowners",
                owner = %owner,
                prefix = prefix.as_deref().unwrap_or("")
            );
            let partition = service
                .upsert_file_batch(owner, prefix.as_deref(), &content)
                .await?;
            if partition.is_empty() {
                info!(owner = %owner, "No repositories found matching the specified criteria");
                return Ok(());
            }
            println!(
                "{}",
                report::codeowners_report(
                    owner,
                    prefix.as_deref(),
                    &partition,
                    &service.options().file_path
                )
            );
        }
    }

    Ok(())
}

fn handle_config(show: bool, init: bool, validate: bool, config: &RepomanConfig) -> RepomanResult<()> {
    if init {
        let config_path = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
            .map(|d| d.join("repoman").join("config.toml"))
            .ok_or_else(|| {
                Box::new(RepomanError::Config {
                    message: "Could not determine a configuration directory".to_string(),
                    source: None,
                    context: ErrorContext::new("cli")
                        .with_operation("config_init")
                        .with_suggestion("Pass --config with an explicit path instead"),
                })
            })?;

        RepomanConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {:?}", config_path);
    }

    if show {
        let rendered = toml::to_string_pretty(config).map_err(|e| {
            Box::new(RepomanError::Config {
                message: format!("Failed to render configuration: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("cli").with_operation("config_show"),
            })
        })?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        config.validate()?;
        println!("✅ Configuration is valid");
    }

    Ok(())
}
