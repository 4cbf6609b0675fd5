//! Command handlers that turn parsed arguments into resource client calls.

use std::path::PathBuf;

use clap::ArgMatches;
use color_print::ceprintln;
use inquire::Confirm;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
    commands::params::{
        PARAMETER_FORMAT, PARAMETER_HEADERS, PARAMETER_PRETTY, PARAMETER_SCOPE, PARAMETER_URL,
        PARAMETER_YES,
    },
    configuration::{Configuration, ConfigurationError},
    error::ClientError,
    exit_codes::HoundExitCode,
    format::{FormattingError, OutputFormat, OutputFormatOptions},
    model::QueryScope,
    resources::{BulkSummary, DeleteAllConfirmation, DeleteAllOutcome, ResourceClient},
    session::Session,
    transport::{Transport, TransportConfig},
};

pub mod config;
pub mod nodes;
pub mod queries;

#[derive(Debug, Error)]
pub enum CliActionError {
    #[error("{0}")]
    ClientError(#[from] ClientError),

    #[error("{0}")]
    ConfigurationError(#[from] ConfigurationError),

    #[error("{0}")]
    FormattingError(#[from] FormattingError),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),

    #[error("Undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to read confirmation: {0}")]
    PromptError(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{failed} of {attempted} deletes failed")]
    BulkIncomplete { failed: usize, attempted: usize },
}

impl CliActionError {
    pub fn exit_code(&self) -> HoundExitCode {
        match self {
            CliActionError::ClientError(e) => e.exit_code(),
            CliActionError::ConfigurationError(_) => HoundExitCode::ConfigError,
            CliActionError::FormattingError(_) => HoundExitCode::DataError,
            CliActionError::MissingRequiredArgument(_)
            | CliActionError::UnsupportedSubcommand(_)
            | CliActionError::PromptError(_) => HoundExitCode::UsageError,
            CliActionError::IoError(_) => HoundExitCode::IoError,
            CliActionError::Cancelled => HoundExitCode::Cancelled,
            CliActionError::BulkIncomplete { .. } => HoundExitCode::ApiError,
        }
    }
}

pub fn required_string<'a>(
    sub_matches: &'a ArgMatches,
    name: &str,
) -> Result<&'a String, CliActionError> {
    sub_matches
        .get_one::<String>(name)
        .ok_or_else(|| CliActionError::MissingRequiredArgument(name.to_string()))
}

pub fn required_path<'a>(
    sub_matches: &'a ArgMatches,
    name: &str,
) -> Result<&'a PathBuf, CliActionError> {
    sub_matches
        .get_one::<PathBuf>(name)
        .ok_or_else(|| CliActionError::MissingRequiredArgument(name.to_string()))
}

/// Build the resource client for commands that talk to the server.
///
/// The URL from `--url` or `HOUNDTRAINER_URL` wins over the configured one.
pub fn resource_client(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<ResourceClient, CliActionError> {
    let url = sub_matches.get_one::<Url>(PARAMETER_URL);
    let config = TransportConfig::from_configuration(configuration, url)?;
    debug!("Using BloodHound at {}", config.base_url);

    let transport = Transport::new(config, Session::from_env_or_prompt())?;
    Ok(ResourceClient::new(transport))
}

pub fn output_format(sub_matches: &ArgMatches) -> Result<OutputFormat, CliActionError> {
    let format_str = sub_matches
        .get_one::<String>(PARAMETER_FORMAT)
        .cloned()
        .unwrap_or_else(|| "json".to_string());

    let options = OutputFormatOptions {
        with_headers: sub_matches.get_flag(PARAMETER_HEADERS),
        pretty: sub_matches.get_flag(PARAMETER_PRETTY),
    };

    Ok(OutputFormat::from_string_with_options(&format_str, options)?)
}

/// The `--scope` value, or the configured default scope
pub fn query_scope(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<QueryScope, CliActionError> {
    match sub_matches.get_one::<String>(PARAMETER_SCOPE) {
        Some(scope) => scope.parse().map_err(|_| {
            CliActionError::MissingRequiredArgument(format!("invalid scope '{}'", scope))
        }),
        None => Ok(configuration.default_scope()),
    }
}

/// Ask before deleting everything, unless `--yes` was given
pub fn confirm_delete_all(
    sub_matches: &ArgMatches,
    what: &str,
) -> Result<DeleteAllConfirmation, CliActionError> {
    if sub_matches.get_flag(PARAMETER_YES) {
        return Ok(DeleteAllConfirmation::affirmed());
    }

    ceprintln!("<y>WARNING:</y> this permanently deletes every {} on the server.", what);
    let confirmed = Confirm::new(&format!("Delete all {}?", what))
        .with_default(false)
        .prompt()
        .map_err(|e| CliActionError::PromptError(e.to_string()))?;

    if confirmed {
        Ok(DeleteAllConfirmation::affirmed())
    } else {
        Err(CliActionError::Cancelled)
    }
}

/// Print the result of a bulk delete and fail when any item failed
pub fn report_delete_all(outcome: DeleteAllOutcome, what: &str) -> Result<(), CliActionError> {
    let summary: BulkSummary = match outcome {
        DeleteAllOutcome::NothingToDelete => {
            println!("No {} found.", what);
            return Ok(());
        }
        DeleteAllOutcome::Completed(summary) => summary,
    };

    println!(
        "Deleted {} of {} {}.",
        summary.succeeded, summary.attempted, what
    );
    if summary.skipped > 0 {
        println!("Skipped {} item(s) without a key.", summary.skipped);
    }
    for failure in &summary.failed {
        error!("{}: {}", failure.key, failure.error);
    }

    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(CliActionError::BulkIncomplete {
            failed: summary.failed.len(),
            attempted: summary.attempted,
        })
    }
}
