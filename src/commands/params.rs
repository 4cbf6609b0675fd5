//! Shared command parameters for all CLI commands.
//!
//! This module defines common parameters that are used across multiple command modules.
//! It provides a centralized place to define parameter names and common argument configurations.

use crate::{format::OutputFormat, model::QueryScope};
use clap::{Arg, ArgAction, ArgGroup};
use std::path::PathBuf;
use url::Url;

// Resource groups
pub const COMMAND_NODES: &str = "nodes";
pub const COMMAND_QUERIES: &str = "queries";
pub const COMMAND_CONFIG: &str = "config";

// Resource operations
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_GET: &str = "get";
pub const COMMAND_UPLOAD: &str = "upload";
pub const COMMAND_SYNTHESIZE: &str = "synthesize";
pub const COMMAND_EXPORT: &str = "export";
pub const COMMAND_DELETE: &str = "delete";
pub const COMMAND_DELETE_ALL: &str = "delete-all";

// Config commands
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_SET: &str = "set";

// Parameter names
pub const PARAMETER_URL: &str = "url";
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_HEADERS: &str = "headers";
pub const PARAMETER_OUTPUT: &str = "output";
pub const PARAMETER_FILE: &str = "file";
pub const PARAMETER_CSV: &str = "csv";
pub const PARAMETER_KIND: &str = "kind";
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_ALL: &str = "all";
pub const PARAMETER_SCOPE: &str = "scope";
pub const PARAMETER_ARCHIVE: &str = "archive";
pub const PARAMETER_MULTI: &str = "multi";
pub const PARAMETER_YES: &str = "yes";
pub const PARAMETER_TIMEOUT: &str = "timeout";

pub const URL_ENV_VAR: &str = "HOUNDTRAINER_URL";

/// Create the global BloodHound URL parameter.
pub fn url_parameter() -> Arg {
    Arg::new(PARAMETER_URL)
        .long(PARAMETER_URL)
        .num_args(1)
        .required(false)
        .env(URL_ENV_VAR)
        .global(true)
        .value_parser(clap::value_parser!(Url))
        .help("BloodHound base URL (e.g., https://bloodhound.example.com)")
}

pub fn verbose_parameter() -> Arg {
    Arg::new(PARAMETER_VERBOSE)
        .short('v')
        .long(PARAMETER_VERBOSE)
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable verbose output for debugging")
}

/// Create the format parameter.
///
/// This parameter is used across multiple commands for output formatting.
pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .short('f')
        .long(PARAMETER_FORMAT)
        .num_args(1)
        .required(false)
        .env("HOUNDTRAINER_FORMAT")
        .default_value("json")
        .help("Output data format")
        .value_parser(OutputFormat::names())
}

/// This parameter flag is used across multiple commands for output formatting.
pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Format the output pretty")
}

/// This parameter flag is used across multiple commands for output formatting.
pub fn format_with_headers_parameter() -> Arg {
    Arg::new(PARAMETER_HEADERS)
        .long(PARAMETER_HEADERS)
        .action(ArgAction::SetTrue)
        .required(false)
        .env("HOUNDTRAINER_HEADERS")
        .help("Format the output with headers")
}

/// Create the output file parameter.
pub fn output_file_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT)
        .short('o')
        .long(PARAMETER_OUTPUT)
        .num_args(1)
        .required(false)
        .help("Output file path")
        .value_parser(clap::value_parser!(PathBuf))
}

/// Create the input file parameter.
pub fn file_parameter() -> Arg {
    Arg::new(PARAMETER_FILE)
        .long(PARAMETER_FILE)
        .num_args(1)
        .required(false)
        .help("Input file path")
        .value_parser(clap::value_parser!(PathBuf))
}

/// Create the CSV source parameter.
pub fn csv_parameter() -> Arg {
    Arg::new(PARAMETER_CSV)
        .long(PARAMETER_CSV)
        .num_args(1)
        .required(false)
        .help("CSV file with 'Kind Name', 'Icon Name' and 'Color' columns")
        .value_parser(clap::value_parser!(PathBuf))
}

/// Create the custom type kind name parameter.
pub fn kind_parameter() -> Arg {
    Arg::new(PARAMETER_KIND)
        .short('k')
        .long(PARAMETER_KIND)
        .num_args(1)
        .required(false)
        .help("Custom type kind name")
}

/// Create the saved query ID parameter.
pub fn id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .long(PARAMETER_ID)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(i64))
        .help("Saved query ID")
}

pub fn all_parameter() -> Arg {
    Arg::new(PARAMETER_ALL)
        .long(PARAMETER_ALL)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Apply to every resource")
}

/// Create the query scope parameter. Defaults to the configured scope.
pub fn scope_parameter() -> Arg {
    Arg::new(PARAMETER_SCOPE)
        .short('s')
        .long(PARAMETER_SCOPE)
        .num_args(1)
        .required(false)
        .help("Saved query scope (defaults to the configured scope)")
        .value_parser(QueryScope::names())
}

pub fn archive_parameter() -> Arg {
    Arg::new(PARAMETER_ARCHIVE)
        .long(PARAMETER_ARCHIVE)
        .action(ArgAction::SetTrue)
        .required(false)
        .requires(PARAMETER_ID)
        .help("Download the server's ZIP archive of the query instead of a JSON document")
}

pub fn multi_parameter() -> Arg {
    Arg::new(PARAMETER_MULTI)
        .long(PARAMETER_MULTI)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Import several queries from a ZIP archive")
}

pub fn yes_parameter() -> Arg {
    Arg::new(PARAMETER_YES)
        .short('y')
        .long(PARAMETER_YES)
        .action(ArgAction::SetTrue)
        .required(false)
        .help("Skip the confirmation prompt")
}

/// Create the request timeout parameter.
pub fn timeout_parameter() -> Arg {
    Arg::new(PARAMETER_TIMEOUT)
        .long(PARAMETER_TIMEOUT)
        .num_args(1)
        .required(false)
        .help("Request timeout in seconds")
        .value_parser(clap::value_parser!(u64).range(1..))
}

/// Custom type selector group: it must be either --kind or --all
pub fn kind_selector_group() -> ArgGroup {
    ArgGroup::new("kind-selector")
        .args([PARAMETER_KIND, PARAMETER_ALL])
        .multiple(false)
        .required(true)
}

/// Saved query selector group: it must be either --id or --all
pub fn query_selector_group() -> ArgGroup {
    ArgGroup::new("query-selector")
        .args([PARAMETER_ID, PARAMETER_ALL])
        .multiple(false)
        .required(true)
}

/// Node upload source group: it must be either --file or --csv
pub fn node_source_group() -> ArgGroup {
    ArgGroup::new("node-source")
        .args([PARAMETER_FILE, PARAMETER_CSV])
        .multiple(false)
        .required(true)
}
