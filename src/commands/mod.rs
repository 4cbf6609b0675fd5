//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap crate.
//! Each resource group lives in its own file; shared parameters are in [`params`].

use clap::{ArgMatches, Command};

pub mod config;
pub mod nodes;
pub mod params;
pub mod queries;

pub use params::{
    COMMAND_CONFIG, COMMAND_DELETE, COMMAND_DELETE_ALL, COMMAND_EXPORT, COMMAND_GET,
    COMMAND_LIST, COMMAND_NODES, COMMAND_PATH, COMMAND_QUERIES, COMMAND_SET, COMMAND_SYNTHESIZE,
    COMMAND_UPLOAD, PARAMETER_URL, PARAMETER_VERBOSE,
};

/// Build the complete command tree.
pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(params::url_parameter())
        .arg(params::verbose_parameter())
        .subcommand(nodes::nodes_command())
        .subcommand(queries::queries_command())
        .subcommand(config::config_command())
}

/// Parse the process arguments.
///
/// # Returns
///
/// An `ArgMatches` instance containing the parsed command-line arguments.
pub fn create_cli_commands() -> ArgMatches {
    build_cli().get_matches()
}
