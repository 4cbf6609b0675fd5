//! Configuration command definitions.
//!
//! This module defines CLI commands related to configuration management.

use crate::commands::params::{
    format_parameter, format_pretty_parameter, format_with_headers_parameter, scope_parameter,
    timeout_parameter, COMMAND_CONFIG, COMMAND_GET, COMMAND_PATH, COMMAND_SET,
};
use clap::Command;

/// Create the config command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration management")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get configuration details")
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(Command::new(COMMAND_PATH).about("Show configuration file path"))
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Update configuration properties (use the global --url to set the server)")
                .arg(timeout_parameter())
                .arg(scope_parameter().help("Default saved query scope")),
        )
}
