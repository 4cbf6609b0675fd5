//! Top level command dispatch.

use clap::ArgMatches;

use crate::{
    actions::{self, CliActionError},
    commands::{COMMAND_CONFIG, COMMAND_NODES, COMMAND_QUERIES},
    configuration::Configuration,
};

fn extract_subcommand_name(matches: &ArgMatches) -> String {
    match matches.subcommand() {
        Some((name, _)) => name.to_string(),
        None => "unknown".to_string(),
    }
}

pub async fn execute_command(
    mut configuration: Configuration,
    matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match matches.subcommand() {
        Some((COMMAND_NODES, sub_matches)) => {
            actions::nodes::execute(&configuration, sub_matches).await
        }
        Some((COMMAND_QUERIES, sub_matches)) => {
            actions::queries::execute(&configuration, sub_matches).await
        }
        Some((COMMAND_CONFIG, sub_matches)) => {
            actions::config::execute(&mut configuration, sub_matches)
        }
        _ => Err(CliActionError::UnsupportedSubcommand(
            extract_subcommand_name(matches),
        )),
    }
}
