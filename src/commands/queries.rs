//! Saved Cypher query command definitions.

use crate::commands::params::{
    all_parameter, archive_parameter, file_parameter, format_parameter, format_pretty_parameter,
    format_with_headers_parameter, id_parameter, multi_parameter, output_file_parameter,
    query_selector_group, scope_parameter, yes_parameter, COMMAND_DELETE, COMMAND_DELETE_ALL,
    COMMAND_EXPORT, COMMAND_GET, COMMAND_LIST, COMMAND_QUERIES, COMMAND_UPLOAD, PARAMETER_ALL,
};
use clap::Command;

/// Create the queries command with all its subcommands.
pub fn queries_command() -> Command {
    Command::new(COMMAND_QUERIES)
        .about("Manage saved Cypher queries")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List saved queries")
                .visible_alias("ls")
                .arg(scope_parameter())
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get one saved query")
                .arg(id_parameter().required(true))
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPLOAD)
                .about("Import a query document (.json) or a query archive (.zip)")
                .arg(file_parameter().required(true))
                .arg(multi_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_EXPORT)
                .about("Export one query as JSON, or all queries in a scope as a ZIP archive")
                .arg(id_parameter())
                .arg(all_parameter())
                .arg(scope_parameter())
                .arg(archive_parameter().conflicts_with(PARAMETER_ALL))
                .arg(output_file_parameter().required(true))
                .group(query_selector_group()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete one saved query")
                .arg(id_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_DELETE_ALL)
                .about("Delete every saved query in a scope")
                .arg(scope_parameter())
                .arg(yes_parameter()),
        )
}
