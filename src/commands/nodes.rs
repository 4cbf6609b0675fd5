//! Custom node type command definitions.

use crate::commands::params::{
    all_parameter, csv_parameter, file_parameter, format_parameter, format_pretty_parameter,
    format_with_headers_parameter, kind_parameter, kind_selector_group, node_source_group,
    output_file_parameter, yes_parameter, COMMAND_DELETE, COMMAND_DELETE_ALL, COMMAND_EXPORT,
    COMMAND_GET, COMMAND_LIST, COMMAND_NODES, COMMAND_SYNTHESIZE, COMMAND_UPLOAD,
};
use clap::Command;

/// Create the nodes command with all its subcommands.
pub fn nodes_command() -> Command {
    Command::new(COMMAND_NODES)
        .about("Manage custom node types")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List all custom node types")
                .visible_alias("ls")
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get one custom node type")
                .arg(kind_parameter().required(true))
                .arg(format_parameter())
                .arg(format_pretty_parameter())
                .arg(format_with_headers_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPLOAD)
                .about("Upload a model document or a CSV of custom node types")
                .arg(file_parameter())
                .arg(csv_parameter())
                .group(node_source_group()),
        )
        .subcommand(
            Command::new(COMMAND_SYNTHESIZE)
                .about("Convert a CSV of custom node types into a model document without uploading it")
                .arg(csv_parameter().required(true))
                .arg(output_file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_EXPORT)
                .about("Export custom node types as a model document")
                .arg(kind_parameter())
                .arg(all_parameter())
                .arg(output_file_parameter().required(true))
                .group(kind_selector_group()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete one custom node type")
                .arg(kind_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_DELETE_ALL)
                .about("Delete every custom node type")
                .arg(yes_parameter()),
        )
}
