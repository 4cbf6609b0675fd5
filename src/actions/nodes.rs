use std::path::PathBuf;

use clap::ArgMatches;
use tracing::{info, trace, warn};

use crate::{
    actions::{
        confirm_delete_all, output_format, report_delete_all, required_path, required_string,
        resource_client, CliActionError,
    },
    commands::params::{
        COMMAND_DELETE, COMMAND_DELETE_ALL, COMMAND_EXPORT, COMMAND_GET, COMMAND_LIST,
        COMMAND_SYNTHESIZE, COMMAND_UPLOAD, PARAMETER_ALL, PARAMETER_CSV, PARAMETER_FILE,
        PARAMETER_KIND, PARAMETER_OUTPUT,
    },
    configuration::Configuration,
    format::Formattable,
    model::{CustomNodeList, ExportSelector},
    synthesizer::{synthesize_model_from_path, Synthesis},
};

fn warn_skipped(synthesis: &Synthesis) {
    for skipped in &synthesis.skipped {
        warn!("Row {} was skipped: {}", skipped.line, skipped.reason);
    }
}

pub async fn execute(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, sub_matches)) => list_node_types(configuration, sub_matches).await,
        Some((COMMAND_GET, sub_matches)) => get_node_type(configuration, sub_matches).await,
        Some((COMMAND_UPLOAD, sub_matches)) => upload_node_types(configuration, sub_matches).await,
        Some((COMMAND_SYNTHESIZE, sub_matches)) => synthesize_node_types(sub_matches),
        Some((COMMAND_EXPORT, sub_matches)) => export_node_types(configuration, sub_matches).await,
        Some((COMMAND_DELETE, sub_matches)) => delete_node_type(configuration, sub_matches).await,
        Some((COMMAND_DELETE_ALL, sub_matches)) => {
            delete_all_node_types(configuration, sub_matches).await
        }
        Some((name, _)) => Err(CliActionError::UnsupportedSubcommand(name.to_string())),
        None => Err(CliActionError::MissingRequiredArgument("subcommand".to_string())),
    }
}

pub async fn list_node_types(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"nodes list\" command...");
    let format = output_format(sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;

    let records = client.node_types().list().await?;
    if records.is_empty() {
        info!("No custom types found.");
    }
    println!("{}", CustomNodeList(records).format(&format)?);
    Ok(())
}

pub async fn get_node_type(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"nodes get\" command...");
    let kind_name = required_string(sub_matches, PARAMETER_KIND)?;
    let format = output_format(sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;

    let record = client.node_types().get(kind_name).await?;
    println!("{}", record.format(&format)?);
    Ok(())
}

pub async fn upload_node_types(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"nodes upload\" command...");
    let client = resource_client(configuration, sub_matches)?;

    if let Some(csv_path) = sub_matches.get_one::<PathBuf>(PARAMETER_CSV) {
        let synthesis = client.node_types().upload_csv(csv_path).await?;
        warn_skipped(&synthesis);
        println!(
            "Uploaded {} custom type(s): {}",
            synthesis.model.len(),
            synthesis.model.kind_names().join(", ")
        );
        return Ok(());
    }

    let file = required_path(sub_matches, PARAMETER_FILE)?;
    client.node_types().upload_file(file).await?;
    println!("Uploaded {}", file.display());
    Ok(())
}

/// Offline conversion; never contacts the server
pub fn synthesize_node_types(sub_matches: &ArgMatches) -> Result<(), CliActionError> {
    trace!("Executing \"nodes synthesize\" command...");
    let csv_path = required_path(sub_matches, PARAMETER_CSV)?;

    let synthesis = synthesize_model_from_path(csv_path)?;
    warn_skipped(&synthesis);
    let json = synthesis.model.to_json_pretty()?;

    match sub_matches.get_one::<PathBuf>(PARAMETER_OUTPUT) {
        Some(output) => {
            std::fs::write(output, format!("{}\n", json))?;
            info!(
                "Wrote {} custom type(s) to {}",
                synthesis.model.len(),
                output.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub async fn export_node_types(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"nodes export\" command...");
    let output = required_path(sub_matches, PARAMETER_OUTPUT)?;
    let selector = if sub_matches.get_flag(PARAMETER_ALL) {
        ExportSelector::All
    } else {
        ExportSelector::One(required_string(sub_matches, PARAMETER_KIND)?.clone())
    };
    let client = resource_client(configuration, sub_matches)?;

    let model = client.node_types().export(&selector, output).await?;
    println!(
        "Exported {} custom type(s) to {}",
        model.len(),
        output.display()
    );
    Ok(())
}

pub async fn delete_node_type(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"nodes delete\" command...");
    let kind_name = required_string(sub_matches, PARAMETER_KIND)?;
    let client = resource_client(configuration, sub_matches)?;

    client.node_types().delete(kind_name).await?;
    println!("Deleted custom type {}", kind_name);
    Ok(())
}

pub async fn delete_all_node_types(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"nodes delete-all\" command...");
    let client = resource_client(configuration, sub_matches)?;
    let confirmation = confirm_delete_all(sub_matches, "custom types")?;

    let outcome = client.node_types().delete_all(confirmation).await?;
    report_delete_all(outcome, "custom types")
}
