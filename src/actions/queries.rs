use clap::ArgMatches;
use tracing::{info, trace};

use crate::{
    actions::{
        confirm_delete_all, output_format, query_scope, report_delete_all, required_path,
        resource_client, CliActionError,
    },
    commands::params::{
        COMMAND_DELETE, COMMAND_DELETE_ALL, COMMAND_EXPORT, COMMAND_GET, COMMAND_LIST,
        COMMAND_UPLOAD, PARAMETER_ALL, PARAMETER_ARCHIVE, PARAMETER_FILE, PARAMETER_ID,
        PARAMETER_MULTI, PARAMETER_OUTPUT,
    },
    configuration::Configuration,
    format::Formattable,
    model::{ExportSelector, SavedQueryList},
};

fn query_id(sub_matches: &ArgMatches) -> Result<String, CliActionError> {
    sub_matches
        .get_one::<i64>(PARAMETER_ID)
        .map(|id| id.to_string())
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_ID.to_string()))
}

pub async fn execute(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, sub_matches)) => list_queries(configuration, sub_matches).await,
        Some((COMMAND_GET, sub_matches)) => get_query(configuration, sub_matches).await,
        Some((COMMAND_UPLOAD, sub_matches)) => upload_queries(configuration, sub_matches).await,
        Some((COMMAND_EXPORT, sub_matches)) => export_queries(configuration, sub_matches).await,
        Some((COMMAND_DELETE, sub_matches)) => delete_query(configuration, sub_matches).await,
        Some((COMMAND_DELETE_ALL, sub_matches)) => {
            delete_all_queries(configuration, sub_matches).await
        }
        Some((name, _)) => Err(CliActionError::UnsupportedSubcommand(name.to_string())),
        None => Err(CliActionError::MissingRequiredArgument("subcommand".to_string())),
    }
}

pub async fn list_queries(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"queries list\" command...");
    let scope = query_scope(configuration, sub_matches)?;
    let format = output_format(sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;

    let queries = client.saved_queries().list(scope).await?;
    if queries.is_empty() {
        info!("No saved queries found.");
    }
    println!("{}", SavedQueryList(queries).format(&format)?);
    Ok(())
}

pub async fn get_query(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"queries get\" command...");
    let id = query_id(sub_matches)?;
    let format = output_format(sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;

    let query = client.saved_queries().get(&id).await?;
    println!("{}", query.format(&format)?);
    Ok(())
}

pub async fn upload_queries(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"queries upload\" command...");
    let file = required_path(sub_matches, PARAMETER_FILE)?;
    let multi = sub_matches.get_flag(PARAMETER_MULTI);
    let client = resource_client(configuration, sub_matches)?;

    client.saved_queries().upload(file, multi).await?;
    println!("Uploaded {}", file.display());
    Ok(())
}

pub async fn export_queries(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"queries export\" command...");
    let output = required_path(sub_matches, PARAMETER_OUTPUT)?;
    let scope = query_scope(configuration, sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;
    let queries = client.saved_queries();

    let written = if sub_matches.get_flag(PARAMETER_ALL) {
        queries
            .export(&ExportSelector::All, scope, output)
            .await?
    } else if sub_matches.get_flag(PARAMETER_ARCHIVE) {
        queries.export_archive(&query_id(sub_matches)?, output).await?
    } else {
        let selector = ExportSelector::One(query_id(sub_matches)?);
        queries.export(&selector, scope, output).await?
    };

    println!("Wrote {} bytes to {}", written, output.display());
    Ok(())
}

pub async fn delete_query(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"queries delete\" command...");
    let id = query_id(sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;

    client.saved_queries().delete(&id).await?;
    println!("Deleted saved query {}", id);
    Ok(())
}

pub async fn delete_all_queries(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"queries delete-all\" command...");
    let scope = query_scope(configuration, sub_matches)?;
    let client = resource_client(configuration, sub_matches)?;
    let confirmation = confirm_delete_all(sub_matches, &format!("{} saved queries", scope))?;

    let outcome = client
        .saved_queries()
        .delete_all(scope, confirmation)
        .await?;
    report_delete_all(outcome, "saved queries")
}
