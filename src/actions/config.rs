use clap::{parser::ValueSource, ArgMatches};
use tracing::{info, trace};
use url::Url;

use crate::{
    actions::{output_format, query_scope, CliActionError},
    commands::params::{
        COMMAND_GET, COMMAND_PATH, COMMAND_SET, PARAMETER_SCOPE, PARAMETER_TIMEOUT, PARAMETER_URL,
    },
    configuration::Configuration,
    format::Formattable,
};

pub fn execute(
    configuration: &mut Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_GET, sub_matches)) => {
            trace!("Executing \"config get\" command...");
            let format = output_format(sub_matches)?;
            println!("{}", configuration.format(&format)?);
            Ok(())
        }
        Some((COMMAND_PATH, _)) => {
            let path = Configuration::get_default_configuration_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
        Some((COMMAND_SET, sub_matches)) => set_configuration(configuration, sub_matches),
        Some((name, _)) => Err(CliActionError::UnsupportedSubcommand(name.to_string())),
        None => Err(CliActionError::MissingRequiredArgument("subcommand".to_string())),
    }
}

/// Update the given properties and save the file.
///
/// Only a `--url` typed on the command line is persisted, never one picked
/// up from `HOUNDTRAINER_URL`.
pub fn set_configuration(
    configuration: &mut Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"config set\" command...");
    let mut changed = false;

    if sub_matches.value_source(PARAMETER_URL) == Some(ValueSource::CommandLine) {
        if let Some(url) = sub_matches.get_one::<Url>(PARAMETER_URL) {
            configuration.set_base_url(url.clone());
            changed = true;
        }
    }
    if let Some(timeout) = sub_matches.get_one::<u64>(PARAMETER_TIMEOUT) {
        configuration.set_timeout_secs(*timeout)?;
        changed = true;
    }
    if sub_matches.contains_id(PARAMETER_SCOPE) {
        let scope = query_scope(configuration, sub_matches)?;
        configuration.set_default_scope(scope);
        changed = true;
    }

    if !changed {
        return Err(CliActionError::MissingRequiredArgument(
            "at least one of --url, --timeout or --scope".to_string(),
        ));
    }

    let path = Configuration::get_default_configuration_file_path()?;
    configuration.save(&path)?;
    info!("Saved configuration to {}", path.display());
    Ok(())
}
