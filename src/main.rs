use houndtrainer::{
    cli::execute_command,
    commands::{create_cli_commands, PARAMETER_VERBOSE},
    configuration::Configuration,
    exit_codes::HoundExitCode,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let matches = create_cli_commands();

    // Initialize the logging subsystem; RUST_LOG takes precedence over --verbose
    let default_level = if matches.get_flag(PARAMETER_VERBOSE) {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let configuration = match Configuration::load_or_default() {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ::std::process::exit(HoundExitCode::ConfigError.code());
        }
    };

    if let Err(e) = execute_command(configuration, &matches).await {
        let code = e.exit_code();
        debug!("Exiting with {} ({})", code.code(), code.message());
        eprintln!("ERROR: {}", e);
        ::std::process::exit(code.code());
    }
}
