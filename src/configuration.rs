use crate::{
    format::{Formattable, FormattingError, OutputFormat},
    model::QueryScope,
    transport::DEFAULT_TIMEOUT_SECS,
};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;

pub const DEFAULT_APPLICATION_ID: &str = "houndtrainer";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV_VAR: &str = "HOUNDTRAINER_CONFIG_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data to file, because of: {cause}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid value for property {name:?}: {reason}")]
    InvalidPropertyValue { name: String, reason: String },
    #[error("{cause}")]
    FormattingError {
        #[from]
        cause: FormattingError,
    },
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<Url>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    default_scope: QueryScope,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_scope: QueryScope::default(),
        }
    }
}

impl Configuration {
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    pub fn set_base_url(&mut self, base_url: Url) {
        self.base_url = Some(base_url);
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn set_timeout_secs(&mut self, timeout_secs: u64) -> Result<(), ConfigurationError> {
        if timeout_secs == 0 {
            return Err(ConfigurationError::InvalidPropertyValue {
                name: "timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.timeout_secs = timeout_secs;
        Ok(())
    }

    pub fn default_scope(&self) -> QueryScope {
        self.default_scope
    }

    pub fn set_default_scope(&mut self, scope: QueryScope) {
        self.default_scope = scope;
    }

    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        // Check for HOUNDTRAINER_CONFIG_DIR environment variable first
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV_VAR) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        match config_dir() {
            Some(configuration_directory) => {
                let mut default_config_file_path = configuration_directory;
                default_config_file_path.push(DEFAULT_APPLICATION_ID);
                default_config_file_path.push(DEFAULT_CONFIGURATION_FILE_NAME);

                Ok(default_config_file_path)
            }
            None => Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }
    }

    /// Load the default configuration, falling back to defaults when no file exists.
    ///
    /// Nothing is written to disk here; `config set` creates the file.
    pub fn load_or_default() -> Result<Configuration, ConfigurationError> {
        let default_file_path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", default_file_path.display());

        if !default_file_path.exists() {
            debug!("Configuration file not found, using defaults");
            return Ok(Configuration::default());
        }
        Configuration::load_from_file(&default_file_path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        match fs::read_to_string(path) {
            Ok(configuration) => match serde_yaml::from_str(&configuration) {
                Ok(configuration) => Ok(configuration),
                Err(cause) => Err(ConfigurationError::FailedToLoadData {
                    cause: Box::new(cause),
                }),
            },
            Err(cause) => Err(ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            }),
        }
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        // first check if the parent directory exists and try to create it if not
        match path.parent() {
            Some(directory) => {
                // this operation only executes if the directory does not exist
                if fs::create_dir_all(directory).is_err() {
                    return Err(ConfigurationError::FailedToFindConfigurationDirectory);
                }
            }
            None => return Err(ConfigurationError::FailedToFindConfigurationDirectory),
        }

        match File::create(path) {
            Ok(file) => self.write(file),
            Err(e) => Err(ConfigurationError::FailedToWriteData { cause: Box::new(e) }),
        }
    }
}

impl Formattable for Configuration {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => {
                if options.pretty {
                    Ok(serde_json::to_string_pretty(self)?)
                } else {
                    Ok(serde_json::to_string(self)?)
                }
            }
            #[cfg(feature = "csv")]
            OutputFormat::Csv(options) => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                if options.with_headers {
                    wtr.write_record(["BASE_URL", "TIMEOUT_SECS", "DEFAULT_SCOPE"])?;
                }
                wtr.write_record([
                    self.base_url
                        .as_ref()
                        .map(|url| url.to_string())
                        .unwrap_or_default(),
                    self.timeout_secs.to_string(),
                    self.default_scope.to_string(),
                ])?;
                Ok(String::from_utf8(wtr.into_inner()?)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_fields_take_defaults() {
        let configuration: Configuration =
            serde_yaml::from_str("base_url: https://bh.example.com/\n").unwrap();
        assert_eq!(
            configuration.base_url().map(Url::as_str),
            Some("https://bh.example.com/")
        );
        assert_eq!(configuration.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert_eq!(configuration.default_scope(), QueryScope::Owned);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let directory = tempdir().unwrap();
        let path = directory.path().join("nested").join(DEFAULT_CONFIGURATION_FILE_NAME);

        let mut configuration = Configuration::default();
        configuration.set_base_url("https://bh.example.com".parse().unwrap());
        configuration.set_timeout_secs(5).unwrap();
        configuration.set_default_scope(QueryScope::Shared);
        configuration.save(&path).unwrap();

        assert_eq!(Configuration::load_from_file(&path).unwrap(), configuration);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut configuration = Configuration::default();
        assert!(configuration.set_timeout_secs(0).is_err());
        assert_eq!(configuration.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }
}
