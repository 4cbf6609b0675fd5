//! Output formatting for records printed by the CLI.
//!
//! JSON is always available; CSV output is compiled with the `csv` feature.

use std::str::FromStr;

pub const JSON: &str = "json";
#[cfg(feature = "csv")]
pub const CSV: &str = "csv";

/// Error types that can occur during formatting operations
#[derive(Debug, thiserror::Error)]
pub enum FormattingError {
    /// Error when an unsupported output format is requested
    #[error("invalid output format {0}")]
    UnsupportedOutputFormat(String),
    /// Error specific to CSV operations
    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[cfg(feature = "csv")]
    #[error("CSV writer into inner error: {0}")]
    CsvIntoInnerError(#[from] csv::IntoInnerError<csv::Writer<Vec<u8>>>),
    /// Error when converting bytes to UTF-8 string
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFormatOptions {
    pub with_headers: bool,
    pub pretty: bool,
}

/// Enum representing the supported output formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON (JavaScript Object Notation) format
    Json(OutputFormatOptions),
    /// CSV (Comma-Separated Values) format
    #[cfg(feature = "csv")]
    Csv(OutputFormatOptions),
}

impl OutputFormat {
    /// Returns a vector of all supported format names as strings
    pub fn names() -> Vec<&'static str> {
        vec![
            JSON,
            #[cfg(feature = "csv")]
            CSV,
        ]
    }

    pub fn from_string_with_options(
        format_str: &str,
        options: OutputFormatOptions,
    ) -> Result<OutputFormat, FormattingError> {
        let normalized_format = format_str.to_lowercase();
        match normalized_format.as_str() {
            JSON => Ok(OutputFormat::Json(options)),
            #[cfg(feature = "csv")]
            CSV => Ok(OutputFormat::Csv(options)),
            _ => Err(FormattingError::UnsupportedOutputFormat(normalized_format)),
        }
    }

    pub fn options(&self) -> &OutputFormatOptions {
        match self {
            OutputFormat::Json(options) => options,
            #[cfg(feature = "csv")]
            OutputFormat::Csv(options) => options,
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json(OutputFormatOptions::default())
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OutputFormat::Json(_) => write!(f, "{}", JSON),
            #[cfg(feature = "csv")]
            OutputFormat::Csv(_) => write!(f, "{}", CSV),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = FormattingError;

    fn from_str(format_str: &str) -> Result<OutputFormat, FormattingError> {
        Self::from_string_with_options(format_str, OutputFormatOptions::default())
    }
}

pub trait Formattable {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError>;
}

/// Serialize any value as JSON, honoring the `pretty` option
pub fn to_json<T: serde::Serialize + ?Sized>(
    value: &T,
    options: &OutputFormatOptions,
) -> Result<String, FormattingError> {
    if options.pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

/// Write rows to a CSV string, optionally preceded by a header row
#[cfg(feature = "csv")]
pub fn to_csv(
    header: &[&str],
    records: Vec<Vec<String>>,
    options: &OutputFormatOptions,
) -> Result<String, FormattingError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if options.with_headers {
        wtr.write_record(header)?;
    }
    for record in records {
        wtr.write_record(&record)?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_parse() {
        for name in OutputFormat::names() {
            let format = OutputFormat::from_str(name).unwrap();
            assert_eq!(format.to_string(), name);
        }
        assert!(matches!(
            OutputFormat::from_str("tree"),
            Err(FormattingError::UnsupportedOutputFormat(_))
        ));
    }

    #[test]
    fn test_json_respects_pretty() {
        let options = OutputFormatOptions {
            pretty: true,
            ..Default::default()
        };
        let output = to_json(&serde_json::json!({"a": 1}), &options).unwrap();
        assert!(output.contains('\n'));
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_csv_headers_are_optional() {
        let records = vec![vec!["1".to_string(), "Printer".to_string()]];
        let with_headers = OutputFormatOptions {
            with_headers: true,
            ..Default::default()
        };
        assert_eq!(
            to_csv(&["ID", "KIND_NAME"], records.clone(), &with_headers).unwrap(),
            "ID,KIND_NAME\n1,Printer\n"
        );
        assert_eq!(
            to_csv(&["ID", "KIND_NAME"], records, &OutputFormatOptions::default()).unwrap(),
            "1,Printer\n"
        );
    }
}
