//! Exit codes for the houndtrainer binary
//!
//! This module defines specific exit codes for different error conditions
//! to make scripting and automation easier.

/// Exit codes for houndtrainer
///
/// These codes follow the BSD sysexits.h conventions where possible:
/// - 64-78: Standard exit codes from sysexits.h
/// - 100+: Custom application-specific codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoundExitCode {
    /// Command line usage error (64) - User input error
    UsageError = exitcode::USAGE as isize,

    /// Data format error (65) - Input data was incorrect
    DataError = exitcode::DATAERR as isize,

    /// Addressee unknown (67) - Resource not found
    NotFound = exitcode::NOUSER as isize,

    /// Input/output error (74) - Local file could not be read or written
    IoError = exitcode::IOERR as isize,

    /// Configuration error (78) - Application configuration issue
    ConfigError = exitcode::CONFIG as isize,

    /// Authentication error (100) - Malformed or rejected token
    AuthError = 100,

    /// Network error (101) - Connection or communication issues
    NetworkError = 101,

    /// API error (102) - Remote API returned an error
    ApiError = 102,

    /// Conflict (103) - Kind names already exist on the server
    Conflict = 103,

    /// Cancelled (104) - The user declined a destructive operation
    Cancelled = 104,
}

impl HoundExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            HoundExitCode::UsageError => "Command line usage error",
            HoundExitCode::DataError => "Data format error",
            HoundExitCode::NotFound => "Resource not found",
            HoundExitCode::IoError => "Input/output error",
            HoundExitCode::ConfigError => "Configuration error",
            HoundExitCode::AuthError => "Authentication error",
            HoundExitCode::NetworkError => "Network communication error",
            HoundExitCode::ApiError => "Remote API error",
            HoundExitCode::Conflict => "Kind name conflict",
            HoundExitCode::Cancelled => "Operation cancelled",
        }
    }
}

impl From<HoundExitCode> for i32 {
    fn from(code: HoundExitCode) -> Self {
        code.code()
    }
}
