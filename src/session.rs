//! Bearer credential handling.
//!
//! A [`Session`] asks its [`TokenSource`] for a token the first time one is
//! needed, checks that it is shaped like a JWT, and hands out the same value
//! for the rest of the process. Nothing is ever written to disk.

use std::fmt;
use std::sync::OnceLock;

use inquire::{Password, PasswordDisplayMode};
use tracing::{debug, trace};

use crate::error::ClientError;

/// Environment variable consulted before falling back to an interactive prompt
pub const TOKEN_ENV_VAR: &str = "HOUNDTRAINER_JWT";

/// A structurally validated bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validate a raw token value.
    ///
    /// Surrounding whitespace is ignored. The token must contain exactly two
    /// '.' separators; the signature is not checked.
    pub fn parse(raw: &str) -> Result<Credential, ClientError> {
        let token = raw.trim();
        if token.matches('.').count() != 2 {
            return Err(ClientError::CredentialFormat);
        }
        Ok(Credential(token.to_string()))
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Where the raw token comes from
pub trait TokenSource: Send + Sync {
    fn obtain(&self) -> Result<String, ClientError>;
}

/// Reads the token from the terminal without echoing it
#[derive(Debug, Default)]
pub struct PromptTokenSource;

impl TokenSource for PromptTokenSource {
    fn obtain(&self) -> Result<String, ClientError> {
        Password::new("Enter JWT:")
            .with_display_mode(PasswordDisplayMode::Hidden)
            .without_confirmation()
            .prompt()
            .map_err(|e| ClientError::CredentialUnavailable(e.to_string()))
    }
}

/// A token supplied up front, e.g. from the environment
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Use [`TOKEN_ENV_VAR`] when it is set and not blank
    pub fn from_env() -> Option<Self> {
        std::env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(Self::new)
    }
}

impl TokenSource for StaticTokenSource {
    fn obtain(&self) -> Result<String, ClientError> {
        Ok(self.token.clone())
    }
}

/// Holds the credential for the lifetime of the process
pub struct Session {
    source: Box<dyn TokenSource>,
    credential: OnceLock<Credential>,
}

impl Session {
    pub fn new(source: Box<dyn TokenSource>) -> Self {
        Self {
            source,
            credential: OnceLock::new(),
        }
    }

    /// Session backed by `HOUNDTRAINER_JWT` if present, otherwise a terminal prompt
    pub fn from_env_or_prompt() -> Self {
        match StaticTokenSource::from_env() {
            Some(source) => {
                debug!("Using bearer token from {}", TOKEN_ENV_VAR);
                Self::new(Box::new(source))
            }
            None => Self::new(Box::new(PromptTokenSource)),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Box::new(StaticTokenSource::new(token)))
    }

    /// Return the memoized credential, obtaining and validating it on first use.
    ///
    /// A malformed token is never memoized.
    pub fn get_token(&self) -> Result<Credential, ClientError> {
        if let Some(credential) = self.credential.get() {
            trace!("Reusing bearer token for this session");
            return Ok(credential.clone());
        }

        let credential = Credential::parse(&self.source.obtain()?)?;
        Ok(self.credential.get_or_init(|| credential).clone())
    }

    pub fn has_token(&self) -> bool {
        self.credential.get().is_some()
    }
}
