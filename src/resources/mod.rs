//! Resource client for custom node types and saved Cypher queries.
//!
//! [`ResourceClient`] holds the [`Transport`] and implements the operations
//! shared by both resource kinds. Kind specific behavior (uploads and exports)
//! lives in [`node_types`] and [`saved_queries`].

use std::io::Write;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Response;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    model::{Envelope, QueryScope, ResourceKind},
    transport::Transport,
};

pub mod node_types;
pub mod saved_queries;

pub use node_types::NodeTypes;
pub use saved_queries::SavedQueries;

/// Buffer size used when streaming archives to disk
pub const STREAM_BUFFER_SIZE: usize = 8 * 1024;

/// Proof that the user explicitly agreed to delete every resource of a kind.
///
/// The only constructor is [`DeleteAllConfirmation::affirmed`], which the CLI
/// calls after an affirmative prompt answer or `--yes`.
#[derive(Debug)]
pub struct DeleteAllConfirmation {
    _private: (),
}

impl DeleteAllConfirmation {
    pub fn affirmed() -> Self {
        Self { _private: () }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub key: String,
    pub error: String,
}

/// Per-item results of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: Vec<BulkFailure>,
    /// Listed items without a usable key
    pub skipped: usize,
}

impl BulkSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteAllOutcome {
    NothingToDelete,
    Completed(BulkSummary),
}

pub struct ResourceClient {
    transport: Transport,
}

impl ResourceClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn node_types(&self) -> NodeTypes<'_> {
        NodeTypes::new(self)
    }

    pub fn saved_queries(&self) -> SavedQueries<'_> {
        SavedQueries::new(self)
    }

    /// Fetch one resource and return the `data` of its envelope.
    ///
    /// Any failure other than a credential failure is reported as
    /// [`ClientError::NotFound`].
    pub async fn get(&self, kind: ResourceKind, key: &str) -> Result<Value, ClientError> {
        let not_found = |cause: String| ClientError::NotFound {
            kind,
            key: key.to_string(),
            cause,
        };

        let url = self.transport.url(kind.collection_path(), &[key])?;
        let body = match self.transport.get(url).await {
            Ok(body) => body,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => return Err(not_found(e.to_string())),
        };

        let envelope = match body.decode::<Envelope<Value>>() {
            Ok(envelope) => envelope,
            Err(e) => return Err(not_found(e.to_string())),
        };
        match envelope.and_then(|envelope| envelope.data) {
            Some(Value::Null) | None => Err(not_found("response contains no data".to_string())),
            Some(data) => Ok(data),
        }
    }

    /// List the resources of a kind. The scope only applies to saved queries.
    pub async fn list(
        &self,
        kind: ResourceKind,
        scope: Option<QueryScope>,
    ) -> Result<Vec<Value>, ClientError> {
        let mut url = self.transport.url(kind.collection_path(), &[])?;
        if kind == ResourceKind::CypherQuery {
            url.query_pairs_mut()
                .append_pair("scope", &scope.unwrap_or_default().to_string());
        }

        let body = self.transport.get(url).await?;
        let items = body
            .decode::<Envelope<Value>>()?
            .and_then(|envelope| envelope.data)
            .unwrap_or(Value::Null);

        match items {
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(ClientError::Format(format!(
                "expected a list of {}, got {}",
                kind.plural_label(),
                other
            ))),
        }
    }

    pub async fn delete(&self, kind: ResourceKind, key: &str) -> Result<(), ClientError> {
        let url = self.transport.url(kind.collection_path(), &[key])?;
        self.transport.delete(url).await?;
        Ok(())
    }

    /// Delete every listed resource of a kind, one at a time.
    ///
    /// A failed delete is logged and recorded; the remaining items are still
    /// attempted. Nothing is rolled back.
    pub async fn delete_all(
        &self,
        kind: ResourceKind,
        scope: Option<QueryScope>,
        _confirmation: DeleteAllConfirmation,
    ) -> Result<DeleteAllOutcome, ClientError> {
        let items = self.list(kind, scope).await?;
        if items.is_empty() {
            info!("No {} found.", kind.plural_label());
            return Ok(DeleteAllOutcome::NothingToDelete);
        }

        let mut summary = BulkSummary::default();
        for item in &items {
            let Some(key) = kind.key_of(item) else {
                warn!("Missing '{}' for item {}, skipping.", kind.key_field(), item);
                summary.skipped += 1;
                continue;
            };

            summary.attempted += 1;
            info!("Deleting {}: {}", kind.label(), key);
            match self.delete(kind, &key).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!("Failed to delete {} {}: {}", kind.label(), key, e);
                    summary.failed.push(BulkFailure {
                        key,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(DeleteAllOutcome::Completed(summary))
    }
}

fn destination_directory(destination: &Path) -> PathBuf {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn temporary_file_for(destination: &Path) -> Result<NamedTempFile, ClientError> {
    let directory = destination_directory(destination);
    NamedTempFile::new_in(&directory).map_err(|e| ClientError::file_io(directory, e))
}

/// Write pretty JSON to `destination` through a temporary file in the same
/// directory, so a failed write never leaves a partial file behind.
pub(crate) fn write_json_atomically<T: Serialize + ?Sized>(
    destination: &Path,
    value: &T,
) -> Result<u64, ClientError> {
    let mut json =
        serde_json::to_string_pretty(value).map_err(|e| ClientError::Format(e.to_string()))?;
    json.push('\n');

    let mut temporary = temporary_file_for(destination)?;
    temporary
        .write_all(json.as_bytes())
        .and_then(|_| temporary.flush())
        .map_err(|e| ClientError::file_io(destination, e))?;
    temporary
        .persist(destination)
        .map_err(|e| ClientError::file_io(destination, e.error))?;

    debug!("Wrote {} bytes to {}", json.len(), destination.display());
    Ok(json.len() as u64)
}

/// Stream a response body to `destination` without holding it in memory
pub(crate) async fn stream_to_file(
    response: Response,
    destination: &Path,
) -> Result<u64, ClientError> {
    let temporary = temporary_file_for(destination)?;
    let file = temporary
        .as_file()
        .try_clone()
        .map_err(|e| ClientError::file_io(temporary.path(), e))?;
    let mut writer = BufWriter::with_capacity(STREAM_BUFFER_SIZE, tokio::fs::File::from_std(file));

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ClientError::Network)?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| ClientError::file_io(destination, e))?;
        written += chunk.len() as u64;
    }
    writer
        .flush()
        .await
        .map_err(|e| ClientError::file_io(destination, e))?;
    drop(writer);

    temporary
        .persist(destination)
        .map_err(|e| ClientError::file_io(destination, e.error))?;
    debug!("Streamed {} bytes to {}", written, destination.display());
    Ok(written)
}
