use std::path::Path;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    multipart::{Form, Part},
    Body, Method,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::ClientError,
    model::{ExportSelector, QueryExport, QueryScope, ResourceKind, SavedQuery},
    resources::{
        stream_to_file, write_json_atomically, DeleteAllConfirmation, DeleteAllOutcome,
        ResourceClient,
    },
    transport::{RequestBody, ResponseBody},
};

const KIND: ResourceKind = ResourceKind::CypherQuery;
const ZIP_MIME: &str = "application/zip";

pub struct SavedQueries<'a> {
    client: &'a ResourceClient,
}

fn decode_query(value: Value) -> Result<SavedQuery, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::Format(format!("unexpected saved query shape: {}", e)))
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Open the archive once to make sure it is a readable ZIP file
fn check_archive(path: &Path) -> Result<usize, ClientError> {
    let file = std::fs::File::open(path).map_err(|e| ClientError::file_io(path, e))?;
    let archive = zip::ZipArchive::new(file).map_err(|e| {
        ClientError::Format(format!("{} is not a valid ZIP archive: {}", path.display(), e))
    })?;
    Ok(archive.len())
}

fn accept_zip() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ZIP_MIME));
    headers
}

impl<'a> SavedQueries<'a> {
    pub fn new(client: &'a ResourceClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> Result<SavedQuery, ClientError> {
        decode_query(self.client.get(KIND, id).await?)
    }

    pub async fn list(&self, scope: QueryScope) -> Result<Vec<SavedQuery>, ClientError> {
        info!("Listing saved queries ({})...", scope);
        self.client
            .list(KIND, Some(scope))
            .await?
            .into_iter()
            .map(decode_query)
            .collect()
    }

    /// Import queries from a file.
    ///
    /// A `.zip` archive is sent as a multipart upload; anything else is read
    /// as a single JSON query document. `multi` insists on an archive.
    pub async fn upload(&self, path: &Path, multi: bool) -> Result<ResponseBody, ClientError> {
        if is_zip(path) {
            return self.upload_archive(path).await;
        }
        if multi {
            return Err(ClientError::Format(format!(
                "multi-query import needs a .zip archive, got {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| ClientError::file_io(path, e))?;
        let document: Value = serde_json::from_str(&text).map_err(|e| {
            ClientError::Format(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        self.upload_document(&document).await
    }

    pub async fn upload_document(&self, document: &Value) -> Result<ResponseBody, ClientError> {
        let url = self
            .client
            .transport()
            .url(KIND.collection_path(), &["import"])?;
        info!("Uploading saved query...");
        let body = self
            .client
            .transport()
            .send(
                Method::POST,
                url,
                Some(RequestBody::Json(document.clone())),
                None,
            )
            .await?;
        info!("Saved query uploaded successfully.");
        Ok(body)
    }

    async fn upload_archive(&self, path: &Path) -> Result<ResponseBody, ClientError> {
        let entries = check_archive(path)?;
        debug!("{} holds {} entries", path.display(), entries);

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| ClientError::file_io(path, e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| ClientError::file_io(path, e))?
            .len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "queries.zip".to_string());
        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(file_name)
            .mime_str(ZIP_MIME)
            .map_err(|e| ClientError::Format(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = self
            .client
            .transport()
            .url(KIND.collection_path(), &["import"])?;
        info!("Uploading query archive {}...", path.display());
        let body = self
            .client
            .transport()
            .send(Method::POST, url, Some(RequestBody::Multipart(form)), None)
            .await?;
        info!("Query archive uploaded successfully.");
        Ok(body)
    }

    /// Export one query as a JSON document, or every query in `scope` as a
    /// ZIP archive streamed to disk. Returns the number of bytes written.
    pub async fn export(
        &self,
        selector: &ExportSelector,
        scope: QueryScope,
        destination: &Path,
    ) -> Result<u64, ClientError> {
        match selector {
            ExportSelector::One(id) => {
                let saved = self.get(id).await?;
                let export = QueryExport::try_from(&saved)?;
                let written = write_json_atomically(destination, &export)?;
                info!("Exported query {} to {}", id, destination.display());
                Ok(written)
            }
            ExportSelector::All => {
                let mut url = self
                    .client
                    .transport()
                    .url(KIND.collection_path(), &["export"])?;
                url.query_pairs_mut()
                    .append_pair("scope", &scope.to_string());
                self.download(url, destination).await
            }
        }
    }

    /// Stream the server's archive of a single query to disk
    pub async fn export_archive(&self, id: &str, destination: &Path) -> Result<u64, ClientError> {
        let url = self
            .client
            .transport()
            .url(KIND.collection_path(), &[id, "export"])?;
        self.download(url, destination).await
    }

    async fn download(&self, url: url::Url, destination: &Path) -> Result<u64, ClientError> {
        info!("Downloading query archive to {}...", destination.display());
        let response = self
            .client
            .transport()
            .send_streaming(Method::GET, url, None, Some(accept_zip()))
            .await?;
        let written = stream_to_file(response, destination).await?;
        info!("Wrote {} bytes to {}", written, destination.display());
        Ok(written)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        info!("Deleting saved query: {}", id);
        self.client.delete(KIND, id).await
    }

    pub async fn delete_all(
        &self,
        scope: QueryScope,
        confirmation: DeleteAllConfirmation,
    ) -> Result<DeleteAllOutcome, ClientError> {
        self.client.delete_all(KIND, Some(scope), confirmation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::client_for;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_archive(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("query.json", zip::write::FileOptions::default())
            .unwrap();
        writer
            .write_all(br#"{"name": "a", "query": "MATCH (n) RETURN n"}"#)
            .unwrap();
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_export_one_reshapes_query() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/saved-queries/12");
            then.status(200).json_body(json!({"data": {
                "id": 12,
                "name": "Kerberoastable users",
                "query": "MATCH (u:User {hasspn: true}) RETURN u",
                "user_id": "abc"
            }}));
        });

        let client = client_for(&server);
        let directory = tempdir().unwrap();
        let destination = directory.path().join("query.json");
        client
            .saved_queries()
            .export(
                &ExportSelector::One("12".to_string()),
                QueryScope::Owned,
                &destination,
            )
            .await
            .unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&destination).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "name": "Kerberoastable users",
                "description": "",
                "query": "MATCH (u:User {hasspn: true}) RETURN u"
            })
        );
    }

    #[tokio::test]
    async fn test_export_one_without_query_text_fails() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/saved-queries/3");
            then.status(200).json_body(json!({"data": {"id": 3, "name": "empty"}}));
        });

        let client = client_for(&server);
        let directory = tempdir().unwrap();
        let destination = directory.path().join("query.json");
        let result = client
            .saved_queries()
            .export(&ExportSelector::One("3".to_string()), QueryScope::Owned, &destination)
            .await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_export_all_streams_archive() {
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/saved-queries/export")
                .query_param("scope", "public")
                .header("accept", "application/zip");
            then.status(200)
                .header("content-type", "application/zip")
                .body(payload.clone());
        });

        let client = client_for(&server);
        let directory = tempdir().unwrap();
        let destination = directory.path().join("queries.zip");
        let written = client
            .saved_queries()
            .export(&ExportSelector::All, QueryScope::Public, &destination)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&destination).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_failed_archive_export_leaves_no_file() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/saved-queries/9/export");
            then.status(404).body("no such query");
        });

        let client = client_for(&server);
        let directory = tempdir().unwrap();
        let destination = directory.path().join("query.zip");
        let error = client
            .saved_queries()
            .export_archive("9", &destination)
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(404));
        assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_json_posts_to_import() {
        let server = MockServer::start_async().await;
        let document = json!({"name": "a", "description": "", "query": "MATCH (n) RETURN n"});
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/saved-queries/import")
                .json_body(document.clone());
            then.status(201).json_body(json!({"data": {"id": 5}}));
        });

        let directory = tempdir().unwrap();
        let path = directory.path().join("query.json");
        std::fs::write(&path, document.to_string()).unwrap();

        let client = client_for(&server);
        client.saved_queries().upload(&path, false).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_upload_zip_is_sent_as_multipart() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/saved-queries/import")
                .header_includes("content-type", "multipart/form-data")
                .body_includes("name=\"file\"; filename=\"queries.ZIP\"")
                .body_includes("Content-Type: application/zip")
                .body_includes("query.json");
            then.status(201);
        });

        let directory = tempdir().unwrap();
        let path = directory.path().join("queries.ZIP");
        write_archive(&path);

        let client = client_for(&server);
        let body = client.saved_queries().upload(&path, true).await.unwrap();
        mock.assert();
        assert_eq!(body, ResponseBody::NoContent);
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_archives_and_multi_json() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(201);
        });

        let directory = tempdir().unwrap();
        let fake_zip = directory.path().join("queries.zip");
        std::fs::write(&fake_zip, "not an archive").unwrap();
        let json_file = directory.path().join("query.json");
        std::fs::write(&json_file, "{}").unwrap();

        let client = client_for(&server);
        assert!(matches!(
            client.saved_queries().upload(&fake_zip, false).await,
            Err(ClientError::Format(_))
        ));
        assert!(matches!(
            client.saved_queries().upload(&json_file, true).await,
            Err(ClientError::Format(_))
        ));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_delete_all_uses_scope_and_numeric_ids() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/saved-queries")
                .query_param("scope", "shared");
            then.status(200)
                .json_body(json!({"data": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}));
        });
        let first = server.mock(|when, then| {
            when.method(DELETE).path("/api/v2/saved-queries/1");
            then.status(204);
        });
        let second = server.mock(|when, then| {
            when.method(DELETE).path("/api/v2/saved-queries/2");
            then.status(204);
        });

        let client = client_for(&server);
        let outcome = client
            .saved_queries()
            .delete_all(QueryScope::Shared, DeleteAllConfirmation::affirmed())
            .await
            .unwrap();

        first.assert();
        second.assert();
        assert!(matches!(outcome, DeleteAllOutcome::Completed(summary) if summary.succeeded == 2));
    }
}
