use std::path::Path;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::ClientError,
    model::{CustomNodeRecord, ExportSelector, ModelDocument, ResourceKind},
    resources::{write_json_atomically, DeleteAllConfirmation, DeleteAllOutcome, ResourceClient},
    synthesizer::{synthesize_model_from_path, Synthesis},
    transport::{RequestBody, ResponseBody},
};

const KIND: ResourceKind = ResourceKind::NodeType;

/// Operations on `/api/v2/custom-nodes`
pub struct NodeTypes<'a> {
    client: &'a ResourceClient,
}

fn decode_record(value: Value) -> Result<CustomNodeRecord, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::Format(format!("unexpected custom type shape: {}", e)))
}

/// Kind names of the `custom_types` object of an upload document
fn uploaded_kind_names(document: &Value) -> Result<Vec<String>, ClientError> {
    let custom_types = document
        .as_object()
        .ok_or_else(|| ClientError::Validation("model document must be a JSON object".to_string()))?
        .get("custom_types")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            ClientError::Validation("model document must contain a 'custom_types' object".to_string())
        })?;
    Ok(custom_types.keys().cloned().collect())
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether `name` occurs in `text` as a whole word, so `Print` is not found
/// inside `Printer`
fn mentions(text: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    text.match_indices(name).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + name.len()..].chars().next();
        !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
    })
}

/// Map a 409 response to a conflict naming the colliding kinds.
///
/// The server body is searched for the uploaded kind names as whole words;
/// when none of them appear every uploaded name is reported.
fn conflict_from(status: u16, body: String, uploaded: Vec<String>) -> ClientError {
    if status != 409 {
        return ClientError::Http { status, body };
    }
    let mentioned: Vec<String> = uploaded
        .iter()
        .filter(|name| mentions(&body, name))
        .cloned()
        .collect();
    ClientError::Conflict {
        names: if mentioned.is_empty() {
            uploaded
        } else {
            mentioned
        },
        detail: body,
    }
}

impl<'a> NodeTypes<'a> {
    pub fn new(client: &'a ResourceClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, kind_name: &str) -> Result<CustomNodeRecord, ClientError> {
        decode_record(self.client.get(KIND, kind_name).await?)
    }

    pub async fn list(&self) -> Result<Vec<CustomNodeRecord>, ClientError> {
        info!("Listing custom types...");
        self.client
            .list(KIND, None)
            .await?
            .into_iter()
            .map(decode_record)
            .collect()
    }

    /// Upload a model document. Existing kind names are not replaced: the
    /// server answers 409 and the result is [`ClientError::Conflict`].
    pub async fn upload(&self, document: &Value) -> Result<ResponseBody, ClientError> {
        let names = uploaded_kind_names(document)?;
        debug!("Uploading kind names: {}", names.join(", "));

        info!("Uploading model...");
        let url = self.client.transport().url(KIND.collection_path(), &[])?;
        let result = self
            .client
            .transport()
            .send(
                Method::POST,
                url,
                Some(RequestBody::Json(document.clone())),
                None,
            )
            .await;

        match result {
            Ok(body) => {
                info!("Model uploaded successfully.");
                Ok(body)
            }
            Err(ClientError::Http { status, body }) => Err(conflict_from(status, body, names)),
            Err(e) => Err(e),
        }
    }

    pub async fn upload_model(&self, model: &ModelDocument) -> Result<ResponseBody, ClientError> {
        let document = serde_json::to_value(model).map_err(|e| ClientError::Format(e.to_string()))?;
        self.upload(&document).await
    }

    /// Upload a model document read from a JSON file
    pub async fn upload_file(&self, path: &Path) -> Result<ResponseBody, ClientError> {
        let text = std::fs::read_to_string(path).map_err(|e| ClientError::file_io(path, e))?;
        let document: Value = serde_json::from_str(&text).map_err(|e| {
            ClientError::Format(format!("{} is not valid JSON: {}", path.display(), e))
        })?;
        self.upload(&document).await
    }

    /// Synthesize a model from a CSV file and upload it
    pub async fn upload_csv(&self, path: &Path) -> Result<Synthesis, ClientError> {
        let synthesis = synthesize_model_from_path(path)?;
        if synthesis.model.is_empty() {
            return Err(ClientError::Validation(format!(
                "{} contains no complete rows",
                path.display()
            )));
        }
        self.upload_model(&synthesis.model).await?;
        Ok(synthesis)
    }

    /// Export one or all custom types as a model document.
    ///
    /// Every record is validated before anything is written, so an invalid
    /// record leaves the destination untouched.
    pub async fn export(
        &self,
        selector: &ExportSelector,
        destination: &Path,
    ) -> Result<ModelDocument, ClientError> {
        let records = match selector {
            ExportSelector::One(kind_name) => vec![self.get(kind_name).await?],
            ExportSelector::All => self.list().await?,
        };

        let mut model = ModelDocument::empty();
        for record in &records {
            let (kind_name, definition) = record.to_definition()?;
            model.insert(kind_name, definition);
        }

        write_json_atomically(destination, &model)?;
        info!(
            "Exported {} custom type(s) to {}",
            model.len(),
            destination.display()
        );
        Ok(model)
    }

    pub async fn delete(&self, kind_name: &str) -> Result<(), ClientError> {
        info!("Deleting custom type: {}", kind_name);
        self.client.delete(KIND, kind_name).await
    }

    pub async fn delete_all(
        &self,
        confirmation: DeleteAllConfirmation,
    ) -> Result<DeleteAllOutcome, ClientError> {
        self.client.delete_all(KIND, None, confirmation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Icon;
    use crate::resources::test_support::client_for;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(id: i64, kind_name: &str, icon: &str, color: &str) -> Value {
        json!({
            "id": id,
            "kindName": kind_name,
            "config": {"icon": {"type": "font-awesome", "name": icon, "color": color}}
        })
    }

    #[tokio::test]
    async fn test_upload_conflict_names_colliding_kinds() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/custom-nodes");
            then.status(409)
                .body("kind Printer already exists");
        });

        let client = client_for(&server);
        let document = json!({"custom_types": {
            "Printer": {"icon": {"type": "font-awesome", "name": "print", "color": "#f00"}},
            "Scanner": {"icon": {"type": "font-awesome", "name": "barcode", "color": "#0f0"}}
        }});

        match client.node_types().upload(&document).await {
            Err(ClientError::Conflict { names, detail }) => {
                assert_eq!(names, vec!["Printer"]);
                assert_eq!(detail, "kind Printer already exists");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_conflict_ignores_names_inside_longer_names() {
        let error = conflict_from(
            409,
            "kind Printer already exists".to_string(),
            vec!["Print".to_string(), "Printer".to_string()],
        );
        assert!(matches!(error, ClientError::Conflict { ref names, .. } if names == &vec!["Printer".to_string()]));

        assert!(mentions("'Print' already exists", "Print"));
        assert!(!mentions("Printers exist", "Printer"));
        assert!(!mentions("BluePrinter exists", "Printer"));
    }

    #[tokio::test]
    async fn test_conflict_without_names_reports_all_uploaded() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/custom-nodes");
            then.status(409).json_body(json!({"errors": [{"message": "duplicate"}]}));
        });

        let client = client_for(&server);
        let mut model = ModelDocument::empty();
        model.insert(
            "Door".to_string(),
            crate::model::NodeTypeDefinition {
                icon: Icon::font_awesome("door-open", "#123"),
            },
        );

        let error = client.node_types().upload_model(&model).await.unwrap_err();
        assert!(matches!(error, ClientError::Conflict { ref names, .. } if names == &vec!["Door".to_string()]));
    }

    #[tokio::test]
    async fn test_plain_text_created_is_success() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/v2/custom-nodes");
            then.status(201)
                .header("content-type", "text/plain")
                .body("Created");
        });

        let client = client_for(&server);
        let document = json!({"custom_types": {
            "Printer": {"icon": {"type": "font-awesome", "name": "print", "color": "#f00"}}
        }});

        let body = client.node_types().upload(&document).await.unwrap();
        mock.assert();
        assert_eq!(body, ResponseBody::Text("Created".to_string()));
    }

    #[tokio::test]
    async fn test_upload_rejects_document_without_custom_types() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(201);
        });

        let client = client_for(&server);
        let result = client.node_types().upload(&json!({"types": {}})).await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_export_all_keys_match_listing() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/custom-nodes");
            then.status(200).json_body(json!({"data": [
                record(1, "Printer", "print", "#ff0000"),
                record(2, "Scanner", "barcode", "#00ff00")
            ]}));
        });

        let client = client_for(&server);
        let directory = tempdir().unwrap();
        let destination = directory.path().join("model.json");
        let model = client
            .node_types()
            .export(&ExportSelector::All, &destination)
            .await
            .unwrap();

        assert_eq!(model.kind_names(), vec!["Printer", "Scanner"]);
        let written: ModelDocument =
            serde_json::from_str(&std::fs::read_to_string(&destination).unwrap()).unwrap();
        assert_eq!(written, model);
    }

    #[tokio::test]
    async fn test_export_with_invalid_record_writes_nothing() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/custom-nodes");
            then.status(200).json_body(json!({"data": [
                record(1, "Printer", "print", "#ff0000"),
                {"id": 2, "kindName": "Broken", "config": {}}
            ]}));
        });

        let client = client_for(&server);
        let directory = tempdir().unwrap();
        let destination = directory.path().join("model.json");
        let result = client
            .node_types()
            .export(&ExportSelector::All, &destination)
            .await;

        assert!(matches!(result, Err(ClientError::Validation(_))));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_csv_upload_then_export_keeps_icon() {
        let server = MockServer::start_async().await;
        let upload = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/custom-nodes")
                .json_body(json!({"custom_types": {
                    "Printer": {"icon": {"type": "font-awesome", "name": "printer-alt", "color": "#00ff00"}}
                }}));
            then.status(201).json_body(json!({"data": [{"id": 7, "kindName": "Printer"}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/custom-nodes/Printer");
            then.status(200)
                .json_body(json!({"data": record(7, "Printer", "printer-alt", "#00ff00")}));
        });

        let directory = tempdir().unwrap();
        let csv_path = directory.path().join("types.csv");
        std::fs::write(
            &csv_path,
            "Kind Name,Icon Name,Color\nPrinter,print,#ff0000\nPrinter,printer-alt,#00ff00\n",
        )
        .unwrap();

        let client = client_for(&server);
        let synthesis = client.node_types().upload_csv(&csv_path).await.unwrap();
        upload.assert();
        assert_eq!(synthesis.model.len(), 1);

        let destination = directory.path().join("printer.json");
        let exported = client
            .node_types()
            .export(&ExportSelector::One("Printer".to_string()), &destination)
            .await
            .unwrap();
        assert_eq!(exported, synthesis.model);
    }
}
