//! Data models for the BloodHound custom node and saved query resources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::{
    error::ClientError,
    format::{to_json, Formattable, FormattingError, OutputFormat},
};
#[cfg(feature = "csv")]
use crate::format::to_csv;

pub const CUSTOM_NODES_PATH: &str = "/api/v2/custom-nodes";
pub const SAVED_QUERIES_PATH: &str = "/api/v2/saved-queries";
pub const ICON_TYPE_FONT_AWESOME: &str = "font-awesome";

/// The two kinds of remote resources managed by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    NodeType,
    CypherQuery,
}

impl ResourceKind {
    pub fn collection_path(&self) -> &'static str {
        match self {
            ResourceKind::NodeType => CUSTOM_NODES_PATH,
            ResourceKind::CypherQuery => SAVED_QUERIES_PATH,
        }
    }

    /// Name of the field that identifies a single resource of this kind
    pub fn key_field(&self) -> &'static str {
        match self {
            ResourceKind::NodeType => "kindName",
            ResourceKind::CypherQuery => "id",
        }
    }

    /// Human readable name used in log messages
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::NodeType => "custom type",
            ResourceKind::CypherQuery => "saved query",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            ResourceKind::NodeType => "custom types",
            ResourceKind::CypherQuery => "saved queries",
        }
    }

    /// Extract the identifying key from a listed item.
    ///
    /// Numeric ids are rendered as decimal strings. Empty strings count as missing.
    pub fn key_of(&self, item: &Value) -> Option<String> {
        match item.get(self.key_field())? {
            Value::String(key) if !key.trim().is_empty() => Some(key.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

/// Visibility filter for saved queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QueryScope {
    #[default]
    Owned,
    Shared,
    Public,
    All,
}

impl QueryScope {
    pub fn names() -> Vec<&'static str> {
        vec!["owned", "shared", "public", "all"]
    }
}

/// The `{"data": ...}` wrapper the remote API puts around returned resources
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "type", default = "default_icon_type")]
    pub icon_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
}

fn default_icon_type() -> String {
    ICON_TYPE_FONT_AWESOME.to_string()
}

impl Icon {
    pub fn font_awesome(name: impl Into<String>, color: impl Into<String>) -> Icon {
        Icon {
            icon_type: ICON_TYPE_FONT_AWESOME.to_string(),
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeDefinition {
    pub icon: Icon,
}

/// Canonical upload and export payload for node types.
///
/// Kind names are kept in a sorted map so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub custom_types: BTreeMap<String, NodeTypeDefinition>,
}

impl ModelDocument {
    pub fn empty() -> ModelDocument {
        ModelDocument::default()
    }

    /// Insert a definition; an existing entry with the same kind name is replaced.
    pub fn insert(&mut self, kind_name: String, definition: NodeTypeDefinition) {
        self.custom_types.insert(kind_name, definition);
    }

    pub fn kind_names(&self) -> Vec<String> {
        self.custom_types.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.custom_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom_types.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, ClientError> {
        serde_json::to_string_pretty(self).map_err(|e| ClientError::Format(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A custom node type as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomNodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "kindName", default, skip_serializing_if = "Option::is_none")]
    pub kind_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomNodeRecord {
    /// Re-shape the fetched record into a model document entry.
    ///
    /// Fails when `kindName`, `config` or `config.icon` is missing, or the
    /// icon has an empty name or color.
    pub fn to_definition(&self) -> Result<(String, NodeTypeDefinition), ClientError> {
        let kind_name = self
            .kind_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ClientError::Validation("missing 'kindName' in node type".to_string()))?;
        let config = self.config.as_ref().ok_or_else(|| {
            ClientError::Validation(format!("missing 'config' for node type '{}'", kind_name))
        })?;
        let icon = config.icon.as_ref().ok_or_else(|| {
            ClientError::Validation(format!("missing 'config.icon' for node type '{}'", kind_name))
        })?;
        if icon.name.trim().is_empty() || icon.color.trim().is_empty() {
            return Err(ClientError::Validation(format!(
                "icon name and color must not be empty for node type '{}'",
                kind_name
            )));
        }

        Ok((
            kind_name.to_string(),
            NodeTypeDefinition { icon: icon.clone() },
        ))
    }
}

/// A saved Cypher query as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Canonical single-query export and import shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryExport {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub query: String,
}

impl TryFrom<&SavedQuery> for QueryExport {
    type Error = ClientError;

    fn try_from(saved: &SavedQuery) -> Result<Self, Self::Error> {
        let id = saved
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string());
        let name = saved
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ClientError::Validation(format!("missing 'name' for query {}", id)))?;
        let query = saved
            .query
            .clone()
            .filter(|query| !query.trim().is_empty())
            .ok_or_else(|| ClientError::Validation(format!("missing 'query' for query {}", id)))?;

        Ok(QueryExport {
            name,
            description: saved.description.clone().unwrap_or_default(),
            query,
        })
    }
}

impl Formattable for CustomNodeRecord {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        CustomNodeList(vec![self.clone()]).format(f)
    }
}

/// A listing of custom node types as printed by the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct CustomNodeList(pub Vec<CustomNodeRecord>);

impl Formattable for CustomNodeList {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => to_json(&self.0, options),
            #[cfg(feature = "csv")]
            OutputFormat::Csv(options) => {
                let records = self
                    .0
                    .iter()
                    .map(|record| {
                        let icon = record.config.as_ref().and_then(|c| c.icon.as_ref());
                        vec![
                            record.id.map(|id| id.to_string()).unwrap_or_default(),
                            record.kind_name.clone().unwrap_or_default(),
                            icon.map(|i| i.name.clone()).unwrap_or_default(),
                            icon.map(|i| i.color.clone()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                to_csv(&["ID", "KIND_NAME", "ICON_NAME", "COLOR"], records, options)
            }
        }
    }
}

impl Formattable for SavedQuery {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        SavedQueryList(vec![self.clone()]).format(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedQueryList(pub Vec<SavedQuery>);

impl Formattable for SavedQueryList {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        match f {
            OutputFormat::Json(options) => to_json(&self.0, options),
            #[cfg(feature = "csv")]
            OutputFormat::Csv(options) => {
                let records = self
                    .0
                    .iter()
                    .map(|query| {
                        vec![
                            query.id.map(|id| id.to_string()).unwrap_or_default(),
                            query.name.clone().unwrap_or_default(),
                            query.description.clone().unwrap_or_default(),
                            query.query.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                to_csv(&["ID", "NAME", "DESCRIPTION", "QUERY"], records, options)
            }
        }
    }
}

/// Which resources an export covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSelector {
    One(String),
    All,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_key_of_node_type_and_query() {
        let node = json!({"id": 4, "kindName": "Printer"});
        assert_eq!(
            ResourceKind::NodeType.key_of(&node),
            Some("Printer".to_string())
        );
        assert_eq!(
            ResourceKind::CypherQuery.key_of(&json!({"id": 17})),
            Some("17".to_string())
        );
        assert_eq!(ResourceKind::NodeType.key_of(&json!({"id": 4})), None);
        assert_eq!(
            ResourceKind::NodeType.key_of(&json!({"kindName": "  "})),
            None
        );
    }

    #[test]
    fn test_scope_round_trips_through_strum() {
        assert_eq!(QueryScope::from_str("public").unwrap(), QueryScope::Public);
        assert_eq!(QueryScope::default().to_string(), "owned");
        assert!(QueryScope::from_str("everyone").is_err());
    }

    #[test]
    fn test_record_to_definition() {
        let record: CustomNodeRecord = serde_json::from_value(json!({
            "id": 1,
            "kindName": "Printer",
            "config": {"icon": {"type": "font-awesome", "name": "print", "color": "#ff0000"}}
        }))
        .unwrap();
        let (kind_name, definition) = record.to_definition().unwrap();
        assert_eq!(kind_name, "Printer");
        assert_eq!(definition.icon, Icon::font_awesome("print", "#ff0000"));
    }

    #[test]
    fn test_record_without_icon_is_rejected() {
        let record: CustomNodeRecord =
            serde_json::from_value(json!({"kindName": "Printer", "config": {}})).unwrap();
        assert!(matches!(
            record.to_definition(),
            Err(ClientError::Validation(message)) if message.contains("config.icon")
        ));

        let record: CustomNodeRecord =
            serde_json::from_value(json!({"kindName": "Printer"})).unwrap();
        assert!(matches!(
            record.to_definition(),
            Err(ClientError::Validation(message)) if message.contains("'config'")
        ));
    }

    #[test]
    fn test_record_preserves_unknown_fields() {
        let value = json!({"id": 2, "kindName": "Door", "created_at": "2024-01-01"});
        let record: CustomNodeRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_node_list_json_keeps_records() {
        let records: Vec<CustomNodeRecord> = serde_json::from_value(json!([
            {"id": 1, "kindName": "Printer", "config": {"icon": {"type": "font-awesome", "name": "print", "color": "#f00"}}}
        ]))
        .unwrap();
        let output = CustomNodeList(records)
            .format(&OutputFormat::default())
            .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["kindName"], "Printer");
        assert_eq!(value[0]["config"]["icon"]["color"], "#f00");
    }

    #[cfg(feature = "csv")]
    #[test]
    fn test_node_list_csv_columns() {
        use crate::format::OutputFormatOptions;

        let records: Vec<CustomNodeRecord> = serde_json::from_value(json!([
            {"id": 1, "kindName": "Printer", "config": {"icon": {"type": "font-awesome", "name": "print", "color": "#f00"}}},
            {"id": 2, "kindName": "Door"}
        ]))
        .unwrap();
        let format = OutputFormat::Csv(OutputFormatOptions {
            with_headers: true,
            pretty: false,
        });
        assert_eq!(
            CustomNodeList(records).format(&format).unwrap(),
            "ID,KIND_NAME,ICON_NAME,COLOR\n1,Printer,print,#f00\n2,Door,,\n"
        );
    }

    #[test]
    fn test_query_export_requires_name_and_query() {
        let saved = SavedQuery {
            id: Some(3),
            name: Some("Domain admins".to_string()),
            description: None,
            query: Some("MATCH (n) RETURN n".to_string()),
            extra: Map::new(),
        };
        let export = QueryExport::try_from(&saved).unwrap();
        assert_eq!(export.description, "");

        let missing = SavedQuery {
            query: None,
            ..saved
        };
        assert!(QueryExport::try_from(&missing).is_err());
    }
}
