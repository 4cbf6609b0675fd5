//! Builds node type model documents from a table of kind names and icons.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    model::{Icon, ModelDocument, NodeTypeDefinition},
    tabular::{open_source, TabularSource},
};

pub const COLUMN_KIND_NAME: &str = "Kind Name";
pub const COLUMN_ICON_NAME: &str = "Icon Name";
pub const COLUMN_COLOR: &str = "Color";

/// A data row left out of the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub model: ModelDocument,
    pub skipped: Vec<SkippedRow>,
}

/// Convert a table into a model document.
///
/// Each row needs non-empty `Kind Name`, `Icon Name` and `Color` values
/// after trimming; rows that lack any of them are skipped and reported.
/// When several rows share a kind name the last one wins.
pub fn synthesize_model(source: &mut dyn TabularSource) -> Result<Synthesis, ClientError> {
    let table = source.read_table()?;

    let columns = [COLUMN_KIND_NAME, COLUMN_ICON_NAME, COLUMN_COLOR];
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|column| table.column(column).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ClientError::Validation(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }
    let indexes: Vec<usize> = columns
        .iter()
        .filter_map(|column| table.column(column))
        .collect();

    let mut model = ModelDocument::empty();
    let mut skipped = Vec::new();

    for row in &table.rows {
        let values: Vec<&str> = indexes
            .iter()
            .map(|index| row.fields.get(*index).map(|v| v.trim()).unwrap_or(""))
            .collect();

        let empty: Vec<&str> = columns
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_empty())
            .map(|(column, _)| *column)
            .collect();
        if !empty.is_empty() {
            let reason = format!("empty {}", empty.join(", "));
            warn!("Skipping row at line {}: {}", row.line, reason);
            skipped.push(SkippedRow {
                line: row.line,
                reason,
            });
            continue;
        }

        let (kind_name, icon_name, color) = (values[0], values[1], values[2]);
        if model.custom_types.contains_key(kind_name) {
            debug!(
                "Kind '{}' at line {} replaces an earlier definition",
                kind_name, row.line
            );
        }
        model.insert(
            kind_name.to_string(),
            NodeTypeDefinition {
                icon: Icon::font_awesome(icon_name, color),
            },
        );
    }

    info!(
        "Synthesized {} node type(s), skipped {} row(s)",
        model.len(),
        skipped.len()
    );
    Ok(Synthesis { model, skipped })
}

pub fn synthesize_model_from_path(path: &Path) -> Result<Synthesis, ClientError> {
    let mut source = open_source(path)?;
    synthesize_model(source.as_mut())
}
