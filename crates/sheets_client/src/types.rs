//! Request and response shapes of the values API.
//!
//! Field names follow the remote's camelCase json. Everything optional on the
//! remote side is optional here too and is left out when serializing. Fields
//! not modeled here are kept in `extra`, so a decoded response re-encodes to
//! what the remote sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single cell. Kept as raw json, cells are never interpreted locally.
pub type Cell = serde_json::Value;

/// Rows of cells.
pub type ValueMatrix = Vec<Vec<Cell>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Absent when the range holds no data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueMatrix>,
    /// Remote fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ValueRange {
    pub fn num_rows(&self) -> usize {
        self.values.as_ref().map(|v| v.len()).unwrap_or(0)
    }
}

/// One range plus the values to write into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdateEntry {
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueMatrix>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSpreadsheet {
    pub spreadsheet_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_columns: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<u64>,
    /// Remote fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetValuesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
    /// Remote fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_updated_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_updated_columns: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_updated_cells: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_updated_sheets: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<UpdateValuesResponse>,
    /// Remote fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    /// The table the values were appended to, absent if the range was empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<UpdateValuesResponse>,
    /// Remote fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SpreadsheetProperties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSpreadsheetRequest<'a> {
    pub properties: SpreadsheetProperties<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValuesBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueMatrix>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchUpdateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_input_option: Option<&'a str>,
    pub data: Vec<BatchUpdateEntry>,
}
