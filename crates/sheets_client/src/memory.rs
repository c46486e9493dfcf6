//! An in-process spreadsheet service.
//!
//! Ranges are opaque keys here: a value matrix written to a range can be read
//! back from exactly that range string, and appends extend the matrix stored
//! under the given range. No A1 arithmetic is done.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::errors::{Result, SheetsError};
use crate::spreadsheet::SpreadsheetClient;
use crate::types::{
    AppendValuesResponse, BatchGetValuesResponse, BatchUpdateEntry, BatchUpdateValuesResponse,
    CreatedSpreadsheet, UpdateValuesResponse, ValueMatrix, ValueRange,
};

const NOT_FOUND_MESSAGE: &str = "Requested entity was not found.";

#[derive(Debug, Default)]
struct MemorySpreadsheet {
    title: String,
    ranges: HashMap<String, ValueMatrix>,
}

#[derive(Debug, Default)]
struct MemoryState {
    created: u64,
    /// Ids handed out by `create` before falling back to generated ones.
    assigned_ids: VecDeque<String>,
    spreadsheets: HashMap<String, MemorySpreadsheet>,
}

#[derive(Debug, Default)]
pub struct MemorySpreadsheets {
    state: Mutex<MemoryState>,
}

impl MemorySpreadsheets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these ids, in order, for the next spreadsheets created.
    pub fn with_assigned_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .assigned_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add an existing, empty spreadsheet.
    pub fn with_spreadsheet(self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.state.lock().spreadsheets.insert(
            id.into(),
            MemorySpreadsheet {
                title: title.into(),
                ..Default::default()
            },
        );
        self
    }

    /// Title of a spreadsheet, if it exists.
    pub fn title(&self, spreadsheet_id: &str) -> Option<String> {
        self.state
            .lock()
            .spreadsheets
            .get(spreadsheet_id)
            .map(|s| s.title.clone())
    }
}

impl MemoryState {
    fn spreadsheet_mut(&mut self, spreadsheet_id: &str) -> Result<&mut MemorySpreadsheet> {
        self.spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| SheetsError::upstream(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE))
    }

    fn spreadsheet(&self, spreadsheet_id: &str) -> Result<&MemorySpreadsheet> {
        self.spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| SheetsError::upstream(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE))
    }
}

impl MemorySpreadsheet {
    fn read(&self, range: &str) -> ValueRange {
        ValueRange {
            range: Some(range.to_string()),
            major_dimension: Some("ROWS".to_string()),
            values: self.ranges.get(range).filter(|v| !v.is_empty()).cloned(),
            ..Default::default()
        }
    }

    fn write(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
        values: Option<ValueMatrix>,
    ) -> UpdateValuesResponse {
        let values = values.unwrap_or_default();
        let resp = update_counts(spreadsheet_id, range, &values);
        self.ranges.insert(range.to_string(), values);
        resp
    }
}

fn update_counts(spreadsheet_id: &str, range: &str, values: &ValueMatrix) -> UpdateValuesResponse {
    UpdateValuesResponse {
        spreadsheet_id: Some(spreadsheet_id.to_string()),
        updated_range: Some(range.to_string()),
        updated_rows: Some(values.len() as u64),
        updated_columns: Some(values.iter().map(|row| row.len()).max().unwrap_or(0) as u64),
        updated_cells: Some(values.iter().map(|row| row.len() as u64).sum()),
        ..Default::default()
    }
}

#[async_trait]
impl SpreadsheetClient for MemorySpreadsheets {
    async fn create(&self, title: Option<&str>) -> Result<CreatedSpreadsheet> {
        let mut state = self.state.lock();
        state.created += 1;
        let id = match state.assigned_ids.pop_front() {
            Some(id) => id,
            None => format!("memory-{:06}", state.created),
        };
        state.spreadsheets.insert(
            id.clone(),
            MemorySpreadsheet {
                title: title.unwrap_or("Untitled spreadsheet").to_string(),
                ..Default::default()
            },
        );

        Ok(CreatedSpreadsheet { spreadsheet_id: id })
    }

    async fn get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let state = self.state.lock();
        Ok(state.spreadsheet(spreadsheet_id)?.read(range))
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        _value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<UpdateValuesResponse> {
        let mut state = self.state.lock();
        let sheet = state.spreadsheet_mut(spreadsheet_id)?;
        Ok(sheet.write(spreadsheet_id, range, values))
    }

    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<BatchGetValuesResponse> {
        let state = self.state.lock();
        let sheet = state.spreadsheet(spreadsheet_id)?;

        Ok(BatchGetValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            value_ranges: ranges.iter().map(|range| sheet.read(range)).collect(),
            ..Default::default()
        })
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: Vec<BatchUpdateEntry>,
        _value_input_option: Option<&str>,
    ) -> Result<BatchUpdateValuesResponse> {
        let mut state = self.state.lock();
        let sheet = state.spreadsheet_mut(spreadsheet_id)?;

        let responses: Vec<_> = updates
            .into_iter()
            .map(|entry| sheet.write(spreadsheet_id, &entry.range, entry.values))
            .collect();
        let total = |f: fn(&UpdateValuesResponse) -> Option<u64>| {
            Some(responses.iter().filter_map(f).sum::<u64>())
        };

        Ok(BatchUpdateValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            total_updated_rows: total(|r| r.updated_rows),
            total_updated_columns: total(|r| r.updated_columns),
            total_updated_cells: total(|r| r.updated_cells),
            // Every range is treated as its own sheet.
            total_updated_sheets: Some(responses.len() as u64),
            responses,
            ..Default::default()
        })
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        _value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<AppendValuesResponse> {
        let mut state = self.state.lock();
        let sheet = state.spreadsheet_mut(spreadsheet_id)?;

        let values = values.unwrap_or_default();
        let updates = update_counts(spreadsheet_id, range, &values);

        let table = sheet.ranges.entry(range.to_string()).or_default();
        let table_range = (!table.is_empty()).then(|| range.to_string());
        table.extend(values);

        Ok(AppendValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            table_range,
            updates: Some(updates),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(cells: &[&str]) -> Vec<serde_json::Value> {
        cells.iter().map(|c| json!(c)).collect()
    }

    #[tokio::test]
    async fn create_uses_assigned_then_generated_ids() {
        let sheets = MemorySpreadsheets::new().with_assigned_ids(["abc123"]);
        let first = sheets.create(Some("Demo")).await.unwrap();
        let second = sheets.create(None).await.unwrap();

        assert_eq!("abc123", first.spreadsheet_id);
        assert_eq!("memory-000002", second.spreadsheet_id);
        assert_eq!(Some("Demo".to_string()), sheets.title("abc123"));
        assert_eq!(
            Some("Untitled spreadsheet".to_string()),
            sheets.title("memory-000002")
        );
    }

    #[tokio::test]
    async fn unknown_spreadsheet_is_not_found() {
        let sheets = MemorySpreadsheets::new();
        let err = sheets.get("missing", "Sheet1").await.unwrap_err();
        match err {
            SheetsError::Upstream { status, .. } => assert_eq!(StatusCode::NOT_FOUND, status),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn update_counts_cells() {
        let sheets = MemorySpreadsheets::new().with_spreadsheet("sid", "Demo");
        let resp = sheets
            .update(
                "sid",
                "Sheet1!A1:B3",
                Some("RAW"),
                Some(vec![row(&["Name", "Age"]), row(&["messi", "35"]), row(&["x"])]),
            )
            .await
            .unwrap();

        assert_eq!(Some(3), resp.updated_rows);
        assert_eq!(Some(2), resp.updated_columns);
        assert_eq!(Some(5), resp.updated_cells);
    }

    #[tokio::test]
    async fn append_to_empty_range_has_no_table() {
        let sheets = MemorySpreadsheets::new().with_spreadsheet("sid", "Demo");
        let first = sheets
            .append("sid", "Sheet1", None, Some(vec![row(&["a"])]))
            .await
            .unwrap();
        let second = sheets
            .append("sid", "Sheet1", None, Some(vec![row(&["b"])]))
            .await
            .unwrap();

        assert_eq!(None, first.table_range);
        assert_eq!(Some("Sheet1".to_string()), second.table_range);
        assert_eq!(2, sheets.get("sid", "Sheet1").await.unwrap().num_rows());
    }

    #[tokio::test]
    async fn batch_update_totals() {
        let sheets = MemorySpreadsheets::new().with_spreadsheet("sid", "Demo");
        let resp = sheets
            .batch_update(
                "sid",
                vec![
                    BatchUpdateEntry {
                        range: "Sheet1!A1:B2".to_string(),
                        values: Some(vec![row(&["Name", "Age"]), row(&["messi", "35"])]),
                    },
                    BatchUpdateEntry {
                        range: "Sheet2!A1:B3".to_string(),
                        values: Some(vec![
                            row(&["Header1", "Header2"]),
                            row(&["Value1", "Value2"]),
                            row(&["Value3", "Value4"]),
                        ]),
                    },
                ],
                Some("USER_ENTERED"),
            )
            .await
            .unwrap();

        assert_eq!(Some(10), resp.total_updated_cells);
        assert_eq!(Some(5), resp.total_updated_rows);
        assert_eq!(2, resp.responses.len());
    }
}
