use std::fmt::Debug;

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{
    AppendValuesResponse, BatchGetValuesResponse, BatchUpdateEntry, BatchUpdateValuesResponse,
    CreatedSpreadsheet, UpdateValuesResponse, ValueMatrix, ValueRange,
};

/// An authenticated handle to a spreadsheet service.
///
/// Every method is exactly one remote call. Ranges and value input options
/// are forwarded as given, interpreting them is up to the implementation.
#[async_trait]
pub trait SpreadsheetClient: Debug + Send + Sync {
    /// Create a new spreadsheet.
    async fn create(&self, title: Option<&str>) -> Result<CreatedSpreadsheet>;

    /// Read the values in one range.
    async fn get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange>;

    /// Overwrite the values in one range.
    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<UpdateValuesResponse>;

    /// Read several ranges at once. Results are in the order of `ranges`.
    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<BatchGetValuesResponse>;

    /// Overwrite several ranges at once.
    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: Vec<BatchUpdateEntry>,
        value_input_option: Option<&str>,
    ) -> Result<BatchUpdateValuesResponse>;

    /// Append rows after the last populated row of the table in `range`.
    async fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<AppendValuesResponse>;
}
