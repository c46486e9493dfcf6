use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use sheets_client::operations::Operations;
use sheets_client::types::{
    AppendValuesResponse, BatchGetValuesResponse, BatchUpdateEntry, BatchUpdateValuesResponse,
    CreatedSpreadsheet, UpdateValuesResponse, ValueMatrix, ValueRange,
};
use tracing::debug;

use crate::errors::ServerResult;
use crate::extract::{ApiBody, ApiQuery};

pub const GREETING: &str = "hello from sheetsrv!";

/// State that's passed to all handlers.
#[derive(Debug)]
pub struct ServerState {
    /// Performs the spreadsheet operations.
    pub operations: Operations,
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesQuery {
    pub spreadsheet_id: String,
    pub range: String,
}

/// Body shared by the single range writes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteValuesBody {
    pub spreadsheet_id: String,
    pub range: String,
    #[serde(default)]
    pub value_input_option: Option<String>,
    #[serde(default)]
    pub values: Option<ValueMatrix>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetQuery {
    pub spreadsheet_id: String,
    /// Comma separated ranges.
    pub ranges: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateBody {
    pub spreadsheet_id: String,
    pub updates: Vec<BatchUpdateEntry>,
    #[serde(default)]
    pub value_input_option: Option<String>,
}

/// Splits on every comma. Quoted sheet names containing commas are split too.
pub fn split_ranges(ranges: &str) -> Vec<String> {
    ranges.split(',').map(|s| s.to_string()).collect()
}

pub async fn greeting() -> &'static str {
    GREETING
}

pub async fn create(
    State(state): State<Arc<ServerState>>,
    ApiBody(body): ApiBody<CreateBody>,
) -> ServerResult<(StatusCode, Json<CreatedSpreadsheet>)> {
    let spreadsheet_id = state.operations.create(body.title.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(CreatedSpreadsheet { spreadsheet_id })))
}

pub async fn get_values(
    State(state): State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<ValuesQuery>,
) -> ServerResult<Json<ValueRange>> {
    let result = state
        .operations
        .get_values(&query.spreadsheet_id, &query.range)
        .await?;
    Ok(Json(result))
}

pub async fn update_values(
    State(state): State<Arc<ServerState>>,
    ApiBody(body): ApiBody<WriteValuesBody>,
) -> ServerResult<Json<UpdateValuesResponse>> {
    let result = state
        .operations
        .update_values(
            &body.spreadsheet_id,
            &body.range,
            body.value_input_option.as_deref(),
            body.values,
        )
        .await?;
    Ok(Json(result))
}

pub async fn batch_get_values(
    State(state): State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<BatchGetQuery>,
) -> ServerResult<Json<BatchGetValuesResponse>> {
    let ranges = split_ranges(&query.ranges);
    debug!(?ranges, "split ranges");

    let result = state
        .operations
        .batch_get_values(&query.spreadsheet_id, &ranges)
        .await?;
    Ok(Json(result))
}

pub async fn batch_update_values(
    State(state): State<Arc<ServerState>>,
    ApiBody(body): ApiBody<BatchUpdateBody>,
) -> ServerResult<Json<BatchUpdateValuesResponse>> {
    let result = state
        .operations
        .batch_update_values(
            &body.spreadsheet_id,
            body.updates,
            body.value_input_option.as_deref(),
        )
        .await?;
    Ok(Json(result))
}

pub async fn append_values(
    State(state): State<Arc<ServerState>>,
    ApiBody(body): ApiBody<WriteValuesBody>,
) -> ServerResult<(StatusCode, Json<AppendValuesResponse>)> {
    let result = state
        .operations
        .append_values(
            &body.spreadsheet_id,
            &body.range,
            body.value_input_option.as_deref(),
            body.values,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_order() {
        assert_eq!(
            vec!["Sheet1!A1:B2", "Sheet2!A1:A1"],
            split_ranges("Sheet1!A1:B2,Sheet2!A1:A1")
        );
    }

    #[test]
    fn split_is_not_quote_aware() {
        assert_eq!(
            vec!["'a", "b'!A1"],
            split_ranges("'a,b'!A1")
        );
    }

    #[test]
    fn split_single_and_empty() {
        assert_eq!(vec!["Sheet1"], split_ranges("Sheet1"));
        assert_eq!(vec![""], split_ranges(""));
    }
}
