use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::provider::ClientProvider;
use crate::types::{
    AppendValuesResponse, BatchGetValuesResponse, BatchUpdateEntry, BatchUpdateValuesResponse,
    UpdateValuesResponse, ValueMatrix, ValueRange,
};

/// The supported spreadsheet operations.
///
/// Each operation obtains a client from the provider and makes exactly one
/// call with it. Errors are returned as produced by the provider or client.
#[derive(Debug, Clone)]
pub struct Operations {
    provider: Arc<dyn ClientProvider>,
}

impl Operations {
    pub fn new(provider: Arc<dyn ClientProvider>) -> Self {
        Operations { provider }
    }

    /// Create a spreadsheet, returning its id.
    pub async fn create(&self, title: Option<&str>) -> Result<String> {
        let client = self.provider.obtain().await?;
        let created = client.create(title).await?;
        info!(spreadsheet_id = %created.spreadsheet_id, "created spreadsheet");
        Ok(created.spreadsheet_id)
    }

    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let client = self.provider.obtain().await?;
        let result = client.get(spreadsheet_id, range).await?;
        info!(spreadsheet_id, range, rows = result.num_rows(), "rows retrieved");
        Ok(result)
    }

    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<UpdateValuesResponse> {
        let client = self.provider.obtain().await?;
        let result = client
            .update(spreadsheet_id, range, value_input_option, values)
            .await?;
        info!(spreadsheet_id, range, cells = result.updated_cells, "cells updated");
        Ok(result)
    }

    pub async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<BatchGetValuesResponse> {
        let client = self.provider.obtain().await?;
        let result = client.batch_get(spreadsheet_id, ranges).await?;
        info!(spreadsheet_id, ranges = result.value_ranges.len(), "ranges retrieved");
        Ok(result)
    }

    pub async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        updates: Vec<BatchUpdateEntry>,
        value_input_option: Option<&str>,
    ) -> Result<BatchUpdateValuesResponse> {
        let client = self.provider.obtain().await?;
        let result = client
            .batch_update(spreadsheet_id, updates, value_input_option)
            .await?;
        info!(spreadsheet_id, cells = result.total_updated_cells, "cells updated");
        Ok(result)
    }

    pub async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<AppendValuesResponse> {
        let client = self.provider.obtain().await?;
        let result = client
            .append(spreadsheet_id, range, value_input_option, values)
            .await?;
        let cells = result.updates.as_ref().and_then(|u| u.updated_cells);
        info!(spreadsheet_id, range, cells, "cells appended");
        Ok(result)
    }
}
