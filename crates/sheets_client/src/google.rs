//! Google Sheets v4 over REST.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::{HttpClient, HttpResponse, fallback_message, read_body, set_json_body};
use crate::errors::{Result, SheetsError};
use crate::spreadsheet::SpreadsheetClient;
use crate::types::{
    AppendValuesResponse, BatchGetValuesResponse, BatchUpdateEntry, BatchUpdateRequest,
    BatchUpdateValuesResponse, CreateSpreadsheetRequest, CreatedSpreadsheet,
    SpreadsheetProperties, UpdateValuesResponse, ValueMatrix, ValueRange, ValuesBody,
};

pub const DEFAULT_ENDPOINT: &str = "https://sheets.googleapis.com/";

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Client for a single access token.
///
/// `endpoint` is the api root and should end with a '/'.
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient<C> {
    client: C,
    endpoint: Url,
    authorization: HeaderValue,
}

impl<C> GoogleSheetsClient<C>
where
    C: HttpClient,
{
    pub fn new(client: C, endpoint: Url, access_token: &str) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|_| {
                SheetsError::InvalidCredentials(
                    "Access token is not a valid header value".to_string(),
                )
            })?;
        authorization.set_sensitive(true);

        Ok(GoogleSheetsClient {
            client,
            endpoint,
            authorization,
        })
    }

    /// `{endpoint}/v4/spreadsheets/{segments...}`, each segment percent
    /// encoded.
    fn spreadsheets_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.endpoint.join("v4/spreadsheets")?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| SheetsError::InvalidEndpoint(self.endpoint.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn values_url(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
    ) -> Result<Url> {
        let mut url = self.spreadsheets_url([spreadsheet_id, "values", range])?;
        if let Some(option) = value_input_option {
            url.query_pairs_mut()
                .append_pair("valueInputOption", option);
        }
        Ok(url)
    }

    async fn send<T>(&self, mut request: Request) -> Result<T>
    where
        T: DeserializeOwned,
    {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.authorization.clone());

        let resp = self.client.do_request(request).await?;
        let status = resp.status();
        let body = read_body(resp.into_bytes_stream()).await?;

        if !status.is_success() {
            return Err(SheetsError::upstream(status, error_message(status, &body)));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull the message out of an api error body.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(resp) if !resp.error.message.is_empty() => resp.error.message,
        _ => fallback_message(status, body),
    }
}

#[async_trait]
impl<C> SpreadsheetClient for GoogleSheetsClient<C>
where
    C: HttpClient,
{
    async fn create(&self, title: Option<&str>) -> Result<CreatedSpreadsheet> {
        let mut url = self.spreadsheets_url([])?;
        url.query_pairs_mut().append_pair("fields", "spreadsheetId");

        let mut request = Request::new(Method::POST, url);
        set_json_body(
            &mut request,
            &CreateSpreadsheetRequest {
                properties: SpreadsheetProperties { title },
            },
        )?;
        self.send(request).await
    }

    async fn get(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let url = self.values_url(spreadsheet_id, range, None)?;
        self.send(Request::new(Method::GET, url)).await
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<UpdateValuesResponse> {
        let url = self.values_url(spreadsheet_id, range, value_input_option)?;
        let mut request = Request::new(Method::PUT, url);
        set_json_body(&mut request, &ValuesBody { values })?;
        self.send(request).await
    }

    async fn batch_get(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<BatchGetValuesResponse> {
        let mut url = self.spreadsheets_url([spreadsheet_id, "values:batchGet"])?;
        {
            let mut query = url.query_pairs_mut();
            for range in ranges {
                query.append_pair("ranges", range);
            }
        }
        self.send(Request::new(Method::GET, url)).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        updates: Vec<BatchUpdateEntry>,
        value_input_option: Option<&str>,
    ) -> Result<BatchUpdateValuesResponse> {
        let url = self.spreadsheets_url([spreadsheet_id, "values:batchUpdate"])?;
        let mut request = Request::new(Method::POST, url);
        set_json_body(
            &mut request,
            &BatchUpdateRequest {
                value_input_option,
                data: updates,
            },
        )?;
        self.send(request).await
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: Option<&str>,
        values: Option<ValueMatrix>,
    ) -> Result<AppendValuesResponse> {
        let target = format!("{range}:append");
        let mut url = self.spreadsheets_url([spreadsheet_id, "values", target.as_str()])?;
        if let Some(option) = value_input_option {
            url.query_pairs_mut()
                .append_pair("valueInputOption", option);
        }

        let mut request = Request::new(Method::POST, url);
        set_json_body(&mut request, &ValuesBody { values })?;
        self.send(request).await
    }
}
