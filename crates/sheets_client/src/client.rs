use std::fmt::Debug;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::{Result, SheetsError};

pub trait HttpClient: Sync + Send + Debug + Clone + 'static {
    type Response: HttpResponse;
    type RequestFuture: Future<Output = Result<Self::Response>> + Send + Unpin;

    /// Do the request.
    fn do_request(&self, request: Request) -> Self::RequestFuture;
}

pub trait HttpResponse: Send {
    type BytesStream: Stream<Item = Result<Bytes>> + Send + Unpin;

    fn status(&self) -> StatusCode;
    fn headers(&self) -> &HeaderMap;

    /// Convert the response body into a byte stream.
    fn into_bytes_stream(self) -> Self::BytesStream;
}

/// [`HttpClient`] backed by reqwest.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(inner: reqwest::Client) -> Self {
        ReqwestClient { inner }
    }
}

impl HttpClient for ReqwestClient {
    type Response = ReqwestResponse;
    type RequestFuture = BoxFuture<'static, Result<ReqwestResponse>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        let client = self.inner.clone();
        async move {
            let inner = client.execute(request).await?;
            Ok(ReqwestResponse { inner })
        }
        .boxed()
    }
}

#[derive(Debug)]
pub struct ReqwestResponse {
    inner: reqwest::Response,
}

impl HttpResponse for ReqwestResponse {
    type BytesStream = BoxStream<'static, Result<Bytes>>;

    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        self.inner
            .bytes_stream()
            .map(|result| result.map_err(SheetsError::from))
            .boxed()
    }
}

/// Helper to set a json body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_json_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(body)?;
    *request.body_mut() = Some(body.into());
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(())
}

/// Helper to set a form body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_form_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_urlencoded::to_string(body)?;
    *request.body_mut() = Some(body.into());
    request.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    Ok(())
}

/// Collect a full response body.
pub async fn read_body<S>(mut stream: S) -> Result<Vec<u8>>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    let mut bytes = Vec::new();
    while let Some(chunk) = stream.try_next().await? {
        bytes.extend_from_slice(chunk.as_ref());
    }
    Ok(bytes)
}

/// Helper to read a json response from a byte stream.
///
/// This will collect the full response before trying to deserialize it.
pub async fn read_json_response<T, S>(stream: S) -> Result<T>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    let bytes = read_body(stream).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Best effort text for a failed response whose body couldn't be decoded.
///
/// Never empty.
pub(crate) fn fallback_message(status: StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        format!("Request failed with status code {}", status.as_u16())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use url::Url;

    use super::*;

    #[test]
    fn json_body_sets_content_type() {
        let mut request = Request::new(
            Method::POST,
            Url::parse("http://localhost/v4/spreadsheets").unwrap(),
        );
        set_json_body(&mut request, &serde_json::json!({"title": "Demo"})).unwrap();

        assert_eq!(
            "application/json",
            request.headers().get(CONTENT_TYPE).unwrap()
        );
        let body = request.body().unwrap().as_bytes().unwrap();
        assert_eq!(br#"{"title":"Demo"}"#, body);
    }

    #[test]
    fn form_body_is_url_encoded() {
        let mut request = Request::new(Method::POST, Url::parse("http://localhost/token").unwrap());
        set_form_body(&mut request, &[("grant_type", "a b"), ("assertion", "x.y.z")]).unwrap();

        let body = request.body().unwrap().as_bytes().unwrap();
        assert_eq!(b"grant_type=a+b&assertion=x.y.z", body);
    }

    #[test]
    fn fallback_message_never_empty() {
        assert_eq!(
            "Request failed with status code 502",
            fallback_message(StatusCode::BAD_GATEWAY, b"  \n")
        );
        assert_eq!(
            "upstream exploded",
            fallback_message(StatusCode::BAD_GATEWAY, b"upstream exploded\n")
        );
    }

    #[tokio::test]
    async fn read_json_from_chunks() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"{\"spreadsheet")),
            Ok(Bytes::from_static(b"Id\":\"abc\"}")),
        ];
        let value: serde_json::Value = read_json_response(futures::stream::iter(chunks))
            .await
            .unwrap();
        assert_eq!(serde_json::json!({"spreadsheetId": "abc"}), value);
    }
}
