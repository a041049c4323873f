//! Outbound request preparation.
//!
//! Every call is described by an immutable [`RequestDescriptor`] and turned
//! into a transport request by the [`RequestPipeline`], which stamps the
//! current bearer token at send time. Descriptors are created fresh per
//! logical call; the single permitted resubmission happens on a copy, so
//! no two in-flight attempts ever share one.

use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

use crate::auth::TokenStore;
use super::ApiError;

#[derive(Debug, Clone)]
enum Payload {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// One outbound call: method, target path, optional query and body.
///
/// `retried` marks whether this attempt is the resubmission after a token
/// renewal. It is false on every fresh descriptor and set only by
/// [`RequestDescriptor::retry`].
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Option<Payload>,
    retried: bool,
}

impl RequestDescriptor {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            payload: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.payload = Some(Payload::Json(body));
        self
    }

    /// Attach a form-encoded body, as the token-issuance endpoint expects.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.payload = Some(Payload::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    /// The one permitted resubmission: a fresh copy flagged as retried.
    /// The new bearer token is stamped when the copy is prepared, not here.
    pub(crate) fn retry(&self) -> Self {
        Self {
            retried: true,
            ..self.clone()
        }
    }
}

/// Outbound stage: resolves a descriptor against the base URL and stamps
/// the current bearer token.
///
/// The token read is a snapshot; a concurrent renewal may replace it right
/// after. That is fine - the server decides validity, and a rejection is
/// handled by the response side.
///
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RequestPipeline {
    http: Client,
    base_url: String,
    store: TokenStore,
}

impl RequestPipeline {
    pub fn new(http: Client, base_url: String, store: TokenStore) -> Self {
        Self {
            http,
            base_url,
            store,
        }
    }

    /// Build the transport request for a descriptor. Unauthenticated
    /// sessions send no credential header at all.
    pub fn prepare(&self, descriptor: &RequestDescriptor) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, descriptor.path);
        let mut request = self.http.request(descriptor.method.clone(), &url);

        if let Some(token) = self.store.current() {
            request = request.bearer_auth(token);
        }
        if !descriptor.query.is_empty() {
            request = request.query(&descriptor.query);
        }
        match descriptor.payload {
            Some(Payload::Json(ref body)) => request = request.json(body),
            Some(Payload::Form(ref fields)) => request = request.form(fields),
            None => {}
        }
        request
    }

    /// Prepare and send in one step.
    pub async fn dispatch(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response, ApiError> {
        Ok(self.prepare(descriptor).send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_with(store: TokenStore) -> RequestPipeline {
        RequestPipeline::new(
            Client::new(),
            "http://localhost:8000".to_string(),
            store,
        )
    }

    #[test]
    fn test_prepare_stamps_bearer_when_token_present() {
        let store = TokenStore::in_memory();
        store.store("tok-1".to_string());

        let request = pipeline_with(store)
            .prepare(&RequestDescriptor::get("/market/stocks"))
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().as_str(), "http://localhost:8000/market/stocks");
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer tok-1"
        );
    }

    #[test]
    fn test_prepare_sends_no_header_when_unauthenticated() {
        let request = pipeline_with(TokenStore::in_memory())
            .prepare(&RequestDescriptor::get("/market/stocks"))
            .build()
            .unwrap();

        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_prepare_reads_token_at_call_time() {
        let store = TokenStore::in_memory();
        let pipeline = pipeline_with(store.clone());
        let descriptor = RequestDescriptor::get("/portfolio/holdings");

        store.store("late".to_string());
        let request = pipeline.prepare(&descriptor).build().unwrap();
        assert_eq!(request.headers().get("authorization").unwrap(), "Bearer late");
    }

    #[test]
    fn test_query_parameters_resolved_into_url() {
        let request = pipeline_with(TokenStore::in_memory())
            .prepare(
                &RequestDescriptor::get("/portfolio/transactions")
                    .query("skip", 0)
                    .query("limit", 50),
            )
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/portfolio/transactions?skip=0&limit=50"
        );
    }

    #[test]
    fn test_form_body_is_urlencoded() {
        let request = pipeline_with(TokenStore::in_memory())
            .prepare(
                &RequestDescriptor::post("/token").form(&[("username", "u"), ("password", "p")]),
            )
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );
        let body = request.body().unwrap().as_bytes().unwrap();
        assert_eq!(body, b"username=u&password=p".as_slice());
    }

    #[test]
    fn test_retry_copy_is_flagged_and_original_untouched() {
        let original = RequestDescriptor::post("/alerts/").json(serde_json::json!({"stock_id": 1}));
        assert!(!original.retried());

        let resend = original.retry();
        assert!(resend.retried());
        assert!(!original.retried());
        assert_eq!(resend.path(), original.path());
    }
}
