//! Builder: an HTTP request assembled through a fluent builder, and through a
//! typestate "step" builder that makes the required order a compile-time rule.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub const DEFAULT_TIMEOUT_SECS: u32 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuilderError {
    #[error("URL cannot be empty")]
    EmptyUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    url: String,
    method: Method,
    headers: BTreeMap<String, String>,
    query_params: BTreeMap<String, String>,
    body: String,
    timeout_secs: u32,
}

impl HttpRequest {
    pub fn builder(url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }

    /// Describes the request as it would be sent.
    pub fn execute(&self) -> Vec<String> {
        let mut out = vec![format!("Executing {} request to {}", self.method, self.url)];
        if !self.query_params.is_empty() {
            let query = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .join("&");
            out.push(format!("Query Parameters: {query}"));
        }
        if !self.headers.is_empty() {
            out.push("Headers:".to_string());
            out.extend(self.headers.iter().map(|(k, v)| format!("  {k}: {v}")));
        }
        if !self.body.is_empty() {
            out.push(format!("Body: {}", self.body));
        }
        out.push(format!("Timeout: {} seconds", self.timeout_secs));
        out
    }
}

// =============================================================================
// Fluent builder
// =============================================================================

#[derive(Debug, Clone)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            request: HttpRequest {
                url: url.into(),
                method: Method::Get,
                headers: BTreeMap::new(),
                query_params: BTreeMap::new(),
                body: String::new(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(key.into(), value.into());
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query_params.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.request.body = body.into();
        self
    }

    pub fn timeout(mut self, secs: u32) -> Self {
        self.request.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<HttpRequest, BuilderError> {
        if self.request.url.trim().is_empty() {
            return Err(BuilderError::EmptyUrl);
        }
        Ok(self.request)
    }
}

// =============================================================================
// Step builder: url -> method -> header -> optional -> build
// =============================================================================

pub struct UrlStep;

pub struct MethodStep {
    url: String,
}

pub struct HeaderStep {
    url: String,
    method: Method,
}

pub struct OptionalStep {
    inner: HttpRequestBuilder,
}

impl HttpRequest {
    pub fn steps() -> UrlStep {
        UrlStep
    }
}

impl UrlStep {
    pub fn url(self, url: impl Into<String>) -> MethodStep {
        MethodStep { url: url.into() }
    }
}

impl MethodStep {
    pub fn method(self, method: Method) -> HeaderStep {
        HeaderStep {
            url: self.url,
            method,
        }
    }
}

impl HeaderStep {
    pub fn header(self, key: impl Into<String>, value: impl Into<String>) -> OptionalStep {
        OptionalStep {
            inner: HttpRequestBuilder::new(self.url)
                .method(self.method)
                .header(key, value),
        }
    }
}

impl OptionalStep {
    pub fn header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inner: self.inner.header(key, value),
        }
    }

    pub fn query_param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            inner: self.inner.query_param(key, value),
        }
    }

    pub fn body(self, body: impl Into<String>) -> Self {
        Self {
            inner: self.inner.body(body),
        }
    }

    pub fn timeout(self, secs: u32) -> Self {
        Self {
            inner: self.inner.timeout(secs),
        }
    }

    pub fn build(self) -> Result<HttpRequest, BuilderError> {
        self.inner.build()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();

    t.heading("Builder: GET with a query parameter");
    let get = HttpRequest::builder("https://api.example.com/users")
        .query_param("page", "1")
        .build()?;
    t.extend(get.execute());

    t.heading("Builder: POST with headers, body and timeout");
    let post = HttpRequest::builder("https://api.example.com/users")
        .method(Method::Post)
        .header("Content-Type", "application/json")
        .body(r#"{"name":"Aditya","age":26}"#)
        .timeout(15)
        .build()?;
    t.extend(post.execute());

    t.heading("Step builder");
    let stepped = HttpRequest::steps()
        .url("https://api.example.com/products")
        .method(Method::Get)
        .header("Accept", "application/json")
        .query_param("category", "electronics")
        .timeout(10)
        .build()?;
    t.extend(stepped.execute());

    t.heading("Builder: empty url");
    match HttpRequest::builder("").build() {
        Ok(_) => t.line("unexpectedly built"),
        Err(e) => t.line(format!("error: {e}")),
    };
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_get_and_thirty_seconds() {
        let req = HttpRequest::builder("https://x.io").build().unwrap();
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert_eq!(
            HttpRequest::builder("  ").build(),
            Err(BuilderError::EmptyUrl)
        );
    }

    #[test]
    fn test_execute_lists_every_part() {
        let req = HttpRequest::builder("https://x.io/a")
            .method(Method::Put)
            .header("B", "2")
            .header("A", "1")
            .query_param("q", "rust")
            .query_param("lang", "en")
            .body("payload")
            .build()
            .unwrap();

        let lines = req.execute();
        assert_eq!(lines[0], "Executing PUT request to https://x.io/a");
        assert_eq!(lines[1], "Query Parameters: lang=en&q=rust");
        assert_eq!(lines[2], "Headers:");
        assert_eq!(lines[3], "  A: 1");
        assert!(lines.contains(&"Body: payload".to_string()));
        assert_eq!(lines.last().unwrap(), "Timeout: 30 seconds");
    }

    #[test]
    fn test_step_builder_keeps_query_params_separate_from_headers() {
        let req = HttpRequest::steps()
            .url("https://x.io")
            .method(Method::Delete)
            .header("Auth", "t")
            .query_param("id", "9")
            .build()
            .unwrap();

        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.query_params().get("id").map(String::as_str), Some("9"));
        assert_eq!(req.method(), Method::Delete);
    }

    #[test]
    fn test_step_builder_still_validates_url() {
        let result = HttpRequest::steps()
            .url("")
            .method(Method::Get)
            .header("A", "b")
            .build();
        assert_eq!(result, Err(BuilderError::EmptyUrl));
    }
}
