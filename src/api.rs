// API client module: a small blocking HTTP client that talks to the
// Paperless REST API. Every request carries the versioned Accept header and
// HTTP Basic credentials taken from the loaded `Config`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::ApiError;

pub const ACCEPT_VERSION: &str = "application/json; version=2";
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(180);

const API_ROOT: &str = "/api/";
const TAGS: &str = "/api/tags/";
const POST_DOCUMENT: &str = "/api/documents/post_document/";

/// A server-side label that can be attached to documents.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// One page of the tag listing. Paperless paginates and links the next page.
#[derive(Deserialize, Debug)]
struct TagPage {
    #[serde(default)]
    next: Option<String>,
    results: Vec<Tag>,
}

/// The operations the uploader needs from a Paperless server.
pub trait PaperlessApi {
    /// Succeeds iff the API root answers 200 for these credentials.
    fn test_connection(&self) -> Result<(), ApiError>;

    /// All tags, in server order.
    fn list_tags(&self) -> Result<Vec<Tag>, ApiError>;

    /// Create a tag and return its id.
    fn create_tag(&self, name: &str) -> Result<u64, ApiError>;

    /// Upload one file, optionally tagged. A tag id of 0 means untagged.
    fn upload_document(&self, path: &Path, tag: Option<u64>) -> Result<(), ApiError>;
}

/// Blocking client bound to one server and one set of credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    authorization: HeaderValue,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url = config.server_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::MissingServerUrl);
        }
        let client = Client::builder().build().map_err(ApiError::Client)?;
        Ok(ApiClient {
            client,
            base_url,
            authorization: basic_auth(&config.username, &config.password),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request builder with the headers every API call must carry.
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(ACCEPT, ACCEPT_VERSION)
            .header(AUTHORIZATION, self.authorization.clone())
    }

    fn send(&self, url: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        debug!(%url, "sending request");
        req.send().map_err(|source| ApiError::Request {
            url: url.to_string(),
            source,
        })
    }

    /// Send and require `expected`; anything else becomes a `Status` error
    /// carrying the response body.
    fn send_expecting(
        &self,
        url: &str,
        req: RequestBuilder,
        expected: StatusCode,
    ) -> Result<String, ApiError> {
        let res = self.send(url, req)?;
        let status = res.status();
        let body = res.text().unwrap_or_default();
        debug!(%url, %status, "response received");
        if status != expected {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(body)
    }

    /// Re-root a pagination link on the configured server. Only the path and
    /// query are taken from the server so credentials never leave `base_url`.
    fn next_page_url(&self, next: &str) -> String {
        let (path, query) = match Url::parse(next) {
            Ok(url) => (url.path().to_string(), url.query().map(str::to_string)),
            Err(_) => match next.split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (next.to_string(), None),
            },
        };
        // A server mounted below a path prefix repeats that prefix in its links.
        let prefix = Url::parse(&self.base_url)
            .map(|url| url.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let path = path.strip_prefix(prefix.as_str()).unwrap_or(path.as_str());
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        match query {
            Some(query) => self.url(&format!("{path}?{query}")),
            None => self.url(&path),
        }
    }

    fn get_page(&self, url: &str) -> Result<TagPage, ApiError> {
        let body = self.send_expecting(url, self.request(Method::GET, url), StatusCode::OK)?;
        decode(url, &body)
    }
}

impl PaperlessApi for ApiClient {
    fn test_connection(&self) -> Result<(), ApiError> {
        let url = self.url(API_ROOT);
        self.send_expecting(&url, self.request(Method::GET, &url), StatusCode::OK)?;
        Ok(())
    }

    fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let mut tags = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(self.url(TAGS));
        while let Some(url) = next {
            if !seen.insert(url.clone()) {
                warn!(%url, "tag listing links back to a page already read");
                break;
            }
            let page = self.get_page(&url)?;
            tags.extend(page.results);
            next = page.next.map(|link| self.next_page_url(&link));
        }
        debug!(count = tags.len(), "tags listed");
        Ok(tags)
    }

    fn create_tag(&self, name: &str) -> Result<u64, ApiError> {
        let url = self.url(TAGS);
        let req = self.request(Method::POST, &url).form(&[("name", name)]);
        let body = self.send_expecting(&url, req, StatusCode::CREATED)?;
        let tag: Tag = decode(&url, &body)?;
        Ok(tag.id)
    }

    fn upload_document(&self, path: &Path, tag: Option<u64>) -> Result<(), ApiError> {
        // The file is read up front so a bad path never reaches the network.
        let form = document_form(path, tag)?;
        let url = self.url(POST_DOCUMENT);
        let req = self
            .request(Method::POST, &url)
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form);
        self.send_expecting(&url, req, StatusCode::OK)?;
        Ok(())
    }
}

/// `Basic base64(username:password)`, flagged sensitive so it stays out of logs.
pub fn basic_auth(username: &str, password: &str) -> HeaderValue {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    // Base64 output is always a valid header value.
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
    value.set_sensitive(true);
    value
}

fn document_form(path: &Path, tag: Option<u64>) -> Result<multipart::Form, ApiError> {
    let bytes = fs::read(path).map_err(|source| ApiError::LocalFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut form = multipart::Form::new();
    if let Some(id) = tag.filter(|id| *id != 0) {
        form = form.text("tags", id.to_string());
    }
    let part = multipart::Part::bytes(bytes).file_name(file_name);
    Ok(form.part("document", part))
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}
