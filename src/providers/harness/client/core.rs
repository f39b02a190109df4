use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, log, warn, Level};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::auth::{ApiKey, BasicCredentials};
use crate::error::{Result, SteplineError};

const MAX_RETRIES: u32 = 5;
const RETRY_DELAY_SECONDS: u64 = 10;

/// Flat backoff applied to transient failures.
///
/// Every retry waits the same `delay`; there is no jitter and no growth.
/// A request is attempted at most `max_retries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            delay: Duration::from_secs(RETRY_DELAY_SECONDS),
        }
    }
}

/// A single request handed to [`HarnessClient::send`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub credentials: Option<BasicCredentials>,
    pub headers: Vec<(String, String)>,
    /// File sent as multipart part `file` on PUT requests
    pub upload: Option<PathBuf>,
    /// Target path the body of a GET is streamed into
    pub download_to: Option<PathBuf>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            credentials: None,
            headers: Vec::new(),
            upload: None,
            download_to: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Builders for the PUT, HEAD, upload, download and basic auth paths of the
/// transport. The execution fetch itself only issues keyed GETs.
#[allow(dead_code)]
impl ApiRequest {
    pub fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn head(url: Url) -> Self {
        Self::new(Method::HEAD, url)
    }

    pub fn with_basic_auth(mut self, credentials: BasicCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_upload(mut self, path: impl Into<PathBuf>) -> Self {
        self.upload = Some(path.into());
        self
    }

    pub fn with_download_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_to = Some(path.into());
        self
    }
}

/// Outcome of a request that was not terminal.
///
/// `body` is `None` when the body was streamed to disk.
#[derive(Debug)]
pub struct Fetched {
    pub body: Option<Vec<u8>>,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

#[derive(Debug, PartialEq, Eq)]
enum Disposition {
    Continue,
    Retry,
    Fail,
}

fn classify(method: &Method, status: StatusCode) -> Disposition {
    match status.as_u16() {
        429 => Disposition::Retry,
        204 if method == Method::GET => Disposition::Retry,
        500 => Disposition::Fail,
        _ => Disposition::Continue,
    }
}

fn status_note(method: &Method, status: StatusCode) -> (Level, &'static str) {
    match status.as_u16() {
        200 => (Level::Debug, "continuing"),
        201 if method == Method::PUT => (Level::Debug, "upload acknowledged"),
        204 if method == Method::GET => (Level::Warn, "No Content, sleeping then retrying"),
        204 => (Level::Debug, "continuing"),
        403 => (Level::Error, "Forbidden, continuing"),
        404 => (Level::Debug, "Not Found, continuing"),
        429 => (Level::Warn, "Too Many Requests, sleeping then retrying"),
        500 => (Level::Error, "Internal Server Error, failing out"),
        _ => (Level::Warn, "unexpected, continuing"),
    }
}

fn log_status(method: &Method, status: StatusCode, url: &Url, attempt: u32) {
    let (level, note) = status_note(method, status);
    log!(
        level,
        "Received {} on {method} request for {url}: {note}, attempt {attempt}",
        status.as_u16()
    );
}

pub struct HarnessClient {
    client: Client,
    pub(super) api_url: Url,
    pub(super) api_key: ApiKey,
    retry: RetryPolicy,
}

impl HarnessClient {
    pub fn new(
        base_url: &str,
        api_key: ApiKey,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stepline/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SteplineError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)?;

        Ok(Self {
            client,
            api_url,
            api_key,
            retry,
        })
    }

    /// Send a request, retrying transient failures with flat backoff.
    ///
    /// 429, 204 on GET, and body read failures are retried. A 500 or a
    /// transport error ends the request immediately. Any other status is
    /// returned to the caller, which decides whether the body is usable.
    pub async fn send(&self, request: &ApiRequest) -> Result<Fetched> {
        let mut attempt = 0;

        loop {
            let response = match self.build(request).await?.send().await {
                Ok(response) => response,
                Err(e) => {
                    error!(
                        "The HTTP {} request for {} failed with error: {e}",
                        request.method, request.url
                    );
                    return Err(e.into());
                }
            };

            let status = response.status();
            log_status(&request.method, status, &request.url, attempt);

            match classify(&request.method, status) {
                Disposition::Fail => {
                    return Err(SteplineError::ServerError {
                        status: status.as_u16(),
                    })
                }
                Disposition::Retry => {
                    self.back_off(request, &mut attempt).await?;
                    continue;
                }
                Disposition::Continue => {}
            }

            let headers = response.headers().clone();

            if request.method == Method::GET {
                if let Some(path) = &request.download_to {
                    stream_to_file(response, path).await?;
                    return Ok(Fetched {
                        body: None,
                        status,
                        headers,
                    });
                }
            }

            match response.bytes().await {
                Ok(body) => {
                    return Ok(Fetched {
                        body: Some(body.to_vec()),
                        status,
                        headers,
                    })
                }
                Err(e) => {
                    warn!(
                        "Data read on {} failed with: {e}, sleeping then retrying, attempt {attempt}",
                        request.url
                    );
                    self.back_off(request, &mut attempt).await?;
                }
            }
        }
    }

    /// Counts a failed attempt and sleeps before the next one, unless the
    /// retry budget is spent.
    async fn back_off(&self, request: &ApiRequest, attempt: &mut u32) -> Result<()> {
        *attempt += 1;
        if *attempt > self.retry.max_retries {
            warn!(
                "Exceeded retry limit on {} request for {}, cancelling further attempts",
                request.method, request.url
            );
            return Err(SteplineError::RetriesExhausted { attempts: *attempt });
        }
        tokio::time::sleep(self.retry.delay).await;
        Ok(())
    }

    async fn build(&self, request: &ApiRequest) -> Result<RequestBuilder> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        if let Some(credentials) = &request.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        builder = builder.headers(extra_headers(&request.headers)?);

        if request.method == Method::PUT {
            if let Some(path) = &request.upload {
                builder = builder.multipart(upload_form(path).await?);
            }
        }

        Ok(builder)
    }
}

fn extra_headers(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        debug!("Received extra header: {name}");
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SteplineError::Config(format!("Invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SteplineError::Config(format!("Invalid value for header {name}: {e}")))?;
        // insert replaces, so the last duplicate wins
        map.insert(name, value);
    }
    Ok(map)
}

async fn upload_form(path: &Path) -> Result<Form> {
    let contents = tokio::fs::read(path).await.map_err(|e| {
        error!("Failed to open {} for upload: {e}", path.display());
        e
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Form::new().part("file", Part::bytes(contents).file_name(file_name)))
}

async fn stream_to_file(mut response: Response, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await.map_err(|e| {
        error!("File create {} failed with: {e}", path.display());
        e
    })?;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    debug!("Response body written to {}", path.display());
    Ok(())
}
