use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use log::debug;
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::credentials::Credentials;
use super::sigv4::{self, SigningRequest};
use crate::sources::adapter::RemoteError;

const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// ============================================================
/// AwsJsonClient
/// ============================================================
///
/// Signed HTTP client for AWS JSON 1.1 APIs.
///
/// Responsibilities:
/// - Resolve the regional endpoint (or the configured override)
/// - Sign every request with SigV4
/// - Map failures onto `RemoteError`
///
/// Cheap to clone; every source and region shares one connection pool.
#[derive(Clone)]
pub struct AwsJsonClient {
    http: reqwest::Client,
    credentials: Arc<Credentials>,
    endpoint_override: Option<Url>,
}

impl AwsJsonClient {
    pub fn new(
        credentials: Credentials,
        endpoint_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint_override = endpoint_override
            .map(|raw| Url::parse(raw).with_context(|| format!("invalid endpoint override `{raw}`")))
            .transpose()?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            credentials: Arc::new(credentials),
            endpoint_override,
        })
    }

    /// Regional endpoint for `service`, unless an override is configured.
    pub fn endpoint(&self, service: &str, region: &str) -> Result<Url, RemoteError> {
        match &self.endpoint_override {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("https://{service}.{region}.amazonaws.com/"))
                .map_err(|e| RemoteError::Transport(format!("invalid endpoint for {region}: {e}"))),
        }
    }

    /// Performs one signed JSON call and decodes the success body into `T`.
    ///
    /// NOTE:
    /// No retries. Throttling surfaces as `RemoteError::Throttled`.
    pub async fn call<B, T>(
        &self,
        service: &str,
        target: &str,
        region: &str,
        body: &B,
    ) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(service, region)?;
        let host = host_header(&url)?;
        let payload = serde_json::to_vec(body).map_err(|e| RemoteError::Request(e.to_string()))?;

        let signed = sigv4::sign(
            &self.credentials,
            &SigningRequest {
                service,
                region,
                host: &host,
                path: url.path(),
                content_type: JSON_CONTENT_TYPE,
                target,
                body: &payload,
            },
            Utc::now(),
        );

        let mut request = self
            .http
            .post(url)
            .header("content-type", JSON_CONTENT_TYPE)
            .header("x-amz-target", target)
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        debug!("{target} → {region} ({} bytes)", payload.len());

        let response = request
            .body(payload)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(classify_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn host_header(url: &Url) -> Result<String, RemoteError> {
    let host = url
        .host_str()
        .ok_or_else(|| RemoteError::Transport(format!("endpoint `{url}` has no host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

const AUTH_CODES: [&str; 5] = [
    "AccessDenied",
    "UnrecognizedClient",
    "InvalidSignature",
    "ExpiredToken",
    "IncompleteSignature",
];

const THROTTLE_CODES: [&str; 3] = ["Throttling", "TooManyRequests", "RequestLimitExceeded"];

/// Maps a non-success response onto the `RemoteError` taxonomy.
///
/// Error bodies look like
/// `{"__type":"com.amazonaws...#AccessDeniedException","message":"..."}`;
/// only the part after `#` is kept as the code.
pub fn classify_error(status: u16, body: &str) -> RemoteError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let code = parsed
        .as_ref()
        .and_then(|v| v.get("__type"))
        .and_then(Value::as_str)
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("Message")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());

    if THROTTLE_CODES.iter().any(|c| code.contains(c)) || status == 429 {
        RemoteError::Throttled { code, message }
    } else if AUTH_CODES.iter().any(|c| code.contains(c)) || status == 401 || status == 403 {
        RemoteError::Auth { code, message }
    } else {
        RemoteError::Service {
            status,
            code,
            message,
        }
    }
}
