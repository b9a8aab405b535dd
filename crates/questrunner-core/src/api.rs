//! Typed client for the quest API.
//!
//! One client is built per wallet run: the cookie store it carries is the
//! wallet's session, established by the login call and sent automatically on
//! every later call, then dropped with the client. Each endpoint has a
//! declared response schema; a body that does not match surfaces as
//! [`SequenceError::Decode`] rather than a panic or an untyped value.

use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Result, SequenceError};
use crate::proxy::ProxyEndpoint;

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    /// Server-issued nonce
    pub const NONCE: &str = "/auth/eth/nonce";
    /// Signed login verification
    pub const VERIFY: &str = "/auth/eth/verify";
    /// Experience total
    pub const EXP: &str = "/users/exp";
    /// Task list
    pub const TASKS: &str = "/users/social/tasks";
}

/// Response bodies are truncated to this length in error context.
const MAX_ERROR_BODY: usize = 200;

/// A remote-defined unit of work.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskUnit {
    /// Remote task identifier
    pub id: u64,
    /// Whether the remote already considers it done
    pub completed: bool,
}

/// Body of a successful task verification.
#[derive(Debug, Deserialize)]
pub struct TaskVerifyOutcome {
    /// Optional server-provided confirmation text
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    message: &'a str,
    signature: &'a str,
}

/// HTTP client bound to one wallet's session.
pub struct QuestClient {
    client: Client,
    base_url: String,
}

impl QuestClient {
    /// Build a client for one wallet run, optionally routed through `proxy`.
    pub fn new(api: &ApiConfig, proxy: Option<&ProxyEndpoint>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&api.origin).map_err(|e| SequenceError::Setup(e.to_string()))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&api.referer)
                .map_err(|e| SequenceError::Setup(e.to_string()))?,
        );

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .cookie_store(true)
            .default_headers(headers);

        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy.to_url())
                .map_err(|e| SequenceError::Setup(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| SequenceError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a fresh server-issued nonce.
    ///
    /// The body is a JSON string; a plain-text body is accepted as a
    /// fallback. An empty nonce is a decode failure.
    pub async fn fetch_nonce(&self) -> Result<String> {
        let response = self.get(endpoints::NONCE).await?;
        let text = read_body(endpoints::NONCE, response).await?;
        let nonce = match serde_json::from_str::<String>(&text) {
            Ok(nonce) => nonce,
            Err(_) => text.trim().to_string(),
        };
        if nonce.is_empty() {
            return Err(SequenceError::Decode {
                endpoint: endpoints::NONCE.to_string(),
                message: "empty nonce body".to_string(),
            });
        }
        Ok(nonce)
    }

    /// Submit the signed message to establish the session cookie.
    pub async fn verify_login(&self, message: &str, signature: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url(endpoints::VERIFY))
            .json(&VerifyRequest { message, signature })
            .send()
            .await
            .map_err(|e| network_error("POST", endpoints::VERIFY, &e))?;
        check_status("POST", endpoints::VERIFY, response).await?;
        Ok(())
    }

    /// Fetch the wallet's experience total.
    pub async fn fetch_exp(&self) -> Result<u64> {
        let response = self.get(endpoints::EXP).await?;
        decode_json(endpoints::EXP, response).await
    }

    /// Fetch all task units, completed or not.
    pub async fn fetch_tasks(&self) -> Result<Vec<TaskUnit>> {
        let response = self.get(endpoints::TASKS).await?;
        decode_json(endpoints::TASKS, response).await
    }

    /// Attempt verification of one task by id.
    pub async fn verify_task(&self, id: u64) -> Result<TaskVerifyOutcome> {
        let endpoint = format!("{}/{}/verify", endpoints::TASKS, id);
        let response = self
            .client
            .get(self.url(&endpoint))
            .send()
            .await
            .map_err(|e| SequenceError::Network {
                method: "GET",
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;
        let response = check_status_owned("GET", endpoint.clone(), response).await?;
        response
            .json()
            .await
            .map_err(|e| SequenceError::Decode {
                endpoint,
                message: e.to_string(),
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, endpoint: &'static str) -> Result<Response> {
        debug!(endpoint, "GET");
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| network_error("GET", endpoint, &e))?;
        check_status("GET", endpoint, response).await
    }
}

fn network_error(method: &'static str, endpoint: &str, error: &reqwest::Error) -> SequenceError {
    SequenceError::Network {
        method,
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Reject non-2xx responses, capturing a truncated body for context.
async fn check_status(
    method: &'static str,
    endpoint: &'static str,
    response: Response,
) -> Result<Response> {
    check_status_owned(method, endpoint.to_string(), response).await
}

async fn check_status_owned(
    method: &'static str,
    endpoint: String,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    body.truncate(MAX_ERROR_BODY);
    Err(SequenceError::Api {
        status: status.as_u16(),
        method,
        endpoint,
        body,
    })
}

async fn read_body(endpoint: &'static str, response: Response) -> Result<String> {
    response.text().await.map_err(|e| SequenceError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

async fn decode_json<T: serde::de::DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T> {
    response.json().await.map_err(|e| SequenceError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
