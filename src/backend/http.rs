use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::{RagBackend, CHAT_ROUTE, ESCALATE_ROUTE, HEALTH_ROUTE, HEALTH_TIMEOUT};
use crate::errors::BackendError;
use crate::models::chat::{ChatRequest, ChatResponse};
use crate::models::escalation::{EmailPreview, EscalationRequest};

pub struct HttpBackend {
    http: HttpClient,
    base_url: Url,
    health_timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: Url) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url,
            health_timeout: HEALTH_TIMEOUT,
        })
    }

    /// Bounds the `/health` request. Chat and escalation calls stay unbounded.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post_json<B, T>(&self, route: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(route)?;
        debug!("POST {}", url);

        let resp = self.http.post(url.clone()).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!("POST {} failed with status {}", url, status.as_u16());
            return Err(BackendError::Server {
                status: status.as_u16(),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RagBackend for HttpBackend {
    async fn chat(&self, query: &str) -> Result<String, BackendError> {
        let response: ChatResponse = self.post_json(CHAT_ROUTE, &ChatRequest { query }).await?;
        Ok(response.answer)
    }

    async fn escalate(&self, request: &EscalationRequest) -> Result<EmailPreview, BackendError> {
        info!(
            "Requesting helpdesk email for {} {} ({})",
            request.name, request.surname, request.student_id
        );
        self.post_json(ESCALATE_ROUTE, &request.payload()).await
    }

    async fn health(&self) -> Result<(), BackendError> {
        let url = self.base_url.join(HEALTH_ROUTE)?;
        let resp = self
            .http
            .get(url)
            .timeout(self.health_timeout)
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Server {
                status: status.as_u16(),
            })
        }
    }
}
