//! [`CloudApi`] over the Hetzner Cloud REST API.

pub mod schema;

use crate::domain::model::{
    Action, Certificate, CertificateCreateOpts, LoadBalancer, ServiceUpdate,
};
use crate::domain::ports::CloudApi;
use crate::utils::error::{ApiError, ApiResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use schema::{
    ActionEnvelope, CertificateEnvelope, CreateCertificateRequest, ErrorEnvelope,
    LoadBalancerEnvelope, UpdateServiceRequest,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.hetzner.cloud/v1";

#[derive(Clone)]
pub struct HcloudClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for HcloudClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HcloudClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl HcloudClient {
    pub fn new(endpoint: &str, token: &str, request_timeout: Duration) -> ApiResult<Self> {
        // Url::join 需要結尾斜線才會保留 /v1
        let mut base_url = Url::parse(endpoint)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("hetzbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "API response");

        if status.is_success() {
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(remote_error(status, &body))
        }
    }

    /// GET that maps a 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        let url = self.url(path)?;
        tracing::debug!("Making API request to: {}", url);
        match self.send(self.client.get(url)).await {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::RemoteError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn remote_error(status: StatusCode, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::RemoteError {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => ApiError::RemoteError {
            status: status.as_u16(),
            code: "unknown".to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
        },
    }
}

#[async_trait]
impl CloudApi for HcloudClient {
    async fn get_load_balancer(&self, id: i64) -> ApiResult<Option<LoadBalancer>> {
        let envelope: Option<LoadBalancerEnvelope> =
            self.get_optional(&format!("load_balancers/{}", id)).await?;
        Ok(envelope.map(|e| e.load_balancer.into()))
    }

    async fn get_certificate(&self, id: i64) -> ApiResult<Option<Certificate>> {
        let envelope: Option<CertificateEnvelope> =
            self.get_optional(&format!("certificates/{}", id)).await?;
        Ok(envelope.map(|e| e.certificate.into()))
    }

    async fn create_certificate(&self, opts: &CertificateCreateOpts) -> ApiResult<Certificate> {
        let url = self.url("certificates")?;
        let body = CreateCertificateRequest::from(opts);
        let envelope: CertificateEnvelope = self.send(self.client.post(url).json(&body)).await?;
        Ok(envelope.certificate.into())
    }

    async fn update_service(
        &self,
        load_balancer_id: i64,
        update: &ServiceUpdate,
    ) -> ApiResult<Action> {
        let url = self.url(&format!(
            "load_balancers/{}/actions/update_service",
            load_balancer_id
        ))?;
        let body = UpdateServiceRequest::from(update);
        let envelope: ActionEnvelope = self.send(self.client.post(url).json(&body)).await?;
        Ok(envelope.action.into())
    }

    async fn get_action(&self, id: i64) -> ApiResult<Action> {
        let url = self.url(&format!("actions/{}", id))?;
        let envelope: ActionEnvelope = self.send(self.client.get(url)).await?;
        Ok(envelope.action.into())
    }
}
