//! HTTP client for the Ads API services and the report download endpoint.
//!
//! The provisioning and report code only ever sees the [`AdsApi`] and
//! [`ReportApi`] traits; [`AdsClient`] is the production implementation
//! backed by [`reqwest`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;

use crate::config::Settings;
use crate::dto::{AdsService, MutateResult, Operation, Page, ReportDefinition, Selector};
use crate::error::RemoteCallError;

/// Query and mutate access to the per-resource Ads API services.
#[async_trait]
pub trait AdsApi: Send + Sync {
    async fn get(&self, service: AdsService, selector: &Selector) -> Result<Page, RemoteCallError>;

    async fn mutate(
        &self,
        service: AdsService,
        operations: &[Operation],
    ) -> Result<MutateResult, RemoteCallError>;
}

/// Raw report download.
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn get_report(
        &self,
        version: &str,
        definition: &ReportDefinition,
    ) -> Result<String, RemoteCallError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetRequest<'a> {
    service_selector: &'a Selector,
}

#[derive(Serialize)]
struct MutateRequest<'a> {
    operations: &'a [Operation],
}

/// Client for one Ads API customer account.
#[derive(Clone)]
pub struct AdsClient {
    client: Client,
    base_url: String,
    version: String,
    developer_token: String,
    client_customer_id: String,
    user_agent: String,
    access_token: String,
}

impl AdsClient {
    pub fn new(settings: &Settings) -> Result<Self, RemoteCallError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, settings))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            base_url: settings.ads_api_base_url.trim_end_matches('/').to_string(),
            version: settings.ads_api_version.clone(),
            developer_token: settings.developer_token.clone(),
            client_customer_id: settings.client_customer_id.clone(),
            user_agent: settings.user_agent.clone(),
            access_token: settings.access_token.clone(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn service_url(&self, service: AdsService, method: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, self.version, service, method)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.access_token)
            .header("developerToken", &self.developer_token)
            .header("clientCustomerId", &self.client_customer_id)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
    }

    /// Returns the response unchanged on a 2xx status, otherwise an
    /// [`RemoteCallError::Api`] carrying status and body text.
    async fn ensure_success(response: Response) -> Result<Response, RemoteCallError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteCallError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, RemoteCallError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        debug!(
            "\u{2190} body = {}",
            String::from_utf8_lossy(&bytes[..bytes.len().min(1024)])
        );
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl AdsApi for AdsClient {
    async fn get(&self, service: AdsService, selector: &Selector) -> Result<Page, RemoteCallError> {
        let url = self.service_url(service, "get");
        debug!(%service, "\u{2192} get");
        let response = self
            .authorized(self.client.post(url))
            .json(&GetRequest {
                service_selector: selector,
            })
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn mutate(
        &self,
        service: AdsService,
        operations: &[Operation],
    ) -> Result<MutateResult, RemoteCallError> {
        let url = self.service_url(service, "mutate");
        debug!(%service, operations = operations.len(), "\u{2192} mutate");
        let response = self
            .authorized(self.client.post(url))
            .json(&MutateRequest { operations })
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl ReportApi for AdsClient {
    async fn get_report(
        &self,
        version: &str,
        definition: &ReportDefinition,
    ) -> Result<String, RemoteCallError> {
        let url = format!("{}/reportdownload/{}", self.base_url, version);
        debug!(report = %definition.report_name, "\u{2192} report download");
        let response = self
            .authorized(self.client.post(url))
            .json(definition)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }
}
