//! Application tracker client: CRUD over the backend's `/api/applications`.
//!
//! Every call fetches a fresh bearer credential first. Non-2xx responses are
//! reported with the server's `detail` message when the body carries one.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::CredentialIssuer;
use crate::config::ClientConfig;
use crate::errors::TrackerError;
use crate::models::application::{Application, ApplicationList, NewApplication};

const APPLICATIONS_PATH: &str = "/api/applications";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

#[derive(Clone)]
pub struct TrackerClient {
    client: Client,
    config: ClientConfig,
    issuer: Arc<dyn CredentialIssuer>,
}

impl TrackerClient {
    pub fn new(config: ClientConfig, issuer: Arc<dyn CredentialIssuer>) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            issuer,
        })
    }

    /// POST /api/applications
    pub async fn create(&self, application: &NewApplication) -> Result<Application, TrackerError> {
        let request = self.request(Method::POST, APPLICATIONS_PATH).await?;
        let response = send(request.json(application)).await?;
        Ok(response.json().await?)
    }

    /// GET /api/applications
    pub async fn list(&self) -> Result<Vec<Application>, TrackerError> {
        let request = self.request(Method::GET, APPLICATIONS_PATH).await?;
        let list: ApplicationList = send(request).await?.json().await?;
        debug!("fetched {} applications", list.applications.len());
        Ok(list.applications)
    }

    /// PUT /api/applications/:id
    pub async fn update(
        &self,
        id: &str,
        application: &NewApplication,
    ) -> Result<Application, TrackerError> {
        let path = format!("{APPLICATIONS_PATH}/{id}");
        let request = self.request(Method::PUT, &path).await?;
        let response = send(request.json(application)).await?;
        Ok(response.json().await?)
    }

    /// DELETE /api/applications/:id
    pub async fn delete(&self, id: &str) -> Result<(), TrackerError> {
        let path = format!("{APPLICATIONS_PATH}/{id}");
        let request = self.request(Method::DELETE, &path).await?;
        send(request).await?;
        Ok(())
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, TrackerError> {
        let credential = self
            .issuer
            .fetch()
            .await
            .ok_or(TrackerError::CredentialUnavailable)?;
        Ok(self
            .client
            .request(method, self.config.url_for(path))
            .bearer_auth(credential.token()))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, TrackerError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("tracker API returned {}: {}", status, body);
    Err(TrackerError::Api {
        status: status.as_u16(),
        detail: parse_detail(&body),
    })
}

fn parse_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(Value::String(detail)),
        }) => Some(detail),
        Ok(ErrorBody {
            detail: Some(other),
        }) => Some(other.to_string()),
        _ => None,
    }
}
