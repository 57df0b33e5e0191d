//! reqwest plumbing shared by the HTTP adapters

use crate::types::ServiceError;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("TrendBasket/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client(cookie_store: bool) -> Result<Client, ServiceError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .cookie_store(cookie_store)
        .build()
        .map_err(|e| ServiceError::Network(e.to_string()))
}

/// Map non-success statuses to errors and return the body text
pub(crate) async fn read_body(response: Response) -> Result<String, ServiceError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ServiceError::RateLimited);
    }

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ServiceError::Api(status.as_u16(), error_text));
    }

    response
        .text()
        .await
        .map_err(|e| ServiceError::Network(e.to_string()))
}

/// Decode a JSON body after the status check
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(|e| ServiceError::Parse(e.to_string()))
}
