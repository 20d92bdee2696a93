use crate::utils::error::{CardError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("ipcard/", env!("CARGO_PKG_VERSION"));

/// 兩個 provider 共用同一個 client；每次請求都有上限時間
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CardError::Config {
            message: format!("Failed to build HTTP client: {}", e),
        })
}

pub(crate) fn parse_endpoint(field_name: &str, endpoint: &str) -> Result<Url> {
    crate::utils::validation::validate_url(field_name, endpoint)?;
    Url::parse(endpoint).map_err(|e| CardError::InvalidConfigValue {
        field: field_name.to_string(),
        value: endpoint.to_string(),
        reason: e.to_string(),
    })
}
