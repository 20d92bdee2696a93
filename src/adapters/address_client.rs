use crate::adapters::http::parse_endpoint;
use crate::domain::model::{AddressResult, GeoInfo};
use crate::domain::ports::AddressResolver;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_ADDRESS_ENDPOINT: &str = "https://api.map.baidu.com/location/ip";
const COORDINATE_SYSTEM: &str = "bd09ll";

#[derive(Debug, Deserialize)]
struct AddressResponse {
    status: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    content: Option<AddressContent>,
}

#[derive(Debug, Deserialize)]
struct AddressContent {
    #[serde(default)]
    address: Option<String>,
}

impl AddressResponse {
    /// `content.address` 優先，舊格式只有頂層 `address`
    fn into_result(self) -> std::result::Result<AddressResult, LookupError> {
        if self.status != 0 {
            return Ok(AddressResult {
                address: String::new(),
                status_code: self.status,
            });
        }

        let nested = self
            .content
            .and_then(|c| c.address)
            .filter(|a| !a.is_empty());
        let address = nested
            .or(self.address.filter(|a| !a.is_empty()))
            .ok_or_else(|| LookupError::Decode("response carries no address".to_string()))?;

        Ok(AddressResult {
            address,
            status_code: 0,
        })
    }
}

/// 百度定位：`GET {endpoint}?ip=..&coor=bd09ll&ak=..`
#[derive(Debug, Clone)]
pub struct BaiduAddressClient {
    client: Client,
    endpoint: Url,
}

impl BaiduAddressClient {
    pub fn new(client: Client, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: parse_endpoint("address_endpoint", endpoint)?,
        })
    }

    pub async fn lookup(
        &self,
        ip: &str,
        api_key: &str,
    ) -> std::result::Result<AddressResult, LookupError> {
        // 不要把 ak 寫進日誌
        tracing::debug!("Querying address provider {} for {}", self.endpoint, ip);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("ip", ip), ("coor", COORDINATE_SYSTEM), ("ak", api_key)])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        tracing::debug!("Address provider response body: {}", body);

        let decoded: AddressResponse = serde_json::from_str(&body)?;
        let provider_message = decoded.message.clone();
        let result = decoded.into_result()?;

        if !result.is_valid() {
            let message = match provider_message {
                Some(msg) if !msg.is_empty() => {
                    format!("provider status {}: {}", result.status_code, msg)
                }
                _ => format!("provider status {}", result.status_code),
            };
            tracing::warn!("⚠️ Address provider rejected {}: {}", ip, message);
            return Err(LookupError::Provider { message });
        }

        Ok(result)
    }
}

/// 透過第二個 provider 取得地址，API key 在啟動時注入
#[derive(Debug, Clone)]
pub struct KeyedAddressResolver {
    client: BaiduAddressClient,
    api_key: String,
}

impl KeyedAddressResolver {
    pub fn new(client: BaiduAddressClient, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl AddressResolver for KeyedAddressResolver {
    async fn resolve(&self, ip: &str, _geo: &GeoInfo) -> std::result::Result<String, LookupError> {
        let result = self.client.lookup(ip, &self.api_key).await?;
        Ok(result.address)
    }

    fn name(&self) -> &'static str {
        "baidu"
    }
}

/// 不呼叫外部服務，直接用 geo 結果組成 "{country} {region} {city}"
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoAddressResolver;

#[async_trait]
impl AddressResolver for GeoAddressResolver {
    async fn resolve(&self, _ip: &str, geo: &GeoInfo) -> std::result::Result<String, LookupError> {
        Ok(format!("{} {} {}", geo.country, geo.region_name, geo.city))
    }

    fn name(&self) -> &'static str {
        "geo"
    }
}
