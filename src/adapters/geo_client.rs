use crate::adapters::http::parse_endpoint;
use crate::domain::model::GeoInfo;
use crate::domain::ports::GeoLookup;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json";
const LANG: &str = "zh-CN";

/// ip-api.com 的 JSON 介面：`GET {endpoint}/{ip}?lang=zh-CN`
#[derive(Debug, Clone)]
pub struct IpApiClient {
    client: Client,
    endpoint: Url,
}

impl IpApiClient {
    pub fn new(client: Client, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: parse_endpoint("geo_endpoint", endpoint)?,
        })
    }

    fn lookup_url(&self, ip: &str) -> Url {
        let mut url = self.endpoint.clone();
        // http(s) URL 一定可以當 base，這裡不會失敗
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ip);
        }
        url
    }
}

#[async_trait]
impl GeoLookup for IpApiClient {
    async fn lookup(&self, ip: &str) -> std::result::Result<GeoInfo, LookupError> {
        let url = self.lookup_url(ip);
        tracing::debug!("Querying geo provider: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("lang", LANG)])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        tracing::debug!("Geo provider response body: {}", body);

        let info: GeoInfo = serde_json::from_str(&body)?;
        if !info.is_success() {
            tracing::warn!("⚠️ Geo provider rejected {}: {}", ip, info.message);
            return Err(LookupError::Provider {
                message: info.message,
            });
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> IpApiClient {
        IpApiClient::new(Client::new(), &server.url("/json")).unwrap()
    }

    #[test]
    fn test_lookup_url_escapes_ip_segment() {
        let client = IpApiClient::new(Client::new(), "http://ip-api.com/json/").unwrap();
        assert_eq!(
            client.lookup_url("203.0.113.5").as_str(),
            "http://ip-api.com/json/203.0.113.5"
        );
        assert_eq!(
            client.lookup_url("../admin").as_str(),
            "http://ip-api.com/json/..%2Fadmin"
        );
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(IpApiClient::new(Client::new(), "ftp://ip-api.com/json").is_err());
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/json/203.0.113.5")
                .query_param("lang", "zh-CN");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "query": "203.0.113.5",
                    "country": "Testland",
                    "regionName": "Example Region",
                    "city": "Example City",
                    "isp": "Example ISP",
                    "org": "Example ISP",
                    "as": "AS64500",
                    "status": "success"
                }));
        });

        let info = client_for(&server).lookup("203.0.113.5").await.unwrap();

        api_mock.assert();
        assert_eq!(info.queried_ip, "203.0.113.5");
        assert_eq!(info.org, "Example ISP");
        assert_eq!(info.as_info, "AS64500");
    }

    #[tokio::test]
    async fn test_lookup_provider_failure_carries_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/abc");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "status": "fail",
                    "message": "invalid query",
                    "query": "abc"
                }));
        });

        let err = client_for(&server).lookup("abc").await.unwrap_err();
        match err {
            LookupError::Provider { message } => assert_eq!(message, "invalid query"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/1.1.1.1");
            then.status(200).body("<html>not json</html>");
        });

        let err = client_for(&server).lookup("1.1.1.1").await.unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[tokio::test]
    async fn test_lookup_http_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/json/1.1.1.1");
            then.status(503);
        });

        let err = client_for(&server).lookup("1.1.1.1").await.unwrap_err();
        assert!(matches!(err, LookupError::Network(_)));
    }

    #[tokio::test]
    async fn test_lookup_unreachable_provider() {
        // 保留一個沒有人監聽的 port
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            IpApiClient::new(Client::new(), &format!("http://{}/json", addr)).unwrap();
        let err = client.lookup("1.1.1.1").await.unwrap_err();
        assert!(matches!(err, LookupError::Network(_)));
    }
}
