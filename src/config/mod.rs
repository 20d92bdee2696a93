pub mod toml_config;

use crate::adapters::address_client::DEFAULT_ADDRESS_ENDPOINT;
use crate::adapters::geo_client::DEFAULT_GEO_ENDPOINT;
use crate::domain::model::RenderProfile;
use crate::utils::error::{CardError, Result};
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toml_config::CardFileConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AUTO_ROUTE: &str = "AQuVk4853gdCarY6ysbscNZCL4A7ndgK";
pub const DEFAULT_QUERY_ROUTE: &str = "9uTWQKMJPcUuihF4LUtCtj48GkkRaZ82";

/// 地址那一行從哪裡來
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AddressSource {
    /// 百度定位 API（需要 API key）
    Baidu,
    /// 直接由 geo 結果組成 "{country} {region} {city}"
    Geo,
}

impl AddressSource {
    pub fn default_profile(self) -> RenderProfile {
        match self {
            AddressSource::Baidu => RenderProfile::dual_provider(),
            AddressSource::Geo => RenderProfile::locale_only(),
        }
    }
}

/// 命令列與環境變數。未指定的欄位會再從 `--config` 檔案與內建預設值補上。
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ipcard")]
#[command(about = "Serve PNG cards describing the caller's IP address")]
pub struct ServerConfig {
    /// Listen address
    #[arg(long, env = "IPCARD_BIND")]
    pub bind: Option<String>,

    /// API key of the address provider
    #[arg(long, env = "BAIDU_API_KEY", hide_env_values = true)]
    pub address_api_key: Option<String>,

    #[arg(long, env = "IPCARD_ADDRESS_SOURCE", value_enum)]
    pub address_source: Option<AddressSource>,

    #[arg(long, env = "IPCARD_GEO_ENDPOINT")]
    pub geo_endpoint: Option<String>,

    #[arg(long, env = "IPCARD_ADDRESS_ENDPOINT")]
    pub address_endpoint: Option<String>,

    #[arg(long, env = "IPCARD_FONT_PATH")]
    pub font_path: Option<String>,

    /// Per-request timeout for upstream providers
    #[arg(long, env = "IPCARD_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Optional TOML configuration file
    #[arg(long, env = "IPCARD_CONFIG")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    pub auto: String,
    pub query: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            auto: DEFAULT_AUTO_ROUTE.to_string(),
            query: DEFAULT_QUERY_ROUTE.to_string(),
        }
    }
}

/// 啟動時建立一次、之後唯讀的設定
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub bind: String,
    pub address_source: AddressSource,
    pub address_api_key: Option<String>,
    pub geo_endpoint: String,
    pub address_endpoint: String,
    pub timeout: Duration,
    pub profile: RenderProfile,
    pub routes: RouteConfig,
}

impl AppSettings {
    /// 讀取 `--config`（如果有）並合併成最終設定，優先順序：命令列/環境變數 > 檔案 > 預設值
    pub fn load(cli: &ServerConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                CardFileConfig::from_file(path)?
            }
            None => CardFileConfig::default(),
        };
        Ok(Self::merge(cli, &file))
    }

    pub fn merge(cli: &ServerConfig, file: &CardFileConfig) -> Self {
        let server = file.server.clone().unwrap_or_default();
        let providers = file.providers.clone().unwrap_or_default();
        let render = file.render.clone().unwrap_or_default();
        let routes = file.routes.clone().unwrap_or_default();

        let address_source = cli
            .address_source
            .or(providers.address_source)
            .unwrap_or(AddressSource::Baidu);

        let mut profile = render.apply_to(address_source.default_profile());
        if let Some(font_path) = &cli.font_path {
            profile.font_path = font_path.clone();
        }

        let defaults = RouteConfig::default();

        Self {
            bind: cli
                .bind
                .clone()
                .or(server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            address_source,
            address_api_key: cli.address_api_key.clone().or(providers.address_api_key),
            geo_endpoint: cli
                .geo_endpoint
                .clone()
                .or(providers.geo_endpoint)
                .unwrap_or_else(|| DEFAULT_GEO_ENDPOINT.to_string()),
            address_endpoint: cli
                .address_endpoint
                .clone()
                .or(providers.address_endpoint)
                .unwrap_or_else(|| DEFAULT_ADDRESS_ENDPOINT.to_string()),
            timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(providers.timeout_seconds)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            profile,
            routes: RouteConfig {
                auto: routes.auto.unwrap_or(defaults.auto),
                query: routes.query.unwrap_or(defaults.query),
            },
        }
    }

    /// 百度模式下的 API key；缺少時回傳 `MissingConfig`
    pub fn require_api_key(&self) -> Result<&str> {
        let key = validation::validate_required_field("address_api_key", &self.address_api_key)?;
        if key.trim().is_empty() {
            return Err(CardError::MissingConfig {
                field: "address_api_key".to_string(),
            });
        }
        Ok(key)
    }
}

impl Validate for AppSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("bind", &self.bind)?;
        validation::validate_url("geo_endpoint", &self.geo_endpoint)?;

        if self.address_source == AddressSource::Baidu {
            validation::validate_url("address_endpoint", &self.address_endpoint)?;
            self.require_api_key()?;
        }

        validation::validate_range("timeout_secs", self.timeout.as_secs(), 1, 300)?;

        validation::validate_path("render.font_path", &self.profile.font_path)?;
        validation::validate_range("render.width", self.profile.width, 50, 4096)?;
        validation::validate_range("render.height", self.profile.height, 20, 4096)?;
        validation::validate_range("render.font_size", self.profile.font_size, 4.0, 200.0)?;
        validation::validate_range("render.line_pitch", self.profile.line_pitch, 1.0, 500.0)?;

        validation::validate_route_segment("routes.auto", &self.routes.auto)?;
        validation::validate_route_segment("routes.query", &self.routes.query)?;
        if self.routes.auto == self.routes.query {
            return Err(CardError::InvalidConfigValue {
                field: "routes".to_string(),
                value: self.routes.auto.clone(),
                reason: "auto and query routes must differ".to_string(),
            });
        }
        if self.routes.auto == "healthz" || self.routes.query == "healthz" {
            return Err(CardError::InvalidConfigValue {
                field: "routes".to_string(),
                value: "healthz".to_string(),
                reason: "route collides with the health check".to_string(),
            });
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
