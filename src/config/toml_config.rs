use crate::config::AddressSource;
use crate::domain::model::RenderProfile;
use crate::utils::error::{CardError, Result};
use image::Rgba;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 選用的 TOML 設定檔，所有欄位都可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardFileConfig {
    pub server: Option<ServerSection>,
    pub providers: Option<ProvidersSection>,
    pub render: Option<RenderSection>,
    pub routes: Option<RoutesSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersSection {
    pub address_source: Option<AddressSource>,
    pub address_api_key: Option<String>,
    pub geo_endpoint: Option<String>,
    pub address_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSection {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub font_path: Option<String>,
    pub font_size: Option<f32>,
    pub left_margin: Option<f32>,
    pub first_baseline: Option<f32>,
    pub line_pitch: Option<f32>,
    pub text_color: Option<[u8; 3]>,
    pub accent_color: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesSection {
    pub auto: Option<String>,
    pub query: Option<String>,
}

impl CardFileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CardError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CardError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BAIDU_API_KEY})，未設定的變數換成空字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| CardError::Config {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("⚠️ Environment variable {} referenced in config is not set", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }
}

impl RenderSection {
    /// 在預設 profile 上套用檔案中有寫的欄位
    pub fn apply_to(&self, mut profile: RenderProfile) -> RenderProfile {
        if let Some(width) = self.width {
            profile.width = width;
        }
        if let Some(height) = self.height {
            profile.height = height;
        }
        if let Some(font_path) = &self.font_path {
            profile.font_path = font_path.clone();
        }
        if let Some(font_size) = self.font_size {
            profile.font_size = font_size;
        }
        if let Some(left_margin) = self.left_margin {
            profile.left_margin = left_margin;
        }
        if let Some(first_baseline) = self.first_baseline {
            profile.first_baseline = first_baseline;
        }
        if let Some(line_pitch) = self.line_pitch {
            profile.line_pitch = line_pitch;
        }
        if let Some([r, g, b]) = self.text_color {
            profile.text_color = Rgba([r, g, b, 255]);
        }
        if let Some([r, g, b]) = self.accent_color {
            profile.accent_color = Rgba([r, g, b, 255]);
        }
        profile
    }
}
