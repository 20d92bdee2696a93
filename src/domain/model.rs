use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoStatus {
    Success,
    #[serde(other)]
    Fail,
}

/// ip-api.com 的回應。`status` 不是 success 時只有 `message` 可信。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoInfo {
    #[serde(rename = "query", default)]
    pub queried_ip: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "regionName", default)]
    pub region_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub isp: String,
    #[serde(default)]
    pub org: String,
    #[serde(rename = "as", default)]
    pub as_info: String,
    pub status: GeoStatus,
    #[serde(default)]
    pub message: String,
}

impl GeoInfo {
    pub fn is_success(&self) -> bool {
        self.status == GeoStatus::Success
    }
}

/// 地址 provider 的查詢結果，`status_code == 0` 時 `address` 才有效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressResult {
    pub address: String,
    pub status_code: i64,
}

impl AddressResult {
    pub fn is_valid(&self) -> bool {
        self.status_code == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub label: String,
    pub value: String,
}

impl ReportLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 一行文字實際畫到畫布上的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePlacement {
    pub label_x: f32,
    pub label_width: f32,
    pub value_x: f32,
    pub baseline: f32,
}

/// 編碼後的 PNG，產生後不再修改
#[derive(Debug, Clone)]
pub struct RenderedReport {
    bytes: Vec<u8>,
}

impl RenderedReport {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderProfile {
    pub width: u32,
    pub height: u32,
    pub font_path: String,
    pub font_size: f32,
    pub left_margin: f32,
    pub first_baseline: f32,
    pub line_pitch: f32,
    pub text_color: Rgba<u8>,
    pub accent_color: Rgba<u8>,
}

impl RenderProfile {
    pub const DEFAULT_FONT_PATH: &'static str = "./MapleMono-NF-CN-Regular.ttf";

    /// 地址來自第二個 provider，地址字串較長
    pub fn dual_provider() -> Self {
        Self {
            width: 550,
            height: 120,
            font_path: Self::DEFAULT_FONT_PATH.to_string(),
            font_size: 15.0,
            left_margin: 10.0,
            first_baseline: 25.0,
            line_pitch: 20.0,
            text_color: Rgba([0, 0, 0, 255]),
            accent_color: Rgba([255, 0, 0, 255]),
        }
    }

    pub fn locale_only() -> Self {
        Self {
            width: 350,
            ..Self::dual_provider()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_info_success_payload() {
        let body = r#"{
            "query": "203.0.113.5",
            "country": "中国",
            "regionName": "北京市",
            "city": "北京",
            "isp": "Chinanet",
            "org": "Example ISP",
            "as": "AS64500 Example",
            "status": "success"
        }"#;

        let info: GeoInfo = serde_json::from_str(body).unwrap();
        assert!(info.is_success());
        assert_eq!(info.queried_ip, "203.0.113.5");
        assert_eq!(info.region_name, "北京市");
        assert_eq!(info.as_info, "AS64500 Example");
        assert!(info.message.is_empty());
    }

    #[test]
    fn test_geo_info_fail_payload_has_only_message() {
        let body = r#"{"status":"fail","message":"invalid query","query":"abc"}"#;
        let info: GeoInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.status, GeoStatus::Fail);
        assert_eq!(info.message, "invalid query");
        assert!(info.org.is_empty());
    }

    #[test]
    fn test_unknown_status_is_treated_as_fail() {
        let info: GeoInfo = serde_json::from_str(r#"{"status":"throttled"}"#).unwrap();
        assert!(!info.is_success());
    }

    #[test]
    fn test_profiles_differ_only_in_width() {
        let dual = RenderProfile::dual_provider();
        let locale = RenderProfile::locale_only();
        assert_eq!(dual.width, 550);
        assert_eq!(locale.width, 350);
        assert_eq!(
            RenderProfile {
                width: 550,
                ..locale
            },
            dual
        );
    }
}
