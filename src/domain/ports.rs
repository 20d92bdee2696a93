use crate::domain::model::GeoInfo;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};

/// 第一個 provider：IP -> 國家 / 地區 / 城市 / ISP / AS
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn lookup(&self, ip: &str) -> std::result::Result<GeoInfo, LookupError>;
}

/// 產生圖片上「地址」那一行的策略。
///
/// 實作可以呼叫第二個 provider，也可以直接由 geo 結果組合。
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, ip: &str, geo: &GeoInfo) -> std::result::Result<String, LookupError>;

    fn name(&self) -> &'static str;
}

/// 已載入的字型：量測與繪製分開，排版靠量測結果決定位置。
pub trait GlyphFace: Send {
    /// 以像素計的字串水平寬度
    fn measure(&self, text: &str) -> f32;

    /// `baseline` 是基線的 y 座標，不是文字框頂端
    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, baseline: f32, color: Rgba<u8>);
}

/// 每次渲染時載入字型；載入失敗是渲染唯一的失敗來源（除了編碼）
pub trait FaceLoader: Send + Sync {
    fn load(&self, path: &str, size: f32) -> Result<Box<dyn GlyphFace>>;
}
