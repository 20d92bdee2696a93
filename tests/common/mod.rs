#![allow(dead_code)]

use httpmock::prelude::*;
use httpmock::Mock;
use image::{Rgba, RgbaImage};
use ipcard::adapters::{BaiduAddressClient, IpApiClient, KeyedAddressResolver};
use ipcard::core::{FaceLoader, GlyphFace, RenderProfile};
use ipcard::{RequestOrchestrator, ReportRenderer, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const CHAR_ADVANCE: f32 = 6.0;
pub const GLYPH_HEIGHT: u32 = 10;

/// 每個字元寬 6px 的方塊字型，讓版面在沒有字型檔時也能驗證
pub struct BlockFace;

impl GlyphFace for BlockFace {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * CHAR_ADVANCE
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, baseline: f32, color: Rgba<u8>) {
        let width = self.measure(text) as u32;
        for dx in 0..width {
            for dy in 0..GLYPH_HEIGHT {
                let px = x as u32 + dx;
                let py = (baseline as u32).saturating_sub(dy);
                if px < canvas.width() && py < canvas.height() {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}

#[derive(Default)]
pub struct BlockLoader {
    pub loads: AtomicUsize,
}

impl BlockLoader {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl FaceLoader for BlockLoader {
    fn load(&self, _path: &str, _size: f32) -> Result<Box<dyn GlyphFace>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(BlockFace))
    }
}

pub fn geo_success_body(ip: &str) -> serde_json::Value {
    serde_json::json!({
        "query": ip,
        "country": "Testland",
        "regionName": "Example Region",
        "city": "Example City",
        "isp": "Example ISP",
        "org": "Example ISP",
        "as": "AS64500",
        "status": "success"
    })
}

pub fn mock_geo<'a>(server: &'a MockServer, ip: &str, body: serde_json::Value) -> Mock<'a> {
    let path = format!("/json/{}", ip);
    server.mock(|when, then| {
        when.method(GET).path(path).query_param("lang", "zh-CN");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

pub fn mock_address<'a>(server: &'a MockServer, ip: &str, body: serde_json::Value) -> Mock<'a> {
    let ip = ip.to_string();
    server.mock(|when, then| {
        when.method(GET)
            .path("/location/ip")
            .query_param("ip", ip)
            .query_param("ak", "test-key");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

/// 用 mock server 的兩個 provider 與方塊字型組出 orchestrator
pub fn orchestrator_with(
    server: &MockServer,
    profile: RenderProfile,
    loader: Arc<dyn FaceLoader>,
) -> RequestOrchestrator {
    let client = reqwest::Client::new();
    let geo = IpApiClient::new(client.clone(), &server.url("/json")).unwrap();
    let baidu = BaiduAddressClient::new(client, &server.url("/location/ip")).unwrap();
    let renderer = ReportRenderer::new(profile, loader);

    RequestOrchestrator::new(
        Arc::new(geo),
        Arc::new(KeyedAddressResolver::new(baidu, "test-key")),
        Arc::new(renderer),
    )
}

/// 畫布上含有某顏色的連續列區段數
pub fn color_bands(image: &RgbaImage, color: Rgba<u8>) -> Vec<(u32, u32)> {
    let mut bands = Vec::new();
    let mut start: Option<u32> = None;

    for y in 0..image.height() {
        let has_color = (0..image.width()).any(|x| image.get_pixel(x, y) == &color);
        match (has_color, start) {
            (true, None) => start = Some(y),
            (false, Some(s)) => {
                bands.push((s, y - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        bands.push((s, image.height() - 1));
    }
    bands
}
