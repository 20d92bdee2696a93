use crate::core::report::ReportRenderer;
use crate::domain::model::RenderedReport;
use crate::domain::ports::{AddressResolver, GeoLookup};
use crate::utils::error::{CardError, Result};
use std::sync::Arc;

/// 一個請求的完整流程：geo 查詢 -> 地址 -> 渲染。
///
/// 任何上游失敗都會在畫圖之前中止，不會產生只有部分資料的圖片。
#[derive(Clone)]
pub struct RequestOrchestrator {
    geo: Arc<dyn GeoLookup>,
    address: Arc<dyn AddressResolver>,
    renderer: Arc<ReportRenderer>,
}

impl RequestOrchestrator {
    pub fn new(
        geo: Arc<dyn GeoLookup>,
        address: Arc<dyn AddressResolver>,
        renderer: Arc<ReportRenderer>,
    ) -> Self {
        Self {
            geo,
            address,
            renderer,
        }
    }

    pub fn renderer(&self) -> &ReportRenderer {
        &self.renderer
    }

    pub async fn handle(&self, ip: &str) -> Result<RenderedReport> {
        tracing::info!("🔎 Handling IP: {}", ip);

        let geo = self.geo.lookup(ip).await.map_err(|e| {
            tracing::warn!("❌ Geo lookup failed for {}: {}", ip, e);
            CardError::UpstreamGeo(e)
        })?;
        tracing::debug!("Geo result for {}: {:?}", ip, geo);

        let address = self.address.resolve(ip, &geo).await.map_err(|e| {
            tracing::warn!(
                "❌ Address lookup ({}) failed for {}: {}",
                self.address.name(),
                ip,
                e
            );
            CardError::UpstreamAddress(e)
        })?;
        tracing::debug!("Address for {}: {}", ip, address);

        // 讀字型與點陣化是同步工作，放到 blocking pool
        let renderer = Arc::clone(&self.renderer);
        let owned_ip = ip.to_string();
        let report =
            tokio::task::spawn_blocking(move || renderer.render(&owned_ip, &geo, &address))
                .await??;

        tracing::info!("✅ Rendered card for {} ({} bytes)", ip, report.as_bytes().len());
        Ok(report)
    }
}
