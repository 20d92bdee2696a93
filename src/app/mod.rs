use crate::adapters::{
    http::build_client, BaiduAddressClient, FontFileLoader, GeoAddressResolver, IpApiClient,
    KeyedAddressResolver,
};
use crate::config::{AddressSource, AppSettings};
use crate::core::orchestrator::RequestOrchestrator;
use crate::core::report::ReportRenderer;
use crate::domain::ports::AddressResolver;
use crate::utils::error::Result;
use std::sync::Arc;

/// 依設定組出 orchestrator：geo client、地址策略、渲染器
pub fn build_orchestrator(settings: &AppSettings) -> Result<RequestOrchestrator> {
    let client = build_client(settings.timeout)?;
    let geo = IpApiClient::new(client.clone(), &settings.geo_endpoint)?;

    let address: Arc<dyn AddressResolver> = match settings.address_source {
        AddressSource::Baidu => {
            let api_key = settings.require_api_key()?;
            let baidu = BaiduAddressClient::new(client, &settings.address_endpoint)?;
            Arc::new(KeyedAddressResolver::new(baidu, api_key))
        }
        AddressSource::Geo => Arc::new(GeoAddressResolver),
    };

    tracing::info!(
        "🧩 Address source: {}, canvas {}x{}, font {}",
        address.name(),
        settings.profile.width,
        settings.profile.height,
        settings.profile.font_path
    );

    let renderer = ReportRenderer::new(settings.profile.clone(), Arc::new(FontFileLoader));
    Ok(RequestOrchestrator::new(
        Arc::new(geo),
        address,
        Arc::new(renderer),
    ))
}
