// Adapters layer: concrete implementations of the domain ports (upstream HTTP providers, font files).

pub mod address_client;
pub mod font_face;
pub mod geo_client;
pub mod http;

pub use address_client::{BaiduAddressClient, GeoAddressResolver, KeyedAddressResolver};
pub use font_face::{FontFileLoader, TrueTypeFace};
pub use geo_client::IpApiClient;
