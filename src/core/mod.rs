pub mod client_ip;
pub mod orchestrator;
pub mod report;

pub use crate::domain::model::{GeoInfo, RenderProfile, RenderedReport, ReportLine};
pub use crate::domain::ports::{AddressResolver, FaceLoader, GeoLookup, GlyphFace};
pub use crate::utils::error::Result;
