pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::app::build_orchestrator;
pub use crate::config::{AddressSource, AppSettings, ServerConfig};
pub use crate::core::{orchestrator::RequestOrchestrator, report::ReportRenderer};
pub use crate::utils::error::{CardError, LookupError, Result};
