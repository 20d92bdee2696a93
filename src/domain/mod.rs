// Domain layer: models and ports (interfaces). Adapters under crate::adapters implement the ports.

pub mod model;
pub mod ports;
