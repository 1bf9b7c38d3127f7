// Domain layer: data model and ports. Concrete HTTP and config live in adapters/config.

pub mod model;
pub mod ports;
